use std::time::Duration;

use clients::{CircuitBreaker, CircuitBreakerConfig};
use criterion::{Criterion, criterion_group, criterion_main};

fn config() -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: 10,
        cooldown: Duration::from_secs(5),
    }
}

fn bench_closed_success(c: &mut Criterion) {
    let breaker = CircuitBreaker::new("bench", config());

    c.bench_function("breaker/closed_success", |b| {
        b.iter(|| {
            if let Some(permit) = breaker.try_acquire() {
                permit.success();
            }
        });
    });
}

fn bench_open_rejection(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _guard = rt.enter();
    let breaker = CircuitBreaker::new("bench", config());
    for _ in 0..10 {
        breaker.try_acquire().unwrap().failure();
    }

    c.bench_function("breaker/open_rejection", |b| {
        b.iter(|| {
            assert!(breaker.try_acquire().is_none());
        });
    });
}

fn bench_contended(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let breaker = std::sync::Arc::new(CircuitBreaker::new("bench", config()));

    c.bench_function("breaker/contended_8_tasks", |b| {
        b.iter(|| {
            rt.block_on(async {
                let tasks: Vec<_> = (0..8)
                    .map(|_| {
                        let breaker = breaker.clone();
                        tokio::spawn(async move {
                            for _ in 0..100 {
                                if let Some(permit) = breaker.try_acquire() {
                                    permit.success();
                                }
                            }
                        })
                    })
                    .collect();
                for task in tasks {
                    task.await.unwrap();
                }
            });
        });
    });
}

criterion_group!(benches, bench_closed_success, bench_open_rejection, bench_contended);
criterion_main!(benches);

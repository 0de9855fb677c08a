//! Classification of backend responses.

use bytes::Bytes;
use reqwest::StatusCode;
use saga::ServiceError;
use serde::de::DeserializeOwned;

/// A fully buffered backend response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Accepts exactly the operation's success status.
    ///
    /// 4xx becomes `Client`, 5xx `Server`, and anything else, including other
    /// 2xx codes, `Unknown`.
    pub fn expect(self, expected: StatusCode) -> Result<Self, ServiceError> {
        let status = self.status;
        if status == expected {
            return Ok(self);
        }
        if status.is_client_error() {
            return Err(ServiceError::Client {
                status: status.as_u16(),
                message: self.message(),
            });
        }
        if status.is_server_error() {
            return Err(ServiceError::Server {
                status: status.as_u16(),
                message: self.message(),
            });
        }
        Err(ServiceError::Unknown {
            status: status.as_u16(),
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ServiceError> {
        serde_json::from_slice(&self.body).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    /// Best-effort error text: a JSON `message` or `error` field, else the raw body.
    pub fn message(&self) -> String {
        serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|value| {
                ["message", "error"]
                    .iter()
                    .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
            })
            .unwrap_or_else(|| String::from_utf8_lossy(&self.body).to_string())
    }
}

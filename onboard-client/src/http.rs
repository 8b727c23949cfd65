//! Thin HTTP layer: base-URL resolution, JSON bodies, and the CSRF crumb
//! header on state-changing requests. No retries happen here.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timeout")]
    Timeout,
    #[error("connection failed: {0}")]
    Transport(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("{message}")]
    Api { message: String },
}

impl From<ureq::Error> for ClientError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => ClientError::Status(code),
            ureq::Error::Transport(t) => transport_error(t.to_string()),
        }
    }
}

/// Timeouts get their own variant so upstream message handling can fall
/// back to the canned connection text; ureq reports them as transport
/// failures whose text says "timed out".
fn transport_error(text: String) -> ClientError {
    if text.contains("timed out") || text.contains("timeout") {
        ClientError::Timeout
    } else {
        ClientError::Transport(text)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Crumb {
    #[serde(rename = "crumbRequestField")]
    field: String,
    crumb: String,
}

/// JSON client bound to one server base URL. The crumb is fetched lazily
/// before the first POST and cached for the session.
pub struct HttpClient {
    agent: ureq::Agent,
    base_url: String,
    crumb: Mutex<Option<Crumb>>,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(HTTP_TIMEOUT)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            crumb: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.agent.get(&self.url(path)).call()?;
        response
            .into_json()
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }

    pub fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ClientError> {
        self.ensure_crumb();
        let mut request = self.agent.post(&self.url(path));
        if let Ok(guard) = self.crumb.lock() {
            if let Some(crumb) = guard.as_ref() {
                request = request.set(&crumb.field, &crumb.crumb);
            }
        }
        let response = request.send_json(body.clone())?;
        response
            .into_json()
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }

    /// Servers without CSRF protection answer 404 here; that is not an
    /// error, POSTs just go out without the header.
    fn ensure_crumb(&self) {
        let Ok(mut guard) = self.crumb.lock() else {
            return;
        };
        if guard.is_some() {
            return;
        }
        match self.agent.get(&self.url("/crumbIssuer/api/json")).call() {
            Ok(response) => match response.into_json::<Crumb>() {
                Ok(crumb) => *guard = Some(crumb),
                Err(e) => log::warn!("crumb issuer returned malformed data: {e}"),
            },
            Err(ureq::Error::Status(404, _)) => {
                log::debug!("no crumb issuer on this server");
            }
            Err(e) => log::warn!("crumb fetch failed: {e}"),
        }
    }
}

/// Percent-encodes a query value. Covers the characters that occur in
/// plugin search terms and correlation ids.
pub fn encode_query(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::{encode_query, transport_error, ClientError};

    #[test]
    fn query_encoding_escapes_reserved_characters() {
        assert_eq!(encode_query("git client"), "git%20client");
        assert_eq!(encode_query("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_query("plain-term_1.0~x"), "plain-term_1.0~x");
    }

    #[test]
    fn timed_out_transport_maps_to_timeout() {
        assert!(matches!(
            transport_error("Network Error: timed out reading response".into()),
            ClientError::Timeout
        ));
        assert!(matches!(
            transport_error("connection timeout".into()),
            ClientError::Timeout
        ));
        assert!(matches!(
            transport_error("Connection refused (os error 111)".into()),
            ClientError::Transport(_)
        ));
    }

    #[test]
    fn timeout_display_names_the_timeout() {
        assert!(ClientError::Timeout.to_string().contains("timeout"));
    }
}

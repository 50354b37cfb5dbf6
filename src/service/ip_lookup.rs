//! Best-effort client IP resolution through public lookup services.
//!
//! Registration records the client's public IP for audit. The lookup is
//! never allowed to block or fail registration: each configured endpoint
//! is tried in order with a short timeout, and when all of them fail the
//! sentinel [`FALLBACK_IP`] is recorded instead.

use std::time::Duration;

use serde_json::Value;

/// Sentinel recorded when every lookup endpoint fails. Not a real IP and
/// never written to the IP registration table.
pub const FALLBACK_IP: &str = "0.0.0.0";

/// JSON fields the supported lookup services use for the address, in the
/// order they are checked.
const IP_FIELDS: [&str; 3] = ["ip", "IPv4", "query"];

/// Client IP resolver backed by a list of public JSON lookup endpoints.
#[derive(Debug, Clone)]
pub struct IpLookup {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl IpLookup {
    /// Creates a resolver over the given endpoints with a per-request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }

    /// Resolves the caller's public IP, trying each endpoint in order.
    ///
    /// Infallible by design: any endpoint failure falls through to the
    /// next one, and exhausting the list yields [`FALLBACK_IP`].
    pub async fn resolve_client_ip(&self) -> String {
        for endpoint in &self.endpoints {
            match self.query_endpoint(endpoint).await {
                Some(ip) => return ip,
                None => {
                    tracing::debug!(endpoint, "ip lookup endpoint failed, trying next");
                }
            }
        }
        tracing::warn!("all ip lookup endpoints failed, using fallback");
        FALLBACK_IP.to_string()
    }

    async fn query_endpoint(&self, endpoint: &str) -> Option<String> {
        let response = self.client.get(endpoint).send().await.ok()?;
        let body = response.json::<Value>().await.ok()?;
        extract_ip(&body)
    }
}

/// Pulls the IP out of a lookup response, accepting any of the field
/// names the supported services use.
fn extract_ip(body: &Value) -> Option<String> {
    IP_FIELDS
        .iter()
        .find_map(|field| body.get(field))
        .and_then(Value::as_str)
        .filter(|ip| !ip.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_ip_field() {
        let body = json!({ "ip": "203.0.113.7" });
        assert_eq!(extract_ip(&body), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn extracts_ipv4_field() {
        let body = json!({ "IPv4": "198.51.100.4" });
        assert_eq!(extract_ip(&body), Some("198.51.100.4".to_string()));
    }

    #[test]
    fn extracts_query_field() {
        let body = json!({ "query": "192.0.2.1", "status": "success" });
        assert_eq!(extract_ip(&body), Some("192.0.2.1".to_string()));
    }

    #[test]
    fn prefers_ip_over_later_fields() {
        let body = json!({ "ip": "203.0.113.7", "query": "192.0.2.1" });
        assert_eq!(extract_ip(&body), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn rejects_missing_and_empty_fields() {
        assert_eq!(extract_ip(&json!({ "status": "fail" })), None);
        assert_eq!(extract_ip(&json!({ "ip": "" })), None);
        assert_eq!(extract_ip(&json!({ "ip": 42 })), None);
    }

    #[tokio::test]
    async fn empty_endpoint_list_yields_fallback() {
        let Ok(lookup) = IpLookup::new(Vec::new(), Duration::from_secs(1)) else {
            panic!("client build failed");
        };
        assert_eq!(lookup.resolve_client_ip().await, FALLBACK_IP);
    }
}

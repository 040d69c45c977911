//! HTTP client for the Packet device endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method};

use super::{ApiError, ApiResponse, EventSource, STATUS_OK};
use crate::core::types::{DeviceRequest, Event, EventList};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const AUTH_HEADER: &str = "X-Auth-Token";

/// Authenticated client for one Packet account.
#[derive(Debug, Clone)]
pub struct PacketClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PacketClient {
    /// Create a client for `base_url` (e.g. `https://api.packet.net`).
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    /// `POST /projects/{project}/devices`
    pub async fn create_device(
        &self,
        project_id: &str,
        request: &DeviceRequest,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}/projects/{}/devices", self.base_url, project_id);
        let body =
            serde_json::to_vec(request).map_err(|e| ApiError::Malformed(e.to_string()))?;
        self.send(Method::POST, &url, Some(body)).await
    }

    /// `DELETE /devices/{id}`
    pub async fn delete_device(&self, device_id: &str) -> Result<ApiResponse, ApiError> {
        let url = format!("{}/devices/{}", self.base_url, device_id);
        self.send(Method::DELETE, &url, None).await
    }

    /// `GET /devices/{id}/events`
    pub async fn get_events(&self, device_id: &str) -> Result<ApiResponse, ApiError> {
        let url = format!("{}/devices/{}/events", self.base_url, device_id);
        self.send(Method::GET, &url, None).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse, ApiError> {
        tracing::debug!(%method, url, "packet request");

        let mut req = self
            .client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(AUTH_HEADER, &self.token);
        if let Some(body) = body {
            req = req.body(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        tracing::debug!(status, bytes = text.len(), "packet response");
        Ok(ApiResponse {
            status,
            body: parse_body(&text),
        })
    }
}

/// Empty bodies (204) become `None`; non-JSON bodies are kept as a string.
fn parse_body(text: &str) -> Option<serde_json::Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    )
}

#[async_trait]
impl EventSource for PacketClient {
    async fn device_events(&self, device_id: &str) -> Result<Vec<Event>, ApiError> {
        let response = self.get_events(device_id).await?;
        if !response.is(STATUS_OK) {
            return Err(ApiError::Remote {
                status: response.status,
            });
        }
        let body = response
            .body
            .ok_or_else(|| ApiError::Malformed("empty event response".to_string()))?;
        let list: EventList =
            serde_json::from_value(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
        Ok(list.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Facility, ServerType};
    use httpmock::prelude::*;
    use serde_json::json;

    fn make_request() -> DeviceRequest {
        DeviceRequest {
            hostname: "virl-test".to_string(),
            plan: ServerType::Type0,
            billing_cycle: "hourly".to_string(),
            facility: Facility::Nrt,
            operating_system: "custom_ipxe".to_string(),
            ipxe_script_url: "http://packet.virl.info".to_string(),
            userdata: None,
        }
    }

    #[test]
    fn test_parse_body_variants() {
        assert!(parse_body("").is_none());
        assert!(parse_body("  \n").is_none());
        assert_eq!(parse_body("{\"id\":\"x\"}"), Some(json!({"id": "x"})));
        assert_eq!(parse_body("oops"), Some(json!("oops")));
    }

    #[tokio::test]
    async fn test_create_device_sends_headers_and_body() {
        let server = MockServer::start_async().await;
        let create = server.mock_async(|when, then| {
            when.method(POST)
                .path("/projects/proj-1/devices")
                .header("x-auth-token", "secret")
                .header("content-type", "application/json")
                .json_body(json!({
                    "hostname": "virl-test",
                    "plan": "baremetal_0",
                    "billing_cycle": "hourly",
                    "facility": "nrt1",
                    "operating_system": "custom_ipxe",
                    "ipxe_script_url": "http://packet.virl.info"
                }));
            then.status(201).json_body(json!({"id": "dev-1", "state": "queued"}));
        })
        .await;

        let client = PacketClient::new(server.base_url(), "secret").unwrap();
        let resp = client.create_device("proj-1", &make_request()).await.unwrap();
        create.assert_async().await;
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body.unwrap()["id"], "dev-1");
    }

    #[tokio::test]
    async fn test_delete_device_no_content() {
        let server = MockServer::start_async().await;
        let delete = server.mock_async(|when, then| {
            when.method(DELETE).path("/devices/dev-9");
            then.status(204);
        })
        .await;

        let client = PacketClient::new(format!("{}/", server.base_url()), "t").unwrap();
        let resp = client.delete_device("dev-9").await.unwrap();
        delete.assert_async().await;
        assert_eq!(resp.status, 204);
        assert!(resp.body.is_none());
    }

    #[tokio::test]
    async fn test_device_events_ok() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/devices/dev-2/events");
            then.status(200).json_body(json!({
                "events": [
                    {"state": "succeeded", "body": "Provisioned 10.1.2.3", "type": "provisioning"},
                    {"state": "running", "body": "Installing"}
                ]
            }));
        })
        .await;

        let client = PacketClient::new(server.base_url(), "t").unwrap();
        let events = client.device_events("dev-2").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].state, "succeeded");
        assert_eq!(events[1].body, "Installing");
    }

    #[tokio::test]
    async fn test_device_events_remote_error() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/devices/dev-3/events");
            then.status(401).json_body(json!({"errors": ["invalid token"]}));
        })
        .await;

        let client = PacketClient::new(server.base_url(), "bad").unwrap();
        let err = client.device_events("dev-3").await.unwrap_err();
        assert!(matches!(err, ApiError::Remote { status: 401 }));
    }

    #[tokio::test]
    async fn test_device_events_malformed() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/devices/dev-4/events");
            then.status(200).json_body(json!({"meta": {}}));
        })
        .await;

        let client = PacketClient::new(server.base_url(), "t").unwrap();
        let err = client.device_events("dev-4").await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let client = PacketClient::new("http://127.0.0.1:1", "t").unwrap();
        let err = client.delete_device("dev-5").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.exit_code(), 1);
    }
}

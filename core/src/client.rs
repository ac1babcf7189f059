//! Stateless HTTP request builder and response parser for the items API.
//!
//! # Design
//! `ItemsClient` holds only its configuration and carries no mutable state
//! between calls. Each CRUD operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. `ItemsApi` glues the two halves to a `Transport` for
//! callers that want a single call per operation.
//!
//! The base URL is checked in every `build_*` method, so a missing or blank
//! configuration fails before any network attempt.

use crate::config::{ClientConfig, DeleteAckPolicy};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{DeleteAck, Item, ItemDraft, ItemFields, ItemId};

const NO_CONTENT: u16 = 204;

/// Synchronous, stateless client for the items API.
#[derive(Debug, Clone)]
pub struct ItemsClient {
    base_url: Option<String>,
    delete_ack: DeleteAckPolicy,
}

impl ItemsClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config
                .base_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .map(|url| url.trim_end_matches('/').to_string()),
            delete_ack: config.delete_ack.clone(),
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn build_list_items(&self) -> Result<HttpRequest, ApiError> {
        Ok(request(HttpMethod::Get, self.collection_url()?, None))
    }

    pub fn build_create_item(&self, draft: &ItemDraft) -> Result<HttpRequest, ApiError> {
        let url = self.collection_url()?;
        let body = serde_json::to_string(draft).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(request(HttpMethod::Post, url, Some(body)))
    }

    pub fn build_update_item(&self, id: ItemId, fields: &ItemFields) -> Result<HttpRequest, ApiError> {
        let url = self.item_url(id)?;
        let body = serde_json::to_string(fields).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(request(HttpMethod::Put, url, Some(body)))
    }

    pub fn build_delete_item(&self, id: ItemId) -> Result<HttpRequest, ApiError> {
        Ok(request(HttpMethod::Delete, self.item_url(id)?, None))
    }

    pub fn parse_list_items(&self, response: HttpResponse) -> Result<Vec<Item>, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn parse_create_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parse an update response. A 204 carries no body, so the result is
    /// synthesized from `id` and the submitted `fields`; any defaulting the
    /// server applied is invisible in that case.
    pub fn parse_update_item(
        &self,
        id: ItemId,
        fields: &ItemFields,
        response: HttpResponse,
    ) -> Result<Item, ApiError> {
        check_status(&response)?;
        if response.status == NO_CONTENT {
            return Ok(Item::from_fields(id, fields.clone()));
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parse a delete response. 204 is success without looking at the body.
    /// Other 2xx responses are success unless a strict acknowledgment policy
    /// is configured and the body's `message` differs from it.
    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)?;
        if response.status == NO_CONTENT {
            return Ok(());
        }
        let DeleteAckPolicy::Message(expected) = &self.delete_ack else {
            return Ok(());
        };
        if response.body.trim().is_empty() {
            return Ok(());
        }
        let ack: DeleteAck = serde_json::from_str(&response.body)
            .map_err(|_| ApiError::UnexpectedResponse(response.body.clone()))?;
        match ack.message {
            Some(message) if message != *expected => Err(ApiError::UnexpectedResponse(message)),
            _ => Ok(()),
        }
    }

    fn collection_url(&self) -> Result<String, ApiError> {
        let base = self.base_url.as_deref().ok_or(ApiError::Config)?;
        Ok(format!("{base}/items/"))
    }

    fn item_url(&self, id: ItemId) -> Result<String, ApiError> {
        let base = self.base_url.as_deref().ok_or(ApiError::Config)?;
        Ok(format!("{base}/items/{id}"))
    }
}

fn request(method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("accept".to_string(), "application/json".to_string()),
        ],
        body,
    }
}

/// Map non-2xx status codes to `ApiError::Transport`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Transport {
        status: response.status,
        body: response.body.clone(),
    })
}

/// `ItemsClient` bound to a `Transport`: one call per logical operation.
///
/// Errors are returned unmodified; nothing is retried.
#[derive(Debug, Clone)]
pub struct ItemsApi<T> {
    client: ItemsClient,
    transport: T,
}

impl<T: Transport> ItemsApi<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: ItemsClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &ItemsClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn list(&self) -> Result<Vec<Item>, ApiError> {
        let req = self.client.build_list_items()?;
        let resp = self.execute(req)?;
        self.client.parse_list_items(resp)
    }

    pub fn create(&self, draft: &ItemDraft) -> Result<Item, ApiError> {
        let req = self.client.build_create_item(draft)?;
        let resp = self.execute(req)?;
        self.client.parse_create_item(resp)
    }

    pub fn update(&self, id: ItemId, fields: &ItemFields) -> Result<Item, ApiError> {
        let req = self.client.build_update_item(id, fields)?;
        let resp = self.execute(req)?;
        self.client.parse_update_item(id, fields, resp)
    }

    pub fn delete(&self, id: ItemId) -> Result<(), ApiError> {
        let req = self.client.build_delete_item(id)?;
        let resp = self.execute(req)?;
        self.client.parse_delete_item(resp)
    }

    /// Run one request through the transport, logging both ends.
    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = req.method.as_str();
        let path = req.path.clone();
        tracing::debug!(method, %path, "sending request");
        let resp = self.transport.execute(req).inspect_err(|e| {
            tracing::warn!(method, %path, error = %e, "request failed before a response arrived");
        })?;
        if resp.is_success() {
            tracing::debug!(method, %path, status = resp.status, "received response");
        } else {
            tracing::warn!(method, %path, status = resp.status, body = %resp.body, "server returned error status");
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ItemsClient {
        ItemsClient::new(&ClientConfig::new("http://localhost:8000"))
    }

    fn unconfigured() -> ItemsClient {
        ItemsClient::new(&ClientConfig::unconfigured())
    }

    fn fields() -> ItemFields {
        ItemFields {
            title: "Updated".to_string(),
            description: "more".to_string(),
            completed: true,
        }
    }

    #[test]
    fn build_list_items_produces_correct_request() {
        let req = client().build_list_items().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/items/");
        assert!(req.body.is_none());
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("Accept"), Some("application/json"));
    }

    #[test]
    fn build_create_item_produces_correct_request() {
        let draft = ItemDraft::new("Buy milk", "semi-skimmed");
        let req = client().build_create_item(&draft).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/items/");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["description"], "semi-skimmed");
        assert_eq!(body["completed"], false);
    }

    #[test]
    fn build_update_item_sends_full_replacement() {
        let req = client().build_update_item(42, &fields()).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:8000/items/42");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Updated");
        assert_eq!(body["description"], "more");
        assert_eq!(body["completed"], true);
    }

    #[test]
    fn build_delete_item_produces_correct_request() {
        let req = client().build_delete_item(7).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8000/items/7");
        assert!(req.body.is_none());
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[test]
    fn every_build_fails_without_base_url() {
        let c = unconfigured();
        assert!(matches!(c.build_list_items(), Err(ApiError::Config)));
        assert!(matches!(c.build_create_item(&ItemDraft::new("a", "")), Err(ApiError::Config)));
        assert!(matches!(c.build_update_item(1, &fields()), Err(ApiError::Config)));
        assert!(matches!(c.build_delete_item(1), Err(ApiError::Config)));
    }

    #[test]
    fn blank_base_url_counts_as_missing() {
        for url in ["", "   "] {
            let c = ItemsClient::new(&ClientConfig::new(url));
            assert!(c.base_url().is_none(), "{url:?}");
            assert!(matches!(c.build_list_items(), Err(ApiError::Config)));
            assert!(matches!(c.build_delete_item(1), Err(ApiError::Config)));
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ItemsClient::new(&ClientConfig::new("http://localhost:8000/"));
        let req = client.build_list_items().unwrap();
        assert_eq!(req.path, "http://localhost:8000/items/");
    }

    #[test]
    fn parse_list_items_success() {
        let response = HttpResponse::new(
            200,
            r#"[{"id":1,"title":"Test","description":"","completed":false},{"id":2,"title":"Two","completed":true}]"#,
        );
        let items = client().parse_list_items(response).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Test");
        assert_eq!(items[1].id, 2);
        assert!(items[1].completed);
    }

    #[test]
    fn parse_list_items_error_status_carries_body() {
        let err = client()
            .parse_list_items(HttpResponse::new(503, "maintenance"))
            .unwrap_err();
        match err {
            ApiError::Transport { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_list_items_bad_json() {
        let err = client()
            .parse_list_items(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_create_item_accepts_any_2xx() {
        let body = r#"{"id":5,"title":"New","description":"d","completed":false}"#;
        for status in [200, 201] {
            let item = client().parse_create_item(HttpResponse::new(status, body)).unwrap();
            assert_eq!(item.id, 5);
            assert_eq!(item.description, "d");
        }
    }

    #[test]
    fn parse_update_item_uses_server_body() {
        let response = HttpResponse::new(200, r#"{"id":42,"title":"Server title","description":"","completed":true}"#);
        let item = client().parse_update_item(42, &fields(), response).unwrap();
        assert_eq!(item.title, "Server title");
        assert_eq!(item.description, "");
    }

    #[test]
    fn parse_update_item_no_content_synthesizes_item() {
        let item = client()
            .parse_update_item(42, &fields(), HttpResponse::new(204, ""))
            .unwrap();
        assert_eq!(item, Item::from_fields(42, fields()));
    }

    #[test]
    fn parse_delete_item_no_content_skips_body() {
        let strict = ItemsClient::new(&ClientConfig::new("http://x").with_delete_ack("Item deleted successfully"));
        assert!(strict.parse_delete_item(HttpResponse::new(204, "garbage")).is_ok());
    }

    #[test]
    fn parse_delete_item_status_only_ignores_body() {
        let resp = HttpResponse::new(200, r#"{"message":"whatever"}"#);
        assert!(client().parse_delete_item(resp).is_ok());
    }

    #[test]
    fn parse_delete_item_strict_rejects_other_message() {
        let strict = ItemsClient::new(&ClientConfig::new("http://x").with_delete_ack("Item deleted successfully"));
        let ok = HttpResponse::new(200, r#"{"message":"Item deleted successfully"}"#);
        assert!(strict.parse_delete_item(ok).is_ok());

        let bad = HttpResponse::new(200, r#"{"message":"queued for deletion"}"#);
        let err = strict.parse_delete_item(bad).unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedResponse(m) if m == "queued for deletion"));
    }

    #[test]
    fn parse_delete_item_strict_tolerates_missing_message() {
        let strict = ItemsClient::new(&ClientConfig::new("http://x").with_delete_ack("Item deleted successfully"));
        assert!(strict.parse_delete_item(HttpResponse::new(200, "{}")).is_ok());
        assert!(strict.parse_delete_item(HttpResponse::new(200, "")).is_ok());
    }

    #[test]
    fn parse_delete_item_failure_status() {
        let err = client()
            .parse_delete_item(HttpResponse::new(404, "missing"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: 404, .. }));
    }
}

//! Kibana REST client.
//!
//! Thin `reqwest` wrapper exposing the space, role, and Logstash pipeline
//! endpoints. Every request carries the `kbn-xsrf` header Kibana requires
//! for writes, plus either API-key or basic authentication.

use async_trait::async_trait;
use kbr_types::{CopySavedObjectsRequest, KibanaRole, KibanaSpace, LogstashPipeline, Resource};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::KibanaConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::ResourceClient;

const SPACES: [&str; 3] = ["api", "spaces", "space"];
const ROLES: [&str; 3] = ["api", "security", "role"];
const PIPELINES: [&str; 3] = ["api", "logstash", "pipeline"];

/// The space whose API lives at the root rather than under `/s/{space}`.
const ROOT_SPACE: &str = "default";

/// HTTP client for one Kibana instance.
#[derive(Clone, Debug)]
pub struct KibanaClient {
    http: Client,
    base: Url,
    config: KibanaConfig,
}

impl KibanaClient {
    /// Build a client from validated settings.
    pub fn new(config: KibanaConfig) -> ClientResult<Self> {
        config.validate()?;
        let base = Url::parse(&config.address).map_err(|e| ClientError::InvalidUrl {
            address: config.address.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                address: config.address.clone(),
                reason: "not a hierarchical URL".into(),
            });
        }
        let http = Client::builder()
            .user_agent(concat!("kbr/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self { http, base, config })
    }

    pub fn config(&self) -> &KibanaConfig {
        &self.config
    }

    // -- spaces ------------------------------------------------------------

    pub async fn get_space(&self, id: &str) -> ClientResult<Option<KibanaSpace>> {
        self.get_json(self.endpoint(&SPACES, Some(id))?).await
    }

    pub async fn create_space(&self, space: &KibanaSpace) -> ClientResult<KibanaSpace> {
        space.validate()?;
        let url = self.endpoint(&SPACES, None)?;
        self.write_json(Method::POST, url, &encode(space, &[])?).await
    }

    pub async fn update_space(&self, space: &KibanaSpace) -> ClientResult<KibanaSpace> {
        space.validate()?;
        let url = self.endpoint(&SPACES, Some(&space.id))?;
        self.write_json(Method::PUT, url, &encode(space, &[])?).await
    }

    pub async fn delete_space(&self, id: &str) -> ClientResult<()> {
        self.delete_at(self.endpoint(&SPACES, Some(id))?).await
    }

    /// Copy saved objects from `source_space` into other spaces. `None`
    /// copies from the configured `default_space`.
    ///
    /// Returns Kibana's per-space summary as raw JSON.
    pub async fn copy_saved_objects(
        &self,
        source_space: Option<&str>,
        request: &CopySavedObjectsRequest,
    ) -> ClientResult<Value> {
        let source_space = source_space.unwrap_or(&self.config.default_space);
        let mut segments = Vec::new();
        if source_space != ROOT_SPACE {
            segments.extend(["s", source_space]);
        }
        segments.extend(["api", "spaces", "_copy_saved_objects"]);
        let url = self.url(&segments)?;
        self.write_json(Method::POST, url, &encode(request, &[])?).await
    }

    // -- roles -------------------------------------------------------------

    pub async fn get_role(&self, name: &str) -> ClientResult<Option<KibanaRole>> {
        self.get_json(self.endpoint(&ROLES, Some(name))?).await
    }

    /// Create or replace a role. Kibana answers with no body, so the role is
    /// read back afterwards.
    pub async fn put_role(&self, role: &KibanaRole) -> ClientResult<KibanaRole> {
        role.validate()?;
        let url = self.endpoint(&ROLES, Some(&role.name))?;
        let body = encode(role, &["name", "transient_metadata"])?;
        self.send(Method::PUT, url.clone(), Some(&body)).await?;
        self.get_role(&role.name)
            .await?
            .ok_or_else(|| missing_after_write(&url))
    }

    pub async fn delete_role(&self, name: &str) -> ClientResult<()> {
        self.delete_at(self.endpoint(&ROLES, Some(name))?).await
    }

    // -- logstash pipelines ------------------------------------------------

    pub async fn get_pipeline(&self, id: &str) -> ClientResult<Option<LogstashPipeline>> {
        self.get_json(self.endpoint(&PIPELINES, Some(id))?).await
    }

    /// Create or replace a pipeline, then read it back.
    pub async fn put_pipeline(&self, pipeline: &LogstashPipeline) -> ClientResult<LogstashPipeline> {
        pipeline.validate()?;
        let url = self.endpoint(&PIPELINES, Some(&pipeline.id))?;
        let body = encode(pipeline, &["id", "username"])?;
        self.send(Method::PUT, url.clone(), Some(&body)).await?;
        self.get_pipeline(&pipeline.id)
            .await?
            .ok_or_else(|| missing_after_write(&url))
    }

    pub async fn delete_pipeline(&self, id: &str) -> ClientResult<()> {
        self.delete_at(self.endpoint(&PIPELINES, Some(id))?).await
    }

    // -- plumbing ----------------------------------------------------------

    fn endpoint(&self, collection: &[&str], id: Option<&str>) -> ClientResult<Url> {
        let mut segments = collection.to_vec();
        segments.extend(id);
        self.url(&segments)
    }

    /// Append percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                address: self.config.address.clone(),
                reason: "not a hierarchical URL".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url).header("kbn-xsrf", "true");
        match (&self.config.api_key, &self.config.username) {
            (Some(key), _) => builder.header(AUTHORIZATION, format!("ApiKey {key}")),
            (None, Some(user)) => builder.basic_auth(user, self.config.password.as_ref()),
            (None, None) => builder,
        }
    }

    /// Send a request and return the status and raw body.
    async fn exchange(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> ClientResult<(StatusCode, String)> {
        debug!(%method, %url, "kibana request");
        let mut builder = self.request(method.clone(), url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%method, %url, status = status.as_u16(), "kibana response");
        Ok((status, text))
    }

    /// Send a request and fail on any non-success status.
    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> ClientResult<String> {
        let (status, text) = self.exchange(method.clone(), url.clone(), body).await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<Option<T>> {
        let (status, text) = self.exchange(Method::GET, url.clone(), None).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                method: Method::GET.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        decode(&url, &text).map(Some)
    }

    async fn write_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &Value,
    ) -> ClientResult<T> {
        let text = self.send(method, url.clone(), Some(body)).await?;
        decode(&url, &text)
    }

    async fn delete_at(&self, url: Url) -> ClientResult<()> {
        self.send(Method::DELETE, url, None).await.map(drop)
    }
}

/// Serialize a request body, dropping fields Kibana rejects in it.
fn encode<T: Serialize>(value: &T, drop_fields: &[&str]) -> ClientResult<Value> {
    let mut body = serde_json::to_value(value).map_err(|e| ClientError::Encode(e.to_string()))?;
    if let Value::Object(map) = &mut body {
        for field in drop_fields {
            map.remove(*field);
        }
    }
    Ok(body)
}

fn decode<T: DeserializeOwned>(url: &Url, text: &str) -> ClientResult<T> {
    serde_json::from_str(text).map_err(|e| ClientError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn missing_after_write(url: &Url) -> ClientError {
    ClientError::Decode {
        url: url.to_string(),
        reason: "object not found right after it was written".into(),
    }
}

#[async_trait]
impl ResourceClient<KibanaSpace> for KibanaClient {
    async fn get(&self, id: &str) -> ClientResult<Option<KibanaSpace>> {
        self.get_space(id).await
    }

    /// Spaces have distinct create and update endpoints.
    async fn create_or_update(&self, space: &KibanaSpace) -> ClientResult<KibanaSpace> {
        match self.get_space(&space.id).await? {
            Some(_) => self.update_space(space).await,
            None => self.create_space(space).await,
        }
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.delete_space(id).await
    }
}

#[async_trait]
impl ResourceClient<KibanaRole> for KibanaClient {
    async fn get(&self, name: &str) -> ClientResult<Option<KibanaRole>> {
        self.get_role(name).await
    }

    async fn create_or_update(&self, role: &KibanaRole) -> ClientResult<KibanaRole> {
        self.put_role(role).await
    }

    async fn delete(&self, name: &str) -> ClientResult<()> {
        self.delete_role(name).await
    }
}

#[async_trait]
impl ResourceClient<LogstashPipeline> for KibanaClient {
    async fn get(&self, id: &str) -> ClientResult<Option<LogstashPipeline>> {
        self.get_pipeline(id).await
    }

    async fn create_or_update(&self, pipeline: &LogstashPipeline) -> ClientResult<LogstashPipeline> {
        self.put_pipeline(pipeline).await
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.delete_pipeline(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockKibana;
    use kbr_types::SavedObjectRef;
    use serde_json::json;

    async fn client_for(mock: &MockKibana) -> KibanaClient {
        let address = mock.spawn().await;
        KibanaClient::new(KibanaConfig::with_address(address)).unwrap()
    }

    #[test]
    fn rejects_invalid_address() {
        let err = KibanaClient::new(KibanaConfig::with_address("not a url")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
        let err = KibanaClient::new(KibanaConfig::with_address("mailto:ops@example.com")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[test]
    fn url_segments_are_escaped_and_base_path_kept() {
        let client = KibanaClient::new(KibanaConfig::with_address("http://kb:5601/kibana/")).unwrap();
        let url = client.endpoint(&ROLES, Some("ops team")).unwrap();
        assert_eq!(url.as_str(), "http://kb:5601/kibana/api/security/role/ops%20team");
    }

    #[tokio::test]
    async fn get_space_parses_payload() {
        let mock = MockKibana::default();
        mock.seed(
            "/api/spaces/space/test",
            json!({
                "id": "test",
                "name": "test",
                "description": "This is the Marketing Space",
                "color": "#aabbcc",
                "initials": "MK",
                "disabledFeatures": [],
                "imageUrl": ""
            }),
        );
        let client = client_for(&mock).await;

        let space = client.get_space("test").await.unwrap().unwrap();
        assert_eq!(space.description.as_deref(), Some("This is the Marketing Space"));
        assert_eq!(mock.requests()[0].xsrf.as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let mock = MockKibana::default();
        let client = client_for(&mock).await;
        assert!(client.get_space("nope").await.unwrap().is_none());
        assert!(client.get_role("nope").await.unwrap().is_none());
        assert!(client.get_pipeline("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_surfaced() {
        let mock = MockKibana::default();
        let client = client_for(&mock).await;
        let err = client.get_space("boom").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = KibanaClient::new(KibanaConfig::with_address(format!("http://{addr}"))).unwrap();
        let err = client.get_space("test").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn space_create_or_update_picks_endpoint() {
        let mock = MockKibana::default();
        let client = client_for(&mock).await;
        let space = KibanaSpace::new("ops", "Ops");

        ResourceClient::<KibanaSpace>::create_or_update(&client, &space).await.unwrap();
        ResourceClient::<KibanaSpace>::create_or_update(&client, &space).await.unwrap();

        let writes: Vec<(String, String)> = mock
            .requests()
            .into_iter()
            .filter(|r| r.method != "GET")
            .map(|r| (r.method, r.path))
            .collect();
        assert_eq!(
            writes,
            vec![
                ("POST".to_string(), "/api/spaces/space".to_string()),
                ("PUT".to_string(), "/api/spaces/space/ops".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn put_role_strips_name_and_reads_back() {
        let mock = MockKibana::default();
        let client = client_for(&mock).await;
        let mut role = KibanaRole::new("test");
        role.metadata.insert("version".into(), json!(1));

        let stored = client.put_role(&role).await.unwrap();
        assert_eq!(stored.name, "test");
        assert_eq!(stored.metadata["version"], json!(1));

        let put = mock.requests().into_iter().find(|r| r.method == "PUT").unwrap();
        assert_eq!(put.path, "/api/security/role/test");
        assert!(put.body.unwrap().get("name").is_none());
    }

    #[tokio::test]
    async fn put_pipeline_strips_server_fields() {
        let mock = MockKibana::default();
        let client = client_for(&mock).await;
        let mut pipeline = LogstashPipeline::new("test", "input { stdin {} } output { stdout {} }");
        pipeline.username = Some("someone".into());

        let stored = client.put_pipeline(&pipeline).await.unwrap();
        assert_eq!(stored.id, "test");
        assert_eq!(stored.username.as_deref(), Some("elastic"));

        let put = mock.requests().into_iter().find(|r| r.method == "PUT").unwrap();
        let body = put.body.unwrap();
        assert!(body.get("id").is_none());
        assert!(body.get("username").is_none());
    }

    #[tokio::test]
    async fn invalid_resource_is_rejected_before_sending() {
        let mock = MockKibana::default();
        let client = client_for(&mock).await;
        let err = client.put_pipeline(&LogstashPipeline::new("test", "")).await.unwrap_err();
        assert!(matches!(err, ClientError::Invalid(_)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let mock = MockKibana::default();
        mock.seed("/api/security/role/test", json!({"name": "test"}));
        let client = client_for(&mock).await;

        client.delete_role("test").await.unwrap();
        let err = client.delete_role("test").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn copy_saved_objects_prefixes_non_default_space() {
        let mock = MockKibana::default();
        let client = client_for(&mock).await;
        let request = CopySavedObjectsRequest {
            spaces: vec!["test".into()],
            objects: vec![SavedObjectRef {
                object_type: "index-pattern".into(),
                id: "fake".into(),
            }],
            include_references: true,
            overwrite: true,
            create_new_copies: false,
        };

        let summary = client.copy_saved_objects(Some("default"), &request).await.unwrap();
        assert_eq!(summary["test"]["success"], json!(true));
        client.copy_saved_objects(Some("marketing"), &request).await.unwrap();
        client.copy_saved_objects(None, &request).await.unwrap();

        let paths: Vec<String> = mock.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/api/spaces/_copy_saved_objects".to_string(),
                "/s/marketing/api/spaces/_copy_saved_objects".to_string(),
                "/api/spaces/_copy_saved_objects".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn copy_saved_objects_falls_back_to_configured_space() {
        let mock = MockKibana::default();
        let address = mock.spawn().await;
        let client = KibanaClient::new(KibanaConfig {
            default_space: "marketing".into(),
            ..KibanaConfig::with_address(address)
        })
        .unwrap();
        let request = CopySavedObjectsRequest {
            spaces: vec!["test".into()],
            objects: vec![SavedObjectRef {
                object_type: "dashboard".into(),
                id: "overview".into(),
            }],
            include_references: false,
            overwrite: false,
            create_new_copies: true,
        };

        client.copy_saved_objects(None, &request).await.unwrap();
        client.copy_saved_objects(Some("default"), &request).await.unwrap();

        let paths: Vec<String> = mock.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/s/marketing/api/spaces/_copy_saved_objects".to_string(),
                "/api/spaces/_copy_saved_objects".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn api_key_takes_precedence_over_basic_auth() {
        let mock = MockKibana::default();
        let address = mock.spawn().await;
        let client = KibanaClient::new(KibanaConfig {
            username: Some("elastic".into()),
            password: Some("changeme".into()),
            api_key: Some("c2VjcmV0".into()),
            ..KibanaConfig::with_address(address)
        })
        .unwrap();

        client.get_space("any").await.unwrap();
        assert_eq!(
            mock.requests()[0].authorization.as_deref(),
            Some("ApiKey c2VjcmV0")
        );
    }

    #[tokio::test]
    async fn basic_auth_header() {
        let mock = MockKibana::default();
        let address = mock.spawn().await;
        let client = KibanaClient::new(KibanaConfig {
            username: Some("elastic".into()),
            password: Some("changeme".into()),
            ..KibanaConfig::with_address(address)
        })
        .unwrap();

        client.get_space("any").await.unwrap();
        // base64("elastic:changeme")
        assert_eq!(
            mock.requests()[0].authorization.as_deref(),
            Some("Basic ZWxhc3RpYzpjaGFuZ2VtZQ==")
        );
    }
}

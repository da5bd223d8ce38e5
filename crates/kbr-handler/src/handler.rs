use kbr_client::{KibanaClient, KibanaConfig};
use kbr_patch::PatchResult;
use kbr_types::{CopySavedObjectsRequest, KibanaRole, KibanaSpace, LogstashPipeline};
use serde_json::Value;
use tracing::debug;

use crate::adapter;
use crate::error::HandlerResult;

/// Per-kind operations against one Kibana instance.
///
/// Remote calls go straight to [`KibanaClient`]; the `*_diff` methods are
/// pure and never touch the network.
#[derive(Clone, Debug)]
pub struct KibanaHandler {
    client: KibanaClient,
}

impl KibanaHandler {
    pub fn new(client: KibanaClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: KibanaConfig) -> HandlerResult<Self> {
        Ok(Self::new(KibanaClient::new(config)?))
    }

    pub fn client(&self) -> &KibanaClient {
        &self.client
    }

    // ---- User spaces ----

    pub async fn user_space_get(&self, id: &str) -> HandlerResult<Option<KibanaSpace>> {
        debug!(id, "get user space");
        Ok(self.client.get_space(id).await?)
    }

    pub async fn user_space_create(&self, space: &KibanaSpace) -> HandlerResult<KibanaSpace> {
        debug!(id = %space.id, "create user space");
        Ok(self.client.create_space(space).await?)
    }

    pub async fn user_space_update(&self, space: &KibanaSpace) -> HandlerResult<KibanaSpace> {
        debug!(id = %space.id, "update user space");
        Ok(self.client.update_space(space).await?)
    }

    pub async fn user_space_delete(&self, id: &str) -> HandlerResult<()> {
        debug!(id, "delete user space");
        Ok(self.client.delete_space(id).await?)
    }

    /// Copy saved objects from `source_space` (the configured default space
    /// when `None`) into the requested spaces.
    pub async fn user_space_copy_object(
        &self,
        source_space: Option<&str>,
        request: &CopySavedObjectsRequest,
    ) -> HandlerResult<Value> {
        debug!(?source_space, targets = ?request.spaces, objects = request.objects.len(), "copy saved objects");
        Ok(self.client.copy_saved_objects(source_space, request).await?)
    }

    pub fn user_space_diff(
        &self,
        actual: Option<&KibanaSpace>,
        expected: &KibanaSpace,
        original: Option<&KibanaSpace>,
    ) -> HandlerResult<PatchResult<KibanaSpace>> {
        debug!(id = %expected.id, "diff user space");
        Ok(adapter::diff(actual, expected, original)?)
    }

    // ---- Roles ----

    pub async fn role_get(&self, name: &str) -> HandlerResult<Option<KibanaRole>> {
        debug!(name, "get role");
        Ok(self.client.get_role(name).await?)
    }

    /// Create or replace a role.
    pub async fn role_update(&self, role: &KibanaRole) -> HandlerResult<KibanaRole> {
        debug!(name = %role.name, "update role");
        Ok(self.client.put_role(role).await?)
    }

    pub async fn role_delete(&self, name: &str) -> HandlerResult<()> {
        debug!(name, "delete role");
        Ok(self.client.delete_role(name).await?)
    }

    pub fn role_diff(
        &self,
        actual: Option<&KibanaRole>,
        expected: &KibanaRole,
        original: Option<&KibanaRole>,
    ) -> HandlerResult<PatchResult<KibanaRole>> {
        debug!(name = %expected.name, "diff role");
        Ok(adapter::diff(actual, expected, original)?)
    }

    // ---- Logstash pipelines ----

    pub async fn logstash_pipeline_get(&self, id: &str) -> HandlerResult<Option<LogstashPipeline>> {
        debug!(id, "get logstash pipeline");
        Ok(self.client.get_pipeline(id).await?)
    }

    /// Create or replace a pipeline.
    pub async fn logstash_pipeline_update(
        &self,
        pipeline: &LogstashPipeline,
    ) -> HandlerResult<LogstashPipeline> {
        debug!(id = %pipeline.id, "update logstash pipeline");
        Ok(self.client.put_pipeline(pipeline).await?)
    }

    pub async fn logstash_pipeline_delete(&self, id: &str) -> HandlerResult<()> {
        debug!(id, "delete logstash pipeline");
        Ok(self.client.delete_pipeline(id).await?)
    }

    pub fn logstash_pipeline_diff(
        &self,
        actual: Option<&LogstashPipeline>,
        expected: &LogstashPipeline,
        original: Option<&LogstashPipeline>,
    ) -> HandlerResult<PatchResult<LogstashPipeline>> {
        debug!(id = %expected.id, "diff logstash pipeline");
        Ok(adapter::diff(actual, expected, original)?)
    }
}

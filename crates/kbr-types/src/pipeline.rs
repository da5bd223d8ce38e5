//! Logstash pipelines managed through Kibana.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TypeError, TypeResult};
use crate::kind::ResourceKind;
use crate::resource::{Extra, Resource};

/// A centrally managed Logstash pipeline.
///
/// `settings` is an open map (`"queue.type"`, `"pipeline.workers"`, ...);
/// Kibana fills in defaults the caller never declared.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogstashPipeline {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Set by Kibana to the user that last saved the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub pipeline: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl LogstashPipeline {
    pub fn new(id: impl Into<String>, pipeline: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pipeline: pipeline.into(),
            ..Default::default()
        }
    }
}

impl Resource for LogstashPipeline {
    const KIND: ResourceKind = ResourceKind::LogstashPipeline;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> TypeResult<()> {
        if self.id.trim().is_empty() {
            return Err(TypeError::EmptyIdentifier {
                kind: Self::KIND.as_str(),
            });
        }
        if self.pipeline.trim().is_empty() {
            return Err(TypeError::InvalidField {
                kind: Self::KIND.as_str(),
                field: "pipeline",
                reason: "pipeline definition must not be empty".into(),
            });
        }
        Ok(())
    }
}

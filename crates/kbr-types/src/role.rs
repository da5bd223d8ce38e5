//! Kibana roles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::ResourceKind;
use crate::resource::{Extra, Resource};

/// A Kibana role.
///
/// The role name is part of the API path; Kibana does not accept it in the
/// request body, so the transport strips it before sending.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KibanaRole {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient_metadata: Option<KibanaRoleTransientMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch: Option<KibanaRoleElasticsearch>,
    #[serde(default)]
    pub kibana: Vec<KibanaRolePrivilege>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl KibanaRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Resource for KibanaRole {
    const KIND: ResourceKind = ResourceKind::Role;

    fn id(&self) -> &str {
        &self.name
    }
}

/// Server-maintained role state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KibanaRoleTransientMetadata {
    pub enabled: bool,
}

/// Elasticsearch privileges granted by a role.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KibanaRoleElasticsearch {
    #[serde(default)]
    pub cluster: Vec<String>,
    #[serde(default)]
    pub indices: Vec<KibanaRoleIndex>,
    #[serde(default)]
    pub run_as: Vec<String>,
}

/// Index privileges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KibanaRoleIndex {
    pub names: Vec<String>,
    pub privileges: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_security: Option<KibanaRoleFieldSecurity>,
    /// Document level security query, kept as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
}

/// Field level security.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KibanaRoleFieldSecurity {
    #[serde(default)]
    pub grant: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,
}

/// Kibana privileges for a set of spaces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KibanaRolePrivilege {
    #[serde(default)]
    pub base: Vec<String>,
    #[serde(default)]
    pub feature: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub spaces: Vec<String>,
}

//! Kibana user spaces and the saved-object copy request.

use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;
use crate::resource::{Extra, Resource};

/// A Kibana user space.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KibanaSpace {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub disabled_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl KibanaSpace {
    /// A space with only its identifier and display name set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Resource for KibanaSpace {
    const KIND: ResourceKind = ResourceKind::UserSpace;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A saved object addressed by type and identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedObjectRef {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
}

/// Body of `POST /api/spaces/_copy_saved_objects`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopySavedObjectsRequest {
    /// Destination spaces.
    pub spaces: Vec<String>,
    pub objects: Vec<SavedObjectRef>,
    #[serde(default)]
    pub include_references: bool,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub create_new_copies: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RAW_SPACE: &str = r##"{
        "id": "test",
        "name": "test",
        "description": "This is the Marketing Space",
        "color": "#aabbcc",
        "initials": "MK",
        "disabledFeatures": [],
        "imageUrl": ""
    }"##;

    #[test]
    fn deserialize_kibana_payload() {
        let space: KibanaSpace = serde_json::from_str(RAW_SPACE).unwrap();
        assert_eq!(space.id, "test");
        assert_eq!(space.description.as_deref(), Some("This is the Marketing Space"));
        assert_eq!(space.image_url.as_deref(), Some(""));
        assert!(space.disabled_features.is_empty());
        assert!(space.extra.is_empty());
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let value = json!({"id": "ops", "name": "Ops", "_reserved": true});
        let space: KibanaSpace = serde_json::from_value(value).unwrap();
        assert_eq!(space.extra.get("_reserved"), Some(&json!(true)));

        let back = serde_json::to_value(&space).unwrap();
        assert_eq!(back["_reserved"], json!(true));
    }

    #[test]
    fn absent_optionals_are_not_serialized() {
        let space = KibanaSpace::new("ops", "Ops");
        let value = serde_json::to_value(&space).unwrap();
        assert!(value.get("description").is_none());
        assert!(value.get("imageUrl").is_none());
        assert_eq!(value["disabledFeatures"], json!([]));
    }

    #[test]
    fn validate_rejects_blank_id() {
        let space = KibanaSpace::new(" ", "blank");
        assert!(space.validate().is_err());
        assert!(KibanaSpace::new("ok", "ok").validate().is_ok());
    }

    #[test]
    fn key_includes_kind() {
        assert_eq!(KibanaSpace::new("ops", "Ops").key(), "user_space/ops");
    }

    #[test]
    fn copy_request_wire_format() {
        let req = CopySavedObjectsRequest {
            spaces: vec!["test".into()],
            objects: vec![SavedObjectRef {
                object_type: "index-pattern".into(),
                id: "fake".into(),
            }],
            include_references: true,
            overwrite: true,
            create_new_copies: false,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "spaces": ["test"],
                "objects": [{"type": "index-pattern", "id": "fake"}],
                "includeReferences": true,
                "overwrite": true,
                "createNewCopies": false
            })
        );
    }
}

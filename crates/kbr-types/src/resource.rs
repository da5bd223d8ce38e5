//! The [`Resource`] trait shared by every managed kind.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{TypeError, TypeResult};
use crate::kind::ResourceKind;

/// Fields the server returned that the typed schema does not know about.
///
/// Every resource flattens one of these so that server-injected fields
/// survive a round trip through the typed record.
pub type Extra = BTreeMap<String, serde_json::Value>;

/// A remotely managed configuration object.
///
/// Implementations are plain data: the identifier is read from the record
/// itself and the kind is fixed per type.
pub trait Resource:
    Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static
{
    /// The kind this record describes.
    const KIND: ResourceKind;

    /// The identifier used in the resource's API path.
    fn id(&self) -> &str;

    /// Check that the record can be addressed remotely.
    fn validate(&self) -> TypeResult<()> {
        if self.id().trim().is_empty() {
            return Err(TypeError::EmptyIdentifier {
                kind: Self::KIND.as_str(),
            });
        }
        Ok(())
    }

    /// Lock / log key of the form `kind/id`.
    fn key(&self) -> String {
        format!("{}/{}", Self::KIND, self.id())
    }
}

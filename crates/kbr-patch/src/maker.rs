//! The three-way patch maker.
//!
//! Rather than diffing the live object against the desired one (which would
//! flag every default the server injects as drift), the maker diffs the
//! last-applied object against the desired one and replays only that delta
//! onto the live object. Fields the caller never declared are left alone.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::canonical::{canonicalize, canonicalize_patch, to_canonical_value, to_json_tree};
use crate::delta::{Delta, FieldPath};
use crate::error::{EngineResult, PatchError};
use crate::fingerprint::Fingerprint;
use crate::result::PatchResult;

/// Options controlling a [`PatchMaker`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Fields removed from *original* and *expected* before diffing.
    ///
    /// The delta never touches these paths, so whatever the live object
    /// holds there is kept in the patched result.
    pub ignored: Vec<FieldPath>,
}

impl PatchOptions {
    /// Ignore a field given as a dotted path.
    pub fn ignore(mut self, dotted: &str) -> Self {
        self.ignored.push(FieldPath::parse_dotted(dotted));
        self
    }
}

/// Computes three-way patches. Stateless apart from its options.
#[derive(Clone, Debug, Default)]
pub struct PatchMaker {
    options: PatchOptions,
}

impl PatchMaker {
    pub fn new(options: PatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    /// Diff `original` → `expected` and apply the delta onto `actual`.
    ///
    /// An absent `original` is treated as the empty object, so every
    /// expected field is an addition. The delta is replayed onto the
    /// unnormalized `actual` tree, so fields it does not touch come back
    /// exactly as they were.
    pub fn calculate<R>(&self, actual: &R, expected: &R, original: Option<&R>) -> EngineResult<PatchResult<R>>
    where
        R: Serialize + DeserializeOwned,
    {
        let original_tree = match original {
            Some(original) => Some(to_canonical_value("original", original)?),
            None => None,
        };
        let expected_tree = to_canonical_value("expected", expected)?;
        let actual_tree = to_json_tree("actual", actual)?;

        let base = original_tree
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let delta = Delta::between(&self.strip(base), &self.strip(expected_tree));

        let mut patched_tree = actual_tree.clone();
        delta.apply(&mut patched_tree);

        let current = canonicalize(&actual_tree);
        let modified = canonicalize(&patched_tree);
        let patch = canonicalize_patch(&delta.to_merge_patch());

        debug!(
            ops = delta.len(),
            current = %Fingerprint::of(&current).short(),
            modified = %Fingerprint::of(&modified).short(),
            changed = current != modified,
            "computed three-way patch"
        );

        let resolved = if current == modified {
            actual_tree
        } else {
            patched_tree
        };
        let patched = serde_json::from_value(resolved).map_err(|e| PatchError::Decode(e.to_string()))?;

        Ok(PatchResult::from_parts(
            delta,
            patch,
            current,
            modified,
            original_tree.as_ref().map(canonicalize),
            patched,
        ))
    }

    fn strip(&self, mut tree: Value) -> Value {
        for path in &self.options.ignored {
            remove_path(&mut tree, path.segments());
        }
        tree
    }
}

fn remove_path(tree: &mut Value, segments: &[String]) {
    match segments {
        [] => {}
        [leaf] => {
            if let Value::Object(map) = tree {
                map.remove(leaf);
            }
        }
        [head, rest @ ..] => {
            if let Some(child) = tree.get_mut(head.as_str()) {
                remove_path(child, rest);
            }
        }
    }
}

/// Calculate with default options.
pub fn calculate<R>(actual: &R, expected: &R, original: Option<&R>) -> EngineResult<PatchResult<R>>
where
    R: Serialize + DeserializeOwned,
{
    PatchMaker::default().calculate(actual, expected, original)
}

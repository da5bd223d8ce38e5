use serde::Serialize;

use crate::canonical::canonical_bytes;
use crate::delta::Delta;
use crate::error::EngineResult;
use crate::fingerprint::Fingerprint;

/// The outcome of a three-way diff.
///
/// `patched` is always a fully resolved object that can be submitted as is:
/// the expected object verbatim when the resource does not exist yet, the
/// live object with the delta applied when an update is needed, or the live
/// object unchanged when nothing has to be sent.
#[derive(Clone, Debug)]
pub struct PatchResult<R> {
    /// Canonical merge-patch document of the delta (for audit logging).
    pub patch: Vec<u8>,
    /// Canonical form of the live object.
    pub current: Vec<u8>,
    /// Canonical form of the patched object.
    pub modified: Vec<u8>,
    /// Canonical form of the last-applied object, when one was supplied.
    pub original: Option<Vec<u8>>,
    /// The object to submit upstream.
    pub patched: R,
    delta: Delta,
    creation: bool,
}

impl<R> PatchResult<R> {
    pub(crate) fn from_parts(
        delta: Delta,
        patch: Vec<u8>,
        current: Vec<u8>,
        modified: Vec<u8>,
        original: Option<Vec<u8>>,
        patched: R,
    ) -> Self {
        Self {
            patch,
            current,
            modified,
            original,
            patched,
            delta,
            creation: false,
        }
    }

    /// `true` when nothing has to be sent upstream.
    ///
    /// A creation is never empty.
    pub fn is_empty(&self) -> bool {
        !self.creation && self.current == self.modified
    }

    /// `true` when the resource does not exist remotely yet.
    pub fn is_creation(&self) -> bool {
        self.creation
    }

    /// The field operations computed between original and expected.
    ///
    /// Empty for creations, which do not go through the three-way engine.
    pub fn delta(&self) -> &Delta {
        &self.delta
    }

    pub fn current_fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.current)
    }

    pub fn modified_fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.modified)
    }

    /// The patch document as UTF-8 text.
    pub fn patch_str(&self) -> &str {
        std::str::from_utf8(&self.patch).unwrap_or_default()
    }

    /// Consume the result, keeping only the object to submit.
    pub fn into_patched(self) -> R {
        self.patched
    }
}

impl<R: Serialize> PatchResult<R> {
    /// Result for a resource that does not exist remotely yet.
    ///
    /// `patch`, `current` and `modified` all hold the canonical form of
    /// `expected`, and `patched` is `expected` itself.
    pub fn creation(expected: R) -> EngineResult<Self> {
        let bytes = canonical_bytes("expected", &expected)?;
        Ok(Self {
            patch: bytes.clone(),
            current: bytes.clone(),
            modified: bytes,
            original: None,
            patched: expected,
            delta: Delta::new(),
            creation: true,
        })
    }
}

//! Human-readable rendering of a patch result.
//!
//! Uses the `similar` crate to produce a unified diff between the
//! pretty-printed current and modified forms.

use similar::TextDiff;

use crate::result::PatchResult;

impl<R> PatchResult<R> {
    /// Unified diff of current vs modified, pretty-printed with sorted keys.
    ///
    /// A creation is rendered against an empty document. Returns an empty
    /// string when there is nothing to send.
    pub fn unified_diff(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let old = if self.is_creation() {
            String::new()
        } else {
            pretty(&self.current)
        };
        let new = pretty(&self.modified);

        TextDiff::from_lines(&old, &new)
            .unified_diff()
            .context_radius(3)
            .header("current", "modified")
            .to_string()
    }
}

/// Pretty-print canonical bytes.
///
/// Parsing canonical bytes yields sorted maps whether or not serde_json keeps
/// insertion order, so the output stays sorted.
fn pretty(canonical: &[u8]) -> String {
    let text = String::from_utf8_lossy(canonical);
    let mut out = serde_json::from_str::<serde_json::Value>(&text)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| text.into_owned());
    out.push('\n');
    out
}

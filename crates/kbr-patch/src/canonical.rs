//! Canonical JSON encoding.
//!
//! The canonical form is compact UTF-8 JSON with object keys sorted by byte
//! order at every depth and array order preserved. Two trees are considered
//! equal iff their canonical forms are byte-identical.
//!
//! Two normalizations are applied so that payloads coming from different
//! sources compare equal:
//!
//! - object entries whose value is `null` are dropped (a field set to null
//!   and a field never mentioned mean the same thing to a merge patch);
//! - floats with no fractional part that fit in an `i64` are written as
//!   integers (`1.0` and `1` encode identically).
//!
//! Merge-patch documents are the exception to the first rule: there a `null`
//! entry marks a removal, so [`canonicalize_patch`] keeps it.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{EngineResult, PatchError};

/// Largest magnitude below which an integral float is folded to an integer.
const I64_FOLD_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Encode a JSON tree in canonical form.
pub fn canonicalize(value: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    write_value(&mut out, value, false);
    out
}

/// Encode a merge-patch document: canonical, but `null` entries are kept.
pub fn canonicalize_patch(patch: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    write_value(&mut out, patch, true);
    out
}

/// Serialize a typed value and encode it in canonical form.
pub fn canonical_bytes<T: Serialize + ?Sized>(what: &'static str, value: &T) -> EngineResult<Vec<u8>> {
    Ok(canonicalize(&to_canonical_value(what, value)?))
}

/// Serialize a typed value into the normalized tree the engine diffs on.
///
/// `what` names the argument in error messages (`"actual"`, `"expected"`, ...).
pub fn to_canonical_value<T: Serialize + ?Sized>(what: &'static str, value: &T) -> EngineResult<Value> {
    to_json_tree(what, value).map(normalize)
}

/// Serialize a typed value into a JSON tree without normalizing it.
pub fn to_json_tree<T: Serialize + ?Sized>(what: &'static str, value: &T) -> EngineResult<Value> {
    serde_json::to_value(value).map_err(|e| PatchError::Encode {
        what,
        reason: e.to_string(),
    })
}

/// Apply the canonical normalizations to a tree.
///
/// `canonicalize(&normalize(v)) == canonicalize(&v)` for every `v`.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, normalize(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Number(n) => Value::Number(normalize_number(n)),
        other => other,
    }
}

fn normalize_number(n: Number) -> Number {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && is_foldable(f) => Number::from(f as i64),
        _ => n,
    }
}

fn is_foldable(f: f64) -> bool {
    f.fract() == 0.0 && f.abs() < I64_FOLD_LIMIT
}

fn write_value(out: &mut Vec<u8>, value: &Value, keep_nulls: bool) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item, keep_nulls);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            // Sort explicitly: `Map` keeps insertion order when serde_json's
            // `preserve_order` feature is enabled anywhere in the build.
            let mut entries: Vec<(&String, &Value)> =
                map.iter().filter(|(_, v)| keep_nulls || !v.is_null()).collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(out, key);
                out.push(b':');
                write_value(out, item, keep_nulls);
            }
            out.push(b'}');
        }
    }
}

fn write_number(out: &mut Vec<u8>, n: &Number) {
    if let Some(i) = n.as_i64() {
        out.extend_from_slice(i.to_string().as_bytes());
    } else if let Some(u) = n.as_u64() {
        out.extend_from_slice(u.to_string().as_bytes());
    } else if let Some(f) = n.as_f64().filter(|f| is_foldable(*f)) {
        out.extend_from_slice((f as i64).to_string().as_bytes());
    } else {
        out.extend_from_slice(n.to_string().as_bytes());
    }
}

/// Same escaping rules as `serde_json`'s compact formatter.
fn write_string(out: &mut Vec<u8>, s: &str) {
    out.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            '\u{08}' => out.extend_from_slice(b"\\b"),
            '\u{0c}' => out.extend_from_slice(b"\\f"),
            c if (c as u32) < 0x20 => {
                out.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.push(b'"');
}

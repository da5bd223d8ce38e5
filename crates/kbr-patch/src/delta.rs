//! Field-level delta between two JSON trees.
//!
//! A [`Delta`] is computed between the last-applied (*original*) and the
//! desired (*expected*) trees and then replayed onto the live (*actual*)
//! tree. Maps are compared key by key and recursed into, so a change to one
//! nested field never touches its siblings. Arrays and scalars are compared
//! as whole values.

use std::fmt;

use serde_json::{Map, Value};

/// Location of a field: the sequence of object keys from the root.
///
/// The empty path addresses the root itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a dotted path (`"settings.queue"`). Segments cannot contain dots.
    pub fn parse_dotted(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        Self::new(path.split('.'))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path one level deeper.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }
}

/// JSON Pointer rendering (`/settings/queue.type`).
impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

/// A single field-level operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldOp {
    /// The field is new in the desired tree.
    Add { path: FieldPath, value: Value },
    /// The field was present in the last-applied tree and is now gone.
    Remove { path: FieldPath },
    /// The field exists in both trees with a different value.
    Replace { path: FieldPath, value: Value },
}

impl FieldOp {
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Add { path, .. } | Self::Remove { path } | Self::Replace { path, .. } => path,
        }
    }
}

/// An ordered set of field operations.
///
/// Operations are sorted by path, so two deltas computed from the same
/// trees are always identical.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delta {
    /// The list of field operations.
    pub ops: Vec<FieldOp>,
}

impl Delta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the operations that turn `original` into `expected`.
    ///
    /// Both trees are expected to be normalized (see
    /// [`crate::canonical::normalize`]).
    pub fn between(original: &Value, expected: &Value) -> Self {
        let mut ops = Vec::new();
        diff_values(&FieldPath::root(), original, expected, &mut ops);
        Self { ops }
    }

    /// Returns `true` if there are no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Number of added fields.
    pub fn additions(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, FieldOp::Add { .. }))
            .count()
    }

    /// Number of removed fields.
    pub fn removals(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, FieldOp::Remove { .. }))
            .count()
    }

    /// Number of replaced fields.
    pub fn replacements(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, FieldOp::Replace { .. }))
            .count()
    }

    /// Replay the operations onto `target`.
    ///
    /// Setting a map onto an existing map overlays it, so keys present only
    /// in `target` survive. Missing intermediate maps are created. Removing
    /// a field that does not exist is a no-op.
    pub fn apply(&self, target: &mut Value) {
        for op in &self.ops {
            match op {
                FieldOp::Add { path, value } | FieldOp::Replace { path, value } => {
                    set_at(target, path.segments(), value);
                }
                FieldOp::Remove { path } => remove_at(target, path.segments()),
            }
        }
    }

    /// Render as an RFC 7396 JSON merge-patch document (removal = `null`).
    pub fn to_merge_patch(&self) -> Value {
        let mut doc = Value::Object(Map::new());
        for op in &self.ops {
            let value = match op {
                FieldOp::Add { value, .. } | FieldOp::Replace { value, .. } => value.clone(),
                FieldOp::Remove { .. } => Value::Null,
            };
            let segments = op.path().segments();
            let Some((leaf, parents)) = segments.split_last() else {
                // Root replacement: the document is the new value.
                doc = value;
                continue;
            };
            let mut slot = &mut doc;
            for key in parents {
                slot = ensure_object(slot)
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
            }
            ensure_object(slot).insert(leaf.clone(), value);
        }
        doc
    }
}

fn diff_values(path: &FieldPath, old: &Value, new: &Value, ops: &mut Vec<FieldOp>) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let mut keys: Vec<&String> = old_map.keys().chain(new_map.keys()).collect();
            keys.sort_unstable();
            keys.dedup();

            for key in keys {
                let child = path.child(key);
                match (old_map.get(key), new_map.get(key)) {
                    (Some(old_val), Some(new_val)) => diff_values(&child, old_val, new_val, ops),
                    (Some(_), None) => ops.push(FieldOp::Remove { path: child }),
                    (None, Some(new_val)) => ops.push(FieldOp::Add {
                        path: child,
                        value: new_val.clone(),
                    }),
                    (None, None) => {}
                }
            }
        }
        _ if old != new => ops.push(FieldOp::Replace {
            path: path.clone(),
            value: new.clone(),
        }),
        _ => {}
    }
}

fn ensure_object(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

fn set_at(target: &mut Value, segments: &[String], value: &Value) {
    match segments.split_first() {
        None => overlay(target, value),
        Some((key, rest)) => {
            let slot = ensure_object(target)
                .entry(key.clone())
                .or_insert(Value::Null);
            set_at(slot, rest, value);
        }
    }
}

fn overlay(slot: &mut Value, value: &Value) {
    match (slot, value) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, item) in incoming {
                overlay(existing.entry(key.clone()).or_insert(Value::Null), item);
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

fn remove_at(target: &mut Value, segments: &[String]) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut slot = target;
    for key in parents {
        match slot.get_mut(key.as_str()) {
            Some(next) => slot = next,
            None => return,
        }
    }
    if let Value::Object(map) = slot {
        map.remove(leaf);
    }
}

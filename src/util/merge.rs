//! Deep merge and clone over `serde_json::Value`.
//!
//! Used to layer partial JSON configuration over defaults and to produce
//! structurally independent copies of queued tasks for snapshots.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How two arrays found at the same path are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayMerge {
    /// The source array replaces the target array.
    Clone,
    /// Source elements replace target elements at the same index.
    Overwrite,
    /// Source elements are appended after the target elements.
    Concat,
    /// Source elements are appended unless an equal primitive is already present.
    /// Objects sharing the configured identity key are merged in place.
    #[default]
    Combine,
}

/// How two properties present on both sides are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyMerge {
    /// Objects and arrays are merged recursively, everything else is replaced.
    #[default]
    Merge,
    /// The target value is kept untouched.
    Preserve,
    /// The property is dropped from the result.
    Suppress,
}

/// Options controlling [`deep_merge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Array resolution.
    pub array_merge: ArrayMerge,
    /// Property resolution.
    pub property_merge: PropertyMerge,
    /// Keep source properties that the target lacks.
    pub copy_source_missing_on_target: bool,
    /// Keep target properties that the source lacks.
    pub copy_target_missing_on_source: bool,
    /// Drop properties whose value is equal on both sides.
    pub suppress_equal_properties: bool,
    /// Field identifying records inside arrays merged with [`ArrayMerge::Combine`].
    pub identity_key: Option<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            array_merge: ArrayMerge::Combine,
            property_merge: PropertyMerge::Merge,
            copy_source_missing_on_target: true,
            copy_target_missing_on_source: true,
            suppress_equal_properties: false,
            identity_key: None,
        }
    }
}

impl MergeOptions {
    /// Set the array resolution.
    #[must_use]
    pub const fn with_array_merge(mut self, array_merge: ArrayMerge) -> Self {
        self.array_merge = array_merge;
        self
    }

    /// Set the property resolution.
    #[must_use]
    pub const fn with_property_merge(mut self, property_merge: PropertyMerge) -> Self {
        self.property_merge = property_merge;
        self
    }

    /// Set the identity key used when combining arrays of records.
    #[must_use]
    pub fn with_identity_key(mut self, key: impl Into<String>) -> Self {
        self.identity_key = Some(key.into());
        self
    }
}

/// Merge `source` into a fresh copy of `target`.
///
/// Values of different kinds are never merged: the source wins unless
/// properties are preserved.
pub fn deep_merge(target: &Value, source: &Value, options: &MergeOptions) -> Value {
    let preserve = options.property_merge == PropertyMerge::Preserve;
    match (target, source) {
        (Value::Array(t), Value::Array(s)) => {
            if preserve {
                target.clone()
            } else {
                Value::Array(merge_array(t, s, options))
            }
        }
        (Value::Object(t), Value::Object(s)) => Value::Object(merge_object(t, s, options)),
        _ if preserve => target.clone(),
        _ => source.clone(),
    }
}

/// Merge `source` into `target` in place.
pub fn deep_assign(target: &mut Value, source: &Value, options: &MergeOptions) {
    let merged = deep_merge(target, source, options);
    *target = merged;
}

/// Structurally independent copy of any serializable value.
///
/// Goes through `serde_json::Value`, so shared ownership inside `value`
/// (e.g. `Arc` fields) is not shared by the copy.
///
/// # Errors
///
/// Returns the serde error when `value` does not survive a JSON round trip.
pub fn deep_clone<T>(value: &T) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    serde_json::from_value(serde_json::to_value(value)?)
}

fn merge_array(target: &[Value], source: &[Value], options: &MergeOptions) -> Vec<Value> {
    match options.array_merge {
        ArrayMerge::Clone => source.to_vec(),
        ArrayMerge::Overwrite => {
            let mut out = target.to_vec();
            for (i, value) in source.iter().enumerate() {
                if i < out.len() {
                    out[i] = value.clone();
                } else {
                    out.push(value.clone());
                }
            }
            out
        }
        ArrayMerge::Concat => target.iter().chain(source).cloned().collect(),
        ArrayMerge::Combine => combine_array(target, source, options),
    }
}

fn combine_array(target: &[Value], source: &[Value], options: &MergeOptions) -> Vec<Value> {
    let mut out = target.to_vec();
    for value in source {
        match value {
            Value::Object(record) => {
                let identity = options
                    .identity_key
                    .as_deref()
                    .and_then(|key| record.get(key).map(|id| (key, id)));
                let existing = identity.and_then(|(key, id)| {
                    out.iter()
                        .position(|v| v.get(key).is_some_and(|other| other == id))
                });
                match existing {
                    Some(idx) => out[idx] = deep_merge(&out[idx], value, options),
                    None => out.push(value.clone()),
                }
            }
            Value::Array(_) | Value::Null => out.push(value.clone()),
            primitive => {
                if !out.contains(primitive) {
                    out.push(primitive.clone());
                }
            }
        }
    }
    out
}

fn merge_object(
    target: &Map<String, Value>,
    source: &Map<String, Value>,
    options: &MergeOptions,
) -> Map<String, Value> {
    let suppress_on_both = options.property_merge == PropertyMerge::Suppress;
    let equal = |key: &str| {
        options.suppress_equal_properties && target.get(key) == source.get(key)
    };

    let mut out = Map::new();
    for (key, value) in target {
        let on_source = source.contains_key(key);
        let keep = options.copy_target_missing_on_source || on_source;
        let suppress = (suppress_on_both && on_source) || equal(key);
        if keep && !suppress {
            out.insert(key.clone(), value.clone());
        }
    }

    for (key, value) in source {
        let on_target = target.get(key);
        let keep = options.copy_source_missing_on_target || on_target.is_some();
        let suppress = (suppress_on_both && on_target.is_some()) || equal(key);
        if !keep || suppress {
            continue;
        }
        let merged = match on_target {
            Some(existing) => deep_merge(existing, value, options),
            None => value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects_merge() {
        let target = json!({"a": 1, "nested": {"x": 1, "y": 2}});
        let source = json!({"b": 2, "nested": {"y": 3, "z": 4}});
        let merged = deep_merge(&target, &source, &MergeOptions::default());
        assert_eq!(merged, json!({"a": 1, "b": 2, "nested": {"x": 1, "y": 3, "z": 4}}));
    }

    #[test]
    fn test_kind_mismatch_source_wins() {
        let merged = deep_merge(&json!({"a": [1, 2]}), &json!({"a": "flat"}), &MergeOptions::default());
        assert_eq!(merged, json!({"a": "flat"}));
    }

    #[test]
    fn test_preserve_keeps_target() {
        let options = MergeOptions::default().with_property_merge(PropertyMerge::Preserve);
        let merged = deep_merge(&json!({"a": 1, "b": [1]}), &json!({"a": 2, "b": [2], "c": 3}), &options);
        assert_eq!(merged, json!({"a": 1, "b": [1], "c": 3}));
    }

    #[test]
    fn test_suppress_drops_shared_keys() {
        let options = MergeOptions::default().with_property_merge(PropertyMerge::Suppress);
        let merged = deep_merge(&json!({"a": 1, "b": 2}), &json!({"b": 3, "c": 4}), &options);
        assert_eq!(merged, json!({"a": 1, "c": 4}));
    }

    #[test]
    fn test_suppress_equal_properties() {
        let options = MergeOptions {
            suppress_equal_properties: true,
            ..MergeOptions::default()
        };
        let merged = deep_merge(&json!({"a": 1, "b": 2}), &json!({"a": 1, "b": 5}), &options);
        assert_eq!(merged, json!({"b": 5}));
    }

    #[test]
    fn test_missing_property_flags() {
        let options = MergeOptions {
            copy_source_missing_on_target: false,
            copy_target_missing_on_source: false,
            ..MergeOptions::default()
        };
        let merged = deep_merge(&json!({"a": 1, "b": 2}), &json!({"b": 3, "c": 4}), &options);
        assert_eq!(merged, json!({"b": 3}));
    }

    #[test]
    fn test_array_resolutions() {
        let t = json!([1, 2, 3]);
        let s = json!([3, 4]);
        let with = |mode| deep_merge(&t, &s, &MergeOptions::default().with_array_merge(mode));
        assert_eq!(with(ArrayMerge::Clone), json!([3, 4]));
        assert_eq!(with(ArrayMerge::Overwrite), json!([3, 4, 3]));
        assert_eq!(with(ArrayMerge::Concat), json!([1, 2, 3, 3, 4]));
        assert_eq!(with(ArrayMerge::Combine), json!([1, 2, 3, 4]));
    }

    #[test]
    fn test_combine_merges_records_by_identity() {
        let options = MergeOptions::default().with_identity_key("id");
        let t = json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]);
        let s = json!([{"id": 2, "done": true}, {"id": 3, "name": "c"}]);
        let merged = deep_merge(&t, &s, &options);
        assert_eq!(
            merged,
            json!([
                {"id": 1, "name": "a"},
                {"id": 2, "name": "b", "done": true},
                {"id": 3, "name": "c"}
            ])
        );
    }

    #[test]
    fn test_deep_assign_in_place() {
        let mut target = json!({"limits": {"max": 1}});
        deep_assign(&mut target, &json!({"limits": {"window": 2}}), &MergeOptions::default());
        assert_eq!(target, json!({"limits": {"max": 1, "window": 2}}));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let original = json!({"tags": ["a"], "meta": {"n": 1}});
        let mut copy = deep_clone(&original).unwrap();
        assert_eq!(copy, original);
        copy["tags"][0] = json!("changed");
        assert_eq!(original["tags"][0], json!("a"));
    }
}

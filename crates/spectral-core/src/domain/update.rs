//! Guarded field appliers used by [`SpectralObject::touch`].
//!
//! Each applier inspects one field of a raw update and either applies it or
//! leaves the target untouched. None of them can fail.
//!
//! [`SpectralObject::touch`]: super::object::SpectralObject::touch

use serde_json::{Map, Value};

/// Fields `touch` is allowed to change, in application order.
pub const UPDATABLE_FIELDS: &[&str] = &[
    "stability",
    "drift",
    "confidence",
    "relationships",
    "metadata",
];

/// Replace `slot` when `value` is a JSON number.
pub(crate) fn apply_metric(slot: &mut f64, value: Option<&Value>) -> bool {
    match value.and_then(Value::as_f64) {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

/// Replace `slot` wholesale when `value` is a JSON array.
pub(crate) fn apply_relationships(slot: &mut Vec<Value>, value: Option<&Value>) -> bool {
    match value.and_then(Value::as_array) {
        Some(items) => {
            *slot = items.clone();
            true
        }
        None => false,
    }
}

/// Shallow-merge `value` into `slot` when it is a JSON object.
///
/// Incoming keys override existing ones; keys absent from the update survive.
pub(crate) fn apply_metadata(slot: &mut Map<String, Value>, value: Option<&Value>) -> bool {
    match value.and_then(Value::as_object) {
        Some(incoming) => {
            for (k, v) in incoming {
                slot.insert(k.clone(), v.clone());
            }
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_applies_numbers_only() {
        let mut slot = 0.25;
        assert!(!apply_metric(&mut slot, Some(&json!("0.9"))));
        assert!(!apply_metric(&mut slot, Some(&Value::Null)));
        assert!(!apply_metric(&mut slot, None));
        assert_eq!(slot, 0.25);

        assert!(apply_metric(&mut slot, Some(&json!(1))));
        assert_eq!(slot, 1.0);
        assert!(apply_metric(&mut slot, Some(&json!(-0.5))));
        assert_eq!(slot, -0.5);
    }

    #[test]
    fn test_relationships_replace_wholesale() {
        let mut slot = vec![json!("refines:a")];
        assert!(!apply_relationships(&mut slot, Some(&json!({"0": "x"}))));
        assert_eq!(slot.len(), 1);

        assert!(apply_relationships(&mut slot, Some(&json!([]))));
        assert!(slot.is_empty());
    }

    #[test]
    fn test_metadata_shallow_union() {
        let mut slot = json!({"a": 1, "b": 2}).as_object().cloned().unwrap();
        assert!(apply_metadata(&mut slot, Some(&json!({"b": 3, "c": 4}))));
        assert_eq!(Value::Object(slot), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_metadata_merge_is_shallow() {
        let mut slot = json!({"nested": {"x": 1, "y": 2}})
            .as_object()
            .cloned()
            .unwrap();
        apply_metadata(&mut slot, Some(&json!({"nested": {"x": 9}})));
        assert_eq!(slot["nested"], json!({"x": 9}));
    }

    #[test]
    fn test_metadata_ignores_non_objects() {
        let mut slot = json!({"a": 1}).as_object().cloned().unwrap();
        assert!(!apply_metadata(&mut slot, Some(&Value::Null)));
        assert!(!apply_metadata(&mut slot, Some(&json!(["a"]))));
        assert!(!apply_metadata(&mut slot, Some(&json!("tag"))));
        assert_eq!(Value::Object(slot), json!({"a": 1}));
    }
}

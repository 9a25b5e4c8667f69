//! The spectral object record and its plain snapshot projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ValidationError;
use super::update::{apply_metadata, apply_metric, apply_relationships, UPDATABLE_FIELDS};

/// A catalogued artifact with provenance, shape signature and quality metrics.
///
/// `id`, `kind` and `origin` are fixed at construction. The metrics,
/// relationships and metadata change only through [`SpectralObject::touch`].
#[derive(Debug, Clone)]
pub struct SpectralObject {
    id: String,
    kind: String,
    origin: Value,
    signature: Value,
    stability: f64,
    drift: f64,
    confidence: f64,
    relationships: Vec<Value>,
    metadata: Map<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SpectralObject {
    /// Build a record from a raw JSON object.
    ///
    /// `id` and `kind` must be non-empty strings and `origin` must be truthy.
    /// Optional fields fall back to their defaults when absent or of the
    /// wrong type.
    ///
    /// # Errors
    ///
    /// - `ValidationError::NotAnObject` - `raw` is not a JSON object.
    /// - `ValidationError::MissingField` - `id`, `kind` or `origin` is absent,
    ///   falsy, or (for `id`/`kind`) not a string.
    pub fn from_raw(raw: &Value, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let fields = raw.as_object().ok_or(ValidationError::NotAnObject)?;

        let id = required_str(fields, "id")?;
        let kind = required_str(fields, "kind")?;
        let origin = fields
            .get("origin")
            .filter(|v| is_truthy(v))
            .cloned()
            .ok_or(ValidationError::MissingField { field: "origin" })?;

        let signature = fields
            .get("signature")
            .filter(|v| is_truthy(v))
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        let mut obj = Self {
            id,
            kind,
            origin,
            signature,
            stability: 0.0,
            drift: 0.0,
            confidence: 0.0,
            relationships: Vec::new(),
            metadata: Map::new(),
            created_at: now,
            updated_at: now,
        };
        apply_metric(&mut obj.stability, fields.get("stability"));
        apply_metric(&mut obj.drift, fields.get("drift"));
        apply_metric(&mut obj.confidence, fields.get("confidence"));
        apply_relationships(&mut obj.relationships, fields.get("relationships"));
        apply_metadata(&mut obj.metadata, fields.get("metadata"));
        Ok(obj)
    }

    /// Apply a partial update and refresh `updatedAt`.
    ///
    /// Recognised fields are `stability`, `drift`, `confidence`
    /// (numbers), `relationships` (array, replaced) and `metadata`
    /// (object, shallow-merged). Anything else, including wrongly typed
    /// values for those fields, is ignored.
    pub fn touch(&mut self, update: &Value, now: DateTime<Utc>) -> &mut Self {
        self.apply_update(update, now);
        self
    }

    /// Same as [`touch`](Self::touch) but reports which fields were applied.
    pub(crate) fn apply_update(
        &mut self,
        update: &Value,
        now: DateTime<Utc>,
    ) -> Vec<&'static str> {
        let mut applied = Vec::new();
        if let Some(fields) = update.as_object() {
            for &field in UPDATABLE_FIELDS {
                let value = fields.get(field);
                let changed = match field {
                    "stability" => apply_metric(&mut self.stability, value),
                    "drift" => apply_metric(&mut self.drift, value),
                    "confidence" => apply_metric(&mut self.confidence, value),
                    "relationships" => apply_relationships(&mut self.relationships, value),
                    "metadata" => apply_metadata(&mut self.metadata, value),
                    _ => false,
                };
                if changed {
                    applied.push(field);
                }
            }
        }
        // never move backwards, even if the clock does
        self.updated_at = self.updated_at.max(now);
        applied
    }

    /// Plain, owned projection of every field.
    pub fn to_snapshot(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            id: self.id.clone(),
            kind: self.kind.clone(),
            origin: self.origin.clone(),
            signature: self.signature.clone(),
            stability: self.stability,
            drift: self.drift,
            confidence: self.confidence,
            relationships: self.relationships.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// The snapshot projection as a JSON value.
    pub fn to_json(&self) -> Value {
        // ObjectSnapshot holds only JSON-native data and string timestamps
        serde_json::to_value(self.to_snapshot()).unwrap_or(Value::Null)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn origin(&self) -> &Value {
        &self.origin
    }

    /// `origin.domain`, when the origin is an object with a string domain.
    pub fn origin_domain(&self) -> Option<&str> {
        self.origin.get("domain").and_then(Value::as_str)
    }

    pub fn signature(&self) -> &Value {
        &self.signature
    }

    pub fn stability(&self) -> f64 {
        self.stability
    }

    pub fn drift(&self) -> f64 {
        self.drift
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn relationships(&self) -> &[Value] {
        &self.relationships
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Exported shape of a [`SpectralObject`].
///
/// Field names and timestamp format match the interchange convention used by
/// existing snapshot consumers: camelCase keys, ISO-8601 UTC timestamps with
/// millisecond precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSnapshot {
    pub id: String,
    pub kind: String,
    pub origin: Value,
    pub signature: Value,
    pub stability: f64,
    pub drift: f64,
    pub confidence: f64,
    pub relationships: Vec<Value>,
    pub metadata: Map<String, Value>,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub updated_at: DateTime<Utc>,
}

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy; every
/// array and object, empty or not, is truthy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn required_str(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    fields
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ValidationError::MissingField { field })
}

/// `2026-01-22T22:08:00.000Z` style timestamps.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 22, 22, 8, 0).unwrap()
    }

    fn checkout() -> Value {
        json!({
            "id": "checkout_latency_spike#1",
            "kind": "trace_pattern",
            "origin": {"domain": "shop.example.com", "system": "checkout_service"},
        })
    }

    #[test]
    fn test_defaults_applied() {
        let obj = SpectralObject::from_raw(&checkout(), t0()).unwrap();
        assert_eq!(obj.signature(), &json!({}));
        assert_eq!(obj.stability(), 0.0);
        assert_eq!(obj.drift(), 0.0);
        assert_eq!(obj.confidence(), 0.0);
        assert!(obj.relationships().is_empty());
        assert!(obj.metadata().is_empty());
        assert_eq!(obj.created_at(), t0());
        assert_eq!(obj.updated_at(), t0());
    }

    #[test]
    fn test_wrongly_typed_optionals_fall_back() {
        let mut raw = checkout();
        raw["stability"] = json!("high");
        raw["drift"] = json!(null);
        raw["confidence"] = json!(0.93);
        raw["relationships"] = json!("refines:base");
        raw["metadata"] = json!(["performance"]);
        raw["signature"] = json!(0);

        let obj = SpectralObject::from_raw(&raw, t0()).unwrap();
        assert_eq!(obj.stability(), 0.0);
        assert_eq!(obj.drift(), 0.0);
        assert_eq!(obj.confidence(), 0.93);
        assert!(obj.relationships().is_empty());
        assert!(obj.metadata().is_empty());
        assert_eq!(obj.signature(), &json!({}));
    }

    #[test]
    fn test_required_fields_rejected_when_falsy() {
        for (field, bad) in [
            ("id", json!("")),
            ("id", Value::Null),
            ("id", json!(7)),
            ("kind", json!("")),
            ("origin", Value::Null),
            ("origin", json!(0)),
            ("origin", json!(false)),
            ("origin", json!("")),
        ] {
            let mut raw = checkout();
            raw[field] = bad.clone();
            let err = SpectralObject::from_raw(&raw, t0()).unwrap_err();
            assert_eq!(
                err,
                ValidationError::MissingField { field },
                "{field} = {bad}"
            );
        }
    }

    #[test]
    fn test_absent_required_field_rejected() {
        let raw = json!({"id": "a", "origin": {"domain": "d"}});
        assert_eq!(
            SpectralObject::from_raw(&raw, t0()).unwrap_err(),
            ValidationError::MissingField { field: "kind" }
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            SpectralObject::from_raw(&json!(["a"]), t0()).unwrap_err(),
            ValidationError::NotAnObject
        );
    }

    #[test]
    fn test_empty_origin_object_is_accepted() {
        let raw = json!({"id": "a", "kind": "k", "origin": {}});
        let obj = SpectralObject::from_raw(&raw, t0()).unwrap();
        assert_eq!(obj.origin_domain(), None);
    }

    #[test]
    fn test_touch_keeps_identity_fields() {
        let mut obj = SpectralObject::from_raw(&checkout(), t0()).unwrap();
        let later = t0() + Duration::seconds(5);
        obj.touch(
            &json!({
                "id": "other",
                "kind": "dom-sheet",
                "origin": {"domain": "elsewhere"},
                "signature": {"summary": "new"},
                "createdAt": "1999-01-01T00:00:00.000Z",
                "stability": 0.7,
            }),
            later,
        );
        assert_eq!(obj.id(), "checkout_latency_spike#1");
        assert_eq!(obj.kind(), "trace_pattern");
        assert_eq!(obj.origin_domain(), Some("shop.example.com"));
        assert_eq!(obj.signature(), &json!({}));
        assert_eq!(obj.created_at(), t0());
        assert_eq!(obj.updated_at(), later);
        assert_eq!(obj.stability(), 0.7);
    }

    #[test]
    fn test_touch_chains() {
        let mut obj = SpectralObject::from_raw(&checkout(), t0()).unwrap();
        obj.touch(&json!({"drift": 0.1}), t0())
            .touch(&json!({"confidence": 0.5}), t0());
        assert_eq!(obj.drift(), 0.1);
        assert_eq!(obj.confidence(), 0.5);
    }

    #[test]
    fn test_touch_refreshes_timestamp_without_changes() {
        let mut obj = SpectralObject::from_raw(&checkout(), t0()).unwrap();
        let later = t0() + Duration::milliseconds(1);
        let applied = obj.apply_update(&json!({"unknown": true}), later);
        assert!(applied.is_empty());
        assert_eq!(obj.updated_at(), later);
    }

    #[test]
    fn test_touch_applies_every_updatable_field_in_order() {
        let mut obj = SpectralObject::from_raw(&checkout(), t0()).unwrap();
        let applied = obj.apply_update(
            &json!({
                "metadata": {"tag": "perf"},
                "relationships": [{"type": "refines", "target": "base"}],
                "confidence": 0.7,
                "drift": 0.2,
                "stability": 0.9,
                "kind": "ignored",
            }),
            t0(),
        );
        assert_eq!(applied, UPDATABLE_FIELDS);
        assert_eq!(obj.stability(), 0.9);
        assert_eq!(obj.metadata()["tag"], json!("perf"));
        assert_eq!(obj.kind(), "trace_pattern");
    }

    #[test]
    fn test_touch_never_moves_updated_at_backwards() {
        let mut obj = SpectralObject::from_raw(&checkout(), t0()).unwrap();
        obj.touch(&json!({}), t0() - Duration::seconds(30));
        assert_eq!(obj.updated_at(), t0());
        assert!(obj.updated_at() >= obj.created_at());
    }

    #[test]
    fn test_snapshot_shape() {
        let obj = SpectralObject::from_raw(&checkout(), t0()).unwrap();
        let json = obj.to_json();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        for expected in [
            "id",
            "kind",
            "origin",
            "signature",
            "stability",
            "drift",
            "confidence",
            "relationships",
            "metadata",
            "createdAt",
            "updatedAt",
        ] {
            assert!(keys.contains(&expected), "missing {expected}");
        }
        assert_eq!(keys.len(), 11);
        assert_eq!(json["createdAt"], json!("2026-01-22T22:08:00.000Z"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut obj = SpectralObject::from_raw(&checkout(), t0()).unwrap();
        let snap = obj.to_snapshot();
        obj.touch(&json!({"metadata": {"tag": "x"}, "stability": 1.0}), t0());
        assert!(snap.metadata.is_empty());
        assert_eq!(snap.stability, 0.0);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!("x")));
    }
}

//! Snapshot export: NDJSON sniffing view, pretty JSON file, content digest.
//!
//! The digest is a SHA-256 over a canonical rendering of the snapshot
//! (integer-valued floats written as integers, object keys sorted by UTF-16
//! code units, compact separators), so two registries holding the same
//! records in the same order hash identically. `1` and `1.0` are the same
//! value here.

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::error::{Result, SpectralError};
use crate::domain::object::ObjectSnapshot;

/// Write one compact JSON object per line. Returns the number of lines.
pub fn write_snapshot_ndjson<W: Write>(
    mut writer: W,
    snapshot: &[ObjectSnapshot],
) -> Result<usize> {
    for obj in snapshot {
        serde_json::to_writer(&mut writer, obj)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(snapshot.len())
}

/// Write the snapshot to `path` as a pretty-printed JSON array.
pub fn write_snapshot_json(path: &Path, snapshot: &[ObjectSnapshot]) -> Result<()> {
    let content = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Hex SHA-256 of the canonical JSON form of `snapshot`.
pub fn snapshot_digest(snapshot: &[ObjectSnapshot]) -> Result<String> {
    let value = normalize_numbers(&serde_json::to_value(snapshot)?)?;
    let mut canonical = String::new();
    write_canonical(&value, &mut canonical)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

/// Rewrite integer-valued floats as integers; reject NaN and infinities.
fn normalize_numbers(value: &Value) -> Result<Value> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Ok((k.clone(), normalize_numbers(v)?)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(Value::Object),
        Value::Array(items) => items
            .iter()
            .map(normalize_numbers)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            if !f.is_finite() {
                return Err(SpectralError::NonCanonical(format!(
                    "non-finite number {}",
                    f
                )));
            }
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Ok(Value::from(f as i64))
            } else {
                Ok(value.clone())
            }
        }
        other => Ok(other.clone()),
    }
}

fn write_canonical(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                if let Some(v) = map.get(key) {
                    write_canonical(v, out)?;
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::registry::SpectralRegistry;
    use serde_json::json;

    fn two_object_snapshot() -> Vec<ObjectSnapshot> {
        let mut reg = SpectralRegistry::with_clock(ManualClock::from_millis(0));
        reg.upsert(&json!({
            "id": "a",
            "kind": "k",
            "origin": {"domain": "d", "system": "s"},
        }))
        .unwrap();
        reg.upsert(&json!({"id": "b", "kind": "k", "origin": {"domain": "d"}}))
            .unwrap();
        reg.snapshot()
    }

    #[test]
    fn test_ndjson_one_line_per_object() {
        let snapshot = two_object_snapshot();
        let mut buf = Vec::new();
        let written = write_snapshot_ndjson(&mut buf, &snapshot).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: ObjectSnapshot = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, snapshot[0]);
        assert!(lines[1].contains("\"createdAt\":\"1970-01-01T00:00:00.000Z\""));
    }

    #[test]
    fn test_digest_is_stable_and_order_sensitive() {
        let snapshot = two_object_snapshot();
        let d1 = snapshot_digest(&snapshot).unwrap();
        let d2 = snapshot_digest(&snapshot).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);

        let reversed: Vec<ObjectSnapshot> = snapshot.iter().rev().cloned().collect();
        assert_ne!(d1, snapshot_digest(&reversed).unwrap());
    }

    #[test]
    fn test_digest_ignores_key_order_inside_values() {
        let mut a = two_object_snapshot();
        let mut b = a.clone();
        a[0].origin = json!({"domain": "d", "system": "s"});
        b[0].origin = json!({"system": "s", "domain": "d"});
        assert_eq!(snapshot_digest(&a).unwrap(), snapshot_digest(&b).unwrap());
    }

    #[test]
    fn test_canonical_form_is_compact_and_sorted() {
        let mut out = String::new();
        write_canonical(&json!({"b": [1, "x"], "a": {"d": null, "c": true}}), &mut out).unwrap();
        assert_eq!(out, r#"{"a":{"c":true,"d":null},"b":[1,"x"]}"#);
    }

    #[test]
    fn test_digest_treats_integral_floats_as_integers() {
        let mut a = two_object_snapshot();
        let mut b = a.clone();
        a[0].metadata = json!({"n": 1}).as_object().cloned().unwrap();
        b[0].metadata = json!({"n": 1.0}).as_object().cloned().unwrap();
        assert_eq!(snapshot_digest(&a).unwrap(), snapshot_digest(&b).unwrap());

        b[0].metadata = json!({"n": 1.5}).as_object().cloned().unwrap();
        assert_ne!(snapshot_digest(&a).unwrap(), snapshot_digest(&b).unwrap());
    }

    #[test]
    fn test_normalize_numbers_rewrites_nested_values() {
        let normalized = normalize_numbers(&json!({"a": [2.0, 0.5], "b": {"c": -3.0}})).unwrap();
        let mut out = String::new();
        write_canonical(&normalized, &mut out).unwrap();
        assert_eq!(out, r#"{"a":[2,0.5],"b":{"c":-3}}"#);
    }

    #[test]
    fn test_empty_snapshot_digest() {
        let digest = snapshot_digest(&[]).unwrap();
        // sha256("[]")
        assert_eq!(
            digest,
            "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945"
        );
    }
}

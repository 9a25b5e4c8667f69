//! In-memory registry of spectral objects keyed by id.
//!
//! Records enter only through [`SpectralRegistry::upsert`] and are never
//! removed. Iteration, queries and snapshots all follow insertion order.

use indexmap::IndexMap;
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::config::DEFAULT_STABILITY_THRESHOLD;
use crate::domain::error::ValidationError;
use crate::domain::object::{ObjectSnapshot, SpectralObject};
use crate::obs;

/// A caller-owned catalog of [`SpectralObject`]s.
#[derive(Debug, Clone)]
pub struct SpectralRegistry<C = SystemClock> {
    objects: IndexMap<String, SpectralObject>,
    clock: C,
}

impl SpectralRegistry<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for SpectralRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SpectralRegistry<C> {
    /// Empty registry stamping records with `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            objects: IndexMap::new(),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Insert a new record or touch the existing one with the same id.
    ///
    /// On the update path only the touchable fields of `raw` are applied;
    /// `kind`, `origin` and `signature` are ignored.
    ///
    /// # Errors
    ///
    /// Returns the construction `ValidationError` when the id is unseen and
    /// `raw` lacks a valid `id`, `kind` or `origin`. The registry is left
    /// unchanged in that case.
    pub fn upsert(&mut self, raw: &Value) -> Result<&SpectralObject, ValidationError> {
        let now = self.clock.now();

        let existing = raw
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| self.objects.get_index_of(id));

        if let Some(index) = existing {
            let obj = &mut self.objects[index];
            let applied = obj.apply_update(raw, now);
            obs::emit_object_touched(obj.id(), &applied);
            return Ok(&*obj);
        }

        let obj = match SpectralObject::from_raw(raw, now) {
            Ok(obj) => obj,
            Err(e) => {
                obs::emit_upsert_rejected(&e);
                return Err(e);
            }
        };
        obs::emit_object_created(obj.id(), obj.kind());
        let (index, _) = self.objects.insert_full(obj.id().to_string(), obj);
        Ok(&self.objects[index])
    }

    pub fn get_by_id(&self, id: &str) -> Option<&SpectralObject> {
        self.objects.get(id)
    }

    /// Records whose `kind` equals `kind` exactly.
    pub fn list_by_kind(&self, kind: &str) -> Vec<&SpectralObject> {
        self.objects.values().filter(|o| o.kind() == kind).collect()
    }

    /// Records with `stability >= threshold` and `drift <= 1 - threshold`.
    ///
    /// The threshold is taken as given: `0.0` admits nearly everything,
    /// anything above `1.0` admits nothing with a conventional drift.
    pub fn list_high_stability(&self, threshold: f64) -> Vec<&SpectralObject> {
        self.objects
            .values()
            .filter(|o| o.stability() >= threshold && o.drift() <= 1.0 - threshold)
            .collect()
    }

    /// [`list_high_stability`](Self::list_high_stability) at
    /// [`DEFAULT_STABILITY_THRESHOLD`].
    pub fn list_high_stability_default(&self) -> Vec<&SpectralObject> {
        self.list_high_stability(DEFAULT_STABILITY_THRESHOLD)
    }

    /// Records whose `origin.domain` is the string `domain`.
    pub fn list_by_origin_domain(&self, domain: &str) -> Vec<&SpectralObject> {
        self.objects
            .values()
            .filter(|o| o.origin_domain() == Some(domain))
            .collect()
    }

    /// Owned projections of every record, detached from the registry.
    pub fn snapshot(&self) -> Vec<ObjectSnapshot> {
        self.objects.values().map(SpectralObject::to_snapshot).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpectralObject> {
        self.objects.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

//! Spectral vision: band safety, hygiene and the catalog promotion gate.
//!
//! A record's stability and confidence, together with per-band power
//! statistics from the excavator, decide two things:
//!
//! - whether the record is promoted into the curated catalog
//!   ([`passes_promotion_gate`]), and
//! - how deep the next excavation pass may dig ([`ExcavationDepth`]).
//!
//! Every score is clamped to `[0, 1]`; non-finite inputs count as `0`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::object::SpectralObject;
use crate::obs;

/// Hazard band assigned from a band's safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandHazardClass {
    Safe,
    Elevated,
    High,
}

/// Raw per-band power statistics, normalised to `[0, 1]` by the excavator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSample {
    pub band_index: i32,
    pub mean_power: f64,
    pub stddev_power: f64,
}

impl BandSample {
    pub fn new(band_index: i32, mean_power: f64, stddev_power: f64) -> Self {
        Self {
            band_index,
            mean_power,
            stddev_power,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSafetyEntry {
    pub band_index: i32,
    pub mean_power: f64,
    pub stddev_power: f64,
    pub safety_score: f64,
    pub hazard_class: BandHazardClass,
}

/// Per-band safety plus the minimum and mean over all bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSafetyProfile {
    pub bands: Vec<BandSafetyEntry>,
    pub safety_min: f64,
    pub safety_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralHygiene {
    pub band_quality: f64,
    pub artifact_level: f64,
    pub safe_band_fraction: f64,
}

/// How far an excavation pass may go. Ordered shallowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcavationDepth {
    Sniff,
    DigLight,
    DigFull,
}

/// Operating mode of the excavation governance layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceMode {
    #[default]
    Dormant,
    ActiveGoverned,
    /// Quantification without governance; never allowed past a sniff.
    ActiveFree,
    TechnicalOnly,
}

/// Governance switches consulted before any dig deeper than a sniff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceState {
    pub mode: GovernanceMode,
    pub spectral_quantification_active: bool,
    pub soul_modeling_forbidden: bool,
}

impl GovernanceState {
    /// Quantification on, soul modeling forbidden, governed mode.
    pub fn governed() -> Self {
        Self {
            mode: GovernanceMode::ActiveGoverned,
            spectral_quantification_active: true,
            soul_modeling_forbidden: true,
        }
    }

    fn permits_digging(&self) -> bool {
        self.spectral_quantification_active
            && self.soul_modeling_forbidden
            && self.mode != GovernanceMode::ActiveFree
    }
}

impl Default for GovernanceState {
    fn default() -> Self {
        Self {
            mode: GovernanceMode::Dormant,
            spectral_quantification_active: false,
            soul_modeling_forbidden: true,
        }
    }
}

/// Thresholds and weights for the vision pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionParams {
    /// Below this `safety_min` only a sniff is allowed.
    pub safety_low: f64,
    /// At or above this `safety_min` a full dig is allowed; also the
    /// per-band score counted as "safe" by hygiene.
    pub safety_high: f64,
    /// Band scores below this are [`BandHazardClass::High`].
    pub hazard_elevated_max: f64,
    /// Band scores at or above this are [`BandHazardClass::Safe`].
    pub hazard_safe_min: f64,
    pub w_stability: f64,
    pub w_confidence: f64,
    pub w_safety_min: f64,
    pub promotion_threshold: f64,
}

impl Default for VisionParams {
    fn default() -> Self {
        Self {
            safety_low: 0.4,
            safety_high: 0.7,
            hazard_elevated_max: 0.4,
            hazard_safe_min: 0.7,
            w_stability: 0.4,
            w_confidence: 0.4,
            w_safety_min: 0.2,
            promotion_threshold: 0.8,
        }
    }
}

/// Clamp to `[0, 1]`, mapping NaN and infinities to `0`.
pub fn clamp01(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn hazard_class(score: f64, params: &VisionParams) -> BandHazardClass {
    if score < params.hazard_elevated_max {
        BandHazardClass::High
    } else if score < params.hazard_safe_min {
        BandHazardClass::Elevated
    } else {
        BandHazardClass::Safe
    }
}

/// Score each band as `1 - mean - stddev` (clamped) and classify it.
///
/// With no bands there is no evidence of safety: both `safety_min` and
/// `safety_mean` are `0`.
pub fn compute_band_safety(samples: &[BandSample], params: &VisionParams) -> BandSafetyProfile {
    let bands: Vec<BandSafetyEntry> = samples
        .iter()
        .map(|sample| {
            let mean_power = clamp01(sample.mean_power);
            let stddev_power = clamp01(sample.stddev_power);
            let safety_score = clamp01(1.0 - mean_power - stddev_power);
            BandSafetyEntry {
                band_index: sample.band_index,
                mean_power,
                stddev_power,
                safety_score,
                hazard_class: hazard_class(safety_score, params),
            }
        })
        .collect();

    if bands.is_empty() {
        return BandSafetyProfile {
            bands,
            safety_min: 0.0,
            safety_mean: 0.0,
        };
    }

    let safety_min = bands
        .iter()
        .map(|b| b.safety_score)
        .fold(f64::INFINITY, f64::min);
    let safety_mean = bands.iter().map(|b| b.safety_score).sum::<f64>() / bands.len() as f64;

    BandSafetyProfile {
        bands,
        safety_min: clamp01(safety_min),
        safety_mean: clamp01(safety_mean),
    }
}

/// Band quality discounted by the artifact fraction, and the share of
/// bands scoring at least `safe_threshold`.
pub fn compute_spectral_hygiene(
    profile: &BandSafetyProfile,
    artifact_fraction: f64,
    safe_threshold: f64,
) -> SpectralHygiene {
    let band_quality = clamp01(profile.safety_mean * (1.0 - clamp01(artifact_fraction)));
    let safe_band_fraction = if profile.bands.is_empty() {
        0.0
    } else {
        let safe = profile
            .bands
            .iter()
            .filter(|b| b.safety_score >= safe_threshold)
            .count();
        safe as f64 / profile.bands.len() as f64
    };

    SpectralHygiene {
        band_quality,
        artifact_level: clamp01(1.0 - band_quality),
        safe_band_fraction,
    }
}

/// Weighted blend of stability, confidence and `safety_min`.
///
/// Weights are renormalised to sum to one; if they sum to zero or less the
/// score is `0`.
pub fn compute_promotion_score(
    stability: f64,
    confidence: f64,
    safety_min: f64,
    params: &VisionParams,
) -> f64 {
    let total = params.w_stability + params.w_confidence + params.w_safety_min;
    if total.is_nan() || total <= 0.0 {
        return 0.0;
    }
    let score = (params.w_stability * clamp01(stability)
        + params.w_confidence * clamp01(confidence)
        + params.w_safety_min * clamp01(safety_min))
        / total;
    clamp01(score)
}

/// Inclusive: a score equal to the threshold passes.
pub fn passes_promotion_gate(score: f64, params: &VisionParams) -> bool {
    score >= params.promotion_threshold
}

/// Depth allowed by governance first, then by the weakest band.
pub fn compute_excavation_depth(
    profile: &BandSafetyProfile,
    governance: &GovernanceState,
    params: &VisionParams,
) -> ExcavationDepth {
    if !governance.permits_digging() {
        return ExcavationDepth::Sniff;
    }
    if profile.safety_min < params.safety_low {
        ExcavationDepth::Sniff
    } else if profile.safety_min < params.safety_high {
        ExcavationDepth::DigLight
    } else {
        ExcavationDepth::DigFull
    }
}

/// Everything the vision pipeline decided for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionDecision {
    pub band_profile: BandSafetyProfile,
    pub hygiene: SpectralHygiene,
    pub excavation_depth: ExcavationDepth,
    pub promotion_score: f64,
    pub promotion_passed: bool,
}

impl VisionDecision {
    /// Update payload that records this decision under
    /// `metadata.spectralVision`, for use with `upsert`.
    ///
    /// Only the summary is kept; per-band entries stay with the caller.
    pub fn to_update(&self, id: &str) -> Value {
        json!({
            "id": id,
            "metadata": {
                "spectralVision": {
                    "promotionScore": self.promotion_score,
                    "promotionPassed": self.promotion_passed,
                    "excavationDepth": self.excavation_depth,
                    "safetyMin": self.band_profile.safety_min,
                    "bandQuality": self.hygiene.band_quality,
                    "safeBandFraction": self.hygiene.safe_band_fraction,
                },
            },
        })
    }
}

/// Run the whole pipeline from raw inputs.
pub fn evaluate_spectral_vision(
    samples: &[BandSample],
    stability: f64,
    confidence: f64,
    artifact_fraction: f64,
    params: &VisionParams,
    governance: &GovernanceState,
) -> VisionDecision {
    let band_profile = compute_band_safety(samples, params);
    let hygiene = compute_spectral_hygiene(&band_profile, artifact_fraction, params.safety_high);
    let excavation_depth = compute_excavation_depth(&band_profile, governance, params);
    let promotion_score =
        compute_promotion_score(stability, confidence, band_profile.safety_min, params);

    VisionDecision {
        promotion_passed: passes_promotion_gate(promotion_score, params),
        band_profile,
        hygiene,
        excavation_depth,
        promotion_score,
    }
}

/// [`evaluate_spectral_vision`] using the record's own stability and
/// confidence.
pub fn evaluate_object(
    obj: &SpectralObject,
    samples: &[BandSample],
    artifact_fraction: f64,
    params: &VisionParams,
    governance: &GovernanceState,
) -> VisionDecision {
    let decision = evaluate_spectral_vision(
        samples,
        obj.stability(),
        obj.confidence(),
        artifact_fraction,
        params,
        governance,
    );
    obs::emit_vision_evaluated(
        obj.id(),
        decision.promotion_score,
        decision.promotion_passed,
        &decision.excavation_depth,
    );
    decision
}

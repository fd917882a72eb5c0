//! Aggregated pipeline configuration

use super::gate::SignificanceGate;
use super::metrics::{RecoveryParams, RegrowthParams};
use super::trend::TrendFitParams;
use crate::anchors::{EventAnchors, ResolvedAnchors};
use crate::masking::{DisturbanceParams, ValidityParams};
use regrowth_core::{Error, Result, VegetationIndex, YearRange};
use regrowth_parallel::ProcessingMode;
use serde::{Deserialize, Serialize};

/// Every tunable of a recovery run.
///
/// Missing JSON fields take their defaults, so a file only needs the values
/// that differ from the Unzen study setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tag for logs and outputs; never changes the math
    pub vegetation_index: Option<VegetationIndex>,
    pub anchors: EventAnchors,
    pub validity: ValidityParams,
    pub disturbance: DisturbanceParams,
    pub trend: TrendFitParams,
    pub gate: SignificanceGate,
    pub recovery: RecoveryParams,
    pub regrowth: RegrowthParams,
}

fn invalid(name: &'static str, value: impl ToString, reason: &str) -> Error {
    Error::InvalidParameter {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value, "must be a positive finite number"))
    }
}

impl PipelineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Other(format!("invalid config: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Other(e.to_string()))
    }

    /// Reject values no run could use. Anchors are checked separately
    /// against the year axis, see [`PipelineConfig::resolve`].
    pub fn validate(&self) -> Result<()> {
        if self.validity.valid_num == 0 {
            return Err(invalid("valid_num", 0, "no pixel could ever be valid"));
        }
        positive("threshold_fraction", self.disturbance.threshold_fraction)?;
        positive("target_fraction", self.recovery.target_fraction)?;
        positive("max_recovery_years", self.recovery.max_recovery_years)?;
        positive("horizon_years", self.regrowth.horizon_years)?;

        let p = self.gate.max_p_value;
        if !(p > 0.0 && p <= 1.0) {
            return Err(invalid("max_p_value", p, "must be in (0, 1]"));
        }
        let r2 = self.gate.min_r_squared;
        if !(0.0..=1.0).contains(&r2) {
            return Err(invalid("min_r_squared", r2, "must be in [0, 1]"));
        }
        if self.trend.batch_size == Some(0) {
            return Err(invalid("batch_size", 0, "must be at least 1"));
        }
        if self.trend.mode == ProcessingMode::ParallelWith(0) {
            return Err(invalid("threads", 0, "must be at least 1"));
        }
        Ok(())
    }

    /// Resolve the anchors and check the trend window against `range`.
    ///
    /// Any year or offset outside the axis is `InvalidIndex`.
    pub fn resolve(&self, range: &YearRange) -> Result<ResolvedAnchors> {
        let resolved = self.anchors.resolve(range)?;
        let offset = self.trend.window_start_offset;
        if offset >= range.len() {
            return Err(Error::InvalidIndex {
                year: range.first() + offset as i32,
                first: range.first(),
                last: range.last(),
            });
        }
        Ok(resolved)
    }
}

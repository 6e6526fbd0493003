//! Investigator configuration
//!
//! All thresholds and limits used by the pipeline live here. Every section
//! has defaults, so a JSON document only needs to name the values it changes.

use crate::jurisdiction::HighRiskJurisdictions;
use crate::{InvestigationError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Risk detector thresholds and score increments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Lower bound of the structuring band (inclusive)
    pub structuring_floor: f64,
    /// Currency transaction reporting threshold; upper bound of the band (exclusive)
    pub reporting_threshold: f64,
    /// Transaction count above which volume is anomalous
    pub volume_threshold: usize,
    /// Maximum supporting evidence ids per driver
    pub max_evidence_ids: usize,
    /// Window quoted in the rapid-movement description
    pub rapid_movement_hours: u32,
    pub structuring_points: u8,
    pub watch_list_points: u8,
    pub jurisdiction_points: u8,
    pub rapid_movement_points: u8,
    pub round_trip_points: u8,
    pub shell_company_points: u8,
    pub volume_points: u8,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            structuring_floor: 8_000.0,
            reporting_threshold: 10_000.0, // FinCEN CTR requirement
            volume_threshold: 20,
            max_evidence_ids: 5,
            rapid_movement_hours: 48,
            structuring_points: 25,
            watch_list_points: 30,
            jurisdiction_points: 15,
            rapid_movement_points: 20,
            round_trip_points: 25,
            shell_company_points: 10,
            volume_points: 10,
        }
    }
}

/// Section size limits for case reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLimits {
    pub timeline_entries: usize,
    pub linked_parties: usize,
    pub transaction_citations: usize,
    pub pattern_sources: usize,
    pub watch_list_citations: usize,
    /// Number of ranked evidence hits retrieved per report
    pub evidence_top_k: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            timeline_entries: 20,
            linked_parties: 15,
            transaction_citations: 8,
            pattern_sources: 5,
            watch_list_citations: 3,
            evidence_top_k: 10,
        }
    }
}

/// Investigator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigatorConfig {
    pub risk: RiskThresholds,
    pub high_risk_countries: Vec<String>,
    pub report: ReportLimits,
}

impl Default for InvestigatorConfig {
    fn default() -> Self {
        Self {
            risk: RiskThresholds::default(),
            high_risk_countries: HighRiskJurisdictions::default_codes(),
            report: ReportLimits::default(),
        }
    }
}

impl InvestigatorConfig {
    /// Parse a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| InvestigationError::Config(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            InvestigationError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    /// Reject thresholds that make the detectors meaningless
    pub fn validate(&self) -> Result<()> {
        let risk = &self.risk;
        if !(risk.structuring_floor > 0.0 && risk.structuring_floor < risk.reporting_threshold) {
            return Err(InvestigationError::Config(format!(
                "structuring band [{}, {}) is empty",
                risk.structuring_floor, risk.reporting_threshold
            )));
        }
        if risk.max_evidence_ids == 0 {
            return Err(InvestigationError::Config(
                "max_evidence_ids must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn jurisdictions(&self) -> HighRiskJurisdictions {
        HighRiskJurisdictions::from_codes(&self.high_risk_countries)
    }

    /// Export as JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

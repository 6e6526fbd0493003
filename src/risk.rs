//! Rule-based risk scoring
//!
//! Seven independent detectors run over the primary party's transactions.
//! Each triggered detector adds a fixed number of points and an explained
//! driver; the score is the capped sum. When nothing triggers the case keeps
//! its baseline score and level.

use crate::config::RiskThresholds;
use crate::jurisdiction::HighRiskJurisdictions;
use crate::store::RecordStore;
use crate::watchlist::WatchEntry;
use crate::{
    format_usd, group_thousands, round2, Case, Party, PartyType, RiskLevel, SuspiciousPattern,
    Transaction, UNKNOWN,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// One detector's finding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskDriver {
    pub indicator: String,
    pub severity: RiskLevel,
    pub confidence: f64,
    pub evidence_ids: Vec<String>,
    pub description: String,
}

/// Score, level and explained drivers for a case
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub case_id: String,
    pub score: u8,
    pub level: RiskLevel,
    pub confidence: f64,
    pub drivers: Vec<RiskDriver>,
    pub summary: String,
}

impl RiskAssessment {
    /// Zero-valued result for a case that cannot be found
    pub fn empty(case_id: &str) -> Self {
        Self {
            case_id: case_id.to_string(),
            score: 0,
            level: RiskLevel::Low,
            confidence: 0.0,
            drivers: Vec::new(),
            summary: format!("No risk data available for case {}.", case_id),
        }
    }

    pub fn driver(&self, indicator: &str) -> Option<&RiskDriver> {
        self.drivers.iter().find(|d| d.indicator == indicator)
    }
}

/// Records the risk engine reads for one case
pub(crate) struct CaseRecords {
    pub party: Option<Party>,
    pub transactions: Vec<Transaction>,
    pub watch_matches: Vec<WatchEntry>,
}

impl CaseRecords {
    pub fn load(store: &dyn RecordStore, case: &Case) -> Self {
        let party = store.party(&case.primary_party_id);
        let watch_matches = party
            .as_ref()
            .map(|p| store.watch_list_matches(&p.name, &p.country))
            .unwrap_or_default();

        Self {
            transactions: store.transactions_for_party(&case.primary_party_id),
            party,
            watch_matches,
        }
    }

    pub fn party_name(&self) -> &str {
        self.party.as_ref().map_or(UNKNOWN, |p| p.name.as_str())
    }
}

/// A triggered detector: its points and the driver explaining them
struct Finding {
    points: u8,
    driver: RiskDriver,
}

/// Risk scoring engine
#[derive(Clone)]
pub struct RiskEngine {
    store: Arc<dyn RecordStore>,
    thresholds: RiskThresholds,
    jurisdictions: HighRiskJurisdictions,
}

impl RiskEngine {
    /// Create an engine with default thresholds and jurisdictions
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_config(
            store,
            RiskThresholds::default(),
            HighRiskJurisdictions::default(),
        )
    }

    pub fn with_config(
        store: Arc<dyn RecordStore>,
        thresholds: RiskThresholds,
        jurisdictions: HighRiskJurisdictions,
    ) -> Self {
        Self {
            store,
            thresholds,
            jurisdictions,
        }
    }

    /// Assess a case. Unknown cases give a zero score, LOW level and no drivers.
    pub fn assess(&self, case_id: &str) -> RiskAssessment {
        match self.store.case(case_id) {
            Some(case) => {
                let records = CaseRecords::load(self.store.as_ref(), &case);
                self.assess_records(&case, &records)
            }
            None => {
                warn!(case_id = %case_id, "risk requested for unknown case");
                RiskAssessment::empty(case_id)
            }
        }
    }

    pub(crate) fn assess_records(&self, case: &Case, records: &CaseRecords) -> RiskAssessment {
        let findings: Vec<Finding> = [
            self.detect_structuring(&records.transactions),
            self.detect_watch_list(&records.watch_matches),
            self.detect_jurisdictions(&records.transactions),
            self.detect_rapid_movement(&records.transactions),
            self.detect_round_trip(&records.transactions),
            self.detect_shell_company(records.party.as_ref()),
            self.detect_volume(&records.transactions),
        ]
        .into_iter()
        .flatten()
        .collect();

        let (score, level) = if findings.is_empty() {
            (case.baseline_score.min(100), case.baseline_level)
        } else {
            let total = findings
                .iter()
                .fold(0u8, |acc, f| acc.saturating_add(f.points))
                .min(100);
            (total, RiskLevel::from_score(total))
        };

        let drivers: Vec<RiskDriver> = findings.into_iter().map(|f| f.driver).collect();
        let confidence = if drivers.is_empty() {
            0.0
        } else {
            round2(drivers.iter().map(|d| d.confidence).sum::<f64>() / drivers.len() as f64)
        };

        debug!(
            case_id = %case.id,
            score,
            level = %level,
            drivers = drivers.len(),
            "risk assessed"
        );

        RiskAssessment {
            case_id: case.id.clone(),
            score,
            level,
            confidence,
            summary: summarize(records.party_name(), score, level, &drivers),
            drivers,
        }
    }

    fn evidence(&self, transactions: &[&Transaction]) -> Vec<String> {
        transactions
            .iter()
            .take(self.thresholds.max_evidence_ids)
            .map(|t| t.id.clone())
            .collect()
    }

    fn detect_structuring(&self, transactions: &[Transaction]) -> Option<Finding> {
        let band = self.thresholds.structuring_floor..self.thresholds.reporting_threshold;
        let hits: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.has_pattern(SuspiciousPattern::Structuring) || band.contains(&t.amount))
            .collect();
        if hits.is_empty() {
            return None;
        }

        let min = hits.iter().map(|t| t.amount).fold(f64::INFINITY, f64::min);
        let max = hits.iter().map(|t| t.amount).fold(f64::NEG_INFINITY, f64::max);
        Some(Finding {
            points: self.thresholds.structuring_points,
            driver: RiskDriver {
                indicator: "Structuring Pattern Detected".to_string(),
                severity: RiskLevel::High,
                confidence: round2((hits.len() as f64 * 0.2).min(1.0)),
                evidence_ids: self.evidence(&hits),
                description: format!(
                    "{} transactions detected just below ${} reporting threshold. \
                     Amounts range from {} to {}.",
                    hits.len(),
                    group_thousands(self.thresholds.reporting_threshold as u64),
                    format_usd(min),
                    format_usd(max)
                ),
            },
        })
    }

    fn detect_watch_list(&self, matches: &[WatchEntry]) -> Option<Finding> {
        if matches.is_empty() {
            return None;
        }

        Some(Finding {
            points: self.thresholds.watch_list_points,
            driver: RiskDriver {
                indicator: "Sanctions List Proximity".to_string(),
                severity: RiskLevel::Critical,
                confidence: 0.9,
                evidence_ids: matches
                    .iter()
                    .take(3.min(self.thresholds.max_evidence_ids))
                    .map(|m| m.id.clone())
                    .collect(),
                description: format!(
                    "Entity or jurisdiction matches {} sanctions list entries. Programs: {}.",
                    matches.len(),
                    distinct_programs(matches).join(", ")
                ),
            },
        })
    }

    fn detect_jurisdictions(&self, transactions: &[Transaction]) -> Option<Finding> {
        let hits: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| {
                self.jurisdictions.contains(&t.sender_country)
                    || self.jurisdictions.contains(&t.receiver_country)
            })
            .collect();
        if hits.is_empty() {
            return None;
        }

        let mut countries: Vec<&str> = Vec::new();
        for t in &hits {
            for country in [t.sender_country.as_str(), t.receiver_country.as_str()] {
                if self.jurisdictions.contains(country) && !countries.contains(&country) {
                    countries.push(country);
                }
            }
        }
        let described: Vec<String> = countries
            .iter()
            .map(|c| self.jurisdictions.describe(c))
            .collect();

        Some(Finding {
            points: self.thresholds.jurisdiction_points,
            driver: RiskDriver {
                indicator: "High-Risk Jurisdiction Activity".to_string(),
                severity: RiskLevel::High,
                confidence: round2((hits.len() as f64 * 0.15).min(0.95)),
                evidence_ids: self.evidence(&hits),
                description: format!(
                    "{} transactions involving high-risk jurisdictions: {}.",
                    hits.len(),
                    described.join(", ")
                ),
            },
        })
    }

    fn detect_rapid_movement(&self, transactions: &[Transaction]) -> Option<Finding> {
        let hits = tagged(transactions, SuspiciousPattern::RapidMovement);
        if hits.is_empty() {
            return None;
        }

        let total: f64 = hits.iter().map(|t| t.amount).sum();
        Some(Finding {
            points: self.thresholds.rapid_movement_points,
            driver: RiskDriver {
                indicator: "Rapid Fund Movement".to_string(),
                severity: RiskLevel::High,
                confidence: round2((0.6 + hits.len() as f64 * 0.1).min(0.95)),
                evidence_ids: self.evidence(&hits),
                description: format!(
                    "{} moved rapidly across {} transactions. Funds transferred within {} hours.",
                    format_usd(total),
                    hits.len(),
                    self.thresholds.rapid_movement_hours
                ),
            },
        })
    }

    fn detect_round_trip(&self, transactions: &[Transaction]) -> Option<Finding> {
        let hits = tagged(transactions, SuspiciousPattern::RoundTrip);
        if hits.is_empty() {
            return None;
        }

        let total: f64 = hits.iter().map(|t| t.amount).sum();
        Some(Finding {
            points: self.thresholds.round_trip_points,
            driver: RiskDriver {
                indicator: "Round-Trip Transaction Pattern".to_string(),
                severity: RiskLevel::Critical,
                confidence: 0.85,
                evidence_ids: self.evidence(&hits),
                description: format!(
                    "{} in round-trip transactions detected. \
                     Funds routed through intermediaries and returned to origin.",
                    format_usd(total)
                ),
            },
        })
    }

    fn detect_shell_company(&self, party: Option<&Party>) -> Option<Finding> {
        let party = party.filter(|p| p.party_type == PartyType::ShellCompany)?;

        Some(Finding {
            points: self.thresholds.shell_company_points,
            driver: RiskDriver {
                indicator: "Shell Company Involvement".to_string(),
                severity: RiskLevel::Medium,
                confidence: 0.7,
                evidence_ids: vec![party.id.clone()],
                description: format!(
                    "Primary entity '{}' is classified as a shell company registered in {}.",
                    party.name, party.country
                ),
            },
        })
    }

    fn detect_volume(&self, transactions: &[Transaction]) -> Option<Finding> {
        if transactions.len() <= self.thresholds.volume_threshold {
            return None;
        }

        let total: f64 = transactions.iter().map(|t| t.amount).sum();
        let all: Vec<&Transaction> = transactions.iter().collect();
        Some(Finding {
            points: self.thresholds.volume_points,
            driver: RiskDriver {
                indicator: "Unusually High Transaction Volume".to_string(),
                severity: RiskLevel::Medium,
                confidence: 0.6,
                evidence_ids: self.evidence(&all[..all.len().min(3)]),
                description: format!(
                    "{} transactions totaling {}. Above normal activity threshold.",
                    transactions.len(),
                    format_usd(total)
                ),
            },
        })
    }
}

fn tagged(transactions: &[Transaction], pattern: SuspiciousPattern) -> Vec<&Transaction> {
    transactions.iter().filter(|t| t.has_pattern(pattern)).collect()
}

/// Programs of the matched entries, first occurrence order
pub(crate) fn distinct_programs(matches: &[WatchEntry]) -> Vec<&str> {
    let mut programs: Vec<&str> = Vec::new();
    for entry in matches {
        if !programs.contains(&entry.program.as_str()) {
            programs.push(&entry.program);
        }
    }
    programs
}

fn summarize(party_name: &str, score: u8, level: RiskLevel, drivers: &[RiskDriver]) -> String {
    let primary = drivers
        .first()
        .map_or("No specific risk identified", |d| d.indicator.as_str());
    let recommended = match level {
        RiskLevel::Critical => "immediate escalation",
        RiskLevel::High => "detailed review",
        _ => "standard review",
    };
    format!(
        "Risk assessment for {}: {} risk (score: {}/100). {} risk driver(s) identified. \
         Primary concern: {}. Recommended for {}.",
        party_name,
        level,
        score,
        drivers.len(),
        primary,
        recommended
    )
}

//! # Sentinel Investigator
//!
//! A deterministic investigation pipeline for anti-money-laundering alerts.
//!
//! ## Features
//!
//! - **Relationship Graph**: parties, accounts and fund movements around a case
//! - **Risk Scoring**: seven rule detectors with explained, confidence-weighted drivers
//! - **Evidence Ranking**: term-overlap retrieval over transaction narratives
//! - **Case Reports**: SAR-style narrative with timeline, citations and recommendation
//! - **Audit Trail**: append-only, timed record of every pipeline step
//!
//! Everything runs over in-memory records supplied through [`RecordStore`].
//! There is no statistical model and no external service: the same inputs
//! always produce the same findings.

pub mod audit;
pub mod config;
pub mod evidence;
pub mod graph;
pub mod investigation;
pub mod jurisdiction;
pub mod report;
pub mod risk;
pub mod store;
pub mod watchlist;

#[cfg(test)]
mod test_support;

pub use audit::{AuditEntry, AuditLog, AuditScope, AuditStep, AuditTrail};
pub use config::{InvestigatorConfig, ReportLimits, RiskThresholds};
pub use evidence::{EvidenceHit, EvidenceIndex};
pub use graph::{CaseGraph, GraphBuilder, GraphEdge, GraphNode, NodeAttributes, NodeKind};
pub use investigation::{CaseDetail, Investigation, Investigator};
pub use jurisdiction::HighRiskJurisdictions;
pub use report::{
    CaseReport, CitationType, EvidenceCitation, LinkedParty, Relationship, ReportAssembler,
    TimelineEntry,
};
pub use risk::{RiskAssessment, RiskDriver, RiskEngine};
pub use store::{InMemoryStore, RecordStore};
pub use watchlist::{WatchEntry, WatchList};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Investigation errors
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvestigationError {
    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, InvestigationError>;

/// Placeholder for names and descriptive fields of records that cannot be resolved
pub const UNKNOWN: &str = "Unknown";

/// Placeholder for coded fields (types, country codes) of unresolved records
pub const UNKNOWN_CODE: &str = "UNKNOWN";

/// Case severity level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a 0-100 score onto a level (>=80 critical, >=60 high, >=40 medium)
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => RiskLevel::Critical,
            60..=79 => RiskLevel::High,
            40..=59 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case workflow status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    New,
    UnderReview,
    Escalated,
    ClosedSuspicious,
    ClosedFalsePositive,
}

/// Party classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyType {
    Individual,
    Corporation,
    ShellCompany,
    Trust,
    Ngo,
}

impl PartyType {
    pub fn as_code(&self) -> &'static str {
        match self {
            PartyType::Individual => "INDIVIDUAL",
            PartyType::Corporation => "CORPORATION",
            PartyType::ShellCompany => "SHELL_COMPANY",
            PartyType::Trust => "TRUST",
            PartyType::Ngo => "NGO",
        }
    }
}

impl std::fmt::Display for PartyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartyType::Individual => write!(f, "individual"),
            PartyType::Corporation => write!(f, "corporation"),
            PartyType::ShellCompany => write!(f, "shell company"),
            PartyType::Trust => write!(f, "trust"),
            PartyType::Ngo => write!(f, "ngo"),
        }
    }
}

/// Suspicious-pattern tag carried by a flagged transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SuspiciousPattern {
    Structuring,
    RapidMovement,
    RoundTrip,
    SanctionsProximity,
    Layering,
}

impl SuspiciousPattern {
    /// Wire tag, e.g. `rapid_movement`
    pub fn as_tag(&self) -> &'static str {
        match self {
            SuspiciousPattern::Structuring => "structuring",
            SuspiciousPattern::RapidMovement => "rapid_movement",
            SuspiciousPattern::RoundTrip => "round_trip",
            SuspiciousPattern::SanctionsProximity => "sanctions_proximity",
            SuspiciousPattern::Layering => "layering",
        }
    }

    /// Title-cased label, e.g. `Rapid Movement`
    pub fn title(&self) -> &'static str {
        match self {
            SuspiciousPattern::Structuring => "Structuring",
            SuspiciousPattern::RapidMovement => "Rapid Movement",
            SuspiciousPattern::RoundTrip => "Round Trip",
            SuspiciousPattern::SanctionsProximity => "Sanctions Proximity",
            SuspiciousPattern::Layering => "Layering",
        }
    }
}

impl std::fmt::Display for SuspiciousPattern {
    /// Lower-case words, e.g. `rapid movement`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_tag().replace('_', " "))
    }
}

/// Transaction type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Wire,
    Ach,
    InternalTransfer,
    CashDeposit,
    CashWithdrawal,
    Check,
    Crypto,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Wire => write!(f, "WIRE"),
            TransactionType::Ach => write!(f, "ACH"),
            TransactionType::InternalTransfer => write!(f, "INTERNAL_TRANSFER"),
            TransactionType::CashDeposit => write!(f, "CASH_DEPOSIT"),
            TransactionType::CashWithdrawal => write!(f, "CASH_WITHDRAWAL"),
            TransactionType::Check => write!(f, "CHECK"),
            TransactionType::Crypto => write!(f, "CRYPTO"),
        }
    }
}

/// A single fund movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub sender_account: String,
    pub sender_party: String,
    pub sender_name: String,
    pub sender_country: String,
    pub receiver_account: String,
    pub receiver_party: String,
    pub receiver_name: String,
    pub receiver_country: String,
    pub amount: f64,
    pub currency: String,
    pub transaction_type: TransactionType,
    pub suspicious_pattern: Option<SuspiciousPattern>,
    pub description: String,
}

impl Transaction {
    /// Check record invariants: non-empty id, positive finite amount,
    /// distinct sender and receiver accounts
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(InvestigationError::InvalidRecord(
                "Transaction id must not be empty".to_string(),
            ));
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(InvestigationError::InvalidRecord(format!(
                "Transaction {} amount must be positive, got {}",
                self.id, self.amount
            )));
        }

        if self.sender_account == self.receiver_account {
            return Err(InvestigationError::InvalidRecord(format!(
                "Transaction {} sends to its own account {}",
                self.id, self.sender_account
            )));
        }

        Ok(())
    }

    pub fn is_suspicious(&self) -> bool {
        self.suspicious_pattern.is_some()
    }

    pub fn has_pattern(&self, pattern: SuspiciousPattern) -> bool {
        self.suspicious_pattern == Some(pattern)
    }

    /// Whether the party sends or receives this transaction
    pub fn involves(&self, party_id: &str) -> bool {
        self.sender_party == party_id || self.receiver_party == party_id
    }
}

/// An individual or organization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Party {
    pub id: String,
    pub name: String,
    pub party_type: PartyType,
    pub country: String,
    pub risk_flag: bool,
    pub politically_exposed: bool,
}

/// A financial account owned by one party
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: String,
    pub owner_party_id: String,
    pub currency: String,
    pub country: String,
}

/// The unit of investigation (an alert)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub id: String,
    pub primary_party_id: String,
    pub baseline_score: u8,
    pub baseline_level: RiskLevel,
    pub trigger_pattern: SuspiciousPattern,
    pub linked_transaction_ids: Vec<String>,
    pub watch_list_match: bool,
    pub status: CaseStatus,
}

/// Format an amount as US dollars with thousands separators, e.g. `$8,200.00`
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// Insert thousands separators into a whole number, e.g. `10,000`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Case report assembly
//!
//! Turns a case, its risk assessment and the ranked evidence into a
//! SAR-style narrative report: overview, timeline, risk indicators, linked
//! parties, evidence citations and a recommended action.

use crate::audit::{short_id, AuditLog};
use crate::config::ReportLimits;
use crate::evidence::{EvidenceHit, EvidenceIndex};
use crate::risk::{distinct_programs, CaseRecords, RiskAssessment, RiskDriver, RiskEngine};
use crate::store::RecordStore;
use crate::{
    format_usd, Case, InvestigationError, Result, RiskLevel, SuspiciousPattern, Transaction,
    UNKNOWN, UNKNOWN_CODE,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

const COMPONENT: &str = "report_assembler";

/// One dated event in the report timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    pub date: DateTime<Utc>,
    pub transaction_id: String,
    pub event: String,
    pub amount: f64,
    pub flagged: bool,
    pub pattern: Option<SuspiciousPattern>,
}

/// Role in which a counterparty was first seen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Sender,
    Receiver,
}

/// Counterparty of the primary party, aggregated over its transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedParty {
    pub party_id: String,
    pub name: String,
    pub country: String,
    pub relationship: Relationship,
    pub transaction_count: usize,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CitationType {
    Transaction,
    Pattern,
    SanctionsMatch,
}

/// A cited piece of evidence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceCitation {
    /// Sequential per report: `EV-001`, `EV-002`, ...
    pub id: String,
    #[serde(rename = "type")]
    pub citation_type: CitationType,
    pub description: String,
    pub source_ids: Vec<String>,
    pub confidence: f64,
}

/// Narrative case report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseReport {
    /// `SAR-XXXXXXXX`, fresh per call
    pub id: String,
    pub case_id: String,
    pub generated_at: DateTime<Utc>,
    pub overview: String,
    pub timeline: Vec<TimelineEntry>,
    pub drivers: Vec<RiskDriver>,
    pub linked_parties: Vec<LinkedParty>,
    pub citations: Vec<EvidenceCitation>,
    pub recommendation: String,
    pub overall_score: u8,
    pub overall_confidence: f64,
}

impl CaseReport {
    /// Export as JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Everything a report is assembled from
struct CaseData {
    case: Case,
    records: CaseRecords,
    linked: Vec<Transaction>,
    risk: RiskAssessment,
}

/// Report assembler
#[derive(Clone)]
pub struct ReportAssembler {
    store: Arc<dyn RecordStore>,
    risk: RiskEngine,
    evidence: Arc<EvidenceIndex>,
    audit: Arc<AuditLog>,
    limits: ReportLimits,
}

impl ReportAssembler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        risk: RiskEngine,
        evidence: Arc<EvidenceIndex>,
        audit: Arc<AuditLog>,
        limits: ReportLimits,
    ) -> Self {
        Self {
            store,
            risk,
            evidence,
            audit,
            limits,
        }
    }

    /// Assemble a report without touching the audit log
    pub fn generate(&self, case_id: &str) -> Result<CaseReport> {
        let case = self.find_case(case_id)?;
        let data = self.load(case);
        Ok(self.assemble(&data))
    }

    /// Assemble a report inside the pipeline: data retrieval, evidence
    /// retrieval and report generation are each recorded in the audit log.
    /// Returns the report with the ranked evidence it was built alongside.
    pub fn generate_with_evidence(&self, case_id: &str) -> Result<(CaseReport, Vec<EvidenceHit>)> {
        let case = self.find_case(case_id)?;

        let mut scope = self.audit.scope(
            case_id,
            "DATA_RETRIEVAL",
            COMPONENT,
            format!("Retrieving data for case {}", case_id),
        );
        let data = self.load(case);
        scope.set_output(
            format!(
                "Retrieved {} linked transactions, {} party transactions, {} watch-list matches",
                data.linked.len(),
                data.records.transactions.len(),
                data.records.watch_matches.len()
            ),
            data.linked.iter().take(5).map(|t| t.id.clone()).collect(),
        );
        scope.finish();

        let query = format!(
            "{} {} suspicious",
            data.records.party_name(),
            data.case.trigger_pattern
        );
        let mut scope = self.audit.scope(
            case_id,
            "EVIDENCE_RETRIEVAL",
            COMPONENT,
            format!("Querying evidence index: '{}'", query),
        );
        let evidence = self.evidence.query(&query, self.limits.evidence_top_k);
        scope.set_output(
            format!("Retrieved {} relevant evidence entries", evidence.len()),
            evidence
                .iter()
                .take(5)
                .map(|h| h.transaction_id.clone())
                .collect(),
        );
        scope.finish();

        let mut scope = self.audit.scope(
            case_id,
            "REPORT_GENERATION",
            COMPONENT,
            format!("Generating report for case {}", case_id),
        );
        let report = self.assemble(&data);
        scope.set_output(
            format!(
                "Report {} generated with {} risk indicators, {} citations, {} linked parties",
                report.id,
                report.drivers.len(),
                report.citations.len(),
                report.linked_parties.len()
            ),
            report.citations.iter().take(5).map(|c| c.id.clone()).collect(),
        );
        scope.finish();

        info!(case_id = %case_id, report_id = %report.id, "report generated");
        Ok((report, evidence))
    }

    fn find_case(&self, case_id: &str) -> Result<Case> {
        self.store.case(case_id).ok_or_else(|| {
            warn!(case_id = %case_id, "report requested for unknown case");
            InvestigationError::CaseNotFound(case_id.to_string())
        })
    }

    fn load(&self, case: Case) -> CaseData {
        let records = CaseRecords::load(self.store.as_ref(), &case);
        let linked = self.store.transactions_by_ids(&case.linked_transaction_ids);
        let risk = self.risk.assess_records(&case, &records);
        CaseData {
            case,
            records,
            linked,
            risk,
        }
    }

    fn assemble(&self, data: &CaseData) -> CaseReport {
        CaseReport {
            id: format!("SAR-{}", short_id()),
            case_id: data.case.id.clone(),
            generated_at: Utc::now(),
            overview: overview(data),
            timeline: self.timeline(data),
            drivers: data.risk.drivers.clone(),
            linked_parties: self.linked_parties(data),
            citations: self.citations(data),
            recommendation: recommendation(data),
            overall_score: data.risk.score,
            overall_confidence: data.risk.confidence,
        }
    }

    fn timeline(&self, data: &CaseData) -> Vec<TimelineEntry> {
        let linked_ids: HashSet<&str> = data.linked.iter().map(|t| t.id.as_str()).collect();
        let mut ordered: Vec<&Transaction> = data.records.transactions.iter().collect();
        ordered.sort_by_key(|t| t.timestamp);

        ordered
            .into_iter()
            .take(self.limits.timeline_entries)
            .map(|t| TimelineEntry {
                date: t.timestamp,
                transaction_id: t.id.clone(),
                event: format!(
                    "{}: {} from {} to {}",
                    t.transaction_type,
                    format_usd(t.amount),
                    t.sender_name,
                    t.receiver_name
                ),
                amount: t.amount,
                flagged: linked_ids.contains(t.id.as_str()) || t.is_suspicious(),
                pattern: t.suspicious_pattern,
            })
            .collect()
    }

    fn linked_parties(&self, data: &CaseData) -> Vec<LinkedParty> {
        let primary = data.case.primary_party_id.as_str();
        let mut parties: Vec<LinkedParty> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for t in &data.records.transactions {
            for (relationship, id, name, country) in [
                (Relationship::Sender, &t.sender_party, &t.sender_name, &t.sender_country),
                (
                    Relationship::Receiver,
                    &t.receiver_party,
                    &t.receiver_name,
                    &t.receiver_country,
                ),
            ] {
                if id == primary {
                    continue;
                }
                let pos = *positions.entry(id.clone()).or_insert_with(|| {
                    parties.push(LinkedParty {
                        party_id: id.clone(),
                        name: name.clone(),
                        country: country.clone(),
                        relationship,
                        transaction_count: 0,
                        total_amount: 0.0,
                    });
                    parties.len() - 1
                });
                parties[pos].transaction_count += 1;
                parties[pos].total_amount += t.amount;
            }
        }

        parties.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
        parties.truncate(self.limits.linked_parties);
        parties
    }

    fn citations(&self, data: &CaseData) -> Vec<EvidenceCitation> {
        let mut citations = Vec::new();
        let mut cite = |citation_type, description, source_ids, confidence| {
            citations.push(EvidenceCitation {
                id: format!("EV-{:03}", citations.len() + 1),
                citation_type,
                description,
                source_ids,
                confidence,
            });
        };

        for t in data.linked.iter().take(self.limits.transaction_citations) {
            let description = if t.description.trim().is_empty() {
                format!("Transaction {}", t.id)
            } else {
                t.description.clone()
            };
            let confidence = if t.is_suspicious() { 0.9 } else { 0.6 };
            cite(
                CitationType::Transaction,
                description,
                vec![t.id.clone()],
                confidence,
            );
        }

        let mut patterns: Vec<(SuspiciousPattern, Vec<String>)> = Vec::new();
        for t in &data.records.transactions {
            let Some(pattern) = t.suspicious_pattern else {
                continue;
            };
            match patterns.iter_mut().find(|(p, _)| *p == pattern) {
                Some((_, ids)) => ids.push(t.id.clone()),
                None => patterns.push((pattern, vec![t.id.clone()])),
            }
        }
        for (pattern, ids) in patterns {
            cite(
                CitationType::Pattern,
                format!(
                    "{} pattern detected across {} transactions",
                    pattern.title(),
                    ids.len()
                ),
                ids.into_iter().take(self.limits.pattern_sources).collect(),
                0.85,
            );
        }

        for entry in data
            .records
            .watch_matches
            .iter()
            .take(self.limits.watch_list_citations)
        {
            cite(
                CitationType::SanctionsMatch,
                format!(
                    "Sanctions list match: {} ({}) — {}",
                    entry.name, entry.program, entry.reason
                ),
                vec![entry.id.clone()],
                0.95,
            );
        }

        citations
    }
}

fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

fn overview(data: &CaseData) -> String {
    let party = data.records.party.as_ref();
    let party_type = party.map_or_else(|| UNKNOWN.to_lowercase(), |p| p.party_type.to_string());
    let country = party.map_or(UNKNOWN_CODE, |p| p.country.as_str());

    let watch_note = if data.records.watch_matches.is_empty() {
        String::new()
    } else {
        format!(
            " The entity has been identified with proximity to sanctions lists ({}).",
            distinct_programs(&data.records.watch_matches).join(", ")
        )
    };

    format!(
        "This Suspicious Activity Report pertains to {}, a {} entity based in {}. \
         The investigation was triggered by a {} pattern detected in transaction monitoring. \
         The overall risk assessment is {} with a confidence score of {}. \
         {} distinct risk indicators were identified during the analysis.{}",
        data.records.party_name(),
        party_type,
        country,
        data.case.trigger_pattern,
        data.risk.level,
        percent(data.risk.confidence),
        data.risk.drivers.len(),
        watch_note
    )
}

fn recommendation(data: &CaseData) -> String {
    let (action, detail) = match data.risk.level {
        RiskLevel::Critical => (
            "IMMEDIATE ESCALATION",
            "This case requires immediate escalation to the BSA Officer and filing of a \
             Suspicious Activity Report with FinCEN within 30 days. ",
        ),
        RiskLevel::High => (
            "ESCALATE FOR REVIEW",
            "This case should be escalated for senior analyst review. A SAR filing should be \
             considered based on additional investigation. ",
        ),
        RiskLevel::Medium => (
            "ENHANCED MONITORING",
            "Place the account(s) under enhanced monitoring. Schedule follow-up review in 30 days. ",
        ),
        RiskLevel::Low => (
            "CLOSE — FALSE POSITIVE",
            "Insufficient evidence to support suspicious activity designation. ",
        ),
    };

    let matches = data.records.watch_matches.len();
    let due_diligence = if matches > 0 {
        format!(
            "Additional due diligence required due to sanctions proximity ({} match(es)). ",
            matches
        )
    } else {
        String::new()
    };

    format!(
        "RECOMMENDED ACTION: {}. {}{}This determination is based on {} identified risk \
         driver(s) with an overall confidence of {}.",
        action,
        detail,
        due_diligence,
        data.risk.drivers.len(),
        percent(data.risk.confidence)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::test_support::{case, sample_store, store_with, tx};
    use crate::watchlist::WatchEntry;
    use crate::SuspiciousPattern::Structuring;

    fn assembler(store: InMemoryStore) -> (ReportAssembler, Arc<AuditLog>) {
        let store: Arc<dyn RecordStore> = Arc::new(store);
        let audit = Arc::new(AuditLog::new());
        let evidence = Arc::new(EvidenceIndex::from_store(store.as_ref()));
        let assembler = ReportAssembler::new(
            store.clone(),
            RiskEngine::new(store),
            evidence,
            audit.clone(),
            ReportLimits::default(),
        );
        (assembler, audit)
    }

    #[test]
    fn test_unknown_case_not_found() {
        let (assembler, audit) = assembler(sample_store());

        let result = assembler.generate("CASE-MISSING");
        assert_eq!(
            result,
            Err(InvestigationError::CaseNotFound("CASE-MISSING".to_string()))
        );
        assert!(assembler.generate_with_evidence("CASE-MISSING").is_err());
        assert!(audit.trail("CASE-MISSING").is_empty());
    }

    #[test]
    fn test_orion_report_sections() {
        let (assembler, _) = assembler(sample_store());
        let report = assembler.generate("CASE-ORION").unwrap();

        assert!(report.id.starts_with("SAR-"));
        assert_eq!(report.id.len(), 12);
        assert_eq!(report.overall_score, 95);
        assert_eq!(report.overall_confidence, 0.61);
        assert_eq!(report.drivers.len(), 5);

        assert!(report.overview.starts_with(
            "This Suspicious Activity Report pertains to Orion Holdings Ltd, \
             a shell company entity based in KY."
        ));
        assert!(report.overview.contains("triggered by a round trip pattern"));
        assert!(report.overview.contains("CRITICAL with a confidence score of 61%"));
        assert!(report.overview.contains("5 distinct risk indicators"));
        assert!(!report.overview.contains("sanctions lists"));

        assert!(report
            .recommendation
            .starts_with("RECOMMENDED ACTION: IMMEDIATE ESCALATION."));
        assert!(report
            .recommendation
            .ends_with("based on 5 identified risk driver(s) with an overall confidence of 61%."));
    }

    #[test]
    fn test_timeline_is_chronological() {
        let (assembler, _) = assembler(sample_store());
        let report = assembler.generate("CASE-ORION").unwrap();

        let ids: Vec<&str> = report
            .timeline
            .iter()
            .map(|e| e.transaction_id.as_str())
            .collect();
        assert_eq!(ids, vec!["TX-103", "TX-101", "TX-105", "TX-102"]);
        assert!(report.timeline.iter().all(|e| e.flagged));
        assert_eq!(
            report.timeline[1].event,
            "WIRE: $45,000.00 from Orion Holdings Ltd to Nadir Trading"
        );
    }

    #[test]
    fn test_timeline_limit_and_flags() {
        let transactions = (0..25)
            .map(|i| tx(&format!("TX-{}", i), "P-JANE", "P-CLEAN", 100.0, None, 30 - i))
            .collect();
        let store = store_with(
            transactions,
            vec![case("CASE-T", "P-JANE", &["TX-20"], 10, RiskLevel::Low)],
        );
        let (assembler, _) = assembler(store);
        let report = assembler.generate("CASE-T").unwrap();

        assert_eq!(report.timeline.len(), 20);
        assert_eq!(report.timeline[0].transaction_id, "TX-24");
        let flagged: Vec<&str> = report
            .timeline
            .iter()
            .filter(|e| e.flagged)
            .map(|e| e.transaction_id.as_str())
            .collect();
        assert_eq!(flagged, vec!["TX-20"]);
        assert!(report.timeline.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_linked_parties_aggregated() {
        let (assembler, _) = assembler(sample_store());
        let report = assembler.generate("CASE-ORION").unwrap();

        let parties = &report.linked_parties;
        assert_eq!(parties.len(), 3);
        assert_eq!(parties[0].party_id, "P-NADIR");
        assert_eq!(parties[0].transaction_count, 2);
        assert_eq!(parties[0].total_amount, 89_000.0);
        assert_eq!(parties[0].relationship, Relationship::Receiver);
        assert_eq!(parties[1].party_id, "P-CLEAN");
        assert_eq!(parties[2].party_id, "P-JANE");
        assert!(parties.iter().all(|p| p.party_id != "P-ORION"));
    }

    #[test]
    fn test_citations() {
        let (assembler, _) = assembler(sample_store());
        let report = assembler.generate("CASE-ORION").unwrap();

        let ids: Vec<&str> = report.citations.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["EV-001", "EV-002", "EV-003", "EV-004", "EV-005", "EV-006"]);

        let first = &report.citations[0];
        assert_eq!(first.citation_type, CitationType::Transaction);
        assert_eq!(first.source_ids, vec!["TX-101"]);
        assert_eq!(first.confidence, 0.9);
        assert_eq!(report.citations[2].source_ids, vec!["TX-104"]);
        assert_eq!(report.citations[2].confidence, 0.6);

        let round_trip = &report.citations[3];
        assert_eq!(round_trip.citation_type, CitationType::Pattern);
        assert_eq!(
            round_trip.description,
            "Round Trip pattern detected across 2 transactions"
        );
        assert_eq!(round_trip.source_ids, vec!["TX-101", "TX-102"]);
        assert_eq!(round_trip.confidence, 0.85);

        for citation in &report.citations {
            assert!(!citation.source_ids.is_empty());
            assert!((0.0..=1.0).contains(&citation.confidence));
        }
    }

    #[test]
    fn test_watch_list_sections() {
        let store = store_with(
            vec![tx("TX-1", "P-NADIR", "P-JANE", 500.0, None, 1)],
            vec![case("CASE-N", "P-NADIR", &["TX-1"], 40, RiskLevel::Medium)],
        );
        let (assembler, _) = assembler(store);
        let report = assembler.generate("CASE-N").unwrap();

        let watch = report
            .citations
            .iter()
            .find(|c| c.citation_type == CitationType::SanctionsMatch)
            .unwrap();
        assert_eq!(watch.source_ids, vec!["W-001"]);
        assert_eq!(watch.confidence, 0.95);
        assert!(watch.description.contains("Nadir Trading Company (RUSSIA-EO14024)"));

        assert!(report
            .overview
            .ends_with("proximity to sanctions lists (RUSSIA-EO14024)."));
        assert!(report
            .recommendation
            .contains("sanctions proximity (1 match(es))"));
    }

    #[test]
    fn test_linked_parties_capped() {
        let transactions = (0..18)
            .map(|i| {
                tx(
                    &format!("TX-{}", i),
                    "P-JANE",
                    &format!("P-G{:02}", i),
                    100.0 * (i + 1) as f64,
                    None,
                    i,
                )
            })
            .collect();
        let store = store_with(
            transactions,
            vec![case("CASE-W", "P-JANE", &[], 10, RiskLevel::Low)],
        );
        let (assembler, _) = assembler(store);
        let report = assembler.generate("CASE-W").unwrap();

        let parties = &report.linked_parties;
        assert_eq!(parties.len(), 15);
        assert_eq!(parties[0].party_id, "P-G17");
        assert_eq!(parties[14].party_id, "P-G03");
        assert!(parties
            .windows(2)
            .all(|w| w[0].total_amount >= w[1].total_amount));
    }

    #[test]
    fn test_citation_caps() {
        let ids: Vec<String> = (0..10).map(|i| format!("TX-S{}", i)).collect();
        let linked: Vec<&str> = ids.iter().map(String::as_str).collect();
        let transactions = ids
            .iter()
            .enumerate()
            .map(|(i, id)| tx(id, "P-JANE", "P-CLEAN", 500.0, Some(Structuring), i as i64))
            .collect();
        let mut store = store_with(
            transactions,
            vec![case("CASE-C", "P-JANE", &linked, 10, RiskLevel::Low)],
        );
        for i in 0..4 {
            store.insert_watch_entry(WatchEntry {
                id: format!("W-US-{}", i),
                name: format!("Listed Exporter {}", i),
                aliases: vec![],
                country: "US".to_string(),
                program: "SDN".to_string(),
                reason: "Export control violation".to_string(),
            });
        }
        let (assembler, _) = assembler(store);
        let report = assembler.generate("CASE-C").unwrap();

        let of_type = |kind: CitationType| {
            report
                .citations
                .iter()
                .filter(|c| c.citation_type == kind)
                .collect::<Vec<_>>()
        };

        let transaction_citations = of_type(CitationType::Transaction);
        assert_eq!(transaction_citations.len(), 8);
        assert_eq!(transaction_citations[7].source_ids, vec!["TX-S7"]);

        let pattern_citations = of_type(CitationType::Pattern);
        assert_eq!(pattern_citations.len(), 1);
        assert_eq!(
            pattern_citations[0].description,
            "Structuring pattern detected across 10 transactions"
        );
        assert_eq!(
            pattern_citations[0].source_ids,
            vec!["TX-S0", "TX-S1", "TX-S2", "TX-S3", "TX-S4"]
        );

        let watch_citations = of_type(CitationType::SanctionsMatch);
        assert_eq!(watch_citations.len(), 3);
        assert_eq!(watch_citations[2].source_ids, vec!["W-US-2"]);

        let expected: Vec<String> = (1..=12).map(|n| format!("EV-{:03}", n)).collect();
        let actual: Vec<String> = report.citations.iter().map(|c| c.id.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_low_risk_recommendation() {
        let store = store_with(
            vec![tx("TX-1", "P-JANE", "P-CLEAN", 120.0, None, 1)],
            vec![case("CASE-L", "P-JANE", &["TX-1"], 15, RiskLevel::Low)],
        );
        let (assembler, _) = assembler(store);
        let report = assembler.generate("CASE-L").unwrap();

        assert!(report
            .recommendation
            .starts_with("RECOMMENDED ACTION: CLOSE — FALSE POSITIVE."));
        assert_eq!(report.overall_score, 15);
        assert!(report.overview.contains("confidence score of 0%"));
    }

    #[test]
    fn test_unknown_party_placeholders() {
        let store = store_with(
            vec![tx("TX-1", "P-GHOST", "P-JANE", 120.0, None, 1)],
            vec![case("CASE-G", "P-GHOST", &["TX-1"], 15, RiskLevel::Low)],
        );
        let (assembler, _) = assembler(store);
        let report = assembler.generate("CASE-G").unwrap();

        assert!(report
            .overview
            .starts_with("This Suspicious Activity Report pertains to Unknown, a unknown entity based in UNKNOWN."));
        assert_eq!(report.linked_parties[0].party_id, "P-JANE");
    }

    #[test]
    fn test_report_is_idempotent() {
        let (assembler, _) = assembler(sample_store());
        let first = assembler.generate("CASE-ORION").unwrap();
        let mut second = assembler.generate("CASE-ORION").unwrap();

        assert_ne!(first.id, second.id);
        second.id = first.id.clone();
        second.generated_at = first.generated_at;
        assert_eq!(first, second);
    }

    #[test]
    fn test_pipeline_steps_logged() {
        let (assembler, audit) = assembler(sample_store());
        let (report, evidence) = assembler.generate_with_evidence("CASE-ORION").unwrap();

        let trail = audit.trail("CASE-ORION");
        assert_eq!(
            trail.actions(),
            vec!["DATA_RETRIEVAL", "EVIDENCE_RETRIEVAL", "REPORT_GENERATION"]
        );
        assert!(trail.entries.iter().all(|e| e.component == COMPONENT));
        assert_eq!(
            trail.entries[1].input_summary,
            "Querying evidence index: 'Orion Holdings Ltd round trip suspicious'"
        );
        assert_eq!(
            trail.entries[0].evidence_ids,
            vec!["TX-101", "TX-102", "TX-104"]
        );
        assert!(trail.entries[2].output_summary.contains(&report.id));

        let hits: Vec<&str> = evidence
            .iter()
            .map(|h| h.transaction_id.as_str())
            .collect();
        assert_eq!(hits, vec!["TX-101", "TX-102"]);
    }

    #[test]
    fn test_report_wire_shape() {
        let (assembler, _) = assembler(sample_store());
        let report = assembler.generate("CASE-ORION").unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["citations"][0]["type"], "transaction");
        assert_eq!(json["citations"][3]["type"], "pattern");
        assert_eq!(json["linked_parties"][0]["relationship"], "receiver");
        assert_eq!(json["drivers"][0]["severity"], "HIGH");
        assert_eq!(json["timeline"][0]["pattern"], "structuring");
    }
}

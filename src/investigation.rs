//! Investigation orchestrator
//!
//! Wires the graph builder, risk engine, evidence index and report assembler
//! around one shared record store and audit log. Steps for a case run in
//! sequence; separate cases may be investigated from separate threads.

use crate::audit::{AuditLog, AuditStep, AuditTrail};
use crate::config::InvestigatorConfig;
use crate::evidence::{EvidenceHit, EvidenceIndex};
use crate::graph::{CaseGraph, GraphBuilder};
use crate::report::{CaseReport, ReportAssembler};
use crate::risk::{RiskAssessment, RiskEngine};
use crate::store::RecordStore;
use crate::{Case, CaseStatus, InvestigationError, Result, RiskLevel, Transaction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

const COMPONENT: &str = "orchestrator";

/// Combined result of a full investigation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investigation {
    pub case_id: String,
    pub report: CaseReport,
    pub risk: RiskAssessment,
    pub graph: CaseGraph,
    /// Ranked evidence retrieved while the report was assembled
    pub evidence: Vec<EvidenceHit>,
    pub audit_trail: AuditTrail,
}

/// A case with its linked transactions resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDetail {
    pub case: Case,
    pub transactions: Vec<Transaction>,
}

/// Case investigator
pub struct Investigator {
    store: Arc<dyn RecordStore>,
    graphs: GraphBuilder,
    risk: RiskEngine,
    reports: ReportAssembler,
    evidence: Arc<EvidenceIndex>,
    audit: Arc<AuditLog>,
}

impl Investigator {
    /// Create an investigator with its own audit log. The evidence index is
    /// built once, from every transaction in the store.
    pub fn new(store: Arc<dyn RecordStore>, config: InvestigatorConfig) -> Self {
        Self::with_audit_log(store, config, Arc::new(AuditLog::new()))
    }

    pub fn with_audit_log(
        store: Arc<dyn RecordStore>,
        config: InvestigatorConfig,
        audit: Arc<AuditLog>,
    ) -> Self {
        let jurisdictions = config.jurisdictions();
        let risk = RiskEngine::with_config(store.clone(), config.risk, jurisdictions);
        let evidence = Arc::new(EvidenceIndex::from_store(store.as_ref()));
        let reports = ReportAssembler::new(
            store.clone(),
            risk.clone(),
            evidence.clone(),
            audit.clone(),
            config.report,
        );

        info!(indexed = evidence.len(), "investigator ready");

        Self {
            graphs: GraphBuilder::new(store.clone()),
            store,
            risk,
            reports,
            evidence,
            audit,
        }
    }

    /// Relationship graph for a case; empty for unknown cases
    pub fn get_graph(&self, case_id: &str) -> CaseGraph {
        self.graphs.build(case_id)
    }

    /// Risk assessment for a case; zero-valued for unknown cases
    pub fn get_risk(&self, case_id: &str) -> RiskAssessment {
        self.risk.assess(case_id)
    }

    /// Narrative report for a case. Does not write to the audit log.
    pub fn get_report(&self, case_id: &str) -> Result<CaseReport> {
        self.reports.generate(case_id)
    }

    /// Run the full pipeline for a case: mark it under review, then build the
    /// graph, score the risk and assemble the report, logging every step.
    pub fn investigate(&self, case_id: &str) -> Result<Investigation> {
        let started = Instant::now();
        let case = self.store.case(case_id).ok_or_else(|| {
            warn!(case_id = %case_id, "investigation requested for unknown case");
            InvestigationError::CaseNotFound(case_id.to_string())
        })?;

        self.store
            .update_case_status(case_id, CaseStatus::UnderReview);
        self.audit.log_step(
            AuditStep::new(case_id, "INVESTIGATION_START", COMPONENT)
                .input(format!("Investigation initiated for case {}", case_id))
                .output(format!(
                    "Primary party: {}, baseline: {} ({})",
                    case.primary_party_id, case.baseline_level, case.baseline_score
                )),
        );

        let mut scope = self.audit.scope(
            case_id,
            "GRAPH_BUILT",
            "graph_builder",
            format!("Building relationship graph for {}", case_id),
        );
        let graph = self.graphs.build(case_id);
        scope.set_output(
            format!(
                "Graph contains {} nodes and {} edges",
                graph.node_count(),
                graph.edge_count()
            ),
            graph.nodes().iter().take(5).map(|n| n.id.clone()).collect(),
        );
        scope.finish();

        let mut scope = self.audit.scope(
            case_id,
            "RISK_ANALYZED",
            "risk_engine",
            format!("Analyzing risk for {}", case_id),
        );
        let risk = self.risk.assess(case_id);
        scope.set_output(
            format!(
                "Risk level: {}, Score: {}, {} drivers identified",
                risk.level,
                risk.score,
                risk.drivers.len()
            ),
            risk.drivers
                .iter()
                .filter_map(|d| d.evidence_ids.first().cloned())
                .collect(),
        );
        scope.finish();

        let (report, evidence) = self.reports.generate_with_evidence(case_id)?;

        self.audit.log_step(
            AuditStep::new(case_id, "INVESTIGATION_COMPLETE", COMPONENT)
                .input(format!("Investigation completed for {}", case_id))
                .output(format!("Report {} generated. Risk: {}", report.id, risk.level)),
        );

        // Completion has no duration of its own; the trail total is the sum of the steps
        info!(
            case_id = %case_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            score = risk.score,
            level = %risk.level,
            report_id = %report.id,
            "investigation complete"
        );

        Ok(Investigation {
            case_id: case_id.to_string(),
            report,
            risk,
            graph,
            evidence,
            audit_trail: self.audit.trail(case_id),
        })
    }

    /// Clear the case's audit trail, then investigate it again
    pub fn reinvestigate(&self, case_id: &str) -> Result<Investigation> {
        if self.store.case(case_id).is_none() {
            return Err(InvestigationError::CaseNotFound(case_id.to_string()));
        }
        self.audit.clear(case_id);
        self.investigate(case_id)
    }

    pub fn get_audit_trail(&self, case_id: &str) -> AuditTrail {
        self.audit.trail(case_id)
    }

    /// Cases filtered by baseline level and status
    pub fn list_cases(&self, level: Option<RiskLevel>, status: Option<CaseStatus>) -> Vec<Case> {
        self.store.list_cases(level, status)
    }

    /// A case with its linked transactions
    pub fn case_detail(&self, case_id: &str) -> Result<CaseDetail> {
        let case = self
            .store
            .case(case_id)
            .ok_or_else(|| InvestigationError::CaseNotFound(case_id.to_string()))?;
        let transactions = self.store.transactions_by_ids(&case.linked_transaction_ids);
        Ok(CaseDetail { case, transactions })
    }

    pub fn evidence_index(&self) -> &EvidenceIndex {
        &self.evidence
    }

    pub fn audit_log(&self) -> &Arc<AuditLog> {
        &self.audit
    }
}

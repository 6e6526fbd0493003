//! Case investigation example
//!
//! Loads a small set of records, investigates one alert end to end and
//! prints the risk drivers, report sections and audit trail.

use chrono::{Duration, TimeZone, Utc};
use sentinel_investigator::{
    Account, Case, CaseStatus, InMemoryStore, Investigator, InvestigatorConfig, Party, PartyType,
    RiskLevel, SuspiciousPattern, Transaction, TransactionType, WatchEntry,
};
use std::sync::Arc;

fn party(id: &str, name: &str, party_type: PartyType, country: &str) -> Party {
    Party {
        id: id.to_string(),
        name: name.to_string(),
        party_type,
        country: country.to_string(),
        risk_flag: false,
        politically_exposed: false,
    }
}

fn wire(
    id: &str,
    from: &Party,
    to: &Party,
    amount: f64,
    pattern: Option<SuspiciousPattern>,
    day: i64,
    description: &str,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 6, 10, 0, 0).unwrap() + Duration::days(day),
        sender_account: format!("ACC-{}", from.id),
        sender_party: from.id.clone(),
        sender_name: from.name.clone(),
        sender_country: from.country.clone(),
        receiver_account: format!("ACC-{}", to.id),
        receiver_party: to.id.clone(),
        receiver_name: to.name.clone(),
        receiver_country: to.country.clone(),
        amount,
        currency: "USD".to_string(),
        transaction_type: TransactionType::Wire,
        suspicious_pattern: pattern,
        description: description.to_string(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Sentinel Case Investigation ===\n");

    let harbor = party("E-001", "Harbor Light Holdings", PartyType::ShellCompany, "KY");
    let atlas = party("E-002", "Atlas Freight LLC", PartyType::Corporation, "US");
    let volga = party("E-003", "Volga Commodities", PartyType::Corporation, "RU");

    let mut store = InMemoryStore::new();
    for p in [&harbor, &atlas, &volga] {
        store.insert_party(p.clone())?;
        store.insert_account(Account {
            id: format!("ACC-{}", p.id),
            owner_party_id: p.id.clone(),
            currency: "USD".to_string(),
            country: p.country.clone(),
        })?;
    }
    store.insert_watch_entry(WatchEntry {
        id: "SAN-014".to_string(),
        name: "Volga Commodities Group".to_string(),
        aliases: vec![],
        country: "RU".to_string(),
        program: "RUSSIA-EO14024".to_string(),
        reason: "Sectoral sanctions designation".to_string(),
    });

    use SuspiciousPattern::*;
    for t in [
        wire("TX-1", &harbor, &atlas, 9_400.0, Some(Structuring), 0, "Cash-equivalent wire just under threshold"),
        wire("TX-2", &harbor, &atlas, 9_750.0, Some(Structuring), 1, "Second wire just under threshold"),
        wire("TX-3", &harbor, &volga, 180_000.0, Some(RoundTrip), 3, "Round trip wire to commodities trader"),
        wire("TX-4", &volga, &harbor, 176_500.0, Some(RoundTrip), 6, "Return wire from commodities trader"),
    ] {
        store.insert_transaction(t)?;
    }
    store.insert_case(Case {
        id: "ALERT-001".to_string(),
        primary_party_id: harbor.id.clone(),
        baseline_score: 68,
        baseline_level: RiskLevel::High,
        trigger_pattern: Structuring,
        linked_transaction_ids: vec!["TX-1".to_string(), "TX-2".to_string()],
        watch_list_match: false,
        status: CaseStatus::New,
    })?;

    let investigator = Investigator::new(Arc::new(store), InvestigatorConfig::default());
    let investigation = investigator.investigate("ALERT-001")?;

    println!("1. Risk Assessment");
    println!("   {}", investigation.risk.summary);
    for driver in &investigation.risk.drivers {
        println!(
            "   - [{}] {} ({:.0}%): {}",
            driver.severity,
            driver.indicator,
            driver.confidence * 100.0,
            driver.description
        );
    }
    println!();

    println!("2. Relationship Graph");
    println!(
        "   {} nodes, {} edges",
        investigation.graph.node_count(),
        investigation.graph.edge_count()
    );
    println!();

    let report = &investigation.report;
    println!("3. Report {}", report.id);
    println!("   {}", report.overview);
    for entry in &report.timeline {
        let marker = if entry.flagged { "!" } else { " " };
        println!("   {} {} {}", marker, entry.date.format("%Y-%m-%d"), entry.event);
    }
    for citation in &report.citations {
        println!("   {} {}", citation.id, citation.description);
    }
    println!("   {}", report.recommendation);
    println!();

    println!("4. Audit Trail");
    for entry in &investigation.audit_trail.entries {
        println!(
            "   {} {:<24} {:>4}ms  {}",
            entry.id, entry.action, entry.duration_ms, entry.output_summary
        );
    }
    println!(
        "   fingerprint: {}",
        investigation.audit_trail.fingerprint()
    );

    Ok(())
}

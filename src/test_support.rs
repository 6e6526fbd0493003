//! Shared fixtures for unit tests

use crate::store::InMemoryStore;
use crate::watchlist::WatchEntry;
use crate::{
    Account, Case, CaseStatus, Party, PartyType, RiskLevel, SuspiciousPattern, Transaction,
    TransactionType,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

fn party_profile(id: &str) -> (&'static str, &'static str) {
    match id {
        "P-ORION" => ("Orion Holdings Ltd", "KY"),
        "P-JANE" => ("Jane Smith", "US"),
        "P-NADIR" => ("Nadir Trading", "RU"),
        "P-CLEAN" => ("Maple Bakery", "CA"),
        _ => ("Ghost Counterparty", "GB"),
    }
}

pub fn account_of(party_id: &str) -> String {
    format!("ACC-{}", party_id.trim_start_matches("P-"))
}

pub fn parties() -> Vec<Party> {
    vec![
        Party {
            id: "P-ORION".to_string(),
            name: "Orion Holdings Ltd".to_string(),
            party_type: PartyType::ShellCompany,
            country: "KY".to_string(),
            risk_flag: true,
            politically_exposed: false,
        },
        Party {
            id: "P-JANE".to_string(),
            name: "Jane Smith".to_string(),
            party_type: PartyType::Individual,
            country: "US".to_string(),
            risk_flag: false,
            politically_exposed: false,
        },
        Party {
            id: "P-NADIR".to_string(),
            name: "Nadir Trading".to_string(),
            party_type: PartyType::Corporation,
            country: "RU".to_string(),
            risk_flag: false,
            politically_exposed: true,
        },
        Party {
            id: "P-CLEAN".to_string(),
            name: "Maple Bakery".to_string(),
            party_type: PartyType::Corporation,
            country: "CA".to_string(),
            risk_flag: false,
            politically_exposed: false,
        },
    ]
}

pub fn accounts() -> Vec<Account> {
    parties()
        .into_iter()
        .map(|party| Account {
            id: account_of(&party.id),
            owner_party_id: party.id,
            currency: "USD".to_string(),
            country: party.country,
        })
        .collect()
}

pub fn watch_entries() -> Vec<WatchEntry> {
    vec![
        WatchEntry {
            id: "W-001".to_string(),
            name: "Nadir Trading Company".to_string(),
            aliases: vec!["NTC Group".to_string()],
            country: "RU".to_string(),
            program: "RUSSIA-EO14024".to_string(),
            reason: "Sectoral sanctions designation".to_string(),
        },
        WatchEntry {
            id: "W-002".to_string(),
            name: "Tehran Petro Exchange".to_string(),
            aliases: vec![],
            country: "IR".to_string(),
            program: "IRAN".to_string(),
            reason: "Petroleum sector sanctions".to_string(),
        },
    ]
}

/// Build a transaction between two fixture parties, `day` days after the base time
pub fn tx(
    id: &str,
    sender: &str,
    receiver: &str,
    amount: f64,
    pattern: Option<SuspiciousPattern>,
    day: i64,
) -> Transaction {
    let (sender_name, sender_country) = party_profile(sender);
    let (receiver_name, receiver_country) = party_profile(receiver);
    let description = match pattern {
        Some(p) => format!("{} pattern observed on outgoing transfer", p.title()),
        None => "Routine vendor payment".to_string(),
    };

    Transaction {
        id: id.to_string(),
        timestamp: base_time() + Duration::days(day),
        sender_account: account_of(sender),
        sender_party: sender.to_string(),
        sender_name: sender_name.to_string(),
        sender_country: sender_country.to_string(),
        receiver_account: account_of(receiver),
        receiver_party: receiver.to_string(),
        receiver_name: receiver_name.to_string(),
        receiver_country: receiver_country.to_string(),
        amount,
        currency: "USD".to_string(),
        transaction_type: TransactionType::Wire,
        suspicious_pattern: pattern,
        description,
    }
}

pub fn case(
    id: &str,
    party_id: &str,
    linked: &[&str],
    baseline_score: u8,
    baseline_level: RiskLevel,
) -> Case {
    Case {
        id: id.to_string(),
        primary_party_id: party_id.to_string(),
        baseline_score,
        baseline_level,
        trigger_pattern: SuspiciousPattern::Structuring,
        linked_transaction_ids: linked.iter().map(|s| s.to_string()).collect(),
        watch_list_match: false,
        status: CaseStatus::New,
    }
}

/// Store with the fixture parties, accounts and watch list plus the given records
pub fn store_with(transactions: Vec<Transaction>, cases: Vec<Case>) -> InMemoryStore {
    let mut store = InMemoryStore::new();
    for party in parties() {
        store.insert_party(party).unwrap();
    }
    for account in accounts() {
        store.insert_account(account).unwrap();
    }
    for entry in watch_entries() {
        store.insert_watch_entry(entry);
    }
    for transaction in transactions {
        store.insert_transaction(transaction).unwrap();
    }
    for c in cases {
        store.insert_case(c).unwrap();
    }
    store
}

/// The Orion shell-company scenario: round-tripping with a watch-listed
/// counterparty, one structuring payment and one rapid movement
pub fn orion_transactions() -> Vec<Transaction> {
    use SuspiciousPattern::*;
    vec![
        tx("TX-101", "P-ORION", "P-NADIR", 45_000.0, Some(RoundTrip), 3),
        tx("TX-102", "P-NADIR", "P-ORION", 44_000.0, Some(RoundTrip), 5),
        tx("TX-103", "P-ORION", "P-JANE", 9_200.0, Some(Structuring), 1),
        tx("TX-104", "P-JANE", "P-CLEAN", 300.0, None, 2),
        tx("TX-105", "P-ORION", "P-CLEAN", 12_000.0, Some(RapidMovement), 4),
        tx("TX-106", "P-CLEAN", "P-JANE", 150.0, None, 6),
    ]
}

pub fn orion_case() -> Case {
    let mut c = case(
        "CASE-ORION",
        "P-ORION",
        &["TX-101", "TX-102", "TX-104"],
        72,
        RiskLevel::High,
    );
    c.trigger_pattern = SuspiciousPattern::RoundTrip;
    c
}

pub fn sample_store() -> InMemoryStore {
    store_with(orion_transactions(), vec![orion_case()])
}

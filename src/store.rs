//! Record store interface
//!
//! The investigation core only reads source records through [`RecordStore`].
//! Lookups return `Option`/empty collections; absence is a normal answer and
//! never an error at this layer. [`InMemoryStore`] is the process-resident
//! implementation used by services and tests.

use crate::watchlist::{WatchEntry, WatchList};
use crate::{Account, Case, CaseStatus, InvestigationError, Party, Result, RiskLevel, Transaction};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Read access to parties, accounts, transactions, watch-list and cases,
/// plus the one permitted write (case status)
pub trait RecordStore: Send + Sync {
    fn case(&self, case_id: &str) -> Option<Case>;

    fn party(&self, party_id: &str) -> Option<Party>;

    fn account(&self, account_id: &str) -> Option<Account>;

    /// Transactions sent or received by the party, in store order
    fn transactions_for_party(&self, party_id: &str) -> Vec<Transaction>;

    /// Transactions whose id is in `ids`, in store order
    fn transactions_by_ids(&self, ids: &[String]) -> Vec<Transaction>;

    /// The whole transaction corpus, in store order
    fn all_transactions(&self) -> Vec<Transaction>;

    /// Fuzzy watch-list screening of a name and country
    fn watch_list_matches(&self, name: &str, country: &str) -> Vec<WatchEntry>;

    /// Cases filtered by baseline level and/or status
    fn list_cases(&self, level: Option<RiskLevel>, status: Option<CaseStatus>) -> Vec<Case>;

    /// Returns `false` when the case is unknown
    fn update_case_status(&self, case_id: &str, status: CaseStatus) -> bool;
}

/// In-memory record store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    parties: HashMap<String, Party>,
    accounts: HashMap<String, Account>,
    transactions: Vec<Transaction>,
    transaction_ids: HashSet<String>,
    watch_list: WatchList,
    cases: RwLock<Vec<Case>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a party; ids must be unique
    pub fn insert_party(&mut self, party: Party) -> Result<()> {
        if party.id.trim().is_empty() {
            return Err(InvestigationError::InvalidRecord(
                "Party id must not be empty".to_string(),
            ));
        }
        if self.parties.contains_key(&party.id) {
            return Err(InvestigationError::InvalidRecord(format!(
                "Duplicate party id {}",
                party.id
            )));
        }
        self.parties.insert(party.id.clone(), party);
        Ok(())
    }

    /// Insert an account; ids must be unique. The owner does not have to be
    /// a known party.
    pub fn insert_account(&mut self, account: Account) -> Result<()> {
        if account.id.trim().is_empty() {
            return Err(InvestigationError::InvalidRecord(
                "Account id must not be empty".to_string(),
            ));
        }
        if self.accounts.contains_key(&account.id) {
            return Err(InvestigationError::InvalidRecord(format!(
                "Duplicate account id {}",
                account.id
            )));
        }
        if !self.parties.contains_key(&account.owner_party_id) {
            debug!(
                account_id = %account.id,
                owner = %account.owner_party_id,
                "account owner is not a known party"
            );
        }
        self.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    /// Insert a validated transaction; ids must be unique
    pub fn insert_transaction(&mut self, transaction: Transaction) -> Result<()> {
        transaction.validate()?;
        if !self.transaction_ids.insert(transaction.id.clone()) {
            return Err(InvestigationError::InvalidRecord(format!(
                "Duplicate transaction id {}",
                transaction.id
            )));
        }
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn insert_watch_entry(&mut self, entry: WatchEntry) {
        self.watch_list.add_entry(entry);
    }

    /// Insert a case; ids must be unique and the baseline score within 0-100
    pub fn insert_case(&mut self, case: Case) -> Result<()> {
        if case.baseline_score > 100 {
            return Err(InvestigationError::InvalidRecord(format!(
                "Case {} baseline score {} exceeds 100",
                case.id, case.baseline_score
            )));
        }
        let cases = self.cases.get_mut();
        if cases.iter().any(|c| c.id == case.id) {
            return Err(InvestigationError::InvalidRecord(format!(
                "Duplicate case id {}",
                case.id
            )));
        }
        cases.push(case);
        Ok(())
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

impl RecordStore for InMemoryStore {
    fn case(&self, case_id: &str) -> Option<Case> {
        self.cases.read().iter().find(|c| c.id == case_id).cloned()
    }

    fn party(&self, party_id: &str) -> Option<Party> {
        self.parties.get(party_id).cloned()
    }

    fn account(&self, account_id: &str) -> Option<Account> {
        self.accounts.get(account_id).cloned()
    }

    fn transactions_for_party(&self, party_id: &str) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.involves(party_id))
            .cloned()
            .collect()
    }

    fn transactions_by_ids(&self, ids: &[String]) -> Vec<Transaction> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.transactions
            .iter()
            .filter(|t| wanted.contains(t.id.as_str()))
            .cloned()
            .collect()
    }

    fn all_transactions(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    fn watch_list_matches(&self, name: &str, country: &str) -> Vec<WatchEntry> {
        self.watch_list.screen(name, country)
    }

    fn list_cases(&self, level: Option<RiskLevel>, status: Option<CaseStatus>) -> Vec<Case> {
        self.cases
            .read()
            .iter()
            .filter(|c| level.map_or(true, |l| c.baseline_level == l))
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect()
    }

    fn update_case_status(&self, case_id: &str, status: CaseStatus) -> bool {
        let mut cases = self.cases.write();
        match cases.iter_mut().find(|c| c.id == case_id) {
            Some(case) => {
                case.status = status;
                true
            }
            None => false,
        }
    }
}

//! Evidence ranking over transaction narratives
//!
//! A deliberately small retriever: each description becomes a lower-cased set
//! of whitespace tokens and a query scores by exact token overlap. Flagged
//! transactions weigh double.

use crate::store::RecordStore;
use crate::{SuspiciousPattern, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Score multiplier for transactions carrying a suspicious-pattern tag
const FLAGGED_BOOST: f64 = 2.0;

/// A ranked query result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceHit {
    pub transaction_id: String,
    pub description: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub receiver: String,
    pub pattern: Option<SuspiciousPattern>,
    pub score: f64,
}

#[derive(Debug, Clone)]
struct IndexedTransaction {
    tokens: HashSet<String>,
    hit: EvidenceHit,
}

/// In-memory token index, built once from the transaction corpus
#[derive(Debug, Clone, Default)]
pub struct EvidenceIndex {
    entries: Vec<IndexedTransaction>,
    positions: HashMap<String, usize>,
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

impl EvidenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a corpus. A repeated transaction id replaces the earlier entry in place.
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut index = Self::new();
        for transaction in transactions {
            index.insert(transaction);
        }
        debug!(entries = index.len(), "evidence index built");
        index
    }

    pub fn from_store(store: &dyn RecordStore) -> Self {
        Self::build(&store.all_transactions())
    }

    pub fn insert(&mut self, transaction: &Transaction) {
        let entry = IndexedTransaction {
            tokens: tokenize(&transaction.description),
            hit: EvidenceHit {
                transaction_id: transaction.id.clone(),
                description: transaction.description.clone(),
                amount: transaction.amount,
                timestamp: transaction.timestamp,
                sender: transaction.sender_name.clone(),
                receiver: transaction.receiver_name.clone(),
                pattern: transaction.suspicious_pattern,
                score: 0.0,
            },
        };

        match self.positions.get(&transaction.id) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.positions
                    .insert(transaction.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Top `top_k` entries by descending score; ties keep index order.
    /// Entries with no overlapping token are never returned.
    pub fn query(&self, query: &str, top_k: usize) -> Vec<EvidenceHit> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<EvidenceHit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let overlap = entry.tokens.intersection(&query_tokens).count();
                if overlap == 0 {
                    return None;
                }
                let boost = if entry.hit.pattern.is_some() {
                    FLAGGED_BOOST
                } else {
                    1.0
                };
                let mut hit = entry.hit.clone();
                hit.score = overlap as f64 * boost;
                Some(hit)
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        scored
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Relationship graph for a case
//!
//! Expands a case into a directed graph: party nodes, account nodes, `owns`
//! edges from each party to its account and one edge per fund movement
//! between accounts. Node and edge insertion is idempotent.

use crate::store::RecordStore;
use crate::{format_usd, Transaction, UNKNOWN_CODE};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Node kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeKind {
    #[serde(rename = "entity")]
    Party,
    #[serde(rename = "account")]
    Account,
}

/// Extra node attributes; unset fields are omitted on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_list_match: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub risk: bool,
    pub country: String,
    pub attributes: NodeAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: String,
    pub amount: Option<f64>,
    pub transaction_id: Option<String>,
    pub suspicious: bool,
}

impl GraphEdge {
    /// Identity used for idempotent insertion
    fn key(&self) -> String {
        match &self.transaction_id {
            Some(tx_id) => format!("tx:{}", tx_id),
            None => format!("{}->{}:{}", self.source, self.target, self.label),
        }
    }
}

/// Wire shape of a graph, used to rebuild the lookup maps on deserialization
#[derive(Deserialize)]
struct GraphParts {
    case_id: String,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

/// Directed case graph with node index and adjacency (node id → outgoing edges)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "GraphParts")]
pub struct CaseGraph {
    pub case_id: String,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    #[serde(skip)]
    node_index: HashMap<String, usize>,
    #[serde(skip)]
    adjacency: HashMap<String, Vec<usize>>,
    #[serde(skip)]
    edge_keys: HashSet<String>,
}

impl From<GraphParts> for CaseGraph {
    fn from(parts: GraphParts) -> Self {
        let mut graph = CaseGraph::empty(parts.case_id);
        for node in parts.nodes {
            graph.add_node(node);
        }
        for edge in parts.edges {
            graph.add_edge(edge);
        }
        graph
    }
}

impl CaseGraph {
    /// Graph with no nodes for the given case
    pub fn empty(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            node_index: HashMap::new(),
            adjacency: HashMap::new(),
            edge_keys: HashSet::new(),
        }
    }

    /// Insert a node; returns `false` if the id already exists
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Insert an edge; returns `false` if it already exists or an endpoint is
    /// not a node of this graph
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        if !self.contains_node(&edge.source) || !self.contains_node(&edge.target) {
            warn!(
                case_id = %self.case_id,
                source = %edge.source,
                target = %edge.target,
                "edge endpoint missing from graph"
            );
            return false;
        }
        if !self.edge_keys.insert(edge.key()) {
            return false;
        }
        self.adjacency
            .entry(edge.source.clone())
            .or_default()
            .push(self.edges.len());
        self.edges.push(edge);
        true
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Edges leaving the node, in insertion order
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.adjacency
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Transaction edges only (those carrying a transaction id)
    pub fn transaction_edges(&self) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.edges.iter().filter(|e| e.transaction_id.is_some())
    }
}

/// Builds case graphs from the record store
#[derive(Clone)]
pub struct GraphBuilder {
    store: Arc<dyn RecordStore>,
}

impl GraphBuilder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Build the relationship graph for a case. Unknown cases yield an empty
    /// graph carrying the requested id.
    pub fn build(&self, case_id: &str) -> CaseGraph {
        let mut graph = CaseGraph::empty(case_id);
        let Some(case) = self.store.case(case_id) else {
            warn!(case_id = %case_id, "graph requested for unknown case");
            return graph;
        };

        let transactions =
            self.relevant_transactions(&case.primary_party_id, &case.linked_transaction_ids);
        for tx in &transactions {
            self.ensure_party(
                &mut graph,
                &tx.sender_party,
                &tx.sender_name,
                &tx.sender_country,
                &case.primary_party_id,
            );
            self.ensure_party(
                &mut graph,
                &tx.receiver_party,
                &tx.receiver_name,
                &tx.receiver_country,
                &case.primary_party_id,
            );
            self.ensure_account(
                &mut graph,
                &tx.sender_account,
                &tx.sender_party,
                &tx.sender_country,
            );
            self.ensure_account(
                &mut graph,
                &tx.receiver_account,
                &tx.receiver_party,
                &tx.receiver_country,
            );

            graph.add_edge(GraphEdge {
                source: tx.sender_account.clone(),
                target: tx.receiver_account.clone(),
                label: format_usd(tx.amount),
                amount: Some(tx.amount),
                transaction_id: Some(tx.id.clone()),
                suspicious: tx.is_suspicious(),
            });
        }

        debug!(
            case_id = %case_id,
            transactions = transactions.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "case graph built"
        );
        graph
    }

    /// Linked transactions followed by the primary party's own, each id once
    fn relevant_transactions(&self, party_id: &str, linked_ids: &[String]) -> Vec<Transaction> {
        let mut seen = HashSet::new();
        self.store
            .transactions_by_ids(linked_ids)
            .into_iter()
            .chain(self.store.transactions_for_party(party_id))
            .filter(|tx| seen.insert(tx.id.clone()))
            .collect()
    }

    fn ensure_party(
        &self,
        graph: &mut CaseGraph,
        party_id: &str,
        display_name: &str,
        country: &str,
        primary_party_id: &str,
    ) {
        if graph.contains_node(party_id) {
            return;
        }

        let party = self.store.party(party_id);
        let watch_list_match = !self.store.watch_list_matches(display_name, country).is_empty();
        let risk = party.as_ref().map_or(false, |p| p.risk_flag) || watch_list_match;
        let party_type = party
            .as_ref()
            .map_or(UNKNOWN_CODE, |p| p.party_type.as_code());

        graph.add_node(GraphNode {
            id: party_id.to_string(),
            label: display_name.to_string(),
            kind: NodeKind::Party,
            risk,
            country: country.to_string(),
            attributes: NodeAttributes {
                is_primary: Some(party_id == primary_party_id),
                party_type: Some(party_type.to_string()),
                watch_list_match: Some(watch_list_match),
                currency: None,
            },
        });
    }

    fn ensure_account(
        &self,
        graph: &mut CaseGraph,
        account_id: &str,
        owner_id: &str,
        country: &str,
    ) {
        if graph.contains_node(account_id) {
            return;
        }

        let currency = self.store.account(account_id).map(|a| a.currency);
        graph.add_node(GraphNode {
            id: account_id.to_string(),
            label: account_id.to_string(),
            kind: NodeKind::Account,
            risk: false,
            country: country.to_string(),
            attributes: NodeAttributes {
                currency,
                ..Default::default()
            },
        });
        graph.add_edge(GraphEdge {
            source: owner_id.to_string(),
            target: account_id.to_string(),
            label: "owns".to_string(),
            amount: None,
            transaction_id: None,
            suspicious: false,
        });
    }
}

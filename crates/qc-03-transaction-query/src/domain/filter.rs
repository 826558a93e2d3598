//! # Filter Engine
//!
//! Compiles a `TransactionQuery` into an access path over the Confirmed
//! index and evaluates the full predicate against the candidates.
//!
//! ## Planning
//!
//! Every indexable constraint is asked for an estimated row count and the
//! smallest one drives the lookup. All constraints, the driving one
//! included, are then re-checked on each candidate, so the chosen path only
//! affects cost and never the result.

use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use super::entities::ConfirmedTransaction;
use super::index::ConfirmedIndex;
use super::query::{FilterField, FilterTerm, FilterValue, TransactionQuery};
use super::value_objects::PARALLEL_THRESHOLD;

/// How candidates are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPath {
    /// Every confirmed record is a candidate.
    FullScan,
    /// Candidates come from the secondary index of `field`.
    Index { field: FilterField },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPlan {
    pub access: AccessPath,
    pub estimated_rows: usize,
}

/// Stateless query evaluator.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterEngine;

impl FilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// Choose the cheapest access path for `query`.
    pub fn plan(&self, index: &ConfirmedIndex, query: &TransactionQuery) -> QueryPlan {
        query
            .filters
            .iter()
            .filter_map(|(field, term)| {
                index.estimate(*field, term).map(|rows| QueryPlan {
                    access: AccessPath::Index { field: *field },
                    estimated_rows: rows,
                })
            })
            .min_by_key(|plan| plan.estimated_rows)
            .unwrap_or(QueryPlan {
                access: AccessPath::FullScan,
                estimated_rows: index.len(),
            })
    }

    /// All records matching every constraint of `query`, unordered.
    pub fn execute<'a>(
        &self,
        index: &'a ConfirmedIndex,
        query: &TransactionQuery,
    ) -> Vec<&'a Arc<ConfirmedTransaction>> {
        let plan = self.plan(index, query);
        debug!(
            access = ?plan.access,
            estimated_rows = plan.estimated_rows,
            "[qc-03] Query plan selected"
        );

        let candidates = match plan.access {
            AccessPath::Index { field } => query
                .term(field)
                .and_then(|term| index.candidates(field, term)),
            AccessPath::FullScan => None,
        }
        .unwrap_or_else(|| index.records());

        if query.is_unfiltered() {
            return candidates;
        }

        if candidates.len() < PARALLEL_THRESHOLD {
            candidates
                .into_iter()
                .filter(|record| matches_query(record, query))
                .collect()
        } else {
            candidates
                .into_par_iter()
                .filter(|record| matches_query(record, query))
                .collect()
        }
    }
}

/// True when `record` satisfies every constraint of `query`.
pub fn matches_query(record: &ConfirmedTransaction, query: &TransactionQuery) -> bool {
    query
        .filters
        .iter()
        .all(|(field, term)| matches_term(record, *field, term))
}

fn matches_term(record: &ConfirmedTransaction, field: FilterField, term: &FilterTerm) -> bool {
    let tx = &record.transaction;
    match (field, term) {
        (FilterField::Id, FilterTerm::Equality(FilterValue::Text(id))) => tx.id == *id,
        (FilterField::BlockId, FilterTerm::Equality(FilterValue::Text(block))) => {
            record.block_id == *block
        }
        (FilterField::Type, FilterTerm::Equality(FilterValue::Type(tx_type))) => {
            tx.transaction_type() == *tx_type
        }
        (FilterField::SenderId, FilterTerm::SetMembership(set)) => set.contains(&tx.sender_id),
        (FilterField::RecipientId, FilterTerm::SetMembership(set)) => tx
            .recipient_id
            .as_ref()
            .is_some_and(|recipient| set.contains(recipient)),
        (FilterField::SenderPublicKey, FilterTerm::SetMembership(set)) => tx
            .sender_public_key
            .as_ref()
            .is_some_and(|key| set.contains(&key.to_ascii_lowercase())),
        (FilterField::RecipientPublicKey, FilterTerm::SetMembership(set)) => tx
            .recipient_public_key
            .as_ref()
            .is_some_and(|key| set.contains(&key.to_ascii_lowercase())),
        (FilterField::Amount, FilterTerm::Range(range)) => range.contains(tx.amount),
        (FilterField::Height, FilterTerm::Range(range)) => range.contains(record.height),
        (FilterField::Timestamp, FilterTerm::Range(range)) => {
            range.contains(u64::from(tx.timestamp))
        }
        (FilterField::Data, FilterTerm::StringMatch(pattern)) => {
            tx.data().is_some_and(|data| pattern.matches(data))
        }
        // The validator never pairs a field with a foreign term kind.
        _ => false,
    }
}

//! # Confirmed Index
//!
//! Primary storage of the Confirmed pool plus one secondary index per
//! filterable field. Secondary indices hold ids only; records live once in
//! `by_id`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;

use super::entities::{ConfirmedTransaction, TransactionType};
use super::query::{FilterField, FilterTerm, FilterValue, RangeBound};

type IdSet = HashSet<String>;

#[derive(Debug, Clone, Default)]
pub struct ConfirmedIndex {
    by_id: HashMap<String, Arc<ConfirmedTransaction>>,
    by_block: HashMap<String, IdSet>,
    by_type: HashMap<TransactionType, IdSet>,
    by_sender: HashMap<String, IdSet>,
    by_recipient: HashMap<String, IdSet>,
    by_sender_public_key: HashMap<String, IdSet>,
    by_recipient_public_key: HashMap<String, IdSet>,
    by_amount: BTreeMap<u64, IdSet>,
    by_height: BTreeMap<u64, IdSet>,
    by_timestamp: BTreeMap<u64, IdSet>,
    tip_height: u64,
}

impl ConfirmedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a confirmed record. The caller guarantees the id is new.
    pub fn insert(&mut self, record: ConfirmedTransaction) {
        let id = record.id().to_string();
        let tx = &record.transaction;

        add(&mut self.by_block, record.block_id.clone(), &id);
        add(&mut self.by_type, tx.transaction_type(), &id);
        add(&mut self.by_sender, tx.sender_id.clone(), &id);
        if let Some(recipient) = &tx.recipient_id {
            add(&mut self.by_recipient, recipient.clone(), &id);
        }
        if let Some(key) = &tx.sender_public_key {
            add(&mut self.by_sender_public_key, key.to_ascii_lowercase(), &id);
        }
        if let Some(key) = &tx.recipient_public_key {
            add(&mut self.by_recipient_public_key, key.to_ascii_lowercase(), &id);
        }
        add_ordered(&mut self.by_amount, tx.amount, &id);
        add_ordered(&mut self.by_height, record.height, &id);
        add_ordered(&mut self.by_timestamp, u64::from(tx.timestamp), &id);

        self.tip_height = self.tip_height.max(record.height);
        self.by_id.insert(id, Arc::new(record));
    }

    /// Record a block with no transactions.
    pub fn advance_tip(&mut self, height: u64) {
        self.tip_height = self.tip_height.max(height);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ConfirmedTransaction>> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Highest confirmed block height, 0 before the first block.
    pub fn tip_height(&self) -> u64 {
        self.tip_height
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConfirmedTransaction>> {
        self.by_id.values()
    }

    /// All records, for full scans.
    pub fn records(&self) -> Vec<&Arc<ConfirmedTransaction>> {
        self.by_id.values().collect()
    }

    /// Number of records the index would yield for `term` on `field`.
    ///
    /// `None` when the pair cannot be served by an index.
    pub fn estimate(&self, field: FilterField, term: &FilterTerm) -> Option<usize> {
        Some(match (field, term) {
            (FilterField::Id, FilterTerm::Equality(FilterValue::Text(id))) => {
                usize::from(self.by_id.contains_key(id))
            }
            (FilterField::BlockId, FilterTerm::Equality(FilterValue::Text(block))) => {
                bucket_len(&self.by_block, block)
            }
            (FilterField::Type, FilterTerm::Equality(FilterValue::Type(tx_type))) => {
                bucket_len(&self.by_type, tx_type)
            }
            (_, FilterTerm::SetMembership(values)) => {
                let map = self.keyed_map(field)?;
                values.iter().map(|v| bucket_len(map, v)).sum()
            }
            (_, FilterTerm::Range(range)) => {
                let map = self.ordered_map(field)?;
                range_buckets(map, range).map(HashSet::len).sum()
            }
            _ => return None,
        })
    }

    /// Records the index yields for `term` on `field`.
    ///
    /// Candidates satisfy `term` but not necessarily the rest of the query.
    pub fn candidates(
        &self,
        field: FilterField,
        term: &FilterTerm,
    ) -> Option<Vec<&Arc<ConfirmedTransaction>>> {
        let ids: Vec<&String> = match (field, term) {
            (FilterField::Id, FilterTerm::Equality(FilterValue::Text(id))) => {
                return Some(self.by_id.get(id).into_iter().collect());
            }
            (FilterField::BlockId, FilterTerm::Equality(FilterValue::Text(block))) => {
                self.by_block.get(block).into_iter().flatten().collect()
            }
            (FilterField::Type, FilterTerm::Equality(FilterValue::Type(tx_type))) => {
                self.by_type.get(tx_type).into_iter().flatten().collect()
            }
            (_, FilterTerm::SetMembership(values)) => {
                let map = self.keyed_map(field)?;
                values
                    .iter()
                    .filter_map(|v| map.get(v))
                    .flatten()
                    .collect()
            }
            (_, FilterTerm::Range(range)) => {
                let map = self.ordered_map(field)?;
                range_buckets(map, range).flatten().collect()
            }
            _ => return None,
        };

        // a record sits in exactly one bucket per index
        Some(ids.into_iter().filter_map(|id| self.by_id.get(id)).collect())
    }

    fn keyed_map(&self, field: FilterField) -> Option<&HashMap<String, IdSet>> {
        match field {
            FilterField::SenderId => Some(&self.by_sender),
            FilterField::RecipientId => Some(&self.by_recipient),
            FilterField::SenderPublicKey => Some(&self.by_sender_public_key),
            FilterField::RecipientPublicKey => Some(&self.by_recipient_public_key),
            _ => None,
        }
    }

    fn ordered_map(&self, field: FilterField) -> Option<&BTreeMap<u64, IdSet>> {
        match field {
            FilterField::Amount => Some(&self.by_amount),
            FilterField::Height => Some(&self.by_height),
            FilterField::Timestamp => Some(&self.by_timestamp),
            _ => None,
        }
    }
}

fn add<K: std::hash::Hash + Eq>(map: &mut HashMap<K, IdSet>, key: K, id: &str) {
    map.entry(key).or_default().insert(id.to_string());
}

fn add_ordered(map: &mut BTreeMap<u64, IdSet>, key: u64, id: &str) {
    map.entry(key).or_default().insert(id.to_string());
}

fn bucket_len<K, Q>(map: &HashMap<K, IdSet>, key: &Q) -> usize
where
    K: std::borrow::Borrow<Q> + std::hash::Hash + Eq,
    Q: std::hash::Hash + Eq + ?Sized,
{
    map.get(key).map_or(0, HashSet::len)
}

/// Buckets inside `range`; none when the bounds cross.
fn range_buckets<'a>(
    map: &'a BTreeMap<u64, IdSet>,
    range: &RangeBound,
) -> Box<dyn Iterator<Item = &'a IdSet> + 'a> {
    if range.is_empty() {
        return Box::new(std::iter::empty());
    }
    let lower = range.min.map_or(Bound::Unbounded, Bound::Included);
    let upper = range.max.map_or(Bound::Unbounded, Bound::Included);
    Box::new(map.range((lower, upper)).map(|(_, ids)| ids))
}

//! # Sort Engine
//!
//! Orders matched records by one field in one direction.
//!
//! Absent values (`recipientId`, `recipientPublicKey`, `senderPublicKey`)
//! sort after every present value in both directions. Ties fall back to `id`
//! ascending, which makes every ordering total.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;

use super::entities::ConfirmedTransaction;
use super::query::{SortDirection, SortField, SortOrder};
use super::value_objects::PARALLEL_THRESHOLD;

/// Comparable value of a sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Number(u64),
    Text(&'a str),
}

impl SortField {
    /// Value of this field on `record`; `None` when the field is absent.
    pub fn key<'a>(&self, record: &'a ConfirmedTransaction) -> Option<SortKey<'a>> {
        let tx = record.transaction.as_ref();
        match self {
            Self::Amount => Some(SortKey::Number(tx.amount)),
            Self::Fee => Some(SortKey::Number(tx.fee)),
            Self::Type => Some(SortKey::Number(u64::from(tx.transaction_type().code()))),
            Self::Timestamp => Some(SortKey::Number(u64::from(tx.timestamp))),
            Self::Height => Some(SortKey::Number(record.height)),
            Self::Id => Some(SortKey::Text(&tx.id)),
            Self::BlockId => Some(SortKey::Text(&record.block_id)),
            Self::SenderId => Some(SortKey::Text(&tx.sender_id)),
            Self::RecipientId => tx.recipient_id.as_deref().map(SortKey::Text),
            Self::SenderPublicKey => tx.sender_public_key.as_deref().map(SortKey::Text),
            Self::RecipientPublicKey => tx.recipient_public_key.as_deref().map(SortKey::Text),
        }
    }
}

/// Total order over confirmed records for `order`.
pub fn compare(a: &ConfirmedTransaction, b: &ConfirmedTransaction, order: SortOrder) -> Ordering {
    let primary = match (order.field.key(a), order.field.key(b)) {
        (Some(left), Some(right)) => match order.direction {
            SortDirection::Asc => left.cmp(&right),
            SortDirection::Desc => right.cmp(&left),
        },
        // nulls last regardless of direction
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    primary.then_with(|| a.id().cmp(b.id()))
}

/// Sort `records` in place.
pub fn sort_records(records: &mut [&Arc<ConfirmedTransaction>], order: SortOrder) {
    if records.len() < PARALLEL_THRESHOLD {
        records.sort_unstable_by(|a, b| compare(a, b, order));
    } else {
        records.par_sort_unstable_by(|a, b| compare(a, b, order));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Asset, Transaction};
    use proptest::prelude::*;

    fn record(id: u32, amount: u64, recipient: Option<u32>) -> Arc<ConfirmedTransaction> {
        Arc::new(ConfirmedTransaction {
            transaction: Arc::new(Transaction {
                id: id.to_string(),
                amount,
                fee: 1,
                sender_id: "1L".into(),
                sender_public_key: None,
                recipient_id: recipient.map(|r| format!("{}L", r)),
                recipient_public_key: None,
                timestamp: 0,
                asset: Asset::Send { data: None },
                signature: String::new(),
                sign_signature: None,
                signatures: vec![],
            }),
            block_id: "1".into(),
            height: 1,
        })
    }

    fn sorted_ids(records: &[Arc<ConfirmedTransaction>], order: SortOrder) -> Vec<String> {
        let mut refs: Vec<&Arc<ConfirmedTransaction>> = records.iter().collect();
        sort_records(&mut refs, order);
        refs.iter().map(|r| r.id().to_string()).collect()
    }

    fn order(field: SortField, direction: SortDirection) -> SortOrder {
        SortOrder { field, direction }
    }

    #[test]
    fn test_nulls_last_both_directions() {
        let records = vec![record(1, 0, None), record(2, 0, Some(5)), record(3, 0, Some(7))];

        assert_eq!(
            sorted_ids(&records, order(SortField::RecipientId, SortDirection::Asc)),
            vec!["2", "3", "1"]
        );
        assert_eq!(
            sorted_ids(&records, order(SortField::RecipientId, SortDirection::Desc)),
            vec!["3", "2", "1"]
        );
    }

    #[test]
    fn test_ties_broken_by_id_ascending() {
        let records = vec![record(3, 10, None), record(1, 10, None), record(2, 5, None)];
        assert_eq!(
            sorted_ids(&records, order(SortField::Amount, SortDirection::Desc)),
            vec!["1", "3", "2"]
        );
    }

    #[test]
    fn test_numeric_fields_compare_numerically() {
        let records = vec![record(1, 9, None), record(2, 10, None), record(3, 100, None)];
        assert_eq!(
            sorted_ids(&records, order(SortField::Amount, SortDirection::Asc)),
            vec!["1", "2", "3"]
        );
    }

    fn records_strategy() -> impl Strategy<Value = Vec<Arc<ConfirmedTransaction>>> {
        prop::collection::vec((0u64..1_000, prop::option::of(0u32..50)), 0..60).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (amount, recipient))| record(i as u32, amount, recipient))
                    .collect()
            },
        )
    }

    fn direction_strategy() -> impl Strategy<Value = SortDirection> {
        prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
    }

    proptest! {
        /// Adjacent rows never violate the requested direction.
        #[test]
        fn prop_amount_sort_is_monotonic(
            records in records_strategy(),
            direction in direction_strategy()
        ) {
            let mut refs: Vec<&Arc<ConfirmedTransaction>> = records.iter().collect();
            sort_records(&mut refs, order(SortField::Amount, direction));

            for pair in refs.windows(2) {
                let (a, b) = (pair[0].transaction.amount, pair[1].transaction.amount);
                match direction {
                    SortDirection::Asc => prop_assert!(a <= b),
                    SortDirection::Desc => prop_assert!(a >= b),
                }
            }
        }

        /// Once a null appears, only nulls follow.
        #[test]
        fn prop_nulls_sort_last(
            records in records_strategy(),
            direction in direction_strategy()
        ) {
            let mut refs: Vec<&Arc<ConfirmedTransaction>> = records.iter().collect();
            sort_records(&mut refs, order(SortField::RecipientId, direction));

            let first_null = refs
                .iter()
                .position(|r| r.transaction.recipient_id.is_none())
                .unwrap_or(refs.len());
            prop_assert!(refs[first_null..]
                .iter()
                .all(|r| r.transaction.recipient_id.is_none()));
        }

        /// Input order does not leak into the output.
        #[test]
        fn prop_sort_is_deterministic(
            records in records_strategy(),
            direction in direction_strategy()
        ) {
            let forward = sorted_ids(&records, order(SortField::RecipientId, direction));
            let mut reversed_input = records.clone();
            reversed_input.reverse();
            let backward = sorted_ids(&reversed_input, order(SortField::RecipientId, direction));
            prop_assert_eq!(forward, backward);
        }
    }
}

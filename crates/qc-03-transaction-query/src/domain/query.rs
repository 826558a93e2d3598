//! # Query Specification
//!
//! The validated, structured form of a `/transactions` request. Built once
//! by the validator; nothing downstream looks at raw parameter strings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::entities::TransactionType;
use super::value_objects::DEFAULT_LIMIT;

/// Fields a query can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    Id,
    BlockId,
    Type,
    SenderId,
    RecipientId,
    SenderPublicKey,
    RecipientPublicKey,
    Amount,
    Height,
    Timestamp,
    Data,
}

/// Exact value for an equality constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Type(TransactionType),
}

/// Inclusive bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeBound {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl RangeBound {
    /// Tighten the lower bound.
    pub fn raise_min(&mut self, min: u64) {
        self.min = Some(self.min.map_or(min, |current| current.max(min)));
    }

    /// Tighten the upper bound.
    pub fn lower_max(&mut self, max: u64) {
        self.max = Some(self.max.map_or(max, |current| current.min(max)));
    }

    pub fn contains(&self, value: u64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    /// True when no value can satisfy both bounds.
    pub fn is_empty(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }
}

/// Pattern where `%` matches any run of characters and everything else
/// matches literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePattern {
    raw: String,
}

impl LikePattern {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, text: &str) -> bool {
        let segments: Vec<&str> = self.raw.split('%').collect();
        // split always yields at least one segment
        let (first, rest) = match segments.split_first() {
            Some(parts) => parts,
            None => return text.is_empty(),
        };
        if rest.is_empty() {
            return text == *first;
        }
        let Some(mut remaining) = text.strip_prefix(first) else {
            return false;
        };
        let (last, middle) = match rest.split_last() {
            Some(parts) => parts,
            None => return true,
        };
        for segment in middle {
            match remaining.find(segment) {
                Some(pos) => remaining = &remaining[pos + segment.len()..],
                None => return false,
            }
        }
        remaining.len() >= last.len() && remaining.ends_with(last)
    }
}

/// One constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTerm {
    Equality(FilterValue),
    /// Matches when the field equals any member.
    SetMembership(BTreeSet<String>),
    Range(RangeBound),
    StringMatch(LikePattern),
}

/// Fields results can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Amount,
    Fee,
    Type,
    Timestamp,
    Height,
    Id,
    BlockId,
    SenderId,
    RecipientId,
    SenderPublicKey,
    RecipientPublicKey,
}

impl SortField {
    pub const ALL: [SortField; 11] = [
        Self::Amount,
        Self::Fee,
        Self::Type,
        Self::Timestamp,
        Self::Height,
        Self::Id,
        Self::BlockId,
        Self::SenderId,
        Self::RecipientId,
        Self::SenderPublicKey,
        Self::RecipientPublicKey,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Fee => "fee",
            Self::Type => "type",
            Self::Timestamp => "timestamp",
            Self::Height => "height",
            Self::Id => "id",
            Self::BlockId => "blockId",
            Self::SenderId => "senderId",
            Self::RecipientId => "recipientId",
            Self::SenderPublicKey => "senderPublicKey",
            Self::RecipientPublicKey => "recipientPublicKey",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Requested ordering. Defaults to `timestamp:asc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: SortField::Timestamp,
            direction: SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field.name(), self.direction.name())
    }
}

/// A validated confirmed-pool query.
///
/// Constraints on distinct fields are conjunctive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    pub filters: BTreeMap<FilterField, FilterTerm>,
    pub sort: SortOrder,
    pub limit: usize,
    pub offset: usize,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            filters: BTreeMap::new(),
            sort: SortOrder::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl TransactionQuery {
    pub fn term(&self, field: FilterField) -> Option<&FilterTerm> {
        self.filters.get(&field)
    }

    pub fn is_unfiltered(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Optional filters accepted by the transient pool listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingFilter {
    pub sender_public_key: Option<String>,
    /// Matches either the sender or the recipient address.
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bound_inclusive() {
        let range = RangeBound {
            min: Some(10),
            max: Some(20),
        };
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
        assert!(RangeBound::default().contains(u64::MAX));
    }

    #[test]
    fn test_range_bound_tightens() {
        let mut range = RangeBound::default();
        range.raise_min(5);
        range.raise_min(3);
        range.lower_max(50);
        range.lower_max(70);
        assert_eq!(range.min, Some(5));
        assert_eq!(range.max, Some(50));

        range.raise_min(51);
        assert!(range.is_empty());
    }

    #[test]
    fn test_like_pattern() {
        assert!(LikePattern::new("hello").matches("hello"));
        assert!(!LikePattern::new("hello").matches("hello!"));
        assert!(LikePattern::new("%lo").matches("hello"));
        assert!(LikePattern::new("he%").matches("hello"));
        assert!(LikePattern::new("%ll%").matches("hello"));
        assert!(LikePattern::new("h%l%o").matches("hello"));
        assert!(!LikePattern::new("h%z%o").matches("hello"));
        assert!(LikePattern::new("%").matches(""));
        // prefix and suffix may not overlap
        assert!(!LikePattern::new("ab%ba").matches("aba"));
    }

    #[test]
    fn test_sort_field_names() {
        for field in SortField::ALL {
            assert_eq!(SortField::from_name(field.name()), Some(field));
        }
        assert_eq!(SortField::from_name("signature"), None);
        assert_eq!(SortOrder::default().to_string(), "timestamp:asc");
    }
}

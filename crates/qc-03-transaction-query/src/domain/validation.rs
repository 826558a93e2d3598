//! # Parameter Validation
//!
//! Turns raw request parameters into a `TransactionQuery` (or the argument
//! of a pool lookup). Validation is fail-fast over the whole request: the
//! first invalid parameter, in request order, rejects it.

use std::collections::{BTreeSet, HashSet};

use super::entities::TransactionType;
use super::errors::ValidationError;
use super::query::{
    FilterField, FilterTerm, FilterValue, LikePattern, PendingFilter, RangeBound, SortDirection,
    SortField, SortOrder, TransactionQuery,
};
use super::value_objects::{QueryConfig, MAX_DATA_LENGTH};

/// Raw request parameters in arrival order. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Split an already percent-decoded query string (`a=1&b=2`).
    ///
    /// A key without `=` gets an empty value; empty segments are skipped.
    pub fn parse(query: &str) -> Self {
        let pairs = query
            .trim_start_matches('?')
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (segment.to_string(), String::new()),
            })
            .collect();
        Self { pairs }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Pairs sorted by key then value, joined as a query string.
    pub fn canonical_query_string(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.pairs.iter().collect();
        sorted.sort();
        sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Parameters accepted by `/transactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Parameter {
    Id,
    BlockId,
    Type,
    SenderId,
    RecipientId,
    SenderPublicKey,
    RecipientPublicKey,
    MinAmount,
    MaxAmount,
    FromHeight,
    ToHeight,
    FromTimestamp,
    ToTimestamp,
    FromUnixTime,
    ToUnixTime,
    Data,
    Limit,
    Offset,
    Sort,
}

impl Parameter {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "id" => Self::Id,
            "blockId" => Self::BlockId,
            "type" => Self::Type,
            "senderId" => Self::SenderId,
            "recipientId" => Self::RecipientId,
            "senderPublicKey" => Self::SenderPublicKey,
            "recipientPublicKey" => Self::RecipientPublicKey,
            "minAmount" => Self::MinAmount,
            "maxAmount" => Self::MaxAmount,
            "fromHeight" => Self::FromHeight,
            "toHeight" => Self::ToHeight,
            "fromTimestamp" => Self::FromTimestamp,
            "toTimestamp" => Self::ToTimestamp,
            "fromUnixTime" => Self::FromUnixTime,
            "toUnixTime" => Self::ToUnixTime,
            "data" => Self::Data,
            "limit" => Self::Limit,
            "offset" => Self::Offset,
            "sort" => Self::Sort,
            _ => return None,
        })
    }

    fn is_repeatable(self) -> bool {
        matches!(
            self,
            Self::SenderId | Self::RecipientId | Self::SenderPublicKey | Self::RecipientPublicKey
        )
    }
}

/// Accumulates validated constraints before they become a query.
#[derive(Default)]
struct QueryBuilder {
    id: Option<String>,
    block_id: Option<String>,
    tx_type: Option<TransactionType>,
    sender_ids: BTreeSet<String>,
    recipient_ids: BTreeSet<String>,
    sender_public_keys: BTreeSet<String>,
    recipient_public_keys: BTreeSet<String>,
    amount: RangeBound,
    height: RangeBound,
    timestamp: RangeBound,
    data: Option<LikePattern>,
    limit: Option<usize>,
    offset: Option<usize>,
    sort: Option<SortOrder>,
}

impl QueryBuilder {
    fn build(self, default_limit: usize) -> TransactionQuery {
        let mut query = TransactionQuery {
            limit: self.limit.unwrap_or(default_limit),
            offset: self.offset.unwrap_or(0),
            sort: self.sort.unwrap_or_default(),
            ..TransactionQuery::default()
        };
        let filters = &mut query.filters;

        if let Some(id) = self.id {
            filters.insert(FilterField::Id, FilterTerm::Equality(FilterValue::Text(id)));
        }
        if let Some(block_id) = self.block_id {
            filters.insert(
                FilterField::BlockId,
                FilterTerm::Equality(FilterValue::Text(block_id)),
            );
        }
        if let Some(tx_type) = self.tx_type {
            filters.insert(FilterField::Type, FilterTerm::Equality(FilterValue::Type(tx_type)));
        }
        for (field, set) in [
            (FilterField::SenderId, self.sender_ids),
            (FilterField::RecipientId, self.recipient_ids),
            (FilterField::SenderPublicKey, self.sender_public_keys),
            (FilterField::RecipientPublicKey, self.recipient_public_keys),
        ] {
            if !set.is_empty() {
                filters.insert(field, FilterTerm::SetMembership(set));
            }
        }
        for (field, range) in [
            (FilterField::Amount, self.amount),
            (FilterField::Height, self.height),
            (FilterField::Timestamp, self.timestamp),
        ] {
            if range != RangeBound::default() {
                filters.insert(field, FilterTerm::Range(range));
            }
        }
        if let Some(pattern) = self.data {
            filters.insert(FilterField::Data, FilterTerm::StringMatch(pattern));
        }

        query
    }
}

/// Validates raw parameters for every query endpoint.
#[derive(Debug, Clone)]
pub struct ParameterValidator {
    default_limit: usize,
    max_limit: usize,
    epoch_unix: u64,
}

impl Default for ParameterValidator {
    fn default() -> Self {
        Self::new(&QueryConfig::default())
    }
}

impl ParameterValidator {
    pub fn new(config: &QueryConfig) -> Self {
        Self {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
            epoch_unix: config.epoch_unix,
        }
    }

    /// Validate a `/transactions` request.
    pub fn validate_query(&self, params: &QueryParams) -> Result<TransactionQuery, ValidationError> {
        let mut seen: HashSet<Parameter> = HashSet::new();
        let mut builder = QueryBuilder::default();

        for (key, value) in params.iter() {
            let parameter = Parameter::from_key(key).ok_or_else(|| unknown(key))?;
            if !seen.insert(parameter) && !parameter.is_repeatable() {
                return Err(ValidationError::Repeated {
                    parameter: key.to_string(),
                });
            }
            check_value_shape(key, value)?;
            self.apply(&mut builder, parameter, key, value)?;
        }

        Ok(builder.build(self.default_limit))
    }

    /// Validate a single-transaction lookup: exactly one `id`.
    pub fn validate_id_lookup(&self, params: &QueryParams) -> Result<String, ValidationError> {
        let mut id = None;
        for (key, value) in params.iter() {
            if key != "id" {
                return Err(unknown(key));
            }
            if id.is_some() {
                return Err(ValidationError::Repeated {
                    parameter: key.to_string(),
                });
            }
            check_value_shape(key, value)?;
            id = Some(parse_identifier(key, value)?);
        }
        id.ok_or_else(|| ValidationError::Missing {
            parameter: "id".to_string(),
        })
    }

    /// Validate the optional filters of a transient pool listing.
    pub fn validate_pending_filter(
        &self,
        params: &QueryParams,
    ) -> Result<PendingFilter, ValidationError> {
        let mut filter = PendingFilter::default();
        for (key, value) in params.iter() {
            let slot = match key {
                "senderPublicKey" => &mut filter.sender_public_key,
                "address" => &mut filter.address,
                _ => return Err(unknown(key)),
            };
            if slot.is_some() {
                return Err(ValidationError::Repeated {
                    parameter: key.to_string(),
                });
            }
            check_value_shape(key, value)?;
            *slot = Some(if key == "address" {
                parse_address(key, value)?
            } else {
                parse_public_key(key, value)?
            });
        }
        Ok(filter)
    }

    /// Reject any parameter at all.
    pub fn validate_empty(&self, params: &QueryParams) -> Result<(), ValidationError> {
        match params.iter().next() {
            Some((key, _)) => Err(unknown(key)),
            None => Ok(()),
        }
    }

    fn apply(
        &self,
        builder: &mut QueryBuilder,
        parameter: Parameter,
        key: &str,
        value: &str,
    ) -> Result<(), ValidationError> {
        match parameter {
            Parameter::Id => builder.id = Some(parse_identifier(key, value)?),
            Parameter::BlockId => builder.block_id = Some(parse_identifier(key, value)?),
            Parameter::Type => {
                let code = parse_integer(key, value)?;
                let tx_type = u8::try_from(code)
                    .ok()
                    .and_then(TransactionType::from_code)
                    .ok_or(ValidationError::UnknownTransactionType { value: code })?;
                builder.tx_type = Some(tx_type);
            }
            Parameter::SenderId => {
                builder.sender_ids.insert(parse_address(key, value)?);
            }
            Parameter::RecipientId => {
                builder.recipient_ids.insert(parse_address(key, value)?);
            }
            Parameter::SenderPublicKey => {
                builder.sender_public_keys.insert(parse_public_key(key, value)?);
            }
            Parameter::RecipientPublicKey => {
                builder
                    .recipient_public_keys
                    .insert(parse_public_key(key, value)?);
            }
            Parameter::MinAmount => builder.amount.raise_min(parse_u64(key, value, 0)?),
            Parameter::MaxAmount => builder.amount.lower_max(parse_u64(key, value, 0)?),
            Parameter::FromHeight => builder.height.raise_min(parse_u64(key, value, 1)?),
            Parameter::ToHeight => builder.height.lower_max(parse_u64(key, value, 1)?),
            Parameter::FromTimestamp => builder.timestamp.raise_min(parse_epoch_time(key, value)?),
            Parameter::ToTimestamp => builder.timestamp.lower_max(parse_epoch_time(key, value)?),
            Parameter::FromUnixTime => {
                let timestamp = self.parse_unix_time(key, value)?;
                builder.timestamp.raise_min(timestamp);
            }
            Parameter::ToUnixTime => {
                let timestamp = self.parse_unix_time(key, value)?;
                builder.timestamp.lower_max(timestamp);
            }
            Parameter::Data => {
                if value.len() > MAX_DATA_LENGTH {
                    return Err(ValidationError::InvalidFormat {
                        parameter: key.to_string(),
                        expected: "at most 64 bytes of data",
                    });
                }
                builder.data = Some(LikePattern::new(value));
            }
            Parameter::Limit => {
                let limit = parse_bounded(key, value, 1, self.max_limit as i128)?;
                builder.limit = Some(limit as usize);
            }
            Parameter::Offset => {
                let offset = parse_bounded(key, value, 0, i64::MAX as i128)?;
                builder.offset = Some(usize::try_from(offset).unwrap_or(usize::MAX));
            }
            Parameter::Sort => builder.sort = Some(parse_sort(value)?),
        }
        Ok(())
    }

    /// Unix seconds to seconds since the chain epoch.
    fn parse_unix_time(&self, key: &str, value: &str) -> Result<u64, ValidationError> {
        let unix = parse_integer(key, value)?;
        let epoch = self.epoch_unix as i128;
        if unix < epoch {
            return Err(ValidationError::BeforeEpoch {
                parameter: key.to_string(),
                value: unix,
                epoch,
            });
        }
        let max = epoch + u32::MAX as i128;
        if unix > max {
            return Err(out_of_range(key, unix, epoch, max));
        }
        Ok((unix - epoch) as u64)
    }
}

fn unknown(key: &str) -> ValidationError {
    ValidationError::UnknownParameter {
        parameter: key.to_string(),
    }
}

fn out_of_range(key: &str, value: i128, min: i128, max: i128) -> ValidationError {
    ValidationError::OutOfRange {
        parameter: key.to_string(),
        value,
        min,
        max,
    }
}

/// Checks shared by every parameter: non-empty, no comma lists.
fn check_value_shape(key: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty {
            parameter: key.to_string(),
        });
    }
    if value.contains(',') {
        return Err(ValidationError::CommaSeparated {
            parameter: key.to_string(),
        });
    }
    Ok(())
}

fn parse_integer(key: &str, value: &str) -> Result<i128, ValidationError> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::NotAnInteger {
            parameter: key.to_string(),
            value: value.to_string(),
        });
    }
    value
        .parse::<i128>()
        .map_err(|_| ValidationError::NotAnInteger {
            parameter: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_bounded(key: &str, value: &str, min: i128, max: i128) -> Result<i128, ValidationError> {
    let parsed = parse_integer(key, value)?;
    if parsed < min || parsed > max {
        return Err(out_of_range(key, parsed, min, max));
    }
    Ok(parsed)
}

fn parse_u64(key: &str, value: &str, min: u64) -> Result<u64, ValidationError> {
    parse_bounded(key, value, min as i128, u64::MAX as i128).map(|v| v as u64)
}

/// Epoch-relative seconds; negative values precede the epoch.
fn parse_epoch_time(key: &str, value: &str) -> Result<u64, ValidationError> {
    let parsed = parse_integer(key, value)?;
    if parsed < 0 {
        return Err(ValidationError::BeforeEpoch {
            parameter: key.to_string(),
            value: parsed,
            epoch: 0,
        });
    }
    if parsed > u32::MAX as i128 {
        return Err(out_of_range(key, parsed, 0, u32::MAX as i128));
    }
    Ok(parsed as u64)
}

fn parse_identifier(key: &str, value: &str) -> Result<String, ValidationError> {
    if value.len() > 20 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            parameter: key.to_string(),
            expected: "a numeric identifier of at most 20 digits",
        });
    }
    Ok(value.to_string())
}

fn parse_address(key: &str, value: &str) -> Result<String, ValidationError> {
    let valid = value
        .strip_suffix('L')
        .is_some_and(|digits| {
            !digits.is_empty() && digits.len() <= 20 && digits.bytes().all(|b| b.is_ascii_digit())
        });
    if !valid {
        return Err(ValidationError::InvalidFormat {
            parameter: key.to_string(),
            expected: "an address of up to 20 digits followed by 'L'",
        });
    }
    Ok(value.to_string())
}

fn parse_public_key(key: &str, value: &str) -> Result<String, ValidationError> {
    match hex::decode(value) {
        Ok(bytes) if bytes.len() == 32 => Ok(value.to_ascii_lowercase()),
        _ => Err(ValidationError::InvalidFormat {
            parameter: key.to_string(),
            expected: "a 32-byte hex encoded public key",
        }),
    }
}

fn parse_sort(value: &str) -> Result<SortOrder, ValidationError> {
    value
        .split_once(':')
        .and_then(|(field, direction)| {
            Some(SortOrder {
                field: SortField::from_name(field)?,
                direction: SortDirection::from_name(direction)?,
            })
        })
        .ok_or_else(|| ValidationError::InvalidSort {
            value: value.to_string(),
        })
}

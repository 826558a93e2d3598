//! # Domain Entities
//!
//! Transactions as held by the pools, and the views the query surface
//! returns for them.
//!
//! A `Transaction` never carries block data. Only `ConfirmedTransaction`
//! does, so a record in a transient pool cannot have a `blockId` or `height`
//! and a confirmed record cannot lack them.

use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Transaction type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TransactionType {
    Send = 0,
    Signature = 1,
    Delegate = 2,
    Vote = 3,
    Multisignature = 4,
    Dapp = 5,
    InTransfer = 6,
    OutTransfer = 7,
}

impl TransactionType {
    /// Every known type, in code order.
    pub const ALL: [TransactionType; 8] = [
        Self::Send,
        Self::Signature,
        Self::Delegate,
        Self::Vote,
        Self::Multisignature,
        Self::Dapp,
        Self::InTransfer,
        Self::OutTransfer,
    ];

    /// Wire code of this type.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Resolve a wire code, `None` for unknown codes.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

/// Second signature registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondSignatureAsset {
    pub public_key: String,
}

/// Delegate registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateAsset {
    pub username: String,
}

/// Multisignature group registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisignatureAsset {
    pub min: u8,
    pub lifetime: u8,
    pub keysgroup: Vec<String>,
}

/// Dapp registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DappAsset {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: u8,
    #[serde(rename = "type")]
    pub dapp_type: u8,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// Transfer into a dapp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InTransferAsset {
    pub dapp_id: String,
}

/// Withdrawal out of a dapp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutTransferAsset {
    pub dapp_id: String,
    pub transaction_id: String,
}

/// Type-specific payload. The variant determines the transaction type.
///
/// Serialized without a tag: the type travels beside it as `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Asset {
    Send {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
    Signature {
        signature: SecondSignatureAsset,
    },
    Delegate {
        delegate: DelegateAsset,
    },
    Vote {
        votes: Vec<String>,
    },
    Multisignature {
        multisignature: MultisignatureAsset,
    },
    Dapp {
        dapp: DappAsset,
    },
    InTransfer {
        #[serde(rename = "inTransfer")]
        in_transfer: InTransferAsset,
    },
    OutTransfer {
        #[serde(rename = "outTransfer")]
        out_transfer: OutTransferAsset,
    },
}

impl Asset {
    /// The transaction type this payload belongs to.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Send { .. } => TransactionType::Send,
            Self::Signature { .. } => TransactionType::Signature,
            Self::Delegate { .. } => TransactionType::Delegate,
            Self::Vote { .. } => TransactionType::Vote,
            Self::Multisignature { .. } => TransactionType::Multisignature,
            Self::Dapp { .. } => TransactionType::Dapp,
            Self::InTransfer { .. } => TransactionType::InTransfer,
            Self::OutTransfer { .. } => TransactionType::OutTransfer,
        }
    }
}

/// An immutable, already-classified transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Globally unique decimal identifier.
    pub id: String,
    /// Transferred amount in base units.
    pub amount: u64,
    /// Fee in base units.
    pub fee: u64,
    pub sender_id: String,
    pub sender_public_key: Option<String>,
    /// Absent for types that do not transfer to an account.
    pub recipient_id: Option<String>,
    pub recipient_public_key: Option<String>,
    /// Seconds since the chain epoch.
    pub timestamp: u32,
    pub asset: Asset,
    pub signature: String,
    pub sign_signature: Option<String>,
    /// Multisignature co-signatures collected so far.
    pub signatures: Vec<String>,
}

impl Transaction {
    /// Type derived from the asset.
    pub fn transaction_type(&self) -> TransactionType {
        self.asset.transaction_type()
    }

    /// Free-form data attached to a SEND.
    pub fn data(&self) -> Option<&str> {
        match &self.asset {
            Asset::Send { data } => data.as_deref(),
            _ => None,
        }
    }
}

/// A transaction included in an accepted block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTransaction {
    pub transaction: Arc<Transaction>,
    pub block_id: String,
    pub height: u64,
}

impl ConfirmedTransaction {
    pub fn id(&self) -> &str {
        &self.transaction.id
    }
}

fn serialize_as_string<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Wire representation of a transaction.
///
/// `amount` and `fee` are strings so totals above 2^53 survive JSON clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: u8,
    #[serde(serialize_with = "serialize_as_string")]
    pub amount: u64,
    #[serde(serialize_with = "serialize_as_string")]
    pub fee: u64,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_public_key: Option<String>,
    pub timestamp: u32,
    pub asset: Asset,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_signature: Option<String>,
    pub signatures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
}

impl TransactionView {
    /// View of a transaction that has not been included in a block.
    pub fn pending(tx: &Transaction) -> Self {
        Self {
            id: tx.id.clone(),
            transaction_type: tx.transaction_type().code(),
            amount: tx.amount,
            fee: tx.fee,
            sender_id: tx.sender_id.clone(),
            sender_public_key: tx.sender_public_key.clone(),
            recipient_id: tx.recipient_id.clone(),
            recipient_public_key: tx.recipient_public_key.clone(),
            timestamp: tx.timestamp,
            asset: tx.asset.clone(),
            signature: tx.signature.clone(),
            sign_signature: tx.sign_signature.clone(),
            signatures: tx.signatures.clone(),
            block_id: None,
            height: None,
            confirmations: None,
        }
    }

    /// View of a confirmed transaction; `tip_height` is the highest confirmed block.
    pub fn confirmed(record: &ConfirmedTransaction, tip_height: u64) -> Self {
        Self {
            block_id: Some(record.block_id.clone()),
            height: Some(record.height),
            confirmations: Some(tip_height.saturating_sub(record.height) + 1),
            ..Self::pending(&record.transaction)
        }
    }
}

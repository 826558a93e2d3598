//! Shared fixtures for the qc-03 integration tests.

#![allow(dead_code)]

use qc_03_transaction_query::{
    adapters::invalidation_filter, ApiGatewayHandler, ApiRequest, ApiResponse, Asset,
    CacheInvalidator, InMemoryResponseCache, PoolRegistry, QueryConfig, ResponseCache,
    Transaction, TransactionQueryService,
};
use qc_03_transaction_query::domain::{DelegateAsset, QueryParams};
use shared_bus::InMemoryEventBus;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

// =============================================================================
// TEST DATA
// =============================================================================

pub const ADDRESS_A: &str = "16313739661670634666L";
pub const ADDRESS_B: &str = "2581762640681118072L";
pub const ADDRESS_C: &str = "537318935439898807L";

pub const KEY_A: &str = "c094ebee7ec0c50ebee32918655e089f6e1a604b83bcaa760293c61e0f18ab6f";
pub const KEY_B: &str = "968ba2fa993ea9dc27ed740da0daf49eddd740dbd7cb1cb4fc5db3a20baf341b";

/// Transactions from A to B across both seeded blocks.
pub const A_TO_B_COUNT: usize = 13;

/// Confirmed transactions in the seeded chain.
pub const CONFIRMED_COUNT: usize = 23;

pub fn send(id: u64, sender: &str, recipient: &str, amount: u64, timestamp: u32) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount,
        fee: 10_000_000,
        sender_id: sender.to_string(),
        sender_public_key: Some(KEY_A.to_string()),
        recipient_id: Some(recipient.to_string()),
        recipient_public_key: None,
        timestamp,
        asset: Asset::Send { data: None },
        signature: format!("{:0>128}", id),
        sign_signature: None,
        signatures: vec![],
    }
}

pub fn vote(id: u64, sender: &str, timestamp: u32) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount: 0,
        fee: 100_000_000,
        sender_id: sender.to_string(),
        sender_public_key: Some(KEY_B.to_string()),
        recipient_id: None,
        recipient_public_key: None,
        timestamp,
        asset: Asset::Vote {
            votes: vec![format!("+{}", KEY_A)],
        },
        signature: format!("{:0>128}", id),
        sign_signature: None,
        signatures: vec![],
    }
}

pub fn delegate(id: u64, sender: &str, username: &str, timestamp: u32) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount: 0,
        fee: 2_500_000_000,
        sender_id: sender.to_string(),
        sender_public_key: None,
        recipient_id: None,
        recipient_public_key: None,
        timestamp,
        asset: Asset::Delegate {
            delegate: DelegateAsset {
                username: username.to_string(),
            },
        },
        signature: format!("{:0>128}", id),
        sign_signature: None,
        signatures: vec![],
    }
}

/// Block 1: twelve A→B sends and three C→A sends.
pub fn first_block() -> Vec<Transaction> {
    let mut txs: Vec<Transaction> = (1..=12)
        .map(|i| send(1000 + i, ADDRESS_A, ADDRESS_B, i * 100, i as u32 * 10))
        .collect();
    txs.push(send(2001, ADDRESS_C, ADDRESS_A, 100, 15));
    txs.push(send(2002, ADDRESS_C, ADDRESS_A, 5_000, 25));
    txs.push(send(2003, ADDRESS_C, ADDRESS_A, 1, 35));
    txs
}

/// Block 2: votes, a delegate, A→C sends, one more A→B with data attached.
pub fn second_block() -> Vec<Transaction> {
    let mut invoice = send(3001, ADDRESS_A, ADDRESS_B, 700, 200);
    invoice.asset = Asset::Send {
        data: Some("invoice-7".to_string()),
    };
    let mut keyed = send(3004, ADDRESS_A, ADDRESS_C, 300, 230);
    keyed.recipient_public_key = Some(KEY_B.to_string());

    vec![
        invoice,
        vote(3002, ADDRESS_B, 210),
        vote(3003, ADDRESS_B, 220),
        keyed,
        send(3005, ADDRESS_A, ADDRESS_C, 300, 240),
        vote(3006, ADDRESS_C, 250),
        delegate(3007, ADDRESS_C, "genesis_7", 260),
        delegate(3008, ADDRESS_B, "genesis_8", 270),
    ]
}

// =============================================================================
// NODE FIXTURE
// =============================================================================

pub type Handler = ApiGatewayHandler<TransactionQueryService<Arc<PoolRegistry>>>;

/// Registry, cache, invalidator and handler wired over one event bus.
pub struct Node {
    pub bus: Arc<InMemoryEventBus>,
    pub registry: Arc<PoolRegistry>,
    pub cache: Arc<InMemoryResponseCache>,
    pub handler: Handler,
    pub invalidator: JoinHandle<()>,
}

impl Node {
    pub fn start(config: QueryConfig) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let registry = Arc::new(PoolRegistry::new(bus.clone()));
        let cache = Arc::new(InMemoryResponseCache::from_config(&config.cache));
        let shared_cache: Arc<dyn ResponseCache> = cache.clone();

        let invalidator =
            CacheInvalidator::spawn(shared_cache.clone(), bus.subscribe(invalidation_filter()));
        let service = TransactionQueryService::new(registry.clone());
        let handler = match ApiGatewayHandler::new(service, &config, Some(shared_cache)) {
            Ok(handler) => handler,
            Err(e) => panic!("invalid test config: {e}"),
        };

        Self {
            bus,
            registry,
            cache,
            handler,
            invalidator,
        }
    }

    /// Node with both blocks confirmed and one transaction in each transient pool.
    pub async fn seeded() -> Self {
        let node = Self::start(QueryConfig::default());
        node.seed().await;
        node
    }

    pub async fn seed(&self) {
        let flushed = self.flushes();
        self.registry
            .confirm_block("6524861224470851795", 1, first_block())
            .await
            .unwrap();
        self.registry
            .confirm_block("1349213844499460766", 2, second_block())
            .await
            .unwrap();

        self.registry
            .add_queued(send(4001, ADDRESS_B, ADDRESS_C, 42, 300))
            .await
            .unwrap();
        self.registry
            .add_unconfirmed(send(4002, ADDRESS_C, ADDRESS_B, 43, 301))
            .await
            .unwrap();
        self.registry
            .add_multisignature(send(4003, ADDRESS_A, ADDRESS_C, 44, 302))
            .await
            .unwrap();
        self.wait_for_flushes(flushed + 2).await;
    }

    pub fn flushes(&self) -> u64 {
        self.cache.stats().flushes.load(Ordering::SeqCst)
    }

    /// Block until the invalidator has flushed the cache `target` times in total.
    pub async fn wait_for_flushes(&self, target: u64) {
        for _ in 0..200 {
            if self.flushes() >= target {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("cache invalidator never reached {target} flushes");
    }

    pub async fn get(&self, path: &str, query: &str) -> ApiResponse {
        self.handler.handle(&ApiRequest::get(path, query)).await
    }

    pub async fn transactions(&self, query: &str) -> ApiResponse {
        self.get("/transactions", query).await
    }
}

pub fn params(query: &str) -> QueryParams {
    QueryParams::parse(query)
}

// =============================================================================
// JSON HELPERS
// =============================================================================

pub fn transactions(response: &ApiResponse) -> Vec<serde_json::Value> {
    response.json()["transactions"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

pub fn ids(response: &ApiResponse) -> Vec<String> {
    transactions(response)
        .iter()
        .map(|t| t["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub fn count(response: &ApiResponse) -> usize {
    response.json()["count"]
        .as_str()
        .and_then(|c| c.parse().ok())
        .unwrap_or_else(|| panic!("count missing or not a string: {}", response.body))
}

/// Numeric field of a transaction, accepting both string and number encodings.
pub fn number(tx: &serde_json::Value, field: &str) -> Option<u64> {
    match &tx[field] {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

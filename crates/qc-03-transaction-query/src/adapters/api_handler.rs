//! # API Gateway Handler
//!
//! Adapter that serves the transaction endpoints for the API gateway.
//!
//! ## Architecture
//!
//! ```text
//! HTTP layer → ApiGatewayHandler → ParameterValidator → TransactionQueryApi
//!                     ↕
//!               ResponseCache (/transactions only)
//! ```
//!
//! The handler owns no HTTP framework types: the gateway hands over method,
//! path and decoded parameters and writes back status and JSON body.

use serde::Serialize;
use serde_json::json;
use shared_bus::TransientPool;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::{
    ConfigError, ParameterValidator, QueryConfig, QueryError, QueryParams, TransactionView,
};
use crate::ports::inbound::TransactionQueryApi;
use crate::ports::outbound::{CacheKey, CachedResponse, ResponseCache};

/// Error body for lookups that found nothing.
pub const NOT_FOUND_ERROR: &str = "Transaction not found";

/// A request as handed over by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub params: QueryParams,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>, params: QueryParams) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            params,
        }
    }

    /// GET request from a path and an already decoded query string.
    pub fn get(path: impl Into<String>, query: &str) -> Self {
        Self::new("GET", path, QueryParams::parse(query))
    }
}

/// Status code and serialized JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn ok(body: String) -> Self {
        Self { status: 200, body }
    }

    fn message(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "message": message }).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed back into JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or_default()
    }
}

impl From<CachedResponse> for ApiResponse {
    fn from(cached: CachedResponse) -> Self {
        Self {
            status: cached.status,
            body: cached.body,
        }
    }
}

/// Body of the transient pool lookups.
#[derive(Debug, Serialize)]
struct LookupEnvelope {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction: Option<TransactionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

/// Body of the transient pool listings.
#[derive(Debug, Serialize)]
struct ListEnvelope {
    success: bool,
    transactions: Vec<TransactionView>,
    count: usize,
}

/// Endpoints served by this handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Transactions,
    Count,
    PendingGet(TransientPool),
    PendingList(TransientPool),
}

impl Route {
    fn resolve(path: &str) -> Option<Self> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        Some(match path {
            "/transactions" => Self::Transactions,
            "/transactions/count" => Self::Count,
            "/transactions/queued/get" => Self::PendingGet(TransientPool::Queued),
            "/transactions/queued" => Self::PendingList(TransientPool::Queued),
            "/transactions/unconfirmed/get" => Self::PendingGet(TransientPool::Unconfirmed),
            "/transactions/unconfirmed" => Self::PendingList(TransientPool::Unconfirmed),
            "/transactions/multisignatures/get" => Self::PendingGet(TransientPool::Multisignature),
            "/transactions/multisignatures" => Self::PendingList(TransientPool::Multisignature),
            _ => return None,
        })
    }
}

/// API Gateway handler for qc-03.
pub struct ApiGatewayHandler<A> {
    api: A,
    validator: ParameterValidator,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl<A: TransactionQueryApi> ApiGatewayHandler<A> {
    /// Create a handler. `cache` is ignored when the config disables caching.
    pub fn new(
        api: A,
        config: &QueryConfig,
        cache: Option<Arc<dyn ResponseCache>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            api,
            validator: ParameterValidator::new(config),
            cache: cache.filter(|_| config.cache.enabled),
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Serve one request.
    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let Some(route) = Route::resolve(&request.path) else {
            return ApiResponse::message(404, &format!("Route not found: {}", request.path));
        };
        if !request.method.eq_ignore_ascii_case("GET") {
            return ApiResponse::message(405, &format!("Method not allowed: {}", request.method));
        }

        match route {
            Route::Transactions => self.handle_transactions(request).await,
            Route::Count => self.handle_count(&request.params),
            Route::PendingGet(pool) => self.handle_pending_get(pool, &request.params),
            Route::PendingList(pool) => self.handle_pending_list(pool, &request.params),
        }
    }

    /// `/transactions`, served through the response cache when one is set.
    async fn handle_transactions(&self, request: &ApiRequest) -> ApiResponse {
        let Some(cache) = &self.cache else {
            return self.find_confirmed(&request.params);
        };

        let key = CacheKey::new(&request.method, &request.path, &request.params);
        match cache.get(&key).await {
            Ok(Some(cached)) => {
                debug!(key = %key, "[qc-03] Cache hit");
                return cached.into();
            }
            Ok(None) => debug!(key = %key, "[qc-03] Cache miss"),
            Err(e) => warn!(key = %key, error = %e, "[qc-03] Cache read failed"),
        }

        let response = self.find_confirmed(&request.params);
        if response.is_success() {
            let cached = CachedResponse {
                status: response.status,
                body: response.body.clone(),
            };
            if let Err(e) = cache.set(key, cached).await {
                warn!(error = %e, "[qc-03] Cache write failed");
            }
        }
        response
    }

    fn find_confirmed(&self, params: &QueryParams) -> ApiResponse {
        let result = self
            .validator
            .validate_query(params)
            .map_err(QueryError::from)
            .and_then(|query| self.api.find_confirmed(&query));
        match result {
            Ok(page) => to_body(&page),
            Err(e) => error_response(e),
        }
    }

    fn handle_count(&self, params: &QueryParams) -> ApiResponse {
        let result = self
            .validator
            .validate_empty(params)
            .map_err(QueryError::from)
            .and_then(|()| self.api.count_all());
        match result {
            Ok(counts) => to_body(&counts),
            Err(e) => error_response(e),
        }
    }

    fn handle_pending_get(&self, pool: TransientPool, params: &QueryParams) -> ApiResponse {
        let result = self
            .validator
            .validate_id_lookup(params)
            .map_err(QueryError::from)
            .and_then(|id| self.api.get_pending(pool, &id));
        match result {
            Ok(Some(transaction)) => to_body(&LookupEnvelope {
                success: true,
                transaction: Some(transaction),
                error: None,
            }),
            Ok(None) => to_body(&LookupEnvelope {
                success: false,
                transaction: None,
                error: Some(NOT_FOUND_ERROR),
            }),
            Err(e) => error_response(e),
        }
    }

    fn handle_pending_list(&self, pool: TransientPool, params: &QueryParams) -> ApiResponse {
        let result = self
            .validator
            .validate_pending_filter(params)
            .map_err(QueryError::from)
            .and_then(|filter| self.api.list_pending(pool, &filter));
        match result {
            Ok(transactions) => to_body(&ListEnvelope {
                success: true,
                count: transactions.len(),
                transactions,
            }),
            Err(e) => error_response(e),
        }
    }
}

fn to_body<T: Serialize>(value: &T) -> ApiResponse {
    match serde_json::to_string(value) {
        Ok(body) => ApiResponse::ok(body),
        Err(e) => {
            error!(error = %e, "[qc-03] Response serialization failed");
            ApiResponse::message(500, "Failed to serialize response")
        }
    }
}

fn error_response(err: QueryError) -> ApiResponse {
    match err {
        QueryError::Validation(e) => ApiResponse::message(400, &e.to_string()),
        QueryError::Store(e) => {
            error!(error = %e, "[qc-03] Query failed");
            ApiResponse::message(500, &e.to_string())
        }
    }
}

//! HTTP API for a ledger node
//!
//! Exposes mining, transaction submission, chain inspection, peer
//! registration and reconciliation as JSON endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Instant;

use crate::core::{Block, PreviousHash, Transaction};
use crate::error::LedgerError;
use crate::network::{ChainSnapshot, Node};

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    /// Request body is missing fields or has the wrong shape
    BadRequest(String),
    Ledger(LedgerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Ledger(e) => {
                let status = match &e {
                    LedgerError::InvalidTransaction(_) | LedgerError::InvalidPeerAddress(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    LedgerError::InvalidBlock(_) => StatusCode::CONFLICT,
                    LedgerError::MalformedPeerChain { .. } => StatusCode::BAD_GATEWAY,
                    LedgerError::MiningCancelled => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
struct MineResponse {
    message: &'static str,
    index: u64,
    transactions: Vec<Transaction>,
    proof: u64,
    previous_hash: PreviousHash,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    message: &'static str,
    total_nodes: Vec<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ResolveResponse {
    Replaced {
        message: &'static str,
        new_chain: Vec<Block>,
    },
    Authoritative {
        message: &'static str,
        chain: Vec<Block>,
    },
}

/// Fields of a transaction submission after validation
struct NewTransaction {
    sender: String,
    recipient: String,
    amount: u64,
}

fn parse_json(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

fn non_empty_str(payload: &Value, field: &str) -> Result<String, ApiError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest(format!("'{}' must be a non-empty string", field)))
}

fn parse_new_transaction(payload: &Value) -> Result<NewTransaction, ApiError> {
    let sender = non_empty_str(payload, "sender")?;
    let recipient = non_empty_str(payload, "recipient")?;
    let amount = payload
        .get("amount")
        .and_then(Value::as_u64)
        .filter(|amount| *amount > 0)
        .ok_or_else(|| ApiError::BadRequest("'amount' must be a positive integer".to_string()))?;

    Ok(NewTransaction {
        sender,
        recipient,
        amount,
    })
}

fn parse_node_list(payload: &Value) -> Result<Vec<String>, ApiError> {
    let invalid = || ApiError::BadRequest("'nodes' must be a list of addresses".to_string());

    payload
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(invalid)?
        .iter()
        .map(|node| node.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

async fn ping() -> &'static str {
    "ping"
}

async fn mine(State(node): State<Node>) -> Result<Json<MineResponse>, ApiError> {
    let block = node.mine().await?;

    Ok(Json(MineResponse {
        message: "New Block Forged",
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

async fn new_transaction(
    State(node): State<Node>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let tx = parse_new_transaction(&parse_json(&body)?)?;
    let index = node.new_transaction(&tx.sender, &tx.recipient, tx.amount).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction will be added to Block {}", index),
        }),
    ))
}

async fn full_chain(State(node): State<Node>) -> Json<ChainSnapshot> {
    Json(node.snapshot().await)
}

async fn register_nodes(
    State(node): State<Node>,
    body: Bytes,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let addresses = parse_node_list(&parse_json(&body)?)?;
    node.register_nodes(&addresses).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "New nodes have been added",
            total_nodes: node.nodes().await,
        }),
    ))
}

async fn resolve_nodes(State(node): State<Node>) -> Result<Json<ResolveResponse>, ApiError> {
    let replaced = node.resolve_conflicts().await?;
    let chain = node.chain().await;

    Ok(Json(if replaced {
        ResolveResponse::Replaced {
            message: "Our chain is replaced",
            new_chain: chain,
        }
    } else {
        ResolveResponse::Authoritative {
            message: "Our chain is authoritative",
            chain,
        }
    }))
}

async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router for a node
pub fn build_router(node: Node) -> Router {
    Router::new()
        .route("/", get(ping))
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route("/chain", get(full_chain))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve_nodes))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(node)
}

/// Serve the API until Ctrl-C, then cancel any in-flight proof search
pub async fn serve(node: Node, listen: SocketAddr) -> crate::error::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("Node {} listening on {}", node.identifier(), listener.local_addr()?);

    let shutdown_node = node.clone();
    axum::serve(listener, build_router(node))
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            log::info!("Shutdown requested");
            shutdown_node.shutdown();
        })
        .await?;

    Ok(())
}

//! Longest-valid-chain reconciliation against canned and live peers

use coin_ledger::api::build_router;
use coin_ledger::{
    Block, Blockchain, ChainSnapshot, FetchError, HttpChainSource, LedgerError, Node, PreviousHash,
    StaticChainSource,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

fn chain_of(blocks: usize) -> Vec<Block> {
    let mut ledger = Blockchain::new();
    while ledger.len() < blocks {
        ledger.mine("peer").unwrap();
    }
    ledger.chain().to_vec()
}

async fn node_with_peers(peers: &[(&str, Result<ChainSnapshot, FetchError>)]) -> Node {
    let source = Arc::new(StaticChainSource::new());
    for (peer, response) in peers {
        match response {
            Ok(snapshot) => source.serve(peer, snapshot.clone()),
            Err(error) => source.fail(peer, error.clone()),
        }
    }

    let node = Node::new("local", source);
    for (peer, _) in peers {
        node.register_node(peer).await.unwrap();
    }
    node
}

#[tokio::test]
async fn test_longer_valid_chain_replaces_local() {
    let longer = chain_of(3);
    let node = node_with_peers(&[("a.com", Ok(ChainSnapshot::new(longer.clone())))]).await;

    assert!(node.resolve_conflicts().await.unwrap());
    assert_eq!(node.chain().await, longer);
}

#[tokio::test]
async fn test_shorter_chain_is_ignored() {
    let node = node_with_peers(&[("a.com", Ok(ChainSnapshot::new(chain_of(2))))]).await;
    node.mine().await.unwrap();
    node.mine().await.unwrap();
    let before = node.chain().await;

    assert!(!node.resolve_conflicts().await.unwrap());
    assert_eq!(node.chain().await, before);
}

#[tokio::test]
async fn test_equal_length_chain_is_ignored() {
    let node = node_with_peers(&[("a.com", Ok(ChainSnapshot::new(chain_of(2))))]).await;
    node.mine().await.unwrap();
    let before = node.chain().await;

    assert!(!node.resolve_conflicts().await.unwrap());
    assert_eq!(node.chain().await, before);
}

#[tokio::test]
async fn test_longer_invalid_chain_is_ignored() {
    let mut broken = chain_of(3);
    broken[2].previous_hash = PreviousHash::from("test");

    let node = node_with_peers(&[("a.com", Ok(ChainSnapshot::new(broken)))]).await;
    let before = node.chain().await;

    assert!(!node.resolve_conflicts().await.unwrap());
    assert_eq!(node.chain().await, before);
}

#[tokio::test]
async fn test_reported_length_drives_comparison() {
    // A peer may report a length that differs from the chain it sends
    let snapshot = ChainSnapshot {
        chain: chain_of(1),
        length: 2,
    };
    let node = node_with_peers(&[("a.com", Ok(snapshot.clone()))]).await;

    assert!(node.resolve_conflicts().await.unwrap());
    assert_eq!(node.chain().await, snapshot.chain);
}

#[tokio::test]
async fn test_longest_of_several_peers_wins() {
    let three = chain_of(3);
    let four = chain_of(4);
    let node = node_with_peers(&[
        ("a.com", Ok(ChainSnapshot::new(three))),
        ("b.com", Ok(ChainSnapshot::new(four.clone()))),
        ("c.com", Ok(ChainSnapshot::new(chain_of(1)))),
    ])
    .await;

    assert!(node.resolve_conflicts().await.unwrap());
    assert_eq!(node.chain().await, four);
}

#[tokio::test]
async fn test_tie_between_peers_adopts_one_of_them() {
    let first = chain_of(3);
    let second = chain_of(3);
    let node = node_with_peers(&[
        ("a.com", Ok(ChainSnapshot::new(first.clone()))),
        ("b.com", Ok(ChainSnapshot::new(second.clone()))),
    ])
    .await;

    assert!(node.resolve_conflicts().await.unwrap());
    let adopted = node.chain().await;
    assert!(adopted == first || adopted == second);
}

#[tokio::test]
async fn test_unreachable_peer_is_skipped() {
    let longer = chain_of(2);
    let node = node_with_peers(&[
        ("down.com", Err(FetchError::Unavailable("connection refused".to_string()))),
        ("a.com", Ok(ChainSnapshot::new(longer.clone()))),
    ])
    .await;

    assert!(node.resolve_conflicts().await.unwrap());
    assert_eq!(node.chain().await, longer);
}

#[tokio::test]
async fn test_only_unreachable_peers_keeps_local_chain() {
    let node = node_with_peers(&[(
        "down.com",
        Err(FetchError::Unavailable("timed out".to_string())),
    )])
    .await;

    assert!(!node.resolve_conflicts().await.unwrap());
    assert_eq!(node.chain().await.len(), 1);
}

#[tokio::test]
async fn test_malformed_peer_aborts_without_adoption() {
    let node = node_with_peers(&[
        ("bad.com", Err(FetchError::Malformed("missing field `proof`".to_string()))),
        ("a.com", Ok(ChainSnapshot::new(chain_of(3)))),
    ])
    .await;
    let before = node.chain().await;

    match node.resolve_conflicts().await {
        Err(LedgerError::MalformedPeerChain { peer, .. }) => assert_eq!(peer, "bad.com"),
        other => panic!("expected malformed peer error, got {:?}", other),
    }
    assert_eq!(node.chain().await, before);
}

#[tokio::test]
async fn test_pending_pool_survives_replacement() {
    let node = node_with_peers(&[("a.com", Ok(ChainSnapshot::new(chain_of(3))))]).await;
    node.new_transaction("alice", "bob", 4).await.unwrap();

    assert!(node.resolve_conflicts().await.unwrap());
    let pending = node.pending_transactions().await;
    assert_eq!(pending.len(), 1);

    let block = node.mine().await.unwrap();
    assert_eq!(block.index, 4);
    assert_eq!(block.transactions[0].recipient, "bob");
}

// ============================================================================
// Live HTTP peers
// ============================================================================

async fn spawn_router(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn http_node() -> Node {
    let source = HttpChainSource::new(Duration::from_secs(5), Duration::from_secs(2)).unwrap();
    Node::new("local", Arc::new(source))
}

#[tokio::test]
async fn test_resolve_against_live_peer() {
    let peer = Node::new("peer", Arc::new(StaticChainSource::new()));
    peer.mine().await.unwrap();
    peer.mine().await.unwrap();
    let addr = spawn_router(build_router(peer.clone())).await;

    let local = http_node();
    local.register_node(&format!("http://{}", addr)).await.unwrap();

    assert!(local.resolve_conflicts().await.unwrap());
    assert_eq!(local.chain().await, peer.chain().await);
}

#[tokio::test]
async fn test_live_peer_with_malformed_payload() {
    let router = axum::Router::new().route(
        "/chain",
        axum::routing::get(|| async { axum::Json(serde_json::json!({"length": 5, "chain": [{}]})) }),
    );
    let addr = spawn_router(router).await;

    let local = http_node();
    local.register_node(&addr.to_string()).await.unwrap();

    assert!(matches!(
        local.resolve_conflicts().await,
        Err(LedgerError::MalformedPeerChain { .. })
    ));
    assert_eq!(local.chain().await.len(), 1);
}

#[tokio::test]
async fn test_live_peer_error_status_is_skipped() {
    let router = axum::Router::new().route(
        "/chain",
        axum::routing::get(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let addr = spawn_router(router).await;

    let local = http_node();
    local.register_node(&addr.to_string()).await.unwrap();

    assert!(!local.resolve_conflicts().await.unwrap());
    assert_eq!(local.chain().await.len(), 1);
}

//! Integration tests that talk to a locally running node.
//!
//! These are marked `#[ignore]` by default because they need a node on
//! 127.0.0.1:40401 (internal API on 40402). Run them explicitly with:
//!
//!   cargo test --test integration -- --ignored

use futures::StreamExt;

use casper_client::config::NodeConfig;
use casper_client::{CasperApi, CasperClient};

async fn local_client() -> CasperClient<casper_client::rpc::HttpNodeService> {
	CasperClient::connect(&NodeConfig::default())
		.await
		.expect("failed to build client")
}

#[tokio::test]
#[ignore]
async fn show_blocks_returns_genesis() {
	let client = local_client().await;
	let mut blocks = client.show_blocks(1, 0, false).await.expect("stream failed");
	let first = blocks.next().await.expect("no blocks").expect("bad block");
	assert!(first.is_object(), "block info should be a record, got {first}");
}

#[tokio::test]
#[ignore]
async fn unknown_block_is_a_remote_failure() {
	let client = local_client().await;
	let err = client
		.show_block(&"00".repeat(32), true)
		.await
		.expect_err("zero hash should not resolve");
	assert!(matches!(
		err,
		casper_client::ClientError::RemoteServiceFailure { .. }
	));
}

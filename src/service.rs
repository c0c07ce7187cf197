//! The node's remote interface as seen by the client.
//!
//! [`NodeService`] is the only seam between the client and the network.
//! [`crate::rpc::HttpNodeService`] is the production implementation; tests
//! plug in canned doubles.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::consensus::Deploy;
use crate::error::Result;
use crate::state::{StateQuery, StateValue};

/// Block summaries are passed through to the caller untouched.
pub type BlockInfo = serde_json::Value;

/// Deploy summaries are passed through to the caller untouched.
pub type DeployInfo = serde_json::Value;

/// Lazily produced records of a streaming call. Dropping the stream ends
/// the call.
pub type RecordStream<T> = BoxStream<'static, Result<T>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum View {
	Basic,
	Full,
}

impl View {
	pub fn from_full(full: bool) -> Self {
		if full {
			Self::Full
		} else {
			Self::Basic
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
	pub deploy: Deploy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposeResponse {
	#[serde(with = "hex::serde")]
	pub block_hash: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBlockInfoRequest {
	pub block_hash_base16: String,
	pub view: View,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamBlockInfosRequest {
	pub depth: u32,
	/// Rank to walk back from; 0 starts at the current tip.
	pub max_rank: u64,
	pub view: View,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDeployInfoRequest {
	pub deploy_hash_base16: String,
	pub view: View,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamBlockDeploysRequest {
	pub block_hash_base16: String,
	pub view: View,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBlockStateRequest {
	pub block_hash_base16: String,
	pub query: StateQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizeDagRequest {
	pub depth: u32,
	pub show_justification_lines: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizeDagResponse {
	/// Graph in DOT format.
	pub content: String,
}

/// Remote calls the node exposes. Every failure is already normalized to
/// [`crate::error::ClientError`].
#[async_trait]
pub trait NodeService: Send + Sync {
	async fn deploy(&self, req: DeployRequest) -> Result<()>;

	async fn propose(&self) -> Result<ProposeResponse>;

	async fn get_block_info(&self, req: GetBlockInfoRequest) -> Result<BlockInfo>;

	async fn stream_block_infos(
		&self,
		req: StreamBlockInfosRequest,
	) -> Result<RecordStream<BlockInfo>>;

	async fn get_deploy_info(&self, req: GetDeployInfoRequest) -> Result<DeployInfo>;

	async fn stream_block_deploys(
		&self,
		req: StreamBlockDeploysRequest,
	) -> Result<RecordStream<DeployInfo>>;

	async fn get_block_state(&self, req: GetBlockStateRequest) -> Result<StateValue>;

	async fn visualize_dag(&self, req: VisualizeDagRequest) -> Result<VisualizeDagResponse>;
}

use async_trait::async_trait;
use num_bigint::BigUint;
use tracing::info;

use crate::config::NodeConfig;
use crate::crypto::KEY_LENGTH;
use crate::deploy_builder::DeployBuilder;
use crate::error::Result;
use crate::rpc::HttpNodeService;
use crate::service::{
	BlockInfo, DeployInfo, DeployRequest, GetBlockInfoRequest, GetBlockStateRequest,
	GetDeployInfoRequest, NodeService, RecordStream, StreamBlockDeploysRequest,
	StreamBlockInfosRequest, View, VisualizeDagRequest,
};
use crate::state::{self, KeyVariant, StateQuery, StateValue};

/// Everything a user can ask of a node.
#[async_trait]
pub trait CasperApi: Send + Sync {
	/// Build, sign (when a key is given) and submit a deploy. Returns the
	/// deploy hash.
	async fn deploy(
		&self,
		deploy: DeployBuilder,
		signing_key: Option<&[u8; KEY_LENGTH]>,
	) -> Result<Vec<u8>>;

	/// Ask the node to propose a block from its deploy pool. Returns the
	/// new block hash.
	async fn propose(&self) -> Result<Vec<u8>>;

	async fn show_block(&self, block_hash: &str, full_view: bool) -> Result<BlockInfo>;

	/// Walk the DAG back from `max_rank` (0 = tip), `depth` ranks deep.
	async fn show_blocks(
		&self,
		depth: u32,
		max_rank: u64,
		full_view: bool,
	) -> Result<RecordStream<BlockInfo>>;

	async fn show_deploy(&self, deploy_hash: &str, full_view: bool) -> Result<DeployInfo>;

	/// Deploys processed in a block.
	async fn show_deploys(
		&self,
		block_hash: &str,
		full_view: bool,
	) -> Result<RecordStream<DeployInfo>>;

	/// Read a value from global state. `key_type` is one of `hash`, `uref`,
	/// `address` or `local`; `path` is `a/b/c`.
	async fn query_state(
		&self,
		block_hash: &str,
		key: &str,
		path: &str,
		key_type: &str,
	) -> Result<StateValue>;

	/// Spendable balance of the account with public key `address` (hex).
	async fn balance(&self, address: &str, block_hash: &str) -> Result<BigUint>;

	/// The DAG in DOT format.
	async fn visualize_dag(&self, depth: u32, show_justification_lines: bool) -> Result<String>;
}

/// [`CasperApi`] over any [`NodeService`].
pub struct CasperClient<S> {
	service: S,
}

impl<S: NodeService> CasperClient<S> {
	pub fn new(service: S) -> Self {
		Self { service }
	}

	pub fn service(&self) -> &S {
		&self.service
	}
}

impl CasperClient<HttpNodeService> {
	pub async fn connect(node: &NodeConfig) -> Result<Self> {
		Ok(Self::new(HttpNodeService::connect(node).await?))
	}
}

#[async_trait]
impl<S: NodeService> CasperApi for CasperClient<S> {
	async fn deploy(
		&self,
		deploy: DeployBuilder,
		signing_key: Option<&[u8; KEY_LENGTH]>,
	) -> Result<Vec<u8>> {
		let deploy = deploy.build(signing_key)?;
		let deploy_hash = deploy.deploy_hash.clone();
		self.service.deploy(DeployRequest { deploy }).await?;
		info!(deploy_hash = %hex::encode(&deploy_hash), "deploy accepted");
		Ok(deploy_hash)
	}

	async fn propose(&self) -> Result<Vec<u8>> {
		Ok(self.service.propose().await?.block_hash)
	}

	async fn show_block(&self, block_hash: &str, full_view: bool) -> Result<BlockInfo> {
		self.service
			.get_block_info(GetBlockInfoRequest {
				block_hash_base16: block_hash.to_owned(),
				view: View::from_full(full_view),
			})
			.await
	}

	async fn show_blocks(
		&self,
		depth: u32,
		max_rank: u64,
		full_view: bool,
	) -> Result<RecordStream<BlockInfo>> {
		self.service
			.stream_block_infos(StreamBlockInfosRequest {
				depth,
				max_rank,
				view: View::from_full(full_view),
			})
			.await
	}

	async fn show_deploy(&self, deploy_hash: &str, full_view: bool) -> Result<DeployInfo> {
		self.service
			.get_deploy_info(GetDeployInfoRequest {
				deploy_hash_base16: deploy_hash.to_owned(),
				view: View::from_full(full_view),
			})
			.await
	}

	async fn show_deploys(
		&self,
		block_hash: &str,
		full_view: bool,
	) -> Result<RecordStream<DeployInfo>> {
		self.service
			.stream_block_deploys(StreamBlockDeploysRequest {
				block_hash_base16: block_hash.to_owned(),
				view: View::from_full(full_view),
			})
			.await
	}

	async fn query_state(
		&self,
		block_hash: &str,
		key: &str,
		path: &str,
		key_type: &str,
	) -> Result<StateValue> {
		let variant: KeyVariant = key_type.parse()?;
		let query = StateQuery::new(variant, key, path)?;
		self.service
			.get_block_state(GetBlockStateRequest {
				block_hash_base16: block_hash.to_owned(),
				query,
			})
			.await
	}

	async fn balance(&self, address: &str, block_hash: &str) -> Result<BigUint> {
		state::resolve_balance(&self.service, address, block_hash).await
	}

	async fn visualize_dag(&self, depth: u32, show_justification_lines: bool) -> Result<String> {
		let resp = self
			.service
			.visualize_dag(VisualizeDagRequest {
				depth,
				show_justification_lines,
			})
			.await?;
		Ok(resp.content)
	}
}

#![allow(dead_code)]

//! A canned `NodeService` that replays state records in order and records
//! everything it is asked.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use casper_client::consensus::Deploy;
use casper_client::error::{ClientError, Result};
use casper_client::service::{
	BlockInfo, DeployInfo, DeployRequest, GetBlockInfoRequest, GetBlockStateRequest,
	GetDeployInfoRequest, NodeService, ProposeResponse, RecordStream, StreamBlockDeploysRequest,
	StreamBlockInfosRequest, VisualizeDagRequest, VisualizeDagResponse,
};
use casper_client::state::{StateQuery, StateValue};

#[derive(Default)]
pub struct CannedNode {
	states: Mutex<VecDeque<StateValue>>,
	blocks: Vec<BlockInfo>,
	pub queries: Mutex<Vec<StateQuery>>,
	pub deploys: Mutex<Vec<Deploy>>,
}

impl CannedNode {
	pub fn with_states(states: Vec<StateValue>) -> Self {
		Self {
			states: Mutex::new(states.into()),
			..Self::default()
		}
	}

	pub fn with_blocks(blocks: Vec<BlockInfo>) -> Self {
		Self {
			blocks,
			..Self::default()
		}
	}

	pub fn queries(&self) -> Vec<StateQuery> {
		self.queries.lock().unwrap().clone()
	}
}

fn not_canned(method: &str) -> ClientError {
	ClientError::RemoteServiceFailure {
		status: "UNIMPLEMENTED".into(),
		details: format!("{method} is not canned"),
	}
}

#[async_trait]
impl NodeService for CannedNode {
	async fn deploy(&self, req: DeployRequest) -> Result<()> {
		self.deploys.lock().unwrap().push(req.deploy);
		Ok(())
	}

	async fn propose(&self) -> Result<ProposeResponse> {
		Ok(ProposeResponse {
			block_hash: vec![0xbb; 32],
		})
	}

	async fn get_block_info(&self, _req: GetBlockInfoRequest) -> Result<BlockInfo> {
		Err(not_canned("GetBlockInfo"))
	}

	async fn stream_block_infos(
		&self,
		req: StreamBlockInfosRequest,
	) -> Result<RecordStream<BlockInfo>> {
		let blocks: Vec<Result<BlockInfo>> = self
			.blocks
			.iter()
			.take(req.depth as usize)
			.cloned()
			.map(Ok)
			.collect();
		Ok(Box::pin(stream::iter(blocks)))
	}

	async fn get_deploy_info(&self, _req: GetDeployInfoRequest) -> Result<DeployInfo> {
		Err(not_canned("GetDeployInfo"))
	}

	async fn stream_block_deploys(
		&self,
		_req: StreamBlockDeploysRequest,
	) -> Result<RecordStream<DeployInfo>> {
		Err(not_canned("StreamBlockDeploys"))
	}

	async fn get_block_state(&self, req: GetBlockStateRequest) -> Result<StateValue> {
		self.queries.lock().unwrap().push(req.query);
		self.states
			.lock()
			.unwrap()
			.pop_front()
			.ok_or_else(|| not_canned("GetBlockState"))
	}

	async fn visualize_dag(&self, req: VisualizeDagRequest) -> Result<VisualizeDagResponse> {
		Ok(VisualizeDagResponse {
			content: format!("digraph dag {{ depth = {} }}", req.depth),
		})
	}
}

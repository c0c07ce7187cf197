use std::net::SocketAddr;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::NodeConfig;
use crate::error::{ClientError, Result};
use crate::service::{
	BlockInfo, DeployInfo, DeployRequest, GetBlockInfoRequest, GetBlockStateRequest,
	GetDeployInfoRequest, NodeService, ProposeResponse, RecordStream, StreamBlockDeploysRequest,
	StreamBlockInfosRequest, VisualizeDagRequest, VisualizeDagResponse,
};
use crate::state::StateValue;

const CASPER_SERVICE: &str = "casper";
const CONTROL_SERVICE: &str = "control";

/// Talks to a node's JSON gateway.
///
/// Each call is a POST of the request record to `/{service}/{method}`.
/// Unary calls answer with one JSON record; streaming calls answer with
/// newline-delimited records that are decoded as they arrive. The casper
/// service sits on the external port, the control service (`Propose`) on
/// the internal one.
pub struct HttpNodeService {
	http: reqwest::Client,
	casper_url: String,
	control_url: String,
}

impl HttpNodeService {
	/// Build the transport for `node`. With a certificate file the
	/// connection uses TLS; a `node_id` then becomes the TLS server name
	/// and is pinned to the resolved address of `host`.
	pub async fn connect(node: &NodeConfig) -> Result<Self> {
		let mut builder = reqwest::Client::builder();
		let (scheme, authority) = match &node.certificate_file {
			None => ("http", node.host.clone()),
			Some(path) => {
				let pem = std::fs::read(path).map_err(|e| {
					ClientError::invalid(format!(
						"cannot read certificate file {}: {e}",
						path.display()
					))
				})?;
				let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
					ClientError::invalid(format!("invalid certificate {}: {e}", path.display()))
				})?;
				builder = builder.add_root_certificate(cert);

				match &node.node_id {
					Some(node_id) => {
						let addr = lookup(&node.host, node.port).await?;
						builder = builder.resolve(node_id, addr);
						("https", node_id.clone())
					}
					None => ("https", node.host.clone()),
				}
			}
		};

		let http = builder.build().map_err(remote_failure)?;
		Ok(Self {
			http,
			casper_url: format!("{scheme}://{authority}:{}", node.port),
			control_url: format!("{scheme}://{authority}:{}", node.internal_port),
		})
	}

	async fn post<Req>(&self, base: &str, service: &str, method: &str, req: &Req) -> Result<reqwest::Response>
	where
		Req: Serialize + ?Sized,
	{
		let url = format!("{base}/{service}/{method}");
		debug!(%url, "calling node");
		let resp = self.http.post(&url).json(req).send().await.map_err(remote_failure)?;
		check_status(resp).await
	}

	async fn call<Req, Resp>(&self, method: &str, req: &Req) -> Result<Resp>
	where
		Req: Serialize + ?Sized,
		Resp: DeserializeOwned,
	{
		self.post(&self.casper_url, CASPER_SERVICE, method, req)
			.await?
			.json()
			.await
			.map_err(remote_failure)
	}

	async fn stream<Req, T>(&self, method: &str, req: &Req) -> Result<RecordStream<T>>
	where
		Req: Serialize + ?Sized,
		T: DeserializeOwned + Send + 'static,
	{
		let resp = self.post(&self.casper_url, CASPER_SERVICE, method, req).await?;
		Ok(ndjson(resp.bytes_stream()))
	}
}

#[async_trait]
impl NodeService for HttpNodeService {
	async fn deploy(&self, req: DeployRequest) -> Result<()> {
		// The node answers with an empty record.
		self.post(&self.casper_url, CASPER_SERVICE, "Deploy", &req).await?;
		Ok(())
	}

	async fn propose(&self) -> Result<ProposeResponse> {
		let empty = serde_json::json!({});
		self.post(&self.control_url, CONTROL_SERVICE, "Propose", &empty)
			.await?
			.json()
			.await
			.map_err(remote_failure)
	}

	async fn get_block_info(&self, req: GetBlockInfoRequest) -> Result<BlockInfo> {
		self.call("GetBlockInfo", &req).await
	}

	async fn stream_block_infos(
		&self,
		req: StreamBlockInfosRequest,
	) -> Result<RecordStream<BlockInfo>> {
		self.stream("StreamBlockInfos", &req).await
	}

	async fn get_deploy_info(&self, req: GetDeployInfoRequest) -> Result<DeployInfo> {
		self.call("GetDeployInfo", &req).await
	}

	async fn stream_block_deploys(
		&self,
		req: StreamBlockDeploysRequest,
	) -> Result<RecordStream<DeployInfo>> {
		self.stream("StreamBlockDeploys", &req).await
	}

	async fn get_block_state(&self, req: GetBlockStateRequest) -> Result<StateValue> {
		self.call("GetBlockState", &req).await
	}

	async fn visualize_dag(&self, req: VisualizeDagRequest) -> Result<VisualizeDagResponse> {
		self.call("VisualizeDag", &req).await
	}
}

// -- Error mapping --

/// Body the gateway sends with a non-2xx status.
#[derive(Debug, Deserialize)]
struct GatewayError {
	#[serde(default)]
	code: Option<Value>,
	#[serde(default)]
	message: Option<String>,
}

/// Fold a transport fault into the client's error taxonomy.
pub fn remote_failure(e: reqwest::Error) -> ClientError {
	let status = match e.status() {
		Some(status) => status.as_u16().to_string(),
		None if e.is_timeout() => "DEADLINE_EXCEEDED".to_owned(),
		None if e.is_connect() => "UNAVAILABLE".to_owned(),
		None if e.is_decode() => "INTERNAL".to_owned(),
		None => "UNKNOWN".to_owned(),
	};
	ClientError::RemoteServiceFailure {
		status,
		details: e.to_string(),
	}
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
	let status = resp.status();
	if status.is_success() {
		return Ok(resp);
	}
	let body = resp.text().await.unwrap_or_default();
	Err(gateway_failure(status.as_u16(), &body))
}

fn gateway_failure(http_status: u16, body: &str) -> ClientError {
	let parsed = serde_json::from_str::<GatewayError>(body).ok();
	let status = parsed
		.as_ref()
		.and_then(|e| e.code.as_ref())
		.map(|c| match c {
			Value::String(s) => s.clone(),
			other => other.to_string(),
		})
		.unwrap_or_else(|| http_status.to_string());
	let details = parsed
		.and_then(|e| e.message)
		.unwrap_or_else(|| body.trim().to_owned());
	ClientError::RemoteServiceFailure { status, details }
}

// -- Streaming --

/// Decode a newline-delimited JSON body into records, one per line, as
/// chunks arrive. A transport error ends the stream after being yielded.
fn ndjson<S, B, T>(chunks: S) -> RecordStream<T>
where
	S: Stream<Item = reqwest::Result<B>> + Send + 'static,
	B: AsRef<[u8]> + Send + 'static,
	T: DeserializeOwned + Send + 'static,
{
	let init = (Box::pin(chunks), Vec::<u8>::new(), false);
	stream::unfold(init, |(mut chunks, mut buf, mut done)| async move {
		loop {
			if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
				let line: Vec<u8> = buf.drain(..=pos).collect();
				if line.iter().all(u8::is_ascii_whitespace) {
					continue;
				}
				return Some((parse_record(&line), (chunks, buf, done)));
			}
			if done {
				if buf.iter().all(u8::is_ascii_whitespace) {
					return None;
				}
				let rest = std::mem::take(&mut buf);
				return Some((parse_record(&rest), (chunks, buf, done)));
			}
			match chunks.next().await {
				Some(Ok(bytes)) => buf.extend_from_slice(bytes.as_ref()),
				Some(Err(e)) => {
					buf.clear();
					return Some((Err(remote_failure(e)), (chunks, buf, true)));
				}
				None => done = true,
			}
		}
	})
	.boxed()
}

fn parse_record<T: DeserializeOwned>(line: &[u8]) -> Result<T> {
	serde_json::from_slice(line).map_err(|e| ClientError::RemoteServiceFailure {
		status: "INTERNAL".into(),
		details: format!("malformed record from node: {e}"),
	})
}

async fn lookup(host: &str, port: u16) -> Result<SocketAddr> {
	let unresolved = |reason: String| ClientError::RemoteServiceFailure {
		status: "UNAVAILABLE".into(),
		details: format!("cannot resolve {host}:{port}: {reason}"),
	};
	tokio::net::lookup_host((host, port))
		.await
		.map_err(|e| unresolved(e.to_string()))?
		.next()
		.ok_or_else(|| unresolved("no addresses".into()))
}

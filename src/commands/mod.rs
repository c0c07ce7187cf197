pub mod block;
pub mod deploy;
pub mod state;

use anyhow::Result;
use futures::StreamExt;
use serde::Serialize;

use crate::cli::Cli;
use crate::config::{Config, NodeConfig};
use crate::service::RecordStream;

/// Resolve node connection settings from CLI flags over config.
pub fn resolve_node(cli: &Cli, config: &Config) -> NodeConfig {
	let node = &config.node;
	NodeConfig {
		host: cli.host.clone().unwrap_or_else(|| node.host.clone()),
		port: cli.port.unwrap_or(node.port),
		internal_port: cli.internal_port.unwrap_or(node.internal_port),
		node_id: cli.node_id.clone().or_else(|| node.node_id.clone()),
		certificate_file: cli
			.certificate_file
			.clone()
			.or_else(|| node.certificate_file.clone()),
	}
}

/// Print a single record as pretty JSON.
pub fn print_record<T: Serialize>(record: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(record)?);
	Ok(())
}

/// Print every record of a stream with a numbered frame, then the count.
pub async fn print_stream<T: Serialize>(mut records: RecordStream<T>, element: &str) -> Result<()> {
	let mut count = 0u32;
	while let Some(record) = records.next().await {
		let record = record?;
		println!("------------- {element} {count} ---------------");
		print_record(&record)?;
		println!("-----------------------------------------------------\n");
		count += 1;
	}
	println!("count: {count}");
	Ok(())
}

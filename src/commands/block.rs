use std::path::Path;

use anyhow::{Context, Result};

use crate::client::CasperApi;
use crate::commands::{print_record, print_stream};

pub async fn propose(api: &dyn CasperApi) -> Result<()> {
	let block_hash = api.propose().await?;
	println!("Success! Block hash: {}", hex::encode(block_hash));
	Ok(())
}

pub async fn show_block(api: &dyn CasperApi, hash: &str) -> Result<()> {
	let block = api.show_block(hash, true).await?;
	print_record(&block)
}

pub async fn show_blocks(api: &dyn CasperApi, depth: u32) -> Result<()> {
	let blocks = api.show_blocks(depth, 0, true).await?;
	print_stream(blocks, "block").await
}

pub async fn vdag(
	api: &dyn CasperApi,
	depth: u32,
	show_justification_lines: bool,
	out: Option<&Path>,
) -> Result<()> {
	let dot = api.visualize_dag(depth, show_justification_lines).await?;
	match out {
		Some(path) => {
			std::fs::write(path, dot)
				.with_context(|| format!("cannot write {}", path.display()))?;
			println!("DAG written to {}", path.display());
		}
		None => println!("{dot}"),
	}
	Ok(())
}

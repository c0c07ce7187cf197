use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use casper_client::cli::{Cli, Command};
use casper_client::commands;
use casper_client::config::Config;
use casper_client::CasperClient;

#[tokio::main]
async fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
		)
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	match run(&cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("{e:#}");
			ExitCode::FAILURE
		}
	}
}

async fn run(cli: &Cli) -> Result<()> {
	let config = Config::load()?;
	let node = commands::resolve_node(cli, &config);
	let client = CasperClient::connect(&node).await?;

	match &cli.command {
		Command::Deploy(args) => commands::deploy::run(&client, args, config.deploy.gas_price).await,
		Command::Propose => commands::block::propose(&client).await,
		Command::ShowBlock { hash } => commands::block::show_block(&client, hash).await,
		Command::ShowBlocks { depth } => commands::block::show_blocks(&client, *depth).await,
		Command::ShowDeploy { hash } => commands::deploy::show_deploy(&client, hash).await,
		Command::ShowDeploys { hash } => commands::deploy::show_deploys(&client, hash).await,
		Command::Vdag {
			depth,
			show_justification_lines,
			out,
		} => commands::block::vdag(&client, *depth, *show_justification_lines, out.as_deref()).await,
		Command::QueryState {
			block_hash,
			key,
			path,
			key_type,
		} => commands::state::query_state(&client, block_hash, key, path, key_type).await,
		Command::Balance {
			address,
			block_hash,
		} => commands::state::balance(&client, address, block_hash).await,
	}
}

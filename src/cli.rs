use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
	name = "casper-client",
	about = "Build deploys and query state on a CasperLabs node.",
	version
)]
pub struct Cli {
	/// Hostname or IP of the node.
	#[arg(long, global = true)]
	pub host: Option<String>,

	/// Port of the node's external API.
	#[arg(long, global = true)]
	pub port: Option<u16>,

	/// Port of the node's internal API.
	#[arg(long, global = true)]
	pub internal_port: Option<u16>,

	/// Node id, used as the TLS server name.
	#[arg(long, global = true)]
	pub node_id: Option<String>,

	/// Certificate file for a TLS connection.
	#[arg(long, global = true)]
	pub certificate_file: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Deploy a smart contract to the node. It is packaged into a block
	/// depending on the node's configuration.
	Deploy(DeployArgs),

	/// Force the node to propose a block from its accumulated deploys.
	Propose,

	/// View properties of a block.
	ShowBlock {
		/// Block hash, base16 encoded.
		hash: String,
	},

	/// View the blocks in the node's current view of the DAG.
	ShowBlocks {
		/// Depth in terms of block height.
		#[arg(short, long)]
		depth: u32,
	},

	/// View properties of a deploy.
	ShowDeploy {
		/// Deploy hash, base16 encoded.
		hash: String,
	},

	/// View the deploys included in a block.
	ShowDeploys {
		/// Block hash, base16 encoded.
		hash: String,
	},

	/// Print the DAG in DOT format.
	Vdag {
		/// Depth in terms of block height.
		#[arg(short, long)]
		depth: u32,

		/// Draw justification lines.
		#[arg(short, long)]
		show_justification_lines: bool,

		/// Write the DOT output to this file instead of stdout.
		#[arg(short, long)]
		out: Option<PathBuf>,
	},

	/// Query a value in the global state.
	QueryState {
		/// Hash of the block to query the state of.
		#[arg(short, long)]
		block_hash: String,

		/// Base16 encoding of the base key. For `local` keys the format is
		/// {seed}:{rest}, both hex encoded.
		#[arg(short, long)]
		key: String,

		/// Path to the value, of the form key1/key2/.../keyn.
		#[arg(short, long, default_value = "")]
		path: String,

		/// Type of base key: hash, uref, address or local.
		#[arg(short = 't', long = "type")]
		key_type: String,
	},

	/// Show the balance of an account at the given block.
	Balance {
		/// Account public key, base16 encoded.
		#[arg(short, long)]
		address: String,

		/// Hash of the block to query the state of.
		#[arg(short, long)]
		block_hash: String,
	},
}

#[derive(Args)]
pub struct DeployArgs {
	/// Public key of the account the deploy runs as, base16 encoded.
	/// Defaults to the key in --public-key.
	#[arg(short, long)]
	pub from: Option<String>,

	/// Gas price in dust per unit of gas. Must be positive.
	#[arg(long)]
	pub gas_price: Option<u64>,

	/// Path to the file with session code.
	#[arg(short, long)]
	pub session: Option<PathBuf>,

	/// Hash of the stored contract to call as session, base16 encoded.
	#[arg(long)]
	pub session_hash: Option<String>,

	/// Name of the stored contract (a named key of the account) to call as
	/// session.
	#[arg(long)]
	pub session_name: Option<String>,

	/// URef of the stored contract to call as session, base16 encoded.
	#[arg(long)]
	pub session_uref: Option<String>,

	/// JSON list of session args, e.g.
	/// [{"name": "amount", "value": {"long_value": 123456}}].
	#[arg(long)]
	pub session_args: Option<String>,

	/// Path to the file with payment code. Without any payment option the
	/// session code is used.
	#[arg(short, long)]
	pub payment: Option<PathBuf>,

	/// Hash of the stored contract to call as payment, base16 encoded.
	#[arg(long)]
	pub payment_hash: Option<String>,

	/// Name of the stored contract to call as payment.
	#[arg(long)]
	pub payment_name: Option<String>,

	/// URef of the stored contract to call as payment, base16 encoded.
	#[arg(long)]
	pub payment_uref: Option<String>,

	/// JSON list of payment args, e.g.
	/// [{"name": "amount", "value": {"big_int": {"value": "100000"}}}].
	#[arg(long)]
	pub payment_args: Option<String>,

	/// Path to the file with the account public key (Ed25519).
	#[arg(long)]
	pub public_key: Option<PathBuf>,

	/// Path to the file with the account private key (Ed25519). Without it
	/// the deploy is sent unsigned.
	#[arg(long)]
	pub private_key: Option<PathBuf>,
}

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::abi::{self, ACCOUNT_LENGTH};
use crate::cli::DeployArgs;
use crate::client::CasperApi;
use crate::commands::{print_record, print_stream};
use crate::crypto;
use crate::deploy_builder::{CodeOptions, DeployBuilder};

pub async fn run(api: &dyn CasperApi, args: &DeployArgs, default_gas_price: u64) -> Result<()> {
	let session = code_options(
		args.session.as_deref(),
		args.session_hash.as_deref(),
		args.session_name.as_deref(),
		args.session_uref.as_deref(),
	)?;
	let payment = code_options(
		args.payment.as_deref(),
		args.payment_hash.as_deref(),
		args.payment_name.as_deref(),
		args.payment_uref.as_deref(),
	)?;

	let mut builder = DeployBuilder::new()
		.session(session, json_args(args.session_args.as_deref())?)
		.payment(payment, json_args(args.payment_args.as_deref())?)
		.gas_price(args.gas_price.unwrap_or(default_gas_price));

	let account = match (&args.from, &args.public_key) {
		(Some(from), _) => Some(parse_account(from)?),
		(None, Some(path)) => Some(crypto::read_pem_key(path)?.to_vec()),
		(None, None) => None,
	};
	if let Some(account) = account {
		builder = builder.account(account);
	}

	let signing_key = args
		.private_key
		.as_deref()
		.map(crypto::read_pem_key)
		.transpose()?;

	let deploy_hash = api.deploy(builder, signing_key.as_ref()).await?;
	println!("Success! Deploy {} deployed", hex::encode(deploy_hash));
	Ok(())
}

pub async fn show_deploy(api: &dyn CasperApi, hash: &str) -> Result<()> {
	let deploy = api.show_deploy(hash, false).await?;
	print_record(&deploy)
}

pub async fn show_deploys(api: &dyn CasperApi, block_hash: &str) -> Result<()> {
	let deploys = api.show_deploys(block_hash, false).await?;
	print_stream(deploys, "deploy").await
}

// -- Helpers --

fn code_options(
	wasm: Option<&Path>,
	hash: Option<&str>,
	name: Option<&str>,
	uref: Option<&str>,
) -> Result<CodeOptions> {
	let wasm = wasm
		.map(|path| {
			std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
		})
		.transpose()?;
	Ok(CodeOptions {
		wasm,
		hash: hash.map(|h| decode_hex("hash", h)).transpose()?,
		name: name.map(str::to_owned),
		uref: uref.map(|u| decode_hex("uref", u)).transpose()?,
	})
}

fn json_args(json: Option<&str>) -> Result<Vec<u8>> {
	Ok(json.map(abi::args_from_json).transpose()?.unwrap_or_default())
}

fn parse_account(from: &str) -> Result<Vec<u8>> {
	let account = decode_hex("--from", from)?;
	if account.len() != ACCOUNT_LENGTH {
		return Err(anyhow!(
			"--from must be {ACCOUNT_LENGTH} bytes encoded as {} characters long hexadecimal",
			ACCOUNT_LENGTH * 2
		));
	}
	Ok(account)
}

fn decode_hex(what: &str, value: &str) -> Result<Vec<u8>> {
	hex::decode(value).with_context(|| format!("{what} must be base16 encoded"))
}

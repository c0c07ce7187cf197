use anyhow::Result;

use crate::client::CasperApi;
use crate::commands::print_record;

pub async fn query_state(
	api: &dyn CasperApi,
	block_hash: &str,
	key: &str,
	path: &str,
	key_type: &str,
) -> Result<()> {
	let value = api.query_state(block_hash, key, path, key_type).await?;
	print_record(&value)
}

pub async fn balance(api: &dyn CasperApi, address: &str, block_hash: &str) -> Result<()> {
	let balance = api.balance(address, block_hash).await?;
	println!("{balance}");
	Ok(())
}

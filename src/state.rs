use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abi;
use crate::error::{ClientError, Result};
use crate::service::{GetBlockStateRequest, NodeService};

/// Named key under which every account stores the mint contract.
pub const MINT_NAME: &str = "mint";

// -- Queries --

/// Kind of base key a state query starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyVariant {
	Hash,
	Uref,
	Address,
	/// `{seed}:{rest}`, both hex.
	Local,
}

impl KeyVariant {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Hash => "hash",
			Self::Uref => "uref",
			Self::Address => "address",
			Self::Local => "local",
		}
	}
}

impl fmt::Display for KeyVariant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for KeyVariant {
	type Err = ClientError;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_ascii_lowercase().as_str() {
			"hash" => Ok(Self::Hash),
			"uref" => Ok(Self::Uref),
			"address" => Ok(Self::Address),
			"local" => Ok(Self::Local),
			_ => Err(ClientError::invalid(format!(
				"{s} is not a known query-state key type"
			))),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateQuery {
	pub key_variant: KeyVariant,
	pub key_base16: String,
	#[serde(default)]
	pub path_segments: Vec<String>,
}

impl StateQuery {
	/// Validate `key` for its variant and split `path` (`a/b/c`) into
	/// segments, ignoring empty ones.
	pub fn new(key_variant: KeyVariant, key: &str, path: &str) -> Result<Self> {
		match key_variant {
			KeyVariant::Local => {
				let (seed, rest) = key.split_once(':').ok_or_else(|| {
					ClientError::invalid(format!("local key {key:?} must be {{seed}}:{{rest}}"))
				})?;
				check_hex(seed)?;
				check_hex(rest)?;
			}
			_ => check_hex(key)?,
		}
		Ok(Self {
			key_variant,
			key_base16: key.to_owned(),
			path_segments: path
				.split('/')
				.filter(|s| !s.is_empty())
				.map(str::to_owned)
				.collect(),
		})
	}

	/// Query for the value stored directly under raw key bytes.
	pub fn of(key_variant: KeyVariant, key: &[u8]) -> Self {
		Self {
			key_variant,
			key_base16: hex::encode(key),
			path_segments: Vec::new(),
		}
	}

	pub fn local(seed: &[u8], rest: &[u8]) -> Self {
		Self {
			key_variant: KeyVariant::Local,
			key_base16: format!("{}:{}", hex::encode(seed), hex::encode(rest)),
			path_segments: Vec::new(),
		}
	}
}

fn check_hex(s: &str) -> Result<()> {
	hex::decode(s)
		.map(|_| ())
		.map_err(|e| ClientError::invalid(format!("key {s:?} is not base16: {e}")))
}

// -- Records --

/// A value stored in global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateValue {
	IntValue(i32),
	LongValue(i64),
	BigInt(BigInt),
	BytesValue(#[serde(with = "hex::serde")] Vec<u8>),
	IntList(IntList),
	StringValue(String),
	StringList(StringList),
	Account(Account),
	Contract(Contract),
	NamedKey(NamedKey),
	Key(Key),
	Unit(Unit),
}

impl StateValue {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::IntValue(_) => "int_value",
			Self::LongValue(_) => "long_value",
			Self::BigInt(_) => "big_int",
			Self::BytesValue(_) => "bytes_value",
			Self::IntList(_) => "int_list",
			Self::StringValue(_) => "string_value",
			Self::StringList(_) => "string_list",
			Self::Account(_) => "account",
			Self::Contract(_) => "contract",
			Self::NamedKey(_) => "named_key",
			Self::Key(_) => "key",
			Self::Unit(_) => "unit",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigInt {
	/// Decimal digits.
	pub value: String,
	#[serde(default)]
	pub bit_width: u32,
}

impl BigInt {
	pub fn to_biguint(&self) -> Result<BigUint> {
		self.value.parse().map_err(|_| ClientError::UnexpectedStateShape {
			expected: "decimal big_int",
			observed: self.value.clone(),
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntList {
	#[serde(default)]
	pub values: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringList {
	#[serde(default)]
	pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
	#[serde(with = "hex::serde")]
	pub public_key: Vec<u8>,
	pub purse_id: URef,
	#[serde(default)]
	pub known_urefs: Vec<NamedKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
	#[serde(with = "hex::serde")]
	pub body: Vec<u8>,
	#[serde(default)]
	pub known_urefs: Vec<NamedKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedKey {
	pub name: String,
	pub key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
	Address(KeyAddress),
	Hash(KeyHash),
	Uref(URef),
	Local(KeyLocal),
}

impl Key {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Address(_) => "address key",
			Self::Hash(_) => "hash key",
			Self::Uref(_) => "uref key",
			Self::Local(_) => "local key",
		}
	}

	pub fn as_uref(&self) -> Option<&URef> {
		match self {
			Self::Uref(uref) => Some(uref),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAddress {
	#[serde(with = "hex::serde")]
	pub account: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyHash {
	#[serde(with = "hex::serde")]
	pub hash: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLocal {
	#[serde(with = "hex::serde")]
	pub hash: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct URef {
	#[serde(with = "hex::serde")]
	pub uref: Vec<u8>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_rights: Option<String>,
}

// -- Balance --

/// Resolve the spendable balance of the account at `address` as of
/// `block_hash`.
///
/// account -> its "mint" named key -> mint's private uref -> local key
/// (mint private uref, purse id) -> balance uref -> big_int value. Each
/// lookup needs the previous result.
pub async fn resolve_balance<S>(service: &S, address: &str, block_hash: &str) -> Result<BigUint>
where
	S: NodeService + ?Sized,
{
	let account_query = StateQuery::new(KeyVariant::Address, address, "")?;
	let account = match query(service, block_hash, account_query).await? {
		StateValue::Account(account) => account,
		other => return Err(unexpected("account", &other)),
	};

	let mint = account
		.known_urefs
		.iter()
		.find(|k| k.name == MINT_NAME)
		.ok_or(ClientError::MissingMintReference)?;
	let mint_public = mint.key.as_uref().ok_or_else(|| ClientError::UnexpectedStateShape {
		expected: "uref key",
		observed: mint.key.kind().to_owned(),
	})?;
	debug!(mint = %hex::encode(&mint_public.uref), "found mint reference");

	let mint_private = expect_uref(
		query(service, block_hash, StateQuery::of(KeyVariant::Uref, &mint_public.uref)).await?,
	)?;

	// The mint indexes purses by their byte-array encoding.
	let purse = abi::byte_array(&account.purse_id.uref);
	let local = StateQuery::local(&mint_private.uref, &purse);
	debug!(key = %local.key_base16, "looking up balance uref");
	let balance_uref = expect_uref(query(service, block_hash, local).await?)?;

	match query(service, block_hash, StateQuery::of(KeyVariant::Uref, &balance_uref.uref)).await? {
		StateValue::BigInt(value) => value.to_biguint(),
		other => Err(unexpected("big_int", &other)),
	}
}

async fn query<S>(service: &S, block_hash: &str, query: StateQuery) -> Result<StateValue>
where
	S: NodeService + ?Sized,
{
	debug!(variant = %query.key_variant, key = %query.key_base16, "querying state");
	service
		.get_block_state(GetBlockStateRequest {
			block_hash_base16: block_hash.to_owned(),
			query,
		})
		.await
}

fn expect_uref(value: StateValue) -> Result<URef> {
	match value {
		StateValue::Key(Key::Uref(uref)) => Ok(uref),
		StateValue::Key(key) => Err(ClientError::UnexpectedStateShape {
			expected: "uref key",
			observed: key.kind().to_owned(),
		}),
		other => Err(unexpected("key", &other)),
	}
}

fn unexpected(expected: &'static str, observed: &StateValue) -> ClientError {
	ClientError::UnexpectedStateShape {
		expected,
		observed: observed.kind().to_owned(),
	}
}

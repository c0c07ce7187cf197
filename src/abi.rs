//! Argument encoding for contract calls.
//!
//! Every scalar has a fixed little-endian layout, and an argument list is
//! a `u32` count followed by each argument wrapped as a byte array. The
//! node re-derives the same bytes, so this layout must not drift.

use num_bigint::BigUint;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ClientError, Result};

/// Length of an account identifier (an ed25519 public key).
pub const ACCOUNT_LENGTH: usize = 32;

const U512_BYTES: usize = 64;

/// Every type key accepted in JSON argument lists.
pub const ALL_TYPES: &[&str] = &[
	"u32",
	"u64",
	"u512",
	"int_value",
	"long_value",
	"big_int",
	"byte_array",
	"account",
	"bytes_value",
	"option",
	"optional_value",
];

// -- Scalar encoders --

pub fn u32(n: u32) -> Vec<u8> {
	n.to_le_bytes().to_vec()
}

pub fn u64(n: u64) -> Vec<u8> {
	n.to_le_bytes().to_vec()
}

/// Length byte followed by the significant little-endian bytes of `n`.
/// Zero is the single byte `0`.
pub fn u512(n: &BigUint) -> Result<Vec<u8>> {
	if n.bits() > (U512_BYTES * 8) as u64 {
		return Err(ClientError::invalid("u512 value does not fit in 64 bytes"));
	}
	if n.bits() == 0 {
		return Ok(vec![0]);
	}
	let le = n.to_bytes_le();
	let mut out = Vec::with_capacity(le.len() + 1);
	out.push(le.len() as u8);
	out.extend_from_slice(&le);
	Ok(out)
}

/// Read back a `u512` encoding, returning the value and the number of
/// bytes consumed.
pub fn decode_u512(bytes: &[u8]) -> Result<(BigUint, usize)> {
	let (&len, rest) = bytes
		.split_first()
		.ok_or_else(|| ClientError::invalid("u512 encoding is empty"))?;
	let len = len as usize;
	if len > U512_BYTES {
		return Err(ClientError::invalid(format!("u512 length byte {len} exceeds 64")));
	}
	let payload = rest
		.get(..len)
		.ok_or_else(|| ClientError::invalid("u512 encoding is truncated"))?;
	Ok((BigUint::from_bytes_le(payload), len + 1))
}

pub fn byte_array(bytes: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(bytes.len() + 4);
	out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
	out.extend_from_slice(bytes);
	out
}

pub fn account(bytes: &[u8]) -> Result<Vec<u8>> {
	if bytes.len() != ACCOUNT_LENGTH {
		return Err(ClientError::invalid(format!(
			"account must be {ACCOUNT_LENGTH} bytes long, got {}",
			bytes.len()
		)));
	}
	Ok(byte_array(bytes))
}

pub fn option(inner: Option<&[u8]>) -> Vec<u8> {
	match inner {
		None => vec![0],
		Some(bytes) => {
			let mut out = Vec::with_capacity(bytes.len() + 1);
			out.push(1);
			out.extend_from_slice(bytes);
			out
		}
	}
}

/// Join already-encoded arguments into a list. Each item is wrapped as a
/// byte array on top of its own encoding.
pub fn args<T: AsRef<[u8]>>(items: &[T]) -> Vec<u8> {
	let mut out = u32(items.len() as u32);
	for item in items {
		out.extend_from_slice(&byte_array(item.as_ref()));
	}
	out
}

// -- Typed values --

/// A single contract argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
	U32(u32),
	U64(u64),
	U512(BigUint),
	ByteArray(Vec<u8>),
	Account(Vec<u8>),
	Optional(Option<Box<AbiValue>>),
}

impl AbiValue {
	pub fn encode(&self) -> Result<Vec<u8>> {
		match self {
			Self::U32(n) => Ok(u32(*n)),
			Self::U64(n) => Ok(u64(*n)),
			Self::U512(n) => u512(n),
			Self::ByteArray(b) => Ok(byte_array(b)),
			Self::Account(b) => account(b),
			Self::Optional(None) => Ok(option(None)),
			Self::Optional(Some(inner)) => Ok(option(Some(&inner.encode()?))),
		}
	}
}

/// Encode a typed argument list.
pub fn encode_args(values: &[AbiValue]) -> Result<Vec<u8>> {
	let encoded = values
		.iter()
		.map(AbiValue::encode)
		.collect::<Result<Vec<_>>>()?;
	Ok(args(&encoded))
}

// -- JSON arguments --

/// How a JSON type key is interpreted. Several keys share one encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
	U32,
	U64,
	U512,
	/// `u512` that also accepts the `{"value": ...}` wrapper.
	BigInt,
	ByteArray,
	Account,
	Optional,
}

impl TypeTag {
	pub fn from_key(key: &str) -> Result<Self> {
		Ok(match key {
			"u32" | "int_value" => Self::U32,
			"u64" | "long_value" => Self::U64,
			"u512" => Self::U512,
			"big_int" => Self::BigInt,
			"byte_array" | "bytes_value" => Self::ByteArray,
			"account" => Self::Account,
			"option" | "optional_value" => Self::Optional,
			other => {
				return Err(ClientError::UnknownType {
					key: other.to_owned(),
					allowed: ALL_TYPES,
				})
			}
		})
	}

	fn parse(self, value: &Value) -> Result<AbiValue> {
		match self {
			Self::U32 => {
				let n = json_uint(value)?;
				let n = u32::try_from(&n)
					.map_err(|_| ClientError::invalid(format!("{n} does not fit in u32")))?;
				Ok(AbiValue::U32(n))
			}
			Self::U64 => {
				let n = json_uint(value)?;
				let n = u64::try_from(&n)
					.map_err(|_| ClientError::invalid(format!("{n} does not fit in u64")))?;
				Ok(AbiValue::U64(n))
			}
			Self::U512 => Ok(AbiValue::U512(json_uint(value)?)),
			Self::BigInt => {
				let inner = value.get("value").unwrap_or(value);
				Ok(AbiValue::U512(json_uint(inner)?))
			}
			Self::ByteArray => Ok(AbiValue::ByteArray(json_hex(value)?)),
			Self::Account => Ok(AbiValue::Account(json_hex(value)?)),
			Self::Optional => {
				let obj = value.as_object().ok_or_else(|| {
					ClientError::invalid("optional value must be a JSON object")
				})?;
				if obj.is_empty() {
					Ok(AbiValue::Optional(None))
				} else {
					Ok(AbiValue::Optional(Some(Box::new(typed_value(obj)?))))
				}
			}
		}
	}
}

#[derive(Debug, Deserialize)]
struct JsonArg {
	#[serde(default)]
	name: String,
	value: Map<String, Value>,
}

/// Parse a JSON argument list such as
/// `[{"name": "amount", "value": {"long_value": 123456}}]`.
pub fn values_from_json(text: &str) -> Result<Vec<AbiValue>> {
	let parsed: Vec<JsonArg> = serde_json::from_str(text)
		.map_err(|e| ClientError::invalid(format!("malformed JSON args: {e}")))?;
	parsed
		.iter()
		.map(|arg| {
			typed_value(&arg.value).map_err(|e| match e {
				ClientError::InvalidArgument(msg) if !arg.name.is_empty() => {
					ClientError::invalid(format!("argument {}: {msg}", arg.name))
				}
				other => other,
			})
		})
		.collect()
}

/// Parse and encode a JSON argument list in one step.
pub fn args_from_json(text: &str) -> Result<Vec<u8>> {
	encode_args(&values_from_json(text)?)
}

/// `{type_key: value}` with exactly one entry.
fn typed_value(obj: &Map<String, Value>) -> Result<AbiValue> {
	let mut entries = obj.iter();
	match (entries.next(), entries.next()) {
		(Some((key, value)), None) => TypeTag::from_key(key)?.parse(value),
		_ => Err(ClientError::invalid(
			"argument value must hold exactly one type key",
		)),
	}
}

fn json_uint(value: &Value) -> Result<BigUint> {
	match value {
		// Numbers keep their literal digits, so values past u64 stay exact.
		Value::Number(n) => n
			.to_string()
			.parse::<BigUint>()
			.map_err(|_| ClientError::invalid(format!("{n} is not an unsigned integer"))),
		Value::String(s) => s
			.trim()
			.parse::<BigUint>()
			.map_err(|_| ClientError::invalid(format!("{s:?} is not an unsigned integer"))),
		other => Err(ClientError::invalid(format!(
			"expected an integer, found {other}"
		))),
	}
}

fn json_hex(value: &Value) -> Result<Vec<u8>> {
	let s = value
		.as_str()
		.ok_or_else(|| ClientError::invalid(format!("expected a hex string, found {value}")))?;
	hex::decode(s).map_err(|e| ClientError::invalid(format!("invalid hex {s:?}: {e}")))
}

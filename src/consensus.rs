//! Protobuf records of the deploy envelope.
//!
//! Hashes are taken over the protobuf encoding of these messages, so the
//! field numbers below are part of the protocol. Byte fields serialize as
//! hex in JSON.

use prost::bytes::{Buf, BufMut};
use prost::encoding::{self, DecodeContext, WireType};
use prost::{DecodeError, Message};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
pub struct Deploy {
	/// Hash of the encoded `header`.
	#[prost(bytes = "vec", tag = "1")]
	#[serde(with = "hex::serde")]
	pub deploy_hash: Vec<u8>,
	#[prost(message, optional, tag = "2")]
	pub header: Option<Header>,
	#[prost(message, optional, tag = "3")]
	pub body: Option<Body>,
	#[prost(message, repeated, tag = "4")]
	#[serde(default)]
	pub approvals: Vec<Approval>,
}

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
pub struct Header {
	#[prost(bytes = "vec", tag = "1")]
	#[serde(with = "hex::serde")]
	pub account_public_key: Vec<u8>,
	/// Seconds since the epoch.
	#[prost(uint64, tag = "3")]
	pub timestamp: u64,
	#[prost(uint64, tag = "4")]
	pub gas_price: u64,
	#[prost(bytes = "vec", tag = "5")]
	#[serde(with = "hex::serde")]
	pub body_hash: Vec<u8>,
}

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
pub struct Body {
	#[prost(message, optional, tag = "1")]
	pub session: Option<Code>,
	#[prost(message, optional, tag = "2")]
	pub payment: Option<Code>,
}

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
pub struct Approval {
	#[prost(bytes = "vec", tag = "1")]
	#[serde(with = "hex::serde")]
	pub approver_public_key: Vec<u8>,
	#[prost(message, optional, tag = "2")]
	pub signature: Option<Signature>,
}

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
pub struct Signature {
	#[prost(string, tag = "1")]
	pub sig_algorithm: String,
	#[prost(bytes = "vec", tag = "2")]
	#[serde(with = "hex::serde")]
	pub sig: Vec<u8>,
}

/// Where the code to execute comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contract {
	/// Inline wasm module.
	Wasm(#[serde(with = "hex::serde")] Vec<u8>),
	/// Hash of a stored contract.
	Hash(#[serde(with = "hex::serde")] Vec<u8>),
	/// Named key of the executing account.
	Name(String),
	/// Unforgeable reference to a stored contract.
	Uref(#[serde(with = "hex::serde")] Vec<u8>),
}

const WASM_TAG: u32 = 1;
const ABI_ARGS_TAG: u32 = 2;
const HASH_TAG: u32 = 3;
const NAME_TAG: u32 = 4;
const UREF_TAG: u32 = 5;

/// Code reference plus its ABI-encoded arguments.
///
/// The contract oneof interleaves with `abi_args` by field number
/// (wasm=1, abi_args=2, hash=3, ...). Derived encoders would write the
/// oneof as a block, so `Message` is implemented by hand to keep the
/// canonical ascending order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Code {
	pub contract: Option<Contract>,
	#[serde(with = "hex::serde", default)]
	pub abi_args: Vec<u8>,
}

impl Message for Code {
	fn encode_raw<B>(&self, buf: &mut B)
	where
		B: BufMut,
		Self: Sized,
	{
		if let Some(Contract::Wasm(wasm)) = &self.contract {
			encoding::bytes::encode(WASM_TAG, wasm, buf);
		}
		if !self.abi_args.is_empty() {
			encoding::bytes::encode(ABI_ARGS_TAG, &self.abi_args, buf);
		}
		match &self.contract {
			Some(Contract::Hash(hash)) => encoding::bytes::encode(HASH_TAG, hash, buf),
			Some(Contract::Name(name)) => encoding::string::encode(NAME_TAG, name, buf),
			Some(Contract::Uref(uref)) => encoding::bytes::encode(UREF_TAG, uref, buf),
			Some(Contract::Wasm(_)) | None => {}
		}
	}

	fn merge_field<B>(
		&mut self,
		tag: u32,
		wire_type: WireType,
		buf: &mut B,
		ctx: DecodeContext,
	) -> Result<(), DecodeError>
	where
		B: Buf,
		Self: Sized,
	{
		match tag {
			ABI_ARGS_TAG => encoding::bytes::merge(wire_type, &mut self.abi_args, buf, ctx),
			NAME_TAG => {
				let mut name = String::new();
				encoding::string::merge(wire_type, &mut name, buf, ctx)?;
				self.contract = Some(Contract::Name(name));
				Ok(())
			}
			WASM_TAG | HASH_TAG | UREF_TAG => {
				let mut value = Vec::new();
				encoding::bytes::merge(wire_type, &mut value, buf, ctx)?;
				self.contract = Some(match tag {
					WASM_TAG => Contract::Wasm(value),
					HASH_TAG => Contract::Hash(value),
					_ => Contract::Uref(value),
				});
				Ok(())
			}
			_ => encoding::skip_field(wire_type, tag, buf, ctx),
		}
	}

	fn encoded_len(&self) -> usize {
		let contract = match &self.contract {
			Some(Contract::Wasm(wasm)) => encoding::bytes::encoded_len(WASM_TAG, wasm),
			Some(Contract::Hash(hash)) => encoding::bytes::encoded_len(HASH_TAG, hash),
			Some(Contract::Name(name)) => encoding::string::encoded_len(NAME_TAG, name),
			Some(Contract::Uref(uref)) => encoding::bytes::encoded_len(UREF_TAG, uref),
			None => 0,
		};
		let args = if self.abi_args.is_empty() {
			0
		} else {
			encoding::bytes::encoded_len(ABI_ARGS_TAG, &self.abi_args)
		};
		contract + args
	}

	fn clear(&mut self) {
		self.contract = None;
		self.abi_args.clear();
	}
}

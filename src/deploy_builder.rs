use prost::Message;
use tracing::{debug, info};

use crate::abi::ACCOUNT_LENGTH;
use crate::consensus::{Approval, Body, Code, Contract, Deploy, Header, Signature};
use crate::crypto::{self, KEY_LENGTH, SIG_ALGORITHM};
use crate::error::{ClientError, Result};

pub const DEFAULT_GAS_PRICE: u64 = 10;

/// The four mutually exclusive ways to reference code. Exactly one must
/// be set when the deploy is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeOptions {
	pub wasm: Option<Vec<u8>>,
	pub hash: Option<Vec<u8>>,
	pub name: Option<String>,
	pub uref: Option<Vec<u8>>,
}

impl CodeOptions {
	pub fn wasm(bytes: Vec<u8>) -> Self {
		Self {
			wasm: Some(bytes),
			..Self::default()
		}
	}

	pub fn hash(hash: Vec<u8>) -> Self {
		Self {
			hash: Some(hash),
			..Self::default()
		}
	}

	pub fn name(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			..Self::default()
		}
	}

	pub fn uref(uref: Vec<u8>) -> Self {
		Self {
			uref: Some(uref),
			..Self::default()
		}
	}

	/// Number of reference forms that carry a value. Empty values count as
	/// unset, so an empty wasm module is no reference at all.
	pub fn count(&self) -> usize {
		[
			self.wasm.as_ref().is_some_and(|v| !v.is_empty()),
			self.hash.as_ref().is_some_and(|v| !v.is_empty()),
			self.name.as_ref().is_some_and(|v| !v.is_empty()),
			self.uref.as_ref().is_some_and(|v| !v.is_empty()),
		]
		.into_iter()
		.filter(|set| *set)
		.count()
	}

	pub fn is_empty(&self) -> bool {
		self.count() == 0
	}

	/// Resolve to the single contract reference, or fail naming `group`.
	fn into_contract(self, group: &str) -> Result<Contract> {
		let wasm = self.wasm.filter(|v| !v.is_empty());
		let hash = self.hash.filter(|v| !v.is_empty());
		let name = self.name.filter(|v| !v.is_empty());
		let uref = self.uref.filter(|v| !v.is_empty());
		match (wasm, hash, name, uref) {
			(Some(w), None, None, None) => Ok(Contract::Wasm(w)),
			(None, Some(h), None, None) => Ok(Contract::Hash(h)),
			(None, None, Some(n), None) => Ok(Contract::Name(n)),
			(None, None, None, Some(u)) => Ok(Contract::Uref(u)),
			_ => Err(ClientError::invalid(format!(
				"deploy: only one of {group}, {group}_hash, {group}_name, {group}_uref must be provided"
			))),
		}
	}
}

/// Assembles a [`Deploy`]: body, header, hashes and optional approval.
#[derive(Debug, Clone)]
pub struct DeployBuilder {
	session: CodeOptions,
	session_args: Vec<u8>,
	payment: CodeOptions,
	payment_args: Vec<u8>,
	account: Option<Vec<u8>>,
	gas_price: u64,
	timestamp: Option<u64>,
}

impl Default for DeployBuilder {
	fn default() -> Self {
		Self {
			session: CodeOptions::default(),
			session_args: Vec::new(),
			payment: CodeOptions::default(),
			payment_args: Vec::new(),
			account: None,
			gas_price: DEFAULT_GAS_PRICE,
			timestamp: None,
		}
	}
}

impl DeployBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Session code and its ABI-encoded argument list.
	pub fn session(mut self, code: CodeOptions, args: Vec<u8>) -> Self {
		self.session = code;
		self.session_args = args;
		self
	}

	/// Payment code and its ABI-encoded argument list. Leaving payment unset
	/// reuses the session code.
	pub fn payment(mut self, code: CodeOptions, args: Vec<u8>) -> Self {
		self.payment = code;
		self.payment_args = args;
		self
	}

	/// Account the deploy runs as. Defaults to the signing key's public key.
	pub fn account(mut self, public_key: Vec<u8>) -> Self {
		self.account = Some(public_key);
		self
	}

	pub fn gas_price(mut self, gas_price: u64) -> Self {
		self.gas_price = gas_price;
		self
	}

	/// Seconds since the epoch. Defaults to the current time.
	pub fn timestamp(mut self, timestamp: u64) -> Self {
		self.timestamp = Some(timestamp);
		self
	}

	/// Build the envelope. With a signing key the deploy carries one
	/// approval over its hash; without one it is left unsigned.
	pub fn build(self, signing_key: Option<&[u8; KEY_LENGTH]>) -> Result<Deploy> {
		let Self {
			session,
			session_args,
			mut payment,
			mut payment_args,
			account,
			gas_price,
			timestamp,
		} = self;

		if payment.is_empty() {
			info!("No payment contract provided, using session as payment");
			payment = session.clone();
		}
		// Same code, same arguments. Wasm is compared by content, so two
		// files with identical bytes count as the same code.
		if payment == session && !session_args.is_empty() {
			payment_args = session_args.clone();
		}

		let session = session.into_contract("session")?;
		let payment = payment.into_contract("payment")?;

		if gas_price == 0 {
			return Err(ClientError::invalid("gas price must be a positive integer"));
		}

		let approver = signing_key.map(crypto::public_key);
		let account_public_key = match (account, approver) {
			(Some(account), _) => {
				if account.len() != ACCOUNT_LENGTH {
					return Err(ClientError::invalid(format!(
						"account public key must be {ACCOUNT_LENGTH} bytes, got {}",
						account.len()
					)));
				}
				account
			}
			(None, Some(public)) => public.to_vec(),
			// An unattributed deploy is rejected rather than sent with an
			// empty account.
			(None, None) => {
				return Err(ClientError::invalid(
					"deploy needs an account public key or a signing key",
				))
			}
		};

		let body = Body {
			session: Some(Code {
				contract: Some(session),
				abi_args: session_args,
			}),
			payment: Some(Code {
				contract: Some(payment),
				abi_args: payment_args,
			}),
		};

		let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64);
		let header = Header {
			account_public_key,
			timestamp,
			gas_price,
			body_hash: crypto::hash(&body.encode_to_vec()).to_vec(),
		};
		let deploy_hash = crypto::hash(&header.encode_to_vec()).to_vec();
		debug!(deploy_hash = %hex::encode(&deploy_hash), "built deploy");

		let approvals = match (signing_key, approver) {
			(Some(secret), Some(public)) => vec![Approval {
				approver_public_key: public.to_vec(),
				signature: Some(Signature {
					sig_algorithm: SIG_ALGORITHM.to_owned(),
					sig: crypto::sign(secret, &deploy_hash),
				}),
			}],
			_ => Vec::new(),
		};

		Ok(Deploy {
			deploy_hash,
			header: Some(header),
			body: Some(body),
			approvals,
		})
	}
}

impl Deploy {
	/// Recompute both hashes and check every approval signature.
	pub fn verify(&self) -> Result<()> {
		let header = self
			.header
			.as_ref()
			.ok_or_else(|| ClientError::invalid("deploy has no header"))?;
		let body = self
			.body
			.as_ref()
			.ok_or_else(|| ClientError::invalid("deploy has no body"))?;

		if header.body_hash != crypto::hash(&body.encode_to_vec()) {
			return Err(ClientError::invalid("body hash does not match body"));
		}
		if self.deploy_hash != crypto::hash(&header.encode_to_vec()) {
			return Err(ClientError::invalid("deploy hash does not match header"));
		}
		for approval in &self.approvals {
			let sig = approval
				.signature
				.as_ref()
				.ok_or_else(|| ClientError::invalid("approval has no signature"))?;
			if sig.sig_algorithm != SIG_ALGORITHM {
				return Err(ClientError::invalid(format!(
					"unsupported signature algorithm {}",
					sig.sig_algorithm
				)));
			}
			if !crypto::verify(&approval.approver_public_key, &self.deploy_hash, &sig.sig) {
				return Err(ClientError::invalid(format!(
					"bad signature from {}",
					hex::encode(&approval.approver_public_key)
				)));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::abi;

	const SECRET: [u8; 32] = [11u8; 32];

	fn session_args() -> Vec<u8> {
		abi::args(&[abi::u32(1024), abi::u64(12)])
	}

	fn builder() -> DeployBuilder {
		DeployBuilder::new()
			.session(CodeOptions::wasm(vec![0x00, 0x61, 0x73, 0x6d]), session_args())
			.payment(CodeOptions::name("standard_payment"), abi::args(&[abi::u32(1)]))
			.account(vec![1u8; 32])
			.timestamp(1_560_000_000)
	}

	#[test]
	fn exactly_one_session_reference() {
		let none = DeployBuilder::new()
			.payment(CodeOptions::name("pay"), vec![])
			.account(vec![0u8; 32])
			.build(None);
		assert!(matches!(none, Err(ClientError::InvalidArgument(ref m)) if m.contains("session")));

		let two = CodeOptions {
			wasm: Some(vec![1]),
			hash: Some(vec![2; 32]),
			..CodeOptions::default()
		};
		let err = DeployBuilder::new()
			.session(two, vec![])
			.payment(CodeOptions::name("pay"), vec![])
			.account(vec![0u8; 32])
			.build(None);
		assert!(matches!(err, Err(ClientError::InvalidArgument(ref m)) if m.contains("session_hash")));
	}

	#[test]
	fn empty_reference_values_count_as_unset() {
		let padded = CodeOptions {
			wasm: Some(vec![]),
			hash: Some(vec![]),
			name: Some("s".into()),
			uref: Some(vec![]),
		};
		assert_eq!(padded.count(), 1);
		let deploy = DeployBuilder::new()
			.session(padded, vec![])
			.account(vec![0u8; 32])
			.build(None)
			.unwrap();
		let session = deploy.body.unwrap().session.unwrap();
		assert_eq!(session.contract, Some(Contract::Name("s".into())));

		let empty_wasm = DeployBuilder::new()
			.session(CodeOptions::wasm(vec![]), vec![])
			.payment(CodeOptions::name("pay"), vec![])
			.account(vec![0u8; 32])
			.build(None);
		assert!(matches!(empty_wasm, Err(ClientError::InvalidArgument(ref m)) if m.contains("session_uref")));
	}

	#[test]
	fn identical_wasm_bytes_share_session_args() {
		let module = vec![0x00, 0x61, 0x73, 0x6d];
		let deploy = DeployBuilder::new()
			.session(CodeOptions::wasm(module.clone()), session_args())
			.payment(CodeOptions::wasm(module), abi::args(&[abi::u32(9)]))
			.account(vec![0u8; 32])
			.build(None)
			.unwrap();
		let body = deploy.body.unwrap();
		assert_eq!(body.payment.unwrap().abi_args, session_args());
	}

	#[test]
	fn exactly_one_payment_reference() {
		let two = CodeOptions {
			name: Some("a".into()),
			uref: Some(vec![3; 32]),
			..CodeOptions::default()
		};
		let err = DeployBuilder::new()
			.session(CodeOptions::name("s"), vec![])
			.payment(two, vec![])
			.account(vec![0u8; 32])
			.build(None);
		assert!(matches!(err, Err(ClientError::InvalidArgument(ref m)) if m.contains("payment_uref")));
	}

	#[test]
	fn each_single_reference_kind_builds() {
		for code in [
			CodeOptions::wasm(vec![1, 2]),
			CodeOptions::hash(vec![2; 32]),
			CodeOptions::name("counter"),
			CodeOptions::uref(vec![4; 32]),
		] {
			let deploy = DeployBuilder::new()
				.session(code.clone(), vec![])
				.payment(code, vec![])
				.account(vec![0u8; 32])
				.timestamp(1)
				.build(None)
				.unwrap();
			assert!(deploy.body.is_some());
		}
	}

	#[test]
	fn missing_payment_reuses_session() {
		let deploy = DeployBuilder::new()
			.session(CodeOptions::hash(vec![9u8; 32]), session_args())
			.account(vec![1u8; 32])
			.timestamp(7)
			.build(None)
			.unwrap();
		let body = deploy.body.unwrap();
		let session = body.session.unwrap();
		let payment = body.payment.unwrap();
		assert_eq!(session.encode_to_vec(), payment.encode_to_vec());
		assert_eq!(payment.abi_args, session_args());
	}

	#[test]
	fn same_code_payment_takes_session_args() {
		let code = CodeOptions::name("transfer");
		let deploy = DeployBuilder::new()
			.session(code.clone(), session_args())
			.payment(code, abi::args(&[abi::u32(99)]))
			.account(vec![1u8; 32])
			.timestamp(7)
			.build(None)
			.unwrap();
		assert_eq!(deploy.body.unwrap().payment.unwrap().abi_args, session_args());
	}

	#[test]
	fn distinct_payment_keeps_its_own_args() {
		let deploy = builder().build(None).unwrap();
		let payment = deploy.body.unwrap().payment.unwrap();
		assert_eq!(payment.contract, Some(Contract::Name("standard_payment".into())));
		assert_eq!(payment.abi_args, abi::args(&[abi::u32(1)]));
	}

	#[test]
	fn hashes_cover_encoded_records() {
		let deploy = builder().build(None).unwrap();
		let header = deploy.header.as_ref().unwrap();
		let body = deploy.body.as_ref().unwrap();
		assert_eq!(header.body_hash, crypto::hash(&body.encode_to_vec()));
		assert_eq!(deploy.deploy_hash, crypto::hash(&header.encode_to_vec()));
		assert_eq!(header.gas_price, DEFAULT_GAS_PRICE);
		assert_eq!(header.timestamp, 1_560_000_000);
	}

	#[test]
	fn building_is_deterministic() {
		let a = builder().build(Some(&SECRET)).unwrap();
		let b = builder().build(Some(&SECRET)).unwrap();
		assert_eq!(a.encode_to_vec(), b.encode_to_vec());

		let c = builder().gas_price(11).build(Some(&SECRET)).unwrap();
		assert_ne!(a.deploy_hash, c.deploy_hash);
	}

	#[test]
	fn unsigned_deploy_has_no_approvals() {
		let deploy = builder().build(None).unwrap();
		assert!(deploy.approvals.is_empty());
		deploy.verify().unwrap();
	}

	#[test]
	fn signed_deploy_verifies() {
		let deploy = builder().build(Some(&SECRET)).unwrap();
		assert_eq!(deploy.approvals.len(), 1);
		let approval = &deploy.approvals[0];
		assert_eq!(approval.approver_public_key, crypto::public_key(&SECRET).to_vec());
		assert_eq!(approval.signature.as_ref().unwrap().sig_algorithm, "ed25519");
		deploy.verify().unwrap();

		let mut tampered = deploy.clone();
		tampered.header.as_mut().unwrap().gas_price += 1;
		assert!(tampered.verify().is_err());
	}

	#[test]
	fn account_defaults_to_signer() {
		let deploy = DeployBuilder::new()
			.session(CodeOptions::name("s"), vec![])
			.timestamp(1)
			.build(Some(&SECRET))
			.unwrap();
		assert_eq!(
			deploy.header.unwrap().account_public_key,
			crypto::public_key(&SECRET).to_vec()
		);
	}

	#[test]
	fn account_length_and_gas_price_are_checked() {
		let short = builder().account(vec![0u8; 31]).build(None);
		assert!(matches!(short, Err(ClientError::InvalidArgument(_))));

		let zero_gas = builder().gas_price(0).build(None);
		assert!(matches!(zero_gas, Err(ClientError::InvalidArgument(_))));
	}

	#[test]
	fn deploy_without_account_or_signer_is_rejected() {
		let anonymous = DeployBuilder::new()
			.session(CodeOptions::name("s"), vec![])
			.build(None);
		assert!(matches!(
			anonymous,
			Err(ClientError::InvalidArgument(ref m)) if m.contains("account public key or a signing key")
		));
	}
}

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{ClientError, Result};

/// Algorithm name recorded next to every deploy signature.
pub const SIG_ALGORITHM: &str = "ed25519";

pub const KEY_LENGTH: usize = 32;

// -- Hashing --

/// 32-byte blake2b digest used for body and deploy hashes.
pub fn hash(data: &[u8]) -> [u8; 32] {
	Blake2b::<U32>::digest(data).into()
}

// -- Key files --

/// Extract the raw 32-byte key from PEM text.
///
/// Only the first non-armour line is read. Payloads whose length is a
/// multiple of 32 hold the key up front (a bare seed, or seed followed by
/// public key). Anything else carries a DER algorithm prefix, so the key
/// is the trailing 32 bytes.
pub fn parse_pem_key(text: &str) -> Result<[u8; KEY_LENGTH]> {
	let line = text
		.lines()
		.map(str::trim)
		.find(|l| !l.is_empty() && !l.starts_with("-----"))
		.ok_or_else(|| ClientError::invalid("PEM key has no content line"))?;

	let raw = STANDARD
		.decode(line)
		.map_err(|e| ClientError::invalid(format!("PEM key is not valid base64: {e}")))?;
	if raw.len() < KEY_LENGTH {
		return Err(ClientError::invalid(format!(
			"PEM key decodes to {} bytes, need at least {KEY_LENGTH}",
			raw.len()
		)));
	}

	let key = if raw.len() % KEY_LENGTH == 0 {
		&raw[..KEY_LENGTH]
	} else {
		&raw[raw.len() - KEY_LENGTH..]
	};
	let mut out = [0u8; KEY_LENGTH];
	out.copy_from_slice(key);
	Ok(out)
}

/// Read a PEM key file from disk.
pub fn read_pem_key(path: impl AsRef<Path>) -> Result<[u8; KEY_LENGTH]> {
	let path = path.as_ref();
	let text = std::fs::read_to_string(path).map_err(|e| {
		ClientError::invalid(format!("cannot read key file {}: {e}", path.display()))
	})?;
	parse_pem_key(&text)
}

// -- Signatures --

pub fn public_key(secret: &[u8; KEY_LENGTH]) -> [u8; KEY_LENGTH] {
	SigningKey::from_bytes(secret).verifying_key().to_bytes()
}

/// Detached ed25519 signature (64 bytes).
pub fn sign(secret: &[u8; KEY_LENGTH], message: &[u8]) -> Vec<u8> {
	SigningKey::from_bytes(secret).sign(message).to_bytes().to_vec()
}

pub fn verify(public: &[u8], message: &[u8], signature: &[u8]) -> bool {
	let Ok(public) = <[u8; KEY_LENGTH]>::try_from(public) else {
		return false;
	};
	let Ok(signature) = <[u8; 64]>::try_from(signature) else {
		return false;
	};
	let Ok(key) = VerifyingKey::from_bytes(&public) else {
		return false;
	};
	key.verify(message, &Signature::from_bytes(&signature)).is_ok()
}

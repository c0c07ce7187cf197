use thiserror::Error;

/// Every failure the client library can report.
///
/// Transport faults never escape as `reqwest` or `serde_json` errors; the
/// rpc layer folds them into [`ClientError::RemoteServiceFailure`].
#[derive(Debug, Error)]
pub enum ClientError {
	/// Malformed user input: wrong lengths, wrong reference cardinality,
	/// bad hex, out-of-range integers.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// A JSON argument used a type key outside the ABI type set.
	#[error("unknown type {key}, expected one of {allowed:?}")]
	UnknownType {
		key: String,
		allowed: &'static [&'static str],
	},

	#[error("balance: account's known_urefs map did not contain the mint contract address")]
	MissingMintReference,

	#[error("balance: expected {expected} value, found {observed}")]
	UnexpectedStateShape {
		expected: &'static str,
		observed: String,
	},

	#[error("{status}: {details}")]
	RemoteServiceFailure { status: String, details: String },
}

impl ClientError {
	pub fn invalid(msg: impl Into<String>) -> Self {
		Self::InvalidArgument(msg.into())
	}
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

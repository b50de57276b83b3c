//! Interstitial-level error types shared across verification, sessions, and flows.

// self
use crate::_prelude::*;

/// Interstitial-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical interstitial error exposed by public APIs.
///
/// Every variant except [`Error::Config`] and [`Error::Storage`] is caused by the client
/// request. None of them is recoverable within the same request; invalid field values are
/// not errors at all and re-render the form instead.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Inbound signed assertion failed verification.
	#[error(transparent)]
	Assertion(#[from] crate::assertion::AssertionError),
	/// Anti-forgery token was missing or did not match the session.
	#[error(transparent)]
	Forgery(#[from] crate::forgery::ForgeryError),
	/// Form body could not be decoded.
	#[error(transparent)]
	Submission(#[from] crate::submission::SubmissionError),

	/// No transaction is active for the session (stale, replayed, or forged POST).
	#[error("No profile transaction is active for this session.")]
	StaleTransaction,
	/// GET request omitted the provider's continuation marker.
	#[error("Request is missing the continuation state parameter.")]
	MissingContinuation,
}
impl Error {
	/// HTTP status code the surrounding server should answer with.
	pub fn status_code(&self) -> u16 {
		match self {
			Error::Assertion(_) => 401,
			Error::Forgery(_) => 403,
			Error::StaleTransaction | Error::Submission(_) | Error::MissingContinuation => 400,
			Error::Config(_) | Error::Storage(_) => 500,
		}
	}

	/// Detail-free message suitable for a response body.
	///
	/// The [`Display`] output may name the failing check; this never does.
	pub fn public_message(&self) -> &'static str {
		match self.status_code() {
			400 => "Bad request.",
			401 => "Unauthorized.",
			403 => "Forbidden.",
			_ => "Something went wrong.",
		}
	}

	/// Returns `true` when the failure was caused by the client request.
	pub fn is_client_error(&self) -> bool {
		(400..500).contains(&self.status_code())
	}
}

/// Configuration and validation failures raised by the interstitial.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// A required environment variable is absent.
	#[error("Environment variable `{name}` is not set.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// A required value is present but empty.
	#[error("Configuration value `{name}` cannot be empty.")]
	EmptyValue {
		/// Variable or field name.
		name: &'static str,
	},
	/// `PORT` is not a valid TCP port.
	#[error("Port `{value}` is not a valid TCP port.")]
	InvalidPort {
		/// Raw value that failed to parse.
		value: String,
	},
	/// Provider domain does not produce a valid continuation URL.
	#[error("Provider domain `{domain}` does not form a valid continuation URL.")]
	InvalidDomain {
		/// Raw domain value.
		domain: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A required field has no registered predicate or control.
	#[error("Field `{field}` is not registered with the field registry.")]
	UnregisteredField {
		/// Offending field name.
		field: String,
	},
	/// Session forgery secret could not key the MAC.
	#[error("Forgery secret cannot be used as a MAC key.")]
	ForgeryKey,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{assertion::AssertionError, forgery::ForgeryError, store::StoreError};

	#[test]
	fn status_codes_follow_error_class() {
		assert_eq!(Error::from(AssertionError::Expired).status_code(), 401);
		assert_eq!(Error::from(ForgeryError::Mismatch).status_code(), 403);
		assert_eq!(Error::StaleTransaction.status_code(), 400);
		assert_eq!(Error::MissingContinuation.status_code(), 400);
		assert_eq!(
			Error::from(ConfigError::UnregisteredField { field: "nickname".into() })
				.status_code(),
			500
		);
		assert!(Error::StaleTransaction.is_client_error());
		assert!(!Error::from(StoreError::Backend { message: "down".into() }).is_client_error());
	}

	#[test]
	fn public_message_hides_details() {
		let err = Error::from(AssertionError::Malformed { reason: "claim `sub` missing".into() });

		assert!(err.to_string().contains("sub"));
		assert!(!err.public_message().contains("sub"));

		let err = Error::from(StoreError::Backend { message: "redis at 10.0.0.1".into() });

		assert_eq!(err.public_message(), "Something went wrong.");
	}
}

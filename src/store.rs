//! Session storage contracts and the built-in in-memory store.
//!
//! The interstitial never touches cookies. The surrounding server resolves the browser's
//! session cookie to a [`SessionId`] and the flows read and write a [`SessionRecord`]
//! through [`SessionStore`]. A cookie-backed implementation serializes the record; the
//! [`MemoryStore`] keeps it in-process.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	assertion::RequiredFields,
	auth::{SessionId, SubjectId},
	forgery::ForgeryBinding,
};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Keyed session storage implemented by session backends.
///
/// Implementations enforce the absolute session lifetime: a record older than the store's
/// TTL must read as absent.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Fetches the record for `id`, if present and unexpired.
	fn get<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionRecord>>;

	/// Persists or replaces the record for `id`.
	fn set<'a>(&'a self, id: &'a SessionId, record: SessionRecord) -> StoreFuture<'a, ()>;

	/// Atomically removes and returns the record for `id`.
	///
	/// When two callers race, exactly one observes `Some`.
	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionRecord>>;

	/// Replaces the record for `id` only if the live record still equals `expected`.
	///
	/// Never creates a record: an absent or expired one yields
	/// [`CompareAndSwapOutcome::Missing`].
	fn compare_and_swap<'a>(
		&'a self,
		id: &'a SessionId,
		expected: &'a SessionRecord,
		replacement: SessionRecord,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;
}

/// Result of a session compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The live record matched and was replaced.
	Updated,
	/// A live record exists but changed since it was read.
	Mismatch,
	/// No live record exists for the session.
	Missing,
}

/// Everything the interstitial keeps for one browser session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
	/// Active profile transaction, if a GET leg has succeeded.
	pub transaction: Option<TransactionState>,
	/// Anti-forgery secret and the salt of the most recently issued token.
	pub forgery: Option<ForgeryBinding>,
	/// Creation instant; the absolute lifetime is measured from here.
	pub created_at: OffsetDateTime,
}
impl SessionRecord {
	/// Creates an empty record stamped with the current instant.
	pub fn new() -> Self {
		Self::starting_at(OffsetDateTime::now_utc())
	}

	/// Creates an empty record stamped with `instant`.
	pub fn starting_at(instant: OffsetDateTime) -> Self {
		Self { transaction: None, forgery: None, created_at: instant }
	}

	/// Returns `true` if the record has outlived `ttl` at `instant`.
	pub fn is_expired_at(&self, ttl: Duration, instant: OffsetDateTime) -> bool {
		instant >= self.created_at + ttl
	}
}
impl Default for SessionRecord {
	fn default() -> Self {
		Self::new()
	}
}

/// State carried from the GET leg to the POST leg.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
	/// Subject asserted by the provider.
	pub subject: SubjectId,
	/// Fields the provider requires, in display order.
	#[serde(rename = "requiredFields")]
	pub required_fields: RequiredFields,
	/// Opaque provider marker echoed back verbatim on continuation.
	#[serde(rename = "state")]
	pub continuation_marker: String,
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;
	use std::error::Error as StdError;

	#[test]
	fn store_error_converts_into_interstitial_error_with_source() {
		let store_error = StoreError::Backend { message: "session backend unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("session backend unreachable"));

		let source = StdError::source(&error)
			.expect("Interstitial error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn transaction_state_uses_session_layout() {
		let state = TransactionState {
			subject: SubjectId::new("auth0|123").expect("Subject fixture should be valid."),
			required_fields: RequiredFields::new(["title", "company"])
				.expect("Field fixture should be valid."),
			continuation_marker: "xyz".into(),
		};
		let payload = serde_json::to_value(&state).expect("Transaction state should serialize.");

		assert_eq!(
			payload,
			serde_json::json!({
				"subject": "auth0|123",
				"requiredFields": ["title", "company"],
				"state": "xyz",
			})
		);

		let round_trip: TransactionState =
			serde_json::from_value(payload).expect("Transaction state should deserialize.");

		assert_eq!(round_trip, state);
	}

	#[test]
	fn records_expire_after_ttl() {
		let created = time::macros::datetime!(2025-11-10 12:00 UTC);
		let record = SessionRecord::starting_at(created);

		assert!(!record.is_expired_at(Duration::hours(24), created + Duration::hours(23)));
		assert!(record.is_expired_at(Duration::hours(24), created + Duration::hours(24)));
	}
}

//! Transaction state carried between the two legs of the flow.
//!
//! [`TransactionStore`] is a thin facade over any [`SessionStore`]. `begin` replaces the
//! session's transaction while keeping its creation instant and forgery binding, `read`
//! looks it up without consuming it, and `end`/`take` destroy the whole session record.
//! `take` is the only way the submit leg consumes a transaction: it relies on the store's
//! atomic `delete`, so of two racing submissions exactly one receives the state and the
//! other fails as stale.

// self
use crate::{
	_prelude::*,
	assertion::RequiredFields,
	auth::{SessionId, SubjectId},
	store::{SessionRecord, SessionStore, TransactionState},
};

/// Session-scoped transaction accessor.
#[derive(Clone)]
pub struct TransactionStore {
	store: Arc<dyn SessionStore>,
}
impl TransactionStore {
	/// Wraps a session store.
	pub fn new(store: Arc<dyn SessionStore>) -> Self {
		Self { store }
	}

	/// Starts (or restarts) the transaction for `session`.
	pub async fn begin(
		&self,
		session: &SessionId,
		subject: SubjectId,
		required_fields: RequiredFields,
		continuation_marker: impl Into<String>,
	) -> Result<TransactionState> {
		let mut record = self.store.get(session).await?.unwrap_or_default();
		let state = TransactionState {
			subject,
			required_fields,
			continuation_marker: continuation_marker.into(),
		};

		record.transaction = Some(state.clone());

		self.store.set(session, record).await?;

		Ok(state)
	}

	/// Returns the active transaction, if any.
	pub async fn read(&self, session: &SessionId) -> Result<Option<TransactionState>> {
		Ok(self.store.get(session).await?.and_then(|record| record.transaction))
	}

	/// Returns the active transaction or fails with [`Error::StaleTransaction`].
	pub async fn require(&self, session: &SessionId) -> Result<TransactionState> {
		self.read(session).await?.ok_or(Error::StaleTransaction)
	}

	/// Destroys the session record, transaction included.
	pub async fn end(&self, session: &SessionId) -> Result<()> {
		self.store.delete(session).await?;

		Ok(())
	}

	/// Atomically consumes the transaction and destroys the session record.
	pub async fn take(&self, session: &SessionId) -> Result<TransactionState> {
		self.store
			.delete(session)
			.await?
			.and_then(|record: SessionRecord| record.transaction)
			.ok_or(Error::StaleTransaction)
	}
}
impl Debug for TransactionStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TransactionStore(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	fn fixture() -> (TransactionStore, SessionId, SubjectId, RequiredFields) {
		let store = TransactionStore::new(Arc::new(MemoryStore::default()));
		let session = SessionId::new("session-1").expect("Session fixture should be valid.");
		let subject = SubjectId::new("auth0|123").expect("Subject fixture should be valid.");
		let fields = RequiredFields::new(["title"]).expect("Field fixture should be valid.");

		(store, session, subject, fields)
	}

	#[tokio::test]
	async fn read_without_begin_is_absent() {
		let (store, session, ..) = fixture();

		assert!(store.read(&session).await.expect("Read should succeed.").is_none());
		assert!(matches!(store.require(&session).await, Err(Error::StaleTransaction)));
	}

	#[tokio::test]
	async fn begin_overwrites_previous_transaction() {
		let (store, session, subject, fields) = fixture();

		store.begin(&session, subject.clone(), fields.clone(), "first").await.expect("Begin.");
		store.begin(&session, subject, fields, "second").await.expect("Second begin.");

		let state = store.require(&session).await.expect("Transaction should exist.");

		assert_eq!(state.continuation_marker, "second");
	}

	#[tokio::test]
	async fn end_and_take_are_single_use() {
		let (store, session, subject, fields) = fixture();

		store.begin(&session, subject.clone(), fields.clone(), "xyz").await.expect("Begin.");
		store.end(&session).await.expect("End should succeed.");

		assert!(store.read(&session).await.expect("Read should succeed.").is_none());

		store.begin(&session, subject, fields, "xyz").await.expect("Begin.");

		let taken = store.take(&session).await.expect("First take should succeed.");

		assert_eq!(taken.continuation_marker, "xyz");
		assert!(matches!(store.take(&session).await, Err(Error::StaleTransaction)));
	}
}

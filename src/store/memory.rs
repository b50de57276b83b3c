//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::SessionId,
	store::{CompareAndSwapOutcome, SessionRecord, SessionStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<SessionId, SessionRecord>>>;

/// Session backend that keeps records in-process with an absolute lifetime.
///
/// Expired records read as absent. Every `set` also drops all expired records, so sessions
/// that are abandoned after the GET leg do not accumulate.
#[derive(Clone, Debug)]
pub struct MemoryStore {
	map: StoreMap,
	ttl: Duration,
}
impl MemoryStore {
	/// Creates a store whose records expire `ttl` after creation.
	pub fn with_ttl(ttl: Duration) -> Self {
		Self { map: Default::default(), ttl }
	}

	/// Number of records currently held, expired ones included.
	pub fn len(&self) -> usize {
		self.map.read().len()
	}

	/// Returns `true` if no records are held.
	pub fn is_empty(&self) -> bool {
		self.map.read().is_empty()
	}

	/// Drops every expired record.
	pub fn purge_expired(&self) {
		let now = OffsetDateTime::now_utc();

		self.map.write().retain(|_, record| !record.is_expired_at(self.ttl, now));
	}

	fn get_now(map: StoreMap, ttl: Duration, id: SessionId) -> Option<SessionRecord> {
		let now = OffsetDateTime::now_utc();
		let expired = match map.read().get(&id) {
			Some(record) if !record.is_expired_at(ttl, now) => return Some(record.clone()),
			Some(_) => true,
			None => false,
		};

		if expired {
			map.write().remove(&id);
		}

		None
	}

	fn set_now(
		map: StoreMap,
		ttl: Duration,
		id: SessionId,
		record: SessionRecord,
	) -> Result<(), StoreError> {
		let now = OffsetDateTime::now_utc();
		let mut map = map.write();

		map.retain(|_, record| !record.is_expired_at(ttl, now));
		map.insert(id, record);

		Ok(())
	}

	fn delete_now(map: StoreMap, ttl: Duration, id: SessionId) -> Option<SessionRecord> {
		let now = OffsetDateTime::now_utc();

		map.write().remove(&id).filter(|record| !record.is_expired_at(ttl, now))
	}

	fn cas_now(
		map: StoreMap,
		ttl: Duration,
		id: SessionId,
		expected: &SessionRecord,
		replacement: SessionRecord,
	) -> CompareAndSwapOutcome {
		let now = OffsetDateTime::now_utc();
		let mut map = map.write();
		let Some(current) = map.get_mut(&id) else {
			return CompareAndSwapOutcome::Missing;
		};

		if current.is_expired_at(ttl, now) {
			map.remove(&id);

			return CompareAndSwapOutcome::Missing;
		}
		if *current != *expected {
			return CompareAndSwapOutcome::Mismatch;
		}

		*current = replacement;

		CompareAndSwapOutcome::Updated
	}
}
impl Default for MemoryStore {
	fn default() -> Self {
		Self::with_ttl(Duration::hours(24))
	}
}
impl SessionStore for MemoryStore {
	fn get<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionRecord>> {
		let map = self.map.clone();
		let ttl = self.ttl;
		let id = id.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, ttl, id)) })
	}

	fn set<'a>(&'a self, id: &'a SessionId, record: SessionRecord) -> StoreFuture<'a, ()> {
		let map = self.map.clone();
		let ttl = self.ttl;
		let id = id.to_owned();

		Box::pin(async move { Self::set_now(map, ttl, id, record) })
	}

	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionRecord>> {
		let map = self.map.clone();
		let ttl = self.ttl;
		let id = id.to_owned();

		Box::pin(async move { Ok(Self::delete_now(map, ttl, id)) })
	}

	fn compare_and_swap<'a>(
		&'a self,
		id: &'a SessionId,
		expected: &'a SessionRecord,
		replacement: SessionRecord,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		let map = self.map.clone();
		let ttl = self.ttl;
		let id = id.to_owned();

		Box::pin(async move { Ok(Self::cas_now(map, ttl, id, expected, replacement)) })
	}
}

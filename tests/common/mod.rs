//! Shared fixtures for the interstitial integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
// self
use profile_interstitial::{
	assertion::required_fields_claim,
	auth::SessionId,
	config::InterstitialConfig,
	flows::Interstitial,
	store::{
		CompareAndSwapOutcome, MemoryStore, SessionRecord, SessionStore, StoreFuture,
	},
	submission::{FormSubmission, PresentRequest},
};

pub const ISSUER: &str = "https://rules.example.com";
pub const AUDIENCE: &str = "profile-interstitial";
pub const SECRET: &str = "shared-hs256-secret-for-tests";
pub const DOMAIN: &str = "tenant.auth0.com";

pub fn config() -> InterstitialConfig {
	InterstitialConfig::builder()
		.token_issuer(ISSUER)
		.token_audience(AUDIENCE)
		.token_secret(SECRET)
		.auth0_domain(DOMAIN)
		.build()
		.expect("Interstitial config fixture should build.")
}

pub fn interstitial() -> (Interstitial, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());

	(Interstitial::new(config(), store.clone()), store)
}

/// Session store that yields to the scheduler before every operation, so concurrent legs
/// interleave between their store calls.
#[derive(Debug, Default)]
pub struct YieldingStore(pub MemoryStore);
impl SessionStore for YieldingStore {
	fn get<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionRecord>> {
		Box::pin(async move {
			tokio::task::yield_now().await;

			self.0.get(id).await
		})
	}

	fn set<'a>(&'a self, id: &'a SessionId, record: SessionRecord) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			tokio::task::yield_now().await;

			self.0.set(id, record).await
		})
	}

	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<SessionRecord>> {
		Box::pin(async move {
			tokio::task::yield_now().await;

			self.0.delete(id).await
		})
	}

	fn compare_and_swap<'a>(
		&'a self,
		id: &'a SessionId,
		expected: &'a SessionRecord,
		replacement: SessionRecord,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async move {
			tokio::task::yield_now().await;

			self.0.compare_and_swap(id, expected, replacement).await
		})
	}
}

pub fn yielding_interstitial() -> (Interstitial, Arc<YieldingStore>) {
	let store = Arc::new(YieldingStore::default());

	(Interstitial::new(config(), store.clone()), store)
}

pub fn session() -> SessionId {
	SessionId::generate()
}

pub fn claims(subject: &str, fields: &[&str]) -> Value {
	let mut claims = json!({
		"sub": subject,
		"iss": ISSUER,
		"aud": AUDIENCE,
		"exp": (OffsetDateTime::now_utc() + Duration::minutes(5)).unix_timestamp(),
	});

	claims[required_fields_claim(ISSUER)] = json!(fields);

	claims
}

pub fn sign(claims: &Value, secret: &str) -> String {
	jsonwebtoken::encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
		.expect("Assertion fixture should encode.")
}

pub fn mint(subject: &str, fields: &[&str]) -> String {
	sign(&claims(subject, fields), SECRET)
}

pub fn present_request(token: &str, state: &str) -> PresentRequest {
	PresentRequest::new(token, state, "/")
}

/// Pulls the anti-forgery token out of a rendered form.
pub fn forgery_token(html: &str) -> String {
	let marker = r#"name="_csrf" value=""#;
	let start = html.find(marker).expect("Form should carry an anti-forgery field.") + marker.len();
	let end = html[start..].find('"').expect("Anti-forgery value should be quoted.");

	html[start..start + end].to_owned()
}

pub fn form(pairs: &[(&str, &str)]) -> FormSubmission {
	FormSubmission::from_pairs(pairs.iter().copied()).expect("Form fixture should be valid.")
}

pub fn form_with_token(token: &str, pairs: &[(&str, &str)]) -> FormSubmission {
	let mut all = vec![("_csrf", token)];

	all.extend_from_slice(pairs);

	form(&all)
}

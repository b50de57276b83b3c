//! Anti-forgery tokens for the submit leg.
//!
//! Each session carries a random secret plus the salt of the most recently issued token.
//! A token is `{salt}-{mac}` where `mac` is the base64url (no padding) HMAC-SHA256 of the
//! salt under the session secret. Issuing a token rotates the salt, so only the form that
//! was rendered last can be submitted. Tokens are compared in constant time.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha2::Sha256;
use subtle::ConstantTimeEq;
// self
use crate::{
	_prelude::*,
	auth::{Secret, SessionId},
	error::ConfigError,
	store::{CompareAndSwapOutcome, SessionStore},
};

type HmacSha256 = Hmac<Sha256>;

/// Form field carrying the anti-forgery token.
pub const FORGERY_FIELD: &str = "_csrf";

const SECRET_LEN: usize = 32;
const SALT_LEN: usize = 16;
const SEPARATOR: char = '-';
const REISSUE_ATTEMPTS: usize = 4;

/// Reasons a submitted anti-forgery token is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum ForgeryError {
	/// The submission carried no token.
	#[error("Anti-forgery token is missing.")]
	Missing,
	/// The token is not in `{salt}-{mac}` form.
	#[error("Anti-forgery token is malformed.")]
	Malformed,
	/// The token was not issued for this session's latest form.
	#[error("Anti-forgery token does not match the session.")]
	Mismatch,
}
impl ForgeryError {
	/// Static label suitable for log fields.
	pub const fn label(self) -> &'static str {
		match self {
			ForgeryError::Missing => "forgery_missing",
			ForgeryError::Malformed => "forgery_malformed",
			ForgeryError::Mismatch => "forgery_mismatch",
		}
	}
}

/// Per-session anti-forgery state persisted inside the session record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgeryBinding {
	/// Session secret keying the MAC.
	pub secret: Secret,
	/// Salt of the most recently issued token.
	pub salt: Option<String>,
}
impl ForgeryBinding {
	/// Generates a binding with a fresh random secret.
	pub fn generate() -> Self {
		let mut bytes = [0_u8; SECRET_LEN];

		rand::rng().fill(&mut bytes);

		Self { secret: Secret::new(URL_SAFE_NO_PAD.encode(bytes)), salt: None }
	}

	/// Rotates the salt and returns the matching token.
	pub fn issue(&mut self) -> Result<String, ConfigError> {
		let salt = random_salt();
		let mac = sign(&self.secret, &salt).ok_or(ConfigError::ForgeryKey)?;
		let token = format!("{salt}{SEPARATOR}{mac}");

		self.salt = Some(salt);

		Ok(token)
	}

	/// Checks `token` against the secret and the latest issued salt.
	pub fn verify(&self, token: Option<&str>) -> Result<(), ForgeryError> {
		let token = token.filter(|t| !t.is_empty()).ok_or(ForgeryError::Missing)?;
		let (salt, mac) = token.split_once(SEPARATOR).ok_or(ForgeryError::Malformed)?;

		if salt.len() != SALT_LEN || mac.is_empty() {
			return Err(ForgeryError::Malformed);
		}

		let expected_salt = self.salt.as_deref().ok_or(ForgeryError::Mismatch)?;
		let expected_mac = sign(&self.secret, salt).ok_or(ForgeryError::Mismatch)?;
		let salt_ok = salt.as_bytes().ct_eq(expected_salt.as_bytes());
		let mac_ok = mac.as_bytes().ct_eq(expected_mac.as_bytes());

		if bool::from(salt_ok & mac_ok) { Ok(()) } else { Err(ForgeryError::Mismatch) }
	}
}

/// Issues and verifies anti-forgery tokens through a session store.
#[derive(Clone)]
pub struct ForgeryGuard {
	store: Arc<dyn SessionStore>,
}
impl ForgeryGuard {
	/// Wraps a session store.
	pub fn new(store: Arc<dyn SessionStore>) -> Self {
		Self { store }
	}

	/// Issues a token for the next rendered form of `session`.
	///
	/// Creates the session secret on first use; earlier tokens stop verifying.
	pub async fn issue_token(&self, session: &SessionId) -> Result<String> {
		let mut record = self.store.get(session).await?.unwrap_or_default();
		let binding = record.forgery.get_or_insert_with(ForgeryBinding::generate);
		let token = binding.issue()?;

		self.store.set(session, record).await?;

		Ok(token)
	}

	/// Issues a token for a re-rendered form of a session with a live transaction.
	///
	/// Unlike [`ForgeryGuard::issue_token`] this never creates a record. The rotation is a
	/// compare-and-swap, so a transaction consumed concurrently is never written back and the
	/// call fails with [`Error::StaleTransaction`].
	pub async fn reissue_token(&self, session: &SessionId) -> Result<String> {
		for _ in 0..REISSUE_ATTEMPTS {
			let current = self
				.store
				.get(session)
				.await?
				.filter(|record| record.transaction.is_some())
				.ok_or(Error::StaleTransaction)?;
			let mut record = current.clone();
			let token = record.forgery.get_or_insert_with(ForgeryBinding::generate).issue()?;

			match self.store.compare_and_swap(session, &current, record).await? {
				CompareAndSwapOutcome::Updated => return Ok(token),
				CompareAndSwapOutcome::Missing => return Err(Error::StaleTransaction),
				CompareAndSwapOutcome::Mismatch => continue,
			}
		}

		Err(Error::StaleTransaction)
	}

	/// Verifies a submitted token against the session's latest issued form.
	///
	/// A session without any record fails with [`Error::StaleTransaction`]: there is no form
	/// left that the token could belong to.
	pub async fn verify_token(&self, session: &SessionId, submitted: Option<&str>) -> Result<()> {
		let record = self.store.get(session).await?.ok_or(Error::StaleTransaction)?;

		match record.forgery {
			Some(binding) => binding.verify(submitted).map_err(Error::from),
			None if submitted.is_none_or(str::is_empty) => Err(ForgeryError::Missing.into()),
			None => Err(ForgeryError::Mismatch.into()),
		}
	}
}
impl Debug for ForgeryGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ForgeryGuard(..)")
	}
}

fn random_salt() -> String {
	rand::rng().sample_iter(Alphanumeric).take(SALT_LEN).map(char::from).collect()
}

fn sign(secret: &Secret, salt: &str) -> Option<String> {
	let mut mac = HmacSha256::new_from_slice(secret.expose().as_bytes()).ok()?;

	mac.update(salt.as_bytes());

	Some(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

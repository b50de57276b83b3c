//! Verification of the signed hand-off token the identity provider attaches to the redirect.
//!
//! The provider's rule signs a short-lived JWT with a shared secret (`HS256`, `HS384`, or
//! `HS512`) carrying the user's `sub` and a namespaced claim
//! `{issuer}/claims/required_fields` listing the profile fields still missing. The
//! [`AssertionVerifier`] checks the signature, expiry, issuer, and audience before any
//! other part of the interstitial sees the token. Downstream code only ever receives the
//! typed [`SubjectId`] and [`RequiredFields`]; the raw claim map stays on the
//! [`Assertion`] and never enters the session.

pub mod required;

pub use required::*;

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{Secret, SubjectId},
	config::InterstitialConfig,
};

const REQUIRED_FIELDS_CLAIM_SUFFIX: &str = "/claims/required_fields";

/// Reasons an inbound assertion is refused.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AssertionError {
	/// Signature does not verify against the shared secret, or the algorithm is not allowed.
	#[error("Assertion signature is invalid.")]
	InvalidSignature,
	/// Token is outside its validity window.
	#[error("Assertion has expired.")]
	Expired,
	/// `iss` does not match the configured issuer.
	#[error("Assertion issuer does not match.")]
	IssuerMismatch,
	/// `aud` does not contain the configured audience.
	#[error("Assertion audience does not match.")]
	AudienceMismatch,
	/// Token or its claims could not be decoded into the expected shape.
	#[error("Assertion is malformed: {reason}.")]
	Malformed {
		/// Which part of the token was unusable.
		reason: String,
	},
}
impl AssertionError {
	/// Static label suitable for log fields.
	pub const fn label(&self) -> &'static str {
		match self {
			AssertionError::InvalidSignature => "invalid_signature",
			AssertionError::Expired => "expired",
			AssertionError::IssuerMismatch => "issuer_mismatch",
			AssertionError::AudienceMismatch => "audience_mismatch",
			AssertionError::Malformed { .. } => "malformed",
		}
	}

	fn malformed(reason: impl Into<String>) -> Self {
		Self::Malformed { reason: reason.into() }
	}
}
impl From<jsonwebtoken::errors::Error> for AssertionError {
	fn from(e: jsonwebtoken::errors::Error) -> Self {
		match e.kind() {
			ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm =>
				AssertionError::InvalidSignature,
			ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => AssertionError::Expired,
			ErrorKind::InvalidIssuer => AssertionError::IssuerMismatch,
			ErrorKind::InvalidAudience => AssertionError::AudienceMismatch,
			ErrorKind::MissingRequiredClaim(claim) =>
				AssertionError::malformed(format!("claim `{claim}` is missing")),
			_ => AssertionError::malformed("token could not be decoded"),
		}
	}
}

/// Verified contents of an inbound assertion.
#[derive(Clone, Debug)]
pub struct Assertion {
	/// Stable user identifier from `sub`.
	pub subject: SubjectId,
	/// Profile fields the provider still needs, in display order.
	pub required_fields: RequiredFields,
	raw_claims: Map<String, Value>,
}
impl Assertion {
	/// Looks up an arbitrary verified claim.
	pub fn claim(&self, name: &str) -> Option<&Value> {
		self.raw_claims.get(name)
	}

	/// Splits the assertion into the only parts allowed past the verifier boundary.
	pub fn into_parts(self) -> (SubjectId, RequiredFields) {
		(self.subject, self.required_fields)
	}
}

/// Verifies provider assertions against a fixed issuer, audience, and shared secret.
#[derive(Clone)]
pub struct AssertionVerifier {
	issuer: String,
	required_fields_claim: String,
	key: DecodingKey,
	validation: Validation,
}
impl AssertionVerifier {
	/// Creates a verifier for the provided issuer/audience pair.
	pub fn new(issuer: impl Into<String>, audience: impl AsRef<str>, secret: &Secret) -> Self {
		let issuer = issuer.into();
		let mut validation = Validation::new(Algorithm::HS256);

		validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
		validation.set_issuer(&[issuer.as_str()]);
		validation.set_audience(&[audience.as_ref()]);
		validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

		Self {
			required_fields_claim: required_fields_claim(&issuer),
			issuer,
			key: DecodingKey::from_secret(secret.expose().as_bytes()),
			validation,
		}
	}

	/// Creates a verifier from the interstitial configuration.
	pub fn from_config(config: &InterstitialConfig) -> Self {
		Self::new(&config.token_issuer, &config.token_audience, &config.token_secret)
	}

	/// Name of the namespaced claim carrying the required field list.
	pub fn required_fields_claim(&self) -> &str {
		&self.required_fields_claim
	}

	/// Verifies `token` and extracts the subject and required fields.
	///
	/// `sub` is passed through verbatim; only an empty or non-string subject is malformed.
	pub fn verify(&self, token: &str) -> Result<Assertion, AssertionError> {
		if token.is_empty() {
			return Err(AssertionError::malformed("token is empty"));
		}

		let data = jsonwebtoken::decode::<Map<String, Value>>(token, &self.key, &self.validation)?;
		let raw_claims = data.claims;
		let subject = raw_claims
			.get("sub")
			.and_then(Value::as_str)
			.ok_or_else(|| AssertionError::malformed("claim `sub` must be a string"))?;
		let subject = SubjectId::new(subject)
			.map_err(|e| AssertionError::malformed(format!("claim `sub` is invalid: {e}")))?;
		let required_fields = self.extract_required_fields(&raw_claims)?;

		Ok(Assertion { subject, required_fields, raw_claims })
	}

	fn extract_required_fields(
		&self,
		claims: &Map<String, Value>,
	) -> Result<RequiredFields, AssertionError> {
		let raw = claims.get(&self.required_fields_claim).cloned().ok_or_else(|| {
			AssertionError::malformed(format!("claim `{}` is missing", self.required_fields_claim))
		})?;
		let names: Vec<String> = serde_path_to_error::deserialize(raw).map_err(|e| {
			AssertionError::malformed(format!(
				"claim `{}` is not a list of strings at `{}`",
				self.required_fields_claim,
				e.path()
			))
		})?;

		RequiredFields::new(names).map_err(|e| AssertionError::malformed(e.to_string()))
	}
}
impl Debug for AssertionVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AssertionVerifier")
			.field("issuer", &self.issuer)
			.field("audience", &self.validation.aud)
			.field("algorithms", &self.validation.algorithms)
			.field("key", &"<redacted>")
			.finish()
	}
}

/// One-shot verification with explicit parameters.
pub fn verify(
	token: &str,
	issuer: &str,
	audience: &str,
	secret: &Secret,
) -> Result<Assertion, AssertionError> {
	AssertionVerifier::new(issuer, audience, secret).verify(token)
}

/// Builds the namespaced claim name for `issuer`.
pub fn required_fields_claim(issuer: &str) -> String {
	format!("{issuer}{REQUIRED_FIELDS_CLAIM_SUFFIX}")
}

#[cfg(test)]
mod tests {
	// crates.io
	use jsonwebtoken::{EncodingKey, Header};
	use serde_json::json;
	// self
	use super::*;

	const ISSUER: &str = "https://rules.example.com";
	const AUDIENCE: &str = "profile-interstitial";
	const SECRET: &str = "rule-shared-secret";

	fn mint(claims: Value, secret: &str, alg: Algorithm) -> String {
		let key = EncodingKey::from_secret(secret.as_bytes());

		jsonwebtoken::encode(&Header::new(alg), &claims, &key)
			.expect("Test assertion should encode.")
	}

	fn claims(fields: Value) -> Value {
		let exp = OffsetDateTime::now_utc().unix_timestamp() + 300;
		let mut claims = json!({ "sub": "auth0|123", "iss": ISSUER, "aud": AUDIENCE, "exp": exp });

		claims[required_fields_claim(ISSUER)] = fields;

		claims
	}

	fn verifier() -> AssertionVerifier {
		AssertionVerifier::new(ISSUER, AUDIENCE, &Secret::new(SECRET))
	}

	#[test]
	fn verifies_and_extracts_ordered_fields() {
		let token = mint(claims(json!(["title", "company"])), SECRET, Algorithm::HS256);
		let assertion = verifier().verify(&token).expect("Valid assertion should verify.");

		assert_eq!(assertion.subject.as_str(), "auth0|123");
		assert_eq!(
			assertion.required_fields,
			RequiredFields::new(["title", "company"]).expect("Fixture fields should be valid.")
		);
		assert_eq!(assertion.claim("iss"), Some(&json!(ISSUER)));
	}

	#[test]
	fn subject_is_passed_through_verbatim() {
		let long = format!("samlp|{}", "x".repeat(400));

		for subject in ["Jane Doe", long.as_str()] {
			let mut payload = claims(json!(["title"]));

			payload["sub"] = json!(subject);

			let assertion = verifier()
				.verify(&mint(payload, SECRET, Algorithm::HS256))
				.expect("Any non-empty subject should verify.");

			assert_eq!(assertion.subject.as_str(), subject);
		}

		let mut payload = claims(json!(["title"]));

		payload["sub"] = json!("");

		assert!(matches!(
			verifier().verify(&mint(payload, SECRET, Algorithm::HS256)),
			Err(AssertionError::Malformed { .. })
		));
	}

	#[test]
	fn accepts_other_hmac_algorithms() {
		let token = mint(claims(json!(["title"])), SECRET, Algorithm::HS512);

		assert!(verifier().verify(&token).is_ok());
	}

	#[test]
	fn rejects_wrong_secret() {
		let token = mint(claims(json!(["title"])), "not-the-secret", Algorithm::HS256);

		assert_eq!(verifier().verify(&token).unwrap_err(), AssertionError::InvalidSignature);
	}

	#[test]
	fn rejects_issuer_and_audience_mismatch() {
		let mut wrong_iss = claims(json!(["title"]));

		wrong_iss["iss"] = json!("https://evil.example.com");

		let token = mint(wrong_iss, SECRET, Algorithm::HS256);

		assert_eq!(verifier().verify(&token).unwrap_err(), AssertionError::IssuerMismatch);

		let mut wrong_aud = claims(json!(["title"]));

		wrong_aud["aud"] = json!("someone-else");

		let token = mint(wrong_aud, SECRET, Algorithm::HS256);

		assert_eq!(verifier().verify(&token).unwrap_err(), AssertionError::AudienceMismatch);
	}

	#[test]
	fn rejects_expired_tokens() {
		let mut expired = claims(json!(["title"]));

		expired["exp"] = json!(OffsetDateTime::now_utc().unix_timestamp() - 3_600);

		let token = mint(expired, SECRET, Algorithm::HS256);

		assert_eq!(verifier().verify(&token).unwrap_err(), AssertionError::Expired);
	}

	#[test]
	fn rejects_malformed_input() {
		assert!(matches!(verifier().verify(""), Err(AssertionError::Malformed { .. })));
		assert!(matches!(verifier().verify("not-a-jwt"), Err(AssertionError::Malformed { .. })));

		let mut missing = claims(json!(["title"]));

		if let Some(map) = missing.as_object_mut() {
			map.remove(&required_fields_claim(ISSUER));
		}

		let token = mint(missing, SECRET, Algorithm::HS256);

		assert!(matches!(verifier().verify(&token), Err(AssertionError::Malformed { .. })));

		let token = mint(claims(json!(["title", 7])), SECRET, Algorithm::HS256);
		let err = verifier().verify(&token).expect_err("Non-string entries must fail.");

		assert!(err.to_string().contains("[1]"), "Path should point at the bad entry: {err}");

		let token = mint(claims(json!(["title", "title"])), SECRET, Algorithm::HS256);

		assert!(matches!(verifier().verify(&token), Err(AssertionError::Malformed { .. })));
	}

	#[test]
	fn debug_output_redacts_key() {
		let rendered = format!("{:?}", verifier());

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains(SECRET));
	}
}

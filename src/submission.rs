//! Decoding of the inbound GET query and POST body.

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, forgery::FORGERY_FIELD};

const TOKEN_PARAM: &str = "token";
const STATE_PARAM: &str = "state";

/// Failures raised while decoding a request.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SubmissionError {
	/// The same key appeared more than once.
	#[error("Field `{field}` was submitted more than once.")]
	DuplicateField {
		/// Repeated key.
		field: String,
	},
}

/// Inputs of the GET leg.
#[derive(Clone, PartialEq, Eq)]
pub struct PresentRequest {
	/// Signed assertion from the `token` query parameter.
	pub token: Option<String>,
	/// Continuation marker from the `state` query parameter.
	pub state: Option<String>,
	/// Path the rendered form posts back to.
	pub action: String,
}
impl PresentRequest {
	/// Creates a request from already-decoded parts.
	pub fn new(token: impl Into<String>, state: impl Into<String>, action: impl Into<String>) -> Self {
		Self { token: Some(token.into()), state: Some(state.into()), action: action.into() }
	}

	/// Decodes the raw query string (without the leading `?`).
	///
	/// `action` is the request path without its query, so the form re-posts to the same route.
	pub fn from_query(query: &str, action: impl Into<String>) -> Result<Self, SubmissionError> {
		let mut token = None;
		let mut state = None;

		for (key, value) in form_urlencoded::parse(query.as_bytes()) {
			let slot = match &*key {
				TOKEN_PARAM => &mut token,
				STATE_PARAM => &mut state,
				_ => continue,
			};

			if slot.replace(value.into_owned()).is_some() {
				return Err(SubmissionError::DuplicateField { field: key.into_owned() });
			}
		}

		Ok(Self { token, state, action: action.into() })
	}
}
impl Debug for PresentRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PresentRequest")
			.field("token", &self.token.as_ref().map(|_| "<redacted>"))
			.field("state", &self.state)
			.field("action", &self.action)
			.finish()
	}
}

/// Decoded `application/x-www-form-urlencoded` body of the POST leg.
///
/// Keys are unique and keep their submission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormSubmission {
	pairs: Vec<(String, String)>,
}
impl FormSubmission {
	/// Decodes a raw request body.
	pub fn parse(body: &[u8]) -> Result<Self, SubmissionError> {
		Self::from_pairs(form_urlencoded::parse(body))
	}

	/// Builds a submission from key/value pairs, rejecting repeated keys.
	pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, SubmissionError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut submission = Self::default();

		for (key, value) in pairs {
			let key = key.into();

			if submission.get(&key).is_some() {
				return Err(SubmissionError::DuplicateField { field: key });
			}

			submission.pairs.push((key, value.into()));
		}

		Ok(submission)
	}

	/// Value submitted under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Anti-forgery token carried in the `_csrf` field.
	pub fn forgery_token(&self) -> Option<&str> {
		self.get(FORGERY_FIELD)
	}

	/// Every submitted pair except the anti-forgery token, in submission order.
	pub fn payload(&self) -> Vec<(&str, &str)> {
		self.iter().filter(|(key, _)| *key != FORGERY_FIELD).collect()
	}

	/// Iterator over all submitted pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Number of submitted pairs.
	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	/// Returns `true` if nothing was submitted.
	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_decodes_and_keeps_order() {
		let body = b"_csrf=abc-def&title=Dev+Lead&company=Acme%20%26%20Co&email_opt_in=yes";
		let submission = FormSubmission::parse(body).expect("Body should decode.");

		assert_eq!(submission.len(), 4);
		assert_eq!(submission.get("title"), Some("Dev Lead"));
		assert_eq!(submission.get("company"), Some("Acme & Co"));
		assert_eq!(submission.forgery_token(), Some("abc-def"));
		assert_eq!(
			submission.payload(),
			[("title", "Dev Lead"), ("company", "Acme & Co"), ("email_opt_in", "yes")]
		);
	}

	#[test]
	fn duplicate_keys_are_rejected() {
		let err = FormSubmission::parse(b"title=a&title=b").expect_err("Duplicates must fail.");

		assert_eq!(err, SubmissionError::DuplicateField { field: "title".into() });
	}

	#[test]
	fn empty_values_are_kept() {
		let submission = FormSubmission::parse(b"company=&title").expect("Body should decode.");

		assert_eq!(submission.get("company"), Some(""));
		assert_eq!(submission.get("title"), Some(""));
		assert_eq!(submission.get("missing"), None);
	}

	#[test]
	fn query_extracts_token_and_state() {
		let request = PresentRequest::from_query("token=a.b.c&state=xyz%3D&utm=1", "/profile")
			.expect("Query should decode.");

		assert_eq!(request.token.as_deref(), Some("a.b.c"));
		assert_eq!(request.state.as_deref(), Some("xyz="));
		assert_eq!(request.action, "/profile");
		assert!(!format!("{request:?}").contains("a.b.c"));

		let request = PresentRequest::from_query("", "/").expect("Empty query should decode.");

		assert!(request.token.is_none() && request.state.is_none());
		assert!(PresentRequest::from_query("state=a&state=b", "/").is_err());
	}
}

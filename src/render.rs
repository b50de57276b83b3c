//! Pure HTML renderers for the profile form and the continuation bridge.
//!
//! Both renderers are deterministic: the same view always yields the same document. Every
//! interpolated value is HTML-escaped, whether it came from the assertion, the session, or
//! the submitted body.

mod bridge;
mod form;

pub use bridge::*;
pub use form::*;

// std
use std::borrow::Cow;
// self
use crate::{
	_prelude::*,
	assertion::RequiredFields,
	auth::FieldName,
	fields::ValidityReport,
	submission::FormSubmission,
};

/// Content type of every rendered page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Per-field render state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldState<'a> {
	/// Previously submitted value to echo back.
	pub value: Option<&'a str>,
	/// Whether the field failed validation.
	pub invalid: bool,
}

/// Inputs of [`render_form`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormView<'a> {
	/// Subject greeted at the top of the page.
	pub subject: &'a str,
	/// Anti-forgery token embedded as a hidden field.
	pub forgery_token: &'a str,
	/// Form action; empty re-posts to the current URL.
	pub action: &'a str,
	/// Fields to render, in display order.
	pub fields: Vec<(&'a FieldName, FieldState<'a>)>,
}
impl<'a> FormView<'a> {
	/// View for the first presentation: every field empty and valid.
	pub fn fresh(
		subject: &'a str,
		forgery_token: &'a str,
		action: &'a str,
		required: &'a RequiredFields,
	) -> Self {
		let fields = required.iter().map(|name| (name, FieldState::default())).collect();

		Self { subject, forgery_token, action, fields }
	}

	/// View for a re-render after failed validation; posts back to the same URL.
	pub fn with_errors(
		subject: &'a str,
		forgery_token: &'a str,
		required: &'a RequiredFields,
		submission: &'a FormSubmission,
		report: &ValidityReport,
	) -> Self {
		let fields = required
			.iter()
			.map(|name| {
				let state =
					FieldState { value: submission.get(name), invalid: report.is_invalid(name) };

				(name, state)
			})
			.collect();

		Self { subject, forgery_token, action: "", fields }
	}
}

/// Inputs of [`render_bridge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeView<'a> {
	/// Continuation endpoint, marker included.
	pub action: &'a Url,
	/// Collected values forwarded as hidden inputs.
	pub payload: Vec<(&'a str, &'a str)>,
}

fn attr(value: &str) -> Cow<'_, str> {
	html_escape::encode_double_quoted_attribute(value)
}

fn text(value: &str) -> Cow<'_, str> {
	html_escape::encode_text(value)
}

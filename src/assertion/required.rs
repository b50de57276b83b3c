//! Ordered, duplicate-free list of profile fields the provider still needs.

// std
use std::slice::Iter;
// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::{
	_prelude::*,
	auth::{FieldName, IdentifierError},
};

/// Errors emitted when validating a required-field list.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RequiredFieldsError {
	/// An entry is not a valid field name.
	#[error("Required field at position {index} is invalid.")]
	InvalidName {
		/// Zero-based position in the claim.
		index: usize,
		/// Identifier validation failure.
		#[source]
		source: IdentifierError,
	},
	/// A field name appears more than once.
	#[error("Required field `{field}` is listed more than once.")]
	Duplicate {
		/// The repeated field name.
		field: String,
	},
}

/// Required profile fields in the order the form should display them.
///
/// Unlike a set, the order is significant and preserved exactly as the provider sent it.
/// Duplicates are rejected instead of collapsed so a malformed claim never renders one
/// control for two entries.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequiredFields(Vec<FieldName>);
impl RequiredFields {
	/// Builds a list from any iterator of raw names.
	pub fn new<I, S>(fields: I) -> Result<Self, RequiredFieldsError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut seen = BTreeSet::new();
		let mut names = Vec::new();

		for (index, raw) in fields.into_iter().enumerate() {
			let name = FieldName::new(raw.as_ref())
				.map_err(|source| RequiredFieldsError::InvalidName { index, source })?;

			if !seen.insert(name.clone()) {
				return Err(RequiredFieldsError::Duplicate { field: name.into() });
			}

			names.push(name);
		}

		Ok(Self(names))
	}

	/// Number of required fields.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if the provider requires nothing.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if `field` is required.
	pub fn contains(&self, field: &str) -> bool {
		self.0.iter().any(|name| name.as_str() == field)
	}

	/// Iterator over field names in display order.
	pub fn iter(&self) -> Iter<'_, FieldName> {
		self.0.iter()
	}

	/// Returns the underlying ordered slice.
	pub fn as_slice(&self) -> &[FieldName] {
		&self.0
	}
}
impl Debug for RequiredFields {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_list().entries(self.0.iter().map(FieldName::as_str)).finish()
	}
}
impl<'a> IntoIterator for &'a RequiredFields {
	type IntoIter = Iter<'a, FieldName>;
	type Item = &'a FieldName;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
impl TryFrom<Vec<String>> for RequiredFields {
	type Error = RequiredFieldsError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl<'de> Deserialize<'de> for RequiredFields {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		RequiredFields::new(values).map_err(DeError::custom)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn order_is_preserved() {
		let fields = RequiredFields::new(["title", "company", "email_opt_in"])
			.expect("Fixture fields should be valid.");
		let names = fields.iter().map(FieldName::as_str).collect::<Vec<_>>();

		assert_eq!(names, ["title", "company", "email_opt_in"]);
		assert!(fields.contains("company"));
		assert!(!fields.contains("nickname"));
	}

	#[test]
	fn duplicates_and_blank_names_are_rejected() {
		let err = RequiredFields::new(["title", "title"]).expect_err("Duplicates must fail.");

		assert_eq!(err, RequiredFieldsError::Duplicate { field: "title".into() });

		let err = RequiredFields::new(["title", ""]).expect_err("Blank names must fail.");

		assert!(matches!(err, RequiredFieldsError::InvalidName { index: 1, .. }));
	}

	#[test]
	fn serde_round_trip_keeps_order() {
		let fields: RequiredFields = serde_json::from_str(r#"["email_opt_in","title"]"#)
			.expect("Required fields should deserialize.");
		let payload = serde_json::to_string(&fields).expect("Required fields should serialize.");

		assert_eq!(payload, r#"["email_opt_in","title"]"#);
		assert!(serde_json::from_str::<RequiredFields>(r#"["a","a"]"#).is_err());
	}
}

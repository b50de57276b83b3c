//! Field registry: how each profile field is validated and presented.
//!
//! The registry is the single source of truth for the fields the interstitial knows how to
//! collect. Validation and rendering both resolve fields through it, and a required field
//! that is not registered fails closed with [`ConfigError::UnregisteredField`] instead of
//! slipping through unvalidated.

pub mod predicate;

pub use predicate::*;

// self
use crate::{
	_prelude::*,
	assertion::RequiredFields,
	auth::FieldName,
	error::ConfigError,
	submission::FormSubmission,
};

/// One `<option>` of a select control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceOption {
	/// Submitted value.
	pub value: String,
	/// Visible label.
	pub label: String,
}
impl ChoiceOption {
	/// Creates an option.
	pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
		Self { value: value.into(), label: label.into() }
	}
}

/// Input control used to render a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Control {
	/// Single-line text input.
	Text {
		/// Placeholder hint.
		placeholder: String,
	},
	/// Drop-down select.
	Select {
		/// Options in display order.
		options: Vec<ChoiceOption>,
	},
}

/// Validation and presentation for one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
	/// Label shown next to the control.
	pub label: String,
	/// Control used to render the field.
	pub control: Control,
	/// Check applied to the submitted value.
	pub predicate: Predicate,
}
impl FieldSpec {
	/// Free-text field that must not be blank.
	pub fn text(label: impl Into<String>, placeholder: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			control: Control::Text { placeholder: placeholder.into() },
			predicate: Predicate::NonBlank,
		}
	}

	/// Select field whose value must be one of the option values.
	pub fn select<I>(label: impl Into<String>, options: I) -> Self
	where
		I: IntoIterator<Item = ChoiceOption>,
	{
		let options = options.into_iter().collect::<Vec<_>>();
		let predicate = Predicate::one_of(options.iter().map(|option| option.value.clone()));

		Self { label: label.into(), control: Control::Select { options }, predicate }
	}
}

/// Names of the fields that failed validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidityReport {
	invalid: BTreeSet<FieldName>,
}
impl ValidityReport {
	/// Returns `true` if every required field passed.
	pub fn is_valid(&self) -> bool {
		self.invalid.is_empty()
	}

	/// Returns `true` if `field` failed validation.
	pub fn is_invalid(&self, field: &str) -> bool {
		self.invalid.contains(field)
	}

	/// Iterator over the invalid field names.
	pub fn invalid_fields(&self) -> impl Iterator<Item = &FieldName> {
		self.invalid.iter()
	}

	/// Number of invalid fields.
	pub fn len(&self) -> usize {
		self.invalid.len()
	}

	/// Returns `true` if no field failed; alias of [`ValidityReport::is_valid`].
	pub fn is_empty(&self) -> bool {
		self.invalid.is_empty()
	}
}

/// Registry mapping field names to their [`FieldSpec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRegistry {
	specs: HashMap<FieldName, FieldSpec>,
}
impl FieldRegistry {
	/// Creates an empty registry.
	pub fn empty() -> Self {
		Self { specs: HashMap::new() }
	}

	/// Registers or replaces the [`FieldSpec`] for `name`.
	pub fn register(mut self, name: FieldName, spec: FieldSpec) -> Self {
		self.specs.insert(name, spec);

		self
	}

	/// Looks up the [`FieldSpec`] for `name`.
	pub fn get(&self, name: &str) -> Option<&FieldSpec> {
		self.specs.get(name)
	}

	/// Looks up the [`FieldSpec`] for `name`, failing closed when it is not registered.
	pub fn require(&self, name: &str) -> Result<&FieldSpec, ConfigError> {
		self.get(name).ok_or_else(|| ConfigError::UnregisteredField { field: name.to_owned() })
	}

	/// Ensures every required field is registered.
	pub fn ensure_covers(&self, fields: &RequiredFields) -> Result<(), ConfigError> {
		fields.iter().try_for_each(|name| self.require(name).map(|_| ()))
	}

	/// Validates the required fields of a submission.
	///
	/// Keys outside `fields` are ignored here; they travel as passthrough payload.
	pub fn validate(
		&self,
		fields: &RequiredFields,
		submission: &FormSubmission,
	) -> Result<ValidityReport, ConfigError> {
		let mut report = ValidityReport::default();

		for name in fields {
			let spec = self.require(name)?;

			if !spec.predicate.accepts(submission.get(name)) {
				report.invalid.insert(name.clone());
			}
		}

		Ok(report)
	}
}
impl Default for FieldRegistry {
	/// Registry with the standard profile fields: `title`, `company`, and `email_opt_in`.
	fn default() -> Self {
		let field = |name: &str| FieldName::new(name).ok();
		let mut registry = Self::empty();
		let defaults = [
			("title", FieldSpec::text("Title:", "Developer")),
			("company", FieldSpec::text("Company:", "Appsembler")),
			(
				"email_opt_in",
				FieldSpec::select(
					"Email Opt In",
					[ChoiceOption::new("yes", "Yes"), ChoiceOption::new("no", "No")],
				),
			),
		];

		for (name, spec) in defaults {
			if let Some(name) = field(name) {
				registry.specs.insert(name, spec);
			}
		}

		registry
	}
}

//! Field predicates.

/// Pure check applied to one submitted value.
///
/// Predicates are total: an absent value is checked as the empty string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
	/// Free text; valid iff the trimmed value is non-empty.
	NonBlank,
	/// Enumerated choice; valid iff the value equals one of the literals exactly.
	OneOf(Vec<String>),
}
impl Predicate {
	/// Builds a [`Predicate::OneOf`] from literals.
	pub fn one_of<I, S>(allowed: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::OneOf(allowed.into_iter().map(Into::into).collect())
	}

	/// Applies the predicate.
	pub fn accepts(&self, value: Option<&str>) -> bool {
		let value = value.unwrap_or_default();

		match self {
			Predicate::NonBlank => !value.trim().is_empty(),
			Predicate::OneOf(allowed) => allowed.iter().any(|candidate| candidate == value),
		}
	}
}

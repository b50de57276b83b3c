//! Optional observability helpers for the interstitial legs.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `profile_interstitial.leg` with the `leg`
//!   (`present` or `submit`) and `stage` (call site) fields, plus a `warn` event carrying a
//!   static reason label whenever a leg is rejected.
//! - Enable `metrics` to increment the `profile_interstitial_leg_total` counter for every
//!   attempt and terminal outcome, labeled by `leg` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// The two request legs of the interstitial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Leg {
	/// GET leg: verify the assertion and present the form.
	Present,
	/// POST leg: check the submission and bridge back to the provider.
	Submit,
}
impl Leg {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Leg::Present => "present",
			Leg::Submit => "submit",
		}
	}
}
impl Display for Leg {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LegOutcome {
	/// Entry to a leg.
	Attempt,
	/// The profile form was rendered, with or without errors.
	FormRendered,
	/// The continuation bridge was emitted.
	BridgeEmitted,
	/// Failure propagated back to the caller.
	Failure,
}
impl LegOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LegOutcome::Attempt => "attempt",
			LegOutcome::FormRendered => "form_rendered",
			LegOutcome::BridgeEmitted => "bridge_emitted",
			LegOutcome::Failure => "failure",
		}
	}
}
impl Display for LegOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Static label describing why a leg was rejected; never carries request data.
pub fn rejection_reason(error: &Error) -> &'static str {
	match error {
		Error::Assertion(err) => err.label(),
		Error::Forgery(err) => err.label(),
		Error::StaleTransaction => "stale_transaction",
		Error::MissingContinuation => "missing_continuation",
		Error::Submission(_) => "submission_malformed",
		Error::Config(_) => "config_fault",
		Error::Storage(_) => "storage_failure",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{assertion::AssertionError, forgery::ForgeryError};

	#[test]
	fn labels_are_stable() {
		assert_eq!(Leg::Submit.to_string(), "submit");
		assert_eq!(LegOutcome::BridgeEmitted.to_string(), "bridge_emitted");
		assert_eq!(rejection_reason(&ForgeryError::Mismatch.into()), "forgery_mismatch");
		assert_eq!(rejection_reason(&Error::StaleTransaction), "stale_transaction");
		assert_eq!(
			rejection_reason(&AssertionError::Malformed { reason: "secret detail".into() }.into()),
			AssertionError::Malformed { reason: String::new() }.label()
		);
	}
}

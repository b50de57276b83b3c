// self
use crate::obs::{Leg, LegOutcome};

/// Records a leg outcome via the global metrics recorder (when enabled).
pub fn record_leg_outcome(leg: Leg, outcome: LegOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"profile_interstitial_leg_total",
			"leg" => leg.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (leg, outcome);
	}
}

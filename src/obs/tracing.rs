// self
use crate::{_prelude::*, obs::Leg};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedLeg<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedLeg<F> = F;

/// A span builder used by the interstitial legs.
#[derive(Clone, Debug)]
pub struct LegSpan {
	leg: Leg,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl LegSpan {
	/// Creates a new span tagged with the provided leg + stage.
	pub fn new(leg: Leg, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("profile_interstitial.leg", leg = leg.as_str(), stage);

			Self { leg, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { leg }
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedLeg<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Emits a `warn` event inside the span with a static rejection reason.
	pub fn warn_rejected(&self, reason: &'static str) {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(|| {
				tracing::warn!(leg = self.leg.as_str(), reason, "interstitial leg rejected");
			});
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (self.leg, reason);
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_passes_output_through() {
		let span = LegSpan::new(Leg::Present, "instrument_passes_output_through");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);

		span.warn_rejected("test_reason");
	}
}

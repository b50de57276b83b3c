//! POST leg: check the submission and either re-present the form or bridge back.

// self
use crate::{
	_prelude::*,
	auth::SessionId,
	flows::{FlowStage, Interstitial, Page},
	obs::{self, Leg, LegOutcome, LegSpan},
	render::{self, BridgeView, FormView},
	submission::FormSubmission,
};

impl Interstitial {
	/// Handles `POST /` with a decoded form body.
	///
	/// The checks run in a fixed order: an active transaction must exist, then the
	/// anti-forgery token must match, and only then are the fields validated. Invalid fields
	/// keep the transaction and re-present the form with a fresh token. Valid fields consume
	/// the transaction atomically. A replayed or racing submission that finds the session
	/// consumed at any of these steps fails as stale, and never writes the session back.
	pub async fn submit(&self, session: &SessionId, submission: FormSubmission) -> Result<Page> {
		const LEG: Leg = Leg::Submit;

		let span = LegSpan::new(LEG, "submit");

		obs::record_leg_outcome(LEG, LegOutcome::Attempt);

		let result: Result<Page> = span
			.instrument(async move {
				let state = self.transactions.require(session).await?;

				self.forgery.verify_token(session, submission.forgery_token()).await?;

				let report = self.registry.validate(&state.required_fields, &submission)?;

				if !report.is_valid() {
					let forgery_token = self.forgery.reissue_token(session).await?;
					let view = FormView::with_errors(
						state.subject.as_str(),
						&forgery_token,
						&state.required_fields,
						&submission,
						&report,
					);
					let html = render::render_form(&self.registry, &view)?;

					return Ok(Page { stage: FlowStage::FormPresentedWithErrors, html });
				}

				let state = self.transactions.take(session).await?;
				let action = self.config.continuation_url(&state.continuation_marker);
				let view = BridgeView { action: &action, payload: submission.payload() };

				Ok(Page { stage: FlowStage::BridgeEmitted, html: render::render_bridge(&view) })
			})
			.await;

		match &result {
			Ok(page) if page.stage == FlowStage::BridgeEmitted =>
				obs::record_leg_outcome(LEG, LegOutcome::BridgeEmitted),
			Ok(_) => obs::record_leg_outcome(LEG, LegOutcome::FormRendered),
			Err(err) => {
				span.warn_rejected(obs::rejection_reason(err));
				obs::record_leg_outcome(LEG, LegOutcome::Failure);
			},
		}

		result
	}
}

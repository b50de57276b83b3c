//! GET leg: verify the hand-off, start the transaction, and present the form.

// self
use crate::{
	_prelude::*,
	auth::SessionId,
	flows::{FlowStage, Interstitial, Page},
	obs::{self, Leg, LegOutcome, LegSpan},
	render::{self, FormView},
	submission::PresentRequest,
};

impl Interstitial {
	/// Handles `GET /?token=..&state=..`.
	///
	/// Nothing is written to the session unless the assertion verifies, every required field
	/// is registered, and the continuation marker is present. A successful call replaces any
	/// earlier transaction of the session and rotates its anti-forgery token.
	pub async fn present(&self, session: &SessionId, request: PresentRequest) -> Result<Page> {
		const LEG: Leg = Leg::Present;

		let span = LegSpan::new(LEG, "present");

		obs::record_leg_outcome(LEG, LegOutcome::Attempt);

		let result: Result<Page> = span
			.instrument(async move {
				let token = request.token.as_deref().unwrap_or_default();
				let (subject, required_fields) = self.verifier.verify(token)?.into_parts();

				self.registry.ensure_covers(&required_fields)?;

				let marker = request.state.ok_or(Error::MissingContinuation)?;
				let state =
					self.transactions.begin(session, subject, required_fields, marker).await?;
				let forgery_token = self.forgery.issue_token(session).await?;
				let view = FormView::fresh(
					state.subject.as_str(),
					&forgery_token,
					&request.action,
					&state.required_fields,
				);
				let html = render::render_form(&self.registry, &view)?;

				Ok(Page { stage: FlowStage::FormPresented, html })
			})
			.await;

		match &result {
			Ok(_) => obs::record_leg_outcome(LEG, LegOutcome::FormRendered),
			Err(err) => {
				span.warn_rejected(obs::rejection_reason(err));
				obs::record_leg_outcome(LEG, LegOutcome::Failure);
			},
		}

		result
	}
}

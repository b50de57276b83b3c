//! Request orchestration for the two legs of the interstitial.
//!
//! [`Interstitial`] owns the verifier, the session facades, and the field registry so the
//! leg implementations in [`present`](Interstitial::present) and
//! [`submit`](Interstitial::submit) only sequence the checks. Each leg returns a [`Page`] on
//! success; every error is terminal and maps to a status via [`Error::status_code`].

mod present;
mod submit;

// self
use crate::{
	_prelude::*,
	assertion::AssertionVerifier,
	config::InterstitialConfig,
	fields::FieldRegistry,
	forgery::ForgeryGuard,
	render::HTML_CONTENT_TYPE,
	store::SessionStore,
	transaction::TransactionStore,
};

/// Where a leg left the session's transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// The form was presented after a verified assertion.
	FormPresented,
	/// The form was re-presented with invalid fields marked.
	FormPresentedWithErrors,
	/// The bridge to the continuation endpoint was emitted; the transaction is gone.
	BridgeEmitted,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::FormPresented => "form_presented",
			FlowStage::FormPresentedWithErrors => "form_presented_with_errors",
			FlowStage::BridgeEmitted => "bridge_emitted",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// HTML document produced by a successful leg.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
	/// Stage reached by the leg.
	pub stage: FlowStage,
	/// Rendered document.
	pub html: String,
}
impl Page {
	/// HTTP status to answer with.
	pub const fn status_code(&self) -> u16 {
		200
	}

	/// `Content-Type` header value.
	pub const fn content_type(&self) -> &'static str {
		HTML_CONTENT_TYPE
	}
}

/// Coordinates the profile-completion legs for one provider configuration.
///
/// Cloning is cheap; all state lives in the shared session store.
#[derive(Clone)]
pub struct Interstitial {
	/// Validated configuration.
	pub config: Arc<InterstitialConfig>,
	verifier: AssertionVerifier,
	transactions: TransactionStore,
	forgery: ForgeryGuard,
	registry: Arc<FieldRegistry>,
}
impl Interstitial {
	/// Creates an interstitial with the default profile field registry.
	pub fn new(config: InterstitialConfig, store: Arc<dyn SessionStore>) -> Self {
		let verifier = AssertionVerifier::from_config(&config);

		Self {
			config: Arc::new(config),
			verifier,
			transactions: TransactionStore::new(store.clone()),
			forgery: ForgeryGuard::new(store),
			registry: Default::default(),
		}
	}

	/// Replaces the field registry.
	pub fn with_registry(mut self, registry: FieldRegistry) -> Self {
		self.registry = Arc::new(registry);

		self
	}

	/// Field registry in use.
	pub fn registry(&self) -> &FieldRegistry {
		&self.registry
	}

	/// Transaction facade over the session store.
	pub fn transactions(&self) -> &TransactionStore {
		&self.transactions
	}
}
impl Debug for Interstitial {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Interstitial")
			.field("config", &self.config)
			.field("verifier", &self.verifier)
			.finish_non_exhaustive()
	}
}

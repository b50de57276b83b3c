//! Explicit configuration for the interstitial.
//!
//! Values come from the process environment (`TOKEN_ISSUER`, `TOKEN_AUDIENCE`,
//! `TOKEN_SECRET`, `AUTH0_DOMAIN`, `PORT`) or from the [`InterstitialConfigBuilder`], and
//! are validated once at load time. The resulting [`InterstitialConfig`] is handed to
//! [`Interstitial::new`](crate::flows::Interstitial::new); nothing reads the environment
//! after that.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Environment variable naming the expected assertion issuer.
pub const ENV_TOKEN_ISSUER: &str = "TOKEN_ISSUER";
/// Environment variable naming the expected assertion audience.
pub const ENV_TOKEN_AUDIENCE: &str = "TOKEN_AUDIENCE";
/// Environment variable holding the shared assertion secret.
pub const ENV_TOKEN_SECRET: &str = "TOKEN_SECRET";
/// Environment variable holding the provider tenant domain.
pub const ENV_AUTH0_DOMAIN: &str = "AUTH0_DOMAIN";
/// Environment variable holding the listen port.
pub const ENV_PORT: &str = "PORT";

const DEFAULT_PORT: u16 = 5000;
const CONTINUE_PATH: &str = "/continue";
const CONTINUATION_PARAM: &str = "state";

/// Validated interstitial configuration.
#[derive(Clone, Debug)]
pub struct InterstitialConfig {
	/// Expected `iss` of inbound assertions; also namespaces the required-fields claim.
	pub token_issuer: String,
	/// Expected `aud` of inbound assertions.
	pub token_audience: String,
	/// Shared secret the provider signs assertions with.
	pub token_secret: Secret,
	/// Provider tenant domain hosting the continuation endpoint.
	pub auth0_domain: String,
	/// Listen port for the surrounding HTTP server.
	pub port: u16,
	/// Absolute session lifetime measured from creation.
	pub session_ttl: Duration,
	continue_endpoint: Url,
}
impl InterstitialConfig {
	/// Default absolute session lifetime.
	pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(24);

	/// Returns a builder for programmatic construction.
	pub fn builder() -> InterstitialConfigBuilder {
		InterstitialConfigBuilder::default()
	}

	/// Loads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads configuration through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let require = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar { name });
		let mut builder = Self::builder()
			.token_issuer(require(ENV_TOKEN_ISSUER)?)
			.token_audience(require(ENV_TOKEN_AUDIENCE)?)
			.token_secret(require(ENV_TOKEN_SECRET)?)
			.auth0_domain(require(ENV_AUTH0_DOMAIN)?);

		if let Some(raw) = lookup(ENV_PORT) {
			let port = raw.trim().parse().map_err(|_| ConfigError::InvalidPort { value: raw })?;

			builder = builder.port(port);
		}

		builder.build()
	}

	/// Provider continuation endpoint without the continuation marker.
	pub fn continue_endpoint(&self) -> &Url {
		&self.continue_endpoint
	}

	/// Builds `https://{domain}/continue?state={marker}` with the marker percent-encoded.
	pub fn continuation_url(&self, marker: &str) -> Url {
		let mut url = self.continue_endpoint.clone();

		url.query_pairs_mut().append_pair(CONTINUATION_PARAM, marker);

		url
	}
}

/// Builder for [`InterstitialConfig`] values.
#[derive(Debug, Default)]
pub struct InterstitialConfigBuilder {
	/// Expected assertion issuer.
	pub token_issuer: Option<String>,
	/// Expected assertion audience.
	pub token_audience: Option<String>,
	/// Shared assertion secret.
	pub token_secret: Option<Secret>,
	/// Provider tenant domain.
	pub auth0_domain: Option<String>,
	/// Listen port; defaults to 5000.
	pub port: Option<u16>,
	/// Session lifetime; defaults to 24 hours.
	pub session_ttl: Option<Duration>,
}
impl InterstitialConfigBuilder {
	/// Sets the expected assertion issuer.
	pub fn token_issuer(mut self, issuer: impl Into<String>) -> Self {
		self.token_issuer = Some(issuer.into());

		self
	}

	/// Sets the expected assertion audience.
	pub fn token_audience(mut self, audience: impl Into<String>) -> Self {
		self.token_audience = Some(audience.into());

		self
	}

	/// Sets the shared assertion secret.
	pub fn token_secret(mut self, secret: impl Into<String>) -> Self {
		self.token_secret = Some(Secret::new(secret));

		self
	}

	/// Sets the provider tenant domain.
	pub fn auth0_domain(mut self, domain: impl Into<String>) -> Self {
		self.auth0_domain = Some(domain.into());

		self
	}

	/// Overrides the listen port.
	pub fn port(mut self, port: u16) -> Self {
		self.port = Some(port);

		self
	}

	/// Overrides the absolute session lifetime.
	pub fn session_ttl(mut self, ttl: Duration) -> Self {
		self.session_ttl = Some(if ttl.is_negative() { Duration::ZERO } else { ttl });

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<InterstitialConfig, ConfigError> {
		let token_issuer = non_empty(ENV_TOKEN_ISSUER, self.token_issuer)?;
		let token_audience = non_empty(ENV_TOKEN_AUDIENCE, self.token_audience)?;
		let token_secret = self
			.token_secret
			.filter(|secret| !secret.is_empty())
			.ok_or(ConfigError::EmptyValue { name: ENV_TOKEN_SECRET })?;
		let auth0_domain = non_empty(ENV_AUTH0_DOMAIN, self.auth0_domain)?;
		let continue_endpoint = build_continue_endpoint(&auth0_domain)?;

		Ok(InterstitialConfig {
			token_issuer,
			token_audience,
			token_secret,
			auth0_domain,
			port: self.port.unwrap_or(DEFAULT_PORT),
			session_ttl: self.session_ttl.unwrap_or(InterstitialConfig::DEFAULT_SESSION_TTL),
			continue_endpoint,
		})
	}
}

fn non_empty(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	match value {
		Some(v) if !v.trim().is_empty() => Ok(v),
		Some(_) => Err(ConfigError::EmptyValue { name }),
		None => Err(ConfigError::MissingVar { name }),
	}
}

fn build_continue_endpoint(domain: &str) -> Result<Url, ConfigError> {
	let invalid = |source| ConfigError::InvalidDomain { domain: domain.to_owned(), source };

	// A bare host only; anything that smuggles a path, query, or credentials is refused.
	if domain.contains(['/', '?', '#', '@']) {
		return Err(invalid(url::ParseError::InvalidDomainCharacter));
	}

	let url = Url::parse(&format!("https://{domain}{CONTINUE_PATH}")).map_err(invalid)?;

	if url.host_str().is_none() {
		return Err(invalid(url::ParseError::EmptyHost));
	}

	Ok(url)
}

//! Coordinator configuration and its validating builder.

// self
use crate::{_prelude::*, error::ConfigError};

/// Validated coordinator settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
	/// Lead time before expiry at which a proactive refresh fires.
	pub refresh_margin: Duration,
	/// Claim key holding the user identifier (often namespaced by the identity provider).
	pub user_id_claim: String,
	/// Upper bound for a single provider fetch; `None` waits indefinitely.
	pub fetch_timeout: Option<std::time::Duration>,
}
impl CoordinatorConfig {
	/// Default refresh margin (one minute before expiry).
	pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::seconds(60);
	/// Default user identifier claim.
	pub const DEFAULT_USER_ID_CLAIM: &'static str = "sub";

	/// Creates a builder seeded with the defaults.
	pub fn builder() -> CoordinatorConfigBuilder {
		CoordinatorConfigBuilder::default()
	}
}
impl Default for CoordinatorConfig {
	fn default() -> Self {
		Self {
			refresh_margin: Self::DEFAULT_REFRESH_MARGIN,
			user_id_claim: Self::DEFAULT_USER_ID_CLAIM.into(),
			fetch_timeout: None,
		}
	}
}

/// Builder for [`CoordinatorConfig`] values.
#[derive(Debug, Default)]
pub struct CoordinatorConfigBuilder {
	config: CoordinatorConfig,
}
impl CoordinatorConfigBuilder {
	/// Overrides the refresh margin.
	pub fn refresh_margin(mut self, margin: Duration) -> Self {
		self.config.refresh_margin = margin;

		self
	}

	/// Overrides the user identifier claim key.
	pub fn user_id_claim(mut self, claim: impl Into<String>) -> Self {
		self.config.user_id_claim = claim.into();

		self
	}

	/// Bounds every provider fetch with a timeout.
	pub fn fetch_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.config.fetch_timeout = Some(timeout);

		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<CoordinatorConfig, ConfigError> {
		let config = self.config;

		if config.refresh_margin.is_negative() {
			return Err(ConfigError::NegativeRefreshMargin { margin: config.refresh_margin });
		}
		if config.user_id_claim.is_empty() {
			return Err(ConfigError::EmptyUserIdClaim);
		}
		if config.fetch_timeout.is_some_and(|timeout| timeout.is_zero()) {
			return Err(ConfigError::ZeroFetchTimeout);
		}

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_validate() {
		let config = CoordinatorConfig::builder().build().expect("Defaults should validate.");

		assert_eq!(config, CoordinatorConfig::default());
		assert_eq!(config.refresh_margin, Duration::minutes(1));
		assert_eq!(config.user_id_claim, "sub");
		assert!(config.fetch_timeout.is_none());
	}

	#[test]
	fn builder_rejects_invalid_values() {
		assert_eq!(
			CoordinatorConfig::builder().refresh_margin(Duration::seconds(-1)).build(),
			Err(ConfigError::NegativeRefreshMargin { margin: Duration::seconds(-1) })
		);
		assert_eq!(
			CoordinatorConfig::builder().user_id_claim("").build(),
			Err(ConfigError::EmptyUserIdClaim)
		);
		assert_eq!(
			CoordinatorConfig::builder().fetch_timeout(std::time::Duration::ZERO).build(),
			Err(ConfigError::ZeroFetchTimeout)
		);
	}

	#[test]
	fn builder_applies_overrides() {
		let config = CoordinatorConfig::builder()
			.refresh_margin(Duration::ZERO)
			.user_id_claim("https://example.com/user_id")
			.fetch_timeout(std::time::Duration::from_secs(10))
			.build()
			.expect("Overrides should validate.");

		assert!(config.refresh_margin.is_zero());
		assert_eq!(config.user_id_claim, "https://example.com/user_id");
		assert_eq!(config.fetch_timeout, Some(std::time::Duration::from_secs(10)));
	}
}

//! Bearer token wrapper that keeps the raw credential out of logs.

// self
use crate::_prelude::*;

/// Opaque bearer token fetched from the identity provider.
///
/// Cloning is cheap; the string is shared between every published [`TokenState`] clone.
///
/// [`TokenState`]: crate::TokenState
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(Arc<str>);
impl TokenSecret {
	/// Wraps a raw token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(Arc::from(value.into()))
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Formats the token as an HTTP `Authorization` header value.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_redact_but_bearer_exposes() {
		let secret = TokenSecret::new("eyJ.payload.sig");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.bearer(), "Bearer eyJ.payload.sig");
	}
}

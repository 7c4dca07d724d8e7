//! User identifier decoded from token claims.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Errors raised when a claim value cannot serve as a [`UserId`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum UserIdError {
	/// The claim was an empty string.
	#[error("User identifier cannot be empty.")]
	Empty,
}

/// Identity-provider user identifier extracted from token claims.
///
/// Identifiers are opaque to the coordinator (`auth0|123`, an email address, a display name);
/// any non-empty string claim is accepted verbatim.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Arc<str>);
impl UserId {
	/// Validates `value` and wraps it.
	pub fn new(value: impl AsRef<str>) -> Result<Self, UserIdError> {
		let value = value.as_ref();

		Self::check(value)?;

		Ok(Self(Arc::from(value)))
	}

	fn check(value: &str) -> Result<(), UserIdError> {
		if value.is_empty() { Err(UserIdError::Empty) } else { Ok(()) }
	}
}
impl Deref for UserId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for UserId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for UserId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<UserId> for String {
	fn from(value: UserId) -> Self {
		value.0.as_ref().to_owned()
	}
}
impl TryFrom<String> for UserId {
	type Error = UserIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::check(&value)?;

		Ok(Self(Arc::from(value)))
	}
}
impl FromStr for UserId {
	type Err = UserIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "UserId({})", self.0)
	}
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

//! Claim extraction from compact JWS bearer tokens.
//!
//! The coordinator treats tokens as opaque apart from two facts: the numeric `exp` claim that
//! drives refresh scheduling, and a (usually namespaced) user identifier claim. Signatures are
//! not verified here; the identity provider client already vouched for the token.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Number, Value};
// self
use crate::{
	_prelude::*,
	auth::{UserId, UserIdError},
};

/// Errors raised while decoding token claims.
#[derive(Debug, ThisError)]
pub enum TokenDecodeError {
	/// Token is not a three-segment compact JWS.
	#[error("Token is not a compact JWS; expected 3 segments, found {segments}.")]
	NotCompact {
		/// Number of `.`-separated segments encountered.
		segments: usize,
	},
	/// Payload segment is not valid base64url.
	#[error("Token payload is not valid base64url.")]
	Base64(#[from] base64::DecodeError),
	/// Payload is not a JSON object with the expected claim types.
	#[error("Token payload is not valid claim JSON.")]
	Json(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// Payload carries no `exp` claim.
	#[error("Token payload is missing the exp claim.")]
	MissingExpiry,
	/// The `exp` claim is not a representable instant.
	#[error("Token exp claim {value} is not a valid timestamp.")]
	InvalidExpiry {
		/// Raw claim value.
		value: Number,
	},
	/// Payload carries no user identifier claim.
	#[error("Token payload is missing the `{claim}` claim.")]
	MissingUserId {
		/// Configured claim key.
		claim: String,
	},
	/// User identifier claim is present but unusable.
	#[error("Token `{claim}` claim is not a valid user identifier.")]
	InvalidUserId {
		/// Configured claim key.
		claim: String,
		/// Validation failure, absent when the claim is not a string.
		#[source]
		source: Option<UserIdError>,
	},
}

/// Facts the coordinator extracts from a fetched token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// User identifier claim.
	pub user_id: UserId,
	/// Expiry instant from the `exp` claim.
	pub expires_at: OffsetDateTime,
}
impl TokenClaims {
	/// Decodes the claims of `token`, reading the user identifier from `user_id_claim`.
	pub fn decode(token: &str, user_id_claim: &str) -> Result<Self, TokenDecodeError> {
		let segments = token.split('.').collect::<Vec<_>>();

		if segments.len() != 3 {
			return Err(TokenDecodeError::NotCompact { segments: segments.len() });
		}

		let bytes = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
		let de = &mut serde_json::Deserializer::from_slice(&bytes);
		let mut payload: RawPayload = serde_path_to_error::deserialize(de)?;
		let exp = payload.exp.ok_or(TokenDecodeError::MissingExpiry)?;
		let expires_at = parse_expiry(&exp).ok_or(TokenDecodeError::InvalidExpiry { value: exp })?;
		let user_id = match payload.rest.remove(user_id_claim) {
			None | Some(Value::Null) =>
				return Err(TokenDecodeError::MissingUserId { claim: user_id_claim.into() }),
			Some(Value::String(raw)) => UserId::new(raw).map_err(|e| {
				TokenDecodeError::InvalidUserId { claim: user_id_claim.into(), source: Some(e) }
			})?,
			Some(_) =>
				return Err(TokenDecodeError::InvalidUserId {
					claim: user_id_claim.into(),
					source: None,
				}),
		};

		Ok(Self { user_id, expires_at })
	}
}

#[derive(Deserialize)]
struct RawPayload {
	exp: Option<Number>,
	#[serde(flatten)]
	rest: Map<String, Value>,
}

fn parse_expiry(exp: &Number) -> Option<OffsetDateTime> {
	let secs = match exp.as_i64() {
		Some(secs) => secs,
		None => {
			let float = exp.as_f64()?;

			if !float.is_finite() || float < i64::MIN as f64 || float > i64::MAX as f64 {
				return None;
			}

			float.floor() as i64
		},
	};

	OffsetDateTime::from_unix_timestamp(secs).ok()
}

//! Process-local token lifecycle coordinator: acquire a bearer token from an identity provider,
//! fan it out to any number of consumers, and refresh it ahead of expiry without duplicate
//! fetches.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

#[macro_use]
pub mod obs;

pub mod auth;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod provider;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

pub use auth::{TokenClaims, TokenSecret, TokenState, TokenStatus, UserId};
pub use config::CoordinatorConfig;
pub use coordinator::{ListenerHandle, TokenCoordinator};
pub use provider::{CredentialProvider, ProviderError};

#[cfg(test)] use color_eyre as _;

//! Auth-domain identifiers, claim decoding, and token state models.

pub mod claims;
pub mod id;
pub mod token;

pub use claims::*;
pub use id::*;
pub use token::{secret::*, state::*};

//! Profile-completion interstitial for identity-provider rule pipelines. Verify the signed
//! hand-off, collect the missing profile fields behind forgery protection, and bridge the
//! validated data back to the provider's continuation endpoint.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod assertion;
pub mod auth;
pub mod config;
pub mod error;
pub mod fields;
pub mod flows;
pub mod forgery;
pub mod obs;
pub mod render;
pub mod store;
pub mod submission;
pub mod transaction;

mod _prelude {
	pub use std::{
		collections::{BTreeSet, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use jsonwebtoken;
pub use url;
#[cfg(test)] use {color_eyre as _, tokio as _};

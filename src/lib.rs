//! Delegated-authentication front controller: route inbound requests to pluggable provider
//! strategies by URL segment, and verify that the signed envelope a strategy hands back is
//! untampered and fresh.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod callback;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod obs;
pub mod router;
pub mod security;
pub mod strategy;
pub mod transport;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use serde_json;
pub use url;
#[cfg(test)] use color_eyre as _;

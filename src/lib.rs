//! CI credential broker: trade a job token for a SAML assertion, exchange it with AWS STS, and
//! publish short-lived credentials to the running job with actionable diagnostics on failure.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod action;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod exchange;
pub mod federation;
pub mod flow;
pub mod host;
pub mod http;
pub mod issuer;
pub mod obs;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

//! flixdeck-fetch: the catalog request client.
//!
//! [`CatalogClient::fetch_resource`] turns a path and a set of query
//! parameters into a single GET against the catalog API. Identical requests
//! share one network operation, every request is bounded by a timeout, and
//! callers may cancel through an [`AbortSignal`].

pub mod client;
pub mod inflight;
pub mod signal;
pub mod url;

pub use client::{CatalogClient, RequestOptions};
pub use flixdeck_core::{AbortReason, Error, ErrorKind, Result};
pub use signal::{AbortController, AbortSignal, ComposedSignal, TimeoutGuard};
pub use url::{ParamValue, Params, RequestDescriptor};

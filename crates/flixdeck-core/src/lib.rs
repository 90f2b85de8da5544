//! flixdeck-core: shared error type and configuration.
//!
//! Every other flixdeck crate reports failures through [`Error`] and reads
//! its settings from [`config::Config`].

pub mod config;
pub mod error;

pub use error::{AbortReason, Error, ErrorKind, Result};

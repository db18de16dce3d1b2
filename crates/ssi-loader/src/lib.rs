//! File loading abstraction for the SSI engine.
//!
//! This crate provides a [`Loader`] trait for resolving and reading the
//! source files fed into the template pipeline. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Backend flexibility** (filesystem today; anything that can
//!   produce text tomorrow)
//! - **Clean separation** between the template pipeline and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Loader`] trait with a single `load()` method
//! - [`FsLoader`] implementation reading from a base directory
//! - [`MockLoader`] for testing (behind the `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use ssi_loader::{FsLoader, LoadOptions, Loader};
//!
//! let loader = FsLoader::new("site");
//! let content = loader.load(Path::new("index.html"), &LoadOptions::default())?;
//! ```

mod fs;
mod loader;
#[cfg(feature = "mock")]
mod mock;

pub use fs::FsLoader;
pub use loader::{Encoding, LoadError, LoadErrorKind, LoadOptions, Loader};
#[cfg(feature = "mock")]
pub use mock::MockLoader;

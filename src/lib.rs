//! **xnbkit** - a reusable Rust library for reading XNA compiled content.
//!
//! # Supported formats
//! | Module | Format |
//! |--------|--------|
//! | [`formats::xnb`] | XNB - compiled object graph plus type reader manifest |
//! | [`formats::pak`] | Pak - flat named blob table of XNB files and raw assets |
//!
//! # Decoding a file
//! ```no_run
//! use xnbkit::formats::xnb::Xnb;
//!
//! let bytes = std::fs::read("Content/title.xnb")?;
//! let mut xnb = Xnb::open(&bytes)?;
//! let content = xnb.parse()?;
//! println!("{:?}", content.root);
//! # Ok::<(), xnbkit::Error>(())
//! ```
//!
//! Readers for the framework's builtin types are registered in
//! [`readers::Registry::global`]. Type names in manifests are parsed with
//! [`typename::TypeSpec`].

pub mod batch;
pub mod compression;
pub mod cursor;
pub mod error;
pub mod export;
pub mod formats;
pub mod readers;
pub mod typename;
pub(crate) mod utils;

pub use error::{Error, Result};

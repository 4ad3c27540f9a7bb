//! # microcalc-core
//!
//! Core data structures shared by the microcalc crates.
//!
//! This crate provides:
//! - [`CellAddress`] - A1-style cell addressing with bijective base-26 columns
//! - [`Error`] and [`Result`] - errors raised while decoding addresses
//!
//! ## Example
//!
//! ```rust
//! use microcalc_core::CellAddress;
//!
//! let addr = CellAddress::parse("BC23").unwrap();
//! assert_eq!(addr.row, 22);
//! assert_eq!(addr.col, 54);
//! assert_eq!(addr.to_string(), "BC23");
//! ```

pub mod cell;
pub mod error;

pub use cell::CellAddress;
pub use error::{Error, Result};

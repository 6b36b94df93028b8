//! Generic IDL-driven inspection library.
//!
//! Provides:
//! - IDL loading and payload input handling
//! - JSON instruction argument encoding
//! - Account, instruction, event and log decoding to JSON
//! - IDL summaries with discriminators and sizes
//!
//! Use this as a library to build program-specific tools, or use the
//! `idl-codec` binary for a fully generic IDL-driven experience.

pub mod cli;
pub mod error;
pub mod inspect;
pub mod parse;
pub mod serialize;

pub use error::CliError;

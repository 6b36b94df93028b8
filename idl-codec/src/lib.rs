//! # IDL Codec
//!
//! Encode and decode the accounts, instructions and events of any program
//! that publishes an IDL, without generated bindings.
//!
//! ```ignore
//! use idl_codec::prelude::*;
//!
//! let coder = IdlCoder::new(&Idl::from_json(&idl_json)?)?;
//! let data = coder.instructions().encode(
//!     "initialize",
//!     &Fields::new().with("amount", 42u32).with("name", "test"),
//! )?;
//! ```

// Re-export core modules
pub use idl_codec_core::*;

pub mod prelude {
    pub use idl_codec_core::json::{fields_from_json, from_json, to_json};
    pub use idl_codec_core::prelude::*;
    pub use borsh::{BorshDeserialize, BorshSerialize};
}

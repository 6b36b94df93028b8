//! # IDL Codec Core
//!
//! Runtime encoder and decoder for program data described by an IDL.
//! Accounts, instructions and events are converted between raw bytes and
//! [`Value`](value::Value) trees, driven by the type layouts in the IDL.

pub mod accounts;
pub mod coder;
pub mod config;
pub mod discriminator;
pub mod error;
pub mod events;
pub mod hex;
pub mod idl;
pub mod idl_coder;
pub mod instructions;
pub mod json;
pub mod pubkey;
pub mod reader;
pub mod types;
pub mod value;
pub mod writer;

pub use error::{CodecError, ErrorKind, Result};
pub use idl_coder::IdlCoder;

pub mod prelude {
    pub use crate::accounts::{AccountsCoder, MemcmpFilter};
    pub use crate::coder::{TypeCoder, TypesCoder};
    pub use crate::config::CoderConfig;
    pub use crate::discriminator::{
        frame_decode, frame_encode, Discriminator, ACCOUNT_NAMESPACE, EVENT_NAMESPACE,
        INSTRUCTION_NAMESPACE,
    };
    pub use crate::error::{CodecError, ErrorKind, Result};
    pub use crate::events::{DecodedEvent, EventCoder, EventParser};
    pub use crate::idl::{Idl, IdlType};
    pub use crate::idl_coder::IdlCoder;
    pub use crate::instructions::{DecodedInstruction, InstructionCoder};
    pub use crate::pubkey::Pubkey;
    pub use crate::types::{FieldDef, TypeDef, TypeDescriptor, TypeRegistry, VariantDef};
    pub use crate::value::{Fields, Value};
}

//! Instruction data encoding and decoding.
//!
//! Instruction data is `[discriminator][args...]`, the arguments written
//! back to back in declared order. Discriminators use the `global`
//! namespace over the snake_case instruction name unless the IDL lists
//! explicit bytes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use heck::ToSnakeCase;

use crate::coder::TypeCoder;
use crate::config::CoderConfig;
use crate::discriminator::{self, Discriminator, DISCRIMINATOR_LEN, INSTRUCTION_NAMESPACE};
use crate::error::{CodecError, Result};
use crate::idl::{Idl, IdlAccountItem, IdlInstruction};
use crate::reader::ByteReader;
use crate::types::{convert_fields, FieldDef, TypeRegistry};
use crate::value::Fields;
use crate::writer::ByteWriter;

#[derive(Debug, Clone)]
struct InstructionLayout {
    name: String,
    discriminator: Discriminator,
    args: Vec<FieldDef>,
    accounts: Vec<IdlAccountItem>,
}

impl InstructionLayout {
    fn from_idl(ix: &IdlInstruction) -> Result<Self> {
        let discriminator = match &ix.discriminator {
            Some(bytes) => Discriminator::from_slice(bytes)?,
            None => Discriminator::compute(INSTRUCTION_NAMESPACE, &ix.name.to_snake_case()),
        };
        Ok(Self {
            name: ix.name.clone(),
            discriminator,
            args: convert_fields(&ix.args)?,
            accounts: ix.accounts.clone(),
        })
    }
}

/// An instruction identified from raw data.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedInstruction {
    pub name: String,
    pub args: Fields,
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.args)
    }
}

/// Coder for the instructions declared by an IDL.
#[derive(Debug, Clone)]
pub struct InstructionCoder {
    registry: Arc<TypeRegistry>,
    config: CoderConfig,
    instructions: Vec<InstructionLayout>,
    by_discriminator: HashMap<Discriminator, usize>,
}

impl InstructionCoder {
    pub fn new(idl: &Idl, registry: Arc<TypeRegistry>, config: CoderConfig) -> Result<Self> {
        let instructions = idl
            .instructions
            .iter()
            .map(|ix| {
                let layout = InstructionLayout::from_idl(ix).map_err(|e| e.in_field(&ix.name))?;
                for arg in &layout.args {
                    registry
                        .check_refs(&arg.ty)
                        .map_err(|e| e.in_field(&arg.name).in_field(&ix.name))?;
                }
                Ok(layout)
            })
            .collect::<Result<Vec<_>>>()?;
        let by_discriminator = discriminator::index_by_discriminator(
            instructions.iter().map(|ix| (ix.name.as_str(), ix.discriminator)),
        );
        Ok(Self {
            registry,
            config,
            instructions,
            by_discriminator,
        })
    }

    fn coder(&self) -> TypeCoder<'_> {
        TypeCoder::with_config(&self.registry, self.config)
    }

    fn layout(&self, name: &str) -> Result<&InstructionLayout> {
        self.instructions
            .iter()
            .find(|ix| ix.name == name)
            .ok_or_else(|| CodecError::UnknownInstruction {
                name: name.to_string(),
            })
    }

    /// Declared instruction names, in IDL order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instructions.iter().map(|ix| ix.name.as_str())
    }

    pub fn discriminator(&self, name: &str) -> Result<Discriminator> {
        Ok(self.layout(name)?.discriminator)
    }

    /// Declared argument layout of an instruction.
    pub fn args(&self, name: &str) -> Result<&[FieldDef]> {
        Ok(&self.layout(name)?.args)
    }

    /// Accounts the instruction expects, as declared in the IDL.
    pub fn accounts(&self, name: &str) -> Result<&[IdlAccountItem]> {
        Ok(&self.layout(name)?.accounts)
    }

    /// Encode instruction data: discriminator followed by the arguments.
    pub fn encode(&self, name: &str, args: &Fields) -> Result<Vec<u8>> {
        let layout = self.layout(name)?;
        let mut writer = ByteWriter::new();
        writer.write_raw(layout.discriminator.as_bytes());
        self.coder().encode_fields(&mut writer, args, &layout.args)?;
        Ok(writer.into_inner())
    }

    /// Decode the arguments of the named instruction.
    pub fn decode(&self, name: &str, data: &[u8]) -> Result<Fields> {
        let layout = self.layout(name)?;
        discriminator::verify(name, layout.discriminator, data)?;
        self.decode_args(layout, data)
    }

    /// Identify the instruction by discriminator and decode its arguments.
    ///
    /// Returns `Ok(None)` when the data is shorter than a discriminator or
    /// names no declared instruction.
    pub fn decode_any(&self, data: &[u8]) -> Result<Option<DecodedInstruction>> {
        let Some((disc, _)) = Discriminator::split(data) else {
            return Ok(None);
        };
        let Some(&index) = self.by_discriminator.get(&disc) else {
            tracing::trace!(discriminator = %disc, "no instruction matches");
            return Ok(None);
        };
        let layout = &self.instructions[index];
        Ok(Some(DecodedInstruction {
            name: layout.name.clone(),
            args: self.decode_args(layout, data)?,
        }))
    }

    fn decode_args(&self, layout: &InstructionLayout, data: &[u8]) -> Result<Fields> {
        let mut reader = ByteReader::new(data);
        reader.read_raw(DISCRIMINATOR_LEN)?;
        self.coder().decode_fields(&mut reader, &layout.args)
    }
}

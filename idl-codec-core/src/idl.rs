//! IDL (Interface Definition Language) document types.
//!
//! A program publishes an IDL JSON file describing its instructions,
//! account layouts, events, custom types and error codes. This module
//! defines the serde model of that file. It is read once and treated as
//! immutable input when building a [`TypeRegistry`](crate::types::TypeRegistry).

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level IDL for a program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Idl {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IdlMetadata>,
    #[serde(default)]
    pub instructions: Vec<IdlInstruction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<IdlAccountDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<IdlEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<IdlTypeDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IdlErrorCode>,
}

/// Program metadata block used by newer IDL files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdlMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
}

/// An instruction in the IDL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<IdlAccountItem>,
    #[serde(default)]
    pub args: Vec<IdlField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<u8>>,
}

/// An account expected by an instruction.
///
/// Address derivation hints such as `pda` are not modelled and are
/// ignored when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlAccountItem {
    pub name: String,
    #[serde(default, alias = "isMut")]
    pub writable: bool,
    #[serde(default, alias = "isSigner")]
    pub signer: bool,
    #[serde(default, alias = "isOptional", skip_serializing_if = "is_false")]
    pub optional: bool,
    /// Nested account group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<IdlAccountItem>,
}

fn is_false(v: &bool) -> bool {
    !v
}

/// A named field: struct member, instruction argument or event field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: IdlType,
    /// Marks an indexed event field. Has no effect on the wire.
    #[serde(default, skip_serializing_if = "is_false")]
    pub index: bool,
}

impl IdlField {
    pub fn new(name: impl Into<String>, type_: IdlType) -> Self {
        Self {
            name: name.into(),
            type_,
            index: false,
        }
    }
}

/// Type representation in the IDL.
///
/// Shapes the codec cannot interpret are kept as [`IdlType::Other`] so
/// the document still loads and the failure surfaces when the type is
/// converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlType {
    Primitive(String),
    Vec { vec: Box<IdlType> },
    Option { option: Box<IdlType> },
    Defined { defined: IdlDefinedRef },
    Array { array: (Box<IdlType>, usize) },
    Other(serde_json::Value),
}

impl IdlType {
    pub fn primitive(name: &str) -> Self {
        IdlType::Primitive(name.to_string())
    }

    pub fn vec(inner: IdlType) -> Self {
        IdlType::Vec {
            vec: Box::new(inner),
        }
    }

    pub fn option(inner: IdlType) -> Self {
        IdlType::Option {
            option: Box::new(inner),
        }
    }

    pub fn array(inner: IdlType, size: usize) -> Self {
        IdlType::Array {
            array: (Box::new(inner), size),
        }
    }

    pub fn defined(name: &str) -> Self {
        IdlType::Defined {
            defined: IdlDefinedRef::Name(name.to_string()),
        }
    }
}

/// Target of a `defined` type reference: a bare name or `{ "name": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlDefinedRef {
    Name(String),
    Named { name: String },
}

impl IdlDefinedRef {
    pub fn name(&self) -> &str {
        match self {
            IdlDefinedRef::Name(name) | IdlDefinedRef::Named { name } => name,
        }
    }
}

/// Account type definition in the IDL.
///
/// Older IDL files inline the layout under `type`; newer ones list it in
/// `types` under the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlAccountDef {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<IdlTypeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<u8>>,
}

/// Event definition in the IDL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<IdlField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<u8>>,
}

/// A named entry of the shared type pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlTypeDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: IdlTypeDef,
}

/// Type definition (struct or enum).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlTypeDef {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<IdlField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<IdlEnumVariant>,
}

impl IdlTypeDef {
    pub fn structure(fields: Vec<IdlField>) -> Self {
        Self {
            kind: "struct".to_string(),
            fields,
            variants: vec![],
        }
    }

    pub fn enumeration(variants: Vec<IdlEnumVariant>) -> Self {
        Self {
            kind: "enum".to_string(),
            fields: vec![],
            variants,
        }
    }
}

/// An enum variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlEnumVariant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<IdlField>,
}

/// Error definition in the IDL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlErrorCode {
    pub code: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Idl {
    /// Create an empty IDL with the given program name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse an IDL JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the IDL to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Program name, falling back to the metadata block.
    pub fn program_name(&self) -> &str {
        match &self.metadata {
            Some(meta) if self.name.is_empty() => &meta.name,
            _ => &self.name,
        }
    }

    pub fn instruction(&self, name: &str) -> Option<&IdlInstruction> {
        self.instructions.iter().find(|ix| ix.name == name)
    }

    /// Look up a program error by its custom error code.
    pub fn error(&self, code: u32) -> Option<&IdlErrorCode> {
        self.errors.iter().find(|e| e.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_shapes() {
        let json = r#"[
            "u64",
            {"vec": "u8"},
            {"option": {"defined": "Point"}},
            {"array": ["u8", 32]},
            {"defined": {"name": "Point"}},
            {"coption": "u8"}
        ]"#;
        let types: Vec<IdlType> = serde_json::from_str(json).unwrap();
        assert_eq!(types[0], IdlType::primitive("u64"));
        assert_eq!(types[1], IdlType::vec(IdlType::primitive("u8")));
        assert_eq!(types[2], IdlType::option(IdlType::defined("Point")));
        assert_eq!(types[3], IdlType::array(IdlType::primitive("u8"), 32));
        match &types[4] {
            IdlType::Defined { defined } => assert_eq!(defined.name(), "Point"),
            other => panic!("expected defined, got {other:?}"),
        }
        assert!(matches!(types[5], IdlType::Other(_)));
    }

    #[test]
    fn legacy_account_flags() {
        let json = r#"{"name": "payer", "isMut": true, "isSigner": true}"#;
        let item: IdlAccountItem = serde_json::from_str(json).unwrap();
        assert!(item.writable && item.signer && !item.optional);
    }

    #[test]
    fn error_lookup_by_code() {
        let mut idl = Idl::new("demo");
        idl.errors.push(IdlErrorCode {
            code: 6000,
            name: "Overflow".into(),
            msg: Some("math overflow".into()),
        });
        assert_eq!(idl.error(6000).map(|e| e.name.as_str()), Some("Overflow"));
        assert!(idl.error(6001).is_none());
    }
}

//! Runtime type descriptors and the registry of defined types.
//!
//! [`TypeDescriptor`] is the closed form of an IDL type. `Defined`
//! variants hold only a name and are resolved against the
//! [`TypeRegistry`] each time they are visited, so recursive and
//! mutually-referential definitions never need to be expanded.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::error::{CodecError, Result};
use crate::idl::{Idl, IdlField, IdlType, IdlTypeDef};
use crate::pubkey::PUBKEY_LEN;

/// Wire-level type of a single value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
    String,
    Bytes,
    PublicKey,
    Vec(Box<TypeDescriptor>),
    Array(Box<TypeDescriptor>, u32),
    Option(Box<TypeDescriptor>),
    Defined(String),
}

impl TypeDescriptor {
    pub fn vec(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Vec(Box::new(inner))
    }

    pub fn array(inner: TypeDescriptor, size: u32) -> Self {
        TypeDescriptor::Array(Box::new(inner), size)
    }

    pub fn option(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Option(Box::new(inner))
    }

    pub fn defined(name: impl Into<String>) -> Self {
        TypeDescriptor::Defined(name.into())
    }

    /// Parse a primitive type name as it appears in IDL files.
    pub fn from_primitive(name: &str) -> Result<Self> {
        let ty = match name {
            "bool" => TypeDescriptor::Bool,
            "u8" => TypeDescriptor::U8,
            "u16" => TypeDescriptor::U16,
            "u32" => TypeDescriptor::U32,
            "u64" => TypeDescriptor::U64,
            "u128" => TypeDescriptor::U128,
            "i8" => TypeDescriptor::I8,
            "i16" => TypeDescriptor::I16,
            "i32" => TypeDescriptor::I32,
            "i64" => TypeDescriptor::I64,
            "i128" => TypeDescriptor::I128,
            "f32" => TypeDescriptor::F32,
            "f64" => TypeDescriptor::F64,
            "string" => TypeDescriptor::String,
            "bytes" => TypeDescriptor::Bytes,
            "publicKey" | "pubkey" => TypeDescriptor::PublicKey,
            other => {
                return Err(CodecError::UnsupportedType {
                    kind: other.to_string(),
                })
            }
        };
        Ok(ty)
    }

    /// Encoded width of a fixed-size primitive.
    fn primitive_size(&self) -> Option<usize> {
        let size = match self {
            TypeDescriptor::Bool | TypeDescriptor::U8 | TypeDescriptor::I8 => 1,
            TypeDescriptor::U16 | TypeDescriptor::I16 => 2,
            TypeDescriptor::U32 | TypeDescriptor::I32 | TypeDescriptor::F32 => 4,
            TypeDescriptor::U64 | TypeDescriptor::I64 | TypeDescriptor::F64 => 8,
            TypeDescriptor::U128 | TypeDescriptor::I128 => 16,
            TypeDescriptor::PublicKey => PUBKEY_LEN,
            _ => return None,
        };
        Some(size)
    }

    /// Smallest number of bytes any value of this type can occupy.
    ///
    /// Used to reject element counts that cannot fit the remaining input
    /// before anything is allocated. A reference back to a type already
    /// being measured counts as zero, which keeps the result a lower bound.
    pub fn min_size(&self, registry: &TypeRegistry) -> Result<usize> {
        self.min_size_in(registry, &mut SizeWalk::default())
    }

    fn min_size_in<'r>(&'r self, registry: &'r TypeRegistry, walk: &mut SizeWalk<'r, usize>) -> Result<usize> {
        match self {
            TypeDescriptor::String | TypeDescriptor::Bytes | TypeDescriptor::Vec(_) => Ok(4),
            TypeDescriptor::Option(_) => Ok(1),
            TypeDescriptor::Array(inner, size) => Ok(inner
                .min_size_in(registry, walk)?
                .saturating_mul(*size as usize)),
            TypeDescriptor::Defined(name) => defined_min_size(name, registry, walk),
            primitive => Ok(primitive.primitive_size().unwrap_or(0)),
        }
    }

    /// Encoded size when every value of this type has the same length.
    ///
    /// Types that refer back to themselves are never fixed-size.
    pub fn fixed_size(&self, registry: &TypeRegistry) -> Result<Option<usize>> {
        self.fixed_size_in(registry, &mut SizeWalk::default())
    }

    fn fixed_size_in<'r>(
        &'r self,
        registry: &'r TypeRegistry,
        walk: &mut SizeWalk<'r, Option<usize>>,
    ) -> Result<Option<usize>> {
        match self {
            TypeDescriptor::String
            | TypeDescriptor::Bytes
            | TypeDescriptor::Vec(_)
            | TypeDescriptor::Option(_) => Ok(None),
            TypeDescriptor::Array(inner, size) => Ok(inner
                .fixed_size_in(registry, walk)?
                .and_then(|elem| elem.checked_mul(*size as usize))),
            TypeDescriptor::Defined(name) => {
                if let Some(size) = walk.known(name) {
                    return Ok(size);
                }
                if walk.is_visiting(name) {
                    return Ok(None);
                }
                walk.enter(name);
                let size = registry.get(name)?.fixed_size_in(registry, walk)?;
                walk.leave(name, size);
                Ok(size)
            }
            primitive => Ok(primitive.primitive_size()),
        }
    }
}

impl TryFrom<&IdlType> for TypeDescriptor {
    type Error = CodecError;

    fn try_from(ty: &IdlType) -> Result<Self> {
        match ty {
            IdlType::Primitive(name) => TypeDescriptor::from_primitive(name),
            IdlType::Vec { vec } => Ok(TypeDescriptor::vec(vec.as_ref().try_into()?)),
            IdlType::Option { option } => Ok(TypeDescriptor::option(option.as_ref().try_into()?)),
            IdlType::Defined { defined } => Ok(TypeDescriptor::defined(defined.name())),
            IdlType::Array { array } => {
                let size = u32::try_from(array.1).map_err(|_| CodecError::UnsupportedType {
                    kind: format!("array of {} elements", array.1),
                })?;
                Ok(TypeDescriptor::array(array.0.as_ref().try_into()?, size))
            }
            IdlType::Other(json) => Err(CodecError::UnsupportedType {
                kind: json.to_string(),
            }),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::U8 => f.write_str("u8"),
            TypeDescriptor::U16 => f.write_str("u16"),
            TypeDescriptor::U32 => f.write_str("u32"),
            TypeDescriptor::U64 => f.write_str("u64"),
            TypeDescriptor::U128 => f.write_str("u128"),
            TypeDescriptor::I8 => f.write_str("i8"),
            TypeDescriptor::I16 => f.write_str("i16"),
            TypeDescriptor::I32 => f.write_str("i32"),
            TypeDescriptor::I64 => f.write_str("i64"),
            TypeDescriptor::I128 => f.write_str("i128"),
            TypeDescriptor::F32 => f.write_str("f32"),
            TypeDescriptor::F64 => f.write_str("f64"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::Bytes => f.write_str("bytes"),
            TypeDescriptor::PublicKey => f.write_str("publicKey"),
            TypeDescriptor::Vec(inner) => write!(f, "Vec<{inner}>"),
            TypeDescriptor::Array(inner, size) => write!(f, "[{inner}; {size}]"),
            TypeDescriptor::Option(inner) => write!(f, "Option<{inner}>"),
            TypeDescriptor::Defined(name) => f.write_str(name),
        }
    }
}

/// A named field with its resolved descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl TryFrom<&IdlField> for FieldDef {
    type Error = CodecError;

    fn try_from(field: &IdlField) -> Result<Self> {
        let ty = TypeDescriptor::try_from(&field.type_).map_err(|e| e.in_field(&field.name))?;
        Ok(FieldDef::new(field.name.clone(), ty))
    }
}

/// Convert a list of IDL fields, keeping declared order.
///
/// Two fields with the same name are rejected: decoded values are keyed by
/// name, so the second would hide the first.
pub fn convert_fields(fields: &[IdlField]) -> Result<Vec<FieldDef>> {
    ensure_unique(fields.iter().map(|f| f.name.as_str()), "field")?;
    fields.iter().map(FieldDef::try_from).collect()
}

fn ensure_unique<'a>(names: impl IntoIterator<Item = &'a str>, what: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CodecError::invalid_idl(format!("{what} `{name}` is declared more than once")));
        }
    }
    Ok(())
}

/// One enum variant. Unit variants have no fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

/// Structural definition of a named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Struct(Vec<FieldDef>),
    Enum(Vec<VariantDef>),
}

impl TypeDef {
    fn fixed_size_in<'r>(
        &'r self,
        registry: &'r TypeRegistry,
        walk: &mut SizeWalk<'r, Option<usize>>,
    ) -> Result<Option<usize>> {
        match self {
            TypeDef::Struct(fields) => fields_fixed_size(fields, registry, walk),
            TypeDef::Enum(variants) => {
                let mut size = None;
                for variant in variants {
                    let Some(body) = fields_fixed_size(&variant.fields, registry, walk)? else {
                        return Ok(None);
                    };
                    match size {
                        None => size = Some(body),
                        Some(prev) if prev != body => return Ok(None),
                        Some(_) => {}
                    }
                }
                Ok(size.map(|body| 1 + body))
            }
        }
    }

    fn descriptors(&self) -> Box<dyn Iterator<Item = (&str, &TypeDescriptor)> + '_> {
        match self {
            TypeDef::Struct(fields) => Box::new(fields.iter().map(|f| (f.name.as_str(), &f.ty))),
            TypeDef::Enum(variants) => Box::new(
                variants
                    .iter()
                    .flat_map(|v| v.fields.iter().map(|f| (f.name.as_str(), &f.ty))),
            ),
        }
    }
}

impl TryFrom<&IdlTypeDef> for TypeDef {
    type Error = CodecError;

    fn try_from(def: &IdlTypeDef) -> Result<Self> {
        match def.kind.as_str() {
            "struct" => Ok(TypeDef::Struct(convert_fields(&def.fields)?)),
            "enum" => {
                if def.variants.len() > usize::from(u8::MAX) + 1 {
                    return Err(CodecError::invalid_idl(format!(
                        "enum has {} variants, at most 256 fit a u8 index",
                        def.variants.len()
                    )));
                }
                ensure_unique(def.variants.iter().map(|v| v.name.as_str()), "variant")?;
                let variants = def
                    .variants
                    .iter()
                    .map(|v| -> Result<VariantDef> {
                        Ok(VariantDef {
                            name: v.name.clone(),
                            fields: convert_fields(&v.fields).map_err(|e| e.in_field(&v.name))?,
                        })
                    })
                    .collect::<Result<_>>()?;
                Ok(TypeDef::Enum(variants))
            }
            other => Err(CodecError::UnsupportedType {
                kind: format!("type definition kind `{other}`"),
            }),
        }
    }
}

/// Sum of field sizes, or `None` when any field is variable-length.
fn fields_fixed_size<'r>(
    fields: &'r [FieldDef],
    registry: &'r TypeRegistry,
    walk: &mut SizeWalk<'r, Option<usize>>,
) -> Result<Option<usize>> {
    let mut total = 0usize;
    for field in fields {
        match field.ty.fixed_size_in(registry, walk)? {
            Some(size) => match total.checked_add(size) {
                Some(sum) => total = sum,
                None => return Ok(None),
            },
            None => return Ok(None),
        }
    }
    Ok(Some(total))
}

fn fields_min_size<'r>(
    fields: &'r [FieldDef],
    registry: &'r TypeRegistry,
    walk: &mut SizeWalk<'r, usize>,
) -> Result<usize> {
    let mut total = 0usize;
    for field in fields {
        total = total.saturating_add(field.ty.min_size_in(registry, walk)?);
    }
    Ok(total)
}

fn defined_min_size<'r>(name: &'r str, registry: &'r TypeRegistry, walk: &mut SizeWalk<'r, usize>) -> Result<usize> {
    if let Some(&size) = registry.min_sizes.get(name) {
        return Ok(size);
    }
    if let Some(size) = walk.known(name) {
        return Ok(size);
    }
    if walk.is_visiting(name) {
        return Ok(0);
    }
    walk.enter(name);
    let size = match registry.get(name)? {
        TypeDef::Struct(fields) => fields_min_size(fields, registry, walk)?,
        TypeDef::Enum(variants) => {
            let mut smallest: Option<usize> = None;
            for variant in variants {
                let size = fields_min_size(&variant.fields, registry, walk)?;
                smallest = Some(smallest.map_or(size, |s| s.min(size)));
            }
            1 + smallest.unwrap_or(0)
        }
    };
    walk.leave(name, size);
    Ok(size)
}

/// State of one size computation over the registry.
///
/// `visiting` is the chain of defined types currently being measured; a
/// reference back into it is a cycle. `done` holds each type already
/// measured, so no name is measured twice.
struct SizeWalk<'r, T> {
    visiting: Vec<&'r str>,
    done: HashMap<&'r str, T>,
}

impl<T> Default for SizeWalk<'_, T> {
    fn default() -> Self {
        Self {
            visiting: Vec::new(),
            done: HashMap::new(),
        }
    }
}

impl<'r, T: Copy> SizeWalk<'r, T> {
    fn known(&self, name: &str) -> Option<T> {
        self.done.get(name).copied()
    }

    fn is_visiting(&self, name: &str) -> bool {
        self.visiting.contains(&name)
    }

    fn enter(&mut self, name: &'r str) {
        self.visiting.push(name);
    }

    fn leave(&mut self, name: &'r str, size: T) {
        self.visiting.pop();
        self.done.insert(name, size);
    }
}

/// Read-only lookup table from defined-type name to its definition.
///
/// Built once per IDL; shared by every encode and decode call.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    defs: HashMap<String, TypeDef>,
    order: Vec<String>,
    /// Minimum encoded size per defined type, filled by [`Self::validate`].
    min_sizes: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and validate the registry for an IDL.
    ///
    /// Entries of `types` come first. Accounts and events that inline
    /// their layout are registered under their own name unless `types`
    /// already defines it. An event whose inline layout differs from an
    /// account of the same name is rejected.
    pub fn from_idl(idl: &Idl) -> Result<Self> {
        let mut registry = Self::new();

        for decl in &idl.types {
            let def = TypeDef::try_from(&decl.type_).map_err(|e| e.in_field(&decl.name))?;
            if registry.contains(&decl.name) {
                return Err(CodecError::invalid_idl(format!(
                    "type `{}` is defined more than once",
                    decl.name
                )));
            }
            registry.insert(decl.name.clone(), def);
        }

        let declared_types: HashSet<&str> = idl.types.iter().map(|d| d.name.as_str()).collect();

        for account in &idl.accounts {
            if let Some(inline) = &account.type_ {
                if declared_types.contains(account.name.as_str()) {
                    debug!(account = %account.name, "inline account layout shadowed by types entry");
                    continue;
                }
                let def = TypeDef::try_from(inline).map_err(|e| e.in_field(&account.name))?;
                registry.insert_inline(&account.name, def, "account")?;
            }
        }

        for event in &idl.events {
            if let Some(fields) = &event.fields {
                if declared_types.contains(event.name.as_str()) {
                    debug!(event = %event.name, "inline event layout shadowed by types entry");
                    continue;
                }
                let def = TypeDef::Struct(convert_fields(fields).map_err(|e| e.in_field(&event.name))?);
                registry.insert_inline(&event.name, def, "event")?;
            }
        }

        registry.validate()?;
        debug!(
            program = idl.program_name(),
            types = registry.len(),
            instructions = idl.instructions.len(),
            accounts = idl.accounts.len(),
            events = idl.events.len(),
            "built type registry"
        );
        Ok(registry)
    }

    /// Register a definition, replacing any previous one of the same name.
    pub fn insert(&mut self, name: impl Into<String>, def: TypeDef) {
        self.min_sizes.clear();
        let name = name.into();
        if self.defs.insert(name.clone(), def).is_none() {
            self.order.push(name);
        }
    }

    /// Register an inline account or event layout. A second inline layout
    /// under the same name must be identical to the first.
    fn insert_inline(&mut self, name: &str, def: TypeDef, what: &str) -> Result<()> {
        match self.defs.get(name) {
            Some(existing) if *existing == def => Ok(()),
            Some(_) => Err(CodecError::invalid_idl(format!(
                "{what} `{name}` declares a layout that differs from an earlier entry of the same name"
            ))),
            None => {
                self.insert(name, def);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Result<&TypeDef> {
        self.defs.get(name).ok_or_else(|| CodecError::UnknownType {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Check that every `Defined` reference in every definition resolves,
    /// then record each type's minimum encoded size.
    pub fn validate(&mut self) -> Result<()> {
        for name in &self.order {
            let def = self.get(name)?;
            for (field, ty) in def.descriptors() {
                self.check_refs(ty)
                    .map_err(|e| e.in_field(field).in_field(name))?;
            }
        }

        let min_sizes = {
            let mut walk = SizeWalk::default();
            let mut sizes = HashMap::with_capacity(self.order.len());
            for name in &self.order {
                sizes.insert(name.clone(), defined_min_size(name, self, &mut walk)?);
            }
            sizes
        };
        self.min_sizes = min_sizes;
        Ok(())
    }

    /// Check that every `Defined` reference inside `ty` resolves.
    pub fn check_refs(&self, ty: &TypeDescriptor) -> Result<()> {
        match ty {
            TypeDescriptor::Vec(inner)
            | TypeDescriptor::Array(inner, _)
            | TypeDescriptor::Option(inner) => self.check_refs(inner),
            TypeDescriptor::Defined(name) => self.get(name).map(|_| ()),
            _ => Ok(()),
        }
    }
}

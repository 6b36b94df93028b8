//! Descriptor-driven encoder and decoder.
//!
//! [`TypeCoder`] walks a [`TypeDescriptor`] and writes or reads the
//! matching wire bytes. Primitive kinds go straight to the
//! [`ByteWriter`]/[`ByteReader`]; `Defined` kinds are looked up in the
//! registry on every visit.

use std::sync::Arc;

use crate::config::CoderConfig;
use crate::error::{CodecError, Result};
use crate::reader::ByteReader;
use crate::types::{FieldDef, TypeDef, TypeDescriptor, TypeRegistry};
use crate::value::{Fields, Value};
use crate::writer::ByteWriter;

/// Encoder/decoder bound to one registry.
#[derive(Debug, Clone, Copy)]
pub struct TypeCoder<'r> {
    registry: &'r TypeRegistry,
    config: CoderConfig,
}

impl<'r> TypeCoder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_config(registry, CoderConfig::default())
    }

    pub fn with_config(registry: &'r TypeRegistry, config: CoderConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Encode `value` as `ty` into a fresh buffer.
    pub fn encode(&self, value: &Value, ty: &TypeDescriptor) -> Result<Vec<u8>> {
        let mut writer = ByteWriter::new();
        self.encode_into(&mut writer, value, ty)?;
        Ok(writer.into_inner())
    }

    pub fn encode_into(&self, writer: &mut ByteWriter, value: &Value, ty: &TypeDescriptor) -> Result<()> {
        self.encode_at(writer, value, ty, 0)
    }

    /// Encode named fields in declared order.
    ///
    /// Every declared field must be present; fields that are not declared
    /// are rejected.
    pub fn encode_fields(&self, writer: &mut ByteWriter, fields: &Fields, defs: &[FieldDef]) -> Result<()> {
        self.encode_fields_at(writer, fields, defs, 0)
    }

    /// Decode one `ty` from the start of `data`.
    ///
    /// Returns the value and the number of bytes consumed.
    pub fn decode(&self, data: &[u8], ty: &TypeDescriptor) -> Result<(Value, usize)> {
        let mut reader = ByteReader::new(data);
        let value = self.decode_from(&mut reader, ty)?;
        Ok((value, reader.position()))
    }

    pub fn decode_from(&self, reader: &mut ByteReader<'_>, ty: &TypeDescriptor) -> Result<Value> {
        self.decode_at(reader, ty, 0)
    }

    /// Decode named fields in declared order.
    pub fn decode_fields(&self, reader: &mut ByteReader<'_>, defs: &[FieldDef]) -> Result<Fields> {
        self.decode_fields_at(reader, defs, 0)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(CodecError::DepthLimit {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }

    /// Refuse element counts for types that occupy no bytes.
    fn check_zero_sized(inner: &TypeDescriptor, min_size: usize, len: usize) -> Result<()> {
        if min_size == 0 && len > 0 {
            return Err(CodecError::UnsupportedType {
                kind: format!("Vec<{inner}> of zero-sized elements"),
            });
        }
        Ok(())
    }

    fn encode_at(&self, w: &mut ByteWriter, value: &Value, ty: &TypeDescriptor, depth: usize) -> Result<()> {
        self.check_depth(depth)?;
        match (ty, value) {
            (TypeDescriptor::Bool, Value::Bool(v)) => w.write_bool(*v),
            (TypeDescriptor::U8, Value::U8(v)) => w.write_u8(*v),
            (TypeDescriptor::U16, Value::U16(v)) => w.write_u16(*v),
            (TypeDescriptor::U32, Value::U32(v)) => w.write_u32(*v),
            (TypeDescriptor::U64, Value::U64(v)) => w.write_u64(*v),
            (TypeDescriptor::U128, Value::U128(v)) => w.write_u128(*v),
            (TypeDescriptor::I8, Value::I8(v)) => w.write_i8(*v),
            (TypeDescriptor::I16, Value::I16(v)) => w.write_i16(*v),
            (TypeDescriptor::I32, Value::I32(v)) => w.write_i32(*v),
            (TypeDescriptor::I64, Value::I64(v)) => w.write_i64(*v),
            (TypeDescriptor::I128, Value::I128(v)) => w.write_i128(*v),
            (TypeDescriptor::F32, Value::F32(v)) => w.write_f32(*v),
            (TypeDescriptor::F64, Value::F64(v)) => w.write_f64(*v),
            (TypeDescriptor::String, Value::String(s)) => w.write_string(s)?,
            (TypeDescriptor::Bytes, Value::Bytes(b)) => w.write_bytes(b)?,
            (TypeDescriptor::PublicKey, Value::PublicKey(k)) => w.write_pubkey(k),
            (TypeDescriptor::Vec(inner), Value::List(items)) => {
                Self::check_zero_sized(inner, inner.min_size(self.registry)?, items.len())?;
                w.write_len(items.len())?;
                self.encode_items(w, items, inner, depth)?;
            }
            (TypeDescriptor::Array(inner, size), Value::List(items)) => {
                if items.len() != *size as usize {
                    return Err(CodecError::ArrayLength {
                        expected: *size as usize,
                        actual: items.len(),
                    });
                }
                self.encode_items(w, items, inner, depth)?;
            }
            (TypeDescriptor::Option(_), Value::Option(None)) => w.write_u8(0),
            (TypeDescriptor::Option(inner), Value::Option(Some(v))) => {
                w.write_u8(1);
                self.encode_at(w, v, inner, depth + 1)?;
            }
            (TypeDescriptor::Defined(name), value) => self.encode_defined(w, name, value, depth)?,
            (ty, value) => return Err(CodecError::mismatch(ty.to_string(), value.kind_name())),
        }
        Ok(())
    }

    fn encode_items(&self, w: &mut ByteWriter, items: &[Value], inner: &TypeDescriptor, depth: usize) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            self.encode_at(w, item, inner, depth + 1)
                .map_err(|e| e.at_index(i))?;
        }
        Ok(())
    }

    fn encode_defined(&self, w: &mut ByteWriter, name: &str, value: &Value, depth: usize) -> Result<()> {
        match (self.registry.get(name)?, value) {
            (TypeDef::Struct(defs), Value::Struct(fields)) => {
                self.encode_fields_at(w, fields, defs, depth + 1)
            }
            (TypeDef::Enum(variants), Value::Enum { variant, fields }) => {
                let index = variants
                    .iter()
                    .position(|v| v.name == *variant)
                    .ok_or_else(|| CodecError::UnknownVariant {
                        type_name: name.to_string(),
                        variant: variant.clone(),
                    })?;
                let tag = u8::try_from(index).map_err(|_| {
                    CodecError::invalid_idl(format!("enum `{name}` has more than 256 variants"))
                })?;
                w.write_u8(tag);
                self.encode_fields_at(w, fields, &variants[index].fields, depth + 1)
                    .map_err(|e| e.in_field(variant))
            }
            (TypeDef::Struct(_), other) => Err(CodecError::mismatch(
                format!("struct `{name}`"),
                other.kind_name(),
            )),
            (TypeDef::Enum(_), other) => Err(CodecError::mismatch(
                format!("enum `{name}`"),
                other.kind_name(),
            )),
        }
    }

    fn encode_fields_at(&self, w: &mut ByteWriter, fields: &Fields, defs: &[FieldDef], depth: usize) -> Result<()> {
        if let Some(extra) = fields.names().find(|n| !defs.iter().any(|d| d.name == *n)) {
            return Err(CodecError::invalid_value(format!("unexpected field `{extra}`")));
        }
        for def in defs {
            let value = fields.get(&def.name).ok_or_else(|| CodecError::MissingField {
                name: def.name.clone(),
            })?;
            self.encode_at(w, value, &def.ty, depth)
                .map_err(|e| e.in_field(&def.name))?;
        }
        Ok(())
    }

    fn decode_at(&self, r: &mut ByteReader<'_>, ty: &TypeDescriptor, depth: usize) -> Result<Value> {
        self.check_depth(depth)?;
        let value = match ty {
            TypeDescriptor::Bool => Value::Bool(r.read_bool()?),
            TypeDescriptor::U8 => Value::U8(r.read_u8()?),
            TypeDescriptor::U16 => Value::U16(r.read_u16()?),
            TypeDescriptor::U32 => Value::U32(r.read_u32()?),
            TypeDescriptor::U64 => Value::U64(r.read_u64()?),
            TypeDescriptor::U128 => Value::U128(r.read_u128()?),
            TypeDescriptor::I8 => Value::I8(r.read_i8()?),
            TypeDescriptor::I16 => Value::I16(r.read_i16()?),
            TypeDescriptor::I32 => Value::I32(r.read_i32()?),
            TypeDescriptor::I64 => Value::I64(r.read_i64()?),
            TypeDescriptor::I128 => Value::I128(r.read_i128()?),
            TypeDescriptor::F32 => Value::F32(r.read_f32()?),
            TypeDescriptor::F64 => Value::F64(r.read_f64()?),
            TypeDescriptor::String => Value::String(r.read_string()?),
            TypeDescriptor::Bytes => Value::Bytes(r.read_bytes()?),
            TypeDescriptor::PublicKey => Value::PublicKey(r.read_pubkey()?),
            TypeDescriptor::Vec(inner) => {
                let min = inner.min_size(self.registry)?;
                let len = r.read_len(min)?;
                Self::check_zero_sized(inner, min, len)?;
                Value::List(self.decode_items(r, inner, len, depth)?)
            }
            TypeDescriptor::Array(inner, size) => {
                Value::List(self.decode_items(r, inner, *size as usize, depth)?)
            }
            TypeDescriptor::Option(inner) => {
                let offset = r.position();
                match r.read_u8()? {
                    0 => Value::Option(None),
                    1 => Value::Option(Some(Box::new(self.decode_at(r, inner, depth + 1)?))),
                    tag => return Err(CodecError::InvalidOptionTag { offset, tag }),
                }
            }
            TypeDescriptor::Defined(name) => self.decode_defined(r, name, depth)?,
        };
        Ok(value)
    }

    fn decode_items(&self, r: &mut ByteReader<'_>, inner: &TypeDescriptor, len: usize, depth: usize) -> Result<Vec<Value>> {
        let mut items = Vec::with_capacity(len.min(r.remaining()));
        for i in 0..len {
            let item = self
                .decode_at(r, inner, depth + 1)
                .map_err(|e| e.at_index(i))?;
            items.push(item);
        }
        Ok(items)
    }

    fn decode_defined(&self, r: &mut ByteReader<'_>, name: &str, depth: usize) -> Result<Value> {
        match self.registry.get(name)? {
            TypeDef::Struct(defs) => Ok(Value::Struct(self.decode_fields_at(r, defs, depth + 1)?)),
            TypeDef::Enum(variants) => {
                let offset = r.position();
                let index = r.read_u8()?;
                let variant = variants
                    .get(usize::from(index))
                    .ok_or_else(|| CodecError::InvalidEnumVariant {
                        type_name: name.to_string(),
                        index,
                        variant_count: variants.len(),
                        offset,
                    })?;
                let fields = self
                    .decode_fields_at(r, &variant.fields, depth + 1)
                    .map_err(|e| e.in_field(&variant.name))?;
                Ok(Value::Enum {
                    variant: variant.name.clone(),
                    fields,
                })
            }
        }
    }

    fn decode_fields_at(&self, r: &mut ByteReader<'_>, defs: &[FieldDef], depth: usize) -> Result<Fields> {
        let mut fields = Fields::with_capacity(defs.len());
        for def in defs {
            let value = self
                .decode_at(r, &def.ty, depth)
                .map_err(|e| e.in_field(&def.name))?;
            fields.insert(def.name.clone(), value);
        }
        Ok(fields)
    }
}

/// Encoder/decoder for user-defined types, without a discriminator.
#[derive(Debug, Clone)]
pub struct TypesCoder {
    registry: Arc<TypeRegistry>,
    config: CoderConfig,
}

impl TypesCoder {
    pub fn new(registry: Arc<TypeRegistry>, config: CoderConfig) -> Self {
        Self { registry, config }
    }

    fn coder(&self) -> TypeCoder<'_> {
        TypeCoder::with_config(&self.registry, self.config)
    }

    /// Encode a value of the named defined type.
    pub fn encode(&self, type_name: &str, value: &Value) -> Result<Vec<u8>> {
        self.registry.get(type_name)?;
        self.coder()
            .encode(value, &TypeDescriptor::defined(type_name))
    }

    /// Decode a value of the named defined type from the start of `data`.
    pub fn decode(&self, type_name: &str, data: &[u8]) -> Result<Value> {
        self.registry.get(type_name)?;
        let (value, _) = self
            .coder()
            .decode(data, &TypeDescriptor::defined(type_name))?;
        Ok(value)
    }

    /// Encoded size of the named type when it is fixed.
    pub fn size(&self, type_name: &str) -> Result<Option<usize>> {
        TypeDescriptor::defined(type_name).fixed_size(&self.registry)
    }
}

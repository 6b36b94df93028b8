//! Conversion between [`Value`] trees and JSON.
//!
//! Output is shape-directed and needs no schema. Input is type-directed:
//! the descriptor decides how each JSON node is read, so the same JSON
//! number can become a `u8` or an `i64`.

use serde_json::{Map, Number, Value as Json};

use crate::error::{CodecError, Result};
use crate::pubkey::Pubkey;
use crate::types::{FieldDef, TypeDef, TypeDescriptor, TypeRegistry};
use crate::value::{Fields, Value};

/// Render a value as JSON.
///
/// 128-bit integers are written as decimal strings, bytes as `0x` hex and
/// public keys as base58. Unit enum variants become their name; variants
/// with fields become `{"Variant": {..}}`.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Bool(v) => Json::Bool(*v),
        Value::U8(v) => Json::from(*v),
        Value::U16(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::U64(v) => Json::from(*v),
        Value::U128(v) => Json::String(v.to_string()),
        Value::I8(v) => Json::from(*v),
        Value::I16(v) => Json::from(*v),
        Value::I32(v) => Json::from(*v),
        Value::I64(v) => Json::from(*v),
        Value::I128(v) => Json::String(v.to_string()),
        Value::F32(v) => float(f64::from(*v)),
        Value::F64(v) => float(*v),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(format!("0x{}", crate::hex::encode(b))),
        Value::PublicKey(k) => Json::String(k.to_string()),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Option(None) => Json::Null,
        Value::Option(Some(inner)) => to_json(inner),
        Value::Struct(fields) => fields_to_json(fields),
        Value::Enum { variant, fields } if fields.is_empty() => Json::String(variant.clone()),
        Value::Enum { variant, fields } => {
            let mut map = Map::new();
            map.insert(variant.clone(), fields_to_json(fields));
            Json::Object(map)
        }
    }
}

/// Render named fields as a JSON object, keeping their order.
pub fn fields_to_json(fields: &Fields) -> Json {
    Json::Object(
        fields
            .iter()
            .map(|(name, value)| (name.to_string(), to_json(value)))
            .collect(),
    )
}

// NaN and infinities have no JSON form.
fn float(v: f64) -> Json {
    Number::from_f64(v).map_or(Json::Null, Json::Number)
}

/// Read a JSON node as a value of type `ty`.
pub fn from_json(json: &Json, ty: &TypeDescriptor, registry: &TypeRegistry) -> Result<Value> {
    let value = match ty {
        TypeDescriptor::Bool => Value::Bool(
            json.as_bool()
                .ok_or_else(|| expected("a boolean", json))?,
        ),
        TypeDescriptor::U8 => Value::U8(unsigned(json)?),
        TypeDescriptor::U16 => Value::U16(unsigned(json)?),
        TypeDescriptor::U32 => Value::U32(unsigned(json)?),
        TypeDescriptor::U64 => Value::U64(unsigned(json)?),
        TypeDescriptor::U128 => Value::U128(unsigned(json)?),
        TypeDescriptor::I8 => Value::I8(signed(json)?),
        TypeDescriptor::I16 => Value::I16(signed(json)?),
        TypeDescriptor::I32 => Value::I32(signed(json)?),
        TypeDescriptor::I64 => Value::I64(signed(json)?),
        TypeDescriptor::I128 => Value::I128(signed(json)?),
        TypeDescriptor::F32 => Value::F32(float_from(json)? as f32),
        TypeDescriptor::F64 => Value::F64(float_from(json)?),
        TypeDescriptor::String => Value::String(
            json.as_str()
                .ok_or_else(|| expected("a string", json))?
                .to_string(),
        ),
        TypeDescriptor::Bytes => Value::Bytes(bytes(json)?),
        TypeDescriptor::PublicKey => {
            let s = json.as_str().ok_or_else(|| expected("a public key string", json))?;
            Value::PublicKey(s.parse::<Pubkey>()?)
        }
        TypeDescriptor::Vec(inner) | TypeDescriptor::Array(inner, _) => {
            let items = json.as_array().ok_or_else(|| expected("an array", json))?;
            let items = items
                .iter()
                .enumerate()
                .map(|(i, item)| from_json(item, inner, registry).map_err(|e| e.at_index(i)))
                .collect::<Result<Vec<_>>>()?;
            Value::List(items)
        }
        TypeDescriptor::Option(inner) => match json {
            Json::Null => Value::none(),
            other => Value::Option(Some(Box::new(from_json(other, inner, registry)?))),
        },
        TypeDescriptor::Defined(name) => match registry.get(name)? {
            TypeDef::Struct(defs) => {
                let map = json.as_object().ok_or_else(|| expected("an object", json))?;
                Value::Struct(fields_from_map(map, defs, registry)?)
            }
            TypeDef::Enum(variants) => {
                let (variant, body) = match json {
                    Json::String(variant) => (variant.as_str(), None),
                    Json::Object(map) if map.len() == 1 => {
                        let (variant, body) = map.iter().next().ok_or_else(|| expected("a variant", json))?;
                        (variant.as_str(), Some(body))
                    }
                    other => return Err(expected("a variant name or {\"Variant\": {..}}", other)),
                };
                let def = variants
                    .iter()
                    .find(|v| v.name == variant)
                    .ok_or_else(|| CodecError::UnknownVariant {
                        type_name: name.clone(),
                        variant: variant.to_string(),
                    })?;
                let fields = match body {
                    None | Some(Json::Null) => Fields::new(),
                    Some(Json::Object(map)) => {
                        fields_from_map(map, &def.fields, registry).map_err(|e| e.in_field(variant))?
                    }
                    Some(other) => return Err(expected("an object", other).in_field(variant)),
                };
                Value::variant(variant, fields)
            }
        },
    };
    Ok(value)
}

/// Read a JSON object as the named fields `defs`.
///
/// Missing keys are an error; Option fields must be given as `null`.
pub fn fields_from_json(json: &Json, defs: &[FieldDef], registry: &TypeRegistry) -> Result<Fields> {
    let map = json.as_object().ok_or_else(|| expected("an object", json))?;
    fields_from_map(map, defs, registry)
}

fn fields_from_map(map: &Map<String, Json>, defs: &[FieldDef], registry: &TypeRegistry) -> Result<Fields> {
    if let Some(extra) = map.keys().find(|k| !defs.iter().any(|d| d.name == **k)) {
        return Err(CodecError::invalid_value(format!("unexpected field `{extra}`")));
    }
    let mut fields = Fields::with_capacity(defs.len());
    for def in defs {
        let json = map.get(&def.name).ok_or_else(|| CodecError::MissingField {
            name: def.name.clone(),
        })?;
        let value = from_json(json, &def.ty, registry).map_err(|e| e.in_field(&def.name))?;
        fields.insert(def.name.clone(), value);
    }
    Ok(fields)
}

fn expected(what: &str, found: &Json) -> CodecError {
    CodecError::invalid_value(format!("expected {what}, found {found}"))
}

fn unsigned<T: TryFrom<u128>>(json: &Json) -> Result<T> {
    let wide: u128 = match json {
        Json::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| expected("an unsigned integer", json))?,
        Json::String(s) => s
            .parse()
            .map_err(|_| expected("an unsigned integer", json))?,
        other => return Err(expected("an unsigned integer", other)),
    };
    T::try_from(wide).map_err(|_| CodecError::invalid_value(format!("{wide} is out of range")))
}

fn signed<T: TryFrom<i128>>(json: &Json) -> Result<T> {
    let wide: i128 = match json {
        Json::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .ok_or_else(|| expected("an integer", json))?,
        Json::String(s) => s.parse().map_err(|_| expected("an integer", json))?,
        other => return Err(expected("an integer", other)),
    };
    T::try_from(wide).map_err(|_| CodecError::invalid_value(format!("{wide} is out of range")))
}

fn float_from(json: &Json) -> Result<f64> {
    match json {
        Json::Number(n) => n.as_f64().ok_or_else(|| expected("a number", json)),
        Json::String(s) => s.parse().map_err(|_| expected("a number", json)),
        other => Err(expected("a number", other)),
    }
}

fn bytes(json: &Json) -> Result<Vec<u8>> {
    match json {
        Json::String(s) => crate::hex::decode(s),
        Json::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| unsigned::<u8>(item).map_err(|e| e.at_index(i)))
            .collect(),
        other => Err(expected("a hex string or byte array", other)),
    }
}

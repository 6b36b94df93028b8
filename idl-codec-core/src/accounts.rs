//! Account data encoding and decoding.
//!
//! Account blobs are `[discriminator][struct body]`. Decoding by name
//! verifies the discriminator first; the body is only read on a match.
//! Bytes after the body are ignored, since accounts are often allocated
//! larger than their current contents.

use std::collections::HashMap;
use std::sync::Arc;

use base58::ToBase58;
use borsh::BorshDeserialize;
use serde::Serialize;

use crate::coder::TypeCoder;
use crate::config::CoderConfig;
use crate::discriminator::{self, Discriminator, ACCOUNT_NAMESPACE, DISCRIMINATOR_LEN};
use crate::error::{CodecError, Result};
use crate::idl::Idl;
use crate::reader::ByteReader;
use crate::types::{TypeDef, TypeDescriptor, TypeRegistry};
use crate::value::Value;
use crate::writer::ByteWriter;

#[derive(Debug, Clone)]
struct AccountLayout {
    name: String,
    discriminator: Discriminator,
}

/// RPC `memcmp` filter selecting accounts of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemcmpFilter {
    pub offset: usize,
    /// Base58-encoded discriminator.
    pub bytes: String,
}

/// Coder for the account types declared by an IDL.
#[derive(Debug, Clone)]
pub struct AccountsCoder {
    registry: Arc<TypeRegistry>,
    config: CoderConfig,
    accounts: Vec<AccountLayout>,
    by_discriminator: HashMap<Discriminator, usize>,
}

impl AccountsCoder {
    pub fn new(idl: &Idl, registry: Arc<TypeRegistry>, config: CoderConfig) -> Result<Self> {
        let mut accounts = Vec::with_capacity(idl.accounts.len());
        for account in &idl.accounts {
            match registry.get(&account.name).map_err(|e| e.in_field(&account.name))? {
                TypeDef::Struct(_) => {}
                TypeDef::Enum(_) => {
                    return Err(CodecError::invalid_idl(format!(
                        "account `{}` must be a struct",
                        account.name
                    )))
                }
            }
            let discriminator = match &account.discriminator {
                Some(bytes) => Discriminator::from_slice(bytes).map_err(|e| e.in_field(&account.name))?,
                None => Discriminator::compute(ACCOUNT_NAMESPACE, &account.name),
            };
            accounts.push(AccountLayout {
                name: account.name.clone(),
                discriminator,
            });
        }
        let by_discriminator = discriminator::index_by_discriminator(
            accounts.iter().map(|a| (a.name.as_str(), a.discriminator)),
        );
        Ok(Self {
            registry,
            config,
            accounts,
            by_discriminator,
        })
    }

    fn coder(&self) -> TypeCoder<'_> {
        TypeCoder::with_config(&self.registry, self.config)
    }

    fn layout(&self, name: &str) -> Result<&AccountLayout> {
        self.accounts
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| CodecError::UnknownAccount {
                name: name.to_string(),
            })
    }

    /// Declared account names, in IDL order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accounts.iter().map(|a| a.name.as_str())
    }

    pub fn discriminator(&self, name: &str) -> Result<Discriminator> {
        Ok(self.layout(name)?.discriminator)
    }

    /// Encode an account as `[discriminator][body]`.
    pub fn encode(&self, name: &str, value: &Value) -> Result<Vec<u8>> {
        let layout = self.layout(name)?;
        let mut writer = ByteWriter::new();
        writer.write_raw(layout.discriminator.as_bytes());
        self.coder()
            .encode_into(&mut writer, value, &TypeDescriptor::defined(name))?;
        Ok(writer.into_inner())
    }

    /// Decode account data, verifying it belongs to the named account type.
    pub fn decode(&self, name: &str, data: &[u8]) -> Result<Value> {
        let layout = self.layout(name)?;
        discriminator::verify(name, layout.discriminator, data)?;
        self.decode_body(name, data)
    }

    /// Identify the account type by discriminator and decode it.
    pub fn decode_any(&self, data: &[u8]) -> Result<(String, Value)> {
        let (disc, _) = Discriminator::split(data).ok_or(CodecError::Truncated {
            offset: 0,
            needed: DISCRIMINATOR_LEN,
            remaining: data.len(),
        })?;
        let index = self
            .by_discriminator
            .get(&disc)
            .ok_or(CodecError::UnknownDiscriminator { discriminator: disc })?;
        let name = &self.accounts[*index].name;
        Ok((name.clone(), self.decode_body(name, data)?))
    }

    /// Decode into a compile-time type after verifying the discriminator.
    pub fn decode_typed<T: BorshDeserialize>(&self, name: &str, data: &[u8]) -> Result<T> {
        let layout = self.layout(name)?;
        let mut body = discriminator::verify(name, layout.discriminator, data)?;
        T::deserialize(&mut body).map_err(|e| CodecError::Borsh {
            message: e.to_string(),
        })
    }

    /// Decode the body of an already verified payload. Offsets in errors
    /// count from the start of the payload.
    fn decode_body(&self, name: &str, data: &[u8]) -> Result<Value> {
        let mut reader = ByteReader::new(data);
        reader.read_raw(DISCRIMINATOR_LEN)?;
        self.coder()
            .decode_from(&mut reader, &TypeDescriptor::defined(name))
    }

    /// Total account size including the discriminator, when fixed.
    pub fn size(&self, name: &str) -> Result<Option<usize>> {
        self.layout(name)?;
        Ok(TypeDescriptor::defined(name)
            .fixed_size(&self.registry)?
            .map(|body| DISCRIMINATOR_LEN + body))
    }

    /// Filter matching accounts of the named type by their discriminator.
    pub fn memcmp_filter(&self, name: &str) -> Result<MemcmpFilter> {
        let disc = self.discriminator(name)?;
        Ok(MemcmpFilter {
            offset: 0,
            bytes: disc.as_bytes().to_base58(),
        })
    }
}

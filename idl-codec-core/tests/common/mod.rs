//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use idl_codec_core::idl::Idl;
use idl_codec_core::pubkey::Pubkey;
use idl_codec_core::value::{Fields, Value};
use idl_codec_core::IdlCoder;

pub const MARKET_IDL: &str = include_str!("../fixtures/market.json");

pub fn market_idl() -> Idl {
    Idl::from_json(MARKET_IDL).unwrap()
}

pub fn market_coder() -> IdlCoder {
    IdlCoder::new(&market_idl()).unwrap()
}

pub fn key(seed: u8) -> Pubkey {
    Pubkey([seed; 32])
}

pub fn item(price: u64, qty: u16, memo: Option<&str>) -> Value {
    Value::Struct(
        Fields::new()
            .with("price", price)
            .with("qty", qty)
            .with("memo", memo),
    )
}

pub fn order(id: u64, items: Vec<Value>) -> Value {
    Value::Struct(
        Fields::new()
            .with("id", id)
            .with("owner", key(7))
            .with("items", Value::List(items)),
    )
}

pub fn test_account(amount: u32, name: &str) -> Value {
    Value::Struct(Fields::new().with("amount", amount).with("name", name))
}

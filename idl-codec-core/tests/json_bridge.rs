//! Type-directed JSON input and shape-directed JSON output.

mod common;

use common::{key, market_coder};
use idl_codec_core::error::CodecError;
use idl_codec_core::json::{fields_from_json, from_json, to_json};
use idl_codec_core::types::TypeDescriptor;
use idl_codec_core::value::Value;
use serde_json::json;

#[test]
fn test_instruction_args_from_json() {
    let coder = market_coder();
    let defs = coder.instructions().args("placeOrder").unwrap();
    let owner = key(7).to_string();
    let input = json!({
        "order": {
            "id": "18446744073709551615",
            "owner": owner,
            "items": [
                { "price": 10, "qty": 2, "memo": "hi" },
                { "price": 11, "qty": 3, "memo": null }
            ]
        },
        "side": "Ask"
    });
    let args = fields_from_json(&input, defs, coder.registry()).unwrap();
    let data = coder.instructions().encode("placeOrder", &args).unwrap();
    let decoded = coder.instructions().decode("placeOrder", &data).unwrap();
    assert_eq!(decoded, args);

    let order = decoded.get("order").unwrap();
    assert_eq!(order.get("id"), Some(&Value::U64(u64::MAX)));
    assert_eq!(order.get("owner"), Some(&Value::PublicKey(key(7))));
}

#[test]
fn test_decoded_value_to_json() {
    let coder = market_coder();
    let value = from_json(
        &json!({
            "authority": key(1).to_string(),
            "side": "Bid",
            "best_bid": null,
            "ticks": [1, 2, 3, 4],
            "origin": { "x": -1, "y": 2 }
        }),
        &TypeDescriptor::defined("Market"),
        coder.registry(),
    )
    .unwrap();
    let data = coder.accounts().encode("Market", &value).unwrap();
    let decoded = coder.accounts().decode("Market", &data).unwrap();

    assert_eq!(
        to_json(&decoded),
        json!({
            "authority": key(1).to_string(),
            "side": "Bid",
            "best_bid": null,
            "ticks": [1, 2, 3, 4],
            "origin": { "x": -1, "y": 2 }
        })
    );
}

#[test]
fn test_enum_with_fields_json_shape() {
    let coder = market_coder();
    let shape = json!({ "Rect": { "w": 2, "h": 3 } });
    let value = from_json(&shape, &TypeDescriptor::defined("Shape"), coder.registry()).unwrap();
    assert_eq!(to_json(&value), shape);

    let unit = from_json(&json!("Empty"), &TypeDescriptor::defined("Shape"), coder.registry()).unwrap();
    assert_eq!(unit, Value::unit("Empty"));

    let err = from_json(&json!("Hexagon"), &TypeDescriptor::defined("Shape"), coder.registry())
        .unwrap_err();
    assert!(matches!(err, CodecError::UnknownVariant { .. }));
}

#[test]
fn test_json_errors_carry_paths() {
    let coder = market_coder();
    let defs = coder.instructions().args("initialize").unwrap();

    let err = fields_from_json(&json!({ "amount": "lots", "name": "x" }), defs, coder.registry())
        .unwrap_err();
    assert_eq!(err.path(), Some("amount"));
    assert!(matches!(err.root(), CodecError::InvalidValue { .. }));

    let err = fields_from_json(&json!({ "amount": 1 }), defs, coder.registry()).unwrap_err();
    assert!(matches!(err, CodecError::MissingField { .. }));

    let err = fields_from_json(&json!({ "amount": 1, "name": "x", "extra": 0 }), defs, coder.registry())
        .unwrap_err();
    assert!(matches!(err, CodecError::InvalidValue { .. }));

    let err = from_json(
        &json!({ "id": 1, "owner": "not-a-key", "items": [] }),
        &TypeDescriptor::defined("Order"),
        coder.registry(),
    )
    .unwrap_err();
    assert_eq!(err.path(), Some("owner"));
}

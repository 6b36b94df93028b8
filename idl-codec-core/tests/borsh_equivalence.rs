//! The dynamic codec must produce the same bytes as borsh-derived types.

mod common;

use borsh::{BorshDeserialize, BorshSerialize};
use common::{item, key, market_coder, order};
use idl_codec_core::pubkey::Pubkey;
use idl_codec_core::value::{Fields, Value};

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq)]
enum Side {
    Bid,
    Ask,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq)]
enum Shape {
    Circle { radius: u32 },
    Rect { w: u16, h: u16 },
    Empty,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq)]
struct Item {
    price: u64,
    qty: u16,
    memo: Option<String>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq)]
struct Order {
    id: u64,
    owner: Pubkey,
    items: Vec<Item>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq)]
struct Market {
    authority: Pubkey,
    side: Side,
    best_bid: Option<u64>,
    ticks: [u16; 4],
    origin: Point,
}

#[test]
fn test_struct_matches_borsh() {
    let coder = market_coder();
    let value = Value::Struct(Fields::new().with("x", -5i32).with("y", 1_000_000i32));
    let ours = coder.types().encode("Point", &value).unwrap();
    assert_eq!(ours, borsh::to_vec(&Point { x: -5, y: 1_000_000 }).unwrap());
}

#[test]
fn test_enums_match_borsh() {
    let coder = market_coder();
    let cases = [
        (
            Value::variant("Circle", Fields::new().with("radius", 12u32)),
            Shape::Circle { radius: 12 },
        ),
        (
            Value::variant("Rect", Fields::new().with("w", 3u16).with("h", 4u16)),
            Shape::Rect { w: 3, h: 4 },
        ),
        (Value::unit("Empty"), Shape::Empty),
    ];
    for (value, typed) in cases {
        let ours = coder.types().encode("Shape", &value).unwrap();
        assert_eq!(ours, borsh::to_vec(&typed).unwrap(), "{value}");
        assert_eq!(Shape::try_from_slice(&ours).unwrap(), typed);
    }
}

#[test]
fn test_nested_vec_and_options_match_borsh() {
    let coder = market_coder();
    let value = order(
        77,
        vec![item(1, 2, Some("abc")), item(u64::MAX, 0, None), item(3, 9, Some(""))],
    );
    let typed = Order {
        id: 77,
        owner: key(7),
        items: vec![
            Item {
                price: 1,
                qty: 2,
                memo: Some("abc".into()),
            },
            Item {
                price: u64::MAX,
                qty: 0,
                memo: None,
            },
            Item {
                price: 3,
                qty: 9,
                memo: Some(String::new()),
            },
        ],
    };
    let ours = coder.types().encode("Order", &value).unwrap();
    assert_eq!(ours, borsh::to_vec(&typed).unwrap());
    assert_eq!(coder.types().decode("Order", &ours).unwrap(), value);
}

#[test]
fn test_account_with_array_decodes_typed() {
    let coder = market_coder();
    let typed = Market {
        authority: key(1),
        side: Side::Ask,
        best_bid: Some(1500),
        ticks: [1, 2, 3, 4],
        origin: Point { x: 0, y: -1 },
    };
    let mut data = coder
        .accounts()
        .discriminator("Market")
        .unwrap()
        .0
        .to_vec();
    data.extend(borsh::to_vec(&typed).unwrap());

    let value = coder.accounts().decode("Market", &data).unwrap();
    assert_eq!(value.get("side"), Some(&Value::unit("Ask")));
    assert_eq!(value.get("best_bid"), Some(&Value::some(1500u64)));
    assert_eq!(value.get("ticks"), Some(&Value::list([1u16, 2, 3, 4])));

    let back = coder.accounts().encode("Market", &value).unwrap();
    assert_eq!(back, data);
    let decoded: Market = coder.accounts().decode_typed("Market", &data).unwrap();
    assert_eq!(decoded, typed);
}

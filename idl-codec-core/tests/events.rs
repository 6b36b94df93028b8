//! Event payload decoding and program log parsing.

mod common;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::{key, market_coder};
use idl_codec_core::discriminator::{Discriminator, EVENT_NAMESPACE};
use idl_codec_core::error::{CodecError, ErrorKind};
use idl_codec_core::value::{Fields, Value};

const PROGRAM: &str = "Mrkt111111111111111111111111111111111111111";
const OTHER: &str = "Othr111111111111111111111111111111111111111";

fn order_placed(order_id: u64, price: u64) -> Fields {
    Fields::new()
        .with("order_id", order_id)
        .with("price", price)
        .with("side", Value::unit("Ask"))
}

#[test]
fn test_event_round_trip() {
    let coder = market_coder();
    let payload = coder
        .events()
        .encode("OrderPlaced", &order_placed(1, 250))
        .unwrap();
    let raw = STANDARD.decode(&payload).unwrap();
    assert_eq!(
        raw[..8],
        Discriminator::compute(EVENT_NAMESPACE, "OrderPlaced").0
    );
    assert_eq!(raw.len(), 8 + 8 + 8 + 1);

    let event = coder.events().decode(&payload).unwrap().unwrap();
    assert_eq!(event.name, "OrderPlaced");
    assert_eq!(event.data, order_placed(1, 250));
    assert_eq!(event.to_string(), "OrderPlaced { order_id: 1, price: 250, side: Ask }");
}

#[test]
fn test_non_event_payloads_decode_to_none() {
    let coder = market_coder();
    let events = coder.events();

    assert!(events.decode("not base64 at all!").unwrap().is_none());
    // Three bytes: shorter than a discriminator.
    assert!(events.decode("AQID").unwrap().is_none());
    assert!(events.decode("").unwrap().is_none());
    let unknown = STANDARD.encode([0u8; 16]);
    assert!(events.decode(&unknown).unwrap().is_none());
    assert!(events.decode_bytes(&[1, 2, 3, 4, 5, 6, 7]).unwrap().is_none());
}

#[test]
fn test_matched_event_with_bad_body_is_error() {
    let coder = market_coder();
    let payload = coder
        .events()
        .encode("OrderPlaced", &order_placed(1, 2))
        .unwrap();
    let mut raw = STANDARD.decode(&payload).unwrap();

    let err = coder.events().decode_bytes(&raw[..12]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncation);
    assert_eq!(err.path(), Some("OrderPlaced.order_id"));

    let last = raw.len() - 1;
    raw[last] = 5;
    let err = coder.events().decode_bytes(&raw).unwrap_err();
    assert!(matches!(err.root(), CodecError::InvalidEnumVariant { index: 5, .. }));
    assert_eq!(err.path(), Some("OrderPlaced.side"));
}

#[test]
fn test_event_encode_rejects_unknown_event() {
    let coder = market_coder();
    let err = coder.events().encode("Nope", &Fields::new()).unwrap_err();
    assert!(matches!(err, CodecError::UnknownEvent { .. }));
}

#[test]
fn test_parse_logs_tracks_invocation_stack() {
    let coder = market_coder();
    let placed = coder
        .events()
        .encode("OrderPlaced", &order_placed(3, 99))
        .unwrap();
    let closed = coder
        .events()
        .encode("MarketClosed", &Fields::new().with("market", key(4)))
        .unwrap();

    let logs = vec![
        format!("Program {PROGRAM} invoke [1]"),
        "Program log: Instruction: PlaceOrder".to_string(),
        format!("Program data: {placed}"),
        format!("Program {OTHER} invoke [2]"),
        // Same bytes logged by a CPI callee must not be attributed to us.
        format!("Program data: {placed}"),
        format!("Program {OTHER} consumed 1200 of 190000 compute units"),
        format!("Program {OTHER} success"),
        format!("Program log: {closed}"),
        format!("Program {PROGRAM} consumed 9000 of 200000 compute units"),
        format!("Program {PROGRAM} success"),
        format!("Program data: {placed}"),
    ];

    let parser = coder.event_parser();
    let events = parser
        .parse_logs(PROGRAM, logs.iter().map(String::as_str))
        .unwrap();
    let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["OrderPlaced", "MarketClosed"]);
    assert_eq!(events[1].data.get("market"), Some(&Value::PublicKey(key(4))));
}

#[test]
fn test_parse_logs_tolerates_unbalanced_exits() {
    let coder = market_coder();
    let placed = coder
        .events()
        .encode("OrderPlaced", &order_placed(8, 1))
        .unwrap();
    let logs = [
        format!("Program {OTHER} success"),
        format!("Program {PROGRAM} invoke [1]"),
        format!("Program data: {placed}"),
        format!("Program {PROGRAM} failed: custom program error: 0x1770"),
    ];
    let events = coder
        .event_parser()
        .parse_logs(PROGRAM, logs.iter().map(String::as_str))
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data.get("order_id"), Some(&Value::U64(8)));
}

#[test]
fn test_parse_logs_propagates_malformed_event() {
    let coder = market_coder();
    let payload = coder
        .events()
        .encode("OrderPlaced", &order_placed(1, 1))
        .unwrap();
    let raw = STANDARD.decode(&payload).unwrap();
    let truncated = STANDARD.encode(&raw[..10]);
    let logs = [
        format!("Program {PROGRAM} invoke [1]"),
        format!("Program data: {truncated}"),
    ];
    let result = coder
        .event_parser()
        .parse_logs(PROGRAM, logs.iter().map(String::as_str));
    assert!(result.is_err());
}

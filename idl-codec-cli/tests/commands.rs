//! The library functions behind each subcommand, run against the shared
//! market fixture.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use idl_codec_cli::{cli, inspect, parse, serialize, CliError};
use idl_codec_core::config::CoderConfig;
use idl_codec_core::value::{Fields, Value};
use idl_codec_core::IdlCoder;
use serde_json::json;

const PROGRAM: &str = "Mrkt111111111111111111111111111111111111111";

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../idl-codec-core/tests/fixtures/market.json")
}

fn coder() -> IdlCoder {
    parse::load_coder(&fixture_path(), CoderConfig::default())
        .unwrap()
        .1
}

#[test]
fn test_idl_summary() {
    let (idl, coder) = parse::load_coder(&fixture_path(), CoderConfig::default()).unwrap();
    let summary = cli::idl_summary(&idl, &coder).unwrap();

    assert_eq!(summary["name"], "market");
    assert_eq!(summary["instructions"][0]["name"], "initialize");
    assert_eq!(
        summary["instructions"][0]["discriminator"],
        "afaf6d1f0d989bed"
    );
    assert_eq!(summary["instructions"][0]["accounts"][0]["flags"], json!(["mut", "signer"]));
    assert_eq!(summary["instructions"][1]["args"][0]["type"], "Order");
    assert_eq!(summary["accounts"][2]["name"], "Counter");
    assert_eq!(summary["accounts"][2]["size"], 17);
    assert_eq!(summary["accounts"][0]["size"], json!(null));
    assert_eq!(summary["types"][0]["size"], 8);
    assert_eq!(summary["errors"][0]["code"], 6000);
}

#[test]
fn test_discriminator_report() {
    let report = cli::discriminator_report("account", "TestAccount");
    assert_eq!(report["preimage"], "account:TestAccount");
    assert_eq!(report["hex"], "c8d0f975c52a14ff");
    assert_eq!(report["bytes"], json!([200, 208, 249, 117, 197, 42, 20, 255]));
}

#[test]
fn test_encode_then_decode_instruction() {
    let coder = coder();
    let data = serialize::encode_instruction(&coder, "initialize", r#"{"amount": 42, "name": "test"}"#)
        .unwrap();
    assert_eq!(
        idl_codec_core::hex::encode(&data),
        "afaf6d1f0d989bed2a0000000400000074657374"
    );

    let decoded = inspect::decode_instruction(&coder, &data).unwrap();
    assert_eq!(
        decoded,
        json!({ "instruction": "initialize", "args": { "amount": 42, "name": "test" } })
    );
}

#[test]
fn test_encode_rejects_bad_arguments() {
    let coder = coder();
    let err = serialize::encode_instruction(&coder, "initialize", "{not json").unwrap_err();
    assert!(matches!(err, CliError::Json { .. }));

    let err = serialize::encode_instruction(&coder, "initialize", r#"{"amount": 1}"#).unwrap_err();
    assert!(matches!(err, CliError::Codec(_)));

    let err = serialize::encode_instruction(&coder, "launch", "{}").unwrap_err();
    assert!(err.to_string().contains("unknown instruction `launch`"));
}

#[test]
fn test_decode_unknown_instruction_is_error() {
    let coder = coder();
    let err = inspect::decode_instruction(&coder, &[0; 8]).unwrap_err();
    assert!(matches!(err, CliError::Input { .. }));
}

#[test]
fn test_decode_account_from_hex_and_base64() {
    let coder = coder();
    let value = Value::Struct(Fields::new().with("count", 5u64).with("bump", 1u8));
    let bytes = coder.accounts().encode("Counter", &value).unwrap();

    let from_hex = parse::decode_data(&format!("0x{}", idl_codec_core::hex::encode(&bytes)), false).unwrap();
    let from_b64 = parse::decode_data(&STANDARD.encode(&bytes), true).unwrap();
    assert_eq!(from_hex, bytes);
    assert_eq!(from_b64, bytes);

    let report = inspect::decode_account(&coder, &bytes, None).unwrap();
    assert_eq!(report["account"], "Counter");
    assert_eq!(report["data"], json!({ "count": 5, "bump": 1 }));

    let err = inspect::decode_account(&coder, &bytes, Some("TestAccount")).unwrap_err();
    assert!(err.to_string().contains("discriminator mismatch"));
}

#[test]
fn test_bad_payload_input() {
    assert!(matches!(
        parse::decode_data("abc", false),
        Err(CliError::Input { .. })
    ));
    assert!(matches!(
        parse::decode_data("***", true),
        Err(CliError::Input { .. })
    ));
}

#[test]
fn test_decode_event_and_logs() {
    let coder = coder();
    let payload = coder
        .events()
        .encode(
            "OrderPlaced",
            &Fields::new()
                .with("order_id", 1u64)
                .with("price", 2u64)
                .with("side", Value::unit("Bid")),
        )
        .unwrap();

    let event = inspect::decode_event(&coder, &payload).unwrap();
    assert_eq!(event["event"], "OrderPlaced");
    assert_eq!(event["data"]["side"], "Bid");
    assert_eq!(inspect::decode_event(&coder, "AQID").unwrap(), json!(null));

    let logs = format!(
        "Program {PROGRAM} invoke [1]\nProgram data: {payload}\nProgram {PROGRAM} success\nProgram data: {payload}\n"
    );
    let dir = std::env::temp_dir().join(format!("idl-codec-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("logs.txt");
    std::fs::write(&file, logs).unwrap();

    let lines = parse::read_lines(Some(&file)).unwrap();
    let events = inspect::parse_logs(&coder, PROGRAM, lines.iter().map(String::as_str)).unwrap();
    assert_eq!(events.as_array().map(Vec::len), Some(1));
    assert_eq!(events[0]["data"]["order_id"], 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_idl_file_names_path() {
    let err = parse::load_idl(Path::new("/nonexistent/idl.json")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/idl.json"));
}

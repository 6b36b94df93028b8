//! Payload inspection: decode raw data into JSON reports.

use idl_codec_core::json::{fields_to_json, to_json};
use idl_codec_core::IdlCoder;
use serde_json::{json, Value as Json};

use crate::error::CliError;

/// Decode instruction data, identifying the instruction by discriminator.
pub fn decode_instruction(coder: &IdlCoder, data: &[u8]) -> Result<Json, CliError> {
    let decoded = coder.instructions().decode_any(data)?.ok_or_else(|| {
        CliError::input(
            "instruction data",
            "discriminator matches no instruction in the IDL",
        )
    })?;
    Ok(json!({
        "instruction": decoded.name,
        "args": fields_to_json(&decoded.args),
    }))
}

/// Decode account data, either as the named account or by discriminator.
pub fn decode_account(coder: &IdlCoder, data: &[u8], name: Option<&str>) -> Result<Json, CliError> {
    let (name, value) = match name {
        Some(name) => (name.to_string(), coder.accounts().decode(name, data)?),
        None => coder.accounts().decode_any(data)?,
    };
    Ok(json!({
        "account": name,
        "discriminator": coder.accounts().discriminator(&name)?.to_string(),
        "data": to_json(&value),
    }))
}

/// Decode one base64 event payload. Non-events decode to `null`.
pub fn decode_event(coder: &IdlCoder, payload: &str) -> Result<Json, CliError> {
    Ok(match coder.events().decode(payload)? {
        Some(event) => json!({
            "event": event.name,
            "data": fields_to_json(&event.data),
        }),
        None => Json::Null,
    })
}

/// Extract every event emitted by `program_id` from transaction logs.
pub fn parse_logs<'l>(
    coder: &IdlCoder,
    program_id: &str,
    lines: impl IntoIterator<Item = &'l str>,
) -> Result<Json, CliError> {
    let events = coder.event_parser().parse_logs(program_id, lines)?;
    Ok(Json::Array(
        events
            .iter()
            .map(|event| {
                json!({
                    "event": event.name,
                    "data": fields_to_json(&event.data),
                })
            })
            .collect(),
    ))
}

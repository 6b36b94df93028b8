//! Instruction data encoding from JSON arguments.

use idl_codec_core::json::fields_from_json;
use idl_codec_core::IdlCoder;

use crate::error::CliError;
use crate::parse::parse_json;

/// Encode instruction data from a JSON object of named arguments.
///
/// The object must name every declared argument; options take `null`.
pub fn encode_instruction(coder: &IdlCoder, instruction: &str, args_json: &str) -> Result<Vec<u8>, CliError> {
    let defs = coder.instructions().args(instruction)?;
    let json = parse_json(args_json, &format!("`{instruction}` arguments"))?;
    let args = fields_from_json(&json, defs, coder.registry())?;
    Ok(coder.instructions().encode(instruction, &args)?)
}

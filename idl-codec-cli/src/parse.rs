//! Loading IDL files and reading payloads from the command line.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use idl_codec_core::config::CoderConfig;
use idl_codec_core::idl::Idl;
use idl_codec_core::IdlCoder;
use tracing::debug;

use crate::error::CliError;

/// Read and parse an IDL JSON file.
pub fn load_idl(path: &Path) -> Result<Idl, CliError> {
    let json = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    Idl::from_json(&json).map_err(|source| CliError::Idl {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an IDL and build its coder, validating every type reference.
pub fn load_coder(path: &Path, config: CoderConfig) -> Result<(Idl, IdlCoder), CliError> {
    let idl = load_idl(path)?;
    let coder = IdlCoder::with_config(&idl, config).map_err(|source| CliError::Idl {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), program = idl.program_name(), "loaded IDL");
    Ok((idl, coder))
}

/// Decode a payload given as hex (optionally `0x`-prefixed) or base64.
pub fn decode_data(raw: &str, base64: bool) -> Result<Vec<u8>, CliError> {
    let raw = raw.trim();
    if base64 {
        STANDARD
            .decode(raw)
            .map_err(|e| CliError::input("base64 data", e.to_string()))
    } else {
        idl_codec_core::hex::decode(raw).map_err(|e| CliError::input("hex data", e.to_string()))
    }
}

/// Read log lines from a file, or from stdin when the path is absent or `-`.
pub fn read_lines(path: Option<&Path>) -> Result<Vec<String>, CliError> {
    match path {
        Some(path) if path != Path::new("-") => {
            let text = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
            Ok(text.lines().map(str::to_owned).collect())
        }
        _ => io::stdin()
            .lock()
            .lines()
            .collect::<Result<_, _>>()
            .map_err(CliError::Stdin),
    }
}

/// Parse a JSON document given on the command line.
pub fn parse_json(raw: &str, what: &str) -> Result<serde_json::Value, CliError> {
    serde_json::from_str(raw).map_err(|source| CliError::Json {
        what: what.to_string(),
        source,
    })
}

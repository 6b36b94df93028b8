use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use idl_codec_cli::{cli, inspect, parse, serialize, CliError};
use idl_codec_core::config::{CoderConfig, DEFAULT_MAX_DEPTH};
use idl_codec_core::hex;
use serde_json::Value as Json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "idl-codec", version, about = "Encode and decode program data using its IDL")]
struct Cli {
    /// Maximum type nesting accepted while encoding or decoding.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

/// How a binary payload is given on the command line.
#[derive(Args, Debug)]
struct DataArgs {
    /// Payload as hex (with or without `0x`), or base64 with `--base64`.
    data: String,

    /// Treat the payload as base64 instead of hex.
    #[arg(long)]
    base64: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize an IDL with discriminators and fixed sizes.
    Idl {
        /// IDL JSON file.
        idl: PathBuf,
    },
    /// Compute the discriminator of `<NAMESPACE>:<NAME>`.
    ///
    /// Instruction names are hashed as given; pass the snake_case form
    /// with the `global` namespace.
    Discriminator { namespace: String, name: String },
    /// Encode instruction data from JSON arguments and print it as hex.
    EncodeIx {
        idl: PathBuf,
        instruction: String,
        /// JSON object of named arguments.
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Decode instruction data.
    DecodeIx {
        idl: PathBuf,
        #[command(flatten)]
        data: DataArgs,
    },
    /// Decode account data.
    DecodeAccount {
        idl: PathBuf,
        #[command(flatten)]
        data: DataArgs,
        /// Expected account type. Identified by discriminator when omitted.
        #[arg(long)]
        name: Option<String>,
    },
    /// Decode a base64 event payload from a `Program data:` log line.
    DecodeEvent { idl: PathBuf, payload: String },
    /// Extract a program's events from transaction log lines.
    ParseLogs {
        idl: PathBuf,
        /// Program whose events are extracted.
        #[arg(long)]
        program: String,
        /// Log file, one line per entry. Reads stdin when omitted or `-`.
        file: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CoderConfig {
        max_depth: cli.max_depth,
    };

    match run(cli.command, config) {
        Ok(output) => {
            match output {
                Json::String(s) => println!("{s}"),
                other => match serde_json::to_string_pretty(&other) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        return ExitCode::FAILURE;
                    }
                },
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: CoderConfig) -> Result<Json, CliError> {
    match command {
        Commands::Idl { idl } => {
            let (idl, coder) = parse::load_coder(&idl, config)?;
            cli::idl_summary(&idl, &coder)
        }
        Commands::Discriminator { namespace, name } => {
            Ok(cli::discriminator_report(&namespace, &name))
        }
        Commands::EncodeIx {
            idl,
            instruction,
            args,
        } => {
            let (_, coder) = parse::load_coder(&idl, config)?;
            let data = serialize::encode_instruction(&coder, &instruction, &args)?;
            Ok(Json::String(hex::encode(&data)))
        }
        Commands::DecodeIx { idl, data } => {
            let (_, coder) = parse::load_coder(&idl, config)?;
            let bytes = parse::decode_data(&data.data, data.base64)?;
            inspect::decode_instruction(&coder, &bytes)
        }
        Commands::DecodeAccount { idl, data, name } => {
            let (_, coder) = parse::load_coder(&idl, config)?;
            let bytes = parse::decode_data(&data.data, data.base64)?;
            inspect::decode_account(&coder, &bytes, name.as_deref())
        }
        Commands::DecodeEvent { idl, payload } => {
            let (_, coder) = parse::load_coder(&idl, config)?;
            inspect::decode_event(&coder, &payload)
        }
        Commands::ParseLogs { idl, program, file } => {
            let (_, coder) = parse::load_coder(&idl, config)?;
            let lines = parse::read_lines(file.as_deref())?;
            inspect::parse_logs(&coder, &program, lines.iter().map(String::as_str))
        }
    }
}

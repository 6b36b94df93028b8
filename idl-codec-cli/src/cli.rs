//! CLI helpers: IDL summaries and type rendering.

use idl_codec_core::discriminator::Discriminator;
use idl_codec_core::idl::{Idl, IdlAccountItem, IdlType};
use idl_codec_core::types::TypeDescriptor;
use idl_codec_core::IdlCoder;
use serde_json::{json, Value as Json};

use crate::error::CliError;

/// Summarize an IDL: every instruction, account, event and type with its
/// discriminator and, where constant, its encoded size.
pub fn idl_summary(idl: &Idl, coder: &IdlCoder) -> Result<Json, CliError> {
    let mut instructions = Vec::with_capacity(idl.instructions.len());
    for ix in &idl.instructions {
        instructions.push(json!({
            "name": ix.name,
            "discriminator": coder.instructions().discriminator(&ix.name)?.to_string(),
            "args": ix.args.iter()
                .map(|a| json!({ "name": a.name, "type": idl_type_display(&a.type_) }))
                .collect::<Vec<_>>(),
            "accounts": account_items(&ix.accounts),
        }));
    }

    let mut accounts = Vec::with_capacity(idl.accounts.len());
    for account in &idl.accounts {
        accounts.push(json!({
            "name": account.name,
            "discriminator": coder.accounts().discriminator(&account.name)?.to_string(),
            "size": coder.accounts().size(&account.name)?,
        }));
    }

    let mut events = Vec::with_capacity(idl.events.len());
    for event in &idl.events {
        events.push(json!({
            "name": event.name,
            "discriminator": coder.events().discriminator(&event.name)?.to_string(),
        }));
    }

    let mut types = Vec::with_capacity(idl.types.len());
    for decl in &idl.types {
        types.push(json!({
            "name": decl.name,
            "kind": decl.type_.kind,
            "size": coder.types().size(&decl.name)?,
        }));
    }

    Ok(json!({
        "name": idl.program_name(),
        "version": idl.version,
        "instructions": instructions,
        "accounts": accounts,
        "events": events,
        "types": types,
        "errors": idl.errors,
    }))
}

fn account_items(items: &[IdlAccountItem]) -> Vec<Json> {
    items
        .iter()
        .map(|acc| {
            let mut flags = vec![];
            if acc.writable {
                flags.push("mut");
            }
            if acc.signer {
                flags.push("signer");
            }
            if acc.optional {
                flags.push("optional");
            }
            if acc.accounts.is_empty() {
                json!({ "name": acc.name, "flags": flags })
            } else {
                json!({ "name": acc.name, "accounts": account_items(&acc.accounts) })
            }
        })
        .collect()
}

/// Report the discriminator of `namespace:name` as hex and as a byte list.
pub fn discriminator_report(namespace: &str, name: &str) -> Json {
    let disc = Discriminator::compute(namespace, name);
    json!({
        "preimage": format!("{namespace}:{name}"),
        "hex": disc.to_string(),
        "bytes": disc.as_bytes(),
    })
}

/// Render an IDL type the way Rust spells it.
pub fn idl_type_display(ty: &IdlType) -> String {
    match TypeDescriptor::try_from(ty) {
        Ok(desc) => desc.to_string(),
        Err(_) => match ty {
            IdlType::Primitive(s) => s.clone(),
            IdlType::Vec { vec } => format!("Vec<{}>", idl_type_display(vec)),
            IdlType::Option { option } => format!("Option<{}>", idl_type_display(option)),
            IdlType::Defined { defined } => defined.name().to_string(),
            IdlType::Array { array } => format!("[{}; {}]", idl_type_display(&array.0), array.1),
            IdlType::Other(raw) => format!("unsupported({raw})"),
        },
    }
}

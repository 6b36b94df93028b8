//! Entry point bundling every coder for one IDL.

use std::sync::Arc;

use crate::accounts::AccountsCoder;
use crate::coder::TypesCoder;
use crate::config::CoderConfig;
use crate::error::Result;
use crate::events::{EventCoder, EventParser};
use crate::idl::Idl;
use crate::instructions::InstructionCoder;
use crate::types::TypeRegistry;

#[derive(Debug)]
struct Coders {
    registry: Arc<TypeRegistry>,
    accounts: AccountsCoder,
    instructions: InstructionCoder,
    events: EventCoder,
    types: TypesCoder,
}

/// Accounts, instruction, event and type coders for one program.
///
/// The registry is built and validated once; all coders share it. Cloning
/// is cheap and the coder can be shared across threads.
///
/// ```ignore
/// let idl = Idl::from_json(&std::fs::read_to_string("program.json")?)?;
/// let coder = IdlCoder::new(&idl)?;
/// let account = coder.accounts().decode("Vault", &data)?;
/// ```
#[derive(Debug, Clone)]
pub struct IdlCoder {
    inner: Arc<Coders>,
}

impl IdlCoder {
    pub fn new(idl: &Idl) -> Result<Self> {
        Self::with_config(idl, CoderConfig::default())
    }

    pub fn with_config(idl: &Idl, config: CoderConfig) -> Result<Self> {
        let registry = Arc::new(TypeRegistry::from_idl(idl)?);
        let inner = Coders {
            accounts: AccountsCoder::new(idl, Arc::clone(&registry), config)?,
            instructions: InstructionCoder::new(idl, Arc::clone(&registry), config)?,
            events: EventCoder::new(idl, Arc::clone(&registry), config)?,
            types: TypesCoder::new(Arc::clone(&registry), config),
            registry,
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn accounts(&self) -> &AccountsCoder {
        &self.inner.accounts
    }

    pub fn instructions(&self) -> &InstructionCoder {
        &self.inner.instructions
    }

    pub fn events(&self) -> &EventCoder {
        &self.inner.events
    }

    pub fn types(&self) -> &TypesCoder {
        &self.inner.types
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    /// Log parser over this program's events.
    pub fn event_parser(&self) -> EventParser<'_> {
        EventParser::new(self.events())
    }
}

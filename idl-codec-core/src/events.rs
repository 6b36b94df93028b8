//! Event decoding from base64 log payloads.
//!
//! Programs emit events as base64 `[discriminator][struct body]` in their
//! logs. A payload that is not valid base64, is shorter than a
//! discriminator, or matches no declared event is not an event and
//! decodes to `None`. A payload whose discriminator matches but whose
//! body is malformed is an error.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, trace};

use crate::coder::TypeCoder;
use crate::config::CoderConfig;
use crate::discriminator::{self, Discriminator, DISCRIMINATOR_LEN, EVENT_NAMESPACE};
use crate::error::{CodecError, Result};
use crate::idl::Idl;
use crate::reader::ByteReader;
use crate::types::{FieldDef, TypeDef, TypeRegistry};
use crate::value::Fields;
use crate::writer::ByteWriter;

/// Log prefix carrying event payloads.
pub const PROGRAM_DATA: &str = "Program data: ";
/// Log prefix of plain program messages, used for events by older programs.
pub const PROGRAM_LOG: &str = "Program log: ";

#[derive(Debug, Clone)]
struct EventLayout {
    name: String,
    discriminator: Discriminator,
}

/// A decoded event.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub name: String,
    pub data: Fields,
}

impl fmt::Display for DecodedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data)
    }
}

/// Coder for the events declared by an IDL.
#[derive(Debug, Clone)]
pub struct EventCoder {
    registry: Arc<TypeRegistry>,
    config: CoderConfig,
    events: Vec<EventLayout>,
    by_discriminator: HashMap<Discriminator, usize>,
}

impl EventCoder {
    pub fn new(idl: &Idl, registry: Arc<TypeRegistry>, config: CoderConfig) -> Result<Self> {
        let mut events = Vec::with_capacity(idl.events.len());
        for event in &idl.events {
            match registry.get(&event.name).map_err(|e| e.in_field(&event.name))? {
                TypeDef::Struct(_) => {}
                TypeDef::Enum(_) => {
                    return Err(CodecError::invalid_idl(format!(
                        "event `{}` must be a struct",
                        event.name
                    )))
                }
            }
            let discriminator = match &event.discriminator {
                Some(bytes) => Discriminator::from_slice(bytes).map_err(|e| e.in_field(&event.name))?,
                None => Discriminator::compute(EVENT_NAMESPACE, &event.name),
            };
            events.push(EventLayout {
                name: event.name.clone(),
                discriminator,
            });
        }
        let by_discriminator = discriminator::index_by_discriminator(
            events.iter().map(|e| (e.name.as_str(), e.discriminator)),
        );
        Ok(Self {
            registry,
            config,
            events,
            by_discriminator,
        })
    }

    fn coder(&self) -> TypeCoder<'_> {
        TypeCoder::with_config(&self.registry, self.config)
    }

    fn layout(&self, name: &str) -> Result<&EventLayout> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| CodecError::UnknownEvent {
                name: name.to_string(),
            })
    }

    fn fields(&self, name: &str) -> Result<&[FieldDef]> {
        match self.registry.get(name)? {
            TypeDef::Struct(fields) => Ok(fields),
            TypeDef::Enum(_) => Err(CodecError::invalid_idl(format!("event `{name}` must be a struct"))),
        }
    }

    /// Declared event names, in IDL order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.name.as_str())
    }

    pub fn discriminator(&self, name: &str) -> Result<Discriminator> {
        Ok(self.layout(name)?.discriminator)
    }

    /// Decode a base64 log payload.
    pub fn decode(&self, log: &str) -> Result<Option<DecodedEvent>> {
        match STANDARD.decode(log.trim()) {
            Ok(data) => self.decode_bytes(&data),
            Err(err) => {
                trace!(%err, "log payload is not base64");
                Ok(None)
            }
        }
    }

    /// Decode raw event bytes.
    pub fn decode_bytes(&self, data: &[u8]) -> Result<Option<DecodedEvent>> {
        let Some((disc, _)) = Discriminator::split(data) else {
            trace!(len = data.len(), "payload shorter than a discriminator");
            return Ok(None);
        };
        let Some(&index) = self.by_discriminator.get(&disc) else {
            trace!(discriminator = %disc, "no event matches");
            return Ok(None);
        };
        let name = &self.events[index].name;
        let mut reader = ByteReader::new(data);
        reader.read_raw(DISCRIMINATOR_LEN)?;
        let data = self
            .coder()
            .decode_fields(&mut reader, self.fields(name)?)
            .map_err(|e| e.in_field(name))?;
        Ok(Some(DecodedEvent {
            name: name.clone(),
            data,
        }))
    }

    /// Encode an event as it would appear in a `Program data:` log line.
    pub fn encode(&self, name: &str, data: &Fields) -> Result<String> {
        let layout = self.layout(name)?;
        let mut writer = ByteWriter::new();
        writer.write_raw(layout.discriminator.as_bytes());
        self.coder()
            .encode_fields(&mut writer, data, self.fields(name)?)?;
        Ok(STANDARD.encode(writer.as_slice()))
    }
}

/// Extracts the events of one program from transaction logs.
///
/// Tracks the invocation stack so that payloads logged by other programs,
/// including programs the target calls through CPI, are skipped.
#[derive(Debug, Clone, Copy)]
pub struct EventParser<'c> {
    coder: &'c EventCoder,
}

/// A log line as seen by the parser.
#[derive(Debug, PartialEq, Eq)]
enum LogLine<'l> {
    Invoke(&'l str),
    Exit(&'l str),
    Data(&'l str),
    Log(&'l str),
    Other,
}

impl<'l> LogLine<'l> {
    fn parse(line: &'l str) -> Self {
        if let Some(payload) = line.strip_prefix(PROGRAM_DATA) {
            return LogLine::Data(payload);
        }
        if let Some(message) = line.strip_prefix(PROGRAM_LOG) {
            return LogLine::Log(message);
        }
        let Some(rest) = line.strip_prefix("Program ") else {
            return LogLine::Other;
        };
        let mut words = rest.split_whitespace();
        match (words.next(), words.next()) {
            (Some(program), Some("invoke")) => LogLine::Invoke(program),
            (Some(program), Some("success")) | (Some(program), Some("failed:")) => {
                LogLine::Exit(program)
            }
            _ => LogLine::Other,
        }
    }
}

impl<'c> EventParser<'c> {
    pub fn new(coder: &'c EventCoder) -> Self {
        Self { coder }
    }

    /// Decode every event `program_id` emitted, in log order.
    pub fn parse_logs<'l, I>(&self, program_id: &str, logs: I) -> Result<Vec<DecodedEvent>>
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut stack: Vec<&'l str> = Vec::new();
        let mut events = Vec::new();
        for line in logs {
            match LogLine::parse(line) {
                LogLine::Invoke(program) => stack.push(program),
                LogLine::Exit(program) => {
                    if stack.last() == Some(&program) {
                        stack.pop();
                    } else {
                        debug!(program, depth = stack.len(), "exit without matching invoke");
                    }
                }
                LogLine::Data(payload) | LogLine::Log(payload) => {
                    if stack.last().copied() != Some(program_id) {
                        continue;
                    }
                    if let Some(event) = self.coder.decode(payload)? {
                        events.push(event);
                    }
                }
                LogLine::Other => {}
            }
        }
        Ok(events)
    }
}

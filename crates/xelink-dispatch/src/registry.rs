use std::collections::HashMap;
use std::fmt;

use tracing::{trace, warn};
use xelink_frame::{Frame, MessageType, Position, POSITION_PAYLOAD_LEN};

use crate::config::RegistryConfig;
use crate::error::{DispatchError, Result};

/// Payload length accepted for a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadLength {
    /// Exactly this many bytes.
    Exact(usize),
    /// Any length the frame can carry.
    Any,
}

impl PayloadLength {
    fn accepts(self, len: usize) -> bool {
        match self {
            PayloadLength::Exact(expected) => expected == len,
            PayloadLength::Any => true,
        }
    }
}

/// Outcome of a successful [`HandlerRegistry::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler ran for the frame.
    Handled,
    /// No handler is registered for the tag; the frame was skipped.
    Ignored,
}

type BoxedHandler = Box<dyn FnMut(&[u8]) -> Result<()> + Send>;

struct Entry {
    length: PayloadLength,
    handler: BoxedHandler,
}

/// Type-tag keyed table of payload lengths and handlers.
pub struct HandlerRegistry {
    entries: HashMap<u8, Entry>,
    config: RegistryConfig,
}

impl HandlerRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
        }
    }

    /// Register a raw payload handler for a type tag.
    pub fn register<F>(&mut self, msg_type: u8, length: PayloadLength, handler: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()> + Send + 'static,
    {
        if self.entries.contains_key(&msg_type) {
            return Err(DispatchError::DuplicateType(msg_type));
        }
        self.entries.insert(
            msg_type,
            Entry {
                length,
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    /// Register a handler for decoded position reports.
    pub fn register_position<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(Position) + Send + 'static,
    {
        self.register(
            MessageType::Position.as_u8(),
            PayloadLength::Exact(POSITION_PAYLOAD_LEN),
            move |payload| {
                handler(Position::from_payload(payload)?);
                Ok(())
            },
        )
    }

    /// Route a frame to the handler registered for its type.
    ///
    /// The handler only runs when the payload length matches the
    /// registration.
    pub fn dispatch(&mut self, frame: &Frame) -> Result<Dispatch> {
        let msg_type = frame.msg_type;
        let Some(entry) = self.entries.get_mut(&msg_type) else {
            if self.config.fail_on_unknown_type {
                return Err(DispatchError::UnknownType(msg_type));
            }
            warn!(msg_type, len = frame.payload.len(), "no handler for frame type");
            return Ok(Dispatch::Ignored);
        };

        let actual = frame.payload.len();
        if !entry.length.accepts(actual) {
            let expected = match entry.length {
                PayloadLength::Exact(expected) => expected,
                PayloadLength::Any => actual,
            };
            warn!(msg_type, expected, actual, "payload length mismatch");
            return Err(DispatchError::LengthMismatch {
                msg_type,
                expected,
                actual,
            });
        }

        (entry.handler)(frame.payload.as_ref())?;
        trace!(msg_type, len = actual, "frame dispatched");
        Ok(Dispatch::Handled)
    }

    /// Check if a type tag has a registered handler.
    pub fn has_handler(&self, msg_type: u8) -> bool {
        self.entries.contains_key(&msg_type)
    }

    /// Get the registered type tags.
    pub fn types(&self) -> Vec<u8> {
        let mut types: Vec<u8> = self.entries.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Payload length registered for a type tag.
    pub fn expected_len(&self, msg_type: u8) -> Option<PayloadLength> {
        self.entries.get(&msg_type).map(|entry| entry.length)
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("types", &self.types())
            .field("config", &self.config)
            .finish()
    }
}

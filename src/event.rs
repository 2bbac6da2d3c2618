//! Optional event emission.
//!
//! Any component can hold an [`EventEmission`] and emit events through it. No
//! bus attached means emission is a no-op returning `false`, so components
//! never need to know whether anyone is listening. Attaching a bus with
//! [`EventEmission::set_event_bus`] is the only way to opt in.
//!
//! Dispatch is synchronous: the bus is called on the emitting task, and any
//! error it returns comes straight back to the caller.

use serde_json::Value;
use std::{fmt, sync::Arc};

use crate::error::{Error, Result};

/// An event is either a bare tag or a name with a payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Named(String),
    Structured { name: String, payload: Value },
}

impl Event {
    pub fn new<N: Into<String>>(name: N, payload: Value) -> Self {
        Event::Structured {
            name: name.into(),
            payload,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Event::Named(name) => name,
            Event::Structured { name, .. } => name,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Event::Named(_) => None,
            Event::Structured { payload, .. } => Some(payload),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Named(name) => write!(f, "{}", name),
            Event::Structured { name, payload } => write!(f, "{}: {}", name, payload),
        }
    }
}

/// Conversion into an [`Event`], checked at emission time.
pub trait IntoEvent {
    fn into_event(self) -> Result<Event>;
}

impl IntoEvent for Event {
    fn into_event(self) -> Result<Event> {
        Ok(self)
    }
}

impl IntoEvent for &str {
    fn into_event(self) -> Result<Event> {
        Ok(Event::Named(self.to_string()))
    }
}

impl IntoEvent for String {
    fn into_event(self) -> Result<Event> {
        Ok(Event::Named(self))
    }
}

/// Accepts a JSON string (tag) or an object with a string `name` and a `payload`.
impl IntoEvent for Value {
    fn into_event(self) -> Result<Event> {
        match self {
            Value::String(name) => Ok(Event::Named(name)),
            Value::Object(mut map) => {
                let name = match map.remove("name") {
                    Some(Value::String(name)) => name,
                    _ => return Err(invalid_event(&Value::Object(map))),
                };
                match map.remove("payload") {
                    Some(payload) => Ok(Event::Structured { name, payload }),
                    None => Err(Error::invalid_argument(format!(
                        "structured event \"{}\" has no payload",
                        name
                    ))),
                }
            }
            other => Err(invalid_event(&other)),
        }
    }
}

fn invalid_event(value: &Value) -> Error {
    Error::invalid_argument(format!(
        "event must be a string or an object with \"name\" and \"payload\", got {}",
        value
    ))
}

/// Externally supplied receiver of events.
pub trait EventBus: Send + Sync {
    fn emit(&self, event: &Event) -> Result<()>;
}

/// Emission capability a component holds; optionally bound to an [`EventBus`].
#[derive(Clone, Default)]
pub struct EventEmission {
    bus: Option<Arc<dyn EventBus>>,
}

impl EventEmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bus(bus: Arc<dyn EventBus>) -> Self {
        Self { bus: Some(bus) }
    }

    pub fn event_bus(&self) -> Option<&Arc<dyn EventBus>> {
        self.bus.as_ref()
    }

    pub fn set_event_bus(&mut self, bus: Option<Arc<dyn EventBus>>) -> &mut Self {
        self.bus = bus;
        self
    }

    /// Emits one event. Returns `false` when no bus is attached.
    ///
    /// The event shape is checked even without a bus, so a bad event is
    /// always an [`Error::InvalidArgument`].
    pub fn emit<E: IntoEvent>(&self, event: E) -> Result<bool> {
        let event = event.into_event()?;
        match &self.bus {
            Some(bus) => {
                bus.emit(&event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Checks every event first, then emits them in order, each once.
    /// Nothing is dispatched if any event is malformed.
    pub fn emit_batch<I, E>(&self, events: I) -> Result<bool>
    where
        I: IntoIterator<Item = E>,
        E: IntoEvent,
    {
        let events = events
            .into_iter()
            .map(IntoEvent::into_event)
            .collect::<Result<Vec<_>>>()?;
        let Some(bus) = &self.bus else {
            return Ok(false);
        };
        for event in &events {
            bus.emit(event)?;
        }
        Ok(true)
    }
}

impl fmt::Debug for EventEmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmission")
            .field("bus_attached", &self.bus.is_some())
            .finish()
    }
}

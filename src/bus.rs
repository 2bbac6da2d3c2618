//! Event buses shipped with the crate.

use std::collections::HashMap;
use tokio::sync::broadcast;

use crate::{
    error::Result,
    event::{Event, EventBus},
};

/// Listeners registered under this name see every event.
pub const WILDCARD: &str = "*";

type Listener = Box<dyn Fn(&Event) + Send + Sync>;

/// A name-keyed listener registry. Register listeners, then share it as a bus.
#[derive(Default)]
pub struct EventEmitter {
    listeners: HashMap<String, Vec<Listener>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for an event name, or for [`WILDCARD`].
    pub fn on(&mut self, event: &str, callback: impl Fn(&Event) + Send + Sync + 'static) -> &mut Self {
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push(Box::new(callback));
        self
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(Vec::len).unwrap_or(0)
    }
}

impl EventBus for EventEmitter {
    fn emit(&self, event: &Event) -> Result<()> {
        for key in [event.name(), WILDCARD] {
            if let Some(callbacks) = self.listeners.get(key) {
                for cb in callbacks {
                    cb(event);
                }
            }
        }
        Ok(())
    }
}

/// Forwards events into a tokio broadcast channel.
pub struct BroadcastBus {
    sender: broadcast::Sender<Event>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventBus for BroadcastBus {
    fn emit(&self, event: &Event) -> Result<()> {
        // No subscribers is fine; the event is simply dropped.
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn emitter_calls_named_and_wildcard_listeners() {
        let named = Arc::new(Mutex::new(Vec::new()));
        let all = Arc::new(Mutex::new(Vec::new()));
        let mut emitter = EventEmitter::new();
        {
            let named = named.clone();
            emitter.on("response.received", move |e| named.lock().unwrap().push(e.clone()));
        }
        {
            let all = all.clone();
            emitter.on(WILDCARD, move |e| all.lock().unwrap().push(e.name().to_string()));
        }
        assert_eq!(emitter.listener_count("response.received"), 1);

        emitter.emit(&Event::Named("request.sending".into())).unwrap();
        emitter
            .emit(&Event::new("response.received", json!({ "ok": true })))
            .unwrap();

        assert_eq!(
            *named.lock().unwrap(),
            vec![Event::new("response.received", json!({ "ok": true }))]
        );
        assert_eq!(*all.lock().unwrap(), vec!["request.sending", "response.received"]);
    }

    #[tokio::test]
    async fn broadcast_bus_forwards_to_subscribers() {
        let bus = BroadcastBus::new(8);
        bus.emit(&Event::Named("dropped".into())).unwrap();
        let mut rx = bus.subscribe();
        bus.emit(&Event::Named("kept".into())).unwrap();
        assert_eq!(rx.recv().await.unwrap(), Event::Named("kept".into()));
    }
}

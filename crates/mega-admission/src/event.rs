use alloy_primitives::Address;
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{ATTRIBUTE_KEY_FEE, ATTRIBUTE_KEY_FEE_PAYER, EVENT_TYPE_TX},
    Coins,
};

/// The event emitted once per admitted transaction, recording what was charged and to whom.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionEvent {
    /// The non-zero part of the resolved fee. Empty for fee-free transactions.
    pub fee: Coins,
    /// The account that was debited.
    pub fee_payer: Address,
}

impl AdmissionEvent {
    /// The event type.
    pub const fn kind(&self) -> &'static str {
        EVENT_TYPE_TX
    }

    /// The event attributes as rendered key/value pairs.
    pub fn attributes(&self) -> [(&'static str, String); 2] {
        [(ATTRIBUTE_KEY_FEE, self.fee.to_string()), (ATTRIBUTE_KEY_FEE_PAYER, self.fee_payer.to_string())]
    }
}

/// A consumer of admission events.
#[auto_impl(&mut, Box)]
pub trait EventSink {
    /// Records one event.
    fn emit(&mut self, event: AdmissionEvent);
}

impl EventSink for Vec<AdmissionEvent> {
    fn emit(&mut self, event: AdmissionEvent) {
        self.push(event);
    }
}

/// Buffers the events emitted while a transaction is being admitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventManager {
    events: Vec<AdmissionEvent>,
}

impl EventManager {
    /// The buffered events, in emission order.
    pub fn events(&self) -> &[AdmissionEvent] {
        &self.events
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event has been buffered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Moves every buffered event into `sink`, preserving order.
    pub fn flush_into(&mut self, sink: &mut impl EventSink) {
        for event in self.events.drain(..) {
            sink.emit(event);
        }
    }

    /// Consumes the manager and returns its events.
    pub fn into_events(self) -> Vec<AdmissionEvent> {
        self.events
    }
}

impl EventSink for EventManager {
    fn emit(&mut self, event: AdmissionEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn test_attributes_and_flush() {
        let payer = address!("00000000000000000000000000000000000a11ce");
        let event = AdmissionEvent { fee: "10atom,2stake".parse().unwrap(), fee_payer: payer };
        assert_eq!(event.kind(), "tx");
        assert_eq!(event.attributes(), [
            ("fee", "10atom,2stake".to_string()),
            ("fee_payer", payer.to_string()),
        ]);

        let mut manager = EventManager::default();
        manager.emit(event.clone());
        let mut sink = Vec::new();
        manager.flush_into(&mut sink);
        assert!(manager.is_empty());
        assert_eq!(sink, vec![event]);
    }
}

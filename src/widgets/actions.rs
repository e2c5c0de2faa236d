//! Shared action queue for widgets that emit events.

use crate::core::event_bus::{BoxedEvent, Event, EventEmitter};

/// Widget actions result - all mutations go out as events.
#[derive(Default)]
pub struct ActionQueue {
    /// Pointer is over the widget (suppresses canvas hover effects)
    pub hovered: bool,
    pub events: Vec<BoxedEvent>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push event to be dispatched.
    pub fn send<E: Event>(&mut self, event: E) {
        self.events.push(Box::new(event));
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand every queued event to the bus, in order.
    pub fn dispatch(self, emitter: &EventEmitter) {
        for event in self.events {
            emitter.emit_boxed(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::{EventBus, downcast_event};

    #[test]
    fn test_dispatch_preserves_order() {
        let bus = EventBus::new();
        let mut actions = ActionQueue::new();
        assert!(actions.is_empty());
        actions.send(1u8);
        actions.send("two");
        actions.dispatch(&bus.emitter());

        let events = bus.poll();
        assert_eq!(downcast_event::<u8>(&events[0]), Some(&1));
        assert_eq!(downcast_event::<&str>(&events[1]), Some(&"two"));
    }
}

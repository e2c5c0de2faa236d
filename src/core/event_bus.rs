//! Pub/Sub event bus for the designer's UI thread.
//!
//! Architecture:
//! - Widgets emit intents (place image, set color, reset, ...) via an emitter
//! - emit() queues for deferred processing
//! - poll() returns queued events for the main loop handler, in emit order
//!
//! All designer state lives on the UI thread, so the bus is `Rc`-shared and
//! not `Send`.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use log::warn;

/// Maximum events in queue before oldest are evicted
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events.
pub trait Event: Any + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Boxed event for queue storage
pub type BoxedEvent = Box<dyn Event>;

#[derive(Default)]
struct Inner {
    queue: Vec<BoxedEvent>,
}

impl Inner {
    fn enqueue(&mut self, event: BoxedEvent) {
        if self.queue.len() >= MAX_QUEUE_SIZE {
            let evict_count = self.queue.len() / 2;
            warn!("EventBus queue full ({} events), evicting oldest {}", self.queue.len(), evict_count);
            self.queue.drain(0..evict_count);
        }
        self.queue.push(event);
    }
}

/// Event queue with deferred processing.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<Inner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue for poll().
    pub fn emit<E: Event>(&self, event: E) {
        self.emitter().emit(event);
    }

    /// Emit an already boxed event.
    pub fn emit_boxed(&self, event: BoxedEvent) {
        self.emitter().emit_boxed(event);
    }

    /// Take all queued events.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut self.inner.borrow_mut().queue)
    }

    /// Cheap handle for widgets.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn queue_len(&self) -> usize {
        self.inner.borrow().queue.len()
    }
}

/// Lightweight emitter handle for UI components.
#[derive(Clone)]
pub struct EventEmitter {
    inner: Rc<RefCell<Inner>>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventEmitter")
            .field("queue_len", &inner.queue.len())
            .finish()
    }
}

impl EventEmitter {
    pub fn emit<E: Event>(&self, event: E) {
        self.emit_boxed(Box::new(event));
    }

    pub fn emit_boxed(&self, event: BoxedEvent) {
        log::trace!("EventBus: queued {}", (*event).type_name());
        self.inner.borrow_mut().enqueue(event);
    }
}

/// Downcast a queued event.
///
/// Must deref to `dyn Event` before `as_any()`: `Box<dyn Event>` itself
/// implements `Event` through the blanket impl and would downcast as the Box.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}

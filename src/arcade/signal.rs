//! Same-tick "accelerating" notification for listeners such as the engine
//! audio reactor. Delivery is synchronous and best effort.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DriveSignal {
    pub accelerating: bool,
}

impl DriveSignal {
    /// Forward throttle only; reversing does not count.
    pub fn from_throttle(throttle: f32) -> Self {
        Self { accelerating: throttle > 0.0 }
    }
}

pub trait SignalListener {
    /// Returns `false` once the listener can no longer receive; the emitter
    /// then drops it.
    fn on_forward_pressed(&mut self, signal: &DriveSignal) -> bool;
}

struct FnListener<F>(F);

impl<F> SignalListener for FnListener<F>
where
    F: FnMut(&DriveSignal),
{
    fn on_forward_pressed(&mut self, signal: &DriveSignal) -> bool {
        (self.0)(signal);
        true
    }
}

/// Alive until the receiver is dropped.
impl SignalListener for UnboundedSender<DriveSignal> {
    fn on_forward_pressed(&mut self, signal: &DriveSignal) -> bool {
        self.send(*signal).is_ok()
    }
}

#[derive(Default)]
pub struct SignalEmitter {
    listeners: Vec<Box<dyn SignalListener>>,
}

impl SignalEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl SignalListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn subscribe_fn(&mut self, f: impl FnMut(&DriveSignal) + 'static) {
        self.subscribe(FnListener(f));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Notify every listener in subscription order, pruning dead ones.
    pub fn emit(&mut self, signal: DriveSignal) {
        self.listeners.retain_mut(|l| l.on_forward_pressed(&signal));
    }
}

impl std::fmt::Debug for SignalEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

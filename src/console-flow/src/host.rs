//! The component embedding the editor.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::model::AuthenticationSequence;

/// Receives step count changes and committed sequences.
pub trait SequenceHost: Send + Sync {
    /// A step was added (`true`) or removed (`false`).
    fn update_steps(&self, added: bool);

    /// The sequence passed validation and should be saved.
    fn on_update(&self, sequence: AuthenticationSequence);
}

impl<T: SequenceHost + ?Sized> SequenceHost for Arc<T> {
    fn update_steps(&self, added: bool) {
        (**self).update_steps(added)
    }

    fn on_update(&self, sequence: AuthenticationSequence) {
        (**self).on_update(sequence)
    }
}

/// Host that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl SequenceHost for NoopHost {
    fn update_steps(&self, _added: bool) {}

    fn on_update(&self, _sequence: AuthenticationSequence) {}
}

/// Something the editor told its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    StepsChanged { added: bool },
    Updated(AuthenticationSequence),
}

/// Host that records notifications in order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().clone()
    }

    /// Sequences received through `on_update`.
    pub fn updates(&self) -> Vec<AuthenticationSequence> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                HostEvent::Updated(sequence) => Some(sequence.clone()),
                HostEvent::StepsChanged { .. } => None,
            })
            .collect()
    }
}

impl SequenceHost for RecordingHost {
    fn update_steps(&self, added: bool) {
        self.events.lock().push(HostEvent::StepsChanged { added });
    }

    fn on_update(&self, sequence: AuthenticationSequence) {
        self.events.lock().push(HostEvent::Updated(sequence));
    }
}

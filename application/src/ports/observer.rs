//! Event observer port
//!
//! Observers receive every [`DeliberationEvent`] in emission order. They are
//! reporting sinks only: nothing an observer does can fail the deliberation.

use conclave_domain::DeliberationEvent;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

/// Errors an observer may report. The dispatcher logs and discards them.
#[derive(Error, Debug)]
pub enum ObserverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Channel full, event dropped")]
    ChannelFull,

    #[error("{0}")]
    Other(String),
}

/// Receives deliberation progress events
///
/// Implementations live in the presentation and infrastructure layers
/// (console progress, JSONL log, channels to other tasks).
pub trait DeliberationObserver: Send + Sync {
    /// Called once per event, in emission order
    fn on_event(&self, event: &DeliberationEvent) -> Result<(), ObserverError>;
}

/// Observer backed by a closure
pub struct FnObserver<F>(F);

impl<F> FnObserver<F>
where
    F: Fn(&DeliberationEvent) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> DeliberationObserver for FnObserver<F>
where
    F: Fn(&DeliberationEvent) + Send + Sync,
{
    fn on_event(&self, event: &DeliberationEvent) -> Result<(), ObserverError> {
        (self.0)(event);
        Ok(())
    }
}

/// Forwards events into a bounded channel.
///
/// Never blocks the round loop: when the consumer falls behind, the event is
/// dropped and reported as [`ObserverError::ChannelFull`].
pub struct ChannelObserver {
    sender: mpsc::Sender<DeliberationEvent>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::Sender<DeliberationEvent>) -> Self {
        Self { sender }
    }

    /// Create an observer plus the receiving end of a channel of `capacity`.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DeliberationEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl DeliberationObserver for ChannelObserver {
    fn on_event(&self, event: &DeliberationEvent) -> Result<(), ObserverError> {
        self.sender.try_send(event.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ObserverError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => ObserverError::ChannelClosed,
        })
    }
}

/// Ordered list of observers with failure isolation
#[derive(Default, Clone)]
pub struct EventDispatcher {
    observers: Vec<Arc<dyn DeliberationObserver>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Arc<dyn DeliberationObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver one event to every observer in registration order.
    ///
    /// Observer errors and panics are logged and swallowed.
    pub fn dispatch(&self, event: &DeliberationEvent) {
        for (index, observer) in self.observers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| observer.on_event(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(
                        "Observer {} failed on {}: {}",
                        index,
                        event.kind_name(),
                        e
                    );
                }
                Err(_) => {
                    warn!("Observer {} panicked on {}", index, event.kind_name());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::EventKind;
    use std::sync::Mutex;

    fn event(round: u32) -> DeliberationEvent {
        DeliberationEvent::now(EventKind::RoundStarted {
            round,
            has_guidance: false,
        })
    }

    struct Recording {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl DeliberationObserver for Recording {
        fn on_event(&self, event: &DeliberationEvent) -> Result<(), ObserverError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.tag, event.kind_name()));
            Ok(())
        }
    }

    struct Failing;

    impl DeliberationObserver for Failing {
        fn on_event(&self, _event: &DeliberationEvent) -> Result<(), ObserverError> {
            Err(ObserverError::Other("sink unavailable".to_string()))
        }
    }

    struct Panicking;

    impl DeliberationObserver for Panicking {
        fn on_event(&self, _event: &DeliberationEvent) -> Result<(), ObserverError> {
            panic!("observer bug");
        }
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Arc::new(Recording {
            tag: "a",
            log: log.clone(),
        }));
        dispatcher.register(Arc::new(Recording {
            tag: "b",
            log: log.clone(),
        }));

        dispatcher.dispatch(&event(1));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:round_started".to_string(), "b:round_started".to_string()]
        );
    }

    #[test]
    fn test_failing_and_panicking_observers_are_isolated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Arc::new(Failing));
        dispatcher.register(Arc::new(Panicking));
        dispatcher.register(Arc::new(Recording {
            tag: "last",
            log: log.clone(),
        }));

        dispatcher.dispatch(&event(1));
        dispatcher.dispatch(&event(2));

        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_fn_observer() {
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let observer = FnObserver::new(move |_e: &DeliberationEvent| {
            *counter.lock().unwrap() += 1;
        });
        observer.on_event(&event(1)).unwrap();
        observer.on_event(&event(2)).unwrap();
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_channel_observer_drops_when_full() {
        let (observer, mut rx) = ChannelObserver::channel(1);
        observer.on_event(&event(1)).unwrap();
        assert!(matches!(
            observer.on_event(&event(2)),
            Err(ObserverError::ChannelFull)
        ));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind_name(), "round_started");

        drop(rx);
        assert!(matches!(
            observer.on_event(&event(3)),
            Err(ObserverError::ChannelClosed)
        ));
    }
}

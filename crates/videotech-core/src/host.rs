//! Host controller notification sinks
//!
//! Sessions hold only a weak reference to their host and never mutate it;
//! the host is a pure notification sink from the adapter's point of view.

use crate::event::{CanonicalEvent, EventKind, EventPayload};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Receives canonical notifications from sessions
pub trait HostController {
    /// Called once per canonical event, in native emission order
    fn notify(&self, kind: EventKind, payload: Option<&EventPayload>);
}

/// Weak, type-erased reference to a host, as sessions hold it
pub fn downgrade_host<H: HostController + 'static>(host: &Rc<H>) -> Weak<dyn HostController> {
    let weak: Weak<H> = Rc::downgrade(host);
    weak
}

/// Host that records every notification in memory
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: RefCell<Vec<CanonicalEvent>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far
    pub fn events(&self) -> Vec<CanonicalEvent> {
        self.events.borrow().clone()
    }

    /// Kinds received so far, in order
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(|e| e.kind).collect()
    }

    /// Number of notifications of one kind
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.borrow().iter().filter(|e| e.kind == kind).count()
    }

    pub fn last(&self) -> Option<CanonicalEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl HostController for RecordingHost {
    fn notify(&self, kind: EventKind, payload: Option<&EventPayload>) {
        self.events.borrow_mut().push(CanonicalEvent {
            kind,
            payload: payload.cloned(),
        });
    }
}

#[cfg(feature = "channel")]
pub use self::channel::ChannelHost;

#[cfg(feature = "channel")]
mod channel {
    use super::*;
    use tokio::sync::mpsc;
    use tracing::debug;

    /// Host that forwards notifications to an async consumer
    #[derive(Debug, Clone)]
    pub struct ChannelHost {
        tx: mpsc::UnboundedSender<CanonicalEvent>,
    }

    impl ChannelHost {
        /// Create the sink and the receiving end
        pub fn new() -> (Self, mpsc::UnboundedReceiver<CanonicalEvent>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Self { tx }, rx)
        }
    }

    impl HostController for ChannelHost {
        fn notify(&self, kind: EventKind, payload: Option<&EventPayload>) {
            let event = CanonicalEvent {
                kind,
                payload: payload.cloned(),
            };
            if self.tx.send(event).is_err() {
                debug!(kind = %kind, "Notification receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_host() {
        let host = RecordingHost::new();
        host.notify(EventKind::Play, Some(&EventPayload::Play { url: "a.mp4".into() }));
        host.notify(EventKind::Playing, None);

        assert_eq!(host.kinds(), vec![EventKind::Play, EventKind::Playing]);
        assert_eq!(host.count(EventKind::Play), 1);
        assert_eq!(host.last().unwrap().kind, EventKind::Playing);

        host.clear();
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_downgrade_host_does_not_keep_host_alive() {
        let host = Rc::new(RecordingHost::new());
        let weak = downgrade_host(&host);

        weak.upgrade().unwrap().notify(EventKind::Stalled, None);
        assert_eq!(host.kinds(), vec![EventKind::Stalled]);

        drop(host);
        assert!(weak.upgrade().is_none());
    }

    #[cfg(feature = "channel")]
    #[tokio::test]
    async fn test_channel_host_forwards() {
        let (host, mut rx) = ChannelHost::new();
        host.notify(EventKind::Seeking, None);
        host.notify(EventKind::Seeked, None);

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::Seeking);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::Seeked);

        drop(rx);
        // Sending after the receiver is gone is not a fault
        host.notify(EventKind::Ended, None);
    }
}

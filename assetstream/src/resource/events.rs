//! Load/unload notifications
//!
//! Groups announce state changes on a broadcast channel. Every subscriber
//! receives every event sent after it subscribed. Sending with no
//! subscribers is not an error.

/// A state change announced by a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    ResourceLoaded {
        group: String,
        type_name: String,
        name: String,
    },
    ResourceUnloaded {
        group: String,
        type_name: String,
        name: String,
    },
    GroupLoaded {
        group: String,
    },
    GroupUnloaded {
        group: String,
    },
}

impl ResourceEvent {
    /// Name of the group that sent the event
    #[must_use]
    pub fn group(&self) -> &str {
        match self {
            Self::ResourceLoaded { group, .. }
            | Self::ResourceUnloaded { group, .. }
            | Self::GroupLoaded { group }
            | Self::GroupUnloaded { group } => group,
        }
    }
}

/// Sender side of the notification channel
#[derive(Clone)]
pub struct ResourceEvents {
    sender: tokio::sync::broadcast::Sender<ResourceEvent>,
}

impl ResourceEvents {
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a channel that buffers up to `capacity` events per slow receiver
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _rx) = tokio::sync::broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ResourceEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn emit(&self, event: ResourceEvent) {
        if let Err(e) = self.sender.send(event) {
            log::trace!("events.emit: no subscribers for {:?}", e.0);
        }
    }
}

impl Default for ResourceEvents {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for ResourceEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceEvents")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

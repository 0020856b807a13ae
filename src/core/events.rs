//! Notifications exchanged between the viewer core and its UI.

use super::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A notification to or from the UI collaborator.
///
/// Requests flow from the UI into [`crate::viewer::Viewer::handle`]; results are
/// queued on the [`EventQueue`] for the UI to drain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ViewerEvent {
    /// The UI asks for a model to be loaded.
    ModelLoadRequested {
        /// Path of the glTF file.
        path: String,
        /// Display name.
        name: String,
        /// Model id.
        id: String,
    },
    /// A model finished loading.
    ModelLoaded {
        /// Root node of the model.
        node: NodeId,
        /// Names of the model's animations.
        animations: Vec<String>,
        /// Model id.
        uuid: String,
        /// Path of the glTF file.
        path: String,
    },
    /// A model failed to load.
    ModelLoadError {
        /// Error message.
        error: String,
        /// Path of the glTF file.
        path: String,
    },
    /// The UI picked a profile pair.
    ProfilesSelected {
        /// Performance profile id.
        performance_profile: String,
        /// Scene profile id.
        scene_profile: String,
    },
    /// A profile pair was applied to the scene.
    SceneUpdated {
        /// Performance profile id.
        performance_profile: String,
        /// Scene profile id.
        scene_profile: String,
    },
    /// A recoverable error to show to the user.
    Error {
        /// Error message.
        message: String,
    },
    /// An informational message.
    Notice {
        /// Message text.
        message: String,
    },
}

impl ViewerEvent {
    /// Create an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        ViewerEvent::Error {
            message: message.into(),
        }
    }

    /// Create an informational notification.
    pub fn notice(message: impl Into<String>) -> Self {
        ViewerEvent::Notice {
            message: message.into(),
        }
    }
}

/// FIFO of notifications waiting for the UI.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<ViewerEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event.
    pub fn push(&mut self, event: ViewerEvent) {
        log::trace!("Queued {:?}", event);
        self.events.push_back(event);
    }

    /// Take all queued events in order.
    pub fn drain(&mut self) -> Vec<ViewerEvent> {
        self.events.drain(..).collect()
    }

    /// Queued events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ViewerEvent> {
        self.events.iter()
    }

    /// Number of queued events.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_json_shape() {
        let event = ViewerEvent::ProfilesSelected {
            performance_profile: "high".into(),
            scene_profile: "studio".into(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "profilesSelected", "performanceProfile": "high", "sceneProfile": "studio" })
        );

        let parsed: ViewerEvent = serde_json::from_value(json!({
            "type": "modelLoadRequested",
            "path": "models/statue/lada.gltf",
            "name": "Statue",
            "id": "statue"
        }))
        .unwrap();
        assert!(matches!(parsed, ViewerEvent::ModelLoadRequested { ref id, .. } if id == "statue"));
    }

    #[test]
    fn test_queue_drains_in_order() {
        let mut queue = EventQueue::new();
        queue.push(ViewerEvent::notice("a"));
        queue.push(ViewerEvent::error("b"));
        let drained = queue.drain();
        assert_eq!(drained, vec![ViewerEvent::notice("a"), ViewerEvent::error("b")]);
        assert!(queue.is_empty());
    }
}

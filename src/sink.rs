//! Display collaborator for intermediate frames.
//!
//! The core never performs display I/O itself; callers that want to see
//! frames inject a [`FrameSink`].

use std::sync::Mutex;
use std::sync::PoisonError;

use crate::image::Image;

pub trait FrameSink: Send + Sync {
    /// Show `image` in the frame called `name`, creating it if needed.
    fn show(&self, name: &str, image: &Image);

    /// Close the frame called `name`. Closing an unknown frame is a no-op.
    fn close(&self, name: &str);
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn show(&self, _name: &str, _image: &Image) {}

    fn close(&self, _name: &str) {}
}

/// In-memory sink recording every event, mostly for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Show { name: String, height: usize, width: usize },
    Close { name: String },
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Frames shown and not closed since.
    pub fn open_frames(&self) -> Vec<String> {
        let mut open: Vec<String> = Vec::new();
        for event in self.events() {
            match event {
                SinkEvent::Show { name, .. } => {
                    if !open.contains(&name) {
                        open.push(name);
                    }
                }
                SinkEvent::Close { name } => open.retain(|n| *n != name),
            }
        }
        open
    }

    fn push(&self, event: SinkEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl FrameSink for MemorySink {
    fn show(&self, name: &str, image: &Image) {
        self.push(SinkEvent::Show {
            name: name.to_string(),
            height: image.height(),
            width: image.width(),
        });
    }

    fn close(&self, name: &str) {
        self.push(SinkEvent::Close {
            name: name.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_tracks_open_frames() {
        let sink = MemorySink::new();
        sink.show("a", &Image::zeros(2, 3, 1));
        sink.show("b", &Image::zeros(1, 1, 1));
        sink.show("a", &Image::zeros(2, 3, 1));
        sink.close("a");

        assert_eq!(sink.open_frames(), vec!["b".to_string()]);
        assert_eq!(sink.events().len(), 4);
        assert_eq!(
            sink.events()[0],
            SinkEvent::Show {
                name: "a".into(),
                height: 2,
                width: 3
            }
        );
    }
}

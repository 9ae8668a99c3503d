//! Tracks which photo the current anchors belong to.
//!
//! Detection runs asynchronously outside this crate. Every photo gets a fresh
//! [`PhotoToken`]; a result is applied only if it carries the current token, so a
//! late result for a replaced photo is dropped.

use super::anchors::Detection;

/// Generation tag handed out per photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotoToken(pub u32);

#[derive(Debug, Clone, Default)]
pub struct DetectionSlot {
    generation: u32,
    current: Option<Detection>,
}

impl DetectionSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new photo: forget the old anchors and invalidate in-flight results.
    pub fn begin_photo(&mut self) -> PhotoToken {
        self.generation = self.generation.wrapping_add(1);
        self.current = None;
        PhotoToken(self.generation)
    }

    #[must_use]
    pub fn token(&self) -> PhotoToken {
        PhotoToken(self.generation)
    }

    /// Apply a detector result. Returns `false` when the token is stale.
    ///
    /// `None` records a failed detection; the mapper then falls back to the whole
    /// image.
    pub fn resolve(&mut self, token: PhotoToken, detection: Option<Detection>) -> bool {
        if token.0 != self.generation {
            log::debug!(
                "discarding detection for photo generation {} (current {})",
                token.0,
                self.generation
            );
            return false;
        }
        self.current = detection;
        true
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    #[must_use]
    pub fn current(&self) -> Option<&Detection> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::anchors::fixtures::{frontal_anchors, frontal_box};

    fn detection() -> Detection {
        Detection {
            face_box: frontal_box(),
            anchors: Some(frontal_anchors()),
        }
    }

    #[test]
    fn current_token_applies() {
        let mut slot = DetectionSlot::new();
        let token = slot.begin_photo();
        assert!(slot.resolve(token, Some(detection())));
        assert_eq!(slot.current(), Some(&detection()));
    }

    #[test]
    fn stale_token_is_discarded() {
        let mut slot = DetectionSlot::new();
        let first = slot.begin_photo();
        let second = slot.begin_photo();
        assert!(!slot.resolve(first, Some(detection())));
        assert!(slot.current().is_none());
        assert!(slot.resolve(second, None));
        assert!(slot.current().is_none());
    }

    #[test]
    fn new_photo_drops_previous_anchors() {
        let mut slot = DetectionSlot::new();
        let token = slot.begin_photo();
        slot.resolve(token, Some(detection()));
        slot.begin_photo();
        assert!(slot.current().is_none());
    }
}

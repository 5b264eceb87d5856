use super::traits::MediaElement;
use super::types::MediaSlot;

/// The two elements a review modal drives: the visible player and the
/// hidden, muted element used to decode hover previews.
pub struct MediaPair {
    pub primary: Box<dyn MediaElement>,
    pub preview: Box<dyn MediaElement>,
}

impl MediaPair {
    pub fn new(primary: Box<dyn MediaElement>, preview: Box<dyn MediaElement>) -> Self {
        Self { primary, preview }
    }

    pub fn get(&self, slot: MediaSlot) -> &dyn MediaElement {
        match slot {
            MediaSlot::Primary => self.primary.as_ref(),
            MediaSlot::Preview => self.preview.as_ref(),
        }
    }

    pub fn get_mut(&mut self, slot: MediaSlot) -> &mut dyn MediaElement {
        match slot {
            MediaSlot::Primary => self.primary.as_mut(),
            MediaSlot::Preview => self.preview.as_mut(),
        }
    }
}

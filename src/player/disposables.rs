use tracing::{trace, warn};

use super::media::MediaPair;
use super::traits::ModalView;
use super::types::{ListenerId, MediaSlot};

/// Something a session acquired in `open` and must give back in `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposable {
    MediaListener { slot: MediaSlot, id: ListenerId },
    KeyListener(ListenerId),
    Timeline,
    InfoBar,
}

/// Per-session resource list, released as a unit in reverse acquisition order.
#[derive(Debug, Default)]
pub struct DisposeBag {
    items: Vec<Disposable>,
}

impl DisposeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Disposable) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn release(&mut self, media: &mut MediaPair, view: &mut dyn ModalView) {
        while let Some(item) = self.items.pop() {
            trace!("Releasing {:?}", item);
            match item {
                Disposable::MediaListener { slot, id } => media.get_mut(slot).remove_listener(id),
                Disposable::KeyListener(id) => view.remove_key_listener(id),
                Disposable::Timeline => view.unmount_timeline(),
                Disposable::InfoBar => view.unmount_info_bar(),
            }
        }
    }
}

impl Drop for DisposeBag {
    fn drop(&mut self) {
        if !self.items.is_empty() {
            warn!("{} session resources dropped without release", self.items.len());
        }
    }
}

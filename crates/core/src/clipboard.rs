//! Single-slot clipboard over annotation records.
//!
//! The slot holds a record snapshot, so pasting works across pages and
//! after the source object is gone. Each paste offsets the stored position
//! by [`PASTE_OFFSET`] and keeps the offset position in the slot, so
//! repeated pastes walk diagonally down the page.

use crate::annotation::AnnotationRecord;
use crate::surface::EditSurface;
use crate::sync::{object_from_record, record_from};

pub const PASTE_OFFSET: f32 = 20.0;

/// Outcome of a clipboard operation; none of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardOutcome {
    Copied,
    Cut,
    Pasted,
    NothingSelected,
    ClipboardEmpty,
    PasteFailed,
}

#[derive(Debug, Default)]
pub struct Clipboard {
    slot: Option<AnnotationRecord>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Snapshot the selected object into the slot; the surface is untouched.
    pub fn copy<S: EditSurface>(&mut self, surface: &S) -> ClipboardOutcome {
        match surface.selected() {
            Some(object) => {
                self.slot = Some(record_from(object));
                ClipboardOutcome::Copied
            }
            None => ClipboardOutcome::NothingSelected,
        }
    }

    /// Copy, then remove the selected object.
    pub fn cut<S: EditSurface>(&mut self, surface: &mut S) -> ClipboardOutcome {
        match surface.selected() {
            Some(object) => {
                self.slot = Some(record_from(object));
                surface.remove_selected();
                ClipboardOutcome::Cut
            }
            None => ClipboardOutcome::NothingSelected,
        }
    }

    /// Rebuild the slot's record onto the surface, offset by
    /// [`PASTE_OFFSET`] on both axes, and select the pasted object.
    ///
    /// On success the slot keeps the offset position; a slot whose payload
    /// no longer decodes leaves both slot and surface unchanged.
    pub fn paste<S: EditSurface>(&mut self, surface: &mut S) -> ClipboardOutcome {
        let Some(slot) = self.slot.as_mut() else {
            return ClipboardOutcome::ClipboardEmpty;
        };

        let mut record = slot.clone();
        record.shift(PASTE_OFFSET, PASTE_OFFSET);

        match object_from_record(&record) {
            Ok(object) => {
                *slot = record;
                surface.add_object(object);
                surface.select_last();
                ClipboardOutcome::Pasted
            }
            Err(err) => {
                log::warn!("paste failed: {err}");
                ClipboardOutcome::PasteFailed
            }
        }
    }
}

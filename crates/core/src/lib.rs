//! Annotation layer for a PDF overlay editor.
//!
//! The crate models the full edit cycle: a screen-space edit surface per
//! page, page-keyed annotation records captured from it, rehydration when a
//! page comes back into view, and projection of the records onto PDF page
//! geometry at export time. Document access goes through the
//! `pdf-overlay-engine` crate; everything here is deterministic and
//! side-effect free apart from logging.

pub mod annotation;
pub mod clipboard;
pub mod export;
pub mod geometry;
pub mod payload;
pub mod session;
pub mod surface;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use annotation::{AnnotationRecord, FontStyle, FontWeight, PageAnnotationStore, PageRecords};
pub use clipboard::{Clipboard, ClipboardOutcome, PASTE_OFFSET};
pub use export::{project, ExportError, EXPORT_FILENAME};
pub use geometry::{container_budget, RenderGeometry, BASE_SCALE};
pub use session::{
    EventOutcome, ExportedDocument, SessionController, SessionError, SessionEvent, Tool,
};
pub use surface::{EditSurface, ImageObject, MemorySurface, SurfaceObject, TextObject};
pub use sync::{capture, hydrate, HydrateError};

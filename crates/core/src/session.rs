//! Session controller: owns the loaded document, the store, the clipboard,
//! and the current page/tool, and drives everything through explicit events.
//!
//! The controller guarantees the capture-before-hydrate ordering on every
//! page change, keeps navigation bounded to the document, and fully resets
//! on reload. Collaborator failures surface as [`SessionError`]; benign
//! conditions (empty clipboard, out-of-turn events) come back as outcomes.

use pdf_overlay_engine::{DocumentHandle, PdfEngine, PdfEngineError};

use crate::annotation::{FontStyle, FontWeight, PageAnnotationStore};
use crate::clipboard::{Clipboard, ClipboardOutcome};
use crate::export::{self, ExportError, EXPORT_FILENAME};
use crate::geometry::RenderGeometry;
use crate::payload::{self, PayloadError};
use crate::surface::{EditSurface, ImageObject, SurfaceObject, TextObject};
use crate::sync;

/// Placeholder content for a freshly inserted text box.
pub const DEFAULT_TEXT: &str = "Digita qui...";
pub const DEFAULT_TEXT_FONT: &str = "Arial";
pub const DEFAULT_TEXT_SIZE: f32 = 16.0;
pub const DEFAULT_TEXT_FILL: &str = "#000000";
pub const DEFAULT_TEXT_WIDTH: f32 = 200.0;

/// Where inserted images and signatures land, in screen pixels.
pub const INSERT_POSITION: (f32, f32) = (100.0, 100.0);
pub const IMAGE_INSERT_SCALE: f32 = 0.5;
pub const SIGNATURE_INSERT_SCALE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Text,
    Image,
    Signature,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no document is loaded")]
    NoDocument,
    #[error(transparent)]
    Engine(#[from] PdfEngineError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Everything that exists only while a document is loaded.
#[derive(Debug)]
struct Session {
    original_bytes: Vec<u8>,
    handle: DocumentHandle,
    page_count: u32,
    current_page: u32,
    current_tool: Tool,
    dirty: bool,
    store: PageAnnotationStore,
    clipboard: Clipboard,
}

#[derive(Debug)]
pub enum SessionEvent {
    LoadDocument { bytes: Vec<u8> },
    SelectTool(Tool),
    NextPage,
    PrevPage,
    GoToPage(u32),
    ViewportResized { width: f32 },
    /// Insert the default text box at a click point; only honored while the
    /// text tool is active, and hands the tool back to select afterwards.
    AddTextAt { x: f32, y: f32 },
    InsertImage { data_uri: String },
    InsertSignature { data_uri: String },
    DeleteSelected,
    Copy,
    Cut,
    Paste,
    Export,
}

/// Exported bytes plus the suggested download name.
#[derive(Debug)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}

#[derive(Debug)]
pub enum EventOutcome {
    Loaded { page_count: u32 },
    ToolChanged(Tool),
    PageChanged { page: u32 },
    ViewportChanged(RenderGeometry),
    ObjectAdded,
    ObjectDeleted,
    Clipboard(ClipboardOutcome),
    Exported(ExportedDocument),
    /// The event did not apply in the current state.
    Ignored,
}

pub struct SessionController<E: PdfEngine, S: EditSurface> {
    engine: E,
    surface: S,
    viewport_width: f32,
    session: Option<Session>,
}

impl<E: PdfEngine, S: EditSurface> SessionController<E, S> {
    pub fn new(engine: E, surface: S, viewport_width: f32) -> Self {
        Self { engine, surface, viewport_width, session: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_page(&self) -> Option<u32> {
        Some(self.session.as_ref()?.current_page)
    }

    pub fn page_count(&self) -> Option<u32> {
        Some(self.session.as_ref()?.page_count)
    }

    pub fn current_tool(&self) -> Option<Tool> {
        Some(self.session.as_ref()?.current_tool)
    }

    /// Whether there are edits that have not been exported yet.
    pub fn is_dirty(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.dirty)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Raster geometry of the current page at the current viewport width.
    pub fn current_geometry(&self) -> Result<RenderGeometry, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NoDocument)?;
        let size = self.engine.page_size(session.handle, session.current_page - 1)?;
        Ok(RenderGeometry::resolve(size, self.viewport_width))
    }

    pub fn dispatch(&mut self, event: SessionEvent) -> Result<EventOutcome, SessionError> {
        match event {
            SessionEvent::LoadDocument { bytes } => self.load_document(bytes),
            SessionEvent::SelectTool(tool) => self.select_tool(tool),
            SessionEvent::NextPage => self.step_page(1),
            SessionEvent::PrevPage => self.step_page(-1),
            SessionEvent::GoToPage(page) => self.go_to_page(page),
            SessionEvent::ViewportResized { width } => self.viewport_resized(width),
            SessionEvent::AddTextAt { x, y } => self.add_text_at(x, y),
            SessionEvent::InsertImage { data_uri } => {
                self.insert_image(&data_uri, IMAGE_INSERT_SCALE)
            }
            SessionEvent::InsertSignature { data_uri } => {
                self.insert_image(&data_uri, SIGNATURE_INSERT_SCALE)
            }
            SessionEvent::DeleteSelected => self.delete_selected(),
            SessionEvent::Copy => self.clipboard_copy(),
            SessionEvent::Cut => self.clipboard_cut(),
            SessionEvent::Paste => self.clipboard_paste(),
            SessionEvent::Export => self.export(),
        }
    }

    fn load_document(&mut self, bytes: Vec<u8>) -> Result<EventOutcome, SessionError> {
        // Header check happens in the engine before any parse; a failed load
        // must leave the previous state untouched.
        let handle = self.engine.open(bytes.clone())?;
        let page_count = self.engine.page_count(handle)?;

        if let Some(old) = self.session.take() {
            let _ = self.engine.close(old.handle);
        }
        self.surface.clear();

        let mut store = PageAnnotationStore::new();
        store.init_pages(page_count);
        self.session = Some(Session {
            original_bytes: bytes,
            handle,
            page_count,
            current_page: 1,
            current_tool: Tool::Select,
            dirty: false,
            store,
            clipboard: Clipboard::new(),
        });

        log::info!("session loaded, {page_count} page(s)");
        Ok(EventOutcome::Loaded { page_count })
    }

    fn select_tool(&mut self, tool: Tool) -> Result<EventOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
        session.current_tool = tool;
        Ok(EventOutcome::ToolChanged(tool))
    }

    fn step_page(&mut self, delta: i64) -> Result<EventOutcome, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NoDocument)?;
        let target = (i64::from(session.current_page) + delta)
            .clamp(1, i64::from(session.page_count)) as u32;
        self.go_to_page(target)
    }

    fn go_to_page(&mut self, target: u32) -> Result<EventOutcome, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NoDocument)?;
        let target = target.clamp(1, session.page_count);
        if target == session.current_page {
            return Ok(EventOutcome::Ignored);
        }

        self.capture_current_page()?;

        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
        session.current_page = target;
        sync::hydrate(&session.store, target, &mut self.surface);
        Ok(EventOutcome::PageChanged { page: target })
    }

    fn viewport_resized(&mut self, width: f32) -> Result<EventOutcome, SessionError> {
        if self.session.is_some() {
            // Capture at the outgoing scale so the stored records stay
            // consistent, then re-hydrate under the new geometry.
            self.capture_current_page()?;
            self.viewport_width = width;
            let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
            sync::hydrate(&session.store, session.current_page, &mut self.surface);
        } else {
            self.viewport_width = width;
            return Ok(EventOutcome::Ignored);
        }
        Ok(EventOutcome::ViewportChanged(self.current_geometry()?))
    }

    fn add_text_at(&mut self, x: f32, y: f32) -> Result<EventOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
        if session.current_tool != Tool::Text {
            return Ok(EventOutcome::Ignored);
        }

        self.surface.add_object(SurfaceObject::Text(TextObject {
            text: DEFAULT_TEXT.to_owned(),
            left: x,
            top: y,
            font_family: DEFAULT_TEXT_FONT.to_owned(),
            font_size: DEFAULT_TEXT_SIZE,
            fill: DEFAULT_TEXT_FILL.to_owned(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            underline: false,
            width: DEFAULT_TEXT_WIDTH,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }));
        self.surface.select_last();

        session.current_tool = Tool::Select;
        session.dirty = true;
        Ok(EventOutcome::ObjectAdded)
    }

    fn insert_image(&mut self, data_uri: &str, scale: f32) -> Result<EventOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;

        let decoded = payload::decode_data_uri(data_uri)?;
        let image = image::load_from_memory(&decoded.bytes)?;
        let (left, top) = INSERT_POSITION;

        self.surface.add_object(SurfaceObject::Image(ImageObject {
            src: data_uri.to_owned(),
            left,
            top,
            natural_width: image.width() as f32,
            natural_height: image.height() as f32,
            scale_x: scale,
            scale_y: scale,
            angle: 0.0,
        }));
        self.surface.select_last();

        session.dirty = true;
        Ok(EventOutcome::ObjectAdded)
    }

    fn delete_selected(&mut self) -> Result<EventOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
        match self.surface.remove_selected() {
            Some(_) => {
                session.dirty = true;
                Ok(EventOutcome::ObjectDeleted)
            }
            None => Ok(EventOutcome::Ignored),
        }
    }

    fn clipboard_copy(&mut self) -> Result<EventOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
        Ok(EventOutcome::Clipboard(session.clipboard.copy(&self.surface)))
    }

    fn clipboard_cut(&mut self) -> Result<EventOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
        let outcome = session.clipboard.cut(&mut self.surface);
        if outcome == ClipboardOutcome::Cut {
            session.dirty = true;
        }
        Ok(EventOutcome::Clipboard(outcome))
    }

    fn clipboard_paste(&mut self) -> Result<EventOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
        let outcome = session.clipboard.paste(&mut self.surface);
        if outcome == ClipboardOutcome::Pasted {
            session.dirty = true;
        }
        Ok(EventOutcome::Clipboard(outcome))
    }

    fn export(&mut self) -> Result<EventOutcome, SessionError> {
        self.capture_current_page()?;

        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
        let bytes = export::project(&session.original_bytes, &session.store)?;
        session.dirty = false;
        Ok(EventOutcome::Exported(ExportedDocument {
            bytes,
            filename: EXPORT_FILENAME.to_owned(),
        }))
    }

    /// Snapshot the surface into the store under the scale currently on
    /// screen for the page.
    fn capture_current_page(&mut self) -> Result<(), SessionError> {
        let render_scale = self.current_geometry()?.render_scale;
        let session = self.session.as_mut().ok_or(SessionError::NoDocument)?;
        sync::capture(&self.surface, &mut session.store, session.current_page, render_scale);
        Ok(())
    }
}

//! PDF document engine: validation, page geometry, and placeholder rasterization.
//!
//! The engine opens raw document bytes, validates the `%PDF` header before any
//! parse attempt, and exposes page count and page sizes in PDF points. Page
//! rasterization is a placeholder backend (white page with a grey border);
//! callers that need real rendering can provide their own [`PdfEngine`]
//! implementation.

pub mod mutate;

use image::{ImageBuffer, Rgba};
use lopdf::Document;
use std::collections::HashMap;

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// Magic bytes every loadable document must start with.
pub const PDF_HEADER: &[u8; 4] = b"%PDF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Page dimensions in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl Default for PageSize {
    fn default() -> Self {
        Self { width_pt: 612.0, height_pt: 792.0 }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfEngineError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("not a valid PDF (header: {found})")]
    InvalidHeader { found: String },
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("invalid handle {0}")]
    InvalidHandle(u64),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Validate raw bytes before any parse attempt.
///
/// Rejects empty buffers and buffers whose first four bytes are not `%PDF`;
/// the error names the bytes actually observed.
pub fn validate_header(bytes: &[u8]) -> Result<(), PdfEngineError> {
    if bytes.is_empty() {
        return Err(PdfEngineError::EmptyDocument);
    }
    if bytes.len() < PDF_HEADER.len() || &bytes[..PDF_HEADER.len()] != PDF_HEADER {
        let observed = &bytes[..bytes.len().min(PDF_HEADER.len())];
        return Err(PdfEngineError::InvalidHeader {
            found: observed.escape_ascii().to_string(),
        });
    }
    Ok(())
}

/// Document access used by the session: open, page geometry, rasterization.
pub trait PdfEngine {
    fn open(&mut self, bytes: Vec<u8>) -> Result<DocumentHandle, PdfEngineError>;
    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError>;
    /// Page size for a zero-based page index.
    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError>;
    fn render_page(
        &self,
        handle: DocumentHandle,
        page_index: u32,
        scale: f32,
    ) -> Result<RgbaImage, PdfEngineError>;
    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError>;
}

#[derive(Debug, Clone)]
struct DocumentRecord {
    page_sizes: Vec<PageSize>,
}

/// Default engine backed by lopdf for parsing and page geometry.
#[derive(Debug, Default)]
pub struct LopdfEngine {
    next_handle: u64,
    docs: HashMap<DocumentHandle, DocumentRecord>,
}

impl LopdfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_sizes(bytes: &[u8]) -> Result<Vec<PageSize>, PdfEngineError> {
        let doc = Document::load_mem(bytes)?;
        let pages = doc.get_pages();
        let mut sizes = Vec::with_capacity(pages.len());

        for (_, object_id) in pages {
            let dict = doc.get_dictionary(object_id)?;
            let size = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|obj| obj.as_array().ok())
                .and_then(|array| {
                    if array.len() != 4 {
                        return None;
                    }
                    let x0 = array[0].as_float().ok()?;
                    let y0 = array[1].as_float().ok()?;
                    let x1 = array[2].as_float().ok()?;
                    let y1 = array[3].as_float().ok()?;
                    Some(PageSize { width_pt: (x1 - x0).abs(), height_pt: (y1 - y0).abs() })
                })
                .unwrap_or_default();

            sizes.push(size);
        }

        if sizes.is_empty() {
            return Err(PdfEngineError::Backend("document has no pages".to_owned()));
        }

        Ok(sizes)
    }

    fn record(&self, handle: DocumentHandle) -> Result<&DocumentRecord, PdfEngineError> {
        self.docs.get(&handle).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

impl PdfEngine for LopdfEngine {
    fn open(&mut self, bytes: Vec<u8>) -> Result<DocumentHandle, PdfEngineError> {
        validate_header(&bytes)?;

        let page_sizes = Self::parse_sizes(&bytes)?;
        log::info!("opened document with {} page(s)", page_sizes.len());

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        self.docs.insert(handle, DocumentRecord { page_sizes });

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.record(handle)?.page_sizes.len() as u32)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        let record = self.record(handle)?;
        record.page_sizes.get(page_index as usize).copied().ok_or(
            PdfEngineError::PageOutOfRange {
                page: page_index,
                page_count: record.page_sizes.len() as u32,
            },
        )
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        page_index: u32,
        scale: f32,
    ) -> Result<RgbaImage, PdfEngineError> {
        let page_size = self.page_size(handle, page_index)?;
        let scale = if scale <= 0.0 { 1.0 } else { scale };

        let width = (page_size.width_pt * scale).round().max(1.0) as u32;
        let height = (page_size.height_pt * scale).round().max(1.0) as u32;

        let mut image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

        if width >= 4 && height >= 4 {
            for x in 0..width {
                image.put_pixel(x, 0, Rgba([220, 220, 220, 255]));
                image.put_pixel(x, height - 1, Rgba([220, 220, 220, 255]));
            }
            for y in 0..height {
                image.put_pixel(0, y, Rgba([220, 220, 220, 255]));
                image.put_pixel(width - 1, y, Rgba([220, 220, 220, 255]));
            }
        }

        Ok(image)
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_pdf_and_reads_page_count() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(test_pdf::single_page(612, 792))
            .expect("open should succeed");

        assert_eq!(engine.page_count(handle).expect("count should succeed"), 1);
    }

    #[test]
    fn reads_media_box_page_size() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(test_pdf::single_page(595, 842))
            .expect("open should succeed");

        let size = engine.page_size(handle, 0).expect("size should succeed");
        assert_eq!(size.width_pt, 595.0);
        assert_eq!(size.height_pt, 842.0);
    }

    #[test]
    fn rejects_empty_buffer() {
        let mut engine = LopdfEngine::new();
        let err = engine.open(Vec::new()).expect_err("empty buffer must fail");
        assert!(matches!(err, PdfEngineError::EmptyDocument));
    }

    #[test]
    fn rejects_bad_header_naming_observed_bytes() {
        let mut engine = LopdfEngine::new();
        let err = engine
            .open(b"HTML<not a pdf>".to_vec())
            .expect_err("bad header must fail");

        match err {
            PdfEngineError::InvalidHeader { found } => assert_eq!(found, "HTML"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_check_happens_before_parse() {
        // A buffer that is not parseable but carries the header reaches the
        // parser; one without the header must not.
        let err = validate_header(b"GIF8").expect_err("wrong magic");
        assert!(matches!(err, PdfEngineError::InvalidHeader { .. }));
        assert!(validate_header(b"%PDF-1.7 garbage").is_ok());
    }

    #[test]
    fn render_page_produces_scaled_bitmap() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(test_pdf::single_page(612, 792))
            .expect("open should succeed");

        let image = engine.render_page(handle, 0, 1.5).expect("render should succeed");
        assert_eq!(image.width(), 918);
        assert_eq!(image.height(), 1188);
    }

    #[test]
    fn invalid_handle_returns_error() {
        let engine = LopdfEngine::new();
        let err =
            engine.page_count(DocumentHandle(999)).expect_err("should fail for unknown handle");

        assert!(matches!(err, PdfEngineError::InvalidHandle(999)));
    }

    #[test]
    fn page_out_of_range_is_reported() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(test_pdf::single_page(612, 792))
            .expect("open should succeed");

        let err = engine.page_size(handle, 7).expect_err("page 7 does not exist");
        assert!(matches!(err, PdfEngineError::PageOutOfRange { page: 7, page_count: 1 }));
    }
}

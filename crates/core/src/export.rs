//! Export projector: replay stored records onto the original PDF bytes.
//!
//! Each page divides by the render scale captured with it and flips Y into
//! the PDF's bottom-left origin. A single bad annotation never aborts the
//! export; it is logged and skipped. Only failure to re-parse the source
//! document or to serialize the result is fatal.

use pdf_overlay_engine::mutate::{
    ImageOp, MutableDocument, MutateError, StandardFont, TextOp,
};
use pdf_overlay_engine::PageSize;

use crate::annotation::{AnnotationRecord, PageAnnotationStore};
use crate::geometry::{self, BASE_SCALE};
use crate::payload::{self, PayloadError};

/// Suggested file name for the exported document.
pub const EXPORT_FILENAME: &str = "documento_modificato.pdf";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not parse the source document: {0}")]
    Load(#[source] MutateError),
    #[error("could not serialize the exported document: {0}")]
    Save(#[source] MutateError),
}

#[derive(Debug, thiserror::Error)]
enum RecordError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Mutate(#[from] MutateError),
}

/// Produce new PDF bytes with every stored annotation drawn in.
pub fn project(original: &[u8], store: &PageAnnotationStore) -> Result<Vec<u8>, ExportError> {
    let mut doc = MutableDocument::load(original).map_err(ExportError::Load)?;
    let page_count = doc.page_count();

    for (page, page_records) in store.iter() {
        if page_records.records.is_empty() {
            continue;
        }
        if page == 0 || page > page_count {
            log::warn!("skipping records for page {page}: document has {page_count} page(s)");
            continue;
        }

        let scale = if page_records.render_scale > 0.0 {
            page_records.render_scale
        } else {
            BASE_SCALE
        };
        let page_size = match doc.page_size(page) {
            Ok(size) => size,
            Err(err) => {
                log::warn!("skipping page {page}: {err}");
                continue;
            }
        };

        for record in &page_records.records {
            if let Err(err) = project_record(&mut doc, page, page_size, scale, record) {
                log::warn!("skipping annotation on page {page}: {err}");
            }
        }
    }

    doc.save().map_err(ExportError::Save)
}

fn project_record(
    doc: &mut MutableDocument,
    page: u32,
    page_size: PageSize,
    scale: f32,
    record: &AnnotationRecord,
) -> Result<(), RecordError> {
    match record {
        AnnotationRecord::Text { text, left, top, font_family, font_size, fill, .. } => {
            if text.trim().is_empty() {
                return Ok(());
            }

            let op = TextOp {
                text,
                x: geometry::to_pdf_x(*left, scale),
                y: geometry::to_pdf_y(*top, *font_size, page_size.height_pt, scale),
                size: font_size / scale,
                font: StandardFont::for_family(font_family),
                color: parse_hex_color(fill),
            };

            if let Err(err) = doc.draw_text(page, &op) {
                if op.font == StandardFont::Helvetica {
                    return Err(err.into());
                }
                log::warn!("font {font_family:?} failed ({err}); retrying with Helvetica");
                doc.draw_text(page, &TextOp { font: StandardFont::Helvetica, ..op })?;
            }
            Ok(())
        }
        AnnotationRecord::Image {
            src,
            left,
            top,
            display_width,
            display_height,
            width,
            height,
            scale_x,
            scale_y,
            ..
        } => {
            let decoded = payload::decode_data_uri(src)?;
            let embedded = if decoded.is_png {
                match doc.embed_png(&decoded.bytes) {
                    Ok(embedded) => embedded,
                    Err(err) => {
                        log::warn!("PNG embed failed ({err}); retrying as JPEG");
                        doc.embed_jpg(&decoded.bytes)?
                    }
                }
            } else {
                doc.embed_jpg(&decoded.bytes)?
            };

            let (display_w, display_h) = match (display_width, display_height) {
                (Some(w), Some(h)) => (*w, *h),
                _ => match (width, height) {
                    (Some(w), Some(h)) => {
                        (w * scale_x.unwrap_or(1.0), h * scale_y.unwrap_or(1.0))
                    }
                    _ => (embedded.pixel_width as f32, embedded.pixel_height as f32),
                },
            };

            let op = ImageOp {
                x: geometry::to_pdf_x(*left, scale),
                y: geometry::to_pdf_y(*top, display_h, page_size.height_pt, scale),
                width: display_w / scale,
                height: display_h / scale,
            };
            doc.draw_image(page, &embedded, op)?;
            Ok(())
        }
    }
}

/// Parse a `#rrggbb` color into normalized RGB; anything malformed is black.
fn parse_hex_color(hex: &str) -> (f32, f32, f32) {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() == 6 {
        if let Ok(value) = u32::from_str_radix(digits, 16) {
            return (
                ((value >> 16) & 0xff) as f32 / 255.0,
                ((value >> 8) & 0xff) as f32 / 255.0,
                (value & 0xff) as f32 / 255.0,
            );
        }
    }
    (0.0, 0.0, 0.0)
}

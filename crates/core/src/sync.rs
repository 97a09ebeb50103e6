//! Page sync: capture the edit surface into the store, hydrate it back.
//!
//! Capture snapshots every surface object in z order and overwrites the
//! page's store entry wholesale, together with the render scale in effect.
//! Hydrate rebuilds the surface from the records in order; image payloads
//! are decoded one at a time so z order is preserved. A record whose
//! payload cannot be decoded is logged and skipped without failing the
//! rest of the page.


use crate::annotation::{AnnotationRecord, PageAnnotationStore, PageRecords};
use crate::payload::{self, PayloadError};
use crate::surface::{EditSurface, ImageObject, SurfaceObject, TextObject};

#[derive(Debug, thiserror::Error)]
pub enum HydrateError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Snapshot the surface into the store entry for `page`.
pub fn capture<S: EditSurface>(
    surface: &S,
    store: &mut PageAnnotationStore,
    page: u32,
    render_scale: f32,
) {
    let records = surface.objects().iter().map(record_from).collect();
    store.set_page(page, PageRecords { render_scale, records });
}

/// Rebuild the surface from the store entry for `page`.
///
/// The surface is cleared first; a missing store entry leaves it empty.
pub fn hydrate<S: EditSurface>(store: &PageAnnotationStore, page: u32, surface: &mut S) {
    surface.clear();
    let Some(page_records) = store.page(page) else {
        return;
    };

    for record in &page_records.records {
        match object_from_record(record) {
            Ok(object) => surface.add_object(object),
            Err(err) => log::warn!("skipping annotation on page {page}: {err}"),
        }
    }
}

pub(crate) fn record_from(object: &SurfaceObject) -> AnnotationRecord {
    match object {
        SurfaceObject::Text(text) => AnnotationRecord::Text {
            text: text.text.clone(),
            left: text.left,
            top: text.top,
            font_family: text.font_family.clone(),
            font_size: text.font_size,
            fill: text.fill.clone(),
            font_weight: text.font_weight,
            font_style: text.font_style,
            underline: text.underline,
            width: text.width,
            scale_x: text.scale_x,
            scale_y: text.scale_y,
            angle: text.angle,
        },
        SurfaceObject::Image(image) => AnnotationRecord::Image {
            src: image.src.clone(),
            left: image.left,
            top: image.top,
            display_width: Some(image.display_width()),
            display_height: Some(image.display_height()),
            angle: image.angle,
            width: None,
            height: None,
            scale_x: None,
            scale_y: None,
        },
    }
}

/// Rebuild one surface object from its record.
///
/// Image scale falls back through three tiers: explicit display size,
/// legacy width/height times legacy scale, then the natural size as-is.
pub(crate) fn object_from_record(record: &AnnotationRecord) -> Result<SurfaceObject, HydrateError> {
    match record {
        AnnotationRecord::Text {
            text,
            left,
            top,
            font_family,
            font_size,
            fill,
            font_weight,
            font_style,
            underline,
            width,
            scale_x,
            scale_y,
            angle,
        } => Ok(SurfaceObject::Text(TextObject {
            text: text.clone(),
            left: *left,
            top: *top,
            font_family: font_family.clone(),
            font_size: *font_size,
            fill: fill.clone(),
            font_weight: *font_weight,
            font_style: *font_style,
            underline: *underline,
            width: *width,
            scale_x: *scale_x,
            scale_y: *scale_y,
            angle: *angle,
        })),
        AnnotationRecord::Image {
            src,
            left,
            top,
            display_width,
            display_height,
            angle,
            width,
            height,
            scale_x,
            scale_y,
        } => {
            let decoded = payload::decode_data_uri(src)?;
            let image = image::load_from_memory(&decoded.bytes)?;
            let natural_width = image.width() as f32;
            let natural_height = image.height() as f32;

            let (display_w, display_h) = match (display_width, display_height) {
                (Some(w), Some(h)) => (*w, *h),
                _ => match (width, height) {
                    (Some(w), Some(h)) => {
                        (w * scale_x.unwrap_or(1.0), h * scale_y.unwrap_or(1.0))
                    }
                    _ => (natural_width, natural_height),
                },
            };

            Ok(SurfaceObject::Image(ImageObject {
                src: src.clone(),
                left: *left,
                top: *top,
                natural_width,
                natural_height,
                scale_x: display_w / natural_width,
                scale_y: display_h / natural_height,
                angle: *angle,
            }))
        }
    }
}

//! Byte-level PDF mutation: draw text and images onto existing pages.
//!
//! PDF uses a bottom-left origin; callers are expected to hand in
//! coordinates already flipped into PDF space. New drawing commands are
//! appended as extra content streams so all original page content is
//! preserved.

use image::ImageFormat;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::BTreeMap;

use crate::PageSize;

#[derive(Debug, thiserror::Error)]
pub enum MutateError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("page object is not a dictionary")]
    MalformedPage,
}

/// The standard fonts the exporter can select between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    Courier,
    TimesRoman,
}

impl StandardFont {
    /// Map a CSS-style family name onto a standard font.
    ///
    /// Case-insensitive substring match; anything unrecognized (including an
    /// explicit "Verdana") falls back to Helvetica.
    pub fn for_family(family: &str) -> Self {
        let family = family.to_ascii_lowercase();
        if family.contains("courier") {
            StandardFont::Courier
        } else if family.contains("times") {
            StandardFont::TimesRoman
        } else {
            StandardFont::Helvetica
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::Courier => "Courier",
            StandardFont::TimesRoman => "Times-Roman",
        }
    }

    fn resource_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "FovHelv",
            StandardFont::Courier => "FovCour",
            StandardFont::TimesRoman => "FovTimes",
        }
    }
}

/// Text drawing command in PDF space.
#[derive(Debug, Clone)]
pub struct TextOp<'a> {
    pub text: &'a str,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub font: StandardFont,
    /// Normalized RGB channels, each in `0.0..=1.0`.
    pub color: (f32, f32, f32),
}

/// Image drawing command in PDF space; width/height are the drawn extent.
#[derive(Debug, Clone, Copy)]
pub struct ImageOp {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Handle to an image XObject already embedded in the document.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedImage {
    object_id: ObjectId,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

/// A loaded PDF open for appending text and image draws.
pub struct MutableDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
    font_objects: BTreeMap<&'static str, ObjectId>,
    image_seq: u32,
}

impl MutableDocument {
    /// Parse document bytes. The caller validates the header beforehand.
    pub fn load(bytes: &[u8]) -> Result<Self, MutateError> {
        let doc = Document::load_mem(bytes)?;
        let pages = doc.get_pages();
        Ok(Self { doc, pages, font_objects: BTreeMap::new(), image_seq: 0 })
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId, MutateError> {
        self.pages.get(&page_number).copied().ok_or(MutateError::PageOutOfRange {
            page: page_number,
            page_count: self.pages.len() as u32,
        })
    }

    /// Page size in points for a 1-based page number.
    pub fn page_size(&self, page_number: u32) -> Result<PageSize, MutateError> {
        let page_id = self.page_id(page_number)?;
        let page_obj = self.doc.get_object(page_id)?;
        Ok(media_box(&self.doc, page_obj, 10))
    }

    /// Draw a text run onto a page, registering the font resource as needed.
    pub fn draw_text(&mut self, page_number: u32, op: &TextOp<'_>) -> Result<(), MutateError> {
        let page_id = self.page_id(page_number)?;
        let font_name = self.ensure_font(page_id, op.font)?;

        let (r, g, b) = op.color;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![font_name.into(), op.size.into()]),
                Operation::new("rg", vec![r.into(), g.into(), b.into()]),
                Operation::new("Td", vec![op.x.into(), op.y.into()]),
                Operation::new("Tj", vec![Object::string_literal(op.text)]),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        };

        self.append_content(page_id, content)
    }

    /// Embed PNG bytes as an RGB image XObject.
    ///
    /// The pixel data is re-encoded as raw DeviceRGB; alpha is dropped.
    pub fn embed_png(&mut self, bytes: &[u8]) -> Result<EmbeddedImage, MutateError> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();

        let dict = Dictionary::from_iter([
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(i64::from(width))),
            ("Height", Object::Integer(i64::from(height))),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
        ]);
        let object_id = self.doc.add_object(Stream::new(dict, rgb.into_raw()));

        Ok(EmbeddedImage { object_id, pixel_width: width, pixel_height: height })
    }

    /// Embed JPEG bytes as a DCT-encoded image XObject.
    ///
    /// The original compressed bytes are stored directly; decode is only
    /// performed to validate the data and read the pixel dimensions.
    pub fn embed_jpg(&mut self, bytes: &[u8]) -> Result<EmbeddedImage, MutateError> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
        let width = decoded.width();
        let height = decoded.height();

        let dict = Dictionary::from_iter([
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(i64::from(width))),
            ("Height", Object::Integer(i64::from(height))),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"DCTDecode".to_vec())),
        ]);
        let object_id = self.doc.add_object(Stream::new(dict, bytes.to_vec()));

        Ok(EmbeddedImage { object_id, pixel_width: width, pixel_height: height })
    }

    /// Draw an embedded image onto a page at the given extent.
    pub fn draw_image(
        &mut self,
        page_number: u32,
        image: &EmbeddedImage,
        op: ImageOp,
    ) -> Result<(), MutateError> {
        let page_id = self.page_id(page_number)?;

        self.image_seq += 1;
        let name = format!("ImOv{}", self.image_seq);
        self.add_resource(page_id, "XObject", &name, image.object_id)?;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        op.width.into(),
                        0.into(),
                        0.into(),
                        op.height.into(),
                        op.x.into(),
                        op.y.into(),
                    ],
                ),
                Operation::new("Do", vec![name.as_str().into()]),
                Operation::new("Q", vec![]),
            ],
        };

        self.append_content(page_id, content)
    }

    /// Serialize the modified document.
    pub fn save(mut self) -> Result<Vec<u8>, MutateError> {
        let mut output = Vec::new();
        self.doc.save_to(&mut output)?;
        Ok(output)
    }

    fn ensure_font(
        &mut self,
        page_id: ObjectId,
        font: StandardFont,
    ) -> Result<&'static str, MutateError> {
        let name = font.resource_name();
        let font_id = match self.font_objects.get(name) {
            Some(id) => *id,
            None => {
                let id = self.doc.add_object(Dictionary::from_iter([
                    ("Type", Object::Name(b"Font".to_vec())),
                    ("Subtype", Object::Name(b"Type1".to_vec())),
                    ("BaseFont", Object::Name(font.base_font().as_bytes().to_vec())),
                ]));
                self.font_objects.insert(name, id);
                id
            }
        };

        self.add_resource(page_id, "Font", name, font_id)?;
        Ok(name)
    }

    /// Register `name -> reference` in the page's Resources sub-dictionary.
    ///
    /// Shared or referenced Resources dictionaries are localized onto the
    /// page so the edit cannot leak into sibling pages.
    fn add_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        name: &str,
        target: ObjectId,
    ) -> Result<(), MutateError> {
        let mut resources = match self.page_dict(page_id)?.get(b"Resources").ok().cloned() {
            Some(Object::Dictionary(dict)) => dict,
            Some(Object::Reference(id)) => match self.doc.get_object(id)? {
                Object::Dictionary(dict) => dict.clone(),
                _ => Dictionary::new(),
            },
            _ => Dictionary::new(),
        };

        let mut sub = match resources.get(category.as_bytes()).ok().cloned() {
            Some(Object::Dictionary(dict)) => dict,
            Some(Object::Reference(id)) => match self.doc.get_object(id)? {
                Object::Dictionary(dict) => dict.clone(),
                _ => Dictionary::new(),
            },
            _ => Dictionary::new(),
        };
        sub.set(name, Object::Reference(target));
        resources.set(category, Object::Dictionary(sub));

        self.page_dict_mut(page_id)?.set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn append_content(&mut self, page_id: ObjectId, content: Content) -> Result<(), MutateError> {
        let encoded = content.encode()?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));

        let dict = self.page_dict_mut(page_id)?;
        let existing = dict.get(b"Contents").ok().cloned();
        match existing {
            Some(Object::Reference(existing_id)) => {
                dict.set(
                    "Contents",
                    Object::Array(vec![
                        Object::Reference(existing_id),
                        Object::Reference(content_id),
                    ]),
                );
            }
            Some(Object::Array(mut array)) => {
                array.push(Object::Reference(content_id));
                dict.set("Contents", Object::Array(array));
            }
            _ => {
                dict.set("Contents", Object::Reference(content_id));
            }
        }

        Ok(())
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary, MutateError> {
        match self.doc.get_object(page_id)? {
            Object::Dictionary(dict) => Ok(dict),
            _ => Err(MutateError::MalformedPage),
        }
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary, MutateError> {
        match self.doc.get_object_mut(page_id)? {
            Object::Dictionary(dict) => Ok(dict),
            _ => Err(MutateError::MalformedPage),
        }
    }
}

/// Resolve a page's MediaBox, walking up the Pages tree with a depth limit.
/// Falls back to US Letter when absent or malformed.
fn media_box(doc: &Document, page_obj: &Object, depth: usize) -> PageSize {
    if depth == 0 {
        return PageSize::default();
    }

    if let Object::Dictionary(dict) = page_obj {
        if let Ok(media_box_obj) = dict.get(b"MediaBox") {
            let array = match media_box_obj {
                Object::Array(array) => Some(array.clone()),
                Object::Reference(id) => match doc.get_object(*id) {
                    Ok(Object::Array(array)) => Some(array.clone()),
                    _ => None,
                },
                _ => None,
            };

            if let Some(array) = array {
                if array.len() == 4 {
                    let values: Vec<f32> =
                        array.iter().filter_map(|obj| obj.as_float().ok()).collect();
                    if values.len() == 4 {
                        return PageSize {
                            width_pt: (values[2] - values[0]).abs(),
                            height_pt: (values[3] - values[1]).abs(),
                        };
                    }
                }
            }
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            if let Ok(parent) = doc.get_object(*parent_id) {
                return media_box(doc, parent, depth - 1);
            }
        }
    }

    PageSize::default()
}

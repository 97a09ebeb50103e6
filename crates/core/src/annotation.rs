//! Serializable annotation records and their page-keyed store.
//!
//! Records store screen-space coordinates exactly as the edit layer sees
//! them; the render scale active at capture time travels with each page so
//! projection stays correct across viewport resizes. Field names follow the
//! persisted JSON shape (camelCase, `type` tag), including the legacy image
//! sizing fields older captures may still carry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::geometry::BASE_SCALE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

fn default_unit_scale() -> f32 {
    1.0
}

/// One captured annotation. Coordinates are screen pixels, top-left origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationRecord {
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        left: f32,
        top: f32,
        font_family: String,
        font_size: f32,
        /// `#rrggbb` color string.
        fill: String,
        #[serde(default)]
        font_weight: FontWeight,
        #[serde(default)]
        font_style: FontStyle,
        #[serde(default)]
        underline: bool,
        width: f32,
        #[serde(default = "default_unit_scale")]
        scale_x: f32,
        #[serde(default = "default_unit_scale")]
        scale_y: f32,
        #[serde(default)]
        angle: f32,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        /// Base64 data URI carrying the image payload.
        src: String,
        left: f32,
        top: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_width: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_height: Option<f32>,
        #[serde(default)]
        angle: f32,
        // Legacy sizing fields; still honored on hydrate.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale_x: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale_y: Option<f32>,
    },
}

impl AnnotationRecord {
    pub fn position(&self) -> (f32, f32) {
        match self {
            AnnotationRecord::Text { left, top, .. }
            | AnnotationRecord::Image { left, top, .. } => (*left, *top),
        }
    }

    pub fn shift(&mut self, dx: f32, dy: f32) {
        match self {
            AnnotationRecord::Text { left, top, .. }
            | AnnotationRecord::Image { left, top, .. } => {
                *left += dx;
                *top += dy;
            }
        }
    }
}

/// Everything captured for one page: the ordered records plus the render
/// scale that was in effect when they were captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecords {
    pub render_scale: f32,
    pub records: Vec<AnnotationRecord>,
}

impl Default for PageRecords {
    fn default() -> Self {
        Self { render_scale: BASE_SCALE, records: Vec::new() }
    }
}

/// Per-page annotation store keyed by 1-based page number.
///
/// Once a document is loaded every page in `[1, total_pages]` has an entry;
/// capture replaces a page's entry wholesale.
#[derive(Debug, Clone, Default)]
pub struct PageAnnotationStore {
    pages: BTreeMap<u32, PageRecords>,
}

impl PageAnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the store to one empty entry per page.
    pub fn init_pages(&mut self, page_count: u32) {
        self.pages.clear();
        for page in 1..=page_count {
            self.pages.insert(page, PageRecords::default());
        }
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn set_page(&mut self, page: u32, records: PageRecords) {
        self.pages.insert(page, records);
    }

    pub fn page(&self, page: u32) -> Option<&PageRecords> {
        self.pages.get(&page)
    }

    /// Pages in ascending page-number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &PageRecords)> {
        self.pages.iter().map(|(page, records)| (*page, records))
    }
}

//! The live edit layer: surface objects and selection.
//!
//! A surface is what the user manipulates between captures. The session only
//! needs the operations in [`EditSurface`]; [`MemorySurface`] is the
//! in-process implementation used by the controller and the tests.

use crate::annotation::{FontStyle, FontWeight};

/// A live text box on the edit surface. Coordinates are screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextObject {
    pub text: String,
    pub left: f32,
    pub top: f32,
    pub font_family: String,
    pub font_size: f32,
    pub fill: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub underline: bool,
    pub width: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub angle: f32,
}

/// A live image on the edit surface.
///
/// `natural_width`/`natural_height` are the decoded pixel dimensions; the
/// drawn size is the natural size times the scale factors.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageObject {
    pub src: String,
    pub left: f32,
    pub top: f32,
    pub natural_width: f32,
    pub natural_height: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub angle: f32,
}

impl ImageObject {
    pub fn display_width(&self) -> f32 {
        self.natural_width * self.scale_x
    }

    pub fn display_height(&self) -> f32 {
        self.natural_height * self.scale_y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceObject {
    Text(TextObject),
    Image(ImageObject),
}

/// Operations the session needs from an edit surface implementation.
pub trait EditSurface {
    fn add_object(&mut self, object: SurfaceObject);
    fn remove_selected(&mut self) -> Option<SurfaceObject>;
    fn selected(&self) -> Option<&SurfaceObject>;
    /// Select the object at `index`; out-of-range indices clear the selection.
    fn select(&mut self, index: usize);
    fn select_last(&mut self);
    fn clear_selection(&mut self);
    /// Remove every object and the selection.
    fn clear(&mut self);
    /// All objects in insertion (z) order.
    fn objects(&self) -> &[SurfaceObject];
}

#[derive(Debug, Default)]
pub struct MemorySurface {
    objects: Vec<SurfaceObject>,
    selected: Option<usize>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EditSurface for MemorySurface {
    fn add_object(&mut self, object: SurfaceObject) {
        self.objects.push(object);
    }

    fn remove_selected(&mut self) -> Option<SurfaceObject> {
        let index = self.selected.take()?;
        if index < self.objects.len() {
            Some(self.objects.remove(index))
        } else {
            None
        }
    }

    fn selected(&self) -> Option<&SurfaceObject> {
        self.objects.get(self.selected?)
    }

    fn select(&mut self, index: usize) {
        self.selected = if index < self.objects.len() { Some(index) } else { None };
    }

    fn select_last(&mut self) {
        self.selected = self.objects.len().checked_sub(1);
    }

    fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.selected = None;
    }

    fn objects(&self) -> &[SurfaceObject] {
        &self.objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_object(text: &str) -> SurfaceObject {
        SurfaceObject::Text(TextObject {
            text: text.to_owned(),
            left: 0.0,
            top: 0.0,
            font_family: "Arial".to_owned(),
            font_size: 16.0,
            fill: "#000000".to_owned(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            underline: false,
            width: 200.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        })
    }

    #[test]
    fn objects_keep_insertion_order() {
        let mut surface = MemorySurface::new();
        surface.add_object(text_object("a"));
        surface.add_object(text_object("b"));

        let texts: Vec<_> = surface
            .objects()
            .iter()
            .map(|object| match object {
                SurfaceObject::Text(t) => t.text.as_str(),
                SurfaceObject::Image(_) => "image",
            })
            .collect();
        assert_eq!(texts, ["a", "b"]);
    }

    #[test]
    fn remove_selected_takes_the_selection() {
        let mut surface = MemorySurface::new();
        surface.add_object(text_object("a"));
        surface.add_object(text_object("b"));
        surface.select(0);

        let removed = surface.remove_selected().expect("object removed");
        assert!(matches!(removed, SurfaceObject::Text(t) if t.text == "a"));
        assert_eq!(surface.objects().len(), 1);
        assert!(surface.selected().is_none());
    }

    #[test]
    fn remove_without_selection_is_a_no_op() {
        let mut surface = MemorySurface::new();
        surface.add_object(text_object("a"));
        assert!(surface.remove_selected().is_none());
        assert_eq!(surface.objects().len(), 1);
    }

    #[test]
    fn select_out_of_range_clears_selection() {
        let mut surface = MemorySurface::new();
        surface.add_object(text_object("a"));
        surface.select(0);
        surface.select(5);
        assert!(surface.selected().is_none());
    }

    #[test]
    fn select_last_follows_additions() {
        let mut surface = MemorySurface::new();
        surface.select_last();
        assert!(surface.selected().is_none());

        surface.add_object(text_object("a"));
        surface.add_object(text_object("b"));
        surface.select_last();
        assert!(matches!(surface.selected(), Some(SurfaceObject::Text(t)) if t.text == "b"));
    }

    #[test]
    fn image_display_size_is_natural_times_scale() {
        let image = ImageObject {
            src: String::new(),
            left: 0.0,
            top: 0.0,
            natural_width: 64.0,
            natural_height: 32.0,
            scale_x: 0.5,
            scale_y: 0.25,
            angle: 0.0,
        };
        assert_eq!(image.display_width(), 32.0);
        assert_eq!(image.display_height(), 8.0);
    }
}

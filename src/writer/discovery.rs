//! Resource discovery: one scan over every page collecting the fonts,
//! characters, alpha values, images and optional-content groups the
//! document uses.
//!
//! Every collection keeps first-insertion order; resource names
//! (`/F0`, `/A1`, `/Im2`, ...) are later assigned from these positions.

use crate::config::TextMode;
use crate::elements::{ContentId, Document, Figure, GroupExpr, ImageResource, Paint};
use crate::fonts::encoding::is_encodable;
use crate::fonts::FontFamily;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Characters one font family shows across the document.
#[derive(Debug, Clone)]
pub struct FamilyUsage {
    /// The family
    pub family: Arc<FontFamily>,
    /// Used characters, first use first
    pub chars: IndexSet<char>,
}

/// A family's characters split by single-byte encodability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharPartition {
    /// Characters with a slot in the single-byte table
    pub encodable: Vec<char>,
    /// Characters that need glyph-indexed encoding
    pub non_encodable: Vec<char>,
}

impl FamilyUsage {
    /// Split the used characters. Both halves keep first-use order.
    pub fn partition(&self) -> CharPartition {
        let (encodable, non_encodable): (Vec<char>, Vec<char>) =
            self.chars.iter().partition(|ch| is_encodable(**ch));
        CharPartition {
            encodable,
            non_encodable,
        }
    }
}

/// Everything discovery found.
#[derive(Debug, Clone)]
pub struct DiscoveredResources {
    /// Font families keyed by file identity
    pub families: IndexMap<String, FamilyUsage>,
    /// Distinct alpha values; index 0 is always 1.0
    pub alphas: Vec<f64>,
    /// Images keyed by content identity
    pub images: IndexMap<ContentId, Arc<ImageResource>>,
    /// Layer names
    pub layers: IndexSet<String>,
    /// Group expressions keyed by their string form
    pub groups: IndexMap<String, GroupExpr>,
}

impl Default for DiscoveredResources {
    fn default() -> Self {
        Self {
            families: IndexMap::new(),
            alphas: vec![1.0],
            images: IndexMap::new(),
            layers: IndexSet::new(),
            groups: IndexMap::new(),
        }
    }
}

impl DiscoveredResources {
    /// Index of an alpha value, compared bit for bit so NaN finds itself.
    pub fn alpha_index(&self, alpha: f64) -> Option<usize> {
        self.alphas.iter().position(|a| a.to_bits() == alpha.to_bits())
    }

    /// Index of a family.
    pub fn family_index(&self, family: &FontFamily) -> Option<usize> {
        self.families.get_index_of(family.key())
    }

    /// Index of an image.
    pub fn image_index(&self, image: &ImageResource) -> Option<usize> {
        self.images.get_index_of(image.content_id())
    }

    /// Index of a group expression.
    pub fn group_index(&self, group: &GroupExpr) -> Option<usize> {
        self.groups.get_index_of(&group.to_string())
    }

    fn add_alpha(&mut self, alpha: f64) {
        if self.alpha_index(alpha).is_none() {
            self.alphas.push(alpha);
        }
    }

    fn add_paint(&mut self, paint: Option<&Paint>) {
        if let Some(paint) = paint {
            for alpha in paint.alphas() {
                self.add_alpha(alpha);
            }
        }
    }

    fn visit(&mut self, figure: &Figure, text_mode: TextMode) {
        match figure {
            Figure::Path(path) => {
                if !path.is_clipping {
                    self.add_paint(path.fill.as_ref());
                    self.add_paint(path.stroke.as_ref());
                }
            },
            Figure::Text(text) => {
                self.add_paint(text.fill.as_ref());
                self.add_paint(text.stroke.as_ref());
                if text_mode == TextMode::SubsetAndEmbed {
                    let family = &text.font.family;
                    let usage = self
                        .families
                        .entry(family.key().to_string())
                        .or_insert_with(|| FamilyUsage {
                            family: Arc::clone(family),
                            chars: IndexSet::new(),
                        });
                    usage.chars.extend(text.text.chars());
                }
            },
            Figure::Image(image) => {
                self.images
                    .entry(*image.image.content_id())
                    .or_insert_with(|| Arc::clone(&image.image));
            },
            Figure::OptionalContent(marker) => {
                for layer in marker.group.layers() {
                    self.layers.insert(layer.to_string());
                }
                self.groups
                    .entry(marker.group.to_string())
                    .or_insert_with(|| marker.group.clone());
            },
            Figure::Filtered(filtered) => {
                for inner in &filtered.figures {
                    self.visit(inner, text_mode);
                }
            },
            Figure::Transform(_) => {},
        }
    }
}

/// Scan every page of a document in order.
pub fn discover(document: &Document, text_mode: TextMode) -> DiscoveredResources {
    let mut found = DiscoveredResources::default();
    for page in &document.pages {
        if let Some(background) = page.background {
            found.add_alpha(background.a);
        }
        for figure in &page.figures {
            found.visit(figure, text_mode);
        }
    }

    log::debug!(
        "Discovered {} font families, {} alpha values, {} images, {} layers",
        found.families.len(),
        found.alphas.len(),
        found.images.len(),
        found.layers.len()
    );
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{
        Color, Gradient, GradientStop, ImageFigure, MarkerKind, OptionalContentMarker, Page,
        PathFigure, TextFigure,
    };
    use crate::fonts::{Base14Font, Font};
    use crate::geometry::Point;

    fn helvetica() -> Arc<FontFamily> {
        Arc::new(FontFamily::new(
            "Helvetica",
            Arc::new(Base14Font::new("Helvetica").unwrap()),
        ))
    }

    fn text(s: &str, family: &Arc<FontFamily>) -> Figure {
        Figure::Text(TextFigure::new(s, Font::new(Arc::clone(family), 12.0), Point::default()))
    }

    #[test]
    fn test_alpha_set_is_seeded_with_opaque() {
        let found = discover(&Document::new(), TextMode::SubsetAndEmbed);
        assert_eq!(found.alphas, vec![1.0]);
        assert_eq!(found.alpha_index(1.0), Some(0));
    }

    #[test]
    fn test_alphas_from_solid_and_gradient_paints() {
        let gradient = Gradient::linear(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            vec![
                GradientStop::new(0.0, Color::rgba(1.0, 0.0, 0.0, 1.0)),
                GradientStop::new(1.0, Color::rgba(0.0, 0.0, 1.0, 0.5)),
            ],
        );
        let mut page = Page::new(10.0, 10.0);
        page.figures.push(Figure::Path(
            PathFigure::rect(0.0, 0.0, 1.0, 1.0).with_fill(Color::rgba(0.0, 0.0, 0.0, 0.25)),
        ));
        page.figures
            .push(Figure::Path(PathFigure::rect(0.0, 0.0, 1.0, 1.0).with_fill(gradient)));
        let mut doc = Document::new();
        doc.push(page);

        let found = discover(&doc, TextMode::SubsetAndEmbed);
        assert_eq!(found.alphas, vec![1.0, 0.25, 0.5]);
    }

    #[test]
    fn test_nan_alpha_recorded_once() {
        let faded = Color::rgba(0.0, 0.0, 0.0, f64::NAN);
        let mut page = Page::new(10.0, 10.0);
        for _ in 0..3 {
            page.figures.push(Figure::Path(
                PathFigure::rect(0.0, 0.0, 1.0, 1.0).with_fill(faded),
            ));
        }
        let mut doc = Document::new();
        doc.push(page);
        let found = discover(&doc, TextMode::SubsetAndEmbed);
        assert_eq!(found.alphas.len(), 2);
        assert_eq!(found.alpha_index(f64::NAN), Some(1));
    }

    #[test]
    fn test_family_chars_accumulate_across_pages() {
        let family = helvetica();
        let mut doc = Document::new();
        for s in ["ab", "bc€"] {
            let mut page = Page::new(10.0, 10.0);
            page.figures.push(text(s, &family));
            doc.push(page);
        }
        let found = discover(&doc, TextMode::SubsetAndEmbed);
        assert_eq!(found.families.len(), 1);
        let usage = &found.families["Helvetica"];
        assert_eq!(usage.chars.iter().collect::<String>(), "abc€");
        assert_eq!(usage.partition().non_encodable, Vec::<char>::new());
    }

    #[test]
    fn test_partition_routes_unmapped_chars() {
        let family = helvetica();
        let mut page = Page::new(10.0, 10.0);
        page.figures.push(text("aΩb", &family));
        let mut doc = Document::new();
        doc.push(page);
        let found = discover(&doc, TextMode::SubsetAndEmbed);
        let partition = found.families["Helvetica"].partition();
        assert_eq!(partition.encodable, vec!['a', 'b']);
        assert_eq!(partition.non_encodable, vec!['Ω']);
    }

    #[test]
    fn test_text_to_paths_skips_fonts() {
        let family = helvetica();
        let mut page = Page::new(10.0, 10.0);
        page.figures.push(text("a", &family));
        let mut doc = Document::new();
        doc.push(page);
        assert!(discover(&doc, TextMode::ConvertTextToPaths).families.is_empty());
    }

    #[test]
    fn test_images_deduplicated_by_content() {
        let a = Arc::new(ImageResource::from_rgba8(1, 1, &[1, 2, 3, 255]).unwrap());
        let b = Arc::new(ImageResource::from_rgba8(1, 1, &[1, 2, 3, 255]).unwrap());
        let mut page = Page::new(10.0, 10.0);
        page.figures.push(Figure::Image(ImageFigure { image: a, tag: None }));
        page.figures.push(Figure::Image(ImageFigure { image: b, tag: None }));
        let mut doc = Document::new();
        doc.push(page);
        assert_eq!(discover(&doc, TextMode::SubsetAndEmbed).images.len(), 1);
    }

    #[test]
    fn test_groups_and_layers() {
        let expr = GroupExpr::And(vec![
            GroupExpr::layer("A"),
            GroupExpr::Not(Box::new(GroupExpr::layer("B"))),
        ]);
        let mut page = Page::new(10.0, 10.0);
        for kind in [MarkerKind::Start, MarkerKind::End] {
            page.figures.push(Figure::OptionalContent(OptionalContentMarker {
                kind,
                group: expr.clone(),
            }));
        }
        let mut doc = Document::new();
        doc.push(page);
        let found = discover(&doc, TextMode::SubsetAndEmbed);
        assert_eq!(found.layers.iter().map(String::as_str).collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(found.groups.len(), 1);
        assert_eq!(found.group_index(&expr), Some(0));
    }
}

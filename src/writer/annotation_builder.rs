//! Link annotations (ISO 32000-1, Section 12.5.6.5).
//!
//! Links are resolved in two phases. While pages are generated, each
//! tagged region with a registered destination becomes a
//! [`LinkAnnotation`]; same-document targets are kept as page indices.
//! Once every page object exists, [`LinkAnnotation::build`] turns the
//! index into the target page's handle.

use super::bounds::TaggedBoundsTable;
use super::layers::OptionalContent;
use crate::config::{INTERNAL_LINK_PREFIX, LAYER_TOGGLE_PREFIX};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::object::{Dict, Object, ObjectId};
use indexmap::IndexMap;

/// Action for link annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkAction {
    /// Open a URI (external link)
    Uri(String),
    /// Go to a point on a page of this document
    GoTo {
        /// Page index (0-indexed)
        page: usize,
        /// Top-left corner of the target region
        point: Point,
    },
    /// Toggle an optional content group
    ToggleLayer(ObjectId),
}

/// A link annotation for hyperlinks.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnnotation {
    /// Clickable region (in page coordinates)
    pub rect: Rect,
    /// The action to perform when clicked
    pub action: LinkAction,
}

impl LinkAnnotation {
    /// Build the annotation dictionary, resolving page indices through
    /// `page_refs`.
    pub fn build(&self, page_refs: &[ObjectId]) -> Result<Dict> {
        let mut dict = Dict::new();

        dict.insert("Type".to_string(), Object::name("Annot"));
        dict.insert("Subtype".to_string(), Object::name("Link"));
        dict.insert(
            "Rect".to_string(),
            Object::reals(&[self.rect.x0, self.rect.y0, self.rect.x1, self.rect.y1]),
        );
        dict.insert("Border".to_string(), Object::reals(&[0.0, 0.0, 0.0]));

        match &self.action {
            LinkAction::Uri(uri) => {
                dict.insert(
                    "A".to_string(),
                    Object::dict(vec![("S", Object::name("URI")), ("URI", Object::string(uri))]),
                );
            },
            LinkAction::GoTo { page, point } => {
                let page_ref = page_refs.get(*page).ok_or_else(|| {
                    Error::ResourceLookup(format!("link target page {} does not exist", page))
                })?;
                dict.insert(
                    "Dest".to_string(),
                    Object::Array(vec![
                        Object::Reference(*page_ref),
                        Object::name("XYZ"),
                        Object::Real(point.x),
                        Object::Real(point.y),
                        Object::Null,
                    ]),
                );
            },
            LinkAction::ToggleLayer(ocg) => {
                dict.insert(
                    "A".to_string(),
                    Object::dict(vec![
                        ("S", Object::name("SetOCGState")),
                        (
                            "State",
                            Object::Array(vec![Object::name("Toggle"), Object::Reference(*ocg)]),
                        ),
                    ]),
                );
            },
        }

        Ok(dict)
    }
}

/// Turns tagged regions into link annotations.
#[derive(Debug)]
pub struct LinkResolver<'a> {
    destinations: &'a IndexMap<String, String>,
    layers: &'a OptionalContent,
    /// Tag -> (page index, first rectangle) of its first occurrence
    first_occurrence: IndexMap<&'a str, (usize, Rect)>,
}

impl<'a> LinkResolver<'a> {
    /// Index the first occurrence of every tag across all pages.
    pub fn new(
        destinations: &'a IndexMap<String, String>,
        tables: &'a [TaggedBoundsTable],
        layers: &'a OptionalContent,
    ) -> Self {
        let mut first_occurrence = IndexMap::new();
        for (page, table) in tables.iter().enumerate() {
            for (tag, rects) in table {
                if let Some(rect) = rects.first() {
                    first_occurrence.entry(tag.as_str()).or_insert((page, *rect));
                }
            }
        }
        Self {
            destinations,
            layers,
            first_occurrence,
        }
    }

    /// Classify a destination string. `None` when it cannot be resolved.
    fn action(&self, tag: &str, destination: &str) -> Option<LinkAction> {
        if let Some(layer) = destination.strip_prefix(LAYER_TOGGLE_PREFIX) {
            match self.layers.ocg(layer) {
                Some(ocg) => Some(LinkAction::ToggleLayer(ocg)),
                None => {
                    log::warn!("Link '{}' toggles unknown layer '{}', skipped", tag, layer);
                    None
                },
            }
        } else if let Some(target) = destination.strip_prefix(INTERNAL_LINK_PREFIX) {
            match self.first_occurrence.get(target) {
                Some((page, rect)) => Some(LinkAction::GoTo {
                    page: *page,
                    point: Point::new(rect.x0, rect.y1),
                }),
                None => {
                    log::warn!(
                        "Link '{}' targets tag '{}' which never occurs, skipped",
                        tag,
                        target
                    );
                    None
                },
            }
        } else {
            Some(LinkAction::Uri(destination.to_string()))
        }
    }

    /// Links of one page: one annotation per occurrence of each linked tag.
    pub fn page_links(&self, table: &TaggedBoundsTable) -> Vec<LinkAnnotation> {
        let mut links = Vec::new();
        for (tag, rects) in table {
            let Some(destination) = self.destinations.get(tag) else {
                continue;
            };
            let Some(action) = self.action(tag, destination) else {
                continue;
            };
            links.extend(rects.iter().map(|rect| LinkAnnotation {
                rect: *rect,
                action: action.clone(),
            }));
        }
        links
    }
}

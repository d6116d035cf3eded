//! Extended Graphics State (ExtGState) for transparency.
//!
//! Every distinct alpha value in the document becomes one shared state
//! (`/A{i}`); every non-opaque gradient usage gets its own luminosity
//! soft mask state (`/S{i}` on its page).
//!
//! # Example
//!
//! ```
//! use scene_pdf::writer::graphics_state::ExtGStateBuilder;
//!
//! let gs = ExtGStateBuilder::new().alpha(0.5).build();
//! assert_eq!(gs.as_dict().map(|d| d.len()), Some(3));
//! ```

use super::object_graph::ObjectGraph;
use crate::object::{Dict, Object, ObjectId};

/// Soft mask carried by a graphics state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoftMask {
    /// `/SMask /None`
    None,
    /// Luminosity of a transparency group form
    Luminosity {
        /// The form XObject
        group: ObjectId,
    },
}

/// Builder for Extended Graphics State dictionaries.
#[derive(Debug, Clone, Default)]
pub struct ExtGStateBuilder {
    /// Fill alpha (ca) - 0.0 to 1.0
    fill_alpha: Option<f64>,
    /// Stroke alpha (CA) - 0.0 to 1.0
    stroke_alpha: Option<f64>,
    /// Soft mask (SMask)
    soft_mask: Option<SoftMask>,
}

impl ExtGStateBuilder {
    /// Create a new ExtGState builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fill alpha.
    pub fn fill_alpha(mut self, alpha: f64) -> Self {
        self.fill_alpha = Some(alpha);
        self
    }

    /// Set stroke alpha.
    pub fn stroke_alpha(mut self, alpha: f64) -> Self {
        self.stroke_alpha = Some(alpha);
        self
    }

    /// Set both fill and stroke alpha.
    pub fn alpha(self, alpha: f64) -> Self {
        self.fill_alpha(alpha).stroke_alpha(alpha)
    }

    /// Set the soft mask.
    pub fn soft_mask(mut self, mask: SoftMask) -> Self {
        self.soft_mask = Some(mask);
        self
    }

    /// Build the ExtGState dictionary.
    pub fn build_dict(&self) -> Dict {
        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Object::name("ExtGState"));

        if let Some(alpha) = self.fill_alpha {
            dict.insert("ca".to_string(), Object::Real(alpha));
        }
        if let Some(alpha) = self.stroke_alpha {
            dict.insert("CA".to_string(), Object::Real(alpha));
        }

        match self.soft_mask {
            Some(SoftMask::None) => {
                dict.insert("SMask".to_string(), Object::name("None"));
            },
            Some(SoftMask::Luminosity { group }) => {
                dict.insert(
                    "SMask".to_string(),
                    Object::dict(vec![
                        ("Type", Object::name("Mask")),
                        ("S", Object::name("Luminosity")),
                        ("G", Object::Reference(group)),
                    ]),
                );
            },
            None => {},
        }

        dict
    }

    /// Build the ExtGState dictionary as an object.
    pub fn build(&self) -> Object {
        Object::Dictionary(self.build_dict())
    }
}

/// Add one alpha state per value; handle `i` is `/A{i}`.
pub fn add_alpha_states(graph: &mut ObjectGraph, alphas: &[f64]) -> Vec<ObjectId> {
    alphas
        .iter()
        .map(|a| graph.add(ExtGStateBuilder::new().alpha(*a).build()))
        .collect()
}

/// Add a luminosity soft mask state over a transparency group form.
pub fn add_soft_mask_state(graph: &mut ObjectGraph, form: ObjectId) -> ObjectId {
    graph.add(ExtGStateBuilder::new().soft_mask(SoftMask::Luminosity { group: form }).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::object_serializer::ObjectSerializer;

    #[test]
    fn test_ext_gstate_builder_alpha() {
        let gs = ExtGStateBuilder::new().fill_alpha(0.5).stroke_alpha(0.8).build();
        let dict = gs.as_dict().unwrap();
        assert_eq!(dict.get("ca"), Some(&Object::Real(0.5)));
        assert_eq!(dict.get("CA"), Some(&Object::Real(0.8)));
        assert_eq!(dict.get_index_of("Type"), Some(0));
    }

    #[test]
    fn test_alpha_states_follow_input_order() {
        let mut graph = ObjectGraph::new();
        let ids = add_alpha_states(&mut graph, &[1.0, 0.25]);
        assert_eq!(ids.len(), 2);
        let s = ObjectSerializer::new(&[1, 2]);
        assert_eq!(
            s.serialize_to_string(graph.get(ids[1]).unwrap()).unwrap(),
            "<< /Type /ExtGState /ca 0.25 /CA 0.25 >>"
        );
    }

    #[test]
    fn test_soft_mask_state() {
        let mut graph = ObjectGraph::new();
        let form = graph.add(Object::Null);
        let gs = add_soft_mask_state(&mut graph, form);
        let s = ObjectSerializer::new(&[1, 2]);
        assert_eq!(
            s.serialize_to_string(graph.get(gs).unwrap()).unwrap(),
            "<< /Type /ExtGState /SMask << /Type /Mask /S /Luminosity /G 1 0 R >> >>"
        );
    }

    #[test]
    fn test_soft_mask_none() {
        let dict = ExtGStateBuilder::new().soft_mask(SoftMask::None).build_dict();
        assert_eq!(dict.get("SMask"), Some(&Object::name("None")));
    }
}

//! PDF Layers (Optional Content Groups) support.
//!
//! ## PDF Structure
//!
//! Layers are implemented using:
//! - one `/OCG` dictionary per layer name
//! - one `/OCMD` membership dictionary per distinct group expression,
//!   referenced from content streams as `/OC /OC{i} BDC ... EMC`
//! - `/OCProperties` in the catalog listing every OCG with its default
//!   `/ON` or `/OFF` state
//!
//! ## Standards Reference
//!
//! - ISO 32000-1:2008: Section 8.11 "Optional Content"

use super::object_graph::ObjectGraph;
use crate::elements::GroupExpr;
use crate::error::{Error, Result};
use crate::object::{Dict, Object, ObjectId};
use indexmap::{IndexMap, IndexSet};

/// Represents a PDF layer (Optional Content Group).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Name shown in the viewer's layer panel.
    pub name: String,
    /// Whether the layer is initially visible.
    pub visible: bool,
}

impl Layer {
    /// Create a layer with its initial visibility.
    pub fn new(name: impl Into<String>, visible: bool) -> Self {
        Self {
            name: name.into(),
            visible,
        }
    }

    /// Build the OCG dictionary.
    pub fn build_ocg_dict(&self) -> Dict {
        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Object::name("OCG"));
        dict.insert("Name".to_string(), Object::string(&self.name));
        dict
    }
}

/// The document's optional-content objects.
#[derive(Debug, Clone, Default)]
pub struct OptionalContent {
    /// Layers in first-seen order with their OCG handles
    layers: IndexMap<String, (Layer, ObjectId)>,
    /// Membership dictionaries; handle `i` is `/OC{i}`
    groups: Vec<ObjectId>,
}

impl OptionalContent {
    /// Add an OCG per layer and an OCMD per group expression.
    ///
    /// Layers named in `hidden` start switched off.
    pub fn build<'e>(
        graph: &mut ObjectGraph,
        layers: &IndexSet<String>,
        groups: impl IntoIterator<Item = &'e GroupExpr>,
        hidden: &IndexSet<String>,
    ) -> Result<Self> {
        let mut oc = Self::default();
        for name in layers {
            let layer = Layer::new(name.clone(), !hidden.contains(name));
            let id = graph.add(layer.build_ocg_dict());
            oc.layers.insert(name.clone(), (layer, id));
        }
        for expr in groups {
            let membership = oc.build_ocmd_dict(expr)?;
            oc.groups.push(graph.add(membership));
        }
        if !oc.layers.is_empty() {
            log::debug!(
                "Built {} optional content group(s), {} membership dictionary(ies)",
                oc.layers.len(),
                oc.groups.len()
            );
        }
        Ok(oc)
    }

    /// True when the document has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// OCG of a layer.
    pub fn ocg(&self, name: &str) -> Option<ObjectId> {
        self.layers.get(name).map(|(_, id)| *id)
    }

    /// Membership dictionaries in group order.
    pub fn groups(&self) -> &[ObjectId] {
        &self.groups
    }

    fn ocg_ref(&self, name: &str) -> Result<Object> {
        self.ocg(name).map(Object::Reference).ok_or_else(|| {
            Error::ResourceLookup(format!("optional content layer '{}' has no group", name))
        })
    }

    /// Visibility expression (`/VE`) of a group expression.
    ///
    /// `And` and `Or` need at least one operand.
    pub fn visibility_expression(&self, expr: &GroupExpr) -> Result<Object> {
        let (op, operands) = match expr {
            GroupExpr::Layer(name) => return self.ocg_ref(name),
            GroupExpr::Not(inner) => ("Not", vec![self.visibility_expression(inner)?]),
            GroupExpr::And(items) => ("And", self.operands(expr, items)?),
            GroupExpr::Or(items) => ("Or", self.operands(expr, items)?),
        };
        let mut array = vec![Object::name(op)];
        array.extend(operands);
        Ok(Object::Array(array))
    }

    fn operands(&self, expr: &GroupExpr, items: &[GroupExpr]) -> Result<Vec<Object>> {
        if items.is_empty() {
            return Err(Error::InvalidStructure(format!(
                "optional content expression '{}' has an operator without operands",
                expr
            )));
        }
        items.iter().map(|item| self.visibility_expression(item)).collect()
    }

    /// Build the OCMD dictionary of a group expression.
    ///
    /// A bare layer uses `/P /AnyOn` over its single OCG; compound
    /// expressions carry `/VE` plus every mentioned OCG.
    pub fn build_ocmd_dict(&self, expr: &GroupExpr) -> Result<Dict> {
        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Object::name("OCMD"));

        let ocgs = expr
            .layers()
            .into_iter()
            .map(|name| self.ocg_ref(name))
            .collect::<Result<Vec<_>>>()?;
        dict.insert("OCGs".to_string(), Object::Array(ocgs));

        match expr {
            GroupExpr::Layer(_) => {
                dict.insert("P".to_string(), Object::name("AnyOn"));
            },
            compound => {
                dict.insert("VE".to_string(), self.visibility_expression(compound)?);
            },
        }
        Ok(dict)
    }

    /// Build the OCProperties dictionary for the catalog.
    pub fn build_oc_properties(&self) -> Option<Object> {
        if self.layers.is_empty() {
            return None;
        }
        let all = self
            .layers
            .values()
            .map(|(_, id)| Object::Reference(*id))
            .collect::<Vec<_>>();
        let (on, off): (Vec<_>, Vec<_>) = self.layers.values().partition(|(l, _)| l.visible);
        let refs = |v: Vec<&(Layer, ObjectId)>| {
            Object::Array(v.into_iter().map(|(_, id)| Object::Reference(*id)).collect())
        };

        let mut default_config = Dict::new();
        default_config.insert("Order".to_string(), Object::Array(all.clone()));
        if !on.is_empty() {
            default_config.insert("ON".to_string(), refs(on));
        }
        if !off.is_empty() {
            default_config.insert("OFF".to_string(), refs(off));
        }

        Some(Object::dict(vec![
            ("OCGs", Object::Array(all)),
            ("D", Object::Dictionary(default_config)),
        ]))
    }
}

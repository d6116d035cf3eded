//! Shading (gradient) support for PDF generation.
//!
//! Each gradient usage recorded by content generation becomes:
//! - an interpolation function (Type 2 for two stops, Type 3 stitching
//!   Type 2 pieces otherwise)
//! - an axial (Type 2) or radial (Type 3) shading
//! - a shading pattern carrying the transform current at the usage
//!
//! Usages with a non-opaque stop additionally get a luminosity soft mask:
//! a DeviceGray shading of the gradient's alpha painted inside a
//! transparency group form that covers the owner's bounds.

use super::content_stream::{ContentStreamBuilder, ContentStreamOp, GradientUsage};
use super::graphics_state::add_soft_mask_state;
use super::object_graph::ObjectGraph;
use crate::elements::{Color, Gradient, GradientGeometry, GradientStop};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::object::{dict, Object, ObjectId, Stream};

/// Color spaces for gradients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShadingColorSpace {
    /// RGB color space
    #[default]
    DeviceRGB,
    /// Grayscale, used for luminosity masks
    DeviceGray,
}

impl ShadingColorSpace {
    /// Get the PDF name for this color space.
    pub fn as_pdf_name(&self) -> &'static str {
        match self {
            ShadingColorSpace::DeviceRGB => "DeviceRGB",
            ShadingColorSpace::DeviceGray => "DeviceGray",
        }
    }

    fn components(&self, color: &Color) -> Object {
        match self {
            ShadingColorSpace::DeviceRGB => Object::reals(&[color.r, color.g, color.b]),
            ShadingColorSpace::DeviceGray => Object::reals(&[color.r]),
        }
    }
}

/// Objects built for one gradient usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesizedGradient {
    /// The shading pattern (`/P{i}`)
    pub pattern: ObjectId,
    /// The soft mask state (`/S{i}`), for non-opaque gradients
    pub soft_mask: Option<ObjectId>,
}

/// Stops ready for function construction: at least two.
fn normalized_stops(gradient: &Gradient) -> Result<Vec<GradientStop>> {
    match gradient.stops.as_slice() {
        [] => Err(Error::InvalidStructure("gradient has no color stops".to_string())),
        [only] => Ok(vec![
            GradientStop::new(0.0, only.color),
            GradientStop::new(1.0, only.color),
        ]),
        stops => Ok(stops.to_vec()),
    }
}

/// Exponential interpolation between two colors.
fn exponential_function(from: &Color, to: &Color, space: ShadingColorSpace) -> Object {
    Object::dict(vec![
        ("FunctionType", Object::Integer(2)),
        ("Domain", Object::reals(&[0.0, 1.0])),
        ("C0", space.components(from)),
        ("C1", space.components(to)),
        ("N", Object::Integer(1)),
    ])
}

/// Build the interpolation function of a gradient.
///
/// Two stops give one Type 2 function; N stops give a Type 3 function
/// stitching N-1 Type 2 pieces at the interior offsets.
pub fn build_function(gradient: &Gradient, space: ShadingColorSpace) -> Result<Object> {
    let stops = normalized_stops(gradient)?;
    if let [first, last] = stops.as_slice() {
        return Ok(exponential_function(&first.color, &last.color, space));
    }

    let functions = stops
        .windows(2)
        .map(|pair| exponential_function(&pair[0].color, &pair[1].color, space))
        .collect::<Vec<_>>();
    let bounds = stops[1..stops.len() - 1]
        .iter()
        .map(|s| s.offset)
        .collect::<Vec<_>>();
    let encode = (0..functions.len())
        .flat_map(|_| [0.0, 1.0])
        .collect::<Vec<_>>();

    Ok(Object::dict(vec![
        ("FunctionType", Object::Integer(3)),
        ("Domain", Object::reals(&[0.0, 1.0])),
        ("Functions", Object::Array(functions)),
        ("Bounds", Object::reals(&bounds)),
        ("Encode", Object::reals(&encode)),
    ]))
}

/// Build the shading dictionary of a gradient over a function object.
pub fn build_shading(
    geometry: &GradientGeometry,
    function: ObjectId,
    space: ShadingColorSpace,
) -> Object {
    let (shading_type, coords) = match *geometry {
        GradientGeometry::Linear { start, end } => (2, vec![start.x, start.y, end.x, end.y]),
        GradientGeometry::Radial {
            focus,
            center,
            radius,
        } => (3, vec![focus.x, focus.y, 0.0, center.x, center.y, radius]),
    };
    Object::dict(vec![
        ("ShadingType", Object::Integer(shading_type)),
        ("ColorSpace", Object::name(space.as_pdf_name())),
        ("Coords", Object::reals(&coords)),
        ("Function", Object::Reference(function)),
        ("Extend", Object::Array(vec![Object::Boolean(true), Object::Boolean(true)])),
    ])
}

/// Builds shading objects for the gradient usages of a page.
pub struct ShadingSynthesizer<'a> {
    graph: &'a mut ObjectGraph,
    compress: bool,
}

impl<'a> ShadingSynthesizer<'a> {
    /// Create a synthesizer appending to `graph`.
    pub fn new(graph: &'a mut ObjectGraph, compress: bool) -> Self {
        Self { graph, compress }
    }

    /// Build every usage; entry `i` of the result belongs to usage `i`.
    pub fn synthesize(&mut self, usages: &[GradientUsage]) -> Result<Vec<SynthesizedGradient>> {
        let built = usages
            .iter()
            .map(|usage| self.synthesize_one(usage))
            .collect::<Result<Vec<_>>>()?;
        let masks = built.iter().filter(|b| b.soft_mask.is_some()).count();
        log::debug!("Synthesized {} gradient pattern(s), {} soft mask(s)", built.len(), masks);
        Ok(built)
    }

    fn synthesize_one(&mut self, usage: &GradientUsage) -> Result<SynthesizedGradient> {
        let shading = self.add_shading(&usage.gradient, ShadingColorSpace::DeviceRGB)?;
        let pattern = self.graph.add(Object::dict(vec![
            ("Type", Object::name("Pattern")),
            ("PatternType", Object::Integer(2)),
            ("Shading", Object::Reference(shading)),
            ("Matrix", Object::reals(&usage.matrix.to_array())),
        ]));

        let soft_mask = if usage.gradient.is_opaque() {
            None
        } else {
            let form = self.add_luminosity_form(usage)?;
            Some(add_soft_mask_state(self.graph, form))
        };

        Ok(SynthesizedGradient { pattern, soft_mask })
    }

    fn add_shading(&mut self, gradient: &Gradient, space: ShadingColorSpace) -> Result<ObjectId> {
        let function = self.graph.add(build_function(gradient, space)?);
        Ok(self.graph.add(build_shading(&gradient.geometry, function, space)))
    }

    /// Transparency group form painting the gradient's alpha as gray over
    /// the owner's bounds.
    fn add_luminosity_form(&mut self, usage: &GradientUsage) -> Result<ObjectId> {
        let luminosity = usage.gradient.to_luminosity();
        let shading = self.add_shading(&luminosity, ShadingColorSpace::DeviceGray)?;

        let bbox = if usage.bounds.is_degenerate() {
            Rect::new(0.0, 0.0, 0.0, 0.0)
        } else {
            usage.bounds
        };
        let mut content = ContentStreamBuilder::new();
        content
            .rect(&bbox)
            .op(ContentStreamOp::Clip)
            .op(ContentStreamOp::EndPath)
            .op(ContentStreamOp::PaintShading("Sh0".to_string()));

        let form_dict = dict(vec![
            ("Type", Object::name("XObject")),
            ("Subtype", Object::name("Form")),
            ("BBox", Object::reals(&[bbox.x0, bbox.y0, bbox.x1, bbox.y1])),
            (
                "Group",
                Object::dict(vec![
                    ("Type", Object::name("Group")),
                    ("S", Object::name("Transparency")),
                    ("CS", Object::name("DeviceGray")),
                ]),
            ),
            (
                "Resources",
                Object::dict(vec![(
                    "Shading",
                    Object::dict(vec![("Sh0", Object::Reference(shading))]),
                )]),
            ),
        ]);
        let stream = Stream::with_compression(form_dict, &content.build()?, self.compress)?;
        Ok(self.graph.add(stream))
    }
}

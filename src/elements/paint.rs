//! Colors, solid paints and gradients.

use crate::geometry::Point;

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red
    pub r: f64,
    /// Green
    pub g: f64,
    /// Blue
    pub b: f64,
    /// Opacity
    pub a: f64,
}

impl Color {
    /// Opaque color.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color with opacity.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Opaque white.
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// True when alpha is exactly 1.
    pub fn is_opaque(&self) -> bool {
        self.a == 1.0
    }
}

/// One color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, nominally in `0.0..=1.0`
    pub offset: f64,
    /// Color at this position
    pub color: Color,
}

impl GradientStop {
    /// Create a stop.
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Kind and geometry of a gradient, in the user space of the figure it paints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientGeometry {
    /// Axial gradient between two points
    Linear {
        /// Point where offset 0 lies
        start: Point,
        /// Point where offset 1 lies
        end: Point,
    },
    /// Radial gradient from a focal point to a circle
    Radial {
        /// Center of the zero-radius start circle
        focus: Point,
        /// Center of the end circle
        center: Point,
        /// Radius of the end circle
        radius: f64,
    },
}

/// Gradient paint. Stops keep their declaration order; offsets are not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    /// Kind and geometry
    pub geometry: GradientGeometry,
    /// Color stops in declaration order
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Linear gradient from `start` to `end`.
    pub fn linear(start: Point, end: Point, stops: Vec<GradientStop>) -> Self {
        Self {
            geometry: GradientGeometry::Linear { start, end },
            stops,
        }
    }

    /// Radial gradient from `focus` out to the circle at `center`.
    pub fn radial(focus: Point, center: Point, radius: f64, stops: Vec<GradientStop>) -> Self {
        Self {
            geometry: GradientGeometry::Radial {
                focus,
                center,
                radius,
            },
            stops,
        }
    }

    /// True when every stop is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.stops.iter().all(|s| s.color.is_opaque())
    }

    /// Copy with each stop's gray level set to its own alpha and alpha forced to 1.
    ///
    /// Painting this copy as a luminosity mask reproduces the original stop opacities.
    pub fn to_luminosity(&self) -> Gradient {
        Gradient {
            geometry: self.geometry,
            stops: self
                .stops
                .iter()
                .map(|s| {
                    let a = s.color.a;
                    GradientStop::new(s.offset, Color::rgba(a, a, a, 1.0))
                })
                .collect(),
        }
    }
}

/// Fill or stroke paint.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Uniform color
    Solid(Color),
    /// Color varying with position
    Gradient(Gradient),
}

impl Paint {
    /// Every alpha value this paint uses, in stop order.
    pub fn alphas(&self) -> Vec<f64> {
        match self {
            Paint::Solid(c) => vec![c.a],
            Paint::Gradient(g) => g.stops.iter().map(|s| s.color.a).collect(),
        }
    }
}

impl From<Color> for Paint {
    fn from(c: Color) -> Self {
        Paint::Solid(c)
    }
}

impl From<Gradient> for Paint {
    fn from(g: Gradient) -> Self {
        Paint::Gradient(g)
    }
}

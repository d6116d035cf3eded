//! Geometric primitives.
//!
//! Points and rectangles in scene or page space, plus the affine [`Matrix`]
//! that maps between them.

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use scene_pdf::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle stored as its minimum and maximum corners.
///
/// A rectangle with NaN coordinates is "degenerate": it stands for figures that
/// have no geometric extent and is absorbed by [`Rect::union`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum x
    pub x0: f64,
    /// Minimum y
    pub y0: f64,
    /// Maximum x
    pub x1: f64,
    /// Maximum y
    pub y1: f64,
}

impl Rect {
    /// The degenerate rectangle.
    pub const NAN: Rect = Rect {
        x0: f64::NAN,
        y0: f64::NAN,
        x1: f64::NAN,
        y1: f64::NAN,
    };

    /// Create a rectangle from two corners, normalizing their order.
    ///
    /// # Examples
    ///
    /// ```
    /// use scene_pdf::geometry::Rect;
    ///
    /// let rect = Rect::new(110.0, 70.0, 10.0, 20.0);
    /// assert_eq!(rect.x0, 10.0);
    /// assert_eq!(rect.y1, 70.0);
    /// assert_eq!(rect.width(), 100.0);
    /// ```
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Create a rectangle from its origin and size.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Smallest rectangle containing every point, or [`Rect::NAN`] if there are none.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Self {
        points.into_iter().fold(Rect::NAN, |acc, p| {
            acc.union(&Rect {
                x0: p.x,
                y0: p.y,
                x1: p.x,
                y1: p.y,
            })
        })
    }

    /// True if any coordinate is NaN.
    pub fn is_degenerate(&self) -> bool {
        self.x0.is_nan() || self.y0.is_nan() || self.x1.is_nan() || self.y1.is_nan()
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The four corners, counter-clockwise from the minimum corner.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y0),
            Point::new(self.x1, self.y1),
            Point::new(self.x0, self.y1),
        ]
    }

    /// Union of two rectangles; a degenerate side is ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_degenerate() {
            return *other;
        }
        if other.is_degenerate() {
            return *self;
        }
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Rect {
        Rect {
            x0: self.x0 - amount,
            y0: self.y0 - amount,
            x1: self.x1 + amount,
            y1: self.y1 + amount,
        }
    }
}

/// 2D affine transform.
///
/// Stands for the homogeneous matrix
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// acting on column vectors, so a point maps to `(a·x + c·y + e, b·x + d·y + f)`.
/// The six coefficients are written to content streams in `a b c d e f` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scale / rotation
    pub a: f64,
    /// Vertical skew / rotation
    pub b: f64,
    /// Horizontal skew / rotation
    pub c: f64,
    /// Vertical scale / rotation
    pub d: f64,
    /// Horizontal translation
    pub e: f64,
    /// Vertical translation
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a matrix from its six coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Translation by `(tx, ty)`.
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Scale by `(sx, sy)`.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Counter-clockwise rotation by `radians` (in a y-up frame).
    pub fn rotate(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Right-multiply: the result applies `other` first, then `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scene_pdf::geometry::{Matrix, Point};
    ///
    /// let m = Matrix::translate(10.0, 0.0).concat(&Matrix::scale(2.0, 2.0));
    /// assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    /// ```
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Map a point through the transform.
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }

    /// Bounding box of a rectangle's four mapped corners.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        if rect.is_degenerate() {
            return Rect::NAN;
        }
        Rect::from_points(rect.corners().iter().map(|p| self.transform_point(*p)))
    }

    /// Coefficients in `a b c d e f` order.
    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_neutral() {
        let m = Matrix::new(2.0, 0.5, -1.0, 3.0, 7.0, -4.0);
        assert_eq!(Matrix::IDENTITY.concat(&m), m);
        assert_eq!(m.concat(&Matrix::IDENTITY), m);
    }

    #[test]
    fn test_concat_applies_right_operand_first() {
        let scale_then_translate = Matrix::translate(5.0, 5.0).concat(&Matrix::scale(2.0, 3.0));
        let p = scale_then_translate.transform_point(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(7.0, 8.0));
    }

    #[test]
    fn test_flip_matrix_maps_top_left_to_top() {
        let flip = Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, 100.0);
        assert_eq!(flip.transform_point(Point::new(0.0, 0.0)), Point::new(0.0, 100.0));
        assert_eq!(flip.transform_point(Point::new(10.0, 100.0)), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_transform_rect_rotated() {
        let m = Matrix::rotate(std::f64::consts::FRAC_PI_2);
        let r = m.transform_rect(&Rect::new(0.0, 0.0, 2.0, 1.0));
        assert!((r.x0 + 1.0).abs() < 1e-9);
        assert!(r.x1.abs() < 1e-9);
        assert!(r.y0.abs() < 1e-9);
        assert!((r.y1 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_ignores_degenerate() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(Rect::NAN.union(&r), r);
        assert_eq!(r.union(&Rect::NAN), r);
        assert!(Rect::NAN.union(&Rect::NAN).is_degenerate());
    }

    #[test]
    fn test_from_points_empty_is_degenerate() {
        assert!(Rect::from_points(std::iter::empty()).is_degenerate());
        let r = Rect::from_points(vec![Point::new(3.0, -1.0), Point::new(-2.0, 4.0)]);
        assert_eq!(r, Rect::new(-2.0, -1.0, 3.0, 4.0));
    }

    #[test]
    fn test_inflate() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inflate(1.5);
        assert_eq!(r, Rect::new(-1.5, -1.5, 11.5, 11.5));
    }
}

use std::ops::{Add, Mul, Sub};

/// A point (or vector) in the plane.
///
/// Sites, data points, Voronoi vertices and centroids all use this type. It is
/// `Copy` and never mutated in place by the tessellation code.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product.
    pub fn cross(self, other: Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance_sq(self, other: Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Point2D) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Rotates the vector by 90 degrees counter-clockwise.
    pub fn perp(self) -> Point2D {
        Point2D::new(-self.y, self.x)
    }

    /// Returns the unit vector, or `None` when the length is not above `eps`.
    pub fn normalized(self, eps: f64) -> Option<Point2D> {
        let n = self.norm();
        if n > eps && n.is_finite() {
            Some(Point2D::new(self.x / n, self.y / n))
        } else {
            None
        }
    }

    pub fn midpoint(self, other: Point2D) -> Point2D {
        Point2D::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Arithmetic mean of a set of points, `None` for an empty set.
    pub fn mean(points: &[Point2D]) -> Option<Point2D> {
        if points.is_empty() {
            return None;
        }
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let n = points.len() as f64;
        Some(Point2D::new(sx / n, sy / n))
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(p: [f64; 2]) -> Self {
        Point2D::new(p[0], p[1])
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(p: (f64, f64)) -> Self {
        Point2D::new(p.0, p.1)
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point2D {
    type Output = Point2D;

    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Point2D;

    fn mul(self, rhs: f64) -> Point2D {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

/// Converts a flat `[x, y, x, y, ...]` buffer into points. A trailing odd value is ignored.
pub fn points_from_flat(flat: &[f64]) -> Vec<Point2D> {
    flat.chunks_exact(2).map(|c| Point2D::new(c[0], c[1])).collect()
}

/// Flattens points into `[x, y, x, y, ...]`.
pub fn points_to_flat(points: &[Point2D]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

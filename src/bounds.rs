use crate::error::Error;
use crate::point::Point2D;

/// Edge neighbor ID for the left side (x = x_min). Negative to prevent conflicts with site IDs.
pub const BOX_ID_LEFT: i32 = -1;
/// Edge neighbor ID for the right side (x = x_max).
pub const BOX_ID_RIGHT: i32 = -2;
/// Edge neighbor ID for the bottom side (y = y_min).
pub const BOX_ID_BOTTOM: i32 = -3;
/// Edge neighbor ID for the top side (y = y_max).
pub const BOX_ID_TOP: i32 = -4;
/// Edge neighbor ID for the closing edge between two far points of an unbounded region.
/// Such edges only survive clipping when the far-point radius is too small.
pub const FAR_EDGE_ID: i32 = -1000;

/// Calculates the ID for a rectangle side based on the axis and direction.
///
/// The IDs start at -1 and decrease.
/// - Axis 0 (X) Min: -1
/// - Axis 0 (X) Max: -2
/// - Axis 1 (Y) Min: -3
/// - Axis 1 (Y) Max: -4
pub fn box_side(axis: usize, is_max: bool) -> i32 {
    -1 - (axis * 2 + if is_max { 1 } else { 0 }) as i32
}

/// Axis-aligned clipping rectangle.
///
/// Invariant (checked by [`BoundingRect::validate`]): `x_min < x_max` and `y_min < y_max`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingRect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingRect {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self { x_min, x_max, y_min, y_max }
    }

    /// Square of half-width `half` around `center`.
    pub fn centered(center: Point2D, half: f64) -> Self {
        Self::new(center.x - half, center.x + half, center.y - half, center.y + half)
    }

    /// Smallest rectangle containing all points, `None` for an empty slice.
    /// The result may be flat when the points are collinear along an axis.
    pub fn enclosing(points: &[Point2D]) -> Option<Self> {
        let first = points.first()?;
        let mut r = Self::new(first.x, first.x, first.y, first.y);
        for p in &points[1..] {
            r.include(*p);
        }
        Some(r)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let finite = self.x_min.is_finite()
            && self.x_max.is_finite()
            && self.y_min.is_finite()
            && self.y_max.is_finite();
        if !finite {
            return Err(Error::invalid(format!("bounding rectangle {:?} is not finite", self)));
        }
        if self.x_min >= self.x_max || self.y_min >= self.y_max {
            return Err(Error::invalid(format!(
                "bounding rectangle requires x_min < x_max and y_min < y_max, got {:?}",
                self
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    pub fn center(&self) -> Point2D {
        Point2D::new((self.x_min + self.x_max) * 0.5, (self.y_min + self.y_max) * 0.5)
    }

    /// Closed containment test.
    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }

    pub fn clamp(&self, p: Point2D) -> Point2D {
        Point2D::new(p.x.clamp(self.x_min, self.x_max), p.y.clamp(self.y_min, self.y_max))
    }

    /// Grows the rectangle so it contains `p`.
    pub fn include(&mut self, p: Point2D) {
        self.x_min = self.x_min.min(p.x);
        self.x_max = self.x_max.max(p.x);
        self.y_min = self.y_min.min(p.y);
        self.y_max = self.y_max.max(p.y);
    }

    pub fn union(&self, other: &BoundingRect) -> BoundingRect {
        BoundingRect::new(
            self.x_min.min(other.x_min),
            self.x_max.max(other.x_max),
            self.y_min.min(other.y_min),
            self.y_max.max(other.y_max),
        )
    }

    /// Corners in counter-clockwise order starting at the bottom-left one.
    pub fn corners(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.x_min, self.y_min),
            Point2D::new(self.x_max, self.y_min),
            Point2D::new(self.x_max, self.y_max),
            Point2D::new(self.x_min, self.y_max),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_side_ids() {
        assert_eq!(box_side(0, false), BOX_ID_LEFT);
        assert_eq!(box_side(0, true), BOX_ID_RIGHT);
        assert_eq!(box_side(1, false), BOX_ID_BOTTOM);
        assert_eq!(box_side(1, true), BOX_ID_TOP);
    }

    #[test]
    fn test_validate() {
        assert!(BoundingRect::new(-5.0, 5.0, -5.0, 5.0).validate().is_ok());
        assert!(matches!(
            BoundingRect::new(1.0, 1.0, 0.0, 2.0).validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(BoundingRect::new(0.0, f64::NAN, 0.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_enclosing_and_metrics() {
        let r = BoundingRect::enclosing(&[
            Point2D::new(1.0, -2.0),
            Point2D::new(-3.0, 4.0),
            Point2D::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(r, BoundingRect::new(-3.0, 1.0, -2.0, 4.0));
        assert!((r.area() - 24.0).abs() < 1e-12);
        assert!((r.diagonal() - 52.0f64.sqrt()).abs() < 1e-12);
        assert!(BoundingRect::enclosing(&[]).is_none());
    }

    #[test]
    fn test_centered() {
        let r = BoundingRect::centered(Point2D::new(1.0, -1.0), 3.25);
        assert_eq!(r, BoundingRect::new(-2.25, 4.25, -4.25, 2.25));
        assert_eq!(r.center(), Point2D::new(1.0, -1.0));
        assert!(r.validate().is_ok());
    }
}

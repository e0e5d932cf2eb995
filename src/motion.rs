//! Sites that drift with a constant velocity and bounce off the walls of a rectangle.
//!
//! Used to animate a tessellation: advance every point, then rebuild the diagram
//! from the new positions.

use crate::bounds::BoundingRect;
use crate::error::Error;
use crate::point::Point2D;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// A point with an explicit velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovingPoint {
    pub position: Point2D,
    pub velocity: Point2D,
}

impl MovingPoint {
    pub fn new(position: Point2D, velocity: Point2D) -> Self {
        Self { position, velocity }
    }

    /// Moves the point by `velocity * dt`. A velocity component is reflected
    /// when the step would leave `walls` along that axis, and the position is
    /// clamped back inside.
    pub fn advance(&mut self, dt: f64, walls: &BoundingRect) {
        let next = self.position + self.velocity * dt;
        if next.x < walls.x_min || next.x > walls.x_max {
            self.velocity.x = -self.velocity.x;
        }
        if next.y < walls.y_min || next.y > walls.y_max {
            self.velocity.y = -self.velocity.y;
        }
        self.position = walls.clamp(next);
    }

    /// Scatters `count` points uniformly in `spawn` with Gaussian velocity
    /// components of standard deviation `speed_sigma`.
    pub fn scatter<R: Rng + ?Sized>(
        count: usize,
        spawn: &BoundingRect,
        speed_sigma: f64,
        rng: &mut R,
    ) -> Result<Vec<MovingPoint>, Error> {
        spawn.validate()?;
        let normal = Normal::new(0.0, speed_sigma)
            .map_err(|e| Error::invalid(format!("invalid speed deviation {}: {}", speed_sigma, e)))?;
        Ok((0..count)
            .map(|_| {
                let position = crate::sampling::uniform_point(spawn, rng);
                let velocity = Point2D::new(normal.sample(rng), normal.sample(rng));
                MovingPoint::new(position, velocity)
            })
            .collect())
    }
}

/// Advances every point by one time step.
pub fn advance_all(points: &mut [MovingPoint], dt: f64, walls: &BoundingRect) {
    for p in points.iter_mut() {
        p.advance(dt, walls);
    }
}

pub fn positions(points: &[MovingPoint]) -> Vec<Point2D> {
    points.iter().map(|p| p.position).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_bounce_off_right_wall() {
        let walls = BoundingRect::new(-1.0, 1.0, -1.0, 1.0);
        let mut p = MovingPoint::new(Point2D::new(0.9, 0.0), Point2D::new(1.0, 0.5));
        p.advance(0.2, &walls);
        assert_eq!(p.position, Point2D::new(1.0, 0.1));
        assert_eq!(p.velocity, Point2D::new(-1.0, 0.5));
        p.advance(0.2, &walls);
        assert!((p.position.x - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_stays_inside() {
        let walls = BoundingRect::new(-3.25, 3.25, -3.25, 3.25);
        let spawn = BoundingRect::new(-3.0, 3.0, -3.0, 3.0);
        let mut rng = StdRng::seed_from_u64(42);
        let mut pts = MovingPoint::scatter(16, &spawn, 0.5, &mut rng).unwrap();
        for _ in 0..600 {
            advance_all(&mut pts, 1.0 / 60.0, &walls);
        }
        assert!(positions(&pts).iter().all(|p| walls.contains(*p)));
    }

    #[test]
    fn test_scatter_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(1);
        let bad = BoundingRect::new(1.0, 0.0, 0.0, 1.0);
        assert!(MovingPoint::scatter(3, &bad, 0.5, &mut rng).is_err());
        let spawn = BoundingRect::new(0.0, 1.0, 0.0, 1.0);
        assert!(MovingPoint::scatter(3, &spawn, f64::NAN, &mut rng).is_err());
    }
}

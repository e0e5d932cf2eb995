//! Point generators for seeding and fixtures.

use crate::bounds::BoundingRect;
use crate::error::Error;
use crate::point::Point2D;
use rand::Rng;
use rand_distr::{Distribution, Normal};

fn sample_axis<R: Rng + ?Sized>(lo: f64, hi: f64, rng: &mut R) -> f64 {
    if lo < hi { rng.gen_range(lo..hi) } else { lo }
}

/// Draws one point uniformly inside `bounds`. Flat rectangles collapse to their lower edge.
pub fn uniform_point<R: Rng + ?Sized>(bounds: &BoundingRect, rng: &mut R) -> Point2D {
    Point2D::new(
        sample_axis(bounds.x_min, bounds.x_max, rng),
        sample_axis(bounds.y_min, bounds.y_max, rng),
    )
}

/// Draws `count` points independently and uniformly inside `bounds`.
pub fn uniform_in_rect<R: Rng + ?Sized>(count: usize, bounds: &BoundingRect, rng: &mut R) -> Vec<Point2D> {
    (0..count).map(|_| uniform_point(bounds, rng)).collect()
}

/// Points drawn around known centers, with the center each one came from.
#[derive(Clone, Debug, Default)]
pub struct Blobs {
    pub points: Vec<Point2D>,
    pub labels: Vec<usize>,
}

/// Draws `total` points from isotropic Gaussians around `centers`.
///
/// Each blob receives `total / centers.len()` points and the first
/// `total % centers.len()` blobs one extra. When `clip` is given, coordinates are
/// clamped into it.
pub fn gaussian_blobs<R: Rng + ?Sized>(
    centers: &[Point2D],
    total: usize,
    std_dev: f64,
    clip: Option<&BoundingRect>,
    rng: &mut R,
) -> Result<Blobs, Error> {
    if centers.is_empty() {
        return Err(Error::invalid("gaussian blobs need at least one center"));
    }
    let normal = Normal::new(0.0, std_dev)
        .map_err(|e| Error::invalid(format!("invalid blob standard deviation {}: {}", std_dev, e)))?;

    let per_blob = total / centers.len();
    let remainder = total % centers.len();
    let mut blobs = Blobs {
        points: Vec::with_capacity(total),
        labels: Vec::with_capacity(total),
    };

    for (label, center) in centers.iter().enumerate() {
        let count = per_blob + usize::from(label < remainder);
        for _ in 0..count {
            let mut p = Point2D::new(center.x + normal.sample(rng), center.y + normal.sample(rng));
            if let Some(rect) = clip {
                p = rect.clamp(p);
            }
            blobs.points.push(p);
            blobs.labels.push(label);
        }
    }
    Ok(blobs)
}

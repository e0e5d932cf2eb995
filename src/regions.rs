//! Finite-region reconstruction of a raw Voronoi diagram.
//!
//! Unbounded regions are closed with synthetic far vertices placed on their
//! infinite ridges at a distance `radius` from the known endpoint, then ordered
//! counter-clockwise so they can be clipped as simple convex polygons.

use crate::bounds::{BoundingRect, FAR_EDGE_ID};
use crate::cell::EmptyReason;
use crate::diagram::VoronoiDiagram;
use crate::error::Error;
use crate::point::Point2D;
use tracing::{debug, warn};

/// A closed region: vertex indices into [`FiniteRegions::vertices`] plus the
/// neighbor ID of each edge. `edge_neighbors[i]` belongs to the edge starting at
/// `vertices[i]`; it is a site index or [`FAR_EDGE_ID`].
#[derive(Clone, Debug, PartialEq)]
pub struct FiniteRegion {
    pub vertices: Vec<usize>,
    pub edge_neighbors: Vec<i32>,
}

impl FiniteRegion {
    /// Region vertices as coordinates.
    pub fn polygon(&self, vertices: &[Point2D]) -> Vec<Point2D> {
        self.vertices.iter().map(|&v| vertices[v]).collect()
    }
}

/// Every site's region, closed and ordered.
#[derive(Clone, Debug)]
pub struct FiniteRegions {
    /// Finite Voronoi vertices followed by the synthetic far vertices.
    pub vertices: Vec<Point2D>,
    /// Per site, the closed region or the reason it could not be formed.
    pub regions: Vec<Result<FiniteRegion, EmptyReason>>,
    pub radius: f64,
}

/// Far-point distance that keeps every synthetic vertex well outside `bounds`:
/// four times the diagonal of the box holding the sites, the finite vertices and `bounds`.
pub fn default_radius(diagram: &VoronoiDiagram, bounds: &BoundingRect) -> f64 {
    let extent = diagram
        .extent()
        .map(|e| e.union(bounds))
        .unwrap_or(*bounds);
    4.0 * extent.diagonal().max(f64::MIN_POSITIVE)
}

impl FiniteRegions {
    /// Closes every region of `diagram` using far points at distance `radius`.
    pub fn reconstruct(diagram: &VoronoiDiagram, radius: f64) -> Result<Self, Error> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::invalid(format!(
                "far-point radius must be positive and finite, got {}",
                radius
            )));
        }

        let sites = &diagram.sites;
        let center = Point2D::mean(sites).unwrap_or_default();
        let scale = diagram.extent().map(|e| e.diagonal()).unwrap_or(0.0).max(1.0);
        let tangent_eps = 1e-12 * scale;
        let by_site = diagram.ridges_by_site();

        let mut vertices = diagram.vertices.clone();
        let mut regions = Vec::with_capacity(sites.len());
        let mut far_points = 0usize;

        for (site, raw) in diagram.regions.iter().enumerate() {
            if raw.is_empty() || by_site[site].is_empty() {
                warn!(site, "site has no Voronoi ridges, it is dropped");
                regions.push(Err(EmptyReason::Unreached));
                continue;
            }

            let before = vertices.len();
            match close_region(diagram, site, raw, &by_site[site], center, radius, tangent_eps, &mut vertices) {
                Ok(region) => {
                    far_points += vertices.len() - before;
                    regions.push(Ok(region));
                }
                Err(reason) => {
                    vertices.truncate(before);
                    warn!(site, ?reason, "could not close Voronoi region");
                    regions.push(Err(reason));
                }
            }
        }

        debug!(
            sites = sites.len(),
            finite_vertices = diagram.vertices.len(),
            far_points,
            radius,
            "reconstructed finite Voronoi regions"
        );

        Ok(Self { vertices, regions, radius })
    }
}

/// A ridge segment of one region, in vertex indices, with the site across it.
struct RidgeEdge {
    ends: [usize; 2],
    neighbor: i32,
}

#[allow(clippy::too_many_arguments)]
fn close_region(
    diagram: &VoronoiDiagram,
    site: usize,
    raw: &[Option<usize>],
    incident: &[usize],
    center: Point2D,
    radius: f64,
    tangent_eps: f64,
    vertices: &mut Vec<Point2D>,
) -> Result<FiniteRegion, EmptyReason> {
    let sites = &diagram.sites;
    let p = sites[site];
    let unbounded = raw.iter().any(Option::is_none);

    let mut region: Vec<usize> = raw.iter().flatten().copied().collect();
    let mut edges: Vec<RidgeEdge> = Vec::with_capacity(incident.len());
    let mut rays: Vec<(usize, Point2D, Point2D)> = Vec::new();
    let mut lines = 0usize;
    let mut last_line: Option<(Point2D, Point2D)> = None;

    for &r in incident {
        let ridge = &diagram.ridges[r];
        let Some(neighbor) = ridge.other(site) else { continue };
        let q = sites[neighbor];

        match ridge.vertices {
            [Some(v1), Some(v2)] => edges.push(RidgeEdge {
                ends: [v1, v2],
                neighbor: neighbor as i32,
            }),
            [Some(v), None] | [None, Some(v)] => {
                let tangent = (q - p).normalized(tangent_eps).ok_or(EmptyReason::DegenerateRidge)?;
                let mut normal = tangent.perp();
                if (p.midpoint(q) - center).dot(normal) <= 0.0 {
                    normal = normal * -1.0;
                }
                let far = vertices[v] + normal * radius;
                let idx = vertices.len();
                vertices.push(far);
                region.push(idx);
                rays.push((idx, normal, tangent));
                edges.push(RidgeEdge {
                    ends: [v, idx],
                    neighbor: neighbor as i32,
                });
            }
            [None, None] => {
                // Full bisector line, only present when all sites are collinear.
                let tangent = (q - p).normalized(tangent_eps).ok_or(EmptyReason::DegenerateRidge)?;
                let normal = tangent.perp();
                let mid = p.midpoint(q);
                let a = vertices.len();
                vertices.push(mid + normal * radius);
                vertices.push(mid - normal * radius);
                region.extend([a, a + 1]);
                edges.push(RidgeEdge {
                    ends: [a, a + 1],
                    neighbor: neighbor as i32,
                });
                lines += 1;
                last_line = Some((mid, tangent));
            }
        }
    }

    if unbounded {
        if lines == 1 {
            // End of a collinear chain: the region is a half-plane, close it away from the neighbor.
            if let Some((mid, tangent)) = last_line {
                let normal = tangent.perp();
                let back = mid - tangent * radius;
                vertices.push(back + normal * radius);
                vertices.push(back - normal * radius);
                region.extend([vertices.len() - 2, vertices.len() - 1]);
            }
        } else if let [(fa, a, ta), (fb, b, tb)] = rays[..] {
            // Extra far point between the two rays when it lies beyond the closing chord,
            // seen from the inside of the polygon built so far. `a + b` vanishes for
            // nearly opposite rays and the direction away from both neighbors vanishes
            // for nearly parallel ones, so the longer of the two is used.
            let between = a + b;
            let away = (ta + tb) * -1.0;
            let dir = if between.norm() >= away.norm() { between } else { away };
            if let Some(dir) = dir.normalized(1e-9) {
                let candidate = p + dir * radius;
                let inner: Vec<Point2D> = region.iter().map(|&v| vertices[v]).collect();
                let inside = Point2D::mean(&inner).unwrap_or(p);
                let chord = vertices[fb] - vertices[fa];
                let inner_side = chord.cross(inside - vertices[fa]);
                let candidate_side = chord.cross(candidate - vertices[fa]);
                if inner_side * candidate_side < 0.0 {
                    vertices.push(candidate);
                    region.push(vertices.len() - 1);
                }
            }
        }

        order_counter_clockwise(&mut region, vertices);
    }

    if region.len() < 3 {
        return Err(EmptyReason::Collapsed);
    }

    let n = region.len();
    let edge_neighbors = (0..n)
        .map(|i| {
            let (a, b) = (region[i], region[(i + 1) % n]);
            edges
                .iter()
                .find(|e| (e.ends[0] == a && e.ends[1] == b) || (e.ends[0] == b && e.ends[1] == a))
                .map(|e| e.neighbor)
                .unwrap_or(FAR_EDGE_ID)
        })
        .collect();

    Ok(FiniteRegion {
        vertices: region,
        edge_neighbors,
    })
}

/// Sorts vertex indices by angle around their own centroid.
fn order_counter_clockwise(region: &mut Vec<usize>, vertices: &[Point2D]) {
    let pts: Vec<Point2D> = region.iter().map(|&v| vertices[v]).collect();
    let Some(c) = Point2D::mean(&pts) else { return };
    let mut keyed: Vec<(f64, usize)> = region
        .iter()
        .map(|&v| {
            let d = vertices[v] - c;
            (d.y.atan2(d.x), v)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    region.clear();
    region.extend(keyed.into_iter().map(|(_, v)| v));
    region.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(poly: &[Point2D]) -> f64 {
        let n = poly.len();
        (0..n).map(|i| poly[i].cross(poly[(i + 1) % n])).sum::<f64>() * 0.5
    }

    #[test]
    fn test_two_sites_form_half_planes() {
        let sites = vec![Point2D::new(-1.0, 0.0), Point2D::new(1.0, 0.0)];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        let fr = FiniteRegions::reconstruct(&d, 100.0).unwrap();
        for (site, region) in fr.regions.iter().enumerate() {
            let region = region.as_ref().unwrap();
            let poly = region.polygon(&fr.vertices);
            assert_eq!(poly.len(), 4);
            assert!(signed_area(&poly) > 0.0);
            // Every vertex stays on the site's side of x = 0.
            let side = sites[site].x.signum();
            assert!(poly.iter().all(|v| v.x * side >= -1e-9));
            assert!(region.edge_neighbors.contains(&(1 - site as i32)));
        }
    }

    #[test]
    fn test_far_points_point_outward() {
        let sites = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 0.0),
            Point2D::new(0.0, 4.0),
        ];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        let radius = 50.0;
        let fr = FiniteRegions::reconstruct(&d, radius).unwrap();
        let center = Point2D::mean(&sites).unwrap();
        for v in &fr.vertices[d.vertices.len()..] {
            assert!(v.distance(center) > radius * 0.5);
        }
        for region in &fr.regions {
            let poly = region.as_ref().unwrap().polygon(&fr.vertices);
            assert!(signed_area(&poly) > 0.0);
        }
    }

    #[test]
    fn test_bounded_region_untouched() {
        let mut sites = vec![Point2D::new(0.0, 0.0)];
        for k in 0..5 {
            let a = k as f64 * 2.0 * std::f64::consts::PI / 5.0;
            sites.push(Point2D::new(3.0 * a.cos(), 3.0 * a.sin()));
        }
        let d = VoronoiDiagram::compute(&sites).unwrap();
        let fr = FiniteRegions::reconstruct(&d, 100.0).unwrap();
        let center = fr.regions[0].as_ref().unwrap();
        assert_eq!(center.vertices.len(), 5);
        assert!(center.vertices.iter().all(|&v| v < d.vertices.len()));
        assert!(center.edge_neighbors.iter().all(|&n| (1..=5).contains(&n)));
    }

    #[test]
    fn test_almost_collinear_end_site_opens_outward() {
        // The circumcenter sits around (0, -5e9) and both rays of the end sites are nearly opposite.
        let sites = vec![
            Point2D::new(-1.0, 0.0),
            Point2D::new(0.0, 1e-10),
            Point2D::new(1.0, 0.0),
        ];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        let bounds = BoundingRect::new(-5.0, 5.0, -5.0, 5.0);
        let radius = default_radius(&d, &bounds);
        let fr = FiniteRegions::reconstruct(&d, radius).unwrap();

        for (site, side) in [(0usize, -1.0), (2, 1.0)] {
            let poly = fr.regions[site].as_ref().unwrap().polygon(&fr.vertices);
            assert!(signed_area(&poly) > 0.0);
            // Some vertex lies far out on the open side, level with the sites.
            assert!(poly.iter().any(|v| v.x * side > radius * 0.5 && v.y.abs() < radius * 0.5));
        }
    }

    #[test]
    fn test_every_far_point_is_referenced() {
        let sites = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1e-13, -1e-13),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(0.6, 0.7),
        ];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        let fr = FiniteRegions::reconstruct(&d, 100.0).unwrap();
        let used: std::collections::HashSet<usize> = fr
            .regions
            .iter()
            .flatten()
            .flat_map(|r| r.vertices.iter().copied())
            .collect();
        for v in d.vertices.len()..fr.vertices.len() {
            assert!(used.contains(&v), "far point {} is not part of any region", v);
        }
    }

    #[test]
    fn test_rejects_bad_radius() {
        let sites = vec![Point2D::new(-1.0, 0.0), Point2D::new(1.0, 0.0)];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        assert!(FiniteRegions::reconstruct(&d, 0.0).is_err());
        assert!(FiniteRegions::reconstruct(&d, f64::INFINITY).is_err());
    }

    #[test]
    fn test_default_radius_exceeds_bounds() {
        let sites = vec![Point2D::new(-1.0, 0.0), Point2D::new(1.0, 0.0)];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        let bounds = BoundingRect::new(-5.0, 5.0, -5.0, 5.0);
        assert!(default_radius(&d, &bounds) >= 2.0 * bounds.diagonal());
    }
}

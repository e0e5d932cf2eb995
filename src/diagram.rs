//! Raw (possibly unbounded) planar Voronoi diagram.
//!
//! The diagram is read off the Delaunay triangulation of the sites: every
//! triangle contributes its circumcenter as a Voronoi vertex, every Delaunay edge
//! becomes a ridge between its two endpoint sites, and hull edges become ridges
//! with one missing (infinite) vertex. When all sites are collinear there is no
//! triangle at all and every ridge is a full bisector line (both vertices missing).
//! Sites that are collinear up to rounding are handled the same way, their
//! circumcenters would lie too far away to be represented.

use crate::bounds::BoundingRect;
use crate::error::Error;
use crate::point::Point2D;
use delaunator::{EMPTY, triangulate};
use tracing::{debug, warn};

/// A Voronoi edge shared by two sites.
///
/// `vertices[k] == None` marks an endpoint at infinity (the edge is a ray, or a
/// full line when both are `None`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ridge {
    pub sites: [usize; 2],
    pub vertices: [Option<usize>; 2],
}

impl Ridge {
    /// The site on the other side of the ridge, if `site` is one of its two sites.
    pub fn other(&self, site: usize) -> Option<usize> {
        if self.sites[0] == site {
            Some(self.sites[1])
        } else if self.sites[1] == site {
            Some(self.sites[0])
        } else {
            None
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.vertices.iter().all(Option::is_some)
    }
}

/// Raw Voronoi diagram of a set of sites.
#[derive(Clone, Debug)]
pub struct VoronoiDiagram {
    pub sites: Vec<Point2D>,
    /// Finite Voronoi vertices, indexed 0..m-1.
    pub vertices: Vec<Point2D>,
    pub ridges: Vec<Ridge>,
    /// Per site, the vertex indices around its cell in walk order. A `None`
    /// entry marks the region as unbounded. An empty region means the site was
    /// dropped by the triangulation (it nearly coincides with another site).
    pub regions: Vec<Vec<Option<usize>>>,
}

/// Largest distance from a line, relative to the spread of the sites, at which
/// the sites still count as collinear.
const FLAT_TOLERANCE: f64 = 1e-14;

#[inline]
fn next_halfedge(e: usize) -> usize {
    if e % 3 == 2 { e - 2 } else { e + 1 }
}

fn circumcenter(a: Point2D, b: Point2D, c: Point2D) -> Option<Point2D> {
    let b = b - a;
    let c = c - a;
    let d = 2.0 * b.cross(c);
    if d == 0.0 {
        return None;
    }
    let bl = b.dot(b);
    let cl = c.dot(c);
    let ux = (c.y * bl - b.y * cl) / d;
    let uy = (b.x * cl - c.x * bl) / d;
    let center = Point2D::new(a.x + ux, a.y + uy);
    center.is_finite().then_some(center)
}

/// Whether every site lies within `FLAT_TOLERANCE` (relative) of the line through
/// the first site and the site farthest from it.
fn nearly_collinear(sites: &[Point2D]) -> bool {
    let origin = sites[0];
    let far = sites
        .iter()
        .copied()
        .max_by(|a, b| a.distance_sq(origin).total_cmp(&b.distance_sq(origin)))
        .unwrap_or(origin);
    let span = far - origin;
    let length_sq = span.dot(span);
    sites
        .iter()
        .all(|&s| span.cross(s - origin).abs() <= FLAT_TOLERANCE * length_sq)
}

/// Checks the preconditions shared by every tessellation call:
/// at least two sites, finite coordinates and no two sites at the same position.
pub fn validate_sites(sites: &[Point2D]) -> Result<(), Error> {
    if sites.len() < 2 {
        return Err(Error::invalid(format!(
            "tessellation needs at least 2 sites, got {}",
            sites.len()
        )));
    }
    if let Some(i) = sites.iter().position(|p| !p.is_finite()) {
        return Err(Error::invalid(format!("site {} has non-finite coordinates", i)));
    }

    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_unstable_by(|&a, &b| {
        sites[a]
            .x
            .total_cmp(&sites[b].x)
            .then(sites[a].y.total_cmp(&sites[b].y))
    });
    for w in order.windows(2) {
        if sites[w[0]] == sites[w[1]] {
            let (i, j) = (w[0].min(w[1]), w[0].max(w[1]));
            return Err(Error::degenerate(format!(
                "sites {} and {} coincide at ({}, {})",
                i, j, sites[i].x, sites[i].y
            )));
        }
    }
    Ok(())
}

/// Minimal union-find used to merge coincident circumcenters.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Keep the lower index as representative so vertex numbering stays stable.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

impl VoronoiDiagram {
    /// Computes the raw Voronoi diagram of `sites`.
    ///
    /// Fails with `InvalidConfiguration` for fewer than two sites or non-finite
    /// coordinates, and with `DegenerateInput` when two sites coincide exactly.
    pub fn compute(sites: &[Point2D]) -> Result<Self, Error> {
        validate_sites(sites)?;

        if nearly_collinear(sites) {
            debug!(sites = sites.len(), "sites are collinear, building bisector lines");
            return Ok(Self::collinear(sites));
        }

        let input: Vec<delaunator::Point> = sites
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = triangulate(&input);

        if triangulation.triangles.is_empty() {
            debug!(sites = sites.len(), "sites are collinear, building bisector lines");
            return Ok(Self::collinear(sites));
        }

        let triangles = &triangulation.triangles;
        let halfedges = &triangulation.halfedges;
        let num_triangles = triangles.len() / 3;

        let extent = BoundingRect::enclosing(sites)
            .map(|r| r.diagonal())
            .unwrap_or(0.0)
            .max(1.0);
        let mut centers = Vec::with_capacity(num_triangles);
        for t in 0..num_triangles {
            let a = sites[triangles[3 * t]];
            let b = sites[triangles[3 * t + 1]];
            let c = sites[triangles[3 * t + 2]];
            let center = circumcenter(a, b, c).unwrap_or_else(|| {
                warn!(triangle = t, "flat triangle, using its centroid as Voronoi vertex");
                Point2D::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
            });
            centers.push(center);
        }

        // Co-circular sites produce adjacent triangles with the same circumcenter.
        let merge_tol = 1e-10 * extent;
        let mut sets = DisjointSet::new(num_triangles);
        for e in 0..triangles.len() {
            let opp = halfedges[e];
            if opp == EMPTY || opp < e {
                continue;
            }
            if centers[e / 3].distance(centers[opp / 3]) <= merge_tol {
                sets.union(e / 3, opp / 3);
            }
        }

        let mut triangle_vertex = vec![usize::MAX; num_triangles];
        let mut vertices = Vec::new();
        for t in 0..num_triangles {
            let root = sets.find(t);
            if triangle_vertex[root] == usize::MAX {
                triangle_vertex[root] = vertices.len();
                vertices.push(centers[root]);
            }
            triangle_vertex[t] = triangle_vertex[root];
        }

        let mut ridges = Vec::new();
        for e in 0..triangles.len() {
            let opp = halfedges[e];
            if opp != EMPTY && opp < e {
                continue;
            }
            let v1 = triangle_vertex[e / 3];
            let v2 = (opp != EMPTY).then(|| triangle_vertex[opp / 3]);
            if v2 == Some(v1) {
                // Sites only touching at a merged vertex do not share an edge.
                continue;
            }
            ridges.push(Ridge {
                sites: [triangles[e], triangles[next_halfedge(e)]],
                vertices: [Some(v1), v2],
            });
        }

        // Incoming half-edge per site; hull sites prefer the one without a twin so
        // that the walk around the site starts at the hull.
        let mut incoming = vec![EMPTY; sites.len()];
        for e in 0..triangles.len() {
            let endpoint = triangles[next_halfedge(e)];
            if incoming[endpoint] == EMPTY || halfedges[e] == EMPTY {
                incoming[endpoint] = e;
            }
        }

        let mut regions = Vec::with_capacity(sites.len());
        for &start in &incoming {
            let mut region: Vec<Option<usize>> = Vec::new();
            if start == EMPTY {
                regions.push(region);
                continue;
            }
            let mut e = start;
            let mut bounded = true;
            loop {
                let v = triangle_vertex[e / 3];
                if region.last() != Some(&Some(v)) {
                    region.push(Some(v));
                }
                e = halfedges[next_halfedge(e)];
                if e == EMPTY {
                    bounded = false;
                    break;
                }
                if e == start {
                    break;
                }
            }
            if bounded {
                if region.len() > 1 && region.first() == region.last() {
                    region.pop();
                }
            } else {
                region.push(None);
            }
            regions.push(region);
        }

        debug!(
            sites = sites.len(),
            triangles = num_triangles,
            vertices = vertices.len(),
            ridges = ridges.len(),
            "computed raw Voronoi diagram"
        );

        Ok(Self {
            sites: sites.to_vec(),
            vertices,
            ridges,
            regions,
        })
    }

    /// All sites on one line: consecutive sites along the line share a full bisector.
    fn collinear(sites: &[Point2D]) -> Self {
        let origin = sites[0];
        let far = sites
            .iter()
            .copied()
            .max_by(|a, b| a.distance_sq(origin).total_cmp(&b.distance_sq(origin)))
            .unwrap_or(origin);
        let direction = far - origin;

        let mut order: Vec<usize> = (0..sites.len()).collect();
        order.sort_by(|&a, &b| {
            (sites[a] - origin)
                .dot(direction)
                .total_cmp(&(sites[b] - origin).dot(direction))
        });

        let ridges = order
            .windows(2)
            .map(|w| Ridge {
                sites: [w[0], w[1]],
                vertices: [None, None],
            })
            .collect();

        Self {
            sites: sites.to_vec(),
            vertices: Vec::new(),
            ridges,
            regions: vec![vec![None]; sites.len()],
        }
    }

    pub fn is_unbounded(&self, site: usize) -> bool {
        self.regions
            .get(site)
            .is_some_and(|r| r.iter().any(Option::is_none))
    }

    /// Map from site index to the ridges incident to it, built symmetrically.
    pub fn ridges_by_site(&self) -> Vec<Vec<usize>> {
        let mut by_site = vec![Vec::new(); self.sites.len()];
        for (r, ridge) in self.ridges.iter().enumerate() {
            by_site[ridge.sites[0]].push(r);
            by_site[ridge.sites[1]].push(r);
        }
        by_site
    }

    /// Bounding rectangle of the sites and the finite vertices.
    pub fn extent(&self) -> Option<BoundingRect> {
        let mut r = BoundingRect::enclosing(&self.sites)?;
        for v in &self.vertices {
            r.include(*v);
        }
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_pairs(d: &VoronoiDiagram) -> Vec<[usize; 2]> {
        let mut pairs: Vec<[usize; 2]> = d
            .ridges
            .iter()
            .map(|r| [r.sites[0].min(r.sites[1]), r.sites[0].max(r.sites[1])])
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_triangle_diagram() {
        let sites = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(0.0, 2.0),
        ];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        assert_eq!(d.vertices.len(), 1);
        assert!(d.vertices[0].distance(Point2D::new(1.0, 1.0)) < 1e-12);
        assert_eq!(sorted_pairs(&d), vec![[0, 1], [0, 2], [1, 2]]);
        assert!(d.ridges.iter().all(|r| !r.is_bounded()));
        assert!((0..3).all(|s| d.is_unbounded(s)));
    }

    #[test]
    fn test_square_merges_cocircular_vertex() {
        let sites = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        assert_eq!(d.vertices.len(), 1);
        // The diagonal collapses to a point and is not a ridge.
        assert_eq!(sorted_pairs(&d), vec![[0, 1], [0, 3], [1, 2], [2, 3]]);
    }

    #[test]
    fn test_interior_site_is_bounded() {
        let mut sites = vec![Point2D::new(0.0, 0.0)];
        for k in 0..6 {
            let a = k as f64 * std::f64::consts::PI / 3.0 + 0.1;
            sites.push(Point2D::new(2.0 * a.cos(), 2.0 * a.sin()));
        }
        let d = VoronoiDiagram::compute(&sites).unwrap();
        assert!(!d.is_unbounded(0));
        assert_eq!(d.regions[0].len(), 6);
        for s in 1..7 {
            assert!(d.is_unbounded(s));
        }
    }

    #[test]
    fn test_collinear_sites() {
        let sites = vec![
            Point2D::new(2.0, 0.0),
            Point2D::new(-1.0, 0.0),
            Point2D::new(1.0, 0.0),
        ];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        assert!(d.vertices.is_empty());
        assert_eq!(sorted_pairs(&d), vec![[0, 2], [1, 2]]);
        assert!(d.ridges.iter().all(|r| r.vertices == [None, None]));
    }

    #[test]
    fn test_collinear_up_to_rounding() {
        let sites = vec![
            Point2D::new(0.1, 0.1),
            Point2D::new(0.2, 0.2),
            Point2D::new(0.3, 0.30000000000000004),
        ];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        assert!(d.vertices.is_empty());
        assert_eq!(sorted_pairs(&d), vec![[0, 1], [1, 2]]);

        // A visible offset keeps the triangle and its far-away circumcenter.
        let sites = vec![
            Point2D::new(-1.0, 0.0),
            Point2D::new(0.0, 1e-10),
            Point2D::new(1.0, 0.0),
        ];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        assert_eq!(d.vertices.len(), 1);
        assert!(d.vertices[0].y < -1e9);
    }

    #[test]
    fn test_rejects_bad_sites() {
        assert!(matches!(
            VoronoiDiagram::compute(&[Point2D::new(0.0, 0.0)]),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            VoronoiDiagram::compute(&[
                Point2D::new(0.0, 0.0),
                Point2D::new(1.0, 1.0),
                Point2D::new(0.0, 0.0)
            ]),
            Err(Error::DegenerateInput { .. })
        ));
        assert!(matches!(
            VoronoiDiagram::compute(&[Point2D::new(0.0, 0.0), Point2D::new(f64::NAN, 1.0)]),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_ridges_by_site_is_symmetric() {
        let sites = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 0.5),
            Point2D::new(1.0, 2.0),
            Point2D::new(2.0, -1.5),
        ];
        let d = VoronoiDiagram::compute(&sites).unwrap();
        let by_site = d.ridges_by_site();
        for (r, ridge) in d.ridges.iter().enumerate() {
            assert!(by_site[ridge.sites[0]].contains(&r));
            assert!(by_site[ridge.sites[1]].contains(&r));
        }
    }
}

use crate::bounds::BoundingRect;
use crate::point::Point2D;

const CLIP_EPS: f64 = 1e-9;

/// Why a site has no polygon in the tessellation. These are normal outcomes, not errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmptyReason {
    /// The site's region lies entirely outside the rectangle.
    OutsideBounds,
    /// Clipping left fewer than three distinct vertices or no area.
    Collapsed,
    /// A ridge of the region has a (near) zero-length tangent.
    DegenerateRidge,
    /// The triangulation dropped the site, it nearly coincides with another one.
    Unreached,
}

/// Scratch buffer to reuse allocations during clipping.
#[derive(Default, Clone)]
pub struct ClipScratch {
    vertices: Vec<f64>,
    neighbors: Vec<i32>,
    dists: Vec<f64>,
}

/// The part of one site's Voronoi region inside the bounding rectangle.
///
/// Vertices are stored flat (`[x, y, x, y, ...]`), counter-clockwise, with the
/// first vertex not repeated at the end. `edge_neighbors[i]` is the ID across the
/// edge starting at vertex `i`: a site index, or a negative rectangle side ID
/// (see [`box_side`](crate::box_side)).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClippedCell {
    pub(crate) site: usize,
    pub(crate) vertices: Vec<f64>,
    pub(crate) edge_neighbors: Vec<i32>,
    pub(crate) empty: Option<EmptyReason>,
}

impl ClippedCell {
    /// The whole rectangle as one cell, edges tagged with the rectangle sides.
    pub fn from_rect(site: usize, bounds: &BoundingRect) -> ClippedCell {
        let corners = bounds.corners();
        ClippedCell {
            site,
            vertices: corners.iter().flat_map(|p| [p.x, p.y]).collect(),
            edge_neighbors: vec![
                crate::bounds::box_side(1, false), // 0->1 (Bottom / Y-Min)
                crate::bounds::box_side(0, true),  // 1->2 (Right / X-Max)
                crate::bounds::box_side(1, true),  // 2->3 (Top / Y-Max)
                crate::bounds::box_side(0, false), // 3->0 (Left / X-Min)
            ],
            empty: None,
        }
    }

    pub fn empty(site: usize, reason: EmptyReason) -> ClippedCell {
        ClippedCell {
            site,
            vertices: Vec::new(),
            edge_neighbors: Vec::new(),
            empty: Some(reason),
        }
    }

    pub fn site(&self) -> usize {
        self.site
    }

    /// Flat vertex buffer `[x, y, x, y, ...]`.
    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    pub fn points(&self) -> Vec<Point2D> {
        self.vertices.chunks_exact(2).map(|c| Point2D::new(c[0], c[1])).collect()
    }

    pub fn edge_neighbors(&self) -> &[i32] {
        &self.edge_neighbors
    }

    /// Number of polygon vertices.
    pub fn len(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.empty.is_some() || self.vertices.is_empty()
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        self.empty
    }

    fn vertex(&self, i: usize) -> Point2D {
        Point2D::new(self.vertices[i * 2], self.vertices[i * 2 + 1])
    }

    /// Polygon edges as `(start, end, neighbor_id)`.
    pub fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D, i32)> + '_ {
        let n = self.len();
        (0..n).map(move |i| (self.vertex(i), self.vertex((i + 1) % n), self.edge_neighbors[i]))
    }

    /// Signed shoelace area, positive for counter-clockwise polygons.
    fn signed_area(&self) -> f64 {
        let n = self.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            let xi = self.vertices[i * 2];
            let yi = self.vertices[i * 2 + 1];
            let xj = self.vertices[j * 2];
            let yj = self.vertices[j * 2 + 1];
            area += xi * yj - xj * yi;
        }
        area * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area centroid, `None` for an empty or zero-area cell.
    pub fn centroid(&self) -> Option<Point2D> {
        let n = self.len();
        if n < 3 {
            return None;
        }

        let mut cx = 0.0;
        let mut cy = 0.0;
        let mut area = 0.0;

        for i in 0..n {
            let j = (i + 1) % n;
            let xi = self.vertices[i * 2];
            let yi = self.vertices[i * 2 + 1];
            let xj = self.vertices[j * 2];
            let yj = self.vertices[j * 2 + 1];

            let cross = xi * yj - xj * yi;
            area += cross;
            cx += (xi + xj) * cross;
            cy += (yi + yj) * cross;
        }

        if area.abs() < 1e-12 {
            return None;
        }

        let factor = 1.0 / (3.0 * area);
        Some(Point2D::new(cx * factor, cy * factor))
    }

    /// Closed containment test for the (convex, counter-clockwise) polygon.
    pub fn contains(&self, p: Point2D) -> bool {
        if self.is_empty() {
            return false;
        }
        self.edges().all(|(a, b, _)| (b - a).cross(p - a) >= -CLIP_EPS)
    }

    /// Clips the cell by the half-plane `(x - point) . normal <= 0`.
    /// The new edge created along the clipping line gets `neighbor_id`.
    /// Returns whether the cell was modified.
    pub fn clip(&mut self, point: &Point2D, normal: &Point2D, neighbor_id: i32, scratch: &mut ClipScratch) -> bool {
        let num_verts = self.vertices.len() / 2;
        if num_verts < 3 { return false; }

        scratch.dists.clear();
        scratch.dists.reserve(num_verts);

        let mut all_inside = true;
        let mut all_outside = true;

        for i in 0..num_verts {
            let vx = self.vertices[i * 2];
            let vy = self.vertices[i * 2 + 1];
            let d = (vx - point.x) * normal.x + (vy - point.y) * normal.y;
            scratch.dists.push(d);

            if d > CLIP_EPS {
                all_inside = false;
            } else if d < -CLIP_EPS {
                all_outside = false;
            }
        }

        if all_inside { return false; }
        if all_outside {
            self.vertices.clear();
            self.edge_neighbors.clear();
            return true;
        }

        scratch.vertices.clear();
        scratch.neighbors.clear();

        for i in 0..num_verts {
            let j = (i + 1) % num_verts;

            let d_i = scratch.dists[i];
            let d_j = scratch.dists[j];
            let neighbor = self.edge_neighbors[i];

            if d_i <= CLIP_EPS {
                // V_i is inside
                scratch.vertices.push(self.vertices[i * 2]);
                scratch.vertices.push(self.vertices[i * 2 + 1]);

                if d_j <= CLIP_EPS {
                    // V_j is inside: Keep edge
                    scratch.neighbors.push(neighbor);
                } else {
                    // V_j is outside: Clip
                    let (ix, iy) = self.intersect(i, j, d_i, d_j);

                    // The edge from V_i to I inherits neighbor
                    scratch.neighbors.push(neighbor);
                    scratch.vertices.push(ix);
                    scratch.vertices.push(iy);

                    // The edge starting at I runs along the clipping line.
                    scratch.neighbors.push(neighbor_id);
                }
            } else if d_j <= CLIP_EPS {
                // V_i is outside, V_j is inside: Entering
                let (ix, iy) = self.intersect(i, j, d_i, d_j);
                scratch.vertices.push(ix);
                scratch.vertices.push(iy);

                // The edge from I to V_j inherits neighbor
                scratch.neighbors.push(neighbor);
            }
        }

        std::mem::swap(&mut self.vertices, &mut scratch.vertices);
        std::mem::swap(&mut self.edge_neighbors, &mut scratch.neighbors);
        true
    }

    fn intersect(&self, i: usize, j: usize, d_i: f64, d_j: f64) -> (f64, f64) {
        let t = d_i / (d_i - d_j);
        let xi = self.vertices[i * 2];
        let yi = self.vertices[i * 2 + 1];
        let xj = self.vertices[j * 2];
        let yj = self.vertices[j * 2 + 1];
        (xi + t * (xj - xi), yi + t * (yj - yi))
    }

    /// Intersects `bounds` with the closed convex region of `site`.
    ///
    /// The cell starts as the whole rectangle and is cut by the supporting line of
    /// every region edge. An edge shared with another site is cut along the exact
    /// bisector of the two sites rather than through the region vertices, which may
    /// lie very far away. Edges closed by far points (`FAR_EDGE_ID`) are cut through
    /// their end points. The result is normalized: duplicate vertices removed and
    /// degenerate leftovers turned into an empty cell.
    pub fn clip_region(
        site: usize,
        sites: &[Point2D],
        polygon: &[Point2D],
        edge_neighbors: &[i32],
        bounds: &BoundingRect,
        scratch: &mut ClipScratch,
    ) -> ClippedCell {
        let mut cell = ClippedCell::from_rect(site, bounds);
        let p = sites[site];
        let inside = Point2D::mean(polygon).unwrap_or(p);
        let n = polygon.len();

        for (i, &id) in edge_neighbors.iter().enumerate().take(n) {
            let across = usize::try_from(id).ok().and_then(|j| sites.get(j));
            let (point, normal) = match across {
                Some(&q) => (p.midpoint(q), q - p),
                None => {
                    let a = polygon[i];
                    let b = polygon[(i + 1) % n];
                    let mut normal = (b - a).perp();
                    if normal.dot(inside - a) > 0.0 {
                        normal = normal * -1.0;
                    }
                    (a, normal)
                }
            };
            if normal.dot(normal) == 0.0 {
                continue;
            }
            cell.clip(&point, &normal, id, scratch);
            if cell.vertices.is_empty() {
                cell.empty = Some(EmptyReason::OutsideBounds);
                return cell;
            }
        }

        cell.finish(bounds.diagonal());
        cell
    }

    fn finish(&mut self, scale: f64) {
        let tol = CLIP_EPS * scale.max(1.0);

        // Drop zero-length edges; the surviving vertex keeps the edge that follows it.
        let mut n = self.len();
        let mut i = 0;
        while n > 1 && i < n {
            let j = (i + 1) % n;
            if self.vertex(i).distance(self.vertex(j)) <= tol {
                self.vertices.drain(j * 2..j * 2 + 2);
                let next = self.edge_neighbors.remove(j);
                if j > i {
                    self.edge_neighbors[i] = next;
                } else {
                    // j == 0 wrapped around: vertex i is now last.
                    let last = self.edge_neighbors.len() - 1;
                    self.edge_neighbors[last] = next;
                }
                n -= 1;
            } else {
                i += 1;
            }
        }

        if n < 3 || self.area() <= tol * tol {
            self.vertices.clear();
            self.edge_neighbors.clear();
            self.empty = Some(EmptyReason::Collapsed);
        }
    }
}

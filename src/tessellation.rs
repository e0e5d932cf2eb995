use crate::bounds::BoundingRect;
use crate::cell::{ClipScratch, ClippedCell, EmptyReason};
use crate::diagram::VoronoiDiagram;
use crate::error::Error;
use crate::point::Point2D;
use crate::regions::{FiniteRegions, default_radius};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Builds bounded Voronoi tessellations: the Voronoi region of every site,
/// closed with far points and clipped to a rectangle.
///
/// The builder holds configuration only, every [`build`](Self::build) call is
/// independent of the previous ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundedVoronoi {
    /// Distance of the synthetic far points. `None` picks a radius from the
    /// extent of the diagram and the rectangle.
    pub radius: Option<f64>,
    /// Clip the regions on the rayon pool.
    pub parallel: bool,
}

impl Default for BoundedVoronoi {
    fn default() -> Self {
        Self {
            radius: None,
            parallel: true,
        }
    }
}

impl BoundedVoronoi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Computes the clipped Voronoi cell of every site inside `bounds`.
    ///
    /// Fails on a malformed rectangle, fewer than two sites, non-finite
    /// coordinates, coincident sites or a non-positive radius. Sites whose cell
    /// vanishes are reported as empty cells, not errors.
    pub fn build(&self, sites: &[Point2D], bounds: &BoundingRect) -> Result<Tessellation, Error> {
        bounds.validate()?;
        let diagram = VoronoiDiagram::compute(sites)?;

        let radius = match self.radius {
            Some(r) => {
                if r.is_finite() && r < bounds.diagonal() {
                    warn!(radius = r, "far-point radius is smaller than the rectangle, cells may be truncated");
                }
                r
            }
            None => default_radius(&diagram, bounds),
        };
        let finite = FiniteRegions::reconstruct(&diagram, radius)?;

        let clip_site = |scratch: &mut ClipScratch, i: usize| match &finite.regions[i] {
            Ok(region) => {
                let polygon = region.polygon(&finite.vertices);
                ClippedCell::clip_region(i, sites, &polygon, &region.edge_neighbors, bounds, scratch)
            }
            Err(reason) => ClippedCell::empty(i, *reason),
        };

        let cells: Vec<ClippedCell> = if self.parallel {
            (0..sites.len())
                .into_par_iter()
                .map_init(ClipScratch::default, clip_site)
                .collect()
        } else {
            let mut scratch = ClipScratch::default();
            (0..sites.len()).map(|i| clip_site(&mut scratch, i)).collect()
        };

        let tessellation = Tessellation {
            bounds: *bounds,
            sites: sites.to_vec(),
            cells,
            radius,
        };
        debug!(
            sites = sites.len(),
            cells = tessellation.count_cells(),
            empty = sites.len() - tessellation.count_cells(),
            radius,
            "built bounded Voronoi tessellation"
        );
        Ok(tessellation)
    }

    /// Builds one tessellation per frame of sites, all clipped to the same rectangle.
    pub fn build_batch(&self, frames: &[Vec<Point2D>], bounds: &BoundingRect) -> Vec<Result<Tessellation, Error>> {
        if self.parallel {
            frames.par_iter().map(|sites| self.build(sites, bounds)).collect()
        } else {
            frames.iter().map(|sites| self.build(sites, bounds)).collect()
        }
    }
}

/// What lies across a [`Segment`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Edge shared by two cells, `sites[0] < sites[1]` unless the second cell is empty.
    Ridge { sites: [usize; 2] },
    /// Edge of `site`'s cell on a rectangle side (or a far edge when the radius was too small).
    Boundary { site: usize, side: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point2D,
    pub end: Point2D,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn is_ridge(&self) -> bool {
        matches!(self.kind, SegmentKind::Ridge { .. })
    }
}

/// Result of [`BoundedVoronoi::build`]: one [`ClippedCell`] per site, in site order.
#[derive(Clone, Debug)]
pub struct Tessellation {
    bounds: BoundingRect,
    sites: Vec<Point2D>,
    cells: Vec<ClippedCell>,
    radius: f64,
}

impl Tessellation {
    pub fn bounds(&self) -> &BoundingRect {
        &self.bounds
    }

    pub fn sites(&self) -> &[Point2D] {
        &self.sites
    }

    /// Far-point distance the regions were closed with.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn cells(&self) -> &[ClippedCell] {
        &self.cells
    }

    pub fn cell(&self, site: usize) -> Option<&ClippedCell> {
        self.cells.get(site)
    }

    /// Number of non-empty cells.
    pub fn count_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Sites without a cell and the reason.
    pub fn empty_sites(&self) -> Vec<(usize, EmptyReason)> {
        self.cells
            .iter()
            .filter_map(|c| c.empty_reason().map(|r| (c.site(), r)))
            .collect()
    }

    /// Polygon output: per site, its counter-clockwise vertices or `None` for no cell.
    pub fn polygons(&self) -> Vec<Option<Vec<Point2D>>> {
        self.cells
            .iter()
            .map(|c| (!c.is_empty()).then(|| c.points()))
            .collect()
    }

    /// Segment output: every cell edge once. Shared ridges are reported by the
    /// lower site of the pair, boundary edges by their cell.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        for cell in self.cells.iter().filter(|c| !c.is_empty()) {
            let site = cell.site();
            for (start, end, id) in cell.edges() {
                let kind = if id < 0 {
                    SegmentKind::Boundary { site, side: id }
                } else {
                    let other = id as usize;
                    let other_empty = self.cells.get(other).is_none_or(|c| c.is_empty());
                    if site > other && !other_empty {
                        continue;
                    }
                    SegmentKind::Ridge { sites: [site, other] }
                };
                segments.push(Segment { start, end, kind });
            }
        }
        segments
    }

    /// Only the edges between two cells, for renderers that draw the rectangle themselves.
    pub fn ridge_segments(&self) -> Vec<Segment> {
        self.segments().into_iter().filter(Segment::is_ridge).collect()
    }

    /// Site closest to `p`, lowest index on ties.
    pub fn nearest_site(&self, p: Point2D) -> usize {
        crate::kmeans::nearest_centroid(p, &self.sites)
    }

    /// Site owning `p`: the first cell containing it, or the nearest site when
    /// `p` falls in a gap left by an empty cell. `None` outside the rectangle.
    pub fn locate(&self, p: Point2D) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        self.cells
            .iter()
            .find(|c| c.contains(p))
            .map(ClippedCell::site)
            .or_else(|| Some(self.nearest_site(p)))
    }

    /// Sum of the cell areas; equals the rectangle area for a full tiling.
    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(ClippedCell::area).sum()
    }

    /// One Lloyd relaxation step: every site moved to its cell centroid. Sites
    /// without a cell stay in place.
    pub fn relaxed_sites(&self) -> Vec<Point2D> {
        self.cells
            .par_iter()
            .zip(self.sites.par_iter())
            .map(|(cell, site)| cell.centroid().unwrap_or(*site))
            .collect()
    }
}

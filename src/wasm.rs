use crate::bounds::BoundingRect;
use crate::kmeans::{ClusterAssigner, EmptyClusterPolicy, KMeansConfig, Seeding};
use crate::point::{points_from_flat, points_to_flat};
use crate::tessellation::{BoundedVoronoi, SegmentKind, Tessellation};
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

#[wasm_bindgen(typescript_custom_section)]
const TS_CONSTANTS_BOUNDS: &'static str = r#"
export const BOX_ID_LEFT = -1;
export const BOX_ID_RIGHT = -2;
export const BOX_ID_BOTTOM = -3;
export const BOX_ID_TOP = -4;
export const FAR_EDGE_ID = -1000;
"#;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// --- Voronoi ---

/// Bounded Voronoi tessellation of flat `[x, y, x, y, ...]` sites.
#[wasm_bindgen]
pub struct Voronoi2D {
    bounds: BoundingRect,
    builder: BoundedVoronoi,
    sites: Vec<f64>,
    inner: Option<Tessellation>,
}

#[wasm_bindgen]
impl Voronoi2D {
    #[wasm_bindgen(constructor)]
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Voronoi2D, JsValue> {
        let bounds = BoundingRect::new(x_min, x_max, y_min, y_max);
        bounds.validate().map_err(js_error)?;
        Ok(Voronoi2D {
            bounds,
            builder: BoundedVoronoi::new(),
            sites: Vec::new(),
            inner: None,
        })
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.builder = self.builder.with_radius(radius);
    }

    pub fn set_sites(&mut self, sites: &[f64]) {
        self.sites = sites.to_vec();
        self.inner = None;
    }

    pub fn calculate(&mut self) -> Result<(), JsValue> {
        let sites = points_from_flat(&self.sites);
        self.inner = Some(self.builder.build(&sites, &self.bounds).map_err(js_error)?);
        Ok(())
    }

    /// Moves every site to its cell centroid and recomputes.
    pub fn relax(&mut self) -> Result<(), JsValue> {
        if let Some(t) = &self.inner {
            self.sites = points_to_flat(&t.relaxed_sites());
        }
        self.calculate()
    }

    #[wasm_bindgen(getter)]
    pub fn sites(&self) -> Vec<f64> {
        self.sites.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn count_cells(&self) -> usize {
        self.inner.as_ref().map_or(0, Tessellation::count_cells)
    }

    /// Flat vertices of a site's cell, empty when it has none.
    pub fn cell_vertices(&self, site: usize) -> Vec<f64> {
        self.inner
            .as_ref()
            .and_then(|t| t.cell(site))
            .map(|c| c.vertices().to_vec())
            .unwrap_or_default()
    }

    pub fn cell_neighbors(&self, site: usize) -> Vec<i32> {
        self.inner
            .as_ref()
            .and_then(|t| t.cell(site))
            .map(|c| c.edge_neighbors().to_vec())
            .unwrap_or_default()
    }

    pub fn cell_area(&self, site: usize) -> f64 {
        self.inner
            .as_ref()
            .and_then(|t| t.cell(site))
            .map_or(0.0, |c| c.area())
    }

    /// All edges as `[x1, y1, x2, y2, ...]`. With `ridges_only`, rectangle edges are left out.
    pub fn segments(&self, ridges_only: bool) -> Vec<f64> {
        let Some(t) = &self.inner else { return Vec::new() };
        t.segments()
            .into_iter()
            .filter(|s| !ridges_only || matches!(s.kind, SegmentKind::Ridge { .. }))
            .flat_map(|s| [s.start.x, s.start.y, s.end.x, s.end.y])
            .collect()
    }

    pub fn locate(&self, x: f64, y: f64) -> Option<u32> {
        self.inner
            .as_ref()
            .and_then(|t| t.locate(crate::Point2D::new(x, y)))
            .map(|s| s as u32)
    }
}

// --- KMeans ---

/// Lloyd's k-means over flat `[x, y, x, y, ...]` points.
#[wasm_bindgen]
pub struct KMeans2D {
    inner: ClusterAssigner,
}

#[wasm_bindgen]
impl KMeans2D {
    /// Seeds `k` centroids uniformly in the points' bounding rectangle.
    #[wasm_bindgen(constructor)]
    pub fn new(points: &[f64], k: usize, seed: u32, reseed_empty: bool) -> Result<KMeans2D, JsValue> {
        let points = points_from_flat(points);
        let area = BoundingRect::enclosing(&points).ok_or_else(|| js_error("k-means needs at least one point"))?;
        let policy = if reseed_empty {
            EmptyClusterPolicy::Reseed
        } else {
            EmptyClusterPolicy::KeepCentroid
        };
        let config = KMeansConfig::new(k, Seeding::RandomUniform(area))
            .with_seed(seed as u64)
            .with_empty_policy(policy);
        Ok(KMeans2D {
            inner: ClusterAssigner::initialize(&points, config).map_err(js_error)?,
        })
    }

    /// Starts from caller supplied centroids.
    pub fn with_centroids(points: &[f64], centroids: &[f64]) -> Result<KMeans2D, JsValue> {
        let seeds = points_from_flat(centroids);
        let config = KMeansConfig::new(seeds.len(), Seeding::Supplied(seeds));
        Ok(KMeans2D {
            inner: ClusterAssigner::initialize(&points_from_flat(points), config).map_err(js_error)?,
        })
    }

    /// One iteration, returns the labels it used.
    pub fn step(&mut self) -> Vec<u32> {
        self.inner.step().labels.into_iter().map(|l| l as u32).collect()
    }

    pub fn run(&mut self, iterations: usize) -> Vec<u32> {
        self.inner.run(iterations).labels.into_iter().map(|l| l as u32).collect()
    }

    pub fn set_points(&mut self, points: &[f64]) -> Result<(), JsValue> {
        self.inner.set_points(&points_from_flat(points)).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn centroids(&self) -> Vec<f64> {
        points_to_flat(self.inner.centroids())
    }

    #[wasm_bindgen(getter)]
    pub fn labels(&self) -> Vec<u32> {
        self.inner.labels().iter().map(|&l| l as u32).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn iteration(&self) -> usize {
        self.inner.iteration()
    }
}

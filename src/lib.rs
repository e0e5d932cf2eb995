//! # voroplane
//!
//! `voroplane` is a Rust library for planar k-means clustering and bounded Voronoi
//! tessellations, designed to be used in Rust as well as compiled to WebAssembly (WASM).
//! It turns a point set into cluster labels and centroids, and any set of sites into
//! closed convex cells clipped to an axis-aligned rectangle.
//!
//! ## Features
//!
//! - **Lloyd's k-means**: deterministic assignment (lowest index wins ties), fixed
//!   iteration budgets, configurable seeding and empty-cluster policy.
//! - **Bounded Voronoi**: unbounded regions are closed with far points and clipped
//!   against the rectangle. Every cell edge knows the site or rectangle side across it.
//! - **Two output modes**: filled polygons per site, or line segments for edge renderers.
//! - **Parallel**: per-site clipping and per-point assignment run on `rayon`.
//! - **WASM-first**: `wasm-bindgen` wrappers for browser renderers.
//!
//! ## Example
//!
//! ```
//! use voroplane::{BoundedVoronoi, BoundingRect, ClusterAssigner, KMeansConfig, Point2D, Seeding};
//!
//! let points = vec![
//!     Point2D::new(-2.0, 0.1), Point2D::new(-2.2, -0.1),
//!     Point2D::new(2.0, 0.0), Point2D::new(2.1, 0.2),
//! ];
//! let bounds = BoundingRect::new(-3.0, 3.0, -1.0, 1.0);
//! let seeds = vec![Point2D::new(-1.0, 0.0), Point2D::new(1.0, 0.0)];
//! let mut kmeans = ClusterAssigner::initialize(&points, KMeansConfig::new(2, Seeding::Supplied(seeds))).unwrap();
//! let result = kmeans.run(5);
//! assert_eq!(result.labels, vec![0, 0, 1, 1]);
//!
//! let tessellation = BoundedVoronoi::new().build(&result.centroids, &bounds).unwrap();
//! assert_eq!(tessellation.count_cells(), 2);
//! assert!((tessellation.total_area() - bounds.area()).abs() < 1e-9);
//! ```
//!
//! ## Main Interface
//!
//! [`ClusterAssigner`] runs the clustering, [`BoundedVoronoi`] builds a [`Tessellation`].

pub mod bounds;
mod cell;
pub mod diagram;
mod error;
pub mod kmeans;
pub mod motion;
mod point;
pub mod points_io;
pub mod regions;
pub mod sampling;
mod tessellation;
pub mod wasm;

pub use bounds::BoundingRect;
pub use bounds::box_side;
pub use bounds::BOX_ID_BOTTOM;
pub use bounds::BOX_ID_LEFT;
pub use bounds::BOX_ID_RIGHT;
pub use bounds::BOX_ID_TOP;
pub use bounds::FAR_EDGE_ID;
pub use cell::{ClipScratch, ClippedCell, EmptyReason};
pub use diagram::{Ridge, VoronoiDiagram};
pub use error::{Error, PointsIoError};
pub use kmeans::{Assignment, Cluster, ClusterAssigner, EmptyClusterPolicy, KMeansConfig, Seeding};
pub use motion::MovingPoint;
pub use point::{Point2D, points_from_flat, points_to_flat};
pub use regions::{FiniteRegion, FiniteRegions};
pub use tessellation::{BoundedVoronoi, Segment, SegmentKind, Tessellation};

//! Lloyd's k-means over a fixed set of planar points.
//!
//! Every [`ClusterAssigner::step`] assigns each point to its nearest centroid
//! (lowest index on ties) and moves each centroid to the mean of its members.
//! A cluster that ends up without members keeps its centroid unless
//! [`EmptyClusterPolicy::Reseed`] is configured.

use crate::bounds::BoundingRect;
use crate::error::Error;
use crate::point::Point2D;
use crate::sampling::uniform_point;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 123456789;

/// Where the initial centroids come from.
#[derive(Clone, Debug, PartialEq)]
pub enum Seeding {
    /// Each centroid drawn independently and uniformly inside the rectangle.
    RandomUniform(BoundingRect),
    /// Exactly `k` caller supplied centroids, used as given.
    Supplied(Vec<Point2D>),
}

/// What happens to a centroid whose cluster received no points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    /// Leave the centroid where it is.
    #[default]
    KeepCentroid,
    /// Draw a fresh centroid uniformly in the seeding rectangle (or the
    /// points' bounding rectangle for supplied seeds).
    Reseed,
}

#[derive(Clone, Debug)]
pub struct KMeansConfig {
    pub k: usize,
    pub seeding: Seeding,
    pub empty_policy: EmptyClusterPolicy,
    /// Updated centroids are clamped into this rectangle when set.
    pub clamp: Option<BoundingRect>,
    pub seed: u64,
    /// Assign points on the rayon pool.
    pub parallel: bool,
}

impl KMeansConfig {
    pub fn new(k: usize, seeding: Seeding) -> Self {
        Self {
            k,
            seeding,
            empty_policy: EmptyClusterPolicy::default(),
            clamp: None,
            seed: DEFAULT_SEED,
            parallel: true,
        }
    }

    pub fn with_empty_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    pub fn with_clamp(mut self, clamp: BoundingRect) -> Self {
        self.clamp = Some(clamp);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// A centroid together with the indices of the points assigned to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub centroid: Point2D,
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Result of one iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// Cluster index per point, against the centroids at the start of the iteration.
    pub labels: Vec<usize>,
    /// Centroids after the update.
    pub centroids: Vec<Point2D>,
    /// Clusters that received no points.
    pub empty_clusters: Vec<usize>,
}

/// Index of the centroid closest to `p` in squared Euclidean distance. Ties go to
/// the lowest index. `centroids` must not be empty.
pub fn nearest_centroid(p: Point2D, centroids: &[Point2D]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = p.distance_sq(*c);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn empty_clusters(labels: &[usize], k: usize) -> Vec<usize> {
    let mut seen = vec![false; k];
    for &l in labels {
        seen[l] = true;
    }
    (0..k).filter(|&c| !seen[c]).collect()
}

fn check_points(points: &[Point2D], what: &str) -> Result<(), Error> {
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(Error::invalid(format!("{} {} has non-finite coordinates", what, i)));
    }
    Ok(())
}

/// Iterative k-means state: the points, the current centroids and the last labels.
///
/// A `ClusterAssigner` mutates in place on `step`, distinct instances are independent.
#[derive(Clone, Debug)]
pub struct ClusterAssigner {
    points: Vec<Point2D>,
    centroids: Vec<Point2D>,
    labels: Vec<usize>,
    empty_policy: EmptyClusterPolicy,
    clamp: Option<BoundingRect>,
    reseed_area: BoundingRect,
    parallel: bool,
    rng: StdRng,
    iteration: usize,
}

impl ClusterAssigner {
    /// Validates the configuration, seeds the centroids and computes initial labels.
    pub fn initialize(points: &[Point2D], config: KMeansConfig) -> Result<Self, Error> {
        if config.k < 1 {
            return Err(Error::invalid("k must be at least 1"));
        }
        let Some(enclosing) = BoundingRect::enclosing(points) else {
            return Err(Error::invalid("k-means needs at least one point"));
        };
        check_points(points, "point")?;
        if let Some(clamp) = &config.clamp {
            clamp.validate()?;
        }
        if config.k > points.len() {
            warn!(
                k = config.k,
                points = points.len(),
                "more clusters than points, some clusters will stay empty"
            );
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let (centroids, reseed_area) = match config.seeding {
            Seeding::RandomUniform(rect) => {
                rect.validate()?;
                let centroids = (0..config.k).map(|_| uniform_point(&rect, &mut rng)).collect();
                (centroids, rect)
            }
            Seeding::Supplied(seeds) => {
                if seeds.len() != config.k {
                    return Err(Error::invalid(format!(
                        "expected {} supplied centroids, got {}",
                        config.k,
                        seeds.len()
                    )));
                }
                check_points(&seeds, "supplied centroid")?;
                (seeds, enclosing)
            }
        };

        let mut assigner = Self {
            points: points.to_vec(),
            centroids,
            labels: Vec::new(),
            empty_policy: config.empty_policy,
            clamp: config.clamp,
            reseed_area,
            parallel: config.parallel,
            rng,
            iteration: 0,
        };
        assigner.labels = assigner.assign();

        debug!(
            points = assigner.points.len(),
            k = config.k,
            policy = ?assigner.empty_policy,
            "initialized k-means"
        );
        Ok(assigner)
    }

    /// Labels for the current centroids, without moving them.
    pub fn assign(&self) -> Vec<usize> {
        let centroids = &self.centroids;
        if self.parallel {
            self.points
                .par_iter()
                .map(|p| nearest_centroid(*p, centroids))
                .collect()
        } else {
            self.points.iter().map(|p| nearest_centroid(*p, centroids)).collect()
        }
    }

    /// One Lloyd iteration.
    pub fn step(&mut self) -> Assignment {
        let k = self.centroids.len();
        let labels = self.assign();

        let mut sums = vec![Point2D::default(); k];
        let mut counts = vec![0usize; k];
        for (p, &l) in self.points.iter().zip(&labels) {
            sums[l] = sums[l] + *p;
            counts[l] += 1;
        }

        let mut moved = 0.0f64;
        let mut empty = Vec::new();
        for c in 0..k {
            let updated = if counts[c] == 0 {
                empty.push(c);
                match self.empty_policy {
                    EmptyClusterPolicy::KeepCentroid => continue,
                    EmptyClusterPolicy::Reseed => uniform_point(&self.reseed_area, &mut self.rng),
                }
            } else {
                sums[c] * (1.0 / counts[c] as f64)
            };
            let updated = match &self.clamp {
                Some(rect) => rect.clamp(updated),
                None => updated,
            };
            moved = moved.max(updated.distance(self.centroids[c]));
            self.centroids[c] = updated;
        }

        self.iteration += 1;
        if !empty.is_empty() {
            debug!(iteration = self.iteration, ?empty, policy = ?self.empty_policy, "empty clusters");
        }
        trace!(iteration = self.iteration, max_shift = moved, "k-means step");

        self.labels = labels.clone();
        Assignment {
            labels,
            centroids: self.centroids.clone(),
            empty_clusters: empty,
        }
    }

    /// Runs exactly `iterations` steps and returns the last one. With zero
    /// iterations the current centroids are only used for labelling.
    pub fn run(&mut self, iterations: usize) -> Assignment {
        let mut last = None;
        for _ in 0..iterations {
            last = Some(self.step());
        }
        last.unwrap_or_else(|| {
            let labels = self.assign();
            Assignment {
                empty_clusters: empty_clusters(&labels, self.centroids.len()),
                labels,
                centroids: self.centroids.clone(),
            }
        })
    }

    /// Replaces the data points, e.g. after they moved. Centroids are kept,
    /// labels are recomputed.
    pub fn set_points(&mut self, points: &[Point2D]) -> Result<(), Error> {
        if points.is_empty() {
            return Err(Error::invalid("k-means needs at least one point"));
        }
        check_points(points, "point")?;
        self.points = points.to_vec();
        self.labels = self.assign();
        Ok(())
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn centroids(&self) -> &[Point2D] {
        &self.centroids
    }

    /// Labels from the last step (or from initialization).
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Number of steps taken so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Current centroids with their members according to [`labels`](Self::labels).
    pub fn clusters(&self) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = self
            .centroids
            .iter()
            .map(|&centroid| Cluster {
                centroid,
                members: Vec::new(),
            })
            .collect();
        for (i, &l) in self.labels.iter().enumerate() {
            clusters[l].members.push(i);
        }
        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_points() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(11.0, 10.0),
        ]
    }

    #[test]
    fn test_nearest_centroid_tie_goes_to_lowest() {
        let centroids = [Point2D::new(-1.0, 0.0), Point2D::new(1.0, 0.0)];
        assert_eq!(nearest_centroid(Point2D::new(0.0, 3.0), &centroids), 0);
        assert_eq!(nearest_centroid(Point2D::new(0.1, 3.0), &centroids), 1);
    }

    #[test]
    fn test_two_clusters_converge() {
        let config = KMeansConfig::new(
            2,
            Seeding::Supplied(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]),
        );
        let mut km = ClusterAssigner::initialize(&square_points(), config).unwrap();
        let result = km.run(5);
        assert_eq!(result.labels, vec![0, 0, 0, 1, 1]);
        assert!(result.centroids[0].distance(Point2D::new(1.0 / 3.0, 1.0 / 3.0)) < 1e-12);
        assert!(result.centroids[1].distance(Point2D::new(10.5, 10.0)) < 1e-12);
        assert_eq!(km.iteration(), 5);
        let clusters = km.clusters();
        assert_eq!(clusters[1].members, vec![3, 4]);
    }

    #[test]
    fn test_empty_cluster_keeps_centroid() {
        let far = Point2D::new(100.0, 100.0);
        let config = KMeansConfig::new(2, Seeding::Supplied(vec![Point2D::new(0.0, 0.0), far]));
        let pts = vec![Point2D::new(0.0, 0.0), Point2D::new(2.0, 0.0)];
        let mut km = ClusterAssigner::initialize(&pts, config).unwrap();
        let result = km.step();
        assert_eq!(result.empty_clusters, vec![1]);
        assert_eq!(result.centroids[1], far);
    }

    #[test]
    fn test_empty_cluster_reseeds_inside_points() {
        let config = KMeansConfig::new(
            2,
            Seeding::Supplied(vec![Point2D::new(0.0, 0.0), Point2D::new(100.0, 100.0)]),
        )
        .with_empty_policy(EmptyClusterPolicy::Reseed);
        let pts = vec![Point2D::new(0.0, 0.0), Point2D::new(2.0, 1.0)];
        let mut km = ClusterAssigner::initialize(&pts, config).unwrap();
        let result = km.step();
        assert_eq!(result.empty_clusters, vec![1]);
        let area = BoundingRect::new(0.0, 2.0, 0.0, 1.0);
        assert!(area.contains(result.centroids[1]));
    }

    #[test]
    fn test_clamp_centroids() {
        let clamp = BoundingRect::new(-1.0, 1.0, -1.0, 1.0);
        let config = KMeansConfig::new(1, Seeding::Supplied(vec![Point2D::new(0.0, 0.0)])).with_clamp(clamp);
        let pts = vec![Point2D::new(4.0, 0.5), Point2D::new(6.0, 0.5)];
        let mut km = ClusterAssigner::initialize(&pts, config).unwrap();
        assert_eq!(km.step().centroids[0], Point2D::new(1.0, 0.5));
    }

    #[test]
    fn test_run_zero_only_labels() {
        let config = KMeansConfig::new(
            2,
            Seeding::Supplied(vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)]),
        );
        let mut km = ClusterAssigner::initialize(&square_points(), config).unwrap();
        let result = km.run(0);
        assert_eq!(result.labels, vec![0, 0, 0, 1, 1]);
        assert_eq!(result.centroids, vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)]);
        assert_eq!(km.iteration(), 0);
    }

    #[test]
    fn test_serial_matches_parallel() {
        let rect = BoundingRect::new(0.0, 11.0, 0.0, 10.0);
        let a = ClusterAssigner::initialize(&square_points(), KMeansConfig::new(3, Seeding::RandomUniform(rect)))
            .unwrap()
            .run(4);
        let b = ClusterAssigner::initialize(
            &square_points(),
            KMeansConfig::new(3, Seeding::RandomUniform(rect)).with_parallel(false),
        )
        .unwrap()
        .run(4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_configurations() {
        let pts = square_points();
        let rect = BoundingRect::new(0.0, 1.0, 0.0, 1.0);
        assert!(ClusterAssigner::initialize(&pts, KMeansConfig::new(0, Seeding::RandomUniform(rect))).is_err());
        assert!(ClusterAssigner::initialize(&[], KMeansConfig::new(1, Seeding::RandomUniform(rect))).is_err());
        assert!(
            ClusterAssigner::initialize(&pts, KMeansConfig::new(2, Seeding::Supplied(vec![Point2D::new(0.0, 0.0)])))
                .is_err()
        );
        let flipped = BoundingRect::new(1.0, 0.0, 0.0, 1.0);
        assert!(ClusterAssigner::initialize(&pts, KMeansConfig::new(1, Seeding::RandomUniform(flipped))).is_err());
        let nan = vec![Point2D::new(f64::NAN, 0.0)];
        assert!(ClusterAssigner::initialize(&nan, KMeansConfig::new(1, Seeding::RandomUniform(rect))).is_err());
    }

    #[test]
    fn test_set_points_relabels() {
        let config = KMeansConfig::new(
            2,
            Seeding::Supplied(vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)]),
        );
        let mut km = ClusterAssigner::initialize(&square_points(), config).unwrap();
        km.set_points(&[Point2D::new(9.0, 9.0), Point2D::new(0.5, 0.0)]).unwrap();
        assert_eq!(km.labels(), &[1, 0]);
        assert!(km.set_points(&[]).is_err());
    }
}

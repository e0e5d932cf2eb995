use plotters::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use voroplane::sampling::gaussian_blobs;
use voroplane::{BoundedVoronoi, BoundingRect, ClusterAssigner, KMeansConfig, Point2D, Seeding};

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let area = BoundingRect::new(-7.0, 7.0, -4.0, 4.0);
    let centers = [
        Point2D::new(-4.0, 1.0),
        Point2D::new(-4.0, -2.0),
        Point2D::new(0.0, 0.0),
        Point2D::new(4.0, -2.0),
        Point2D::new(3.5, 2.5),
    ];
    let mut rng = StdRng::seed_from_u64(123456789);
    let blobs = gaussian_blobs(&centers, 250, 0.8, Some(&area), &mut rng)?;

    let config = KMeansConfig::new(centers.len(), Seeding::RandomUniform(area)).with_clamp(area);
    let mut kmeans = ClusterAssigner::initialize(&blobs.points, config)?;
    let builder = BoundedVoronoi::new();

    for iteration in 0..=6 {
        let result = if iteration == 0 { kmeans.run(0) } else { kmeans.step() };
        let tessellation = builder.build(&result.centroids, &area)?;
        let filename = format!("kmeans_voronoi_{}.svg", iteration);

        let root = SVGBackend::new(&filename, (1400, 800)).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .build_cartesian_2d(area.x_min..area.x_max, area.y_min..area.y_max)?;

        for cell in tessellation.cells().iter().filter(|c| !c.is_empty()) {
            let poly: Vec<(f64, f64)> = cell.points().iter().map(|p| (p.x, p.y)).collect();
            let color = PALETTE[cell.site() % PALETTE.len()];
            chart.draw_series(std::iter::once(Polygon::new(poly, color.mix(0.15).filled())))?;
        }

        chart.draw_series(tessellation.ridge_segments().iter().map(|s| {
            PathElement::new(vec![(s.start.x, s.start.y), (s.end.x, s.end.y)], BLACK.stroke_width(2))
        }))?;

        chart.draw_series(blobs.points.iter().zip(&result.labels).map(|(p, &l)| {
            Circle::new((p.x, p.y), 3, PALETTE[l % PALETTE.len()].filled())
        }))?;

        chart.draw_series(
            result
                .centroids
                .iter()
                .map(|c| Cross::new((c.x, c.y), 8, BLACK.stroke_width(3))),
        )?;

        root.present()?;
        println!("Output saved to {}", filename);
    }
    Ok(())
}

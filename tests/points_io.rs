use std::io::Cursor;
use voroplane::points_io::{format_points, parse_points, read_points, write_points};
use voroplane::{BoundedVoronoi, BoundingRect, Point2D, PointsIoError};

#[test]
fn test_file_round_trip_feeds_tessellation() {
    let path = std::env::temp_dir().join(format!("voroplane_points_{}.txt", std::process::id()));
    let sites = vec![
        Point2D::new(-1.5, 0.25),
        Point2D::new(2.0, -0.75),
        Point2D::new(0.5, 1.125),
    ];
    write_points(&path, &sites).unwrap();
    let loaded = read_points(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, sites);

    let t = BoundedVoronoi::new()
        .build(&loaded, &BoundingRect::new(-3.0, 3.0, -2.0, 2.0))
        .unwrap();
    assert_eq!(t.count_cells(), 3);
}

#[test]
fn test_missing_file() {
    let err = read_points("/definitely/not/here/points.txt").unwrap_err();
    assert!(matches!(err, PointsIoError::Io(_)));
}

#[test]
fn test_malformed_lines() {
    for bad in ["1.0", "1.0,abc", "x,y", "1;2"] {
        let err = parse_points(Cursor::new(format!("0,0\n{}\n", bad))).unwrap_err();
        assert!(matches!(err, PointsIoError::Parse { line: 2, .. }), "accepted {:?}", bad);
    }
}

#[test]
fn test_format_output() {
    let mut out = Vec::new();
    format_points(&mut out, &[Point2D::new(3.0, -4.5)]).unwrap();
    assert_eq!(out, b"3,-4.5\n");
}

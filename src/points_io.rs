//! Plain text point files: one `x,y` pair per line.

use crate::error::PointsIoError;
use crate::point::Point2D;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Parses `x,y` lines. Blank lines are skipped, surrounding whitespace is ignored.
pub fn parse_points<R: BufRead>(reader: R) -> Result<Vec<Point2D>, PointsIoError> {
    let mut points = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed = trimmed
            .split_once(',')
            .and_then(|(x, y)| Some(Point2D::new(x.trim().parse().ok()?, y.trim().parse().ok()?)));
        match parsed {
            Some(p) => points.push(p),
            None => {
                return Err(PointsIoError::Parse {
                    line: i + 1,
                    content: line,
                });
            }
        }
    }
    Ok(points)
}

/// Writes one `x,y` line per point.
pub fn format_points<W: Write>(mut writer: W, points: &[Point2D]) -> Result<(), PointsIoError> {
    for p in points {
        writeln!(writer, "{},{}", p.x, p.y)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_points(path: impl AsRef<Path>) -> Result<Vec<Point2D>, PointsIoError> {
    parse_points(BufReader::new(File::open(path)?))
}

pub fn write_points(path: impl AsRef<Path>, points: &[Point2D]) -> Result<(), PointsIoError> {
    format_points(BufWriter::new(File::create(path)?), points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_points() {
        let text = "1.5,-2\n\n  3 , 4e-1 \n";
        let pts = parse_points(Cursor::new(text)).unwrap();
        assert_eq!(pts, vec![Point2D::new(1.5, -2.0), Point2D::new(3.0, 0.4)]);
    }

    #[test]
    fn test_parse_reports_line() {
        let err = parse_points(Cursor::new("0,0\nfoo\n")).unwrap_err();
        match err {
            PointsIoError::Parse { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "foo");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_format_is_parseable() {
        let pts = vec![Point2D::new(0.1, -3.25), Point2D::new(1e-7, 2.0)];
        let mut buf = Vec::new();
        format_points(&mut buf, &pts).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "0.1,-3.25\n0.0000001,2\n");
        assert_eq!(parse_points(Cursor::new(buf)).unwrap(), pts);
    }
}

//! Draw damage histories as an SVG line chart.

use crate::numbers::{max_finite, min_finite};
use log::debug;
use svg::node::element::path::Data;
use svg::node::element::{Group, Line, Path, Rectangle, Text};
use svg::node;
use svg::Document;

/// Maximum number of points drawn for a single line.
const MAX_POINTS: usize = 2000;
const NTICKS: usize = 5;

const COLOURS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

/// Layout and labels of the chart.
#[derive(Debug, Clone)]
pub struct PlotData {
    /// Name of the file to write
    pub file: String,
    /// Width in pixels
    pub xsize: u32,
    /// Height in pixels
    pub ysize: u32,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
}

impl Default for PlotData {
    fn default() -> Self {
        Self {
            file: "damage.svg".to_string(),
            xsize: 800,
            ysize: 500,
            title: "Cumulative damage".to_string(),
            xlabel: "Repetitions".to_string(),
            ylabel: "Damage".to_string(),
        }
    }
}

/// A labelled line on the chart.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

// Drawing area inside the margins in pixel coordinates.
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

impl Frame {
    fn px(&self, x: f64) -> f64 {
        self.left + (x - self.xmin) / (self.xmax - self.xmin) * (self.right - self.left)
    }

    fn py(&self, y: f64) -> f64 {
        self.bottom - (y - self.ymin) / (self.ymax - self.ymin) * (self.bottom - self.top)
    }
}

/// Indexes of the points kept when a line has too many points to draw.
/// The first and last points are always kept.
fn decimate(n: usize, max_points: usize) -> Vec<usize> {
    if n <= max_points {
        return (0..n).collect();
    }
    let stride = (n + max_points - 1) / max_points;
    let mut keep: Vec<usize> = (0..n).step_by(stride).collect();
    if keep.last() != Some(&(n - 1)) {
        keep.push(n - 1);
    }
    keep
}

fn tick_label(value: f64) -> String {
    if value != 0.0 && (value.abs() >= 1e5 || value.abs() < 1e-2) {
        format!("{:.1e}", value)
    } else {
        format!("{}", (value * 100.0).round() / 100.0)
    }
}

fn text(x: f64, y: f64, anchor: &str, content: &str) -> Text {
    Text::new()
        .set("x", x)
        .set("y", y)
        .set("text-anchor", anchor)
        .set("font-family", "sans-serif")
        .set("font-size", 12)
        .add(node::Text::new(content))
}

/// Write the series to an SVG file.
///
/// The y axis always includes the range [0, 1] so that failure is at
/// the same height on every chart.
pub fn write_svg_plot(series: &[Series], plot: &PlotData) -> Result<(), String> {
    if series.is_empty() {
        return Err("There is nothing to plot".to_string());
    }
    for line in series {
        if line.x.len() != line.y.len() {
            return Err(format!(
                "The series '{}' has {} x values but {} y values",
                line.label,
                line.x.len(),
                line.y.len()
            ));
        }
    }

    let all_x: Vec<f64> = series.iter().flat_map(|s| s.x.iter().cloned()).collect();
    let all_y: Vec<f64> = series.iter().flat_map(|s| s.y.iter().cloned()).collect();

    let xmin = min_finite(&all_x).unwrap_or(0.0).min(0.0);
    let mut xmax = max_finite(&all_x).unwrap_or(1.0);
    if xmax <= xmin {
        xmax = xmin + 1.0;
    }
    let ymin = min_finite(&all_y).unwrap_or(0.0).min(0.0);
    let ymax = max_finite(&all_y).unwrap_or(1.0).max(1.0);

    let width = f64::from(plot.xsize);
    let height = f64::from(plot.ysize);
    let frame = Frame {
        left: 70.0,
        right: width - 20.0,
        top: 40.0,
        bottom: height - 50.0,
        xmin,
        xmax,
        ymin,
        ymax,
    };

    let mut document = Document::new()
        .set("viewBox", format!("0 0 {} {}", plot.xsize, plot.ysize))
        .set("width", plot.xsize)
        .set("height", plot.ysize)
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "white"),
        )
        .add(text(width / 2.0, 24.0, "middle", &plot.title))
        .add(text(width / 2.0, height - 12.0, "middle", &plot.xlabel))
        .add(
            text(0.0, 0.0, "middle", &plot.ylabel)
                .set("transform", format!("translate(18, {}) rotate(-90)", height / 2.0)),
        );

    // axes, grid and tick labels
    let mut axes = Group::new().set("stroke", "black").set("stroke-width", 1);
    axes = axes
        .add(Line::new().set("x1", frame.left).set("y1", frame.bottom).set("x2", frame.right).set("y2", frame.bottom))
        .add(Line::new().set("x1", frame.left).set("y1", frame.top).set("x2", frame.left).set("y2", frame.bottom));
    document = document.add(axes);

    for i in 0..=NTICKS {
        let fraction = i as f64 / NTICKS as f64;
        let xvalue = xmin + fraction * (xmax - xmin);
        let yvalue = ymin + fraction * (ymax - ymin);
        let x = frame.px(xvalue);
        let y = frame.py(yvalue);

        document = document
            .add(
                Line::new()
                    .set("x1", x)
                    .set("y1", frame.top)
                    .set("x2", x)
                    .set("y2", frame.bottom)
                    .set("stroke", "#dddddd"),
            )
            .add(
                Line::new()
                    .set("x1", frame.left)
                    .set("y1", y)
                    .set("x2", frame.right)
                    .set("y2", y)
                    .set("stroke", "#dddddd"),
            )
            .add(text(x, frame.bottom + 16.0, "middle", &tick_label(xvalue)))
            .add(text(frame.left - 6.0, y + 4.0, "end", &tick_label(yvalue)));
    }

    // one line per series, with a legend entry
    for (i, line) in series.iter().enumerate() {
        let colour = COLOURS[i % COLOURS.len()];
        let keep = decimate(line.x.len(), MAX_POINTS);
        debug!(
            "Plot: drawing {} of {} points for '{}'",
            keep.len(),
            line.x.len(),
            line.label
        );

        let points: Vec<(f32, f32)> = keep
            .iter()
            .filter(|&&j| line.x[j].is_finite() && line.y[j].is_finite())
            .map(|&j| (frame.px(line.x[j]) as f32, frame.py(line.y[j]) as f32))
            .collect();

        if let Some((first, rest)) = points.split_first() {
            let data = rest
                .iter()
                .fold(Data::new().move_to(*first), |data, point| data.line_to(*point));
            document = document.add(
                Path::new()
                    .set("fill", "none")
                    .set("stroke", colour)
                    .set("stroke-width", 2)
                    .set("d", data),
            );
        }

        let legend_y = frame.top + 10.0 + 18.0 * i as f64;
        document = document
            .add(
                Line::new()
                    .set("x1", frame.left + 12.0)
                    .set("y1", legend_y)
                    .set("x2", frame.left + 36.0)
                    .set("y2", legend_y)
                    .set("stroke", colour)
                    .set("stroke-width", 2),
            )
            .add(text(frame.left + 42.0, legend_y + 4.0, "start", &line.label));
    }

    svg::save(&plot.file, &document).map_err(|why| format!("Could not write the plot to '{}': {}", plot.file, why))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    fn series(label: &str, n: usize) -> Series {
        Series {
            label: label.to_string(),
            x: (1..=n).map(|i| i as f64).collect(),
            y: (1..=n).map(|i| i as f64 / n as f64).collect(),
        }
    }

    #[test]
    fn decimate_keeps_ends() {
        assert_eq!(decimate(5, 10), vec![0, 1, 2, 3, 4]);

        let keep = decimate(100_000, MAX_POINTS);
        assert!(keep.len() <= MAX_POINTS + 1);
        assert_eq!(keep.first(), Some(&0));
        assert_eq!(keep.last(), Some(&99_999));
    }

    #[test]
    fn tick_labels_switch_to_exponent_for_large_values() {
        assert_eq!(tick_label(0.0), "0");
        assert_eq!(tick_label(0.25), "0.25");
        assert_eq!(tick_label(20000.0), "20000");
        assert_eq!(tick_label(100000.0), "1.0e5");
    }

    #[test]
    fn writes_svg_with_legend() {
        let dir = TempDir::new("plot").unwrap();
        let file = dir.path().join("damage.svg");
        let plot = PlotData {
            file: file.to_string_lossy().to_string(),
            ..PlotData::default()
        };

        write_svg_plot(&[series("LiFFT", 10_000), series("Barrett-Callaghan", 10_000)], &plot).unwrap();

        let contents = fs::read_to_string(&file).unwrap();
        assert!(contents.contains("<svg"));
        assert!(contents.contains("LiFFT"));
        assert!(contents.contains("Barrett-Callaghan"));
        assert!(contents.contains("Repetitions"));
    }

    #[test]
    fn rejects_bad_series() {
        let plot = PlotData::default();
        assert!(write_svg_plot(&[], &plot).is_err());

        let mut bad = series("bad", 10);
        bad.y.pop();
        assert!(write_svg_plot(&[bad], &plot).is_err());
    }
}

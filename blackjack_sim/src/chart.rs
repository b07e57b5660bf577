//! Renders bankroll trajectories as an SVG line chart. Each line is coloured by its session's net
//! change on a plasma-like scale, and a box to the right lists the batch statistics.

use crate::stats::TrajectoryStats;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const DEFAULT_CHART_PATH: &str = "blackjack_random_returns.svg";

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 230.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const TICKS: usize = 5;

const PLASMA: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (13, 8, 135)),
    (0.25, (126, 3, 168)),
    (0.5, (204, 71, 120)),
    (0.75, (248, 149, 64)),
    (1.0, (240, 249, 33)),
];

/// Maps `t` in `[0, 1]` onto the colour scale, clamping values outside it.
pub fn plasma(t: f64) -> (u8, u8, u8) {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    for pair in PLASMA.windows(2) {
        let (lo, lo_rgb) = pair[0];
        let (hi, hi_rgb) = pair[1];
        if t <= hi {
            let f = (t - lo) / (hi - lo);
            let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return (
                mix(lo_rgb.0, hi_rgb.0),
                mix(lo_rgb.1, hi_rgb.1),
                mix(lo_rgb.2, hi_rgb.2),
            );
        }
    }
    PLASMA[PLASMA.len() - 1].1
}

/// Linear map from data space onto the plot area.
struct Scale {
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Scale {
    fn new<T: AsRef<[f64]>>(trajectories: &[T]) -> Scale {
        let longest = trajectories
            .iter()
            .map(|t| t.as_ref().len())
            .max()
            .unwrap_or(0);
        let (mut y_min, mut y_max) = trajectories
            .iter()
            .flat_map(|t| t.as_ref().iter().copied())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            });
        if !y_min.is_finite() || !y_max.is_finite() {
            y_min = 0.0;
            y_max = 1.0;
        }
        if y_max - y_min < f64::EPSILON {
            y_min -= 1.0;
            y_max += 1.0;
        }
        Scale {
            x_max: longest.saturating_sub(1).max(1) as f64,
            y_min,
            y_max,
        }
    }

    fn x(&self, round: f64) -> f64 {
        MARGIN_LEFT + round / self.x_max * (WIDTH - MARGIN_LEFT - MARGIN_RIGHT)
    }

    fn y(&self, money: f64) -> f64 {
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        MARGIN_TOP + (self.y_max - money) / (self.y_max - self.y_min) * plot_height
    }
}

fn hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Writes the chart for `trajectories`. Colours come from `stats` when given, otherwise every
/// line gets the bottom of the scale.
pub fn render_svg<T: AsRef<[f64]>>(
    trajectories: &[T],
    stats: Option<&TrajectoryStats>,
    mut writer: impl Write,
) -> std::io::Result<()> {
    let scale = Scale::new(trajectories);
    let plot_right = WIDTH - MARGIN_RIGHT;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;

    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = WIDTH,
        h = HEIGHT
    )?;
    writeln!(writer, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

    // grid and ticks
    for i in 0..=TICKS {
        let frac = i as f64 / TICKS as f64;
        let money = scale.y_min + frac * (scale.y_max - scale.y_min);
        let y = scale.y(money);
        writeln!(
            writer,
            r##"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{plot_right}" y2="{y:.1}" stroke="#dddddd"/>"##
        )?;
        writeln!(
            writer,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="end">{:.0}</text>"#,
            MARGIN_LEFT - 8.0,
            y + 4.0,
            money
        )?;

        let round = frac * scale.x_max;
        let x = scale.x(round);
        writeln!(
            writer,
            r##"<line x1="{x:.1}" y1="{MARGIN_TOP}" x2="{x:.1}" y2="{plot_bottom}" stroke="#dddddd"/>"##
        )?;
        writeln!(
            writer,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">{:.0}</text>"#,
            x,
            plot_bottom + 18.0,
            round
        )?;
    }
    writeln!(
        writer,
        r#"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{:.1}" height="{:.1}" fill="none" stroke="black"/>"#,
        plot_right - MARGIN_LEFT,
        plot_bottom - MARGIN_TOP
    )?;

    let (lo, hi) = match stats {
        Some(stats) => (stats.min, stats.max),
        None => (0.0, 0.0),
    };
    for trajectory in trajectories {
        let trajectory = trajectory.as_ref();
        let (first, last) = match (trajectory.first(), trajectory.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => continue,
        };
        let t = if hi > lo {
            (last - first - lo) / (hi - lo)
        } else {
            0.0
        };
        let points = trajectory
            .iter()
            .enumerate()
            .map(|(round, money)| format!("{:.1},{:.1}", scale.x(round as f64), scale.y(*money)))
            .collect::<Vec<String>>()
            .join(" ");
        writeln!(
            writer,
            r#"<polyline fill="none" stroke="{}" stroke-width="1.2" stroke-opacity="0.8" points="{}"/>"#,
            hex(plasma(t)),
            points
        )?;
    }

    writeln!(
        writer,
        r#"<text x="{:.1}" y="{:.1}" font-size="20" text-anchor="middle">Line Graphs of {} episodes</text>"#,
        (MARGIN_LEFT + plot_right) / 2.0,
        MARGIN_TOP / 2.0 + 6.0,
        trajectories.len()
    )?;
    writeln!(
        writer,
        r#"<text x="{:.1}" y="{:.1}" font-size="14" text-anchor="middle">Rounds Played</text>"#,
        (MARGIN_LEFT + plot_right) / 2.0,
        HEIGHT - 20.0
    )?;
    writeln!(
        writer,
        r#"<text x="20" y="{y:.1}" font-size="14" text-anchor="middle" transform="rotate(-90 20 {y:.1})">Money</text>"#,
        y = (MARGIN_TOP + plot_bottom) / 2.0
    )?;

    if let Some(stats) = stats {
        let x = plot_right + 20.0;
        writeln!(
            writer,
            r##"<rect x="{x}" y="{MARGIN_TOP}" width="190" height="100" fill="#f5deb3" fill-opacity="0.5" stroke="black" rx="6"/>"##
        )?;
        let lines = [
            format!("Most Loss: {:.2}", stats.min),
            format!("Most Profit: {:.2}", stats.max),
            format!("Median Profit: {:.2}", stats.median),
            format!("Std Dev: {:.2}", stats.std_dev),
        ];
        for (i, line) in lines.iter().enumerate() {
            writeln!(
                writer,
                r#"<text x="{:.1}" y="{:.1}" font-size="14">{}</text>"#,
                x + 10.0,
                MARGIN_TOP + 25.0 + 20.0 * i as f64,
                line
            )?;
        }
    }

    writeln!(writer, "</svg>")?;
    writer.flush()
}

/// Renders the chart into a new file at `path`.
pub fn save_svg<P: AsRef<Path>, T: AsRef<[f64]>>(
    path: P,
    trajectories: &[T],
    stats: Option<&TrajectoryStats>,
) -> std::io::Result<()> {
    let file = File::create(path)?;
    render_svg(trajectories, stats, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<T: AsRef<[f64]>>(trajectories: &[T]) -> String {
        let stats = TrajectoryStats::from_trajectories(trajectories);
        let mut buffer = Vec::new();
        render_svg(trajectories, stats.as_ref(), &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn scale_endpoints() {
        assert_eq!(plasma(0.0), (13, 8, 135));
        assert_eq!(plasma(0.5), (204, 71, 120));
        assert_eq!(plasma(1.0), (240, 249, 33));
        assert_eq!(plasma(-3.0), plasma(0.0));
        assert_eq!(plasma(7.0), plasma(1.0));
    }

    #[test]
    fn one_line_per_trajectory() {
        let svg = render(&[vec![150.0, 175.0], vec![150.0, 100.0, 50.0], vec![150.0]]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(svg.contains("Line Graphs of 3 episodes"));
        assert!(svg.contains("Rounds Played"));
        assert!(svg.contains(">Money<"));
        assert!(svg.contains("Most Loss: -100.00"));
        assert!(svg.contains("Most Profit: 25.00"));
        assert!(svg.contains("Median Profit: 0.00"));
    }

    #[test]
    fn extremes_get_the_ends_of_the_scale() {
        let svg = render(&[vec![150.0, 200.0], vec![150.0, 100.0]]);
        assert!(svg.contains(&hex(plasma(1.0))));
        assert!(svg.contains(&hex(plasma(0.0))));
    }

    #[test]
    fn empty_trajectory_does_not_shift_colours() {
        let trajectories = vec![vec![], vec![150.0, 200.0], vec![150.0, 100.0]];
        let svg = render(&trajectories);
        let strokes = svg
            .lines()
            .filter(|line| line.starts_with("<polyline"))
            .collect::<Vec<&str>>();
        assert_eq!(strokes.len(), 2);
        assert!(strokes[0].contains(&hex(plasma(1.0))));
        assert!(strokes[1].contains(&hex(plasma(0.0))));
    }

    #[test]
    fn equal_changes_use_the_bottom_colour() {
        let svg = render(&[vec![150.0, 150.0], vec![100.0, 100.0]]);
        assert_eq!(svg.matches(&hex(plasma(0.0))).count(), 2);
    }

    #[test]
    fn empty_batch_still_renders() {
        let empty: Vec<Vec<f64>> = vec![];
        let svg = render(&empty);
        assert_eq!(svg.matches("<polyline").count(), 0);
        assert!(!svg.contains("Most Loss"));
    }
}

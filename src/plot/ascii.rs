//! ASCII plotting for terminal output.
//!
//! Intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed infected counts: `o`
//! - fitted stage curves: `-`
//! - projected forecast: `+`
//! - stage boundaries: `|` on the bottom axis row

/// One named series of `(day, value)` points.
#[derive(Debug, Clone)]
pub struct Series<'a> {
    pub marker: char,
    pub points: &'a [(u32, f64)],
}

/// Render observed / fitted / projected infected counts on one day axis.
pub fn render_ascii_plot(
    series: &[Series<'_>],
    stage_starts: &[u32],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all: Vec<(u32, f64)> = series
        .iter()
        .flat_map(|s| s.points.iter().copied())
        .filter(|(_, v)| v.is_finite())
        .collect();
    if all.is_empty() {
        return "(nothing to plot)\n".to_string();
    }

    let d_min = all.iter().map(|p| p.0).min().unwrap_or(1);
    let d_max = all.iter().map(|p| p.0).max().unwrap_or(1).max(d_min + 1);
    let y_min = all.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = all.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw in declaration order so later series overlay earlier ones.
    for s in series {
        for &(d, v) in s.points {
            if !v.is_finite() {
                continue;
            }
            let x = map_x(d, d_min, d_max, width);
            let y = map_y(v, y_min, y_max, height);
            grid[y][x] = s.marker;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: days [{d_min}, {d_max}] | infected [{y_min:.0}, {y_max:.0}]\n"
    ));
    for row in &grid {
        let line: String = row.iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }

    // Bottom axis with stage boundary markers.
    let mut axis = vec!['-'; width];
    for &start in stage_starts {
        if start >= d_min && start <= d_max {
            axis[map_x(start, d_min, d_max, width)] = '|';
        }
    }
    let axis_line: String = axis.iter().collect();
    out.push_str(&axis_line);
    out.push('\n');

    out
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * frac;
    (min - pad, max + pad)
}

fn map_x(day: u32, d_min: u32, d_max: u32, width: usize) -> usize {
    let span = f64::from(d_max - d_min).max(1.0);
    let u = f64::from(day - d_min) / span;
    ((u * (width - 1) as f64).round() as usize).min(width - 1)
}

fn map_y(v: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let span = (y_max - y_min).max(f64::MIN_POSITIVE);
    let u = (v - y_min) / span;
    let row = ((1.0 - u) * (height - 1) as f64).round() as usize;
    row.min(height - 1)
}

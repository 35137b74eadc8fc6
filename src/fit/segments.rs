//! Day-axis segmentation.
//!
//! Stages partition a 1-based day axis into contiguous windows sharing one
//! (beta, gamma) regime. Boundaries are 0-based cut points over that axis,
//! e.g. `[0, 94, 109, 250]` splits days `1..=250` into three stages.

use crate::error::AppError;

/// Build the inclusive 1-based day axis `first..=last`.
pub fn day_axis(first: u32, last: u32) -> Vec<u32> {
    (first..=last).collect()
}

/// Validate stage boundaries against an axis length.
///
/// Boundaries must be strictly ascending, start at the axis start offset,
/// and end at the axis end; every window must therefore be non-empty.
pub fn validate_bounds(bounds: &[usize], axis_start: usize, axis_end: usize) -> Result<(), AppError> {
    if bounds.len() < 2 {
        return Err(AppError::new(
            2,
            format!("need at least two stage boundaries, got {}", bounds.len()),
        ));
    }
    if bounds[0] != axis_start {
        return Err(AppError::new(
            2,
            format!("first stage boundary must be {axis_start}, got {}", bounds[0]),
        ));
    }
    if *bounds.last().unwrap() != axis_end {
        return Err(AppError::new(
            2,
            format!(
                "last stage boundary must be {axis_end}, got {}",
                bounds.last().unwrap()
            ),
        ));
    }
    for pair in bounds.windows(2) {
        if pair[1] <= pair[0] {
            return Err(AppError::new(
                2,
                format!("stage boundaries must be strictly ascending ({} then {})", pair[0], pair[1]),
            ));
        }
    }
    Ok(())
}

/// Slice the day axis into per-stage windows from consecutive boundary pairs.
///
/// `bounds` are 0-based offsets into the full conceptual day axis starting at
/// day 1; `days` must cover exactly `bounds[0]..bounds.last()`.
pub fn windows(days: &[u32], bounds: &[usize]) -> Vec<Vec<u32>> {
    let offset = bounds[0];
    bounds
        .windows(2)
        .map(|pair| days[pair[0] - offset..pair[1] - offset].to_vec())
        .collect()
}

//! Mapping from data space into an interval of normalized device coordinates.

/// Error returned by [`try_normalize`] when the source domain is unusable.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("degenerate normalization domain: min={min}, max={max}")]
pub struct DegenerateDomain {
    pub min: f64,
    pub max: f64,
}

/// Maps `value` from `[min, max]` into `[target_start, target_start + target_size]`.
///
/// Out-of-domain values are clamped to the nearest end of the target interval,
/// so a point outside the axis range is drawn on the plot edge. The ends of the
/// domain map exactly onto the ends of the target. A NaN value maps to
/// `target_start`.
pub fn try_normalize(
    value: f64,
    min: f64,
    max: f64,
    target_start: f32,
    target_size: f32,
) -> Result<f32, DegenerateDomain> {
    if !min.is_finite() || !max.is_finite() || max == min {
        return Err(DegenerateDomain { min, max });
    }

    let span = max - min;
    let t = if span.is_finite() {
        (value - min) / span
    } else {
        // bounds near f64::MAX: halve everything so the span fits
        (value / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
    };
    if t.is_nan() || t <= 0.0 {
        return Ok(target_start);
    }
    if t >= 1.0 {
        return Ok(target_start + target_size);
    }

    let out = target_start + (t as f32) * target_size;
    // f32 rounding can step one ulp outside the interval
    let (lo, hi) = ordered(target_start, target_start + target_size);
    Ok(out.clamp(lo, hi))
}

/// Like [`try_normalize`], but logs a degenerate domain and returns `target_start`.
pub fn normalize(value: f64, min: f64, max: f64, target_start: f32, target_size: f32) -> f32 {
    match try_normalize(value, min, max, target_start, target_size) {
        Ok(v) => v,
        Err(err) => {
            tracing::error!(error = %err, "normalize called with an unusable range");
            target_start
        }
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

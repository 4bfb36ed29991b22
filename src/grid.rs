use crate::{
    Color,
    error::{PlotError, PlotResult},
    layout::NdcRect,
    line::Vertex,
    normalize::normalize,
    plot::AxisRange,
};

/// How many grid divisions a plot axis gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSpacing {
    /// `n` equal divisions spanning the box, i.e. `n + 1` lines per axis.
    Fixed(u32),
    /// Lines at "nice" data values (multiples of 1, 2 or 5 times a power of ten)
    /// picked from each axis' range, plus the box edges.
    Auto,
}

impl Default for GridSpacing {
    fn default() -> Self {
        Self::Fixed(DEFAULT_DIVISIONS)
    }
}

pub const DEFAULT_DIVISIONS: u32 = 10;
/// Upper bound for [`GridSpacing::Fixed`].
pub const MAX_DIVISIONS: u32 = 1000;
/// Interior lines an automatic grid may place before it falls back to the edges.
const MAX_AUTO_LINES: u32 = 200;

impl GridSpacing {
    pub(crate) fn validate(self) -> PlotResult<Self> {
        match self {
            Self::Fixed(n) if n == 0 || n > MAX_DIVISIONS => {
                Err(PlotError::InvalidGridSpacing(n))
            }
            other => Ok(other),
        }
    }

    /// Data values along `range` where grid lines are drawn, ascending.
    pub(crate) fn values(self, range: AxisRange) -> Vec<f64> {
        const AUTO_TARGET_DIVISIONS: f64 = 10.0;
        const AUTO_EPSILON: f64 = 1e-9;

        let (min, max) = (range.min(), range.max());
        match self {
            Self::Fixed(n) => {
                let n = n.max(1);
                let step = (max - min) / n as f64;
                (0..=n)
                    .map(|i| if i == n { max } else { min + i as f64 * step })
                    .collect()
            }
            Self::Auto => {
                let step = nice_step((max - min) / AUTO_TARGET_DIVISIONS);
                let tol = step * AUTO_EPSILON;
                let first = (min / step).ceil();
                let lines = (max / step).floor() - first;
                let mut values = vec![min];
                // Far from zero `first + k` stops being exact, so the index is an integer
                // and values that fail to advance are dropped.
                if lines >= 0.0 && lines <= f64::from(MAX_AUTO_LINES) {
                    for k in 0..=lines as u32 {
                        let v = (first + f64::from(k)) * step;
                        let last = values[values.len() - 1];
                        if v > last + tol && v < max - tol {
                            values.push(v);
                        }
                    }
                }
                values.push(max);
                values
            }
        }
    }
}

/// Vertical then horizontal segments spanning `rect`, two vertices each.
pub(crate) fn grid_vertices(
    rect: NdcRect,
    x_range: AxisRange,
    y_range: AxisRange,
    spacing: GridSpacing,
    color: Color,
) -> Vec<Vertex> {
    let xs = spacing.values(x_range);
    let ys = spacing.values(y_range);
    let mut verts = Vec::with_capacity(2 * (xs.len() + ys.len()));

    for x in xs {
        let nx = normalize(x, x_range.min(), x_range.max(), rect.left, rect.width());
        verts.push(Vertex::new(nx, rect.bottom, color));
        verts.push(Vertex::new(nx, rect.top, color));
    }
    for y in ys {
        let ny = normalize(y, y_range.min(), y_range.max(), rect.bottom, rect.height());
        verts.push(Vertex::new(rect.left, ny, color));
        verts.push(Vertex::new(rect.right, ny, color));
    }
    verts
}

/// Calculate a "nice" step size for grid lines based on the desired number of divisions.
/// Returns a value that is a multiple of 1, 2, 5, or 10 times a power of 10.
pub fn nice_step(raw: f64) -> f64 {
    const NICE_STEP_BASES: [f64; 4] = [1.0, 2.0, 5.0, 10.0];
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let exp = raw.log10().floor();
    let base = 10.0_f64.powf(exp);
    for &m in &NICE_STEP_BASES {
        if raw <= m * base {
            return m * base;
        }
    }
    base * 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;

    fn range(min: f64, max: f64) -> AxisRange {
        AxisRange::new(min, max).expect("valid range")
    }

    #[test]
    fn default_grid_has_eleven_lines_per_axis() {
        let verts = grid_vertices(
            NdcRect::inset(0.1),
            AxisRange::UNIT,
            AxisRange::UNIT,
            GridSpacing::default(),
            WHITE,
        );
        assert_eq!(verts.len(), 44);
        // first vertical line sits on the left edge, last horizontal on the top edge
        assert_eq!(verts[0].position, [-0.9, -0.9]);
        assert_eq!(verts[43].position[1], 0.9);
    }

    #[test]
    fn auto_spacing_uses_nice_values() {
        let values = GridSpacing::Auto.values(range(0.0, 6.3));
        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&6.3));
        // step 1.0 for a span of 6.3
        assert!(values.contains(&1.0) && values.contains(&6.0));
        assert_eq!(values.len(), 8);
    }

    #[test]
    fn fixed_spacing_bounds() {
        assert!(GridSpacing::Fixed(0).validate().is_err());
        assert!(GridSpacing::Fixed(3).validate().is_ok());
        assert!(GridSpacing::Fixed(MAX_DIVISIONS).validate().is_ok());
        assert!(matches!(
            GridSpacing::Fixed(u32::MAX).validate(),
            Err(PlotError::InvalidGridSpacing(u32::MAX))
        ));
    }

    #[test]
    fn auto_spacing_terminates_far_from_zero() {
        let values = GridSpacing::Auto.values(range(1e17, 1e17 + 48.0));
        assert_eq!(values.first(), Some(&1e17));
        assert_eq!(values.last(), Some(&(1e17 + 48.0)));
        assert!(values.len() <= 12);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn auto_spacing_on_tiny_span_keeps_edges() {
        let values = GridSpacing::Auto.values(range(1.0, 1.0 + 1e-12));
        assert_eq!(values.first(), Some(&1.0));
        assert_eq!(values.last(), Some(&(1.0 + 1e-12)));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn nice_steps() {
        assert!((nice_step(0.63) - 1.0).abs() < 1e-12);
        assert!((nice_step(0.15) - 0.2).abs() < 1e-12);
        assert_eq!(nice_step(3.0), 5.0);
        assert_eq!(nice_step(-1.0), 1.0);
    }
}

//! Zero lines and tick marks drawn inside a plot box.
use crate::{Color, layout::NdcRect, line::Vertex, normalize::normalize, plot::AxisRange};

/// Tick length as a fraction of the box's shorter side.
const TICK_FRACTION: f32 = 0.02;

/// The `x = 0` and `y = 0` lines, for whichever of them falls inside the ranges.
pub(crate) fn axes_vertices(
    rect: NdcRect,
    x_range: AxisRange,
    y_range: AxisRange,
    color: Color,
) -> Vec<Vertex> {
    let mut verts = Vec::with_capacity(4);
    if x_range.contains(0.0) {
        let x = normalize(0.0, x_range.min(), x_range.max(), rect.left, rect.width());
        verts.push(Vertex::new(x, rect.bottom, color));
        verts.push(Vertex::new(x, rect.top, color));
    }
    if y_range.contains(0.0) {
        let y = normalize(0.0, y_range.min(), y_range.max(), rect.bottom, rect.height());
        verts.push(Vertex::new(rect.left, y, color));
        verts.push(Vertex::new(rect.right, y, color));
    }
    verts
}

/// Short inward marks on the bottom edge at each `x_values` entry and on the
/// left edge at each `y_values` entry.
pub(crate) fn tick_vertices(
    rect: NdcRect,
    x_range: AxisRange,
    y_range: AxisRange,
    x_values: &[f64],
    y_values: &[f64],
    color: Color,
) -> Vec<Vertex> {
    let len = TICK_FRACTION * rect.width().min(rect.height());
    let mut verts = Vec::with_capacity(2 * (x_values.len() + y_values.len()));

    for &v in x_values {
        let x = normalize(v, x_range.min(), x_range.max(), rect.left, rect.width());
        verts.push(Vertex::new(x, rect.bottom, color));
        verts.push(Vertex::new(x, rect.bottom + len, color));
    }
    for &v in y_values {
        let y = normalize(v, y_range.min(), y_range.max(), rect.bottom, rect.height());
        verts.push(Vertex::new(rect.left, y, color));
        verts.push(Vertex::new(rect.left + len, y, color));
    }
    verts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BLACK;

    #[test]
    fn zero_lines_only_when_in_range() {
        let rect = NdcRect::FULL;
        let positive = AxisRange::new(1.0, 2.0).expect("range");
        let centered = AxisRange::new(-1.0, 1.0).expect("range");

        assert!(axes_vertices(rect, positive, positive, BLACK).is_empty());

        let verts = axes_vertices(rect, centered, positive, BLACK);
        assert_eq!(verts.len(), 2);
        assert_eq!(verts[0].position, [0.0, -1.0]);
        assert_eq!(verts[1].position, [0.0, 1.0]);

        assert_eq!(axes_vertices(rect, centered, centered, BLACK).len(), 4);
    }

    #[test]
    fn ticks_point_inward() {
        let rect = NdcRect::FULL;
        let verts = tick_vertices(rect, AxisRange::UNIT, AxisRange::UNIT, &[0.5], &[1.0], BLACK);
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[0].position, [0.0, -1.0]);
        assert!((verts[1].position[1] - (-1.0 + 0.04)).abs() < 1e-6);
        assert_eq!(verts[2].position, [-1.0, 1.0]);
        assert!(verts[3].position[0] > -1.0);
    }
}

use core::fmt;
use std::sync::Arc;

use crate::{
    Color,
    color::mix,
    error::{PlotError, PlotResult},
    layout::NdcRect,
    normalize::{DegenerateDomain, try_normalize},
    plot::{AxisRange, Plot},
};

/// One vertex as uploaded to the GPU: NDC position followed by RGB color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex {
    /// Byte stride of an interleaved `x, y, r, g, b` vertex.
    pub const STRIDE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color: [color.r, color.g, color.b],
        }
    }
}

/// Per-vertex color callback. Receives `x` for ordinary series and `t` for
/// parametric ones.
pub type ColorFn = Arc<dyn Fn(f64) -> Color + Send + Sync>;

/// How the vertices of a line get their color.
#[derive(Clone)]
pub enum ColorSource {
    /// Every vertex gets the same color.
    Constant(Color),
    /// Color computed from each sample's parameter.
    Function(ColorFn),
    /// Linear blend from `from` at the smallest parameter to `to` at the largest.
    Gradient { from: Color, to: Color },
}

impl ColorSource {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(f64) -> Color + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    pub fn gradient(from: Color, to: Color) -> Self {
        Self::Gradient { from, to }
    }

    fn resolve(&self, param: f64, span: (f64, f64)) -> Color {
        match self {
            Self::Constant(color) => *color,
            Self::Function(f) => f(param),
            Self::Gradient { from, to } => {
                let (lo, hi) = span;
                let t = if hi > lo { (param - lo) / (hi - lo) } else { 0.0 };
                mix(*from, *to, t as f32)
            }
        }
    }
}

impl From<Color> for ColorSource {
    fn from(color: Color) -> Self {
        Self::Constant(color)
    }
}

impl fmt::Debug for ColorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(color) => f.debug_tuple("Constant").field(color).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
            Self::Gradient { from, to } => f
                .debug_struct("Gradient")
                .field("from", from)
                .field("to", to)
                .finish(),
        }
    }
}

/// Position of a line within its plot, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub usize);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({})", self.0)
    }
}

/// A polyline whose geometry was normalized once, when it was plotted.
#[derive(Debug, Clone)]
pub struct Line {
    vertices: Arc<[Vertex]>,
}

impl Line {
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Normalizes a data series into the plot's box and colors it.
///
/// `params` carries the parametric variable of a curve; when present it is
/// what the color source sees instead of `x`. The plot itself is not touched.
pub fn build_line(
    plot: &Plot,
    xs: &[f64],
    ys: &[f64],
    params: Option<&[f64]>,
    source: &ColorSource,
) -> PlotResult<Line> {
    check_series(xs, ys, params)?;
    build_vertices(
        plot.box_rect(),
        plot.x_range(),
        plot.y_range(),
        xs,
        ys,
        params,
        source,
    )
}

fn check_series(xs: &[f64], ys: &[f64], params: Option<&[f64]>) -> PlotResult<()> {
    if xs.is_empty() {
        return Err(PlotError::EmptySeries);
    }
    if ys.len() != xs.len() {
        return Err(PlotError::LengthMismatch {
            what: "ys",
            expected: xs.len(),
            found: ys.len(),
        });
    }
    if let Some(ts) = params
        && ts.len() != xs.len()
    {
        return Err(PlotError::LengthMismatch {
            what: "ts",
            expected: xs.len(),
            found: ts.len(),
        });
    }
    Ok(())
}

fn build_vertices(
    target: NdcRect,
    x_range: AxisRange,
    y_range: AxisRange,
    xs: &[f64],
    ys: &[f64],
    params: Option<&[f64]>,
    source: &ColorSource,
) -> PlotResult<Line> {
    let param_of = |i: usize| params.map_or(xs[i], |ts| ts[i]);
    let span = match source {
        ColorSource::Gradient { .. } => param_span(params.unwrap_or(xs)),
        _ => (0.0, 0.0),
    };

    let degenerate = |axis| {
        move |e: DegenerateDomain| PlotError::InvalidRange {
            axis,
            min: e.min,
            max: e.max,
        }
    };

    let mut vertices = Vec::new();
    vertices
        .try_reserve_exact(xs.len())
        .map_err(|_| PlotError::Allocation("vertex"))?;

    for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
        let nx = try_normalize(x, x_range.min(), x_range.max(), target.left, target.width())
            .map_err(degenerate('x'))?;
        let ny = try_normalize(
            y,
            y_range.min(),
            y_range.max(),
            target.bottom,
            target.height(),
        )
        .map_err(degenerate('y'))?;
        vertices.push(Vertex::new(nx, ny, source.resolve(param_of(i), span)));
    }

    Ok(Line {
        vertices: vertices.into(),
    })
}

fn param_span(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

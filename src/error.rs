use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

/// Errors reported by figure and plot operations.
///
/// Validation errors are raised before any state is touched, so a rejected
/// call leaves the figure exactly as it was.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid figure size: width={width}, height={height}")]
    InvalidFigureSize { width: u32, height: u32 },

    #[error("invalid {axis} range: min={min}, max={max} (need finite min < max)")]
    InvalidRange { axis: char, min: f64, max: f64 },

    #[error("invalid {what} width: {width} (must be > 0)")]
    InvalidLineWidth { what: &'static str, width: f32 },

    #[error("data series is empty")]
    EmptySeries,

    #[error("data series length mismatch: {what} has {found} samples, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid subplot grid: rows={rows}, cols={cols}")]
    InvalidGrid { rows: usize, cols: usize },

    #[error("subplot margin {margin} leaves no room for a {rows}x{cols} grid")]
    InvalidMargin {
        margin: f32,
        rows: usize,
        cols: usize,
    },

    #[error("invalid grid spacing: {0} divisions")]
    InvalidGridSpacing(u32),

    #[error("subplot index {index} out of range for {len} subplots")]
    SubplotIndexOutOfRange { index: usize, len: usize },

    #[error("figure has no subplot grid")]
    NoSubplotGrid,

    #[error("plot already has geometry; its layout can no longer change")]
    LayoutLocked,

    #[error("failed to grow {0} collection")]
    Allocation(&'static str),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("window error: {0}")]
    Window(#[from] iced::Error),
}

/// Logs a rejected operation and hands the error back to the caller.
pub(crate) fn reject<T>(operation: &'static str, err: PlotError) -> PlotResult<T> {
    tracing::error!(operation, error = %err, "operation rejected");
    Err(err)
}

//! Line charts and subplot figures drawn straight through a wgpu pipeline.
//!
//! - Series are normalized into each plot's box once, when they are plotted
//! - Every line, box and grid owns its own GPU buffer, released exactly once
//! - Subplot grids with per-cell viewports
//!
//! Quick start:
//!
//! ```no_run
//! use iced_figure::{Figure, color};
//!
//! let mut figure = Figure::new(800, 600)?;
//! let id = figure.add_plot()?;
//! let plot = figure.plot_mut(id).expect("just added");
//! plot.set_x_range(0.0, std::f64::consts::TAU)?;
//! plot.set_y_range(-1.0, 1.0)?;
//!
//! let xs: Vec<f64> = (0..200).map(|i| i as f64 * std::f64::consts::TAU / 199.0).collect();
//! let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
//! plot.plot(&xs, &ys, color::RED)?;
//!
//! figure.show()?;
//! # Ok::<(), iced_figure::PlotError>(())
//! ```
//!
//! See `demos/` for more.
pub mod color;
pub mod error;
pub mod figure;
pub mod figure_builder;
pub mod grid;
pub mod layout;
pub mod line;
pub mod normalize;
pub mod plot;
pub mod render;
pub mod telemetry;

pub(crate) mod axes;
pub(crate) mod window;

// Iced re-exports.
pub use iced::Color;

// Re-exports of public types.
pub use color::Hsv;
pub use error::{PlotError, PlotResult};
pub use figure::{Figure, FigureId};
pub use figure_builder::FigureBuilder;
pub use grid::GridSpacing;
pub use layout::{NdcRect, PixelViewport, ScreenRect, SubplotLayout, layout_grid};
pub use line::{ColorFn, ColorSource, Line, LineId, Vertex, build_line};
pub use normalize::{normalize, try_normalize};
pub use plot::{AxisRange, Plot, PlotId};

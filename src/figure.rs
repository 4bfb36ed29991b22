use core::fmt;
use std::{
    path::Path,
    sync::atomic::{AtomicU64, Ordering},
};

use indexmap::IndexMap;

use crate::{
    Color,
    error::{PlotError, PlotResult, reject},
    figure_builder::FigureBuilder,
    layout::{SubplotLayout, layout_grid},
    plot::{INITIAL_CAPACITY, Plot, PlotId},
};

/// Unique identifier for a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FigureId(u64);

impl FigureId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Figure({})", self.0)
    }
}

/// The most recent subplot grid added to a figure.
#[derive(Debug, Clone)]
struct SubplotGrid {
    rows: usize,
    cols: usize,
    plots: Vec<PlotId>,
}

/// A window's worth of plots.
///
/// Plots are only ever appended. A figure ends either by being shown, which
/// consumes it, or by [`Figure::free`]; both take `self`, so only one of them
/// can run.
#[derive(Debug)]
pub struct Figure {
    id: FigureId,
    width: u32,
    height: u32,
    title: String,
    background_color: Color,
    subplot_margin: f32,
    plots: IndexMap<PlotId, Plot>,
    last_grid: Option<SubplotGrid>,
}

impl Figure {
    /// Create a figure of `width x height` pixels with default settings.
    pub fn new(width: u32, height: u32) -> PlotResult<Self> {
        FigureBuilder::new().with_size(width, height).build()
    }

    pub fn builder() -> FigureBuilder {
        FigureBuilder::new()
    }

    pub(crate) fn from_parts(
        width: u32,
        height: u32,
        title: String,
        background_color: Color,
        subplot_margin: f32,
    ) -> Self {
        let id = FigureId::next();
        tracing::debug!(figure = %id, width, height, "figure created");
        Self {
            id,
            width,
            height,
            title,
            background_color,
            subplot_margin,
            plots: IndexMap::new(),
            last_grid: None,
        }
    }

    pub fn id(&self) -> FigureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Plots in insertion order.
    pub fn plots(&self) -> impl Iterator<Item = &Plot> {
        self.plots.values()
    }

    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.get(&id)
    }

    pub fn plot_mut(&mut self, id: PlotId) -> Option<&mut Plot> {
        self.plots.get_mut(&id)
    }

    /// Adds a standalone plot covering the whole window.
    pub fn add_plot(&mut self) -> PlotResult<PlotId> {
        self.reserve_plots(1)?;
        let plot = Plot::new(self.id, None);
        let id = plot.id();
        self.plots.insert(id, plot);
        tracing::debug!(figure = %self.id, plot = %id, "plot added");
        Ok(id)
    }

    /// Adds a `rows x cols` grid of subplots using the figure's subplot margin.
    pub fn add_subplots(&mut self, rows: usize, cols: usize) -> PlotResult<Vec<PlotId>> {
        self.add_subplots_with_margin(rows, cols, self.subplot_margin)
    }

    /// Adds a `rows x cols` grid of subplots, row-major, and returns their ids.
    ///
    /// Nothing is added if the grid or margin is invalid.
    pub fn add_subplots_with_margin(
        &mut self,
        rows: usize,
        cols: usize,
        margin: f32,
    ) -> PlotResult<Vec<PlotId>> {
        let cells = layout_grid(rows, cols, margin)?;
        self.reserve_plots(cells.len())?;

        let mut ids = Vec::new();
        if ids.try_reserve_exact(cells.len()).is_err() {
            return reject("add_subplots", PlotError::Allocation("subplot id"));
        }
        for (index, cell) in cells.into_iter().enumerate() {
            let layout = SubplotLayout::from_cell(rows, cols, index, margin, cell);
            let plot = Plot::new(self.id, Some(layout));
            ids.push(plot.id());
            self.plots.insert(plot.id(), plot);
        }

        tracing::debug!(figure = %self.id, rows, cols, margin, "subplots added");
        self.last_grid = Some(SubplotGrid {
            rows,
            cols,
            plots: ids.clone(),
        });
        Ok(ids)
    }

    /// The `index`-th plot of the figure, in insertion order.
    pub fn subplot(&self, index: usize) -> PlotResult<&Plot> {
        match self.plots.get_index(index) {
            Some((_, plot)) => Ok(plot),
            None => reject("subplot", self.out_of_range(index)),
        }
    }

    pub fn subplot_mut(&mut self, index: usize) -> PlotResult<&mut Plot> {
        let err = self.out_of_range(index);
        match self.plots.get_index_mut(index) {
            Some((_, plot)) => Ok(plot),
            None => reject("subplot_mut", err),
        }
    }

    /// The plot at `(row, col)` of the most recently added subplot grid.
    pub fn subplot_at(&mut self, row: usize, col: usize) -> PlotResult<&mut Plot> {
        let Some(grid) = &self.last_grid else {
            return reject("subplot_at", PlotError::NoSubplotGrid);
        };
        if row >= grid.rows || col >= grid.cols {
            let err = PlotError::SubplotIndexOutOfRange {
                index: row.saturating_mul(grid.cols).saturating_add(col),
                len: grid.plots.len(),
            };
            return reject("subplot_at", err);
        }
        let index = row * grid.cols + col;
        let len = grid.plots.len();
        let id = grid.plots[index];
        match self.plots.get_mut(&id) {
            Some(plot) => Ok(plot),
            None => reject("subplot_at", PlotError::SubplotIndexOutOfRange { index, len }),
        }
    }

    /// Builds any missing geometry for every plot.
    pub fn prepare_geometry(&mut self) {
        for plot in self.plots.values_mut() {
            plot.prepare_geometry();
        }
    }

    /// Opens the window and blocks until it is closed with Escape or by the OS.
    ///
    /// The figure is consumed; its plots and GPU resources are released when
    /// the window goes away.
    pub fn show(self) -> PlotResult<()> {
        crate::window::run(self)
    }

    /// Saving figures to disk is not supported yet.
    pub fn save(&self, path: impl AsRef<Path>) -> PlotResult<()> {
        tracing::warn!(figure = %self.id, path = %path.as_ref().display(), "save is not implemented");
        Err(PlotError::NotImplemented("save"))
    }

    /// Releases the figure without showing it.
    pub fn free(self) {
        tracing::debug!(figure = %self.id, plots = self.plots.len(), "figure freed");
    }

    fn reserve_plots(&mut self, additional: usize) -> PlotResult<()> {
        let reserved = if self.plots.capacity() == 0 {
            self.plots
                .try_reserve_exact(additional.max(INITIAL_CAPACITY))
        } else {
            self.plots.try_reserve(additional)
        };
        match reserved {
            Ok(()) => Ok(()),
            Err(_) => reject("add_plot", PlotError::Allocation("plot")),
        }
    }

    fn out_of_range(&self, index: usize) -> PlotError {
        PlotError::SubplotIndexOutOfRange {
            index,
            len: self.plots.len(),
        }
    }
}

impl Drop for Figure {
    fn drop(&mut self) {
        // IndexMap drops plots front to back, each plot releasing its lines first.
        tracing::trace!(figure = %self.id, "figure released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plots_keep_insertion_order() {
        let mut fig = Figure::new(800, 600).expect("figure");
        let a = fig.add_plot().expect("plot a");
        let grid = fig.add_subplots(1, 2).expect("grid");
        let ids: Vec<_> = fig.plots().map(Plot::id).collect();
        assert_eq!(ids, vec![a, grid[0], grid[1]]);
        assert_eq!(fig.subplot(0).expect("first").id(), a);
        assert!(fig.plots().all(|p| p.figure() == fig.id()));
    }

    #[test]
    fn subplot_at_uses_latest_grid() {
        let mut fig = Figure::new(800, 600).expect("figure");
        assert!(matches!(fig.subplot_at(0, 0), Err(PlotError::NoSubplotGrid)));
        let ids = fig.add_subplots(2, 3).expect("grid");
        assert_eq!(fig.subplot_at(1, 2).expect("cell").id(), ids[5]);
        assert!(fig.subplot_at(2, 0).is_err());
        assert!(fig.subplot_at(0, 3).is_err());
    }

    #[test]
    fn save_is_not_implemented() {
        let fig = Figure::new(100, 100).expect("figure");
        assert!(matches!(
            fig.save("out.png"),
            Err(PlotError::NotImplemented("save"))
        ));
        fig.free();
    }
}

use core::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    Color,
    axes::{axes_vertices, tick_vertices},
    color::{BLACK, lighten},
    error::{PlotError, PlotResult, reject},
    figure::FigureId,
    grid::{GridSpacing, grid_vertices},
    layout::{NdcRect, SubplotLayout},
    line::{ColorSource, Line, LineId, Vertex, build_line},
};

/// Inset of a standalone plot's box from the edge of the NDC square.
pub const DEFAULT_MARGIN: f32 = 0.1;
/// Longest title or axis label kept, in characters.
pub const MAX_LABEL_CHARS: usize = 63;
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;
pub const DEFAULT_GRID_LINE_WIDTH: f32 = 1.0;
pub const DEFAULT_BOX_LINE_WIDTH: f32 = 2.0;

/// Slots reserved by the first allocation of a plot or line collection.
pub(crate) const INITIAL_CAPACITY: usize = 4;

const GRID_TINT: f32 = 0.7;
const AXES_TINT: f32 = 0.5;

/// Unique identifier for a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlotId(u64);

impl PlotId {
    fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plot({})", self.0)
    }
}

/// A finite data interval with `min < max` and a finite span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    min: f64,
    max: f64,
}

impl AxisRange {
    pub const UNIT: Self = Self { min: 0.0, max: 1.0 };

    /// `None` unless both bounds are finite, `min < max` and the span itself
    /// fits in an `f64`.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        (min.is_finite() && max.is_finite() && min < max && (max - min).is_finite())
            .then_some(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Built geometry for one plot decoration (frame, grid, axes or ticks).
///
/// Each build gets a fresh revision so the renderer can tell a rebuilt
/// decoration from the one it already uploaded.
#[derive(Debug, Clone)]
pub struct Decoration {
    vertices: Arc<[Vertex]>,
    revision: u64,
}

impl Decoration {
    fn new(vertices: Vec<Vertex>) -> Self {
        static NEXT_REVISION: AtomicU64 = AtomicU64::new(0);
        Self {
            vertices: vertices.into(),
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }
}

/// One chart panel: a box, optional grid, axes and ticks, and the lines
/// plotted into it.
#[derive(Debug)]
pub struct Plot {
    id: PlotId,
    figure: FigureId,
    x_range: AxisRange,
    y_range: AxisRange,
    show_grid: bool,
    show_axes: bool,
    show_ticks: bool,
    title: Option<String>,
    x_label: Option<String>,
    y_label: Option<String>,
    line_width: f32,
    grid_line_width: f32,
    box_line_width: f32,
    background_color: Color,
    grid_spacing: GridSpacing,
    lines: Vec<Line>,
    frame: Option<Decoration>,
    grid: Option<Decoration>,
    axes: Option<Decoration>,
    ticks: Option<Decoration>,
    subplot: Option<SubplotLayout>,
}

impl Plot {
    pub(crate) fn new(figure: FigureId, subplot: Option<SubplotLayout>) -> Self {
        Self {
            id: PlotId::new(),
            figure,
            x_range: AxisRange::UNIT,
            y_range: AxisRange::UNIT,
            show_grid: true,
            show_axes: true,
            show_ticks: true,
            title: None,
            x_label: None,
            y_label: None,
            line_width: DEFAULT_LINE_WIDTH,
            grid_line_width: DEFAULT_GRID_LINE_WIDTH,
            box_line_width: DEFAULT_BOX_LINE_WIDTH,
            background_color: BLACK,
            grid_spacing: GridSpacing::default(),
            lines: Vec::new(),
            frame: None,
            grid: None,
            axes: None,
            ticks: None,
            subplot,
        }
    }

    pub fn id(&self) -> PlotId {
        self.id
    }

    /// The figure this plot belongs to.
    pub fn figure(&self) -> FigureId {
        self.figure
    }

    pub fn x_range(&self) -> AxisRange {
        self.x_range
    }

    pub fn y_range(&self) -> AxisRange {
        self.y_range
    }

    /// Sets the data interval mapped onto the box horizontally.
    ///
    /// Lines already plotted keep the geometry they were built with.
    pub fn set_x_range(&mut self, min: f64, max: f64) -> PlotResult<()> {
        self.x_range = checked_range('x', min, max)?;
        Ok(())
    }

    /// Sets the data interval mapped onto the box vertically.
    pub fn set_y_range(&mut self, min: f64, max: f64) -> PlotResult<()> {
        self.y_range = checked_range('y', min, max)?;
        Ok(())
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn x_label(&self) -> Option<&str> {
        self.x_label.as_deref()
    }

    pub fn y_label(&self) -> Option<&str> {
        self.y_label.as_deref()
    }

    /// Sets the title, truncated to [`MAX_LABEL_CHARS`]. `None` leaves it as is.
    pub fn set_title<'a>(&mut self, text: impl Into<Option<&'a str>>) {
        if let Some(text) = text.into() {
            self.title = Some(bounded_label(text));
        }
    }

    pub fn set_x_label<'a>(&mut self, text: impl Into<Option<&'a str>>) {
        if let Some(text) = text.into() {
            self.x_label = Some(bounded_label(text));
        }
    }

    pub fn set_y_label<'a>(&mut self, text: impl Into<Option<&'a str>>) {
        if let Some(text) = text.into() {
            self.y_label = Some(bounded_label(text));
        }
    }

    pub fn grid_enabled(&self) -> bool {
        self.show_grid
    }

    pub fn axes_enabled(&self) -> bool {
        self.show_axes
    }

    pub fn ticks_enabled(&self) -> bool {
        self.show_ticks
    }

    /// Turning the grid off keeps its geometry around; only the draw is skipped.
    pub fn show_grid(&mut self, enabled: bool) {
        self.show_grid = enabled;
    }

    pub fn show_axes(&mut self, enabled: bool) {
        self.show_axes = enabled;
    }

    pub fn show_ticks(&mut self, enabled: bool) {
        self.show_ticks = enabled;
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn grid_line_width(&self) -> f32 {
        self.grid_line_width
    }

    pub fn box_line_width(&self) -> f32 {
        self.box_line_width
    }

    /// Width for data lines, in pixels.
    ///
    /// Widths travel with each draw, but the wgpu renderer only rasterizes
    /// hairlines, so anything above 1 currently draws 1 pixel wide. The same
    /// holds for [`Plot::set_grid_line_width`] and [`Plot::set_box_line_width`].
    pub fn set_line_width(&mut self, width: f32) -> PlotResult<()> {
        self.line_width = checked_width("line", width)?;
        Ok(())
    }

    /// Width for grid lines and axes. Drawn as a hairline; see [`Plot::set_line_width`].
    pub fn set_grid_line_width(&mut self, width: f32) -> PlotResult<()> {
        self.grid_line_width = checked_width("grid line", width)?;
        Ok(())
    }

    /// Width for the box outline and ticks. Drawn as a hairline; see [`Plot::set_line_width`].
    pub fn set_box_line_width(&mut self, width: f32) -> PlotResult<()> {
        self.box_line_width = checked_width("box line", width)?;
        Ok(())
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    /// Sets the ink of the box. Grid, axes and ticks are tinted from it the
    /// next time they are built; see [`Plot::rebuild_grid`].
    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    pub fn grid_spacing(&self) -> GridSpacing {
        self.grid_spacing
    }

    /// Takes effect the next time the grid is built.
    pub fn set_grid_spacing(&mut self, spacing: GridSpacing) -> PlotResult<()> {
        match spacing.validate() {
            Ok(spacing) => {
                self.grid_spacing = spacing;
                Ok(())
            }
            Err(err) => reject("set_grid_spacing", err),
        }
    }

    pub fn subplot_layout(&self) -> Option<&SubplotLayout> {
        self.subplot.as_ref()
    }

    /// Moves this plot into cell `index` of a `rows x cols` grid.
    ///
    /// Only allowed before the box has been built, since lines are normalized
    /// against it.
    pub fn set_subplot_layout(
        &mut self,
        rows: usize,
        cols: usize,
        index: usize,
        margin: f32,
    ) -> PlotResult<()> {
        if self.frame.is_some() || !self.lines.is_empty() {
            return reject("set_subplot_layout", PlotError::LayoutLocked);
        }
        self.subplot = Some(SubplotLayout::new(rows, cols, index, margin)?);
        Ok(())
    }

    /// The box rectangle in NDC: the subplot cell, or the inset square.
    pub fn box_rect(&self) -> NdcRect {
        self.subplot
            .map_or_else(|| NdcRect::inset(DEFAULT_MARGIN), |layout| layout.ndc)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.0)
    }

    pub fn frame(&self) -> Option<&Decoration> {
        self.frame.as_ref()
    }

    pub fn grid(&self) -> Option<&Decoration> {
        self.grid.as_ref()
    }

    pub fn axes(&self) -> Option<&Decoration> {
        self.axes.as_ref()
    }

    pub fn ticks(&self) -> Option<&Decoration> {
        self.ticks.as_ref()
    }

    /// Plots `ys` against `xs`, appending a new line.
    ///
    /// The series is normalized against the ranges set right now. Plotting
    /// the same data twice gives two lines.
    pub fn plot(
        &mut self,
        xs: &[f64],
        ys: &[f64],
        color: impl Into<ColorSource>,
    ) -> PlotResult<LineId> {
        self.append_line(xs, ys, None, &color.into())
    }

    /// Plots the curve `(xs[i], ys[i])` sampled at parameters `ts[i]`.
    ///
    /// Color functions and gradients see `t` rather than `x`.
    pub fn plot_parametric(
        &mut self,
        ts: &[f64],
        xs: &[f64],
        ys: &[f64],
        color: impl Into<ColorSource>,
    ) -> PlotResult<LineId> {
        self.append_line(xs, ys, Some(ts), &color.into())
    }

    fn append_line(
        &mut self,
        xs: &[f64],
        ys: &[f64],
        params: Option<&[f64]>,
        source: &ColorSource,
    ) -> PlotResult<LineId> {
        let line = match build_line(self, xs, ys, params, source) {
            Ok(line) => line,
            Err(err) => return reject("plot", err),
        };

        let reserved = if self.lines.capacity() == 0 {
            self.lines.try_reserve_exact(INITIAL_CAPACITY)
        } else {
            self.lines.try_reserve(1)
        };
        if reserved.is_err() {
            return reject("plot", PlotError::Allocation("line"));
        }

        self.ensure_frame();
        let id = LineId(self.lines.len());
        self.lines.push(line);
        tracing::debug!(plot = %self.id, line = %id, vertices = xs.len(), "line added");
        Ok(id)
    }

    fn ensure_frame(&mut self) {
        if self.frame.is_none() {
            let color = self.background_color;
            let verts = self
                .box_rect()
                .corners()
                .map(|[x, y]| Vertex::new(x, y, color));
            self.frame = Some(Decoration::new(verts.to_vec()));
        }
    }

    /// Builds whatever enabled geometry does not exist yet.
    ///
    /// Called for every plot before its figure is shown. Existing geometry is
    /// never replaced here.
    pub fn prepare_geometry(&mut self) {
        self.ensure_frame();
        if self.show_grid && self.grid.is_none() {
            self.grid = Some(self.build_grid());
        }
        if self.show_ticks && self.ticks.is_none() {
            self.ticks = Some(self.build_ticks());
        }
        if self.show_axes && self.axes.is_none() {
            self.axes = Some(self.build_axes());
        }
    }

    /// Discards and rebuilds the grid and the tick marks that follow it,
    /// picking up the current ranges, spacing and background tint.
    ///
    /// Hidden decorations are only dropped; they are built again when shown.
    pub fn rebuild_grid(&mut self) {
        self.grid = self.show_grid.then(|| self.build_grid());
        self.ticks = self.show_ticks.then(|| self.build_ticks());
        tracing::debug!(plot = %self.id, "grid rebuilt");
    }

    fn build_grid(&self) -> Decoration {
        Decoration::new(grid_vertices(
            self.box_rect(),
            self.x_range,
            self.y_range,
            self.grid_spacing,
            lighten(self.background_color, GRID_TINT),
        ))
    }

    fn build_ticks(&self) -> Decoration {
        Decoration::new(tick_vertices(
            self.box_rect(),
            self.x_range,
            self.y_range,
            &self.grid_spacing.values(self.x_range),
            &self.grid_spacing.values(self.y_range),
            self.background_color,
        ))
    }

    fn build_axes(&self) -> Decoration {
        Decoration::new(axes_vertices(
            self.box_rect(),
            self.x_range,
            self.y_range,
            lighten(self.background_color, AXES_TINT),
        ))
    }
}

impl Drop for Plot {
    fn drop(&mut self) {
        tracing::trace!(plot = %self.id, lines = self.lines.len(), "plot released");
    }
}

fn checked_range(axis: char, min: f64, max: f64) -> PlotResult<AxisRange> {
    match AxisRange::new(min, max) {
        Some(range) => Ok(range),
        None => reject("set_range", PlotError::InvalidRange { axis, min, max }),
    }
}

fn checked_width(what: &'static str, width: f32) -> PlotResult<f32> {
    if width > 0.0 && width.is_finite() {
        Ok(width)
    } else {
        reject("set_width", PlotError::InvalidLineWidth { what, width })
    }
}

fn bounded_label(text: &str) -> String {
    text.chars().take(MAX_LABEL_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RED;

    fn plot() -> Plot {
        Plot::new(FigureId::next(), None)
    }

    #[test]
    fn defaults() {
        let p = plot();
        assert_eq!(p.x_range(), AxisRange::UNIT);
        assert_eq!(p.y_range(), AxisRange::UNIT);
        assert!(p.grid_enabled() && p.axes_enabled() && p.ticks_enabled());
        assert_eq!(p.line_width(), 2.0);
        assert_eq!(p.grid_line_width(), 1.0);
        assert_eq!(p.box_line_width(), 2.0);
        assert_eq!(p.background_color(), BLACK);
        assert!(p.frame().is_none() && p.grid().is_none());
    }

    #[test]
    fn labels_are_truncated() {
        let mut p = plot();
        let long = "x".repeat(100);
        p.set_title(long.as_str());
        assert_eq!(p.title().map(str::len), Some(MAX_LABEL_CHARS));

        let none: Option<&str> = None;
        p.set_title(none);
        assert_eq!(p.title().map(str::len), Some(MAX_LABEL_CHARS));

        p.set_x_label("é".repeat(70).as_str());
        assert_eq!(p.x_label().map(|l| l.chars().count()), Some(MAX_LABEL_CHARS));
    }

    #[test]
    fn first_plot_builds_frame_only() {
        let mut p = plot();
        p.plot(&[0.0, 1.0], &[0.0, 1.0], RED).expect("plot");
        let frame = p.frame().expect("frame built");
        assert_eq!(frame.vertex_count(), 4);
        assert_eq!(frame.vertices()[0].position, [-0.9, -0.9]);
        assert_eq!(frame.vertices()[2].position, [0.9, 0.9]);
        assert!(p.grid().is_none());
        assert!(p.lines.capacity() >= INITIAL_CAPACITY);
    }

    #[test]
    fn prepare_respects_flags() {
        let mut p = plot();
        p.show_grid(false);
        p.prepare_geometry();
        assert!(p.grid().is_none());
        assert!(p.ticks().is_some() && p.axes().is_some());

        p.show_grid(true);
        p.prepare_geometry();
        let grid = p.grid().expect("grid built once shown");
        assert_eq!(grid.vertex_count(), 44);
        assert!((grid.vertices()[0].color[0] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn showing_axes_leaves_grid_alone() {
        let mut p = plot();
        p.prepare_geometry();
        let before = p.grid().map(Decoration::revision);
        p.show_axes(false);
        p.show_axes(true);
        p.prepare_geometry();
        assert_eq!(p.grid().map(Decoration::revision), before);

        p.rebuild_grid();
        assert_ne!(p.grid().map(Decoration::revision), before);
    }

    #[test]
    fn layout_locked_after_plotting() {
        let mut p = plot();
        p.set_subplot_layout(2, 2, 3, 0.1).expect("fresh plot accepts layout");
        assert_eq!(p.box_rect(), p.subplot_layout().expect("layout").ndc);
        p.plot(&[0.0], &[0.0], RED).expect("plot");
        assert!(matches!(
            p.set_subplot_layout(1, 1, 0, 0.1),
            Err(PlotError::LayoutLocked)
        ));
    }

    #[test]
    fn invalid_spacing_rejected() {
        let mut p = plot();
        assert!(p.set_grid_spacing(GridSpacing::Fixed(0)).is_err());
        assert_eq!(p.grid_spacing(), GridSpacing::default());
        p.set_grid_spacing(GridSpacing::Auto).expect("auto spacing");
        assert_eq!(p.grid_spacing(), GridSpacing::Auto);
    }
}

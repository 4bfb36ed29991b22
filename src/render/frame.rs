use glam::Mat4;

use crate::{
    Color,
    figure::Figure,
    layout::{NdcRect, PixelViewport},
    plot::{Plot, PlotId},
    render::{GpuPlot, GpuScene, MeshKey, Topology},
};

/// One draw of a loaded mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshKey,
    pub topology: Topology,
    /// Vertices in the plot's geometry, before any backend-specific closing.
    pub vertex_count: u32,
    /// Requested width in pixels. The wgpu backend draws hairlines and ignores it.
    pub line_width: f32,
}

/// Everything drawn for one plot, inside its own viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPass {
    pub plot: PlotId,
    pub viewport: PixelViewport,
    pub projection: Mat4,
    pub draws: Vec<DrawCall>,
}

/// Backend-independent description of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub clear_color: Color,
    pub framebuffer: (u32, u32),
    pub passes: Vec<PlotPass>,
}

impl Default for FramePlan {
    fn default() -> Self {
        Self {
            clear_color: Color::WHITE,
            framebuffer: (0, 0),
            passes: Vec::new(),
        }
    }
}

impl FramePlan {
    /// Plans a frame for `figure` at the current framebuffer size.
    ///
    /// Only meshes the scene has loaded are drawn. Subplots get the pixel
    /// viewport of their cell and a projection that maps the cell onto it;
    /// standalone plots use the whole framebuffer.
    pub fn build<M>(figure: &Figure, scene: &GpuScene<M>, framebuffer: (u32, u32)) -> Self {
        let (fb_width, fb_height) = framebuffer;
        let passes = figure
            .plots()
            .filter_map(|plot| {
                let gpu = scene.plot(plot.id())?;
                let (viewport, rect) = match plot.subplot_layout() {
                    Some(layout) => (layout.screen.to_pixels(fb_width, fb_height), layout.ndc),
                    None => (PixelViewport::full(fb_width, fb_height), NdcRect::FULL),
                };
                let projection = projection(rect, viewport);
                Some(PlotPass {
                    plot: plot.id(),
                    viewport,
                    projection,
                    draws: plot_draws(plot, gpu),
                })
            })
            .collect();

        Self {
            clear_color: figure.background_color(),
            framebuffer,
            passes,
        }
    }

    pub fn draw_count(&self) -> usize {
        self.passes.iter().map(|p| p.draws.len()).sum()
    }
}

/// Orthographic projection mapping `rect` onto clip space, padded by half a
/// pixel of `viewport` on every side.
///
/// Geometry on the edge of `rect` (a subplot box drawn on its cell border)
/// lands on pixel centers instead of the clip boundary.
pub fn projection(rect: NdcRect, viewport: PixelViewport) -> Mat4 {
    let half_pixel = |extent: f32, pixels: f32| {
        if pixels >= 1.0 { 0.5 * extent / pixels } else { 0.0 }
    };
    let pad_x = half_pixel(rect.width(), viewport.width);
    let pad_y = half_pixel(rect.height(), viewport.height);
    Mat4::orthographic_rh(
        rect.left - pad_x,
        rect.right + pad_x,
        rect.bottom - pad_y,
        rect.top + pad_y,
        -1.0,
        1.0,
    )
}

fn plot_draws<M>(plot: &Plot, gpu: &GpuPlot<M>) -> Vec<DrawCall> {
    let mut draws = Vec::with_capacity(4 + plot.lines().len());
    let mut push = |key: MeshKey, count: usize, width: f32| {
        if gpu.is_loaded(key) {
            draws.push(DrawCall {
                mesh: key,
                topology: key.topology(),
                vertex_count: count as u32,
                line_width: width,
            });
        }
    };

    if let Some(frame) = plot.frame() {
        push(MeshKey::Frame, frame.vertex_count(), plot.box_line_width());
    }
    if plot.grid_enabled()
        && let Some(grid) = plot.grid()
    {
        push(MeshKey::Grid, grid.vertex_count(), plot.grid_line_width());
    }
    if plot.axes_enabled()
        && let Some(axes) = plot.axes()
    {
        push(MeshKey::Axes, axes.vertex_count(), plot.grid_line_width());
    }
    if plot.ticks_enabled()
        && let Some(ticks) = plot.ticks()
    {
        push(MeshKey::Ticks, ticks.vertex_count(), plot.box_line_width());
    }
    for (i, line) in plot.lines().iter().enumerate() {
        push(MeshKey::Line(i), line.vertex_count(), plot.line_width());
    }
    draws
}

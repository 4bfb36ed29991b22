use indexmap::IndexMap;

use crate::{
    figure::Figure,
    plot::{Decoration, Plot, PlotId},
    render::{Backend, MeshKey},
};

/// GPU state of one piece of plot geometry.
#[derive(Debug)]
pub enum MeshSlot<M> {
    Loaded(M),
    /// Upload failed; not retried.
    Failed,
    /// Nothing to draw.
    Empty,
}

impl<M> MeshSlot<M> {
    pub fn mesh(&self) -> Option<&M> {
        match self {
            Self::Loaded(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

#[derive(Debug)]
struct DecorationSlot<M> {
    revision: u64,
    slot: MeshSlot<M>,
}

/// Meshes of one plot.
///
/// Fields drop in declaration order: lines first, the frame last.
#[derive(Debug)]
pub struct GpuPlot<M> {
    lines: Vec<MeshSlot<M>>,
    ticks: Option<DecorationSlot<M>>,
    axes: Option<DecorationSlot<M>>,
    grid: Option<DecorationSlot<M>>,
    frame: Option<DecorationSlot<M>>,
}

impl<M> Default for GpuPlot<M> {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            ticks: None,
            axes: None,
            grid: None,
            frame: None,
        }
    }
}

impl<M> GpuPlot<M> {
    pub fn slot(&self, key: MeshKey) -> Option<&MeshSlot<M>> {
        let decoration = match key {
            MeshKey::Line(i) => return self.lines.get(i),
            MeshKey::Frame => &self.frame,
            MeshKey::Grid => &self.grid,
            MeshKey::Axes => &self.axes,
            MeshKey::Ticks => &self.ticks,
        };
        decoration.as_ref().map(|d| &d.slot)
    }

    pub fn mesh(&self, key: MeshKey) -> Option<&M> {
        self.slot(key).and_then(MeshSlot::mesh)
    }

    pub fn is_loaded(&self, key: MeshKey) -> bool {
        self.slot(key).is_some_and(MeshSlot::is_loaded)
    }

    /// Number of lines the scene has seen, loaded or not.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn decoration_mut(&mut self, key: MeshKey) -> Option<&mut Option<DecorationSlot<M>>> {
        match key {
            MeshKey::Frame => Some(&mut self.frame),
            MeshKey::Grid => Some(&mut self.grid),
            MeshKey::Axes => Some(&mut self.axes),
            MeshKey::Ticks => Some(&mut self.ticks),
            MeshKey::Line(_) => None,
        }
    }
}

/// Renderer-side mirror of a figure's geometry.
///
/// Each piece is uploaded the first time the scene sees it, so a mesh has
/// exactly one owner from creation until the scene drops it.
#[derive(Debug)]
pub struct GpuScene<M> {
    plots: IndexMap<PlotId, GpuPlot<M>>,
}

impl<M> Default for GpuScene<M> {
    fn default() -> Self {
        Self {
            plots: IndexMap::new(),
        }
    }
}

impl<M> GpuScene<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plot(&self, id: PlotId) -> Option<&GpuPlot<M>> {
        self.plots.get(&id)
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Uploads any geometry of `figure` that has no mesh yet.
    ///
    /// Rebuilt decorations replace their old mesh, which is released on the
    /// spot. Upload failures are logged and leave the rest of the scene intact.
    pub fn sync<B>(&mut self, backend: &mut B, figure: &Figure)
    where
        B: Backend<Mesh = M>,
    {
        for plot in figure.plots() {
            let gpu = self.plots.entry(plot.id()).or_default();
            sync_plot(backend, plot, gpu);
        }
    }
}

fn sync_plot<B: Backend>(backend: &mut B, plot: &Plot, gpu: &mut GpuPlot<B::Mesh>) {
    let decorations = [
        (MeshKey::Frame, plot.frame()),
        (MeshKey::Grid, plot.grid()),
        (MeshKey::Axes, plot.axes()),
        (MeshKey::Ticks, plot.ticks()),
    ];
    for (key, decoration) in decorations {
        if let (Some(decoration), Some(current)) = (decoration, gpu.decoration_mut(key)) {
            sync_decoration(backend, plot.id(), key, decoration, current);
        }
    }

    let known = gpu.lines.len();
    let pending = plot.lines().len().saturating_sub(known);
    if pending == 0 {
        return;
    }
    if gpu.lines.try_reserve(pending).is_err() {
        tracing::warn!(plot = %plot.id(), pending, "no room to track new lines; retrying next frame");
        return;
    }
    for (i, line) in plot.lines().iter().enumerate().skip(known) {
        let slot = upload(backend, plot.id(), MeshKey::Line(i), line.vertices());
        gpu.lines.push(slot);
    }
}

fn sync_decoration<B: Backend>(
    backend: &mut B,
    plot: PlotId,
    key: MeshKey,
    decoration: &Decoration,
    current: &mut Option<DecorationSlot<B::Mesh>>,
) {
    if current
        .as_ref()
        .is_some_and(|c| c.revision == decoration.revision())
    {
        return;
    }
    // Release the stale mesh before allocating its replacement.
    *current = None;
    *current = Some(DecorationSlot {
        revision: decoration.revision(),
        slot: upload(backend, plot, key, decoration.vertices()),
    });
}

fn upload<B: Backend>(
    backend: &mut B,
    plot: PlotId,
    key: MeshKey,
    vertices: &[crate::line::Vertex],
) -> MeshSlot<B::Mesh> {
    if vertices.is_empty() {
        return MeshSlot::Empty;
    }
    match backend.upload(plot, key, vertices, key.topology()) {
        Ok(mesh) => {
            tracing::trace!(plot = %plot, mesh = %key, vertices = vertices.len(), "mesh uploaded");
            MeshSlot::Loaded(mesh)
        }
        Err(err) => {
            tracing::warn!(plot = %plot, mesh = %key, error = %err, "mesh upload failed");
            MeshSlot::Failed
        }
    }
}

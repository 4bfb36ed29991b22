//! GPU side of a figure.
//!
//! Plots keep their geometry on the CPU. A [`GpuScene`] mirrors it onto a
//! [`Backend`], uploading each piece once and owning the resulting meshes.
//! Every frame a [`FramePlan`] is derived from the figure and the scene and
//! handed to the backend-specific renderer.
use core::fmt;

use crate::line::Vertex;

pub mod frame;
pub mod headless;
pub mod scene;
pub(crate) mod wgpu_backend;

pub use frame::{DrawCall, FramePlan, PlotPass};
pub use headless::{HeadlessBackend, HeadlessMesh, MeshEvent, MeshLedger};
pub use scene::{GpuPlot, GpuScene, MeshSlot};

/// How a mesh's vertices are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Closed outline; the last vertex connects back to the first.
    LineLoop,
    /// Independent segments, two vertices each.
    LineList,
    /// Connected polyline.
    LineStrip,
}

/// Which part of a plot a mesh belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKey {
    Frame,
    Grid,
    Axes,
    Ticks,
    Line(usize),
}

impl MeshKey {
    pub fn topology(self) -> Topology {
        match self {
            Self::Frame => Topology::LineLoop,
            Self::Grid | Self::Axes | Self::Ticks => Topology::LineList,
            Self::Line(_) => Topology::LineStrip,
        }
    }
}

impl fmt::Display for MeshKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame => f.write_str("frame"),
            Self::Grid => f.write_str("grid"),
            Self::Axes => f.write_str("axes"),
            Self::Ticks => f.write_str("ticks"),
            Self::Line(i) => write!(f, "line {i}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{0} mesh has no vertices")]
    EmptyMesh(MeshKey),

    #[error("failed to allocate GPU buffer for {0}")]
    Allocation(MeshKey),
}

/// Something that can turn vertex data into GPU meshes.
///
/// A mesh owns its GPU objects and releases them when dropped.
pub trait Backend {
    type Mesh;

    fn upload(
        &mut self,
        plot: crate::PlotId,
        key: MeshKey,
        vertices: &[Vertex],
        topology: Topology,
    ) -> Result<Self::Mesh, RenderError>;
}

//! In-memory backend.
//!
//! Keeps uploaded vertices on the CPU and records every upload and release,
//! which makes the scene's resource lifecycle observable without a GPU.
use std::{cell::RefCell, rc::Rc};

use crate::{
    line::Vertex,
    plot::PlotId,
    render::{Backend, MeshKey, RenderError, Topology},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshEvent {
    Uploaded { plot: PlotId, key: MeshKey },
    Released { plot: PlotId, key: MeshKey },
}

#[derive(Debug, Default)]
struct LedgerInner {
    events: Vec<MeshEvent>,
    live: usize,
}

/// Shared record of what a [`HeadlessBackend`] allocated and released.
///
/// Stays readable after the backend and every mesh are gone.
#[derive(Debug, Clone, Default)]
pub struct MeshLedger(Rc<RefCell<LedgerInner>>);

impl MeshLedger {
    pub fn events(&self) -> Vec<MeshEvent> {
        self.0.borrow().events.clone()
    }

    /// Meshes uploaded and not yet released.
    pub fn live(&self) -> usize {
        self.0.borrow().live
    }

    pub fn uploads(&self) -> usize {
        self.0
            .borrow()
            .events
            .iter()
            .filter(|e| matches!(e, MeshEvent::Uploaded { .. }))
            .count()
    }

    fn record(&self, event: MeshEvent) {
        let mut inner = self.0.borrow_mut();
        match event {
            MeshEvent::Uploaded { .. } => inner.live += 1,
            MeshEvent::Released { .. } => inner.live = inner.live.saturating_sub(1),
        }
        inner.events.push(event);
    }
}

/// A mesh held in memory; releasing it is logged to the ledger.
#[derive(Debug)]
pub struct HeadlessMesh {
    plot: PlotId,
    key: MeshKey,
    topology: Topology,
    vertices: Vec<Vertex>,
    ledger: MeshLedger,
}

impl HeadlessMesh {
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }
}

impl Drop for HeadlessMesh {
    fn drop(&mut self) {
        self.ledger.record(MeshEvent::Released {
            plot: self.plot,
            key: self.key,
        });
    }
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    ledger: MeshLedger,
    failing: Vec<MeshKey>,
    budget: Option<usize>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> MeshLedger {
        self.ledger.clone()
    }

    /// Every upload of `key` fails with an allocation error.
    pub fn fail_on(mut self, key: MeshKey) -> Self {
        self.failing.push(key);
        self
    }

    /// Uploads beyond the first `n` fail with an allocation error.
    pub fn with_upload_budget(mut self, n: usize) -> Self {
        self.budget = Some(n);
        self
    }
}

impl Backend for HeadlessBackend {
    type Mesh = HeadlessMesh;

    fn upload(
        &mut self,
        plot: PlotId,
        key: MeshKey,
        vertices: &[Vertex],
        topology: Topology,
    ) -> Result<HeadlessMesh, RenderError> {
        if vertices.is_empty() {
            return Err(RenderError::EmptyMesh(key));
        }
        if self.failing.contains(&key) {
            return Err(RenderError::Allocation(key));
        }
        if let Some(budget) = self.budget.as_mut() {
            if *budget == 0 {
                return Err(RenderError::Allocation(key));
            }
            *budget -= 1;
        }

        self.ledger.record(MeshEvent::Uploaded { plot, key });
        Ok(HeadlessMesh {
            plot,
            key,
            topology,
            vertices: vertices.to_vec(),
            ledger: self.ledger.clone(),
        })
    }
}

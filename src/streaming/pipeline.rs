//! Background mesh-build pipeline
//!
//! Each build request runs [`HeightfieldMeshBuilder`] on its own short-lived
//! thread and pushes the finished mesh into a mutex-guarded FIFO. The owner
//! thread drains that FIFO once per tick; nothing ever blocks on an
//! individual build.
//!
//! Concurrency is unbounded in the number of in-flight requests (one thread
//! per request, no pool). That is a known scalability limit; in practice the
//! per-slot dedup keeps the request volume proportional to the visible chunk
//! count.

use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;

use glam::Vec3;

use crate::streaming::chunk::ChunkCoord;
use crate::terrain::mesh::{HeightfieldMeshBuilder, MeshData};

/// A completed build, delivered in completion order
#[derive(Debug)]
pub struct MeshResult {
    pub coord: ChunkCoord,
    pub lod_index: usize,
    pub mesh: MeshData,
}

/// Dispatches mesh builds to background threads and queues the results for
/// the owning thread.
pub struct MeshPipeline {
    builder: Arc<HeightfieldMeshBuilder>,
    /// FIFO shared with the build threads; the only cross-thread structure.
    completed: Arc<Mutex<VecDeque<MeshResult>>>,
    /// Chunk/LOD slots with a build currently in flight
    pending: HashSet<(ChunkCoord, usize)>,
}

impl MeshPipeline {
    pub fn new(builder: HeightfieldMeshBuilder) -> Self {
        Self {
            builder: Arc::new(builder),
            completed: Arc::new(Mutex::new(VecDeque::new())),
            pending: HashSet::new(),
        }
    }

    /// Shared access to the mesh builder
    pub fn builder(&self) -> &HeightfieldMeshBuilder {
        &self.builder
    }

    /// Dispatch a background build for one chunk/LOD slot.
    ///
    /// Returns `false` without dispatching if a build for the same slot is
    /// already in flight. Fire-and-forget otherwise: the build always runs
    /// to completion and is delivered exactly once, even if the chunk has
    /// left the visible set by then.
    pub fn request_build(&mut self, coord: ChunkCoord, lod_index: usize, lod: u32, anchor: Vec3) -> bool {
        if !self.pending.insert((coord, lod_index)) {
            return false;
        }

        log::trace!("dispatching mesh build for {coord:?} lod {lod} (slot {lod_index})");

        let builder = Arc::clone(&self.builder);
        let completed = Arc::clone(&self.completed);
        thread::spawn(move || {
            let mesh = builder.build_mesh(anchor, lod);

            // Deliver even if another build thread panicked and poisoned
            // the lock; the queue itself is always left consistent.
            let mut queue = completed
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            queue.push_back(MeshResult { coord, lod_index, mesh });
        });

        true
    }

    /// Take every completed build, in completion order.
    ///
    /// The buffer is swapped out under the lock and processed after it is
    /// released, so build threads are never blocked by whatever the caller
    /// does with the results.
    pub fn drain_ready(&mut self) -> Vec<MeshResult> {
        let drained = {
            let mut queue = self
                .completed
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *queue)
        };

        for result in &drained {
            self.pending.remove(&(result.coord, result.lod_index));
        }

        if !drained.is_empty() {
            log::trace!("drained {} completed mesh builds", drained.len());
        }

        drained.into()
    }

    /// Number of builds currently in flight
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check whether a specific chunk/LOD slot has a build in flight
    pub fn is_pending(&self, coord: ChunkCoord, lod_index: usize) -> bool {
        self.pending.contains(&(coord, lod_index))
    }
}

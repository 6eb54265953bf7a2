//! Uniform refinement of a fixed topology.
//!
//! A [`UniformEvaluator`] moves through four states:
//!
//! ```text
//! Uninitialized --initialize()--> Initialized --set_coarse_positions()--> Populated
//!                                                                          |    ^
//!                                                                 refine() |    | set_coarse_positions()
//!                                                                          v    |
//!                                                                         Refined <-- refine()
//! ```
//!
//! Failed calls have no effect on the state or on previously computed
//! results.
use std::fmt;
use std::io::Write;
use std::path::Path;

use rayon::ThreadPool;
use tracing::{debug, info};

use super::{ErrorSink, SubdivTopology};
use crate::far::{StencilTable, TopologyRefiner, UniformRefinementOptions};
use crate::osd::{rayon_evaluator, BufferDescriptor, CpuVertexBuffer};
use crate::{obj_export, Error, Result};

/// Where a [`UniformEvaluator`] is in its life cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum EvaluatorState {
    /// Freshly created; waiting for a topology.
    Uninitialized,
    /// Holds a refined topology; waiting for coarse positions.
    Initialized,
    /// Holds coarse positions; ready to refine.
    Populated,
    /// Holds a [`RefinementResult`].
    Refined,
}

/// The quads and vertex positions of the finest refinement level.
#[derive(Clone, Debug, PartialEq)]
pub struct RefinementResult {
    quads: Vec<[u32; 4]>,
    points: Vec<[f32; 3]>,
}

impl RefinementResult {
    /// Returns the refined quads as indices into [`points()`](Self::points()).
    #[inline]
    pub fn quads(&self) -> &[[u32; 4]] {
        &self.quads
    }

    /// Returns the refined vertex positions.
    #[inline]
    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    /// Returns the refined vertex positions as a flat buffer.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.points)
    }

    /// Returns the number of refined quads.
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Returns the number of refined vertices.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}

/// Everything `initialize()` derives from a topology.
struct RefinedTopology {
    topology: SubdivTopology,
    refiner: TopologyRefiner,
    // Entry `n` computes level `n + 1` from level `n`.
    stencil_tables: Vec<StencilTable>,
    // Entry `n` holds the positions of level `n + 1`.
    level_buffers: Vec<CpuVertexBuffer>,
    quads: Vec<[u32; 4]>,
}

/// Refines coarse vertex positions uniformly, on a pool of worker threads.
///
/// The topology is refined once in [`initialize()`](Self::initialize()).
/// [`refine()`](Self::refine()) then only has to push positions through the
/// per-level stencils, which makes re-refining deforming positions cheap.
///
/// The evaluator needs `&mut self` to change state; use one instance per
/// thread or put it behind a lock. Independent instances share nothing.
///
/// ```
/// use subdiv_petite::osdutil::{EvaluatorState, SubdivTopology, UniformEvaluator};
///
/// let mut evaluator = UniformEvaluator::new();
/// assert_eq!(evaluator.state(), EvaluatorState::Uninitialized);
///
/// evaluator.initialize(&SubdivTopology::new(3, vec![3], vec![0, 1, 2]))?;
/// evaluator.set_coarse_positions(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])?;
/// evaluator.refine(2)?;
/// assert_eq!(evaluator.state(), EvaluatorState::Refined);
///
/// // Three levels by default: 1 triangle -> 3 -> 12 -> 48 quads.
/// assert_eq!(evaluator.refined_quads()?.len(), 48);
/// # Ok::<(), subdiv_petite::Error>(())
/// ```
#[derive(Default)]
pub struct UniformEvaluator {
    refined: Option<Box<RefinedTopology>>,
    coarse: Option<CpuVertexBuffer>,
    result: Option<RefinementResult>,
    pool: Option<(usize, ThreadPool)>,
    error_sink: Option<Box<dyn ErrorSink>>,
}

impl fmt::Debug for UniformEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformEvaluator")
            .field("state", &self.state())
            .field("max_level", &self.max_level())
            .field("threads", &self.pool.as_ref().map(|(count, _)| *count))
            .field("has_error_sink", &self.error_sink.is_some())
            .finish()
    }
}

impl UniformEvaluator {
    /// Creates an uninitialized evaluator without an error sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes every failure through `sink` before returning it.
    pub fn with_error_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.set_error_sink(sink);
        self
    }

    /// Replaces the error sink.
    pub fn set_error_sink(&mut self, sink: impl ErrorSink + 'static) {
        self.error_sink = Some(Box::new(sink));
    }

    /// Returns the current state.
    pub fn state(&self) -> EvaluatorState {
        match (&self.refined, &self.coarse, &self.result) {
            (None, _, _) => EvaluatorState::Uninitialized,
            (Some(_), None, _) => EvaluatorState::Initialized,
            (Some(_), Some(_), None) => EvaluatorState::Populated,
            (Some(_), Some(_), Some(_)) => EvaluatorState::Refined,
        }
    }

    /// Returns the topology this evaluator was initialized with.
    pub fn topology(&self) -> Option<&SubdivTopology> {
        self.refined.as_ref().map(|refined| &refined.topology)
    }

    /// Returns the refined topology.
    pub fn refiner(&self) -> Option<&TopologyRefiner> {
        self.refined.as_ref().map(|refined| &refined.refiner)
    }

    /// Returns the level [`refine()`](Self::refine()) refines to.
    pub fn max_level(&self) -> Option<usize> {
        self.topology().map(SubdivTopology::max_levels)
    }

    /// Validates `topology` and refines its connectivity to
    /// [`max_levels()`](SubdivTopology::max_levels()).
    ///
    /// Allocates all buffers later calls to [`refine()`](Self::refine())
    /// work in.
    ///
    /// # Errors
    ///
    /// * [`Error::NotReady`] if the evaluator was already initialized.
    /// * [`Error::InvalidTopology`] if the topology fails validation or can
    ///   not be refined (degenerate faces, edges shared by more than two
    ///   faces).
    /// * [`Error::RefinementFailure`] if the finest level would outgrow the
    ///   32-bit index range or can not be allocated.
    pub fn initialize(&mut self, topology: &SubdivTopology) -> Result<()> {
        let outcome = self.try_initialize(topology);
        self.route(outcome)
    }

    fn try_initialize(&mut self, topology: &SubdivTopology) -> Result<()> {
        if self.refined.is_some() {
            return Err(Error::NotReady(
                "initialize() called on an initialized evaluator".to_string(),
            ));
        }

        topology.validate()?;

        let mut refiner = topology
            .descriptor()
            .and_then(|descriptor| TopologyRefiner::new(descriptor, topology.options()))
            .map_err(as_invalid_topology)?;
        refiner.refine_uniform(UniformRefinementOptions {
            refinement_level: topology.max_levels(),
            ..Default::default()
        })?;

        let stencil_tables = (1..=refiner.max_level())
            .map(|level| StencilTable::new(&refiner, level))
            .collect::<Result<Vec<_>>>()?;

        let level_buffers = stencil_tables
            .iter()
            .map(|table| CpuVertexBuffer::new(3, table.len()))
            .collect::<Vec<_>>();

        let finest = refiner
            .level(refiner.max_level())
            .ok_or_else(|| Error::RefinementFailure("Missing finest level".to_string()))?;
        let quads = finest
            .face_vertices_iter()
            .map(|face| match *face {
                [a, b, c, d] => Ok([a.0, b.0, c.0, d.0]),
                _ => Err(Error::RefinementFailure(format!(
                    "Refined face has {} vertices",
                    face.len()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            levels = refiner.max_level(),
            coarse_vertices = topology.vertex_count(),
            refined_vertices = finest.vertex_count(),
            refined_quads = quads.len(),
            "Initialized uniform evaluator"
        );

        self.refined = Some(Box::new(RefinedTopology {
            topology: topology.clone(),
            refiner,
            stencil_tables,
            level_buffers,
            quads,
        }));
        Ok(())
    }

    /// Sets the coarse vertex positions, three `f32`s per vertex.
    ///
    /// Replaces any previous positions and discards any previous
    /// [`RefinementResult`].
    ///
    /// # Errors
    ///
    /// * [`Error::NotReady`] before [`initialize()`](Self::initialize()).
    /// * [`Error::SizeMismatch`] unless `positions.len()` is three times the
    ///   topology's vertex count. Previous positions are kept.
    pub fn set_coarse_positions(&mut self, positions: &[f32]) -> Result<()> {
        let outcome = self.try_set_coarse_positions(positions);
        self.route(outcome)
    }

    fn try_set_coarse_positions(&mut self, positions: &[f32]) -> Result<()> {
        let vertex_count = self
            .topology()
            .map(SubdivTopology::vertex_count)
            .ok_or_else(|| {
                Error::NotReady("set_coarse_positions() called before initialize()".to_string())
            })?;

        let expected = 3 * vertex_count;
        if positions.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: positions.len(),
            });
        }

        let coarse = self
            .coarse
            .get_or_insert_with(|| CpuVertexBuffer::new(3, vertex_count));
        coarse.update_data(positions, 0, vertex_count)?;
        self.result = None;

        debug!(vertices = vertex_count, "Set coarse positions");
        Ok(())
    }

    /// Refines the coarse positions to the topology's maximum level, using at
    /// most `thread_count` worker threads.
    ///
    /// Blocks until the finest level is computed. Levels are computed one
    /// after the other; each completes before the next one starts. The
    /// result does not depend on `thread_count`.
    ///
    /// The worker pool is kept for subsequent calls with the same
    /// `thread_count`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] if `thread_count` is zero.
    /// * [`Error::NotReady`] before
    ///   [`set_coarse_positions()`](Self::set_coarse_positions()).
    /// * [`Error::RefinementFailure`] if a refined position is not finite or
    ///   the worker pool can not be started.
    pub fn refine(&mut self, thread_count: usize) -> Result<()> {
        let outcome = self.try_refine(thread_count);
        self.route(outcome)
    }

    fn try_refine(&mut self, thread_count: usize) -> Result<()> {
        if 0 == thread_count {
            return Err(Error::InvalidArgument(
                "refine() needs at least one thread".to_string(),
            ));
        }
        if self.refined.is_none() {
            return Err(Error::NotReady(
                "refine() called before initialize()".to_string(),
            ));
        }
        if self.coarse.is_none() {
            return Err(Error::NotReady(
                "refine() called before set_coarse_positions()".to_string(),
            ));
        }

        let pool = match self.pool.take() {
            Some((count, pool)) if count == thread_count => pool,
            _ => rayon_evaluator::build_pool(thread_count)?,
        };

        let outcome = match (self.refined.as_deref_mut(), self.coarse.as_ref()) {
            (Some(refined), Some(coarse)) => refine_levels(&pool, refined, coarse),
            _ => Err(Error::NotReady("refine() called out of order".to_string())),
        };
        self.pool = Some((thread_count, pool));
        let result = outcome?;

        info!(
            threads = thread_count,
            quads = result.quad_count(),
            points = result.point_count(),
            "Refined"
        );

        self.result = Some(result);
        Ok(())
    }

    /// Returns the result of the last [`refine()`](Self::refine()).
    pub fn result(&self) -> Result<&RefinementResult> {
        let outcome = self
            .result
            .as_ref()
            .ok_or_else(|| Error::NotReady("the evaluator has not been refined yet".to_string()));
        self.route(outcome)
    }

    /// Returns the quads of the finest level.
    ///
    /// # Errors
    ///
    /// [`Error::NotReady`] unless the evaluator is
    /// [`Refined`](EvaluatorState::Refined).
    pub fn refined_quads(&self) -> Result<&[[u32; 4]]> {
        self.result().map(RefinementResult::quads)
    }

    /// Returns the vertex positions of the finest level as a flat buffer,
    /// and its length (three times the number of refined vertices).
    ///
    /// # Errors
    ///
    /// [`Error::NotReady`] unless the evaluator is
    /// [`Refined`](EvaluatorState::Refined).
    pub fn refined_positions(&self) -> Result<(&[f32], usize)> {
        self.result().map(|result| {
            let positions = result.positions();
            (positions, positions.len())
        })
    }

    /// Writes the refined mesh as a Wavefront OBJ file.
    pub fn write_refined_obj(&self, path: impl AsRef<Path>) -> Result<()> {
        let result = self.result()?;
        let outcome = obj_export::write_obj_file(path, "refined", result.points(), result.quads());
        self.route(outcome)
    }

    /// Writes the refined mesh in Wavefront OBJ format to `writer`.
    pub fn write_refined_obj_to<W: Write>(&self, writer: W) -> Result<()> {
        let result = self.result()?;
        let outcome = obj_export::write_obj(writer, "refined", result.points(), result.quads());
        self.route(outcome)
    }

    /// Reports an error to the sink, if any, and passes the outcome on.
    fn route<T>(&self, outcome: Result<T>) -> Result<T> {
        if let (Err(error), Some(sink)) = (&outcome, &self.error_sink) {
            sink.report(error.kind(), &error.to_string());
        }
        outcome
    }
}

fn as_invalid_topology(error: Error) -> Error {
    match error {
        Error::InvalidTopology(_) => error,
        other => Error::InvalidTopology(other.to_string()),
    }
}

/// Pushes the coarse positions through every level.
///
/// Only the level scratch buffers are written to; the returned result is
/// the only thing that becomes visible.
fn refine_levels(
    pool: &ThreadPool,
    refined: &mut RefinedTopology,
    coarse: &CpuVertexBuffer,
) -> Result<RefinementResult> {
    let desc = BufferDescriptor::new(0, 3, 3);

    for (level, table) in refined.stencil_tables.iter().enumerate() {
        let (done, todo) = refined.level_buffers.split_at_mut(level);
        let src = done.last().unwrap_or(coarse);
        let dst = todo
            .first_mut()
            .ok_or_else(|| Error::RefinementFailure(format!("Missing buffer for level {}", level + 1)))?;

        rayon_evaluator::evaluate_stencils(pool, src, desc, dst, desc, table)?;
        debug!(level = level + 1, vertices = table.len(), "Evaluated level");
    }

    let finest = refined
        .level_buffers
        .last()
        .map(CpuVertexBuffer::bind_cpu_buffer)
        .unwrap_or_default();

    if let Some(i) = finest.iter().position(|value| !value.is_finite()) {
        return Err(Error::RefinementFailure(format!(
            "Refined vertex {} is not finite",
            i / 3
        )));
    }

    Ok(RefinementResult {
        quads: refined.quads.clone(),
        points: bytemuck::cast_slice(finest).to_vec(),
    })
}

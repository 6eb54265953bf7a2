//#![warn(missing_docs)]
//! # Uniform Subdivision Surfaces
//!
//! A pure Rust implementation of the uniform refinement pipeline known from
//! [*Pixar’s OpenSubdiv*](https://graphics.pixar.com/opensubdiv/).
//!
//! The crate is split into the same layers *OpenSubdiv* uses:
//!
//! * [`far`] – Topology refinement. Describes a mesh, refines its
//!   connectivity level by level and builds the stencils that compute the
//!   refined vertices from the vertices of the previous level.
//! * [`osd`] – Evaluation. Applies stencil tables to vertex buffers on a
//!   bounded CPU worker pool.
//! * [`osdutil`] – Convenience. A [`UniformEvaluator`](osdutil::UniformEvaluator)
//!   that wraps the whole pipeline behind a small state machine:
//!   initialize with a topology, set coarse positions, refine, read back
//!   the refined quads and positions.
//!
//! ## Example
//!
//! ```
//! use subdiv_petite::osdutil::{SubdivTopology, UniformEvaluator};
//!
//! // A single quad.
//! let topology = SubdivTopology::new(4, vec![4], vec![0, 1, 2, 3]).with_max_levels(1);
//!
//! let mut evaluator = UniformEvaluator::new();
//! evaluator.initialize(&topology)?;
//! evaluator.set_coarse_positions(&[
//!     0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
//! ])?;
//! evaluator.refine(4)?;
//!
//! assert_eq!(evaluator.refined_quads()?.len(), 4);
//! let (positions, len) = evaluator.refined_positions()?;
//! assert_eq!(len, 9 * 3);
//! assert_eq!(positions.len(), len);
//! # Ok::<(), subdiv_petite::Error>(())
//! ```
//!
//! ## Features
#![doc = document_features::document_features!()]
//!
//! ## API Changes From C++
//!
//! * Use canonical Rust naming – (`GetNumVertices()` becomes
//!   `vertex_count()`).
//! * Option structs use the [init struct
//!   pattern](https://xaeroxe.github.io/init-struct-pattern/).
//! * Use unsigned integer types, specifically `usize` and `u32`, for anything
//!   that can only contain positive values (indices, counts, valences,
//!   arities, etc.).
//! * Every fallible call returns a [`Result`]. There is no process wide error
//!   callback; an [`ErrorSink`](osdutil::ErrorSink) can be injected into an
//!   evaluator instead.

pub mod error;
pub use error::{Error, ErrorKind, Result};

pub mod far;
pub mod osd;
pub mod osdutil;

pub mod obj_export;

#[cfg(feature = "tri_mesh_buffers")]
pub mod tri_mesh_buffers;

/// A vertex, edge, or face index in the topology.
///
/// # Examples
///
/// ```
/// use subdiv_petite::Index;
///
/// // Create an index from a u32
/// let idx = Index::from(42u32);
/// assert_eq!(idx.0, 42);
///
/// // Convert back to u32
/// let value: u32 = idx.into();
/// assert_eq!(value, 42);
///
/// // Create from usize
/// let idx = Index::from(100usize);
/// let as_usize: usize = idx.into();
/// assert_eq!(as_usize, 100);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    bytemuck::Pod,
    bytemuck::Zeroable,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
#[repr(transparent)]
pub struct Index(pub u32);

/// Marks a missing component, e.g. the second face of a boundary edge.
pub const INVALID_INDEX: Index = Index(u32::MAX);

impl Index {
    /// Returns `true` unless this is [`INVALID_INDEX`].
    #[inline]
    pub fn is_valid(self) -> bool {
        self != INVALID_INDEX
    }
}

impl From<usize> for Index {
    #[inline]
    fn from(value: usize) -> Self {
        debug_assert!(value < u32::MAX as usize, "Index {} out of range", value);
        Index(value as u32)
    }
}

impl From<Index> for usize {
    #[inline]
    fn from(index: Index) -> Self {
        index.0 as usize
    }
}

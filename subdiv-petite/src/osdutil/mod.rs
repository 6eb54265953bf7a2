//! # Convenience Layer
//!
//! Wraps topology description, refinement and evaluation behind a small,
//! stateful API for the common case: refine a mesh uniformly to a fixed level
//! and read back quads and positions.
//!
//! * [`SubdivTopology`] – An owned, validated mesh topology.
//! * [`UniformEvaluator`] – Refines coarse positions on that topology.
//! * [`ErrorSink`] – Optional channel every evaluator failure is reported
//!   to, in addition to being returned.
pub mod error_sink;
pub use error_sink::*;

pub mod topology;
pub use topology::*;

pub mod uniform_evaluator;
pub use uniform_evaluator::*;

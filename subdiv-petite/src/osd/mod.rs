//! # Evaluation
//! `osd` applies [`far`](crate::far) structures to vertex data. The main role
//! of `osd` here is **refinement**: compute stencil-based uniform subdivision
//! on a pool of CPU worker threads.
//!
//! Evaluators don't own vertex buffers, clients provide their own
//! [`CpuVertexBuffer`]s as a source and destination, together with
//! [`BufferDescriptor`]s that describe the layout of the data inside them.
//!
//! Results are identical across thread counts: every refined element is
//! computed by exactly one task, summing its stencil in a fixed order.
pub mod buffer_descriptor;
pub use buffer_descriptor::*;

pub mod cpu_vertex_buffer;
pub use cpu_vertex_buffer::*;

pub mod rayon_evaluator;

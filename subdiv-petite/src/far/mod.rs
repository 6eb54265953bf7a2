//! `far` is the API layer for processing client-supplied mesh data into
//! subdivided surfaces.
//!
//! The two main aspects of the subdivision process are Topology Refinement
//! and Primvar Refinement.
//!
//! ## Topology Refinement
//! Topology refinement is the process of splitting the mesh topology according
//! to the specified subdivison rules to generate new topological vertices,
//! edges, and faces.  This process is purely topological and does not depend on
//! the specific values of any primvar data (point positions, etc).
//!
//! * [`TopologyDescriptor`] – Describes a mesh.
//! * [`TopologyRefiner`] – Encapsulates mesh refinement.
//! * [`TopologyLevel`] – Represents one level of refinement within a
//!   `TopologyRefiner`.
//!
//! ## Primitive Variable Refinement
//! Primitive Variable (primvar) refinement is the process of computing values
//! for primvar data (points, colors, normals, texture coordinates, etc) by
//! applying weights determined by the specified subdivision rules. A single
//! static topological refinement can be applied to multiple primvar instances
//! or to different animated primvar time samples.
//!
//! * [`StencilTable`] – Refinement weights of one level, suitable for
//!   efficient parallel processing of primvar refinement.
//! * [`PrimvarRefiner`] – Applies those weights level by level.
pub mod topology_descriptor;
pub use topology_descriptor::*;

pub mod topology_level;
pub use topology_level::*;

pub mod topology_refiner;
pub use topology_refiner::*;

pub mod stencil_table;
pub use stencil_table::*;

pub mod primvar_refiner;
pub use primvar_refiner::*;

//! Topology refinement.
//!
//! [`TopologyRefiner`] is the building block for many other useful structs in
//! `far`. It performs refinement of an arbitrary mesh and provides access to
//! the refined mesh topology.
//!
//! It can be used for primvar refinement directly through a
//! [`PrimvarRefiner`](super::primvar_refiner::PrimvarRefiner).  Or
//! indirectly by being used to create a
//! [`StencilTable`](super::stencil_table::StencilTable).
//!
//! `TopologyRefiner` provides uniform refinement through
//! [`refine_uniform()`](TopologyRefiner::refine_uniform()) as specified in the
//! [`UniformRefinementOptions`].
//!
//! The result can be accessed via [`level()`](TopologyRefiner::level()),
//! which gives access to the refined topology through a [`TopologyLevel`].
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing::debug;

use super::topology_level::TopologyLevel;
use crate::far::TopologyDescriptor;
use crate::{Error, Index, Result};

/// The deepest level [`refine_uniform()`](TopologyRefiner::refine_uniform())
/// refines to.
pub const MAX_REFINEMENT_LEVEL: usize = 15;

// Component counts must stay below `INVALID_INDEX`.
const MAX_COMPONENT_COUNT: usize = u32::MAX as usize;

/// Stores topology data for a specified set of refinement options.
#[derive(Clone, Debug)]
pub struct TopologyRefiner {
    options: TopologyRefinerOptions,
    // Level 0 is the base mesh.
    levels: Vec<TopologyLevel>,
    // One entry per refined level; entry `n` maps level `n` to level `n + 1`.
    child_offsets: Vec<ChildVertexOffsets>,
    is_uniform: bool,
}

impl TopologyRefiner {
    /// Create a new topology refiner.
    ///
    /// This builds the full connectivity of the base level. The descriptor
    /// is always checked for out of range indices, degenerate faces and edges
    /// shared by more than two faces, regardless of the
    /// `topology_validation` feature.
    pub fn new(descriptor: TopologyDescriptor, options: TopologyRefinerOptions) -> Result<Self> {
        let mut indices: Vec<Index> = descriptor
            .vertex_indices_per_face()
            .iter()
            .copied()
            .map(Index)
            .collect();

        if descriptor.is_left_handed() {
            let mut start = 0;
            for &arity in descriptor.vertices_per_face() {
                let end = (start + arity as usize).min(indices.len());
                indices[start..end].reverse();
                start = end;
            }
        }

        let base = TopologyLevel::new(
            descriptor.vertex_count(),
            descriptor.vertices_per_face(),
            indices,
        )?;

        debug!(
            vertices = base.vertex_count(),
            faces = base.face_count(),
            edges = base.edge_count(),
            "Built base level"
        );

        Ok(Self {
            options,
            levels: vec![base],
            child_offsets: Vec::new(),
            is_uniform: false,
        })
    }

    /// Returns the subdivision options.
    #[inline]
    pub fn options(&self) -> TopologyRefinerOptions {
        self.options
    }

    /// Returns true if uniform refinement has been applied.
    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.is_uniform
    }

    /// Returns the number of refinement levels, including the base level.
    #[inline]
    pub fn refinement_levels(&self) -> usize {
        self.levels.len()
    }

    /// Returns the maximum vertex valence in all levels
    #[inline]
    pub fn max_valence(&self) -> usize {
        self.levels
            .iter()
            .map(TopologyLevel::max_valence)
            .max()
            .unwrap_or(0)
    }

    /// Returns the total number of vertices in all levels.
    #[inline]
    pub fn vertex_total_count(&self) -> usize {
        self.levels.iter().map(TopologyLevel::vertex_count).sum()
    }

    /// Returns the total number of edges in all levels.
    #[inline]
    pub fn edge_total_count(&self) -> usize {
        self.levels.iter().map(TopologyLevel::edge_count).sum()
    }

    /// Returns the total number of faces in all levels.
    #[inline]
    pub fn face_total_count(&self) -> usize {
        self.levels.iter().map(TopologyLevel::face_count).sum()
    }

    /// Returns the total number of face vertices in all levels.
    #[inline]
    pub fn face_vertex_total_count(&self) -> usize {
        self.levels.iter().map(TopologyLevel::face_vertex_count).sum()
    }

    /// Returns the highest level of refinement.
    #[inline]
    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    /// Returns a handle to access data specific to a particular refinement
    /// level.
    #[inline]
    pub fn level(&self, level: usize) -> Option<&TopologyLevel> {
        self.levels.get(level)
    }

    /// Refine the topology uniformly.
    ///
    /// This method applies uniform refinement to the level specified in the
    /// given [`UniformRefinementOptions`]s. Any previous refinement is
    /// replaced. On error the refiner is left as it was.
    ///
    /// * `options` - Options controlling uniform refinement.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] if `refinement_level` is greater than
    ///   [`MAX_REFINEMENT_LEVEL`].
    /// * [`Error::RefinementFailure`] if a refined level would have more
    ///   components than an [`Index`] can address, or can not be allocated.
    pub fn refine_uniform(&mut self, options: UniformRefinementOptions) -> Result<()> {
        if MAX_REFINEMENT_LEVEL < options.refinement_level {
            return Err(Error::InvalidArgument(format!(
                "Refinement level {} is out of range (should be <= {}).",
                options.refinement_level, MAX_REFINEMENT_LEVEL
            )));
        }
        LevelCounts::of(&self.levels[0]).check_refinement(options.refinement_level)?;

        let mut levels = vec![self.levels[0].clone()];
        let mut child_offsets = Vec::with_capacity(options.refinement_level);

        for level in 0..options.refinement_level {
            let parent = &levels[level];
            let offsets = ChildVertexOffsets::new(parent, options.order_vertices_from_faces_first);
            let child = refine_level(parent, &offsets)?;

            debug!(
                level = level + 1,
                vertices = child.vertex_count(),
                faces = child.face_count(),
                edges = child.edge_count(),
                "Refined level"
            );

            levels.push(child);
            child_offsets.push(offsets);
        }

        self.levels = levels;
        self.child_offsets = child_offsets;
        self.is_uniform = true;
        Ok(())
    }

    /// Unrefine the topology, keeping only the base level.
    #[inline]
    pub fn unrefine(&mut self) {
        self.levels.truncate(1);
        self.child_offsets.clear();
        self.is_uniform = false;
    }

    /// Where the children of `level - 1` land in `level`.
    #[inline]
    pub(crate) fn child_offsets(&self, level: usize) -> Option<&ChildVertexOffsets> {
        level
            .checked_sub(1)
            .and_then(|parent| self.child_offsets.get(parent))
    }
}

/// Builds the connectivity of the level below `parent`.
///
/// Parent face `f` with corners `v[i]` and edges `e[i] = (v[i], v[i + 1])`
/// produces one quad per corner: `[vc(v[i]), ec(e[i]), fc(f), ec(e[i - 1])]`.
fn refine_level(parent: &TopologyLevel, offsets: &ChildVertexOffsets) -> Result<TopologyLevel> {
    let child_faces = parent.face_vertex_count();
    let mut indices = Vec::new();
    indices.try_reserve_exact(4 * child_faces).map_err(|e| {
        Error::RefinementFailure(format!("Can not allocate {} child faces: {}", child_faces, e))
    })?;

    for (face, (vertices, edges)) in parent
        .face_vertices_iter()
        .zip((0..parent.face_count()).filter_map(|f| parent.face_edges(f.into())))
        .enumerate()
    {
        let face_point = offsets.face(face.into());
        let n = vertices.len();
        for i in 0..n {
            indices.extend([
                offsets.vertex(vertices[i]),
                offsets.edge(edges[i]),
                face_point,
                offsets.edge(edges[(i + n - 1) % n]),
            ]);
        }
    }

    TopologyLevel::new(offsets.child_vertex_count, &vec![4; child_faces], indices)
}

/// Component counts of one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LevelCounts {
    faces: usize,
    edges: usize,
    vertices: usize,
    face_vertices: usize,
}

impl LevelCounts {
    fn of(level: &TopologyLevel) -> Self {
        Self {
            faces: level.face_count(),
            edges: level.edge_count(),
            vertices: level.vertex_count(),
            face_vertices: level.face_vertex_count(),
        }
    }

    /// Counts of the uniformly refined child level, `None` on overflow.
    ///
    /// Every face corner spawns a quad and an interior edge; every edge is
    /// split in two.
    fn child(&self) -> Option<Self> {
        Some(Self {
            faces: self.face_vertices,
            edges: self.edges.checked_mul(2)?.checked_add(self.face_vertices)?,
            vertices: self.faces.checked_add(self.edges)?.checked_add(self.vertices)?,
            face_vertices: self.face_vertices.checked_mul(4)?,
        })
    }

    fn fits(&self) -> bool {
        [self.faces, self.edges, self.vertices, self.face_vertices]
            .iter()
            .all(|&count| count < MAX_COMPONENT_COUNT)
    }

    /// Fails if any level down to `refinement_level` outgrows the index
    /// range.
    fn check_refinement(mut self, refinement_level: usize) -> Result<()> {
        for level in 1..=refinement_level {
            self = match self.child() {
                Some(child) if child.fits() => child,
                _ => {
                    return Err(Error::RefinementFailure(format!(
                        "Refinement level {} has more than {} components.",
                        level, MAX_COMPONENT_COUNT
                    )))
                }
            };
        }
        Ok(())
    }
}

/// Index offsets of the child vertices spawned by the faces, edges and
/// vertices of a parent level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ChildVertexOffsets {
    pub(crate) faces: usize,
    pub(crate) edges: usize,
    pub(crate) vertices: usize,
    pub(crate) child_vertex_count: usize,
}

/// The parent component a child vertex originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ParentComponent {
    Face(Index),
    Edge(Index),
    Vertex(Index),
}

impl ChildVertexOffsets {
    fn new(parent: &TopologyLevel, faces_first: bool) -> Self {
        let (f, e, v) = (parent.face_count(), parent.edge_count(), parent.vertex_count());
        let child_vertex_count = f + e + v;
        if faces_first {
            Self {
                faces: 0,
                edges: f,
                vertices: f + e,
                child_vertex_count,
            }
        } else {
            Self {
                vertices: 0,
                faces: v,
                edges: v + f,
                child_vertex_count,
            }
        }
    }

    #[inline]
    pub(crate) fn face(&self, face: Index) -> Index {
        Index::from(self.faces + usize::from(face))
    }

    #[inline]
    pub(crate) fn edge(&self, edge: Index) -> Index {
        Index::from(self.edges + usize::from(edge))
    }

    #[inline]
    pub(crate) fn vertex(&self, vertex: Index) -> Index {
        Index::from(self.vertices + usize::from(vertex))
    }

    /// Maps a child vertex back to the parent component it was spawned by.
    pub(crate) fn parent_of(&self, parent: &TopologyLevel, child: usize) -> ParentComponent {
        if (self.faces..self.faces + parent.face_count()).contains(&child) {
            ParentComponent::Face(Index::from(child - self.faces))
        } else if (self.edges..self.edges + parent.edge_count()).contains(&child) {
            ParentComponent::Edge(Index::from(child - self.edges))
        } else {
            ParentComponent::Vertex(Index::from(child - self.vertices))
        }
    }
}

/// Subdivision schemes.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum Scheme {
    /// Splits faces linearly. Positions stay on the coarse polygons.
    Bilinear = 0,
    /// Catmull-Clark subdivision. Approximates a smooth surface.
    CatmullClark,
}

/// Vertex boundary interpolation rules.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum BoundaryInterpolation {
    /// Boundary edges are smooth; corners are rounded off.
    EdgeOnly = 1,
    /// Boundary edges are smooth; vertices in exactly one face stay put.
    EdgeAndCorner,
}

/// All supported options applying to a subdivision scheme.
///
/// These options define the shape of a particular limit surface, including
/// the shape of primitive variable data associated with it.
///
/// # Examples
///
/// ```
/// use subdiv_petite::far::{BoundaryInterpolation, Scheme, TopologyRefinerOptions};
///
/// // Create options with defaults
/// let options = TopologyRefinerOptions::default();
///
/// // Create custom options
/// let custom_options = TopologyRefinerOptions {
///     scheme: Scheme::Bilinear,
///     boundary_interpolation: Some(BoundaryInterpolation::EdgeAndCorner),
/// };
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TopologyRefinerOptions {
    pub scheme: Scheme,
    /// `None` is treated like [`EdgeOnly`](BoundaryInterpolation::EdgeOnly).
    pub boundary_interpolation: Option<BoundaryInterpolation>,
}

impl Default for TopologyRefinerOptions {
    /// Create options with the following defaults:
    ///
    /// | Property                 | Value                                             |
    /// |--------------------------|---------------------------------------------------|
    /// | `scheme`                 | [`CatmullClark`](Scheme::CatmullClark)            |
    /// | `boundary_interpolation` | `Some(`[`EdgeOnly`](BoundaryInterpolation::EdgeOnly)`)` |
    fn default() -> Self {
        Self {
            scheme: Scheme::CatmullClark,
            boundary_interpolation: Some(BoundaryInterpolation::EdgeOnly),
        }
    }
}

/// Uniform topology refinement options.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UniformRefinementOptions {
    pub refinement_level: usize,
    pub order_vertices_from_faces_first: bool,
}

impl Default for UniformRefinementOptions {
    /// Create uniform refinement options with the following defaults:
    ///
    /// | Property                          | Value   |
    /// |-----------------------------------|---------|
    /// | `refinement_level`                | `4`     |
    /// | `order_vertices_from_faces_first` | `true`  |
    fn default() -> Self {
        Self {
            refinement_level: 4,
            order_vertices_from_faces_first: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_offsets_map_back_to_parents() {
        let descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
        let refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();
        let parent = refiner.level(0).unwrap();

        for faces_first in [true, false] {
            let offsets = ChildVertexOffsets::new(parent, faces_first);
            assert_eq!(offsets.child_vertex_count, 9);
            assert_eq!(
                offsets.parent_of(parent, usize::from(offsets.face(Index(0)))),
                ParentComponent::Face(Index(0))
            );
            assert_eq!(
                offsets.parent_of(parent, usize::from(offsets.edge(Index(3)))),
                ParentComponent::Edge(Index(3))
            );
            assert_eq!(
                offsets.parent_of(parent, usize::from(offsets.vertex(Index(2)))),
                ParentComponent::Vertex(Index(2))
            );
        }
    }

    #[test]
    fn left_handed_faces_are_reversed() {
        let mut descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
        descriptor.left_handed(true);
        let refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();
        assert_eq!(
            refiner.level(0).unwrap().face_vertices(Index(0)).unwrap(),
            &[Index(3), Index(2), Index(1), Index(0)]
        );
    }

    #[test]
    fn projected_counts_match_refined_levels() {
        let descriptor = TopologyDescriptor::new(5, &[4, 3], &[0, 1, 2, 3, 1, 4, 2]).unwrap();
        let mut refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();
        refiner
            .refine_uniform(UniformRefinementOptions {
                refinement_level: 2,
                ..Default::default()
            })
            .unwrap();

        let mut counts = LevelCounts::of(refiner.level(0).unwrap());
        for level in 1..=2 {
            counts = counts.child().unwrap();
            assert_eq!(counts, LevelCounts::of(refiner.level(level).unwrap()));
        }
    }

    #[test]
    fn oversized_refinement_is_rejected_up_front() {
        let descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
        let mut refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();

        assert!(matches!(
            refiner.refine_uniform(UniformRefinementOptions {
                refinement_level: usize::MAX,
                ..Default::default()
            }),
            Err(Error::InvalidArgument(_))
        ));

        // 4^16 face vertices at the deepest level.
        assert!(matches!(
            refiner.refine_uniform(UniformRefinementOptions {
                refinement_level: MAX_REFINEMENT_LEVEL,
                ..Default::default()
            }),
            Err(Error::RefinementFailure(_))
        ));
        assert_eq!(refiner.max_level(), 0);
    }

    #[test]
    fn refine_uniform_replaces_previous_levels() {
        let descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
        let mut refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();

        refiner
            .refine_uniform(UniformRefinementOptions {
                refinement_level: 3,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(refiner.max_level(), 3);

        refiner
            .refine_uniform(UniformRefinementOptions {
                refinement_level: 1,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(refiner.max_level(), 1);
        assert!(refiner.child_offsets(2).is_none());

        refiner.unrefine();
        assert_eq!(refiner.refinement_levels(), 1);
        assert!(!refiner.is_uniform());
    }
}

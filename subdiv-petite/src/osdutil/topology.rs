//! An owned mesh topology with its refinement settings.
use crate::far::{TopologyDescriptor, TopologyRefinerOptions, MAX_REFINEMENT_LEVEL};
use crate::{Error, Result};

/// Number of uniform refinement levels a [`SubdivTopology`] asks for unless
/// told otherwise.
pub const DEFAULT_MAX_LEVELS: usize = 3;

/// Connectivity-only description of a polygon mesh plus the number of
/// levels it is to be refined to.
///
/// Built once from raw face data, then handed by reference to
/// [`UniformEvaluator::initialize()`](super::UniformEvaluator::initialize()),
/// which keeps its own copy.
///
/// ```
/// use subdiv_petite::osdutil::{SubdivTopology, DEFAULT_MAX_LEVELS};
///
/// let topology = SubdivTopology::new(4, vec![4], vec![0, 1, 2, 3]);
/// assert_eq!(topology.max_levels(), DEFAULT_MAX_LEVELS);
/// assert!(topology.is_valid());
///
/// let broken = SubdivTopology::new(4, vec![4], vec![0, 1, 2, 7]);
/// assert!(broken.validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SubdivTopology {
    vertex_count: usize,
    face_vertex_counts: Vec<u32>,
    face_vertex_indices: Vec<u32>,
    max_levels: usize,
    options: TopologyRefinerOptions,
}

impl SubdivTopology {
    /// * `vertex_count` - The number of coarse vertices.
    /// * `face_vertex_counts` - The number of vertices of each face.
    /// * `face_vertex_indices` - The vertex indices of all faces, flattened.
    pub fn new(
        vertex_count: usize,
        face_vertex_counts: Vec<u32>,
        face_vertex_indices: Vec<u32>,
    ) -> Self {
        Self {
            vertex_count,
            face_vertex_counts,
            face_vertex_indices,
            max_levels: DEFAULT_MAX_LEVELS,
            options: TopologyRefinerOptions::default(),
        }
    }

    /// Sets the number of uniform refinement levels.
    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Sets the subdivision scheme options.
    pub fn with_options(mut self, options: TopologyRefinerOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_vertex_counts.len()
    }

    #[inline]
    pub fn face_vertex_counts(&self) -> &[u32] {
        &self.face_vertex_counts
    }

    #[inline]
    pub fn face_vertex_indices(&self) -> &[u32] {
        &self.face_vertex_indices
    }

    #[inline]
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    #[inline]
    pub fn options(&self) -> TopologyRefinerOptions {
        self.options
    }

    /// Checks that the topology can be refined.
    ///
    /// Reports the first problem found: no vertices, no faces, zero or more
    /// than [`MAX_REFINEMENT_LEVEL`] refinement levels, a face with fewer than three vertices, an index
    /// count that disagrees with the face sizes, or an index out of range.
    pub fn validate(&self) -> Result<()> {
        if 0 == self.vertex_count {
            return Err(Error::InvalidTopology(
                "The vertex count must be positive.".to_string(),
            ));
        }
        if self.face_vertex_counts.is_empty() {
            return Err(Error::InvalidTopology(
                "The topology has no faces.".to_string(),
            ));
        }
        if 0 == self.max_levels {
            return Err(Error::InvalidTopology(
                "The number of refinement levels must be positive.".to_string(),
            ));
        }
        if MAX_REFINEMENT_LEVEL < self.max_levels {
            return Err(Error::InvalidTopology(format!(
                "{} refinement levels requested (should be <= {}).",
                self.max_levels, MAX_REFINEMENT_LEVEL
            )));
        }
        if let Some((face, &arity)) = self
            .face_vertex_counts
            .iter()
            .enumerate()
            .find(|&(_, &arity)| arity < 3)
        {
            return Err(Error::InvalidTopology(format!(
                "Face {} has {} vertices (should be >= 3).",
                face, arity
            )));
        }

        let expected = self
            .face_vertex_counts
            .iter()
            .map(|&arity| arity as usize)
            .sum::<usize>();
        if expected != self.face_vertex_indices.len() {
            return Err(Error::InvalidTopology(format!(
                "The faces need {} vertex indices but {} were given.",
                expected,
                self.face_vertex_indices.len()
            )));
        }

        if let Some((i, &vertex_index)) = self
            .face_vertex_indices
            .iter()
            .enumerate()
            .find(|&(_, &vertex_index)| self.vertex_count <= vertex_index as usize)
        {
            return Err(Error::InvalidTopology(format!(
                "Vertex index[{}] = {} is out of range (should be < {}).",
                i, vertex_index, self.vertex_count
            )));
        }

        Ok(())
    }

    /// Returns `true` if [`validate()`](Self::validate()) passes.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Returns a descriptor borrowing this topology's face data.
    pub fn descriptor(&self) -> Result<TopologyDescriptor<'_>> {
        TopologyDescriptor::new(
            self.vertex_count,
            &self.face_vertex_counts,
            &self.face_vertex_indices,
        )
    }
}

//! A container holding references to raw topology data.
//!
//! ## Example
//! ```
//! # use subdiv_petite::far::TopologyDescriptor;
//! // The positions as a flat buffer. This is commonly used later, with a PrimvarRefiner.
//! let vertices = [1, 1, 1, 1, -1, -1, -1, 1, -1, -1, -1, 1];
//!
//! // Describe the basic topology of our tetrahedron.
//! let tetrahedron = TopologyDescriptor::new(
//!     vertices.len() / 3,
//!     // Four triangles.
//!     &[3; 4],
//!     // Vertex indices for each triangle.
//!     &[2, 1, 0, 3, 2, 0, 1, 3, 0, 2, 3, 1],
//! )?;
//!
//! assert_eq!(tetrahedron.face_count(), 4);
//! # Ok::<(), subdiv_petite::Error>(())
//! ```

/// A `TopologyDescriptor` holds references to raw topology data as flat index
/// buffers.
///
/// This is used to construct a
/// [`TopologyRefiner`](crate::far::TopologyRefiner).
///
/// See the [module level documentation](crate::far::topology_descriptor) for
/// an example.
#[derive(Clone, Copy, Debug)]
pub struct TopologyDescriptor<'a> {
    pub(crate) vertices_len: usize,
    pub(crate) vertices_per_face: &'a [u32],
    pub(crate) vertex_indices_per_face: &'a [u32],
    pub(crate) left_handed: bool,
}

impl<'a> TopologyDescriptor<'a> {
    /// Describes a mesh topology. This is fed into a
    /// [`TopologyRefiner`](crate::far::TopologyRefiner).
    ///
    /// # Arguments
    ///
    /// * `vertices_len` - The number of vertices in the mesh.
    /// * `vertices_per_face` - A slice containing the number of vertices for
    ///   each face in the mesh. The length of this is the number of faces in
    ///   the mesh.
    /// * `vertex_indices_per_face` - A flat list of the vertex indices for each
    ///   face in the mesh.
    #[inline]
    pub fn new(
        vertices_len: usize,
        vertices_per_face: &'a [u32],
        vertex_indices_per_face: &'a [u32],
    ) -> crate::Result<TopologyDescriptor<'a>> {
        #[cfg(feature = "topology_validation")]
        {
            let arity_sum = vertices_per_face.iter().map(|&n| n as usize).sum::<usize>();
            if vertex_indices_per_face.len() != arity_sum {
                return Err(crate::Error::InvalidTopology(
                    "The number of vertex indices is not equal to the sum of face arities."
                        .to_string(),
                ));
            }
            for (i, &vertex_index) in vertex_indices_per_face.iter().enumerate() {
                if vertices_len <= (vertex_index as usize) {
                    return Err(crate::Error::InvalidTopology(format!(
                        "Vertex index[{}] = {} is out of range (should be < {}).",
                        i, vertex_index, vertices_len
                    )));
                }
            }
        }

        Ok(TopologyDescriptor {
            vertices_len,
            vertices_per_face,
            vertex_indices_per_face,
            left_handed: false,
        })
    }

    /// Set if the topology describes faces with left handed (clockwise)
    /// winding.
    ///
    /// Faces of left handed topology are reversed when the base level is
    /// built so all refined faces wind counter-clockwise.
    #[inline]
    pub fn left_handed(&mut self, left_handed: bool) -> &mut Self {
        self.left_handed = left_handed;
        self
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices_len
    }

    /// Returns the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.vertices_per_face.len()
    }

    /// Returns the per-face vertex counts.
    #[inline]
    pub fn vertices_per_face(&self) -> &'a [u32] {
        self.vertices_per_face
    }

    /// Returns the flat per-face vertex indices.
    #[inline]
    pub fn vertex_indices_per_face(&self) -> &'a [u32] {
        self.vertex_indices_per_face
    }

    /// Returns `true` if faces wind clockwise.
    #[inline]
    pub fn is_left_handed(&self) -> bool {
        self.left_handed
    }
}

#[cfg(all(test, feature = "topology_validation"))]
mod tests {
    use super::*;

    #[test]
    fn rejects_index_count_mismatch() {
        let result = TopologyDescriptor::new(4, &[4], &[0, 1, 2]);
        assert!(matches!(result, Err(crate::Error::InvalidTopology(_))));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 4]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid topology: Vertex index[3] = 4 is out of range (should be < 4)."
        );
    }
}

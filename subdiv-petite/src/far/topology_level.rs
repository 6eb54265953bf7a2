//! An interface for accessing data in a specific level of a refined topology
//! hierarchy.
use std::collections::HashMap;

use itertools::Itertools;
use rayon::prelude::*;

use crate::{Error, Index, Result, INVALID_INDEX};

/// Provides an interface to data in a specific level of a topology hierarchy.
///
/// Instances of `TopologyLevel` are created and owned by a
/// [`TopologyRefiner`](super::TopologyRefiner), which hands out shared
/// references to them.  If the `TopologyRefiner` is re-refined, the borrow
/// checker makes sure no such reference survives.
#[derive(Clone, Debug)]
pub struct TopologyLevel {
    vertex_count: usize,
    // One more entry than there are faces.
    face_offsets: Vec<usize>,
    face_vertices: Vec<Index>,
    face_edges: Vec<Index>,
    edge_vertices: Vec<[Index; 2]>,
    // The second face is INVALID_INDEX on boundary edges.
    edge_faces: Vec<[Index; 2]>,
    edge_non_manifold: Vec<bool>,
    vertex_faces: Vec<Vec<Index>>,
    vertex_edges: Vec<Vec<Index>>,
}

impl TopologyLevel {
    /// Builds the full connectivity of a level from face-vertex lists.
    ///
    /// Edges are numbered in order of first appearance while walking the
    /// faces in order.
    ///
    /// Fails on faces with fewer than three vertices, faces that reference a
    /// vertex twice, out of range indices and edges shared by more than two
    /// faces.
    pub(crate) fn new(
        vertex_count: usize,
        vertices_per_face: &[u32],
        vertex_indices_per_face: Vec<Index>,
    ) -> Result<Self> {
        let mut face_offsets = Vec::with_capacity(vertices_per_face.len() + 1);
        face_offsets.push(0);
        for (face, &arity) in vertices_per_face.iter().enumerate() {
            if arity < 3 {
                return Err(Error::InvalidTopology(format!(
                    "Face {} has {} vertices (should be >= 3).",
                    face, arity
                )));
            }
            face_offsets.push(face_offsets[face] + arity as usize);
        }
        if face_offsets[vertices_per_face.len()] != vertex_indices_per_face.len() {
            return Err(Error::InvalidTopology(
                "The number of vertex indices is not equal to the sum of face arities."
                    .to_string(),
            ));
        }

        let mut level = TopologyLevel {
            vertex_count,
            face_edges: Vec::with_capacity(vertex_indices_per_face.len()),
            face_offsets,
            face_vertices: vertex_indices_per_face,
            edge_vertices: Vec::new(),
            edge_faces: Vec::new(),
            edge_non_manifold: Vec::new(),
            vertex_faces: vec![Vec::new(); vertex_count],
            vertex_edges: vec![Vec::new(); vertex_count],
        };

        let mut edge_map = HashMap::<(Index, Index), Index>::with_capacity(
            level.face_vertices.len(),
        );

        for face in 0..level.face_count() {
            let range = level.face_offsets[face]..level.face_offsets[face + 1];
            let face_index = Index::from(face);

            if let Some(&v) = level.face_vertices[range.clone()]
                .iter()
                .find(|v| vertex_count <= usize::from(**v))
            {
                return Err(Error::InvalidTopology(format!(
                    "Face {} references vertex {} which is out of range (should be < {}).",
                    face, v, vertex_count
                )));
            }
            if let Some(v) = level.face_vertices[range.clone()].iter().duplicates().next() {
                return Err(Error::InvalidTopology(format!(
                    "Face {} is degenerate: vertex {} occurs more than once.",
                    face, v
                )));
            }

            for (&v0, &v1) in level.face_vertices[range].iter().circular_tuple_windows() {
                let key = (v0.min(v1), v0.max(v1));
                let edge = match edge_map.get(&key) {
                    Some(&edge) => {
                        let e = usize::from(edge);
                        if level.edge_faces[e][1].is_valid() {
                            return Err(Error::InvalidTopology(format!(
                                "Edge ({}, {}) is shared by more than two faces.",
                                key.0, key.1
                            )));
                        }
                        level.edge_faces[e][1] = face_index;
                        // Consistently oriented neighbours traverse a shared
                        // edge in opposite directions.
                        if level.edge_vertices[e][0] == v0 {
                            level.edge_non_manifold[e] = true;
                        }
                        edge
                    }
                    None => {
                        let edge = Index::from(level.edge_vertices.len());
                        edge_map.insert(key, edge);
                        level.edge_vertices.push([v0, v1]);
                        level.edge_faces.push([face_index, INVALID_INDEX]);
                        level.edge_non_manifold.push(false);
                        level.vertex_edges[usize::from(v0)].push(edge);
                        level.vertex_edges[usize::from(v1)].push(edge);
                        edge
                    }
                };
                level.face_edges.push(edge);
                level.vertex_faces[usize::from(v0)].push(face_index);
            }
        }

        Ok(level)
    }
}

/// ### Methods to Inspect the Overall Inventory of Components
///
/// All three main component types are indexed locally within each level.  For
/// some topological relationships – notably face-vertices, which is often
/// the only relationship of interest – the total number of entries is also
/// made available.
impl TopologyLevel {
    /// Returns the number of vertices in this level.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Returns the number of faces in this level.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_offsets.len() - 1
    }

    /// Returns the number of edges in this level.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_vertices.len()
    }

    /// Returns the total number of face-vertices -- the sum of all vertices
    /// for all faces.
    #[inline]
    pub fn face_vertex_count(&self) -> usize {
        self.face_vertices.len()
    }

    /// Returns the largest number of edges incident to any vertex.
    pub fn max_valence(&self) -> usize {
        self.vertex_edges.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Returns the face-vertex indices of all faces as one flat slice.
    #[inline]
    pub fn face_vertex_indices(&self) -> &[Index] {
        &self.face_vertices
    }

    /// Returns an iterator over the face vertices of this level.
    pub fn face_vertices_iter(&self) -> FaceVerticesIter<'_> {
        FaceVerticesIter {
            level: self,
            current: 0,
            num: self.face_count(),
        }
    }

    /// Returns a parallel iterator over the face vertices of this level.
    pub fn face_vertices_par_iter(
        &self,
    ) -> impl IndexedParallelIterator<Item = &[Index]> + '_ {
        (0..self.face_count())
            .into_par_iter()
            .map(move |face| &self.face_vertices[self.face_range(face)])
    }

    #[inline]
    fn face_range(&self, face: usize) -> std::ops::Range<usize> {
        self.face_offsets[face]..self.face_offsets[face + 1]
    }
}

/// ### Methods to Inspect Topological Relationships for Individual Components
///
/// With three main component types (*vertices*, *faces* and *edges*), for each
/// of the three components the `TopologyLevel` stores the incident/adjacent
/// components of the other two types.  So there are six relationships available
/// for immediate inspection.
///
/// All of these return `None` if the component index is out of range. An
/// isolated vertex has an empty slice of incident faces and edges.
impl TopologyLevel {
    /// Returns the vertices incident to a given face.
    pub fn face_vertices(&self, face: Index) -> Option<&[Index]> {
        let face = usize::from(face);
        (face < self.face_count()).then(|| &self.face_vertices[self.face_range(face)])
    }

    /// Returns the edges incident to a given face.
    ///
    /// Edge `i` connects face vertex `i` and face vertex `i + 1`.
    pub fn face_edges(&self, face: Index) -> Option<&[Index]> {
        let face = usize::from(face);
        (face < self.face_count()).then(|| &self.face_edges[self.face_range(face)])
    }

    /// Returns the vertices incident to a given edge.
    pub fn edge_vertices(&self, edge: Index) -> Option<&[Index]> {
        self.edge_vertices
            .get(usize::from(edge))
            .map(|vertices| vertices.as_slice())
    }

    /// Returns the faces incident to a given edge.
    pub fn edge_faces(&self, edge: Index) -> Option<&[Index]> {
        self.edge_faces.get(usize::from(edge)).map(|faces| {
            if faces[1].is_valid() {
                &faces[..]
            } else {
                &faces[..1]
            }
        })
    }

    /// Returns the faces incident to a given vertex.
    pub fn vertex_faces(&self, vertex: Index) -> Option<&[Index]> {
        self.vertex_faces
            .get(usize::from(vertex))
            .map(Vec::as_slice)
    }

    /// Returns the edges incident to a given vertex.
    pub fn vertex_edges(&self, vertex: Index) -> Option<&[Index]> {
        self.vertex_edges
            .get(usize::from(vertex))
            .map(Vec::as_slice)
    }

    /// Identify the edge matching the given vertex pair.
    pub fn find_edge(&self, vertex0: Index, vertex1: Index) -> Option<Index> {
        self.vertex_edges(vertex0)?
            .iter()
            .copied()
            .find(|&edge| {
                let [a, b] = self.edge_vertices[usize::from(edge)];
                (a == vertex0 && b == vertex1) || (a == vertex1 && b == vertex0)
            })
    }

    /// Returns the vertex on the other end of `edge`.
    #[inline]
    pub(crate) fn other_vertex(&self, edge: Index, vertex: Index) -> Index {
        let [a, b] = self.edge_vertices[usize::from(edge)];
        if a == vertex {
            b
        } else {
            a
        }
    }
}

/// An iterator over the face vertices of a [`TopologyLevel`].
#[derive(Copy, Clone)]
pub struct FaceVerticesIter<'a> {
    level: &'a TopologyLevel,
    num: usize,
    current: usize,
}

impl<'a> Iterator for FaceVerticesIter<'a> {
    type Item = &'a [Index];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.num {
            None
        } else {
            self.current += 1;
            self.level.face_vertices((self.current - 1).into())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.num - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FaceVerticesIter<'_> {}

/// ### Methods to Inspect Other Topological Properties of Individual Components
impl TopologyLevel {
    /// Returns `true` if the edge is non-manifold.
    ///
    /// An edge whose two faces traverse it in the same direction (i.e. the
    /// faces are inconsistently wound) is non-manifold.
    #[inline]
    pub fn is_edge_non_manifold(&self, edge: Index) -> bool {
        self.edge_non_manifold
            .get(usize::from(edge))
            .copied()
            .unwrap_or(false)
    }

    /// Returns `true` if the vertex is non-manifold.
    ///
    /// This is the case for vertices where more than one fan of faces meet
    /// (e.g. the tip of a bow-tie) and for vertices on non-manifold edges.
    pub fn is_vertex_non_manifold(&self, vertex: Index) -> bool {
        let Some(edges) = self.vertex_edges(vertex) else {
            return false;
        };
        let faces = self.vertex_faces[usize::from(vertex)].len();
        if edges.iter().any(|&edge| self.is_edge_non_manifold(edge)) {
            return true;
        }
        match self.boundary_edge_count(vertex) {
            0 => faces != edges.len(),
            2 => edges.len() != faces + 1,
            _ => true,
        }
    }

    /// Returns `true` if the edge is a boundary.
    #[inline]
    pub fn is_edge_boundary(&self, edge: Index) -> bool {
        self.edge_faces
            .get(usize::from(edge))
            .is_some_and(|faces| !faces[1].is_valid())
    }

    /// Returns `true` if the vertex is a boundary.
    #[inline]
    pub fn is_vertex_boundary(&self, vertex: Index) -> bool {
        0 < self.boundary_edge_count(vertex)
    }

    /// Returns the number of boundary edges incident to a vertex.
    pub(crate) fn boundary_edge_count(&self, vertex: Index) -> usize {
        self.vertex_edges(vertex).map_or(0, |edges| {
            edges
                .iter()
                .filter(|&&edge| self.is_edge_boundary(edge))
                .count()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(raw: &[u32]) -> Vec<Index> {
        raw.iter().copied().map(Index).collect()
    }

    #[test]
    fn two_quads_share_one_edge() {
        // 0-1-2
        // | | |
        // 3-4-5
        let level =
            TopologyLevel::new(6, &[4, 4], indices(&[0, 3, 4, 1, 1, 4, 5, 2])).unwrap();

        assert_eq!(level.edge_count(), 7);
        let shared = level.find_edge(Index(4), Index(1)).unwrap();
        assert_eq!(level.edge_faces(shared).unwrap(), &[Index(0), Index(1)]);
        assert!(!level.is_edge_boundary(shared));
        assert!(level.is_vertex_boundary(Index(1)));
        assert!(!level.is_vertex_non_manifold(Index(4)));
        assert_eq!(level.vertex_faces(Index(4)).unwrap().len(), 2);
        assert_eq!(level.vertex_edges(Index(4)).unwrap().len(), 3);
        assert!(level.find_edge(Index(0), Index(5)).is_none());
        assert!(level.face_vertices(Index(2)).is_none());
    }

    #[test]
    fn face_edges_follow_face_vertices() {
        let level = TopologyLevel::new(4, &[4], indices(&[0, 1, 2, 3])).unwrap();
        let face_edges = level.face_edges(Index(0)).unwrap();
        for (i, &edge) in face_edges.iter().enumerate() {
            let vertices = level.edge_vertices(edge).unwrap();
            assert_eq!(vertices, &[Index(i as u32), Index(((i + 1) % 4) as u32)]);
        }
    }

    #[test]
    fn rejects_degenerate_face() {
        let result = TopologyLevel::new(4, &[4], indices(&[0, 1, 0, 2]));
        assert!(matches!(result, Err(Error::InvalidTopology(_))));
    }

    #[test]
    fn rejects_edge_with_three_faces() {
        let result = TopologyLevel::new(5, &[3, 3, 3], indices(&[0, 1, 2, 1, 0, 3, 0, 1, 4]));
        assert!(matches!(result, Err(Error::InvalidTopology(_))));
    }

    #[test]
    fn flags_inconsistent_winding() {
        // Both triangles traverse edge (0, 1) in the same direction.
        let level = TopologyLevel::new(4, &[3, 3], indices(&[0, 1, 2, 0, 1, 3])).unwrap();
        let edge = level.find_edge(Index(0), Index(1)).unwrap();
        assert!(level.is_edge_non_manifold(edge));
        assert!(level.is_vertex_non_manifold(Index(0)));
    }

    #[test]
    fn bow_tie_vertex_is_non_manifold() {
        let level = TopologyLevel::new(5, &[3, 3], indices(&[0, 1, 2, 0, 3, 4])).unwrap();
        assert!(level.is_vertex_non_manifold(Index(0)));
        assert!(!level.is_vertex_non_manifold(Index(1)));
    }

    #[test]
    fn parallel_iter_matches_serial() {
        let level =
            TopologyLevel::new(6, &[4, 4], indices(&[0, 3, 4, 1, 1, 4, 5, 2])).unwrap();
        let serial: Vec<_> = level.face_vertices_iter().collect();
        let parallel: Vec<_> = level.face_vertices_par_iter().collect();
        assert_eq!(serial, parallel);
        assert_eq!(level.face_vertices_iter().len(), 2);
    }
}

//! Table of subdivision stencils.
//!
//! A stencil expresses one refined vertex as a weighted blend of the vertices
//! of the level above. When the control vertices move in space, the refined
//! location can be very efficiently recomputed simply by applying the
//! blending weights to the control vertices again.
//!
//! A [`StencilTable`] holds the stencils for every vertex of one refined
//! level. Weights inside a stencil are merged per control vertex in the order
//! the control vertices are first encountered, so applying a stencil always
//! sums in the same order.
use super::topology_refiner::{ParentComponent, Scheme, TopologyRefiner};
use super::{BoundaryInterpolation, TopologyLevel};
use crate::{Error, Index, Result};

/// Gives read access to a single stencil in a [`StencilTable`].
#[derive(Clone, Copy, Debug)]
pub struct Stencil<'a> {
    indices: &'a [Index],
    weights: &'a [f32],
}

impl<'a> Stencil<'a> {
    /// Returns the indices of the control vertices.
    pub fn indices(&self) -> &'a [Index] {
        self.indices
    }

    /// Returns the stencil interpolation weights.
    pub fn weights(&self) -> &'a [f32] {
        self.weights
    }

    /// Blends `out.len()` consecutive elements of each control vertex into
    /// `out`.
    ///
    /// Control vertex `i` starts at `src[offset + i * stride]`.
    #[inline]
    pub(crate) fn apply(&self, src: &[f32], offset: usize, stride: usize, out: &mut [f32]) {
        out.fill(0.0);
        let len = out.len();
        for (&index, &weight) in self.indices.iter().zip(self.weights) {
            let start = offset + usize::from(index) * stride;
            for (dst, &value) in out.iter_mut().zip(&src[start..start + len]) {
                *dst += weight * value;
            }
        }
    }
}

/// Container for the stencils of one refinement level.
#[derive(Clone, Debug, Default)]
pub struct StencilTable {
    control_vertex_count: usize,
    sizes: Vec<u32>,
    offsets: Vec<Index>,
    indices: Vec<Index>,
    weights: Vec<f32>,
}

impl StencilTable {
    /// Create the stencil table that computes refinement level `level` from
    /// level `level - 1`.
    ///
    /// `level` must be in `1..=refiner.max_level()`.
    pub fn new(refiner: &TopologyRefiner, level: usize) -> Result<StencilTable> {
        let (Some(parent), Some(offsets)) = (
            level.checked_sub(1).and_then(|l| refiner.level(l)),
            refiner.child_offsets(level),
        ) else {
            return Err(Error::IndexOutOfBounds {
                index: level,
                max: refiner.max_level(),
            });
        };

        let options = refiner.options();
        let rules = Rules {
            parent,
            bilinear: Scheme::Bilinear == options.scheme,
            sharp_corners: Some(BoundaryInterpolation::EdgeAndCorner)
                == options.boundary_interpolation,
        };

        let mut table = StencilTable {
            control_vertex_count: parent.vertex_count(),
            sizes: Vec::with_capacity(offsets.child_vertex_count),
            offsets: Vec::with_capacity(offsets.child_vertex_count),
            ..Default::default()
        };

        let mut stencil = Accumulator::default();
        for child in 0..offsets.child_vertex_count {
            stencil.clear();
            match offsets.parent_of(parent, child) {
                ParentComponent::Face(face) => rules.face_point(face, 1.0, &mut stencil),
                ParentComponent::Edge(edge) => rules.edge_point(edge, &mut stencil),
                ParentComponent::Vertex(vertex) => rules.vertex_point(vertex, &mut stencil),
            }
            table.push(&stencil)?;
        }

        Ok(table)
    }

    fn push(&mut self, stencil: &Accumulator) -> Result<()> {
        if u32::MAX as usize - self.indices.len() <= stencil.0.len() {
            return Err(Error::RefinementFailure(format!(
                "Stencil table for {} vertices outgrows the index range.",
                self.control_vertex_count
            )));
        }
        self.offsets.push(Index::from(self.indices.len()));
        self.sizes.push(stencil.0.len() as u32);
        for &(index, weight) in &stencil.0 {
            self.indices.push(index);
            self.weights.push(weight);
        }
        Ok(())
    }

    /// Returns the number of stencils in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        0 == self.len()
    }

    /// Returns the number of control vertices indexed in the table.
    #[inline]
    pub fn control_vertex_count(&self) -> usize {
        self.control_vertex_count
    }

    /// Returns a Stencil at index i in the table.
    #[inline]
    pub fn stencil(&self, i: Index) -> Option<Stencil<'_>> {
        let i = usize::from(i);
        let start = usize::from(*self.offsets.get(i)?);
        let end = start + self.sizes[i] as usize;
        Some(Stencil {
            indices: &self.indices[start..end],
            weights: &self.weights[start..end],
        })
    }

    /// Returns the number of control vertices of each stencil in the table.
    #[inline]
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Returns the offset to a given stencil.
    #[inline]
    pub fn offsets(&self) -> &[Index] {
        &self.offsets
    }

    /// Returns the indices of the control vertices.
    #[inline]
    pub fn control_indices(&self) -> &[Index] {
        &self.indices
    }

    /// Returns the stencil interpolation weights.
    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Collects `(control vertex, weight)` pairs, merging duplicates in place.
#[derive(Default)]
struct Accumulator(Vec<(Index, f32)>);

impl Accumulator {
    #[inline]
    fn clear(&mut self) {
        self.0.clear();
    }

    #[inline]
    fn add(&mut self, index: Index, weight: f32) {
        match self.0.iter_mut().find(|(i, _)| *i == index) {
            Some((_, w)) => *w += weight,
            None => self.0.push((index, weight)),
        }
    }
}

/// Subdivision rules of one parent level.
struct Rules<'a> {
    parent: &'a TopologyLevel,
    bilinear: bool,
    sharp_corners: bool,
}

impl Rules<'_> {
    /// Face point: the centroid of the face.
    fn face_point(&self, face: Index, scale: f32, stencil: &mut Accumulator) {
        let vertices = self.parent.face_vertices(face).unwrap_or_default();
        let weight = scale / vertices.len() as f32;
        for &vertex in vertices {
            stencil.add(vertex, weight);
        }
    }

    /// Edge point: the midpoint of boundary (and non-manifold) edges,
    /// `(v0 + v1 + F0 + F1) / 4` for smooth interior edges.
    fn edge_point(&self, edge: Index, stencil: &mut Accumulator) {
        let vertices = self.parent.edge_vertices(edge).unwrap_or_default();
        let faces = self.parent.edge_faces(edge).unwrap_or_default();

        if self.bilinear || 2 != faces.len() || self.parent.is_edge_non_manifold(edge) {
            for &vertex in vertices {
                stencil.add(vertex, 0.5);
            }
        } else {
            for &vertex in vertices {
                stencil.add(vertex, 0.25);
            }
            for &face in faces {
                self.face_point(face, 0.25, stencil);
            }
        }
    }

    /// Vertex point.
    ///
    /// * Smooth interior vertex of valence `n`:
    ///   `(n - 2) / n * V + 1 / n² * (Σ neighbours + Σ face points)`.
    /// * Smooth boundary vertex: `(6 V + a + b) / 8` with `a`, `b` the
    ///   neighbours along the boundary.
    /// * Corners (with [`EdgeAndCorner`](BoundaryInterpolation::EdgeAndCorner)),
    ///   non-manifold and isolated vertices are copied.
    fn vertex_point(&self, vertex: Index, stencil: &mut Accumulator) {
        let edges = self.parent.vertex_edges(vertex).unwrap_or_default();
        let faces = self.parent.vertex_faces(vertex).unwrap_or_default();

        if self.bilinear || edges.is_empty() || self.parent.is_vertex_non_manifold(vertex) {
            stencil.add(vertex, 1.0);
            return;
        }

        if self.parent.is_vertex_boundary(vertex) {
            if self.sharp_corners && 1 == faces.len() {
                stencil.add(vertex, 1.0);
                return;
            }
            stencil.add(vertex, 0.75);
            for &edge in edges
                .iter()
                .filter(|&&edge| self.parent.is_edge_boundary(edge))
            {
                stencil.add(self.parent.other_vertex(edge, vertex), 0.125);
            }
            return;
        }

        let n = edges.len() as f32;
        let ring_weight = 1.0 / (n * n);
        stencil.add(vertex, (n - 2.0) / n);
        for &edge in edges {
            stencil.add(self.parent.other_vertex(edge, vertex), ring_weight);
        }
        for &face in faces {
            self.face_point(face, ring_weight, stencil);
        }
    }
}

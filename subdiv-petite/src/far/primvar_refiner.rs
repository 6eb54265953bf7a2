//! Single threaded refinement of primvar data.
use super::{StencilTable, TopologyRefiner};
use crate::{Error, Result};

/// Applies the stencils of a [`TopologyRefiner`] to primvar data, one level
/// at a time.
///
/// For multi-threaded refinement of vertex buffers, see
/// [`osd::rayon_evaluator`](crate::osd::rayon_evaluator).
pub struct PrimvarRefiner<'a> {
    refiner: &'a TopologyRefiner,
    stencil_tables: Vec<StencilTable>,
}

impl<'a> PrimvarRefiner<'a> {
    pub fn new(refiner: &'a TopologyRefiner) -> Result<PrimvarRefiner<'a>> {
        let stencil_tables = (1..=refiner.max_level())
            .map(|level| StencilTable::new(refiner, level))
            .collect::<Result<Vec<_>>>()?;

        Ok(PrimvarRefiner {
            refiner,
            stencil_tables,
        })
    }

    /// Returns the stencil table that computes `level` from `level - 1`.
    pub fn stencil_table(&self, level: usize) -> Option<&StencilTable> {
        self.stencil_tables.get(level.checked_sub(1)?)
    }

    /// Interpolates `src`, the data of `level - 1`, into the data of `level`.
    ///
    /// * `level` - The destination level; `1..=max_level()`.
    /// * `tuple_len` - Number of `f32` elements per vertex (e.g. `3` for
    ///   positions).
    /// * `src` - Tightly packed data of the parent level.
    pub fn interpolate(&self, level: usize, tuple_len: usize, src: &[f32]) -> Result<Vec<f32>> {
        let table = self
            .stencil_table(level)
            .ok_or(Error::IndexOutOfBounds {
                index: level,
                max: self.refiner.max_level(),
            })?;

        if 0 == tuple_len {
            return Err(Error::InvalidArgument(
                "tuple_len must be at least 1".to_string(),
            ));
        }

        let expected = table.control_vertex_count() * tuple_len;
        if src.len() != expected {
            return Err(Error::InvalidBufferSize {
                expected,
                actual: src.len(),
            });
        }

        let mut dst = vec![0.0; table.len() * tuple_len];
        for (i, out) in dst.chunks_exact_mut(tuple_len).enumerate() {
            if let Some(stencil) = table.stencil(i.into()) {
                stencil.apply(src, 0, tuple_len, out);
            }
        }
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::far::{TopologyDescriptor, UniformRefinementOptions};

    #[test]
    fn quad_face_point_is_centroid() {
        let descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
        let mut refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();
        refiner
            .refine_uniform(UniformRefinementOptions {
                refinement_level: 1,
                ..Default::default()
            })
            .unwrap();

        let primvar_refiner = PrimvarRefiner::new(&refiner).unwrap();
        let refined = primvar_refiner
            .interpolate(1, 2, &[0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0])
            .unwrap();

        assert_eq!(refined.len(), 9 * 2);
        // Face point first.
        assert_eq!(&refined[..2], &[1.0, 1.0]);
        // Boundary edge points are midpoints.
        assert_eq!(&refined[2..4], &[1.0, 0.0]);
    }

    #[test]
    fn rejects_wrong_buffer_size() {
        let descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
        let mut refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();
        refiner.refine_uniform(Default::default()).unwrap();

        let primvar_refiner = PrimvarRefiner::new(&refiner).unwrap();
        assert!(matches!(
            primvar_refiner.interpolate(1, 3, &[0.0; 9]),
            Err(Error::InvalidBufferSize {
                expected: 12,
                actual: 9
            })
        ));
        assert!(matches!(
            primvar_refiner.interpolate(5, 3, &[0.0; 12]),
            Err(Error::IndexOutOfBounds { .. })
        ));
    }
}

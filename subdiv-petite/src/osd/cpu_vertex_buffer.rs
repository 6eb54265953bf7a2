use crate::{Error, Result};

/// Concrete vertex buffer for CPU subdivision.
///
/// Holds `vertices_len` vertices of `elements_len` tightly packed `f32`s
/// each. An instance can be passed to
/// [`evaluate_stencils()`](crate::osd::rayon_evaluator::evaluate_stencils()).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CpuVertexBuffer {
    elements_len: usize,
    data: Vec<f32>,
}

impl CpuVertexBuffer {
    /// Allocates a zeroed buffer.
    #[inline]
    pub fn new(elements_len: usize, vertices_len: usize) -> CpuVertexBuffer {
        CpuVertexBuffer {
            elements_len,
            data: vec![0.0; elements_len * vertices_len],
        }
    }

    /// Returns how many elements defined in this vertex buffer.
    #[inline]
    pub fn elements_len(&self) -> usize {
        self.elements_len
    }

    /// Returns how many vertices allocated in this vertex buffer.
    #[inline]
    pub fn vertices_len(&self) -> usize {
        if 0 == self.elements_len {
            0
        } else {
            self.data.len() / self.elements_len
        }
    }

    /// Get the contents of this vertex buffer as a slice of [`f32`].
    #[inline]
    pub fn bind_cpu_buffer(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub(crate) fn bind_cpu_buffer_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// This method is meant to be used in client code in order to provide
    /// coarse vertices data.
    ///
    /// Copies `vertices_len` vertices from `src` into the buffer, starting
    /// at vertex `start_vertex`. Nothing is copied if the ranges don't fit.
    pub fn update_data(
        &mut self,
        src: &[f32],
        start_vertex: usize,
        vertices_len: usize,
    ) -> Result<()> {
        let elements_len = self.elements_len;
        let count = vertices_len * elements_len;

        if src.len() < count {
            return Err(Error::InvalidBufferSize {
                expected: count,
                actual: src.len(),
            });
        }

        let start = start_vertex * elements_len;
        if self.data.len() < start + count {
            return Err(Error::IndexOutOfBounds {
                index: start_vertex + vertices_len,
                max: self.vertices_len(),
            });
        }

        self.data[start..start + count].copy_from_slice(&src[..count]);
        Ok(())
    }
}

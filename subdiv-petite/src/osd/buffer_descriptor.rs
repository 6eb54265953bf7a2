/// Describes where the elements of each vertex live inside a flat `f32`
/// buffer.
///
/// Vertex `i` occupies `buffer[offset + i * stride..][..length]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BufferDescriptor {
    pub offset: usize,
    pub length: usize,
    pub stride: usize,
}

impl BufferDescriptor {
    pub fn new(offset: usize, length: usize, stride: usize) -> Self {
        Self {
            offset,
            length,
            stride,
        }
    }

    /// Returns the relative offset within a stride.
    pub fn local_offset(&self) -> usize {
        if self.stride != 0 {
            self.offset % self.stride
        } else {
            0
        }
    }

    /// True if the descriptor values are internally consistent.
    pub fn is_valid(&self) -> bool {
        (self.length != 0) && (self.local_offset() + self.length <= self.stride)
    }

    pub fn is_empty(&self) -> bool {
        0 == self.length
    }

    /// Returns the number of `f32`s a buffer needs to hold `vertices_len`
    /// vertices.
    pub(crate) fn required_len(&self, vertices_len: usize) -> usize {
        if 0 == vertices_len {
            0
        } else {
            self.offset + (vertices_len - 1) * self.stride + self.length
        }
    }
}

//! Stencil evaluation on a bounded [`rayon`] thread pool.
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::buffer_descriptor::BufferDescriptor;
use super::cpu_vertex_buffer::CpuVertexBuffer;
use crate::far::StencilTable;
use crate::{Error, Index, Result};

/// Builds a worker pool with exactly `thread_count` threads.
///
/// Fails with [`Error::InvalidArgument`] if `thread_count` is zero.
pub fn build_pool(thread_count: usize) -> Result<ThreadPool> {
    if 0 == thread_count {
        return Err(Error::InvalidArgument(
            "thread count must be at least 1".to_string(),
        ));
    }

    ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .thread_name(|i| format!("subdiv-worker-{}", i))
        .build()
        .map_err(|e| Error::RefinementFailure(format!("Could not start worker pool: {}", e)))
}

/// Evaluate stencils on the threads of `pool`.
///
/// Every destination vertex is computed by one task, so the result does not
/// depend on the number of threads in the pool. The call returns once all
/// destination vertices are written.
///
/// * `pool` -- The worker pool to run on.
/// * `src_buffer` -- Input primvar buffer.
/// * `src_desc` -- Vertex buffer descriptor for the input buffer.
/// * `dst_buffer` -- Output primvar buffer.
/// * `dst_desc` -- Vertex buffer descriptor for the output buffer.
/// * `stencil_table` -- A [`StencilTable`].
pub fn evaluate_stencils(
    pool: &ThreadPool,
    src_buffer: &CpuVertexBuffer,
    src_desc: BufferDescriptor,
    dst_buffer: &mut CpuVertexBuffer,
    dst_desc: BufferDescriptor,
    stencil_table: &StencilTable,
) -> Result<()> {
    evaluate_stencils_slice(
        pool,
        src_buffer.bind_cpu_buffer(),
        src_desc,
        dst_buffer.bind_cpu_buffer_mut(),
        dst_desc,
        stencil_table,
    )
}

/// Like [`evaluate_stencils()`], on plain slices.
pub fn evaluate_stencils_slice(
    pool: &ThreadPool,
    src: &[f32],
    src_desc: BufferDescriptor,
    dst: &mut [f32],
    dst_desc: BufferDescriptor,
    stencil_table: &StencilTable,
) -> Result<()> {
    if !src_desc.is_valid() || !dst_desc.is_valid() || src_desc.length != dst_desc.length {
        return Err(Error::InvalidArgument(format!(
            "Incompatible buffer descriptors: {:?} -> {:?}",
            src_desc, dst_desc
        )));
    }

    let expected = src_desc.required_len(stencil_table.control_vertex_count());
    if src.len() < expected {
        return Err(Error::InvalidBufferSize {
            expected,
            actual: src.len(),
        });
    }

    let expected = dst_desc.required_len(stencil_table.len());
    if dst.len() < expected {
        return Err(Error::InvalidBufferSize {
            expected,
            actual: dst.len(),
        });
    }

    if stencil_table.is_empty() {
        return Ok(());
    }

    let length = dst_desc.length;
    pool.install(|| {
        dst[dst_desc.offset..]
            .par_chunks_mut(dst_desc.stride)
            .take(stencil_table.len())
            .enumerate()
            .for_each(|(i, out)| {
                if let Some(stencil) = stencil_table.stencil(Index::from(i)) {
                    stencil.apply(src, src_desc.offset, src_desc.stride, &mut out[..length]);
                }
            });
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::far::{TopologyDescriptor, TopologyRefiner, UniformRefinementOptions};

    #[test]
    fn zero_threads_is_rejected() {
        assert!(matches!(build_pool(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn interleaved_destination() {
        let descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
        let mut refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();
        refiner
            .refine_uniform(UniformRefinementOptions {
                refinement_level: 1,
                ..Default::default()
            })
            .unwrap();
        let table = StencilTable::new(&refiner, 1).unwrap();

        let mut src = CpuVertexBuffer::new(3, 4);
        src.update_data(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            0,
            4,
        )
        .unwrap();

        // Positions go into the second half of a 6 float stride.
        let mut dst = CpuVertexBuffer::new(6, table.len());
        let pool = build_pool(2).unwrap();
        evaluate_stencils(
            &pool,
            &src,
            BufferDescriptor::new(0, 3, 3),
            &mut dst,
            BufferDescriptor::new(3, 3, 6),
            &table,
        )
        .unwrap();

        let data = dst.bind_cpu_buffer();
        // Face point of the unit square.
        assert_eq!(&data[..6], &[0.0, 0.0, 0.0, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn short_destination_is_rejected() {
        let descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
        let mut refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();
        refiner.refine_uniform(Default::default()).unwrap();
        let table = StencilTable::new(&refiner, 1).unwrap();

        let src = CpuVertexBuffer::new(3, 4);
        let mut dst = CpuVertexBuffer::new(3, 8);
        let pool = build_pool(1).unwrap();
        let desc = BufferDescriptor::new(0, 3, 3);
        assert!(matches!(
            evaluate_stencils(&pool, &src, desc, &mut dst, desc, &table),
            Err(Error::InvalidBufferSize {
                expected: 27,
                actual: 24
            })
        ));
    }
}

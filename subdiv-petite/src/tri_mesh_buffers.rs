//! # Triangle Buffer Conversion
//!
//! Helper for turning refined quads into triangle mesh buffers for use with
//! realtime rendering.
use itertools::Itertools;
use slice_of_array::prelude::*;

use crate::osdutil::RefinementResult;
use crate::{Error, Result};

static EPSILON: f32 = 0.00000001;

type Vector = ultraviolet::vec::Vec3;
type Normal = Vector;
type Point = Vector;

/// Returns a flat [`u32`] triangle index buffer and two, flat matching point
/// and normal buffers.
///
/// All the faces are disconnected. I.e. points & normals are duplicated for
/// each shared vertex. Every quad is split along its shorter diagonal.
///
/// * `positions` - Flat vertex positions, three `f32`s per vertex.
/// * `quads` - Indices into `positions`, four per quad.
pub fn to_triangle_mesh_buffers(
    positions: &[f32],
    quads: &[[u32; 4]],
) -> Result<(Vec<u32>, Vec<[f32; 3]>, Vec<[f32; 3]>)> {
    if 0 != positions.len() % 3 {
        return Err(Error::InvalidBufferSize {
            expected: positions.len() / 3 * 3,
            actual: positions.len(),
        });
    }

    let points: &[[f32; 3]] = positions.nest();

    if let Some(&index) = quads
        .iter()
        .flatten()
        .find(|&&index| points.len() <= index as usize)
    {
        return Err(Error::IndexOutOfBounds {
            index: index as usize,
            max: points.len(),
        });
    }

    let (corner_points, corner_normals): (Vec<[f32; 3]>, Vec<[f32; 3]>) = quads
        .iter()
        .flat_map(|quad| {
            let corners = index_as_points(quad, points);
            let fallback = face_normal(&corners);

            corners
                .iter()
                .circular_tuple_windows::<(_, _, _)>()
                .map(|(p0, p1, p2)| {
                    let normal = orthogonal(p0, p1, p2);
                    let mag_sq = normal.mag_sq();

                    // Collinear corners take the averaged face normal.
                    let normal = if mag_sq < EPSILON {
                        fallback
                    } else {
                        normal / mag_sq.sqrt()
                    };

                    ([p1.x, p1.y, p1.z], [normal.x, normal.y, normal.z])
                })
                .collect_vec()
        })
        .unzip();

    // `circular_tuple_windows` starts at the second corner of each quad.
    let triangle_index = (0u32..)
        .step_by(4)
        .zip(quads)
        .flat_map(|(base, quad)| {
            let p = index_as_points(quad, points);
            let [c1, c2, c3, c0] = [base, base + 1, base + 2, base + 3];

            if (p[0] - p[2]).mag_sq() < (p[1] - p[3]).mag_sq() {
                [c0, c1, c2, c0, c2, c3]
            } else {
                [c1, c2, c3, c1, c3, c0]
            }
        })
        .collect();

    Ok((triangle_index, corner_points, corner_normals))
}

impl RefinementResult {
    /// Triangulates the refined quads.
    ///
    /// See [`to_triangle_mesh_buffers()`].
    pub fn to_triangle_mesh_buffers(&self) -> Result<(Vec<u32>, Vec<[f32; 3]>, Vec<[f32; 3]>)> {
        to_triangle_mesh_buffers(self.positions(), self.quads())
    }
}

#[inline]
fn orthogonal(v0: &Point, v1: &Point, v2: &Point) -> Vector {
    (*v1 - *v0).cross(*v2 - *v1)
}

#[inline]
fn index_as_points(face: &[u32], points: &[[f32; 3]]) -> Vec<Point> {
    face.iter()
        .map(|&index| {
            let [x, y, z] = points[index as usize];
            Point::new(x, y, z)
        })
        .collect()
}

/// Computes the normal of a face.
///
/// Averages the normals of all non-collinear corners, so non-planar faces
/// get a sensible result. Degenerate faces get a zero normal.
#[inline]
fn face_normal(points: &[Point]) -> Normal {
    let (normal, count) = points
        .iter()
        .circular_tuple_windows::<(_, _, _)>()
        .map(|(p0, p1, p2)| orthogonal(p0, p1, p2))
        .filter(|normal| EPSILON <= normal.mag_sq())
        .fold((Vector::zero(), 0usize), |(sum, count), normal| {
            (sum + normal / normal.mag(), count + 1)
        });

    if 0 == count {
        Vector::zero()
    } else {
        (normal / count as f32).normalized()
    }
}

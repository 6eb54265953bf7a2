//! # Wavefront OBJ Export
//!
//! Writes refined meshes as `v`/`f` records. Face indices are 1-based, as
//! the format requires.
//!
//! ```
//! use subdiv_petite::obj_export::to_obj_string;
//!
//! let obj = to_obj_string(
//!     "quad",
//!     &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
//!     &[[0u32, 1, 2, 3]],
//! )?;
//! assert!(obj.ends_with("f 1 2 3 4\n"));
//! # Ok::<(), subdiv_petite::Error>(())
//! ```
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{Error, Result};

/// Renders `points` and `faces` as OBJ text.
///
/// Fails with [`Error::IndexOutOfBounds`] if a face refers to a point that
/// does not exist.
pub fn to_obj_string<F: AsRef<[u32]>>(
    name: &str,
    points: &[[f32; 3]],
    faces: &[F],
) -> Result<String> {
    check_indices(points, faces)?;

    let mut obj = String::new();
    writeln!(obj, "# {} vertices, {} faces", points.len(), faces.len())?;
    writeln!(obj, "o {}", name)?;

    for [x, y, z] in points {
        writeln!(obj, "v {} {} {}", x, y, z)?;
    }

    for face in faces {
        obj.push('f');
        for index in face.as_ref() {
            write!(obj, " {}", index + 1)?;
        }
        obj.push('\n');
    }

    Ok(obj)
}

/// Writes `points` and `faces` as OBJ text to `writer`.
pub fn write_obj<W: Write, F: AsRef<[u32]>>(
    mut writer: W,
    name: &str,
    points: &[[f32; 3]],
    faces: &[F],
) -> Result<()> {
    writer.write_all(to_obj_string(name, points, faces)?.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Writes `points` and `faces` to a new OBJ file at `path`.
pub fn write_obj_file<F: AsRef<[u32]>>(
    path: impl AsRef<Path>,
    name: &str,
    points: &[[f32; 3]],
    faces: &[F],
) -> Result<()> {
    // Validate before touching the file system.
    check_indices(points, faces)?;
    write_obj(BufWriter::new(File::create(path)?), name, points, faces)
}

fn check_indices<F: AsRef<[u32]>>(points: &[[f32; 3]], faces: &[F]) -> Result<()> {
    match faces
        .iter()
        .flat_map(|face| face.as_ref().iter())
        .find(|&&index| points.len() <= index as usize)
    {
        Some(&index) => Err(Error::IndexOutOfBounds {
            index: index as usize,
            max: points.len(),
        }),
        None => Ok(()),
    }
}

//! Matrix blob persistence (§6): a minimal self-describing binary layout
//! for IntensityMatrix / FrameTimeGrid artifacts, grounded on this
//! codebase's existing self-describing-tensor-blob reader (magic bytes,
//! version, endianness flag, dtype token, dimensions, little-endian
//! payload).

use std::fs::File;
use std::io::{Cursor, Read, Write};

use crate::error::{RestoreError, RestoreResult};
use crate::matrix::Matrix2D;

const MAGIC: [u8; 4] = *b"VXRM";
const VERSION: u32 = 1;
const ENDIANNESS_LITTLE: u8 = 0;
const DTYPE_F32: u8 = 0;

pub fn write_matrix(path: &str, matrix: &Matrix2D) -> RestoreResult<()> {
    let mut file = File::create(path)?;
    file.write_all(&MAGIC)?;
    file.write_all(&VERSION.to_le_bytes())?;
    file.write_all(&[ENDIANNESS_LITTLE, DTYPE_F32])?;
    file.write_all(&(matrix.rows() as u32).to_le_bytes())?;
    file.write_all(&(matrix.cols() as u32).to_le_bytes())?;
    for r in 0..matrix.rows() {
        for &v in matrix.row(r) {
            file.write_all(&v.to_le_bytes())?;
        }
    }
    Ok(())
}

pub fn read_matrix(path: &str) -> RestoreResult<Matrix2D> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    let mut cursor = Cursor::new(bytes);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(|_| RestoreError::CorruptBlob {
        reason: "blob shorter than header".to_string(),
    })?;
    if magic != MAGIC {
        return Err(RestoreError::CorruptBlob {
            reason: format!("bad magic: {magic:?}"),
        });
    }

    let version = read_u32(&mut cursor)?;
    if version != VERSION {
        return Err(RestoreError::CorruptBlob {
            reason: format!("unsupported version {version}"),
        });
    }

    let endianness = read_u8(&mut cursor)?;
    if endianness != ENDIANNESS_LITTLE {
        return Err(RestoreError::CorruptBlob {
            reason: format!("unsupported endianness flag {endianness}"),
        });
    }

    let dtype = read_u8(&mut cursor)?;
    let rows = read_u32(&mut cursor)? as usize;
    let cols = read_u32(&mut cursor)? as usize;

    let mut matrix = Matrix2D::filled(rows, cols, 0.0);
    for r in 0..rows {
        for c in 0..cols {
            let v = match dtype {
                DTYPE_F32 => read_f32(&mut cursor)?,
                1 => read_f64(&mut cursor)? as f32,
                other => {
                    return Err(RestoreError::CorruptBlob {
                        reason: format!("unknown dtype token {other}"),
                    })
                }
            };
            matrix.set(r, c, v);
        }
    }
    Ok(matrix)
}

/// Writes a 1D vector as the degenerate `(F, 1)` case of the matrix blob.
pub fn write_vector(path: &str, values: &[f32]) -> RestoreResult<()> {
    let rows: Vec<Vec<f32>> = values.iter().map(|&v| vec![v]).collect();
    write_matrix(path, &Matrix2D::from_rows(rows))
}

pub fn read_vector(path: &str) -> RestoreResult<Vec<f32>> {
    let matrix = read_matrix(path)?;
    Ok((0..matrix.rows()).map(|r| matrix.get(r, 0)).collect())
}

fn read_u32(cursor: &mut Cursor<Vec<u8>>) -> RestoreResult<u32> {
    let mut buf = [0u8; 4];
    cursor.read_exact(&mut buf).map_err(|_| RestoreError::CorruptBlob {
        reason: "unexpected end of blob reading u32".to_string(),
    })?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u8(cursor: &mut Cursor<Vec<u8>>) -> RestoreResult<u8> {
    let mut buf = [0u8; 1];
    cursor.read_exact(&mut buf).map_err(|_| RestoreError::CorruptBlob {
        reason: "unexpected end of blob reading u8".to_string(),
    })?;
    Ok(buf[0])
}

fn read_f32(cursor: &mut Cursor<Vec<u8>>) -> RestoreResult<f32> {
    let mut buf = [0u8; 4];
    cursor.read_exact(&mut buf).map_err(|_| RestoreError::CorruptBlob {
        reason: "unexpected end of blob reading f32".to_string(),
    })?;
    Ok(f32::from_le_bytes(buf))
}

fn read_f64(cursor: &mut Cursor<Vec<u8>>) -> RestoreResult<f64> {
    let mut buf = [0u8; 8];
    cursor.read_exact(&mut buf).map_err(|_| RestoreError::CorruptBlob {
        reason: "unexpected end of blob reading f64".to_string(),
    })?;
    Ok(f64::from_le_bytes(buf))
}

//! Row-major source matrices -> column-major mesh matrices
//!
//! Scene importers hand out matrices in row-major order (`a1..a4` is the first
//! row, translation lives in `a4, b4, c4`). The mesh record stores column-major
//! `glam::Mat4`. The conversion only moves values to new storage positions,
//! nothing is recomputed.

use glam::Mat4;

use crate::scene::SourceMatrix;

/// Flatten a row-major matrix into column-major order
///
/// `out[0..4]` is `a1, b1, c1, d1`, `out[4..8]` is `a2, b2, c2, d2`, and so on.
pub fn to_column_major(src: &SourceMatrix) -> [f32; 16] {
    let mut out = [0.0f32; 16];
    for (row, values) in src.rows.iter().enumerate() {
        for (col, &v) in values.iter().enumerate() {
            out[col * 4 + row] = v;
        }
    }
    out
}

/// Inverse of [`to_column_major`]
pub fn from_column_major(cols: &[f32; 16]) -> SourceMatrix {
    let mut rows = [[0.0f32; 4]; 4];
    for (i, &v) in cols.iter().enumerate() {
        rows[i % 4][i / 4] = v;
    }
    SourceMatrix { rows }
}

/// Convert a source matrix to the mesh matrix type
pub fn to_mat4(src: &SourceMatrix) -> Mat4 {
    Mat4::from_cols_array(&to_column_major(src))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn numbered() -> SourceMatrix {
        // a1 = 1, a2 = 2, ... d4 = 16
        SourceMatrix {
            rows: [
                [1.0, 2.0, 3.0, 4.0],
                [5.0, 6.0, 7.0, 8.0],
                [9.0, 10.0, 11.0, 12.0],
                [13.0, 14.0, 15.0, 16.0],
            ],
        }
    }

    #[test]
    fn test_column_major_layout() {
        let out = to_column_major(&numbered());
        assert_eq!(
            out,
            [
                1.0, 5.0, 9.0, 13.0, // column 1: a1 b1 c1 d1
                2.0, 6.0, 10.0, 14.0, // column 2
                3.0, 7.0, 11.0, 15.0, // column 3
                4.0, 8.0, 12.0, 16.0, // column 4
            ]
        );
    }

    #[test]
    fn test_roundtrip_is_bit_exact() {
        let src = SourceMatrix {
            rows: [
                [0.1, -0.0, f32::MIN_POSITIVE, 1.0e-30],
                [std::f32::consts::PI, 7.25, -3.5, 1.0e30],
                [0.3, 0.2, 0.1, -9.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        };
        let back = from_column_major(&to_column_major(&src));
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(back.rows[r][c].to_bits(), src.rows[r][c].to_bits());
            }
        }
    }

    #[test]
    fn test_translation_lands_in_last_column() {
        let src = SourceMatrix {
            rows: [
                [1.0, 0.0, 0.0, 3.0],
                [0.0, 1.0, 0.0, 4.0],
                [0.0, 0.0, 1.0, 5.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        };
        let m = to_mat4(&src);
        assert_eq!(m, Mat4::from_translation(Vec3::new(3.0, 4.0, 5.0)));
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_identity() {
        assert_eq!(to_mat4(&SourceMatrix::IDENTITY), Mat4::IDENTITY);
    }
}

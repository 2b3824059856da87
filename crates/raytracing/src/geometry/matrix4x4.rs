use std::ops::{Index, IndexMut};

use super::Vec3;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4x4 {
    // row-major
    pub data: [[f32; 4]; 4],
}

impl Index<usize> for Matrix4x4 {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index / 4][index % 4]
    }
}

impl IndexMut<usize> for Matrix4x4 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index / 4][index % 4]
    }
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4::identity()
    }
}

impl Matrix4x4 {
    pub fn identity() -> Self {
        Matrix4x4 {
            data: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub fn create(a11: f32, a12: f32, a13: f32, a14: f32,
                  a21: f32, a22: f32, a23: f32, a24: f32,
                  a31: f32, a32: f32, a33: f32, a34: f32,
                  a41: f32, a42: f32, a43: f32, a44: f32) -> Self {
        Matrix4x4 {
            data: [[a11, a12, a13, a14],
                   [a21, a22, a23, a24],
                   [a31, a32, a33, a34],
                   [a41, a42, a43, a44]]
        }
    }

    /// Gauss-Jordan elimination with partial pivoting.
    /// Returns `None` when the matrix is singular (or numerically indistinguishable from it).
    pub fn invert(&self) -> Option<Self> {
        const PIVOT_EPSILON: f64 = 1e-12;

        // work in f64, the compiled output is f32 anyway
        let mut a = [[0.0f64; 4]; 4];
        let mut inv = [[0.0f64; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                a[i][j] = self.data[i][j] as f64;
            }
            inv[i][i] = 1.0;
        }

        for column in 0..4 {
            let pivot_row = (column..4)
                .max_by(|&r0, &r1| a[r0][column].abs().total_cmp(&a[r1][column].abs()))?;

            if a[pivot_row][column].abs() < PIVOT_EPSILON {
                return None;
            }

            a.swap(column, pivot_row);
            inv.swap(column, pivot_row);

            let pivot = a[column][column];
            for j in 0..4 {
                a[column][j] /= pivot;
                inv[column][j] /= pivot;
            }

            for row in 0..4 {
                if row == column {
                    continue;
                }
                let factor = a[row][column];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..4 {
                    a[row][j] -= factor * a[column][j];
                    inv[row][j] -= factor * inv[column][j];
                }
            }
        }

        let mut result = Matrix4x4::identity();
        for i in 0..4 {
            for j in 0..4 {
                result.data[i][j] = inv[i][j] as f32;
            }
        }

        if result.data.iter().flatten().all(|v| v.is_finite()) {
            Some(result)
        } else {
            None
        }
    }

    pub fn matmul(a: Matrix4x4, b: Matrix4x4) -> Self {
        let mut m = Matrix4x4::identity();
        for i in 0..4 {
            for j in 0..4 {
                let mut dot = 0.0;
                for k in 0..4 {
                    dot += a.data[i][k] * b.data[k][j]
                }
                m.data[i][j] = dot;
            }
        }
        m
    }

    pub fn transposed(&self) -> Matrix4x4 {
        let mut me = *self;
        for i in 0..4 {
            for j in 0..i {
                me.data[i][j] = self.data[j][i];
                me.data[j][i] = self.data[i][j];
            }
        }
        me
    }

    pub fn translation(direction: Vec3) -> Matrix4x4 {
        let mut me = Self::identity();
        me.data[0][3] = direction.0;
        me.data[1][3] = direction.1;
        me.data[2][3] = direction.2;

        me
    }

    pub fn scale(scale: Vec3) -> Matrix4x4 {
        let mut me = Self::identity();
        me.data[0][0] = scale.0;
        me.data[1][1] = scale.1;
        me.data[2][2] = scale.2;

        me
    }

    // counterclockwise rotation of theta radians about a (not necessarily normalized) axis
    pub fn rotation(theta: f32, axis: Vec3) -> Matrix4x4 {
        let Vec3(x, y, z) = Vec3::normalized(axis);
        let (sin, cos) = theta.sin_cos();
        let k = 1.0 - cos;

        #[rustfmt::skip]
        let rotation = Matrix4x4::create(
            cos + x * x * k,     x * y * k - z * sin, x * z * k + y * sin, 0.0,
            y * x * k + z * sin, cos + y * y * k,     y * z * k - x * sin, 0.0,
            z * x * k - y * sin, z * y * k + x * sin, cos + z * z * k,     0.0,
            0.0,                 0.0,                 0.0,                 1.0,
        );
        rotation
    }

    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        let row = |r: [f32; 4]| r[0] * p.0 + r[1] * p.1 + r[2] * p.2 + r[3];
        let w = row(self.data[3]);
        Vec3(row(self.data[0]) / w, row(self.data[1]) / w, row(self.data[2]) / w)
    }

    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        let row = |r: [f32; 4]| r[0] * v.0 + r[1] * v.1 + r[2] * v.2;
        Vec3(row(self.data[0]), row(self.data[1]), row(self.data[2]))
    }

    pub fn to_row_major(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (i, value) in self.data.iter().flatten().enumerate() {
            out[i] = *value;
        }
        out
    }
}

// assumes row major
impl From<[f32; 16]> for Matrix4x4 {
    fn from(value: [f32; 16]) -> Self {
        let mut me = Matrix4x4::identity();
        for (i, v) in value.into_iter().enumerate() {
            me[i] = v;
        }
        me
    }
}

impl From<[[f32; 4]; 4]> for Matrix4x4 {
    fn from(value: [[f32; 4]; 4]) -> Self {
        Self { data: value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: Matrix4x4, b: Matrix4x4) {
        for i in 0..16 {
            assert!((a[i] - b[i]).abs() < 1e-5, "element {i}: {} != {}", a[i], b[i]);
        }
    }

    #[test]
    fn invert_translation_and_scale() {
        let m = Matrix4x4::matmul(
            Matrix4x4::translation(Vec3(1.0, -2.0, 3.0)),
            Matrix4x4::scale(Vec3(2.0, 4.0, 0.5)),
        );
        let inv = m.invert().unwrap();
        assert_near(Matrix4x4::matmul(m, inv), Matrix4x4::identity());
        assert_near(Matrix4x4::matmul(inv, m), Matrix4x4::identity());
    }

    #[test]
    fn invert_rotation_is_transpose() {
        let m = Matrix4x4::rotation(0.7, Vec3(1.0, 2.0, -1.0));
        assert_near(m.invert().unwrap(), m.transposed());
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Matrix4x4::scale(Vec3(1.0, 0.0, 1.0));
        assert!(m.invert().is_none());
    }

    #[test]
    fn row_major_round_trip() {
        let values: [f32; 16] = std::array::from_fn(|i| i as f32);
        let m = Matrix4x4::from(values);
        assert_eq!(m.data[1][2], 6.0);
        assert_eq!(m.to_row_major(), values);
    }

    #[test]
    fn translation_moves_points_not_vectors() {
        let m = Matrix4x4::translation(Vec3(1.0, 1.0, 1.0));
        assert_eq!(m.apply_point(Vec3(1.0, 2.0, 3.0)), Vec3(2.0, 3.0, 4.0));
        assert_eq!(m.apply_vector(Vec3(1.0, 2.0, 3.0)), Vec3(1.0, 2.0, 3.0));
    }
}

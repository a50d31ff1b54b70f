use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Vector arrays have mismatched lengths ({left} vs {right})")]
    ShapeMismatch { left: usize, right: usize },

    #[error("Cannot normalise zero-length or non-finite {what} vector")]
    DegenerateVector { what: &'static str },
}

fn check_shapes<A, B>(a: &[A], b: &[B]) -> Result<(), GeometryError> {
    if a.len() != b.len() {
        return Err(GeometryError::ShapeMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Elementwise cross product of two arrays of 3-vectors.
pub fn cross(a: &[Vector3<f64>], b: &[Vector3<f64>]) -> Result<Vec<Vector3<f64>>, GeometryError> {
    check_shapes(a, b)?;
    Ok(a.iter().zip(b).map(|(u, v)| u.cross(v)).collect())
}

/// Elementwise dot product of two arrays of 3-vectors.
pub fn dot(a: &[Vector3<f64>], b: &[Vector3<f64>]) -> Result<Vec<f64>, GeometryError> {
    check_shapes(a, b)?;
    Ok(a.iter().zip(b).map(|(u, v)| u.dot(v)).collect())
}

/// Euclidean norm of every vector in the array.
pub fn norm(a: &[Vector3<f64>]) -> Vec<f64> {
    a.iter().map(|v| v.norm()).collect()
}

/// Normalises `v`, refusing zero-length and non-finite input.
pub fn unit(v: &Vector3<f64>, what: &'static str) -> Result<Vector3<f64>, GeometryError> {
    let length = v.norm();
    if length == 0.0 || !length.is_finite() {
        return Err(GeometryError::DegenerateVector { what });
    }
    Ok(v / length)
}

/// Rotation about the z axis that brings the xy-projection of `vector` onto +x.
///
/// The angle is `c = -atan2(y, x)`; a vector parallel to z yields the identity.
pub fn rotation_to_x(vector: &Vector3<f64>) -> Result<Rotation3<f64>, GeometryError> {
    let normalised = unit(vector, "x-alignment")?;
    let c = -normalised.y.atan2(normalised.x);
    let (sin_c, cos_c) = c.sin_cos();

    Ok(Rotation3::from_matrix_unchecked(Matrix3::new(
        cos_c, -sin_c, 0.0, //
        sin_c, cos_c, 0.0, //
        0.0, 0.0, 1.0,
    )))
}

/// Rotation `Ry(b) * Rx(a)` that brings `vector` onto +z.
///
/// `a = atan2(y, z)` and `b = atan(-x / hypot(y, z))`. The second angle uses
/// the single-argument arctangent; this must stay as it is, including its
/// behaviour when `y = z = 0`, for twist values to match existing WrLINE output.
pub fn rotation_to_z(vector: &Vector3<f64>) -> Result<Rotation3<f64>, GeometryError> {
    let normalised = unit(vector, "z-alignment")?;

    let a = normalised.y.atan2(normalised.z);
    let b = (-normalised.x / (normalised.y.powi(2) + normalised.z.powi(2)).sqrt()).atan();
    let (sin_a, cos_a) = a.sin_cos();
    let (sin_b, cos_b) = b.sin_cos();

    let rotate_x = Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, cos_a, -sin_a, //
        0.0, sin_a, cos_a,
    );
    let rotate_y = Matrix3::new(
        cos_b, 0.0, sin_b, //
        0.0, 1.0, 0.0, //
        -sin_b, 0.0, cos_b,
    );

    Ok(Rotation3::from_matrix_unchecked(rotate_y * rotate_x))
}

/// Local twist, in degrees, between the vectors `a1 -> a2` and `b1 -> b2`
/// viewed down the reference axis `z`.
///
/// Both vectors are first rotated into the frame whose z axis is `z`, then about
/// that axis until `a` lies on +x; the twist is the polar angle of `b` in that
/// frame, in `(-180, 180]`. Positive values mean `b` is counter-clockwise of `a`.
pub fn twist(
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
    z: &Vector3<f64>,
) -> Result<f64, GeometryError> {
    let unit_a = unit(&(a2 - a1), "first base-pair")?;
    let unit_b = unit(&(b2 - b1), "second base-pair")?;
    let unit_z = unit(z, "helix-axis")?;

    let to_z = rotation_to_z(&unit_z)?;
    let unit_a = to_z * unit_a;
    let unit_b = to_z * unit_b;

    let rotated_b = rotation_to_x(&unit_a)? * unit_b;
    Ok(rotated_b.y.atan2(rotated_b.x).to_degrees())
}

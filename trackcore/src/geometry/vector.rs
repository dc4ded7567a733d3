use nalgebra::{Vector2, Vector3};

pub fn dot2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.dot(b)
}

pub fn dot3(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b)
}

pub fn norm2(v: &Vector2<f64>) -> f64 {
    v.norm()
}

pub fn norm3(v: &Vector3<f64>) -> f64 {
    v.norm()
}

/// Angle in radians recovered from a dot product and the two vector norms.
///
/// The cosine is clipped to `[-1, 1]` before the arccosine so rounding drift on
/// (anti)parallel vectors cannot produce NaN. Returns `None` when either vector
/// has zero length or the cosine is not finite.
pub fn clipped_angle(dot: f64, norm_a: f64, norm_b: f64) -> Option<f64> {
    let denom = norm_a * norm_b;
    if denom == 0.0 {
        return None;
    }
    let cos = dot / denom;
    if !cos.is_finite() {
        return None;
    }
    Some(cos.clamp(-1.0, 1.0).acos())
}

/// Angle between two 3-D vectors, see [`clipped_angle`].
pub fn angle3(a: &Vector3<f64>, b: &Vector3<f64>) -> Option<f64> {
    clipped_angle(dot3(a, b), norm3(a), norm3(b))
}

/// Angle between two 2-D vectors, see [`clipped_angle`].
pub fn angle2(a: &Vector2<f64>, b: &Vector2<f64>) -> Option<f64> {
    clipped_angle(dot2(a, b), norm2(a), norm2(b))
}

use crate::field::Field;

/// Total dye: sum over texels of the rgb magnitude.
pub fn dye_mass(dye: &Field) -> f32 {
    let mut sum = 0.0f64;
    for j in 0..dye.height() {
        for i in 0..dye.width() {
            let c = dye.get(i, j);
            sum += ((c[0] * c[0] + c[1] * c[1] + c[2] * c[2]) as f64).sqrt();
        }
    }
    sum as f32
}

/// Sum of |v| over all texels.
pub fn velocity_magnitude_sum(velocity: &Field) -> f32 {
    let mut sum = 0.0f64;
    for j in 0..velocity.height() {
        for i in 0..velocity.width() {
            let v = velocity.get(i, j);
            sum += ((v[0] * v[0] + v[1] * v[1]) as f64).sqrt();
        }
    }
    sum as f32
}

/// L2 norm of the central-difference divergence, measured the same way the
/// divergence kernel does.
pub fn divergence_l2(velocity: &Field) -> f32 {
    let mut sum = 0.0f64;
    for j in 0..velocity.height() as isize {
        for i in 0..velocity.width() as isize {
            let l = velocity.fetch(i - 1, j)[0];
            let r = velocity.fetch(i + 1, j)[0];
            let b = velocity.fetch(i, j - 1)[1];
            let t = velocity.fetch(i, j + 1)[1];
            let div = 0.5 * (r - l + t - b) as f64;
            sum += div * div;
        }
    }
    sum.sqrt() as f32
}

/// Largest absolute component value.
pub fn max_abs(field: &Field) -> f32 {
    field.data().iter().fold(0.0f32, |m, &v| m.max(v.abs()))
}

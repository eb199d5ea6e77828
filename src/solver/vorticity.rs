use crate::field::Field;

/// Guard added to |grad |curl|| before normalizing.
const NORMAL_EPSILON: f32 = 1e-5;

/// Curl: omega = dvy/dx - dvx/dy, undivided central differences.
pub fn curl(velocity: &Field, out: &mut Field) {
    out.fill_with(|i, j| {
        let (i, j) = (i as isize, j as isize);
        let l = velocity.fetch(i - 1, j)[1];
        let r = velocity.fetch(i + 1, j)[1];
        let b = velocity.fetch(i, j - 1)[0];
        let t = velocity.fetch(i, j + 1)[0];
        [r - l - t + b, 0.0, 0.0, 0.0]
    });
}

/// Vorticity confinement: f = strength * omega * (N x z), where N is the
/// normalized gradient of |omega|. Adds `dt * f` to velocity.
pub fn confine(velocity: &Field, curl: &Field, out: &mut Field, strength: f32, dt: f32) {
    out.fill_with(|i, j| {
        let (ii, jj) = (i as isize, j as isize);
        let l = curl.fetch(ii - 1, jj)[0].abs();
        let r = curl.fetch(ii + 1, jj)[0].abs();
        let b = curl.fetch(ii, jj - 1)[0].abs();
        let t = curl.fetch(ii, jj + 1)[0].abs();
        let w = curl.get(i, j)[0];

        let eta_x = r - l;
        let eta_y = t - b;
        let len = (eta_x * eta_x + eta_y * eta_y).sqrt() + NORMAL_EPSILON;
        let norm_x = eta_x / len;
        let norm_y = eta_y / len;

        // 2D cross product: f_x = ny * omega, f_y = -nx * omega.
        // Symmetric form with the guard on the length, not the per-component shader variant.
        let v = velocity.get(i, j);
        [
            v[0] + dt * strength * norm_y * w,
            v[1] - dt * strength * norm_x * w,
            0.0,
            0.0,
        ]
    });
}

use crate::field::Field;
use super::kernels::Launch;

/// Add a Gaussian impulse centered at normalized `point`:
/// `out = target + color * exp(-|p - point|^2 / radius)`.
///
/// The horizontal offset is scaled by the surface aspect so the footprint is
/// round on screen. The fourth channel (when stored) is set to 1.
pub fn splat(
    launch: &Launch,
    target: &Field,
    out: &mut Field,
    point: (f32, f32),
    color: [f32; 3],
    radius: f32,
) {
    let size = launch.size;
    let aspect = launch.aspect;
    out.fill_with(|i, j| {
        let (u, v) = size.texel_center(i, j);
        let px = (u - point.0) * aspect;
        let py = v - point.1;
        let g = (-(px * px + py * py) / radius).exp();
        let base = target.get(i, j);
        [
            base[0] + color[0] * g,
            base[1] + color[1] * g,
            base[2] + color[2] * g,
            1.0,
        ]
    });
}

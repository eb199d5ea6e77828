use crate::buffer::GridBuffer;
use crate::field::Field;
use super::kernels::Launch;

/// Semi-Lagrangian advection: traces each texel center backwards through
/// `velocity`, bilinearly samples `source` there and applies `dissipation`.
/// Velocity is in texels per second, so the trace is scaled by the texel size.
pub fn advect(
    launch: &Launch,
    velocity: &Field,
    source: &Field,
    out: &mut Field,
    dt: f32,
    dissipation: f32,
) {
    let size = launch.size;
    let (tx, ty) = launch.texel;
    out.fill_with(|i, j| {
        let (u, v) = size.texel_center(i, j);
        let vel = velocity.get(i, j);
        let s = source.sample(u - dt * vel[0] * tx, v - dt * vel[1] * ty);
        [
            s[0] * dissipation,
            s[1] * dissipation,
            s[2] * dissipation,
            s[3] * dissipation,
        ]
    });
}

/// Central-difference divergence at unit texel spacing.
pub fn divergence(velocity: &Field, out: &mut Field) {
    out.fill_with(|i, j| {
        let (i, j) = (i as isize, j as isize);
        let l = velocity.fetch(i - 1, j)[0];
        let r = velocity.fetch(i + 1, j)[0];
        let b = velocity.fetch(i, j - 1)[1];
        let t = velocity.fetch(i, j + 1)[1];
        [0.5 * (r - l + t - b), 0.0, 0.0, 0.0]
    });
}

/// One Jacobi relaxation sweep of the pressure Poisson equation.
pub fn pressure_jacobi(pressure: &Field, divergence: &Field, out: &mut Field) {
    out.fill_with(|i, j| {
        let (ii, jj) = (i as isize, j as isize);
        let l = pressure.fetch(ii - 1, jj)[0];
        let r = pressure.fetch(ii + 1, jj)[0];
        let b = pressure.fetch(ii, jj - 1)[0];
        let t = pressure.fetch(ii, jj + 1)[0];
        let div = divergence.get(i, j)[0];
        [0.25 * (l + r + b + t - div), 0.0, 0.0, 0.0]
    });
}

/// Fixed-count Jacobi solve, swapping `pressure` after every sweep.
/// The previous frame's pressure is the initial guess.
pub fn solve_pressure(pressure: &mut GridBuffer, divergence: &Field, iterations: usize) {
    for _ in 0..iterations {
        let (read, write) = pressure.split();
        pressure_jacobi(read, divergence, write);
        pressure.swap();
    }
}

/// Projection: subtract the pressure gradient from velocity.
pub fn subtract_gradient(pressure: &Field, velocity: &Field, out: &mut Field) {
    out.fill_with(|i, j| {
        let (ii, jj) = (i as isize, j as isize);
        let l = pressure.fetch(ii - 1, jj)[0];
        let r = pressure.fetch(ii + 1, jj)[0];
        let b = pressure.fetch(ii, jj - 1)[0];
        let t = pressure.fetch(ii, jj + 1)[0];
        let v = velocity.get(i, j);
        [v[0] - 0.5 * (r - l), v[1] - 0.5 * (t - b), 0.0, 0.0]
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Channels, GridSize};
    use crate::solver::diagnostics::divergence_l2;

    const N: usize = 48;

    fn grid() -> GridSize {
        GridSize::new(N, N)
    }

    /// Radial outflow from the grid center, Gaussian envelope.
    fn source_flow(size: GridSize) -> Field {
        let mut v = Field::new(size, Channels::Two);
        let c = size.width as f32 / 2.0;
        let sigma2 = 36.0;
        v.fill_with(|i, j| {
            let dx = i as f32 + 0.5 - c;
            let dy = j as f32 + 0.5 - c;
            let g = (-(dx * dx + dy * dy) / sigma2).exp();
            [dx * g, dy * g, 0.0, 0.0]
        });
        v
    }

    fn project(velocity: &Field, iterations: usize) -> Field {
        let size = velocity.size();
        let mut div = Field::new(size, Channels::One);
        divergence(velocity, &mut div);
        let mut pressure = GridBuffer::new(size, Channels::One);
        solve_pressure(&mut pressure, &div, iterations);
        let mut out = Field::new(size, Channels::Two);
        subtract_gradient(pressure.read(), velocity, &mut out);
        out
    }

    #[test]
    fn test_advect_zero_velocity_preserves() {
        let size = grid();
        let launch = Launch::new(size, 1.0);
        let velocity = Field::new(size, Channels::Two);
        let mut source = Field::new(size, Channels::Four);
        source.fill_with(|i, j| [i as f32, j as f32, 1.0, 0.5]);
        let mut out = Field::new(size, Channels::Four);
        advect(&launch, &velocity, &source, &mut out, 0.016, 1.0);
        for j in 0..N {
            for i in 0..N {
                let a = source.get(i, j);
                let b = out.get(i, j);
                for k in 0..4 {
                    assert!((a[k] - b[k]).abs() < 1e-4, "({i},{j})[{k}]: {} vs {}", a[k], b[k]);
                }
            }
        }
    }

    #[test]
    fn test_advect_uniform_field_applies_dissipation() {
        let size = grid();
        let launch = Launch::new(size, 1.0);
        let mut velocity = Field::new(size, Channels::Two);
        velocity.fill_with(|_, _| [40.0, -25.0, 0.0, 0.0]);
        let mut source = Field::new(size, Channels::One);
        source.fill_with(|_, _| [2.0, 0.0, 0.0, 0.0]);
        let mut out = Field::new(size, Channels::One);
        advect(&launch, &velocity, &source, &mut out, 0.016, 0.98);
        for &v in out.data() {
            assert!((v - 1.96).abs() < 1e-5, "got {v}");
        }
    }

    #[test]
    fn test_advect_shifts_along_velocity() {
        let size = grid();
        let launch = Launch::new(size, 1.0);
        let mut velocity = Field::new(size, Channels::Two);
        // one texel per step to the right
        velocity.fill_with(|_, _| [1.0 / 0.016, 0.0, 0.0, 0.0]);
        let mut source = Field::new(size, Channels::One);
        source.set(10, 20, [1.0, 0.0, 0.0, 0.0]);
        let mut out = Field::new(size, Channels::One);
        advect(&launch, &velocity, &source, &mut out, 0.016, 1.0);
        assert!((out.get(11, 20)[0] - 1.0).abs() < 1e-4, "moved value {}", out.get(11, 20)[0]);
        assert!(out.get(10, 20)[0].abs() < 1e-4);
    }

    #[test]
    fn test_advect_clamps_at_edges() {
        let size = grid();
        let launch = Launch::new(size, 1.0);
        let mut velocity = Field::new(size, Channels::Two);
        velocity.fill_with(|_, _| [1.0e6, 1.0e6, 0.0, 0.0]);
        let mut source = Field::new(size, Channels::One);
        source.fill_with(|i, j| [(i + j) as f32, 0.0, 0.0, 0.0]);
        let mut out = Field::new(size, Channels::One);
        advect(&launch, &velocity, &source, &mut out, 0.016, 1.0);
        // every trace leaves through the bottom-left corner
        for &v in out.data() {
            assert!(v.abs() < 1e-4, "expected corner value 0, got {v}");
        }
    }

    #[test]
    fn test_divergence_of_linear_field() {
        let size = grid();
        let mut velocity = Field::new(size, Channels::Two);
        velocity.fill_with(|i, j| [2.0 * i as f32, -0.5 * j as f32, 0.0, 0.0]);
        let mut div = Field::new(size, Channels::One);
        divergence(&velocity, &mut div);
        let d = div.get(N / 2, N / 2)[0];
        assert!((d - 1.5).abs() < 1e-4, "interior divergence {d}");
    }

    #[test]
    fn test_divergence_of_uniform_field_is_zero() {
        let size = grid();
        let mut velocity = Field::new(size, Channels::Two);
        velocity.fill_with(|_, _| [3.0, -7.0, 0.0, 0.0]);
        let mut div = Field::new(size, Channels::One);
        divergence(&velocity, &mut div);
        assert!(div.data().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_jacobi_sweep_matches_stencil() {
        let size = GridSize::new(5, 5);
        let mut p = Field::new(size, Channels::One);
        p.set(1, 2, [1.0, 0.0, 0.0, 0.0]);
        p.set(3, 2, [2.0, 0.0, 0.0, 0.0]);
        p.set(2, 1, [3.0, 0.0, 0.0, 0.0]);
        p.set(2, 3, [4.0, 0.0, 0.0, 0.0]);
        let mut div = Field::new(size, Channels::One);
        div.set(2, 2, [2.0, 0.0, 0.0, 0.0]);
        let mut out = Field::new(size, Channels::One);
        pressure_jacobi(&p, &div, &mut out);
        assert!((out.get(2, 2)[0] - 2.0).abs() < 1e-6, "got {}", out.get(2, 2)[0]);
    }

    #[test]
    fn test_solve_pressure_swaps_each_iteration() {
        let size = grid();
        let div = Field::new(size, Channels::One);
        let mut pressure = GridBuffer::new(size, Channels::One);
        let slot = pressure.read_slot();
        solve_pressure(&mut pressure, &div, 3);
        assert_ne!(pressure.read_slot(), slot);
        solve_pressure(&mut pressure, &div, 1);
        assert_eq!(pressure.read_slot(), slot);
    }

    #[test]
    fn test_projection_reduces_divergence() {
        let velocity = source_flow(grid());
        let before = divergence_l2(&velocity);
        assert!(before > 0.0, "should have some initial divergence");
        let after = divergence_l2(&project(&velocity, 20));
        assert!(after < before, "divergence should shrink: before={before}, after={after}");
    }

    #[test]
    fn test_projection_improves_with_iterations() {
        let velocity = source_flow(grid());
        let mut last = f32::INFINITY;
        for iterations in [0, 5, 20, 50] {
            let d = divergence_l2(&project(&velocity, iterations));
            assert!(d < last, "{iterations} iterations: {d} not below {last}");
            last = d;
        }
    }

    #[test]
    fn test_subtract_zero_pressure_is_identity() {
        let velocity = source_flow(grid());
        let pressure = Field::new(grid(), Channels::One);
        let mut out = Field::new(grid(), Channels::Two);
        subtract_gradient(&pressure, &velocity, &mut out);
        assert_eq!(out, velocity);
    }
}

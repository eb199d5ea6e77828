use crate::error::FluidError;

/// Solver parameters for the dye simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverParams {
    /// Fixed timestep; the simulation assumes 60Hz and ignores measured frame time.
    pub dt: f32,
    /// Jacobi iterations per frame. No convergence check is made.
    pub pressure_iterations: usize,
    /// Per-frame multiplier applied while advecting velocity.
    pub velocity_dissipation: f32,
    /// Per-frame multiplier applied while advecting dye.
    pub dye_dissipation: f32,
    /// Vorticity confinement strength.
    pub curl: f32,
    /// Gaussian falloff denominator, in normalized units squared.
    pub splat_radius: f32,
    /// Pointer delta (normalized) -> velocity impulse multiplier.
    pub splat_force: f32,
    pub vorticity: bool,
    pub advection: bool,
    pub projection: bool,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            dt: 0.016,
            pressure_iterations: 20,
            velocity_dissipation: 0.99,
            dye_dissipation: 0.98,
            curl: 30.0,
            splat_radius: 0.01,
            splat_force: 500.0,
            vorticity: true,
            advection: true,
            projection: true,
        }
    }
}

impl SolverParams {
    /// Splat-and-display pipeline: no vorticity, advection or projection.
    pub fn minimal() -> Self {
        Self {
            splat_radius: 0.05,
            vorticity: false,
            advection: false,
            projection: false,
            ..Self::default()
        }
    }
}

fn invalid(name: &'static str, reason: String) -> FluidError {
    FluidError::InvalidParameter { name, reason }
}

impl SolverParams {
    /// Reject values that make the kernels produce NaN or grow without bound.
    pub fn validate(&self) -> Result<(), FluidError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(invalid("dt", format!("must be positive, got {}", self.dt)));
        }
        for (name, value) in [
            ("velocity_dissipation", self.velocity_dissipation),
            ("dye_dissipation", self.dye_dissipation),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(name, format!("must be in (0, 1], got {value}")));
            }
        }
        if !(self.splat_radius.is_finite() && self.splat_radius > 0.0) {
            return Err(invalid(
                "splat_radius",
                format!("must be positive, got {}", self.splat_radius),
            ));
        }
        if !(self.curl.is_finite() && self.curl >= 0.0) {
            return Err(invalid("curl", format!("must be non-negative, got {}", self.curl)));
        }
        if !self.splat_force.is_finite() {
            return Err(invalid("splat_force", format!("must be finite, got {}", self.splat_force)));
        }
        Ok(())
    }
}

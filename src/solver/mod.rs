mod core;
pub mod diagnostics;
mod display;
pub mod kernels;
mod params;
mod splat;
mod vorticity;

// Re-export public API
pub use self::core::{advect, divergence, pressure_jacobi, solve_pressure, subtract_gradient};
pub use display::{pack_rgb, present};
pub use kernels::{DeviceLimits, KernelSet, Launch};
pub use params::SolverParams;
pub use self::splat::splat;
pub use vorticity::{confine, curl};

use crate::error::FluidError;
use crate::field::GridSize;
use crate::input::{InputAdapter, PointerId, SplatRequest};
use crate::state::{FieldSet, ColorRng, DEFAULT_SEED};
use crate::surface::{FrameBuffer, SurfaceSize};

/// Solver lifecycle. `Stepping` only while [`Solver::step`] runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Stepping,
}

/// Result of one frame tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// Zero-area surface; nothing ran. The host retries next tick.
    Skipped,
    /// The last allocation failed; nothing runs until a resize succeeds.
    Halted,
}

/// Owns every field and kernel and runs the per-frame pipeline.
pub struct Solver {
    params: SolverParams,
    limits: DeviceLimits,
    /// Shorter-axis cell count; 0 tracks the surface size.
    resolution: usize,
    kernels: KernelSet,
    fields: FieldSet,
    input: InputAdapter,
    surface: SurfaceSize,
    rng: ColorRng,
    phase: Phase,
    /// Set when allocation or linking failed.
    halted: bool,
    frame: u64,
}

impl Solver {
    /// Compile the kernels, allocate the fields for `surface` and link.
    /// A degenerate surface defers allocation until the first real resize.
    pub fn new(
        params: SolverParams,
        resolution: usize,
        surface: SurfaceSize,
        limits: DeviceLimits,
    ) -> Result<Self, FluidError> {
        params.validate()?;
        let kernels = KernelSet::compile(&limits)?;
        let mut solver = Self {
            params,
            limits,
            resolution,
            kernels,
            fields: FieldSet::new(GridSize::default()),
            input: InputAdapter::new(surface),
            surface,
            rng: ColorRng::new(DEFAULT_SEED),
            phase: Phase::Idle,
            halted: false,
            frame: 0,
        };
        solver.allocate(surface)?;
        Ok(solver)
    }

    fn allocate(&mut self, surface: SurfaceSize) -> Result<(), FluidError> {
        let result = self.try_allocate(surface);
        self.halted = result.is_err();
        if let Err(e) = &result {
            log::warn!("stepping halted: {e}");
        }
        result
    }

    /// The grid is checked against the limits before any state changes.
    fn try_allocate(&mut self, surface: SurfaceSize) -> Result<(), FluidError> {
        let grid = surface.simulation_grid(self.resolution);
        if !grid.is_empty() {
            self.limits.check_grid(grid)?;
        }
        self.surface = surface;
        self.input.set_surface(surface);
        if grid.is_empty() {
            self.fields.resize(grid);
            log::info!(
                "surface {}x{} is degenerate; frames are skipped until resize",
                surface.width,
                surface.height
            );
            return Ok(());
        }
        self.fields.resize(grid);
        self.kernels.link(&self.fields, surface)?;
        log::info!(
            "allocated {}x{} simulation grid for {}x{} surface",
            grid.width,
            grid.height,
            surface.width,
            surface.height
        );
        Ok(())
    }

    /// Advance one frame and present the dye on `frame`.
    pub fn step(&mut self, frame: &mut FrameBuffer) -> FrameOutcome {
        if self.halted {
            return FrameOutcome::Halted;
        }
        if self.surface.is_degenerate() || self.fields.size().is_empty() {
            log::debug!("frame {}: degenerate surface, skipped", self.frame);
            return FrameOutcome::Skipped;
        }
        self.phase = Phase::Stepping;

        // 1. Pointer splats
        let splats = self.input.take_splats(self.params.splat_force, &mut self.rng);
        for request in &splats {
            self.splat(request);
        }

        let Self { params, kernels, fields, .. } = self;
        let dt = params.dt;

        // 2-3. Vorticity confinement
        if params.vorticity {
            curl(fields.velocity.read(), &mut fields.curl);
            let (read, write) = fields.velocity.split();
            confine(read, &fields.curl, write, params.curl, dt);
            fields.velocity.swap();
        }

        // 4-5. Self-advect velocity, then carry dye on the updated velocity
        if params.advection {
            let launch = kernels.advection.launch();
            let (read, write) = fields.velocity.split();
            advect(launch, read, read, write, dt, params.velocity_dissipation);
            fields.velocity.swap();

            let (read, write) = fields.dye.split();
            advect(launch, fields.velocity.read(), read, write, dt, params.dye_dissipation);
            fields.dye.swap();
        }

        // 6-8. Projection; pressure keeps last frame's solution as initial guess
        if params.projection {
            divergence(fields.velocity.read(), &mut fields.divergence);
            solve_pressure(&mut fields.pressure, &fields.divergence, params.pressure_iterations);
            let (read, write) = fields.velocity.split();
            subtract_gradient(fields.pressure.read(), read, write);
            fields.velocity.swap();
        }

        // 9. Display
        present(kernels.display.launch(), fields.dye.read(), frame);

        self.phase = Phase::Idle;
        self.frame += 1;
        FrameOutcome::Presented
    }

    /// Inject one impulse into velocity and dye.
    pub fn splat(&mut self, request: &SplatRequest) {
        if self.halted || self.fields.size().is_empty() {
            return;
        }
        let launch = *self.kernels.splat.launch();
        let radius = self.params.splat_radius;

        let (read, write) = self.fields.velocity.split();
        let impulse = [request.impulse.0, request.impulse.1, 0.0];
        splat::splat(&launch, read, write, request.position, impulse, radius);
        self.fields.velocity.swap();

        let (read, write) = self.fields.dye.split();
        splat::splat(&launch, read, write, request.position, request.color, radius);
        self.fields.dye.swap();
    }

    pub fn on_pointer_down(&mut self, id: PointerId, x: f32, y: f32) {
        self.input.pointer_down(id, x, y);
    }

    pub fn on_pointer_move(&mut self, id: PointerId, x: f32, y: f32) {
        self.input.pointer_move(id, x, y);
    }

    pub fn on_pointer_up(&mut self, id: PointerId) {
        self.input.pointer_up(id);
    }

    /// Reallocate for a new surface. All simulation state is lost.
    pub fn on_resize(&mut self, width: usize, height: usize) -> Result<(), FluidError> {
        log::debug!(
            "resize {}x{} -> {}x{}",
            self.surface.width,
            self.surface.height,
            width,
            height
        );
        self.allocate(SurfaceSize::new(width, height))
    }

    /// Zero every field without reallocating.
    pub fn reset(&mut self) {
        self.fields.clear();
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldSet {
        &mut self.fields
    }

    pub fn kernels(&self) -> &KernelSet {
        &self.kernels
    }

    pub fn input(&self) -> &InputAdapter {
        &self.input
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SolverParams {
        &mut self.params
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn grid(&self) -> GridSize {
        self.fields.size()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True after a failed resize, until a later one succeeds.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Frames presented so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}

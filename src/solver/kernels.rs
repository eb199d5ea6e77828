use crate::error::{FluidError, KernelStage};
use crate::field::{Channels, GridSize};
use crate::state::FieldSet;
use crate::surface::SurfaceSize;

/// Capabilities of the execution environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceLimits {
    pub max_texture_size: usize,
    /// Smallest grid the 3x3 stencils can run on.
    pub min_texture_size: usize,
    pub float_textures: bool,
    pub max_channels: usize,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_texture_size: 8192,
            min_texture_size: 3,
            float_textures: true,
            max_channels: 4,
        }
    }
}

impl DeviceLimits {
    /// Startup check of device features, independent of any grid.
    pub fn check_features(&self) -> Result<(), FluidError> {
        if !self.float_textures {
            return Err(FluidError::UnsupportedEnvironment(
                "floating-point textures are not supported".to_string(),
            ));
        }
        Ok(())
    }

    /// Grid dimensions must fit the texture limits.
    pub fn check_grid(&self, size: GridSize) -> Result<(), FluidError> {
        let (lo, hi) = (self.min_texture_size, self.max_texture_size);
        if size.width < lo || size.height < lo || size.width > hi || size.height > hi {
            return Err(FluidError::UnsupportedEnvironment(format!(
                "simulation grid {}x{} outside supported texture size range [{lo}, {hi}]",
                size.width, size.height
            )));
        }
        Ok(())
    }
}

/// Field a kernel reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSlot {
    Velocity,
    Dye,
    Divergence,
    Curl,
    Pressure,
}

impl FieldSlot {
    fn layout(self, fields: &FieldSet) -> (GridSize, Channels) {
        match self {
            FieldSlot::Velocity => (fields.velocity.size(), fields.velocity.channels()),
            FieldSlot::Dye => (fields.dye.size(), fields.dye.channels()),
            FieldSlot::Divergence => (fields.divergence.size(), fields.divergence.channels()),
            FieldSlot::Curl => (fields.curl.size(), fields.curl.channels()),
            FieldSlot::Pressure => (fields.pressure.size(), fields.pressure.channels()),
        }
    }
}

/// Static description of a kernel: its name and the field layouts it binds.
#[derive(Debug)]
pub struct Signature {
    pub name: &'static str,
    pub bindings: &'static [(FieldSlot, Channels)],
}

pub static ADVECTION: Signature = Signature {
    name: "advection",
    bindings: &[(FieldSlot::Velocity, Channels::Two), (FieldSlot::Dye, Channels::Four)],
};
pub static DIVERGENCE: Signature = Signature {
    name: "divergence",
    bindings: &[(FieldSlot::Velocity, Channels::Two), (FieldSlot::Divergence, Channels::One)],
};
pub static PRESSURE: Signature = Signature {
    name: "pressure",
    bindings: &[(FieldSlot::Pressure, Channels::One), (FieldSlot::Divergence, Channels::One)],
};
pub static GRADIENT: Signature = Signature {
    name: "gradient",
    bindings: &[(FieldSlot::Pressure, Channels::One), (FieldSlot::Velocity, Channels::Two)],
};
pub static CURL: Signature = Signature {
    name: "curl",
    bindings: &[(FieldSlot::Velocity, Channels::Two), (FieldSlot::Curl, Channels::One)],
};
pub static VORTICITY: Signature = Signature {
    name: "vorticity",
    bindings: &[(FieldSlot::Velocity, Channels::Two), (FieldSlot::Curl, Channels::One)],
};
pub static SPLAT: Signature = Signature {
    name: "splat",
    bindings: &[(FieldSlot::Velocity, Channels::Two), (FieldSlot::Dye, Channels::Four)],
};
pub static DISPLAY: Signature = Signature {
    name: "display",
    bindings: &[(FieldSlot::Dye, Channels::Four)],
};

/// Launch parameters resolved once at link time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Launch {
    /// Output grid (the surface, for the display kernel).
    pub size: GridSize,
    pub texel: (f32, f32),
    /// Width / height of the presentation surface.
    pub aspect: f32,
}

impl Launch {
    pub fn new(size: GridSize, aspect: f32) -> Self {
        let texel = if size.is_empty() { (0.0, 0.0) } else { size.texel_size() };
        Self { size, texel, aspect }
    }
}

/// A compiled kernel and, once linked, its cached launch parameters.
#[derive(Debug)]
pub struct Kernel {
    signature: &'static Signature,
    launch: Launch,
    linked: bool,
}

impl Kernel {
    fn compile(signature: &'static Signature, limits: &DeviceLimits) -> Result<Self, FluidError> {
        for (slot, channels) in signature.bindings {
            if channels.count() > limits.max_channels {
                return Err(FluidError::InitializationFailure {
                    kernel: signature.name,
                    stage: KernelStage::Compile,
                    reason: format!(
                        "{slot:?} binding needs {} channels, device supports {}",
                        channels.count(),
                        limits.max_channels
                    ),
                });
            }
        }
        Ok(Self {
            signature,
            launch: Launch::default(),
            linked: false,
        })
    }

    fn link(&mut self, fields: &FieldSet, launch: Launch) -> Result<(), FluidError> {
        let grid = fields.size();
        for &(slot, channels) in self.signature.bindings {
            let (size, actual) = slot.layout(fields);
            if actual != channels {
                return Err(self.link_error(format!(
                    "{slot:?} has {} channels, expected {}",
                    actual.count(),
                    channels.count()
                )));
            }
            if size != grid {
                return Err(self.link_error(format!(
                    "{slot:?} is {}x{}, simulation grid is {}x{}",
                    size.width, size.height, grid.width, grid.height
                )));
            }
        }
        self.launch = launch;
        self.linked = true;
        Ok(())
    }

    fn link_error(&self, reason: String) -> FluidError {
        FluidError::InitializationFailure {
            kernel: self.signature.name,
            stage: KernelStage::Link,
            reason,
        }
    }

    pub fn name(&self) -> &'static str {
        self.signature.name
    }

    pub fn launch(&self) -> &Launch {
        &self.launch
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }
}

/// Every kernel the solver runs. Owned by the solver for its whole lifetime.
#[derive(Debug)]
pub struct KernelSet {
    pub advection: Kernel,
    pub divergence: Kernel,
    pub pressure: Kernel,
    pub gradient: Kernel,
    pub curl: Kernel,
    pub vorticity: Kernel,
    pub splat: Kernel,
    pub display: Kernel,
}

impl KernelSet {
    /// Check every kernel signature against the device. Any failure is fatal.
    pub fn compile(limits: &DeviceLimits) -> Result<Self, FluidError> {
        limits.check_features()?;
        let set = Self {
            advection: Kernel::compile(&ADVECTION, limits)?,
            divergence: Kernel::compile(&DIVERGENCE, limits)?,
            pressure: Kernel::compile(&PRESSURE, limits)?,
            gradient: Kernel::compile(&GRADIENT, limits)?,
            curl: Kernel::compile(&CURL, limits)?,
            vorticity: Kernel::compile(&VORTICITY, limits)?,
            splat: Kernel::compile(&SPLAT, limits)?,
            display: Kernel::compile(&DISPLAY, limits)?,
        };
        log::debug!("compiled {} kernels", set.iter().count());
        Ok(set)
    }

    /// Bind kernels to the allocated fields and cache their launch parameters.
    /// Runs after every (re)allocation of the field set.
    pub fn link(&mut self, fields: &FieldSet, surface: SurfaceSize) -> Result<(), FluidError> {
        let aspect = surface.aspect();
        let grid = Launch::new(fields.size(), aspect);
        let screen = Launch::new(GridSize::new(surface.width, surface.height), aspect);
        for kernel in self.iter_mut() {
            let launch = if kernel.signature.name == DISPLAY.name { screen } else { grid };
            kernel.link(fields, launch)?;
        }
        log::debug!(
            "linked kernels: grid {}x{}, surface {}x{}",
            grid.size.width,
            grid.size.height,
            surface.width,
            surface.height
        );
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Kernel> {
        [
            &self.advection,
            &self.divergence,
            &self.pressure,
            &self.gradient,
            &self.curl,
            &self.vorticity,
            &self.splat,
            &self.display,
        ]
        .into_iter()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Kernel> {
        [
            &mut self.advection,
            &mut self.divergence,
            &mut self.pressure,
            &mut self.gradient,
            &mut self.curl,
            &mut self.vorticity,
            &mut self.splat,
            &mut self.display,
        ]
        .into_iter()
    }

    pub fn is_linked(&self) -> bool {
        self.iter().all(Kernel::is_linked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    #[test]
    fn test_compile_default_limits() {
        let set = KernelSet::compile(&DeviceLimits::default()).unwrap();
        assert_eq!(set.iter().count(), 8);
        assert!(!set.is_linked());
    }

    #[test]
    fn test_compile_rejects_missing_float_textures() {
        let limits = DeviceLimits { float_textures: false, ..DeviceLimits::default() };
        let err = KernelSet::compile(&limits).unwrap_err();
        assert!(matches!(err, FluidError::UnsupportedEnvironment(_)), "got {err:?}");
    }

    #[test]
    fn test_compile_reports_kernel_and_stage() {
        let limits = DeviceLimits { max_channels: 2, ..DeviceLimits::default() };
        match KernelSet::compile(&limits).unwrap_err() {
            FluidError::InitializationFailure { kernel, stage, .. } => {
                assert_eq!(kernel, "advection");
                assert_eq!(stage, KernelStage::Compile);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_link_caches_launch() {
        let mut set = KernelSet::compile(&DeviceLimits::default()).unwrap();
        let fields = FieldSet::new(GridSize::new(64, 32));
        set.link(&fields, SurfaceSize::new(640, 320)).unwrap();
        assert!(set.is_linked());
        let adv = set.advection.launch();
        assert_eq!(adv.size, GridSize::new(64, 32));
        assert_eq!(adv.texel, (1.0 / 64.0, 1.0 / 32.0));
        assert_eq!(adv.aspect, 2.0);
        assert_eq!(set.display.launch().size, GridSize::new(640, 320));
    }

    #[test]
    fn test_link_rejects_wrong_layout() {
        let mut set = KernelSet::compile(&DeviceLimits::default()).unwrap();
        let mut fields = FieldSet::new(GridSize::new(16, 16));
        fields.curl = Field::new(GridSize::new(16, 16), Channels::Two);
        match set.link(&fields, SurfaceSize::new(16, 16)).unwrap_err() {
            FluidError::InitializationFailure { kernel, stage, reason } => {
                assert_eq!(kernel, "curl");
                assert_eq!(stage, KernelStage::Link);
                assert!(reason.contains("Curl"), "reason: {reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_link_rejects_mismatched_size() {
        let mut set = KernelSet::compile(&DeviceLimits::default()).unwrap();
        let mut fields = FieldSet::new(GridSize::new(16, 16));
        fields.divergence = Field::new(GridSize::new(8, 8), Channels::One);
        let err = set.link(&fields, SurfaceSize::new(16, 16)).unwrap_err();
        assert!(err.to_string().contains("divergence"), "got {err}");
    }

    #[test]
    fn test_check_grid_bounds() {
        let limits = DeviceLimits { max_texture_size: 100, ..DeviceLimits::default() };
        assert!(limits.check_grid(GridSize::new(100, 50)).is_ok());
        assert!(limits.check_grid(GridSize::new(101, 50)).is_err());
        assert!(limits.check_grid(GridSize::new(2, 50)).is_err());
    }
}

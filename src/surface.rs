use crate::field::GridSize;

/// Device pixel ratios above this are clamped when deriving the surface size.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Pixel dimensions of the presentation surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: usize,
    pub height: usize,
}

impl SurfaceSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Surface size for a client area scaled by the device pixel ratio,
    /// capped at [`MAX_PIXEL_RATIO`].
    pub fn from_client(client_width: usize, client_height: usize, device_pixel_ratio: f64) -> Self {
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        Self {
            width: (client_width as f64 * ratio).round() as usize,
            height: (client_height as f64 * ratio).round() as usize,
        }
    }

    /// Zero-area surfaces (e.g. a minimized window) cannot be simulated or drawn.
    pub const fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; 1.0 for degenerate surfaces.
    pub fn aspect(self) -> f32 {
        if self.is_degenerate() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Simulation grid for this surface.
    /// `resolution == 0` matches the surface; otherwise the shorter axis gets
    /// `resolution` cells and the longer axis follows the aspect ratio.
    pub fn simulation_grid(self, resolution: usize) -> GridSize {
        if self.is_degenerate() {
            return GridSize::default();
        }
        if resolution == 0 {
            return GridSize::new(self.width, self.height);
        }
        let aspect = self.width as f64 / self.height as f64;
        if aspect >= 1.0 {
            let width = (resolution as f64 * aspect).round() as usize;
            GridSize::new(width.max(resolution), resolution)
        } else {
            let height = (resolution as f64 / aspect).round() as usize;
            GridSize::new(resolution, height.max(resolution))
        }
    }
}

/// Host-visible frame in 0RGB `u32` pixels, row 0 at the top.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            width: surface.width,
            height: surface.height,
            pixels: vec![0; surface.width * surface.height],
        }
    }

    pub fn surface(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    /// Match `surface`, reallocating only when the size changed.
    pub fn fit(&mut self, surface: SurfaceSize) {
        if self.surface() != surface {
            *self = Self::new(surface);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

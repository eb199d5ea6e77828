use crate::buffer::GridBuffer;
use crate::field::{Channels, Field, GridSize};

/// Seed for the splat color generator; fixed so runs are reproducible.
pub const DEFAULT_SEED: u32 = 42;

/// xorshift32 stream that picks splat colors.
pub struct ColorRng {
    state: u32,
}

impl ColorRng {
    pub fn new(seed: u32) -> Self {
        // a zero state would stay zero forever
        Self { state: seed.max(1) }
    }

    /// Returns a float in [0.0, 1.0).
    pub fn next_unit(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Three channels drawn uniformly from [base, base + range).
    pub fn next_color(&mut self, base: f32, range: f32) -> [f32; 3] {
        [
            base + range * self.next_unit(),
            base + range * self.next_unit(),
            base + range * self.next_unit(),
        ]
    }
}

/// All simulation fields. Velocity, dye and the scratch fields share one grid.
pub struct FieldSet {
    /// 2 channels: (vx, vy) in texels per second.
    pub velocity: GridBuffer,
    /// 4 channels: rgb dye, alpha unused.
    pub dye: GridBuffer,
    pub divergence: Field,
    pub curl: Field,
    pub pressure: GridBuffer,
}

impl FieldSet {
    pub fn new(size: GridSize) -> Self {
        Self {
            velocity: GridBuffer::new(size, Channels::Two),
            dye: GridBuffer::new(size, Channels::Four),
            divergence: Field::new(size, Channels::One),
            curl: Field::new(size, Channels::One),
            pressure: GridBuffer::new(size, Channels::One),
        }
    }

    pub fn size(&self) -> GridSize {
        self.velocity.size()
    }

    /// Reallocate every field at `size`. All contents return to zero.
    pub fn resize(&mut self, size: GridSize) {
        self.velocity.resize(size);
        self.dye.resize(size);
        self.divergence = Field::new(size, Channels::One);
        self.curl = Field::new(size, Channels::One);
        self.pressure.resize(size);
    }

    /// Zero every field in place.
    pub fn clear(&mut self) {
        self.velocity.clear();
        self.dye.clear();
        self.divergence.clear();
        self.curl.clear();
        self.pressure.clear();
    }
}

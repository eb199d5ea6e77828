#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of float channels stored per texel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    One = 1,
    Two = 2,
    Four = 4,
}

impl Channels {
    pub const fn count(self) -> usize {
        self as usize
    }
}

/// Grid dimensions in texels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn area(self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size of one texel in normalized [0,1] coordinates.
    pub fn texel_size(self) -> (f32, f32) {
        (1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// Normalized coordinate of the center of texel `(i, j)`.
    #[inline]
    pub fn texel_center(self, i: usize, j: usize) -> (f32, f32) {
        (
            (i as f32 + 0.5) / self.width as f32,
            (j as f32 + 0.5) / self.height as f32,
        )
    }
}

/// A 2D float texture. Row-major, row 0 is the bottom of the grid.
///
/// Reads always return four components (missing channels read as 0.0, the way a
/// sampler expands an `R` or `RG` texture); writes keep only the stored channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    size: GridSize,
    channels: Channels,
    data: Vec<f32>,
}

impl Field {
    /// Allocate a zero-filled field.
    pub fn new(size: GridSize, channels: Channels) -> Self {
        Self {
            size,
            channels,
            data: vec![0.0; size.area() * channels.count()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Iterate texels in row-major order; each slice holds `channels` floats.
    pub fn texels(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.channels.count())
    }

    /// Reset every texel to zero.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        (j * self.size.width + i) * self.channels.count()
    }

    /// Read texel `(i, j)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> [f32; 4] {
        let ch = self.channels.count();
        let o = self.offset(i, j);
        let mut out = [0.0; 4];
        out[..ch].copy_from_slice(&self.data[o..o + ch]);
        out
    }

    /// Write texel `(i, j)`. Components beyond the channel count are dropped.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: [f32; 4]) {
        let ch = self.channels.count();
        let o = self.offset(i, j);
        self.data[o..o + ch].copy_from_slice(&value[..ch]);
    }

    /// Texel fetch with clamp-to-edge addressing.
    #[inline]
    pub fn fetch(&self, i: isize, j: isize) -> [f32; 4] {
        let i = i.clamp(0, self.size.width as isize - 1) as usize;
        let j = j.clamp(0, self.size.height as isize - 1) as usize;
        self.get(i, j)
    }

    /// Bilinear sample at normalized coordinate `(u, v)`, clamp-to-edge.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        let x = u * self.size.width as f32 - 0.5;
        let y = v * self.size.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (i0, j0) = (x0 as isize, y0 as isize);

        let a = self.fetch(i0, j0);
        let b = self.fetch(i0 + 1, j0);
        let c = self.fetch(i0, j0 + 1);
        let d = self.fetch(i0 + 1, j0 + 1);

        let mut out = [0.0; 4];
        for k in 0..4 {
            let bottom = a[k] + (b[k] - a[k]) * fx;
            let top = c[k] + (d[k] - c[k]) * fx;
            out[k] = bottom + (top - bottom) * fy;
        }
        out
    }

    /// Evaluate `kernel` at every texel and store the result.
    ///
    /// This is the dispatch primitive every stencil kernel goes through: the
    /// closure may only read other fields, so each texel is independent and
    /// rows are processed in parallel when the `parallel` feature is on.
    pub fn fill_with<F>(&mut self, kernel: F)
    where
        F: Fn(usize, usize) -> [f32; 4] + Sync + Send,
    {
        let ch = self.channels.count();
        let row_len = self.size.width * ch;
        if row_len == 0 {
            return;
        }
        let write_row = |(j, row): (usize, &mut [f32])| {
            for (i, texel) in row.chunks_exact_mut(ch).enumerate() {
                let value = kernel(i, j);
                texel.copy_from_slice(&value[..ch]);
            }
        };

        #[cfg(feature = "parallel")]
        {
            self.data.par_chunks_mut(row_len).enumerate().for_each(write_row);
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.data.chunks_mut(row_len).enumerate().for_each(write_row);
        }
    }
}

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::field::Field;
use crate::surface::{FrameBuffer, SurfaceSize};
use super::kernels::Launch;

/// Map one dye channel to an 8-bit intensity.
#[inline]
fn to_byte(x: f32) -> u32 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u32
}

/// Pack rgb into the 0RGB layout the host window expects.
#[inline]
pub fn pack_rgb(rgb: [f32; 4]) -> u32 {
    (to_byte(rgb[0]) << 16) | (to_byte(rgb[1]) << 8) | to_byte(rgb[2])
}

/// Present `dye` on the frame. The frame is sized to the launch surface and
/// each pixel samples the dye bilinearly. Frame row 0 is the top of the
/// screen, dye row 0 the bottom.
pub fn present(launch: &Launch, dye: &Field, frame: &mut FrameBuffer) {
    let (w, h) = (launch.size.width, launch.size.height);
    frame.fit(SurfaceSize::new(w, h));
    if w == 0 || h == 0 || dye.size().is_empty() {
        return;
    }
    let draw_row = |(y, row): (usize, &mut [u32])| {
        let v = 1.0 - (y as f32 + 0.5) / h as f32;
        for (x, px) in row.iter_mut().enumerate() {
            let u = (x as f32 + 0.5) / w as f32;
            *px = pack_rgb(dye.sample(u, v));
        }
    };

    #[cfg(feature = "parallel")]
    {
        frame.pixels.par_chunks_mut(w).enumerate().for_each(draw_row);
    }
    #[cfg(not(feature = "parallel"))]
    {
        frame.pixels.chunks_mut(w).enumerate().for_each(draw_row);
    }
}

use std::collections::BTreeMap;

use crate::state::ColorRng;
use crate::surface::SurfaceSize;

/// Input-device identifier (mouse = 0, touches use their own ids).
pub type PointerId = u64;

/// Lowest dye intensity per channel of a random splat color.
const COLOR_BASE: f32 = 0.5;
/// Width of the random range added on top of [`COLOR_BASE`].
const COLOR_RANGE: f32 = 3.0;

/// One pending impulse, in normalized grid space. Consumed immediately by the solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplatRequest {
    /// Injection point, x and y in [0,1], y = 0 at the bottom.
    pub position: (f32, f32),
    /// Velocity impulse in texels per second.
    pub impulse: (f32, f32),
    pub color: [f32; 3],
}

/// Last known state of one pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Latest normalized position.
    pub position: (f32, f32),
    /// Where the pending delta started; the next splat is injected here.
    pub anchor: (f32, f32),
    /// Motion accumulated since the last splat.
    pub delta: (f32, f32),
    pub down: bool,
}

/// Converts raw pointer events in surface pixels into [`PointerState`]s and,
/// once per frame, into [`SplatRequest`]s.
pub struct InputAdapter {
    surface: SurfaceSize,
    pointers: BTreeMap<PointerId, PointerState>,
}

impl InputAdapter {
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            surface,
            pointers: BTreeMap::new(),
        }
    }

    pub fn set_surface(&mut self, surface: SurfaceSize) {
        self.surface = surface;
    }

    /// Surface pixel -> normalized grid space (y flipped so 0 is the bottom).
    /// `None` for degenerate surfaces or non-finite coordinates.
    pub fn normalize(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        if self.surface.is_degenerate() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some((
            x / self.surface.width as f32,
            1.0 - y / self.surface.height as f32,
        ))
    }

    pub fn pointer_down(&mut self, id: PointerId, x: f32, y: f32) {
        let Some(p) = self.normalize(x, y) else { return };
        self.pointers.insert(
            id,
            PointerState {
                position: p,
                anchor: p,
                delta: (0.0, 0.0),
                down: true,
            },
        );
    }

    /// Moves of pointers that are not down are ignored.
    pub fn pointer_move(&mut self, id: PointerId, x: f32, y: f32) {
        let Some(p) = self.normalize(x, y) else { return };
        if let Some(state) = self.pointers.get_mut(&id) {
            if state.down {
                state.delta.0 += p.0 - state.position.0;
                state.delta.1 += p.1 - state.position.1;
                state.position = p;
            }
        }
    }

    /// Marks the pointer inactive; its delta is left as is.
    pub fn pointer_up(&mut self, id: PointerId) {
        if let Some(state) = self.pointers.get_mut(&id) {
            state.down = false;
        }
    }

    pub fn pointer(&self, id: PointerId) -> Option<&PointerState> {
        self.pointers.get(&id)
    }

    pub fn active_count(&self) -> usize {
        self.pointers.values().filter(|p| p.down).count()
    }

    /// One splat per pointer that is down, in id order. Each consumed pointer has
    /// its delta reset and its anchor moved to its current position.
    pub fn take_splats(&mut self, force: f32, rng: &mut ColorRng) -> Vec<SplatRequest> {
        let mut out = Vec::with_capacity(self.pointers.len());
        for state in self.pointers.values_mut().filter(|p| p.down) {
            let color = rng.next_color(COLOR_BASE, COLOR_RANGE);
            out.push(SplatRequest {
                position: state.anchor,
                impulse: (state.delta.0 * force, state.delta.1 * force),
                color,
            });
            state.delta = (0.0, 0.0);
            state.anchor = state.position;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DEFAULT_SEED;

    fn adapter() -> InputAdapter {
        InputAdapter::new(SurfaceSize::new(200, 100))
    }

    #[test]
    fn test_normalize_flips_y() {
        let input = adapter();
        assert_eq!(input.normalize(0.0, 0.0), Some((0.0, 1.0)));
        assert_eq!(input.normalize(200.0, 100.0), Some((1.0, 0.0)));
        assert_eq!(input.normalize(50.0, 25.0), Some((0.25, 0.75)));
    }

    #[test]
    fn test_normalize_rejects_degenerate_and_nan() {
        let input = InputAdapter::new(SurfaceSize::new(0, 100));
        assert_eq!(input.normalize(1.0, 1.0), None);
        let input = adapter();
        assert_eq!(input.normalize(f32::NAN, 1.0), None);
    }

    #[test]
    fn test_down_records_position() {
        let mut input = adapter();
        input.pointer_down(0, 100.0, 50.0);
        let p = input.pointer(0).unwrap();
        assert!(p.down);
        assert_eq!(p.position, (0.5, 0.5));
        assert_eq!(p.delta, (0.0, 0.0));
    }

    #[test]
    fn test_move_accumulates_delta() {
        let mut input = adapter();
        input.pointer_down(0, 100.0, 50.0);
        input.pointer_move(0, 110.0, 50.0);
        input.pointer_move(0, 120.0, 40.0);
        let p = input.pointer(0).unwrap();
        assert!((p.delta.0 - 0.1).abs() < 1e-6, "dx={}", p.delta.0);
        assert!((p.delta.1 - 0.1).abs() < 1e-6, "dy={}", p.delta.1);
        assert_eq!(p.anchor, (0.5, 0.5));
    }

    #[test]
    fn test_move_without_down_is_ignored() {
        let mut input = adapter();
        input.pointer_move(3, 10.0, 10.0);
        assert!(input.pointer(3).is_none());
        input.pointer_down(3, 10.0, 10.0);
        input.pointer_up(3);
        input.pointer_move(3, 50.0, 50.0);
        assert_eq!(input.pointer(3).unwrap().delta, (0.0, 0.0));
    }

    #[test]
    fn test_up_freezes_delta() {
        let mut input = adapter();
        input.pointer_down(1, 0.0, 0.0);
        input.pointer_move(1, 20.0, 0.0);
        input.pointer_up(1);
        let p = input.pointer(1).unwrap();
        assert!(!p.down);
        assert!((p.delta.0 - 0.1).abs() < 1e-6);
        let mut rng = ColorRng::new(DEFAULT_SEED);
        assert!(input.take_splats(500.0, &mut rng).is_empty());
    }

    #[test]
    fn test_take_splats_consumes_delta() {
        let mut input = adapter();
        input.pointer_down(0, 100.0, 50.0);
        input.pointer_move(0, 120.0, 50.0);
        let mut rng = ColorRng::new(DEFAULT_SEED);
        let splats = input.take_splats(500.0, &mut rng);
        assert_eq!(splats.len(), 1);
        let s = splats[0];
        assert_eq!(s.position, (0.5, 0.5));
        assert!((s.impulse.0 - 50.0).abs() < 1e-3, "impulse {:?}", s.impulse);
        assert_eq!(s.impulse.1, 0.0);
        for c in s.color {
            assert!((0.5..3.5).contains(&c), "color {c}");
        }
        let p = input.pointer(0).unwrap();
        assert_eq!(p.delta, (0.0, 0.0));
        assert_eq!(p.anchor, p.position);
    }

    #[test]
    fn test_held_pointer_keeps_splatting() {
        let mut input = adapter();
        input.pointer_down(0, 100.0, 50.0);
        let mut rng = ColorRng::new(DEFAULT_SEED);
        assert_eq!(input.take_splats(500.0, &mut rng).len(), 1);
        let again = input.take_splats(500.0, &mut rng);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].impulse, (0.0, 0.0));
    }

    #[test]
    fn test_multiple_pointers_are_independent() {
        let mut input = adapter();
        input.pointer_down(7, 0.0, 0.0);
        input.pointer_down(2, 200.0, 100.0);
        input.pointer_move(7, 20.0, 0.0);
        assert_eq!(input.active_count(), 2);
        let mut rng = ColorRng::new(DEFAULT_SEED);
        let splats = input.take_splats(10.0, &mut rng);
        assert_eq!(splats.len(), 2);
        // id order: 2 first, then 7
        assert_eq!(splats[0].position, (1.0, 0.0));
        assert_eq!(splats[0].impulse, (0.0, 0.0));
        assert!((splats[1].impulse.0 - 1.0).abs() < 1e-5);
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dyeflow::config::{self, Config};
use dyeflow::input::PointerId;
use dyeflow::solver::diagnostics;
use dyeflow::surface::{FrameBuffer, SurfaceSize};
use dyeflow::{FrameOutcome, Solver, SolverParams};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

struct Defaults;

impl Defaults {
    const MOUSE: PointerId = 0;
    const HEADLESS_FRAMES: u64 = 600;
    /// Frames between diagnostics log lines.
    const DIAGNOSTICS_INTERVAL: u64 = 120;
    /// Scripted stroke radius, as a fraction of the shorter surface side.
    const STROKE_RADIUS: f32 = 0.25;
    /// Frames per revolution of the scripted stroke.
    const STROKE_PERIOD: f32 = 90.0;
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    /// Frame count for a windowless run.
    headless: Option<u64>,
    minimal: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Args {
    let mut out = Args::default();
    let mut iter = args.into_iter().peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--headless" => {
                let frames = match iter.peek().and_then(|s| s.parse::<u64>().ok()) {
                    Some(n) => {
                        iter.next();
                        n
                    }
                    None => Defaults::HEADLESS_FRAMES,
                };
                out.headless = Some(frames);
            }
            "--minimal" => out.minimal = true,
            other => log::warn!("ignoring unknown argument {other}"),
        }
    }
    out
}

fn solver_params(cfg: &Config, minimal: bool) -> SolverParams {
    let params = cfg.solver_params();
    if minimal {
        SolverParams {
            vorticity: false,
            advection: false,
            projection: false,
            ..params
        }
    } else {
        params
    }
}

fn log_diagnostics(solver: &Solver, frame: u64) {
    let fields = solver.fields();
    log::info!(
        "frame {frame}: dye {:.3}, |v| {:.3}, div {:.4}, max p {:.4}",
        diagnostics::dye_mass(fields.dye.read()),
        diagnostics::velocity_magnitude_sum(fields.velocity.read()),
        diagnostics::divergence_l2(fields.velocity.read()),
        diagnostics::max_abs(fields.pressure.read()),
    );
}

/// Scripted pointer position on a circle around the surface center, in pixels.
fn stroke_point(surface: SurfaceSize, frame: u64) -> (f32, f32) {
    let (w, h) = (surface.width as f32, surface.height as f32);
    let r = Defaults::STROKE_RADIUS * w.min(h);
    let angle = std::f32::consts::TAU * frame as f32 / Defaults::STROKE_PERIOD;
    (0.5 * w + r * angle.cos(), 0.5 * h + r * angle.sin())
}

fn main() {
    env_logger::init();

    let args = parse_args(std::env::args().skip(1));
    let cfg = config::load();
    let params = solver_params(&cfg, args.minimal);

    // Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let result = match args.headless {
        Some(frames) => run_headless(&cfg, params, frames, &running),
        None => run_gui(&cfg, params, &running),
    };
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run_gui(cfg: &Config, params: SolverParams, running: &AtomicBool) -> Result<(), dyeflow::FluidError> {
    let dpr = cfg.display.device_pixel_ratio;
    let mut client = (cfg.display.width, cfg.display.height);
    let mut surface = SurfaceSize::from_client(client.0, client.1, dpr);

    let mut solver = Solver::new(params, cfg.simulation.resolution, surface, cfg.limits())?;
    let mut frame = FrameBuffer::new(surface);

    let mut window = Window::new(
        "dyeflow",
        client.0,
        client.1,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )
    .expect("Failed to create window");
    window.set_target_fps(cfg.display.target_fps);

    let mut mouse_down = false;
    let mut frame_count = 0u32;
    let mut last_fps_time = Instant::now();

    while window.is_open() && running.load(Ordering::SeqCst) {
        if window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            break;
        }
        // R: clear the fluid
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            solver.reset();
        }

        // --- Check for window resize ---
        let size = window.get_size();
        if size != client {
            client = size;
            surface = SurfaceSize::from_client(client.0, client.1, dpr);
            solver.on_resize(surface.width, surface.height)?;
            mouse_down = false;
        }

        // --- Mouse as pointer 0, in surface pixels ---
        let down = window.get_mouse_down(MouseButton::Left);
        let pos = window.get_mouse_pos(MouseMode::Discard);
        let (sx, sy) = (scale(surface.width, client.0), scale(surface.height, client.1));
        match (pos, down, mouse_down) {
            (Some((x, y)), true, false) => solver.on_pointer_down(Defaults::MOUSE, x * sx, y * sy),
            (Some((x, y)), true, true) => solver.on_pointer_move(Defaults::MOUSE, x * sx, y * sy),
            (_, false, true) => solver.on_pointer_up(Defaults::MOUSE),
            _ => {}
        }
        mouse_down = down && (pos.is_some() || mouse_down);

        let presented = solver.step(&mut frame) == FrameOutcome::Presented;
        let shown = if presented {
            window.update_with_buffer(&frame.pixels, frame.width, frame.height)
        } else {
            window.update();
            Ok(())
        };
        if let Err(e) = shown {
            log::error!("failed to present frame: {e}");
            break;
        }

        if presented && solver.frame_count() % Defaults::DIAGNOSTICS_INTERVAL == 0 {
            log_diagnostics(&solver, solver.frame_count());
        }

        frame_count += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            window.set_title(&format!("dyeflow {} fps", frame_count));
            frame_count = 0;
            last_fps_time = now;
        }
    }
    Ok(())
}

/// Surface pixels per client pixel along one axis.
fn scale(surface: usize, client: usize) -> f32 {
    if client == 0 {
        1.0
    } else {
        surface as f32 / client as f32
    }
}

fn run_headless(cfg: &Config, params: SolverParams, frames: u64, running: &AtomicBool) -> Result<(), dyeflow::FluidError> {
    let surface = SurfaceSize::from_client(cfg.display.width, cfg.display.height, cfg.display.device_pixel_ratio);
    let mut solver = Solver::new(params, cfg.simulation.resolution, surface, cfg.limits())?;
    let mut frame = FrameBuffer::new(surface);
    log::info!(
        "headless: {frames} frames, surface {}x{}, grid {}x{}",
        surface.width,
        surface.height,
        solver.grid().width,
        solver.grid().height
    );

    // Stroke for the first half, then let the fluid decay
    let lift = frames / 2;
    let (x, y) = stroke_point(surface, 0);
    solver.on_pointer_down(Defaults::MOUSE, x, y);
    let start = Instant::now();
    for n in 0..frames {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        if n < lift {
            let (x, y) = stroke_point(surface, n + 1);
            solver.on_pointer_move(Defaults::MOUSE, x, y);
        } else if n == lift {
            solver.on_pointer_up(Defaults::MOUSE);
        }
        solver.step(&mut frame);
        if n % Defaults::DIAGNOSTICS_INTERVAL == 0 {
            log_diagnostics(&solver, n);
        }
    }
    log_diagnostics(&solver, solver.frame_count());
    let elapsed = start.elapsed().as_secs_f64();
    if elapsed > 0.0 {
        log::info!("{:.1} frames/s", solver.frame_count() as f64 / elapsed);
    }
    Ok(())
}

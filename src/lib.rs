//! # dyeflow: real-time stable-fluids dye simulation
//!
//! An incompressible velocity field and a passive dye field evolve once per
//! frame through a fixed sequence of stencil kernels. Pointer strokes inject
//! Gaussian "splats" of momentum and color.
//!
//! ## Layout
//!
//! - [`field`] - float textures with GL-style sampling ([`field::Field`])
//! - [`buffer`] - double-buffered fields ([`buffer::GridBuffer`])
//! - [`state`] - the simulation state ([`state::FieldSet`]) and the color RNG
//! - [`solver`] - kernels, kernel compile/link and the per-frame [`solver::Solver`]
//! - [`input`] - pointer events to [`input::SplatRequest`]s
//! - [`surface`] - presentation surface and frame buffer
//! - [`config`] - `dyeflow.yaml` loading
//!
//! ## Frame pipeline
//!
//! splats -> curl -> vorticity confinement -> advect velocity -> advect dye
//! -> divergence -> Jacobi pressure solve -> gradient subtraction -> display
//!
//! Kernels read only `read` buffers and write only `write` buffers; the borrow
//! checker enforces this through [`buffer::GridBuffer::split`]. With the
//! `parallel` feature (default) every kernel runs its rows on rayon.

pub mod buffer;
pub mod config;
pub mod error;
pub mod field;
pub mod input;
pub mod solver;
pub mod state;
pub mod surface;

pub use error::{ConfigError, FluidError, KernelStage};
pub use solver::{FrameOutcome, Solver, SolverParams};

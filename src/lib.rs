//! Gencore - A scanline-accurate Mega Drive/Genesis timing core
//!
//! This library provides the frame scheduler, interrupt coordination, and
//! tagged-record savestates for the Genesis. Chip interpreters plug in
//! through the traits in `chips`.

pub mod audio;
pub mod chips;
pub mod clock;
pub mod config;
pub mod display;
pub mod savestate;
pub mod scheduler;
pub mod snapshot;
pub mod vdp;

pub use config::Config;
pub use scheduler::Scheduler;
pub use vdp::Vdp;

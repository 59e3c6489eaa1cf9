//! Chip Interfaces
//!
//! The scheduler owns timing and drives the chip cores through these traits,
//! so interpreter implementations stay swappable and tests can run the frame
//! loop against instrumented fakes.
//!
//! Clock domains relative to the master clock:
//!
//! | Chip            | Divider | Effective rate (NTSC)   |
//! |:----------------|:--------|:------------------------|
//! | Main CPU (68K)  | /7      | 7.67 MHz                |
//! | Coprocessor Z80 | /15     | 3.58 MHz                |
//! | FM (YM2612)     | /7/144  | 53267 Hz sample output  |
//! | PSG (SN76489)   | /15     | 3.58 MHz                |
//!
//! All targets passed to `run_until` are in master cycles from the start of
//! the current frame. Each chip converts to its own domain internally.

use crate::audio::SampleBuffer;
use crate::clock::ChipClock;
use crate::savestate::Savable;
use crate::vdp::Vdp;

/// The main CPU. Tracks its own cycle position across calls.
pub trait MainProcessor: Savable {
    /// Execute until the chip's position reaches `target` master cycles.
    fn run_until(&mut self, target: u64);

    /// Master-cycle position within the current frame. May overshoot the
    /// last `run_until` target by up to one instruction.
    fn position(&self) -> u64;

    /// Assert an interrupt at the given priority level, 0 for none. A
    /// pending lower level is superseded, never the other way around.
    fn set_interrupt_level(&mut self, level: u8);

    /// Subtract a completed frame's cycle total from the chip's position,
    /// keeping the counter near zero across long sessions.
    fn rebase(&mut self, frame_cycles: u64);

    fn reset(&mut self);
}

/// The sound coprocessor. Its `ChipClock` lives in the scheduler; the chip
/// advances it as it executes and must reach `target` before returning.
/// Called only while the clock lags the target.
pub trait Coprocessor: Savable {
    fn run_until(&mut self, clock: &mut ChipClock, target: u64);

    /// Level-triggered interrupt line.
    fn set_interrupt_line(&mut self, active: bool);

    fn reset(&mut self);
}

/// A sample-producing sound chip. Pushes the samples covering the advanced
/// span into `out`. Called only while the clock lags the target.
pub trait SoundChip: Savable {
    fn run_until(&mut self, clock: &mut ChipClock, target: u64, out: &mut SampleBuffer);

    fn reset(&mut self);
}

/// Draws scanlines from VDP state. Owns the video memories, so it
/// serializes alongside the chips.
pub trait LineRenderer: Savable {
    /// Latch per-frame rendering state before line 0.
    fn begin_frame(&mut self, vdp: &Vdp);

    /// Draw one visible line of palette indices into `out`, which is the
    /// active width wide.
    fn render_line(&mut self, vdp: &Vdp, line: u16, out: &mut [u8]);

    fn reset(&mut self);
}

//! Master clock and per-chip clock tracking
//!
//! All components are scheduled against a single master-clock cycle count
//! (the VDP's input clock, ~53.693 MHz NTSC). One scanline lasts
//! `MCLK_PER_LINE` master cycles; a frame lasts `lines_per_frame` scanlines
//! (262 NTSC, 312 PAL). The system clock is frame-relative: it resets to zero
//! at the start of every frame and each component is advanced to successive
//! line boundaries.

/// Master-clock cycles per scanline.
pub const MCLK_PER_LINE: u64 = 3420;

/// Scanlines per frame, NTSC timing.
pub const LINES_PER_FRAME_NTSC: u16 = 262;

/// Scanlines per frame, PAL timing.
pub const LINES_PER_FRAME_PAL: u16 = 312;

/// Local clock for one schedulable chip.
///
/// A disabled clock never lags the target, so the scheduler (and any bus-side
/// caller) can advance every chip unconditionally; a switched-off chip's
/// `run_until` loop simply never enters its body.
#[derive(Debug, Clone, Copy)]
pub struct ChipClock {
    ticks: u64,
    enabled: bool,
}

impl ChipClock {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            enabled: true,
        }
    }

    /// Reset to the start of a frame, enabling or disabling the chip.
    pub fn begin_frame(&mut self, enabled: bool) {
        self.ticks = 0;
        self.enabled = enabled;
    }

    /// True while the chip still has cycles to run before `target`.
    #[inline(always)]
    pub fn lags(&self, target: u64) -> bool {
        self.enabled && self.ticks < target
    }

    /// Advance the local clock by `cycles` master cycles.
    #[inline(always)]
    pub fn advance(&mut self, cycles: u64) {
        self.ticks += cycles;
    }

    /// Snap the local clock forward to `target` if it is behind.
    pub fn catch_up(&mut self, target: u64) {
        if self.ticks < target {
            self.ticks = target;
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ChipClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Scheduler-owned clock context passed to component calls.
///
/// `system` is the frame-relative master clock; the chip clocks belong to the
/// components that run against their own divided rates (Z80, FM, PSG). The
/// main CPU keeps its own internal cycle counter and is rebased at frame end
/// instead.
#[derive(Debug, Clone, Copy)]
pub struct ClockDomain {
    /// Frame-relative master clock, in master cycles.
    pub system: u64,
    /// Coprocessor (Z80) clock.
    pub z80: ChipClock,
    /// FM sound chip (YM2612) clock.
    pub fm: ChipClock,
    /// PSG sound chip (SN76489) clock.
    pub psg: ChipClock,
}

impl ClockDomain {
    pub fn new() -> Self {
        Self {
            system: 0,
            z80: ChipClock::new(),
            fm: ChipClock::new(),
            psg: ChipClock::new(),
        }
    }

    /// Reset all clocks for a new frame.
    pub fn begin_frame(&mut self, z80_enabled: bool, fm_enabled: bool, psg_enabled: bool) {
        self.system = 0;
        self.z80.begin_frame(z80_enabled);
        self.fm.begin_frame(fm_enabled);
        self.psg.begin_frame(psg_enabled);
    }

    /// Master-clock value at the end of the current scanline.
    #[inline(always)]
    pub fn line_target(&self) -> u64 {
        self.system + MCLK_PER_LINE
    }

    /// Move the system clock past the current scanline.
    #[inline(always)]
    pub fn advance_line(&mut self) {
        self.system += MCLK_PER_LINE;
    }
}

impl Default for ClockDomain {
    fn default() -> Self {
        Self::new()
    }
}

//! Video chip register bank
//!
//! The scheduler reads display geometry and interrupt configuration from
//! here, and latches interrupt-pending state back into it. Rendering state
//! (VRAM, scroll planes, sprites) belongs to the line renderer; this bank
//! only carries what crosses the chip boundary: the 24 register bytes, the
//! status word, and the RGB565 color table handed to the display pipeline
//! at frame end.

use crate::savestate::{Savable, SaveError, SaveState};

pub mod constants;
pub use constants::*;

/// Externally visible video chip state.
#[derive(Debug, Clone)]
pub struct Vdp {
    pub registers: [u8; NUM_REGISTERS],
    pub status: u16,
    /// Latched line-interrupt request, cleared when the CPU acknowledges.
    pub hint_pending: bool,
    /// Native colors in RGB565, maintained by the renderer/bus on CRAM writes.
    pub cram565: [u16; COLOR_TABLE_LEN],
}

impl Vdp {
    pub fn new() -> Self {
        Self {
            registers: [0; NUM_REGISTERS],
            status: 0x3400, // Initial status (FIFO empty, etc)
            hint_pending: false,
            cram565: [0; COLOR_TABLE_LEN],
        }
    }

    pub fn reset(&mut self) {
        self.registers.fill(0);
        self.status = 0x3400;
        self.hint_pending = false;
        self.cram565.fill(0);
    }

    /// Write a mode/control register.
    pub fn set_register(&mut self, reg: usize, value: u8) {
        if reg < NUM_REGISTERS {
            self.registers[reg] = value;
        }
    }

    /// Status read as seen from the bus: clears the VInt pending bit.
    pub fn read_status(&mut self) -> u16 {
        let res = self.status;
        self.status &= !STATUS_VINT_PENDING;
        res
    }

    pub fn hint_enabled(&self) -> bool {
        (self.registers[REG_MODE1] & MODE1_HINT_ENABLE) != 0
    }

    pub fn vint_enabled(&self) -> bool {
        (self.registers[REG_MODE2] & MODE2_VINT_ENABLE) != 0
    }

    /// PAL/V30 display mode (240 visible lines, 312-line frames).
    pub fn pal_mode(&self) -> bool {
        (self.registers[REG_MODE2] & MODE2_PAL_MODE) != 0
    }

    pub fn h40_mode(&self) -> bool {
        (self.registers[REG_MODE4] & MODE4_H40_MODE) != 0
    }

    /// Reload value for the line-interrupt counter.
    pub fn hint_reload(&self) -> u8 {
        self.registers[REG_HINT_COUNTER]
    }

    pub fn screen_width(&self) -> u16 {
        if self.h40_mode() {
            320
        } else {
            256
        }
    }

    pub fn screen_height(&self) -> u16 {
        if self.pal_mode() {
            240
        } else {
            224
        }
    }

    pub fn vint_pending(&self) -> bool {
        (self.status & STATUS_VINT_PENDING) != 0
    }

    pub fn trigger_vint(&mut self) {
        self.status |= STATUS_VINT_PENDING;
    }

    pub fn color_table(&self) -> &[u16; COLOR_TABLE_LEN] {
        &self.cram565
    }
}

impl Default for Vdp {
    fn default() -> Self {
        Self::new()
    }
}

impl Savable for Vdp {
    fn save_state(&self, state: &mut SaveState) -> Result<(), SaveError> {
        state.write_tag("vdp_regs", &self.registers)?;
        state.write_u32("vdp_status", u32::from(self.status))?;
        state.write_u32("vdp_hint_pending", u32::from(self.hint_pending))?;

        let mut cram = [0u8; COLOR_TABLE_LEN * 2];
        for (chunk, color) in cram.chunks_exact_mut(2).zip(self.cram565.iter()) {
            chunk.copy_from_slice(&color.to_le_bytes());
        }
        state.write_tag("vdp_cram", &cram)
    }

    fn load_state(&mut self, state: &mut SaveState) {
        state.read_tag("vdp_regs", &mut self.registers);
        if let Some(status) = state.read_u32("vdp_status") {
            self.status = status as u16;
        }
        if let Some(pending) = state.read_u32("vdp_hint_pending") {
            self.hint_pending = pending != 0;
        }

        let mut cram = [0u8; COLOR_TABLE_LEN * 2];
        if state.read_tag("vdp_cram", &mut cram).is_some() {
            for (chunk, color) in cram.chunks_exact(2).zip(self.cram565.iter_mut()) {
                *color = u16::from_le_bytes([chunk[0], chunk[1]]);
            }
        }
    }
}

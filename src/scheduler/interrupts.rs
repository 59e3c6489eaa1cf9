//! Interrupt Coordination
//!
//! Drives the line interrupt counter and the frame interrupt edges. The
//! line counter is serviced at the end of every scanline, before the line
//! number advances; the frame edges are checked after it advances.
//!
//! NTSC timing with a 224-line screen:
//!
//! | Finished line | Counter action                |
//! |:--------------|:------------------------------|
//! | 0             | reload, decrement, may fire   |
//! | 1..=224       | decrement, may fire           |
//! | 225..=261     | reload, decrement             |
//!
//! The frame interrupt latches and asserts when the line number advances to
//! 224 and its enable bit is set; the coprocessor interrupt line rises there
//! no matter what and drops again one line later.

use crate::chips::{Coprocessor, MainProcessor};
use crate::vdp::Vdp;

/// Priority of the line (horizontal) interrupt.
pub const HINT_LEVEL: u8 = 4;

/// Priority of the frame (vertical) interrupt.
pub const VINT_LEVEL: u8 = 6;

#[derive(Debug, Default)]
pub struct InterruptCoordinator {
    hint_counter: i32,
}

impl InterruptCoordinator {
    pub fn new() -> Self {
        Self { hint_counter: 0 }
    }

    pub fn reset(&mut self) {
        self.hint_counter = 0;
    }

    pub fn hint_counter(&self) -> i32 {
        self.hint_counter
    }

    pub fn set_hint_counter(&mut self, value: i32) {
        self.hint_counter = value;
    }

    /// Line counter service for the line that just finished executing.
    /// `screen_height` is the frame-latched visible height.
    ///
    /// Line 0 and every line past the last visible one top the counter up
    /// from the reload register first. The decrement then runs on every
    /// line; underflow inside the active window latches the pending flag
    /// and asserts the interrupt, with the CPU signal suppressed while a
    /// frame interrupt is already pending. The counter reloads after any
    /// underflow, in or out of the window.
    pub fn end_of_line(
        &mut self,
        vdp: &mut Vdp,
        cpu: &mut dyn MainProcessor,
        scan_line: u16,
        screen_height: u16,
    ) {
        if scan_line == 0 || scan_line > screen_height {
            self.hint_counter = i32::from(vdp.hint_reload());
        }

        self.hint_counter -= 1;
        if self.hint_counter < 0 {
            if vdp.hint_enabled() && scan_line <= screen_height {
                vdp.hint_pending = true;
                if !vdp.vint_pending() {
                    cpu.set_interrupt_level(HINT_LEVEL);
                }
            }
            self.hint_counter = i32::from(vdp.hint_reload());
        }
    }

    /// Frame interrupt edges, checked after the line number advances.
    ///
    /// Entering the blanking region latches the status flag and interrupts
    /// the main CPU when unmasked, and raises the coprocessor line no
    /// matter what. The coprocessor line falls one line later.
    pub fn line_advanced(
        &self,
        vdp: &mut Vdp,
        cpu: &mut dyn MainProcessor,
        z80: &mut dyn Coprocessor,
        new_line: u16,
        screen_height: u16,
    ) {
        if new_line == screen_height {
            if vdp.vint_enabled() {
                vdp.trigger_vint();
                cpu.set_interrupt_level(VINT_LEVEL);
            }
            z80.set_interrupt_line(true);
        } else if new_line == screen_height + 1 {
            z80.set_interrupt_line(false);
        }
    }
}

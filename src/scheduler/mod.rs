//! Frame Scheduler
//!
//! Runs the machine one frame at a time at scanline granularity. Within a
//! line the main CPU runs first, then the coprocessor, then (in line sync
//! mode) the sound chips; the line is rendered if visible, the interrupt
//! counter is serviced, and the blanking edges are checked as the line
//! number advances. Output is submitted once per frame, honoring frameskip.
//!
//! The scheduler owns every clock. Chip cores never see wall time or each
//! other, only master-cycle targets handed to them here.

use log::{info, warn};
use std::path::Path;

use crate::audio::{mix_frame, SampleBuffer};
use crate::chips::{Coprocessor, LineRenderer, MainProcessor, SoundChip};
use crate::clock::{ClockDomain, LINES_PER_FRAME_NTSC, LINES_PER_FRAME_PAL};
use crate::config::{AudioSync, Config};
use crate::display::{
    AudioSink, DisplaySink, FrameBuffer, NullAudioSink, NullDisplaySink, SourceFormat,
};
use crate::savestate::{Savable, SaveError, SaveState};
use crate::snapshot;
use crate::vdp::Vdp;

pub mod interrupts;

use interrupts::InterruptCoordinator;

#[cfg(test)]
mod fixtures;



pub struct Scheduler {
    cpu: Box<dyn MainProcessor>,
    z80: Box<dyn Coprocessor>,
    fm: Box<dyn SoundChip>,
    psg: Box<dyn SoundChip>,
    renderer: Box<dyn LineRenderer>,
    vdp: Vdp,
    clocks: ClockDomain,
    interrupts: InterruptCoordinator,
    config: Config,
    framebuffer: FrameBuffer,
    fm_samples: SampleBuffer,
    psg_samples: SampleBuffer,
    mix: Vec<i16>,
    display: Box<dyn DisplaySink>,
    audio: Box<dyn AudioSink>,
    frame_counter: u64,
    source_format: Option<SourceFormat>,
}

impl Scheduler {
    /// Assemble a machine from chip cores. Sinks start out null; attach
    /// real ones with `set_display_sink` and `set_audio_sink`.
    pub fn new(
        cpu: Box<dyn MainProcessor>,
        z80: Box<dyn Coprocessor>,
        fm: Box<dyn SoundChip>,
        psg: Box<dyn SoundChip>,
        renderer: Box<dyn LineRenderer>,
        config: Config,
    ) -> Self {
        Self {
            cpu,
            z80,
            fm,
            psg,
            renderer,
            vdp: Vdp::new(),
            clocks: ClockDomain::new(),
            interrupts: InterruptCoordinator::new(),
            config,
            framebuffer: FrameBuffer::new(),
            fm_samples: SampleBuffer::default(),
            psg_samples: SampleBuffer::default(),
            mix: Vec::new(),
            display: Box::new(NullDisplaySink),
            audio: Box::new(NullAudioSink),
            frame_counter: 0,
            source_format: None,
        }
    }

    pub fn set_display_sink(&mut self, sink: Box<dyn DisplaySink>) {
        self.display = sink;
        // Force a format push before the next submitted frame.
        self.source_format = None;
    }

    pub fn set_audio_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.audio = sink;
    }

    pub fn vdp(&self) -> &Vdp {
        &self.vdp
    }

    pub fn vdp_mut(&mut self) -> &mut Vdp {
        &mut self.vdp
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Total scanlines in the current video standard. Latched once per
    /// frame along with the screen geometry; register writes mid-frame
    /// take effect on the next frame.
    fn lines_per_frame(&self) -> u16 {
        if self.vdp.pal_mode() {
            LINES_PER_FRAME_PAL
        } else {
            LINES_PER_FRAME_NTSC
        }
    }

    /// Execute one complete frame.
    pub fn run_frame(&mut self) {
        let draw_frame = self.frame_counter % u64::from(self.config.effective_frameskip()) == 0;

        let lines_per_frame = self.lines_per_frame();
        let width = self.vdp.screen_width();
        let height = self.vdp.screen_height();
        let format = SourceFormat::packed(width, height);
        if self.source_format != Some(format) {
            info!(
                "display mode {}x{}, {} lines per frame",
                width, height, lines_per_frame
            );
            self.framebuffer.set_geometry(width, height);
            self.display.set_source_format(format);
            self.source_format = Some(format);
        }

        // Render state is latched every frame, drawn or not.
        self.renderer.begin_frame(&self.vdp);

        self.clocks.begin_frame(
            self.config.z80_enabled,
            self.config.fm_enabled,
            self.config.psg_enabled,
        );

        let mut scan_line: u16 = 0;
        while scan_line < lines_per_frame {
            let target = self.clocks.line_target();

            self.cpu.run_until(target);
            if self.clocks.z80.lags(target) {
                self.z80.run_until(&mut self.clocks.z80, target);
            }
            if self.config.audio_sync == AudioSync::Line {
                self.run_sound_chips(target);
            }

            if draw_frame && scan_line < height {
                self.renderer
                    .render_line(&self.vdp, scan_line, self.framebuffer.line_mut(scan_line));
            }

            self.interrupts
                .end_of_line(&mut self.vdp, self.cpu.as_mut(), scan_line, height);

            scan_line += 1;
            self.interrupts.line_advanced(
                &mut self.vdp,
                self.cpu.as_mut(),
                self.z80.as_mut(),
                scan_line,
                height,
            );

            self.clocks.advance_line();
        }

        let frame_cycles = self.clocks.system;
        if self.config.audio_sync == AudioSync::Accurate {
            self.run_sound_chips(frame_cycles);
        }
        self.cpu.rebase(frame_cycles);

        if draw_frame {
            self.framebuffer.load_palette(self.vdp.color_table());
            self.display
                .submit(self.framebuffer.frame(), self.framebuffer.palette());
        }
        self.submit_audio();

        self.frame_counter += 1;
    }

    /// Bring the sound chips up to the main CPU's current position. Bus
    /// implementations call this before touching a sound chip register in
    /// accurate sync mode, so the chip state they observe is current.
    pub fn catch_up_audio(&mut self) {
        let target = self.cpu.position();
        self.run_sound_chips(target);
    }

    fn run_sound_chips(&mut self, target: u64) {
        if self.clocks.fm.lags(target) {
            self.fm
                .run_until(&mut self.clocks.fm, target, &mut self.fm_samples);
        }
        if self.clocks.psg.lags(target) {
            self.psg
                .run_until(&mut self.clocks.psg, target, &mut self.psg_samples);
        }
    }

    fn submit_audio(&mut self) {
        // Gate on the enables latched for the frame that just ran, not the
        // live config.
        if self.clocks.fm.is_enabled() || self.clocks.psg.is_enabled() {
            mix_frame(&mut self.fm_samples, &mut self.psg_samples, &mut self.mix);
            self.audio.submit(&self.mix);
        } else {
            self.fm_samples.clear();
            self.psg_samples.clear();
        }
    }

    /// Power-on reset of every chip and all scheduler state. Sinks and
    /// configuration survive.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.z80.reset();
        self.fm.reset();
        self.psg.reset();
        self.renderer.reset();
        self.vdp.reset();
        self.interrupts.reset();
        self.clocks = ClockDomain::new();
        self.framebuffer.clear();
        self.fm_samples.clear();
        self.psg_samples.clear();
        self.mix.clear();
        self.frame_counter = 0;
    }

    /// Save the most recently drawn frame as an image, for savestate
    /// preview thumbnails. Colors come from the live color table, not the
    /// panel-order palette.
    pub fn screenshot<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        match snapshot::save_frame(
            path,
            self.framebuffer.frame(),
            self.vdp.color_table(),
            self.framebuffer.width(),
            self.framebuffer.height(),
        ) {
            Ok(()) => {
                info!("screenshot saved to {}", path.display());
                true
            }
            Err(err) => {
                warn!("screenshot to {} failed: {}", path.display(), err);
                false
            }
        }
    }

    /// Write a savestate at a frame boundary. Returns whether the whole
    /// session succeeded; a failed session leaves a truncated file behind.
    pub fn save_state<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        match self.write_state(path) {
            Ok(()) => {
                info!("state saved to {}", path.display());
                true
            }
            Err(err) => {
                warn!("state save to {} failed: {}", path.display(), err);
                false
            }
        }
    }

    fn write_state(&self, path: &Path) -> Result<(), SaveError> {
        let mut state = SaveState::open_write(path)?;
        self.cpu.save_state(&mut state)?;
        self.z80.save_state(&mut state)?;
        self.fm.save_state(&mut state)?;
        self.psg.save_state(&mut state)?;
        self.vdp.save_state(&mut state)?;
        self.renderer.save_state(&mut state)?;
        state.write_u32("sched_hint_counter", self.interrupts.hint_counter() as u32)?;
        state.write_u32("sched_frame_counter", self.frame_counter as u32)?;
        Ok(())
    }

    /// Restore a savestate written at a frame boundary. Every subsystem
    /// must find all of its records; an unreadable file or any missed
    /// record falls back to a power-on reset and returns false.
    pub fn load_state<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        let mut state = match SaveState::open_read(path) {
            Ok(state) => state,
            Err(err) => {
                warn!("cannot open state {}: {}", path.display(), err);
                self.reset();
                return false;
            }
        };

        self.cpu.load_state(&mut state);
        self.z80.load_state(&mut state);
        self.fm.load_state(&mut state);
        self.psg.load_state(&mut state);
        self.vdp.load_state(&mut state);
        self.renderer.load_state(&mut state);
        if let Some(value) = state.read_u32("sched_hint_counter") {
            self.interrupts.set_hint_counter(value as i32);
        }
        if let Some(value) = state.read_u32("sched_frame_counter") {
            self.frame_counter = u64::from(value);
        }

        if state.errors() == 0 {
            self.clocks = ClockDomain::new();
            self.fm_samples.clear();
            self.psg_samples.clear();
            info!("state loaded from {}", path.display());
            true
        } else {
            warn!(
                "state restore from {} missed {} records, resetting",
                path.display(),
                state.errors()
            );
            self.reset();
            false
        }
    }
}

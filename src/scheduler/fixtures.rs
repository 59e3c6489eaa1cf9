//! Instrumented chip fakes for scheduler tests.
//!
//! Every fake appends to one shared `Trace`, so tests can assert on the
//! exact interleaving of CPU runs, interrupt asserts, rendering, and
//! output submission across a frame. Call counts live in shared cells and
//! are what the fakes persist into savestates.

use std::cell::RefCell;
use std::rc::Rc;

use crate::audio::SampleBuffer;
use crate::chips::{Coprocessor, LineRenderer, MainProcessor, SoundChip};
use crate::clock::ChipClock;
use crate::config::Config;
use crate::display::{AudioSink, DisplaySink, SourceFormat};
use crate::savestate::{Savable, SaveError, SaveState};
use crate::scheduler::Scheduler;
use crate::vdp::{Vdp, COLOR_TABLE_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CpuRun { target: u64 },
    CpuIrq { level: u8 },
    CpuRebase { cycles: u64 },
    CpuReset,
    Z80Run { target: u64 },
    Z80Irq { active: bool },
    Z80Reset,
    FmRun { target: u64 },
    FmReset,
    PsgRun { target: u64 },
    PsgReset,
    RenderBegin,
    RenderLine { line: u16 },
    RenderReset,
    FormatSet { width: u16, height: u16 },
    FrameSubmit { pixels: usize },
    AudioSubmit { samples: usize },
}

pub type Trace = Rc<RefCell<Vec<Event>>>;

pub fn events(trace: &Trace) -> Vec<Event> {
    trace.borrow().clone()
}

type Cell = Rc<RefCell<u32>>;

struct FakeCpu {
    trace: Trace,
    calls: Cell,
    position: Rc<RefCell<u64>>,
}

impl MainProcessor for FakeCpu {
    fn run_until(&mut self, target: u64) {
        *self.calls.borrow_mut() += 1;
        *self.position.borrow_mut() = target;
        self.trace.borrow_mut().push(Event::CpuRun { target });
    }

    fn position(&self) -> u64 {
        *self.position.borrow()
    }

    fn set_interrupt_level(&mut self, level: u8) {
        self.trace.borrow_mut().push(Event::CpuIrq { level });
    }

    fn rebase(&mut self, frame_cycles: u64) {
        let mut position = self.position.borrow_mut();
        *position = position.saturating_sub(frame_cycles);
        self.trace.borrow_mut().push(Event::CpuRebase {
            cycles: frame_cycles,
        });
    }

    fn reset(&mut self) {
        *self.calls.borrow_mut() = 0;
        *self.position.borrow_mut() = 0;
        self.trace.borrow_mut().push(Event::CpuReset);
    }
}

impl Savable for FakeCpu {
    fn save_state(&self, state: &mut SaveState) -> Result<(), SaveError> {
        state.write_u32("fake_cpu", *self.calls.borrow())
    }

    fn load_state(&mut self, state: &mut SaveState) {
        if let Some(value) = state.read_u32("fake_cpu") {
            *self.calls.borrow_mut() = value;
        }
    }
}

struct FakeZ80 {
    trace: Trace,
    calls: Cell,
}

impl Coprocessor for FakeZ80 {
    fn run_until(&mut self, clock: &mut ChipClock, target: u64) {
        *self.calls.borrow_mut() += 1;
        clock.catch_up(target);
        self.trace.borrow_mut().push(Event::Z80Run { target });
    }

    fn set_interrupt_line(&mut self, active: bool) {
        self.trace.borrow_mut().push(Event::Z80Irq { active });
    }

    fn reset(&mut self) {
        *self.calls.borrow_mut() = 0;
        self.trace.borrow_mut().push(Event::Z80Reset);
    }
}

impl Savable for FakeZ80 {
    fn save_state(&self, state: &mut SaveState) -> Result<(), SaveError> {
        state.write_u32("fake_z80", *self.calls.borrow())
    }

    fn load_state(&mut self, state: &mut SaveState) {
        if let Some(value) = state.read_u32("fake_z80") {
            *self.calls.borrow_mut() = value;
        }
    }
}

struct FakeSoundChip {
    trace: Trace,
    calls: Cell,
    tag: &'static str,
    /// Pushed on every run so mixing is observable downstream.
    sample_value: i16,
    samples_per_run: usize,
}

impl FakeSoundChip {
    fn event(&self, target: u64) -> Event {
        if self.tag == "fake_fm" {
            Event::FmRun { target }
        } else {
            Event::PsgRun { target }
        }
    }

    fn reset_event(&self) -> Event {
        if self.tag == "fake_fm" {
            Event::FmReset
        } else {
            Event::PsgReset
        }
    }
}

impl SoundChip for FakeSoundChip {
    fn run_until(&mut self, clock: &mut ChipClock, target: u64, out: &mut SampleBuffer) {
        *self.calls.borrow_mut() += 1;
        clock.catch_up(target);
        for _ in 0..self.samples_per_run {
            out.push_sample(self.sample_value);
        }
        let event = self.event(target);
        self.trace.borrow_mut().push(event);
    }

    fn reset(&mut self) {
        *self.calls.borrow_mut() = 0;
        let event = self.reset_event();
        self.trace.borrow_mut().push(event);
    }
}

impl Savable for FakeSoundChip {
    fn save_state(&self, state: &mut SaveState) -> Result<(), SaveError> {
        state.write_u32(self.tag, *self.calls.borrow())
    }

    fn load_state(&mut self, state: &mut SaveState) {
        if let Some(value) = state.read_u32(self.tag) {
            *self.calls.borrow_mut() = value;
        }
    }
}

struct FakeRenderer {
    trace: Trace,
    lines: Cell,
}

impl LineRenderer for FakeRenderer {
    fn begin_frame(&mut self, _vdp: &Vdp) {
        self.trace.borrow_mut().push(Event::RenderBegin);
    }

    fn render_line(&mut self, _vdp: &Vdp, line: u16, out: &mut [u8]) {
        *self.lines.borrow_mut() += 1;
        out.fill(line as u8);
        self.trace.borrow_mut().push(Event::RenderLine { line });
    }

    fn reset(&mut self) {
        *self.lines.borrow_mut() = 0;
        self.trace.borrow_mut().push(Event::RenderReset);
    }
}

impl Savable for FakeRenderer {
    fn save_state(&self, state: &mut SaveState) -> Result<(), SaveError> {
        state.write_u32("fake_render", *self.lines.borrow())
    }

    fn load_state(&mut self, state: &mut SaveState) {
        if let Some(value) = state.read_u32("fake_render") {
            *self.lines.borrow_mut() = value;
        }
    }
}

struct CapturingDisplay {
    trace: Trace,
    pixels: Rc<RefCell<Vec<u8>>>,
    palette: Rc<RefCell<Vec<u16>>>,
}

impl DisplaySink for CapturingDisplay {
    fn set_source_format(&mut self, format: SourceFormat) {
        self.trace.borrow_mut().push(Event::FormatSet {
            width: format.width,
            height: format.height,
        });
    }

    fn submit(&mut self, pixels: &[u8], palette: &[u16; COLOR_TABLE_LEN]) {
        *self.pixels.borrow_mut() = pixels.to_vec();
        *self.palette.borrow_mut() = palette.to_vec();
        self.trace.borrow_mut().push(Event::FrameSubmit {
            pixels: pixels.len(),
        });
    }
}

struct CapturingAudio {
    trace: Trace,
    samples: Rc<RefCell<Vec<i16>>>,
}

impl AudioSink for CapturingAudio {
    fn submit(&mut self, samples: &[i16]) {
        self.samples.borrow_mut().extend_from_slice(samples);
        self.trace.borrow_mut().push(Event::AudioSubmit {
            samples: samples.len(),
        });
    }
}

/// A scheduler over instrumented fakes plus handles into their state.
pub struct Machine {
    pub scheduler: Scheduler,
    pub trace: Trace,
    pub cpu_calls: Cell,
    pub cpu_position: Rc<RefCell<u64>>,
    pub z80_calls: Cell,
    pub fm_calls: Cell,
    pub psg_calls: Cell,
    pub lines_rendered: Cell,
    pub frame_pixels: Rc<RefCell<Vec<u8>>>,
    pub frame_palette: Rc<RefCell<Vec<u16>>>,
    pub audio_samples: Rc<RefCell<Vec<i16>>>,
}

/// FM pushes pairs of 100s, PSG pairs of 10s, so mixed frames read 110.
pub fn machine(config: Config) -> Machine {
    let trace: Trace = Rc::new(RefCell::new(Vec::new()));
    let cpu_calls: Cell = Rc::new(RefCell::new(0));
    let cpu_position = Rc::new(RefCell::new(0u64));
    let z80_calls: Cell = Rc::new(RefCell::new(0));
    let fm_calls: Cell = Rc::new(RefCell::new(0));
    let psg_calls: Cell = Rc::new(RefCell::new(0));
    let lines_rendered: Cell = Rc::new(RefCell::new(0));
    let frame_pixels = Rc::new(RefCell::new(Vec::new()));
    let frame_palette = Rc::new(RefCell::new(Vec::new()));
    let audio_samples = Rc::new(RefCell::new(Vec::new()));

    let mut scheduler = Scheduler::new(
        Box::new(FakeCpu {
            trace: trace.clone(),
            calls: cpu_calls.clone(),
            position: cpu_position.clone(),
        }),
        Box::new(FakeZ80 {
            trace: trace.clone(),
            calls: z80_calls.clone(),
        }),
        Box::new(FakeSoundChip {
            trace: trace.clone(),
            calls: fm_calls.clone(),
            tag: "fake_fm",
            sample_value: 100,
            samples_per_run: 2,
        }),
        Box::new(FakeSoundChip {
            trace: trace.clone(),
            calls: psg_calls.clone(),
            tag: "fake_psg",
            sample_value: 10,
            samples_per_run: 2,
        }),
        Box::new(FakeRenderer {
            trace: trace.clone(),
            lines: lines_rendered.clone(),
        }),
        config,
    );
    scheduler.set_display_sink(Box::new(CapturingDisplay {
        trace: trace.clone(),
        pixels: frame_pixels.clone(),
        palette: frame_palette.clone(),
    }));
    scheduler.set_audio_sink(Box::new(CapturingAudio {
        trace: trace.clone(),
        samples: audio_samples.clone(),
    }));

    Machine {
        scheduler,
        trace,
        cpu_calls,
        cpu_position,
        z80_calls,
        fm_calls,
        psg_calls,
        lines_rendered,
        frame_pixels,
        frame_palette,
        audio_samples,
    }
}

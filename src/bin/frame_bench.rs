use gencore::audio::SampleBuffer;
use gencore::chips::{Coprocessor, LineRenderer, MainProcessor, SoundChip};
use gencore::clock::ChipClock;
use gencore::savestate::{Savable, SaveError, SaveState};
use gencore::vdp::Vdp;
use gencore::{Config, Scheduler};
use std::time::Instant;

// Master cycles per output sample at the native FM rate.
const MCLK_PER_SAMPLE: u64 = 1008;

struct BusyCpu {
    position: u64,
}

impl MainProcessor for BusyCpu {
    fn run_until(&mut self, target: u64) {
        self.position = target;
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_interrupt_level(&mut self, _level: u8) {}

    fn rebase(&mut self, frame_cycles: u64) {
        self.position = self.position.saturating_sub(frame_cycles);
    }

    fn reset(&mut self) {
        self.position = 0;
    }
}

impl Savable for BusyCpu {
    fn save_state(&self, state: &mut SaveState) -> Result<(), SaveError> {
        state.write_u32("bench_cpu", self.position as u32)
    }

    fn load_state(&mut self, state: &mut SaveState) {
        if let Some(value) = state.read_u32("bench_cpu") {
            self.position = u64::from(value);
        }
    }
}

struct BusyZ80;

impl Coprocessor for BusyZ80 {
    fn run_until(&mut self, clock: &mut ChipClock, target: u64) {
        clock.catch_up(target);
    }

    fn set_interrupt_line(&mut self, _active: bool) {}

    fn reset(&mut self) {}
}

impl Savable for BusyZ80 {
    fn save_state(&self, _state: &mut SaveState) -> Result<(), SaveError> {
        Ok(())
    }

    fn load_state(&mut self, _state: &mut SaveState) {}
}

/// Produces samples at the real per-cycle rate so the mix path sees
/// realistic frame lengths.
struct Tone {
    level: i16,
}

impl SoundChip for Tone {
    fn run_until(&mut self, clock: &mut ChipClock, target: u64, out: &mut SampleBuffer) {
        let produced = clock.ticks() / MCLK_PER_SAMPLE;
        let wanted = target / MCLK_PER_SAMPLE;
        for _ in produced..wanted {
            self.level = -self.level;
            out.push_sample(self.level);
        }
        clock.catch_up(target);
    }

    fn reset(&mut self) {}
}

impl Savable for Tone {
    fn save_state(&self, _state: &mut SaveState) -> Result<(), SaveError> {
        Ok(())
    }

    fn load_state(&mut self, _state: &mut SaveState) {}
}

struct FlatRenderer;

impl LineRenderer for FlatRenderer {
    fn begin_frame(&mut self, _vdp: &Vdp) {}

    fn render_line(&mut self, _vdp: &Vdp, line: u16, out: &mut [u8]) {
        out.fill(line as u8);
    }

    fn reset(&mut self) {}
}

impl Savable for FlatRenderer {
    fn save_state(&self, _state: &mut SaveState) -> Result<(), SaveError> {
        Ok(())
    }

    fn load_state(&mut self, _state: &mut SaveState) {}
}

fn build_scheduler() -> Scheduler {
    Scheduler::new(
        Box::new(BusyCpu { position: 0 }),
        Box::new(BusyZ80),
        Box::new(Tone { level: 2000 }),
        Box::new(Tone { level: 500 }),
        Box::new(FlatRenderer),
        Config::default(),
    )
}

fn main() {
    env_logger::init();

    let mut scheduler = build_scheduler();

    let frames = 10_000u32;
    let start = Instant::now();
    for _ in 0..frames {
        scheduler.run_frame();
    }
    let duration = start.elapsed();

    println!("Time for {} frames: {:?}", frames, duration);
    println!(
        "Frames/sec: {:.0}",
        f64::from(frames) / duration.as_secs_f64()
    );
    println!(
        "Scanlines/sec: {:.0}",
        f64::from(frames) * 262.0 / duration.as_secs_f64()
    );

    let path = std::env::temp_dir().join(format!("gencore_bench_{}.state", std::process::id()));
    let rounds = 200u32;

    let start = Instant::now();
    for _ in 0..rounds {
        assert!(scheduler.save_state(&path));
    }
    let save_time = start.elapsed();

    let start = Instant::now();
    for _ in 0..rounds {
        assert!(scheduler.load_state(&path));
    }
    let load_time = start.elapsed();

    println!(
        "State save: {:?}/op, load: {:?}/op",
        save_time / rounds,
        load_time / rounds
    );

    let _ = std::fs::remove_file(&path);
}

//! Audio Sample Assembly
//!
//! Collects mono sample streams from the sound chips as they run and mixes
//! them into one frame's worth of output for the audio sink. Each chip owns
//! its own `SampleBuffer`; the scheduler mixes them at frame submission.

/// Native output rate of the FM synthesizer (master clock / 7 / 144).
pub const SAMPLE_RATE: u32 = 53267;

/// Samples one chip produces per NTSC frame, rounded up.
pub fn samples_per_frame() -> usize {
    (SAMPLE_RATE / 60 + 1) as usize
}

/// Ring buffer of mono i16 samples for one sound chip.
///
/// Pushes past capacity are dropped, pops past the fill level read silence,
/// so a chip that over- or under-produces for a frame cannot corrupt the
/// stream.
#[derive(Debug)]
pub struct SampleBuffer {
    buffer: Vec<i16>,
    write_pos: usize,
    read_pos: usize,
    available: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            write_pos: 0,
            read_pos: 0,
            available: 0,
        }
    }

    /// Append one sample, dropped silently when the buffer is full.
    pub fn push_sample(&mut self, sample: i16) {
        if self.available < self.buffer.len() {
            self.buffer[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.buffer.len();
            self.available += 1;
        }
    }

    /// Append a batch of samples.
    pub fn push(&mut self, samples: &[i16]) {
        for &sample in samples {
            self.push_sample(sample);
        }
    }

    /// Remove and return the oldest sample, or silence when empty.
    pub fn pop_sample(&mut self) -> i16 {
        if self.available > 0 {
            let sample = self.buffer[self.read_pos];
            self.read_pos = (self.read_pos + 1) % self.buffer.len();
            self.available -= 1;
            sample
        } else {
            0
        }
    }

    /// Number of buffered samples.
    pub fn available(&self) -> usize {
        self.available
    }

    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.read_pos = 0;
        self.available = 0;
    }
}

impl Default for SampleBuffer {
    /// Two frames of headroom over the nominal per-frame count.
    fn default() -> Self {
        Self::new(samples_per_frame() * 2)
    }
}

/// Mix one frame from both chip streams into `out`, draining them.
///
/// The frame length is the longer of the two streams; the shorter one is
/// padded with silence. Channels saturate rather than wrap when they sum
/// past i16 range.
pub fn mix_frame(fm: &mut SampleBuffer, psg: &mut SampleBuffer, out: &mut Vec<i16>) {
    let frame_len = fm.available().max(psg.available());
    out.clear();
    out.reserve(frame_len);
    for _ in 0..frame_len {
        out.push(fm.pop_sample().saturating_add(psg.pop_sample()));
    }
}

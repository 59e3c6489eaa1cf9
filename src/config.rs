//! Runtime Configuration
//!
//! Chip enables, frameskip, and the audio sync mode, persisted as JSON. The
//! on-disk key names (`yfm_enable`, `sn_enable`, `z80_enable`) predate this
//! crate and are kept so existing settings files keep working.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// How tightly the sound chips track the main CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSync {
    /// Chips advance opportunistically during the frame and are caught up
    /// to the frame boundary at its end.
    Accurate,
    /// Chips advance once per scanline.
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "yfm_enable")]
    pub fm_enabled: bool,
    #[serde(rename = "sn_enable")]
    pub psg_enabled: bool,
    #[serde(rename = "z80_enable")]
    pub z80_enabled: bool,
    /// Draw one of every `frameskip` frames. 0 is treated as 1.
    pub frameskip: u32,
    pub audio_sync: AudioSync,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fm_enabled: true,
            psg_enabled: true,
            z80_enabled: true,
            frameskip: 1,
            audio_sync: AudioSync::Line,
        }
    }
}

impl Config {
    /// Read a config file, falling back to defaults when it is missing or
    /// malformed. Missing keys take their default values.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => return config,
                Err(err) => warn!("ignoring malformed config: {}", err),
            },
            Err(_) => debug!("no config file, using defaults"),
        }
        Self::default()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Frameskip with the zero case clamped away.
    pub fn effective_frameskip(&self) -> u32 {
        self.frameskip.max(1)
    }
}

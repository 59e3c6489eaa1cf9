// Register indices
pub const REG_MODE1: usize = 0;
pub const REG_MODE2: usize = 1;
pub const REG_HINT_COUNTER: usize = 10;
pub const REG_MODE4: usize = 12;

// Mode bits
pub const MODE1_HINT_ENABLE: u8 = 0x10;
pub const MODE2_PAL_MODE: u8 = 0x08; // V30 cell mode, set by PAL software
pub const MODE2_VINT_ENABLE: u8 = 0x20;
pub const MODE4_H40_MODE: u8 = 0x01;

// Status bits
pub const STATUS_VINT_PENDING: u16 = 0x0080;

pub const NUM_REGISTERS: usize = 24;

/// Entries in the RGB565 color table exposed to the display pipeline:
/// 64 CRAM colors plus their shadow/highlight variants.
pub const COLOR_TABLE_LEN: usize = 256;

/// Flag values and constants sent along with the [`super::cmd::Cmd`] bytes.
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    // Driver Output Control (0x01) third byte
    pub const DRIVER_OUTPUT_GATE_SCAN_FROM_G0: u8 = 0x00;

    // Booster Soft Start Control (0x0C)
    pub const BOOSTER_SOFT_START_PHASE1: u8 = 0xD7;
    pub const BOOSTER_SOFT_START_PHASE2: u8 = 0xD6;
    pub const BOOSTER_SOFT_START_PHASE3: u8 = 0x9D;

    // VCOM (0x2C)
    pub const VCOM_DEFAULT: u8 = 0xA8;

    // Dummy line period (0x3A), 4 dummy lines per gate
    pub const DUMMY_LINE_PERIOD: u8 = 0x1A;

    // Gate time (0x3B), 2us per line
    pub const GATE_TIME: u8 = 0x08;

    // Data Entry Mode (0x11)
    pub const DATA_ENTRY_INCRY_INCRX: u8 = 0x03; // Y increment, X increment

    // Deep Sleep Mode (0x10)
    pub const DEEP_SLEEP_MODE_1: u8 = 0x01;

    // Display Update Control 2 (0x22): clock, analog, display pattern
    pub const DISPLAY_UPDATE_FULL: u8 = 0xC4;

    // Fill value for clear()
    pub const FILL_WHITE: u8 = 0xFF;
}

pub struct Cmd;
impl Cmd {
    // Init
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const BOOSTER_SOFT_START_CONTROL: u8 = 0x0C;
    pub const DEEP_SLEEP_MODE: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const WRITE_VCOM_REGISTER: u8 = 0x2C;
    pub const WRITE_LUT_REGISTER: u8 = 0x32;
    pub const SET_DUMMY_LINE_PERIOD: u8 = 0x3A;
    pub const SET_GATE_TIME: u8 = 0x3B;
    pub const SET_RAMX_START_END: u8 = 0x44;
    pub const SET_RAMY_START_END: u8 = 0x45;

    // Update
    pub const SET_RAMX_COUNTER: u8 = 0x4E;
    pub const SET_RAMY_COUNTER: u8 = 0x4F;
    pub const WRITE_BW_DATA: u8 = 0x24;
    pub const UPDATE_DISPLAY_CTRL2: u8 = 0x22;
    pub const MASTER_ACTIVATE: u8 = 0x20;
    pub const TERMINATE_FRAME_READ_WRITE: u8 = 0xFF;
}

/*
Vendor epd2in13 (V1) sequence uses these:
0x01 - Driver Output Control
0x0C - Booster Soft Start Control
0x2C - Write VCOM Register
0x3A - Set Dummy Line Period
0x3B - Set Gate Line Width
0x11 - Data Entry Mode
0x32 - Write LUT Register
0x44 - Set RAM X Address Start/End
0x45 - Set RAM Y Address Start/End
0x4E - Set RAM X Address Counter
0x4F - Set RAM Y Address Counter
0x24 - Write RAM
0x22 - Display Update Sequence Control
0x20 - Master Activation
0xFF - Terminate Frame Read/Write
0x10 - Deep Sleep Mode
*/

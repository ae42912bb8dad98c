pub const DATA: u8 = 0x00;
pub const END_OF_FILE: u8 = 0x01;
pub const EXTENDED_SEGMENT_ADDRESS: u8 = 0x02;
pub const START_SEGMENT_ADDRESS: u8 = 0x03;
pub const EXTENDED_LINEAR_ADDRESS: u8 = 0x04;
pub const START_LINEAR_ADDRESS: u8 = 0x05;

pub mod srec {
    pub const HEADER: u8 = 0;
    pub const DATA_16: u8 = 1;
    pub const DATA_24: u8 = 2;
    pub const DATA_32: u8 = 3;
    pub const COUNT_16: u8 = 5;
    pub const COUNT_24: u8 = 6;
    pub const START_32: u8 = 7;
    pub const START_24: u8 = 8;
    pub const START_16: u8 = 9;

    /// Number of address bytes carried by a record type, `None` for reserved types.
    pub fn address_len(record_type: u8) -> Option<usize> {
        match record_type {
            HEADER | DATA_16 | COUNT_16 | START_16 => Some(2),
            DATA_24 | COUNT_24 | START_24 => Some(3),
            DATA_32 | START_32 => Some(4),
            _ => None,
        }
    }
}

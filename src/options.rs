use log::debug;

use crate::{ChecksumRequest, ConfigError};

pub const MAX_LENGTH_LIMIT: u32 = 0x80_0000;

/// Everything a conversion needs to know besides the input lines.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Options {
    pub pad_byte: u8,
    pub starting_address: Option<u32>,
    pub max_length: Option<u32>,
    pub minimum_block_size: Option<u32>,
    pub floor_address: Option<u32>,
    pub ceiling_address: Option<u32>,
    /// Store each byte at its address XOR 1.
    pub swap_wordwise: bool,
    /// Intel Hex load offsets count 16-bit words.
    pub address_alignment_word: bool,
    /// Record checksum mismatches fail the conversion.
    pub enable_checksum_error: bool,
    pub checksum: ChecksumRequest,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pad_byte: 0xFF,
            starting_address: None,
            max_length: None,
            minimum_block_size: None,
            floor_address: None,
            ceiling_address: None,
            swap_wordwise: false,
            address_alignment_word: false,
            enable_checksum_error: false,
            checksum: ChecksumRequest::default(),
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(floor), Some(ceiling)) = (self.floor_address, self.ceiling_address) {
            if floor >= ceiling {
                return Err(ConfigError::FloorAboveCeiling { floor, ceiling });
            }
        }

        if let Some(length) = self.max_length {
            if length > MAX_LENGTH_LIMIT {
                return Err(ConfigError::MaxLengthTooLarge(length));
            }
        }

        if self.minimum_block_size == Some(0) {
            return Err(ConfigError::ZeroBlockSize);
        }

        if self.checksum.crc.is_some() && !self.checksum.algorithm.is_crc() {
            return Err(ConfigError::CrcParamsWithoutCrc);
        }

        if self.checksum.forced_value.is_some() {
            if self.checksum.range.is_some() {
                return Err(ConfigError::ForcedValueWithRange);
            }
            if self.checksum.target_address.is_none() {
                return Err(ConfigError::ForcedValueWithoutAddress);
            }
        }

        Ok(())
    }

    /// Whether a data record survives the floor and ceiling addresses.
    ///
    /// Both limits are taken relative to the starting address.
    pub fn admits(&self, address: u32, len: usize) -> bool {
        let start = self.starting_address.unwrap_or(0);

        if let Some(floor) = self.floor_address {
            let floor = floor.saturating_sub(start);
            if address < floor {
                debug!("Discard physical address less than {floor:08X}");
                return false;
            }
        }

        if let Some(ceiling) = self.ceiling_address {
            let ceiling = ceiling.saturating_add(start);
            let last = address.saturating_add((len as u32).saturating_sub(1));
            if last > ceiling {
                debug!("Discard physical address more than {ceiling:08X}");
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Algorithm, CrcParams};

    #[test]
    fn defaults_are_valid() {
        let options = Options::default();

        assert_eq!(options.pad_byte, 0xFF);
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn floor_must_be_below_ceiling() {
        let options = Options {
            floor_address: Some(0x2000),
            ceiling_address: Some(0x2000),
            ..Options::default()
        };

        assert_eq!(
            options.validate(),
            Err(ConfigError::FloorAboveCeiling {
                floor: 0x2000,
                ceiling: 0x2000
            })
        );
    }

    #[test]
    fn rejects_bad_combinations() {
        let too_long = Options {
            max_length: Some(MAX_LENGTH_LIMIT + 1),
            ..Options::default()
        };
        assert_eq!(
            too_long.validate(),
            Err(ConfigError::MaxLengthTooLarge(MAX_LENGTH_LIMIT + 1))
        );

        let zero_block = Options {
            minimum_block_size: Some(0),
            ..Options::default()
        };
        assert_eq!(zero_block.validate(), Err(ConfigError::ZeroBlockSize));

        let mut crc_on_sum = Options::default();
        crc_on_sum.checksum.crc = Some(CrcParams::default());
        assert_eq!(crc_on_sum.validate(), Err(ConfigError::CrcParamsWithoutCrc));
        crc_on_sum.checksum.algorithm = Algorithm::Crc16;
        assert_eq!(crc_on_sum.validate(), Ok(()));

        let mut forced = Options::default();
        forced.checksum.forced_value = Some(0xAB);
        assert_eq!(
            forced.validate(),
            Err(ConfigError::ForcedValueWithoutAddress)
        );
        forced.checksum.target_address = Some(0x10);
        assert_eq!(forced.validate(), Ok(()));
        forced.checksum.range = Some((0, 0x0F));
        assert_eq!(forced.validate(), Err(ConfigError::ForcedValueWithRange));
    }

    #[test]
    fn floor_and_ceiling_clip_records() {
        let options = Options {
            floor_address: Some(0x100),
            ceiling_address: Some(0x1FF),
            ..Options::default()
        };

        assert!(!options.admits(0xF0, 16));
        assert!(options.admits(0x100, 16));
        assert!(options.admits(0x1F0, 16));
        assert!(!options.admits(0x1F1, 16));
    }

    #[test]
    fn limits_follow_starting_address() {
        let options = Options {
            starting_address: Some(0x40),
            floor_address: Some(0x100),
            ceiling_address: Some(0x1FF),
            ..Options::default()
        };

        assert!(options.admits(0xC0, 1));
        assert!(!options.admits(0xBF, 1));
        assert!(options.admits(0x23F, 1));
        assert!(!options.admits(0x240, 1));
    }
}

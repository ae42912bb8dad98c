use core::fmt;

use crate::checksum::{checksum, ones_complement};
use crate::record::Decoded;
use crate::{ihex, srec, ParseError};

/// The text encodings a firmware image can arrive in.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Encoding {
    IntelHex,
    Motorola,
}

impl Encoding {
    pub fn decode_line(&self, line: &str) -> Result<Decoded, ParseError> {
        match self {
            Self::IntelHex => ihex::parse(line),
            Self::Motorola => srec::parse(line),
        }
    }

    /// Checksum byte a record with these fields must carry.
    pub fn record_checksum(&self, fields: &[u8]) -> u8 {
        match self {
            Self::IntelHex => checksum(fields),
            Self::Motorola => ones_complement(fields),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntelHex => f.write_str("Intel Hex"),
            Self::Motorola => f.write_str("Motorola S-record"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    #[test]
    fn dispatches_on_encoding() {
        assert_eq!(
            Encoding::IntelHex.decode_line(":00000001FF").unwrap().record,
            Record::EndOfFile
        );
        assert_eq!(
            Encoding::Motorola.decode_line("S9030000FC").unwrap().record,
            Record::StartAddress(0)
        );
        assert!(Encoding::Motorola.decode_line(":00000001FF").is_err());
    }

    #[test]
    fn checksum_rules_differ() {
        let fields = [0x03, 0x00, 0x00];

        assert_eq!(Encoding::IntelHex.record_checksum(&fields), 0xFD);
        assert_eq!(Encoding::Motorola.record_checksum(&fields), 0xFC);
    }
}

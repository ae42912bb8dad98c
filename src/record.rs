use crate::types;

/// One decoded line of either encoding.
///
/// `Data::address` is the raw address field: the 16-bit load offset for
/// Intel Hex, the full 16/24/32-bit address for S-records.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Record {
    Data {
        address: u32,
        bytes: Vec<u8>,
    },
    EndOfFile,
    ExtendedSegmentAddress(u16),
    StartSegmentAddress {
        cs: u16,
        ip: u16,
    },
    ExtendedLinearAddress(u16),
    StartLinearAddress(u32),
    Header(Vec<u8>),
    Count(u32),
    StartAddress(u32),
}

impl Record {
    /// Intel Hex record type, `None` for S-record only variants.
    pub fn record_type(&self) -> Option<u8> {
        match self {
            Self::Data { .. } => Some(types::DATA),
            Self::EndOfFile => Some(types::END_OF_FILE),
            Self::ExtendedSegmentAddress(_) => Some(types::EXTENDED_SEGMENT_ADDRESS),
            Self::StartSegmentAddress { .. } => Some(types::START_SEGMENT_ADDRESS),
            Self::ExtendedLinearAddress(_) => Some(types::EXTENDED_LINEAR_ADDRESS),
            Self::StartLinearAddress(_) => Some(types::START_LINEAR_ADDRESS),
            Self::Header(_) | Self::Count(_) | Self::StartAddress(_) => None,
        }
    }

    pub fn data(address: u32, bytes: &[u8]) -> Self {
        Self::Data {
            address,
            bytes: bytes.to_vec(),
        }
    }
}

/// Checksum byte carried by a record next to the value its fields call for.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RecordChecksum {
    pub stored: u8,
    pub expected: u8,
}

impl RecordChecksum {
    pub fn is_valid(&self) -> bool {
        self.stored == self.expected
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Decoded {
    pub record: Record,
    pub checksum: RecordChecksum,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intel_record_types() {
        assert_eq!(Record::data(0, &[1]).record_type(), Some(types::DATA));
        assert_eq!(Record::EndOfFile.record_type(), Some(types::END_OF_FILE));
        assert_eq!(
            Record::ExtendedLinearAddress(0x0800).record_type(),
            Some(types::EXTENDED_LINEAR_ADDRESS)
        );
        assert_eq!(Record::Count(3).record_type(), None);
    }

    #[test]
    fn checksum_validity() {
        let good = RecordChecksum {
            stored: 0xA7,
            expected: 0xA7,
        };
        let bad = RecordChecksum {
            stored: 0xA6,
            expected: 0xA7,
        };

        assert!(good.is_valid());
        assert!(!bad.is_valid());
    }
}

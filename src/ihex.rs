use crate::checksum::checksum;
use crate::record::{Decoded, Record, RecordChecksum};
use crate::types;
use crate::ParseError;

// 255 data bytes plus length, offset, type and checksum.
const MAX_RECORD_LEN: usize = 0xFF + 5;

fn be16(bytes: &[u8]) -> u16 {
    let mut short = [0; 2];
    short.clone_from_slice(&bytes[0..2]);
    u16::from_be_bytes(short)
}

fn expect_len(data: &[u8], length: usize) -> Result<(), ParseError> {
    if data.len() != length {
        return Err(ParseError::BadLength);
    }
    Ok(())
}

/// Decodes one `:llaaaatt[dd...]cc` line.
///
/// A wrong checksum does not reject the record; the caller decides what a
/// mismatch means through [`RecordChecksum`].
pub fn parse<T: AsRef<[u8]>>(line: T) -> Result<Decoded, ParseError> {
    let line = crate::parser::strip(line.as_ref());

    if line.first() != Some(&b':') {
        return Err(ParseError::MissingStartCode(':'));
    }

    let line = &line[1..];

    if line.len() % 2 != 0 {
        return Err(ParseError::ParseError);
    }

    let length = line.len() / 2;

    if !(5..=MAX_RECORD_LEN).contains(&length) {
        return Err(ParseError::BadLength);
    }

    let mut bytes = [0; MAX_RECORD_LEN];

    if hex::decode_to_slice(line, &mut bytes[..length]).is_err() {
        return Err(ParseError::ParseError);
    }

    let stored = bytes[length - 1];
    let fields = &bytes[..length - 1];

    let data_length = fields[0] as usize;
    let offset = be16(&fields[1..3]);
    let record_type = fields[3];
    let data = &fields[4..];

    expect_len(data, data_length)?;

    let record = match record_type {
        types::DATA => Record::data(u32::from(offset), data),
        types::END_OF_FILE => Record::EndOfFile,
        types::EXTENDED_SEGMENT_ADDRESS => {
            expect_len(data, 2)?;
            Record::ExtendedSegmentAddress(be16(data))
        }
        types::START_SEGMENT_ADDRESS => {
            expect_len(data, 4)?;
            Record::StartSegmentAddress {
                cs: be16(&data[0..2]),
                ip: be16(&data[2..4]),
            }
        }
        types::EXTENDED_LINEAR_ADDRESS => {
            expect_len(data, 2)?;
            Record::ExtendedLinearAddress(be16(data))
        }
        types::START_LINEAR_ADDRESS => {
            expect_len(data, 4)?;
            let mut word = [0; 4];
            word.clone_from_slice(&data[0..4]);
            Record::StartLinearAddress(u32::from_be_bytes(word))
        }
        other => return Err(ParseError::BadType(other)),
    };

    Ok(Decoded {
        record,
        checksum: RecordChecksum {
            stored,
            expected: checksum(fields),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str) -> Record {
        let decoded = parse(line).unwrap();
        assert!(decoded.checksum.is_valid(), "{line}");
        decoded.record
    }

    #[test]
    fn parse_data() {
        let expected = [
            0x61, 0x64, 0x64, 0x72, 0x65, 0x73, 0x73, 0x20, 0x67, 0x61, 0x70,
        ];

        assert_eq!(
            record(":0B0010006164647265737320676170A7"),
            Record::data(0x0010, &expected)
        );
    }

    #[test]
    fn parse_lowercase_and_line_endings() {
        assert_eq!(record(":00000001ff\r\n"), Record::EndOfFile);
    }

    #[test]
    fn trailing_whitespace_is_ignored() {
        assert_eq!(record(":0100000001FE \t\r\n"), Record::data(0, &[1]));
    }

    #[test]
    fn parse_eof() {
        assert_eq!(record(":00000001FF"), Record::EndOfFile);
    }

    #[test]
    fn parse_extended_segment_address() {
        assert_eq!(
            record(":0200000212FEEC"),
            Record::ExtendedSegmentAddress(0x12FE)
        );
    }

    #[test]
    fn parse_start_segment_address() {
        assert_eq!(
            record(":04000003123438007B"),
            Record::StartSegmentAddress {
                cs: 0x1234,
                ip: 0x3800
            }
        );
    }

    #[test]
    fn parse_extended_linear_address() {
        assert_eq!(
            record(":02000004ABCD82"),
            Record::ExtendedLinearAddress(0xABCD)
        );
    }

    #[test]
    fn parse_start_linear_address() {
        assert_eq!(
            record(":0400000512345678E3"),
            Record::StartLinearAddress(0x12345678)
        );
    }

    #[test]
    fn bad_checksum_still_decodes() {
        let decoded = parse(":0B0010006164647265737320676170A6").unwrap();

        assert_eq!(
            decoded.checksum,
            RecordChecksum {
                stored: 0xA6,
                expected: 0xA7
            }
        );
        assert!(matches!(decoded.record, Record::Data { address: 0x10, .. }));
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(parse("0B0010"), Err(ParseError::MissingStartCode(':')));
        assert_eq!(parse(""), Err(ParseError::MissingStartCode(':')));
        assert_eq!(parse(":0000000"), Err(ParseError::ParseError));
        assert_eq!(parse(":00000001GG"), Err(ParseError::ParseError));
        assert_eq!(parse(":000001"), Err(ParseError::BadLength));
        assert_eq!(parse(":0300000001FC"), Err(ParseError::BadLength));
        assert_eq!(parse(":0000000001FF"), Err(ParseError::BadLength));
        assert_eq!(parse(":00000006FA"), Err(ParseError::BadType(6)));
    }
}

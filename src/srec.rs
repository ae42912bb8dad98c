use crate::checksum::ones_complement;
use crate::record::{Decoded, Record, RecordChecksum};
use crate::types::srec;
use crate::ParseError;

const MAX_RECORD_LEN: usize = 0xFF + 1;

/// Decodes one `Stllaaaa[dd...]cc` line.
///
/// The length byte counts address, data and checksum bytes; only what is
/// left after the address and checksum is payload.
pub fn parse<T: AsRef<[u8]>>(line: T) -> Result<Decoded, ParseError> {
    let line = crate::parser::strip(line.as_ref());

    if line.first() != Some(&b'S') {
        return Err(ParseError::MissingStartCode('S'));
    }

    let record_type = match line.get(1) {
        Some(digit) if digit.is_ascii_digit() => digit - b'0',
        Some(&other) => return Err(ParseError::BadType(other)),
        None => return Err(ParseError::BadLength),
    };

    let line = &line[2..];

    if line.len() % 2 != 0 {
        return Err(ParseError::ParseError);
    }

    let length = line.len() / 2;

    if !(1..=MAX_RECORD_LEN).contains(&length) {
        return Err(ParseError::BadLength);
    }

    let mut bytes = [0; MAX_RECORD_LEN];

    if hex::decode_to_slice(line, &mut bytes[..length]).is_err() {
        return Err(ParseError::ParseError);
    }

    let address_len = srec::address_len(record_type).ok_or(ParseError::BadType(record_type))?;

    let count = bytes[0] as usize;
    if length != count + 1 || count < address_len + 1 {
        return Err(ParseError::BadLength);
    }

    let stored = bytes[length - 1];
    let fields = &bytes[..length - 1];

    let address = fields[1..=address_len]
        .iter()
        .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte));
    let data = &fields[1 + address_len..];

    let record = match record_type {
        srec::HEADER => Record::Header(data.to_vec()),
        srec::DATA_16 | srec::DATA_24 | srec::DATA_32 => Record::data(address, data),
        srec::COUNT_16 | srec::COUNT_24 => Record::Count(address),
        _ => Record::StartAddress(address),
    };

    Ok(Decoded {
        record,
        checksum: RecordChecksum {
            stored,
            expected: ones_complement(fields),
        },
    })
}

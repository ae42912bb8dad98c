use crate::types::{self, srec};
use crate::{Encoding, Record, SerializeError};

/// Most data bytes [`encode_image`] puts on one line.
pub const MAX_LINE_DATA: usize = 250;

const LINE_BUFFER: usize = 0x210;

impl Record {
    /// Writes the record as one line of `encoding`, without a line terminator.
    ///
    /// S-record data and start address records get the narrowest address
    /// field their address fits in.
    pub fn serialize<T>(&self, encoding: Encoding, buffer: &mut T) -> Result<usize, SerializeError>
    where
        T: AsMut<[u8]>,
    {
        let buffer = buffer.as_mut();

        match encoding {
            Encoding::IntelHex => self.serialize_ihex(buffer),
            Encoding::Motorola => self.serialize_srec(buffer),
        }
    }

    fn serialize_ihex(&self, buffer: &mut [u8]) -> Result<usize, SerializeError> {
        let record_type = self.record_type().ok_or(SerializeError::Unrepresentable)?;

        match self {
            Self::Data { address, bytes } => {
                let offset =
                    u16::try_from(*address).map_err(|_| SerializeError::AddressTooLarge(*address))?;
                format_ihex(record_type, offset, bytes, buffer)
            }
            Self::EndOfFile => format_ihex(record_type, 0, &[], buffer),
            Self::ExtendedSegmentAddress(address) | Self::ExtendedLinearAddress(address) => {
                format_ihex(record_type, 0, &address.to_be_bytes(), buffer)
            }
            Self::StartSegmentAddress { cs, ip } => {
                let mut word = [0; 4];
                word[..2].copy_from_slice(&cs.to_be_bytes());
                word[2..].copy_from_slice(&ip.to_be_bytes());

                format_ihex(record_type, 0, &word, buffer)
            }
            Self::StartLinearAddress(address) => {
                format_ihex(record_type, 0, &address.to_be_bytes(), buffer)
            }
            Self::Header(_) | Self::Count(_) | Self::StartAddress(_) => {
                Err(SerializeError::Unrepresentable)
            }
        }
    }

    fn serialize_srec(&self, buffer: &mut [u8]) -> Result<usize, SerializeError> {
        match self {
            Self::Header(bytes) => format_srec(srec::HEADER, 0, bytes, buffer),
            Self::Data { address, bytes } => {
                format_srec(data_type(*address), *address, bytes, buffer)
            }
            Self::Count(count) => {
                let record_type = if *count <= 0xFFFF {
                    srec::COUNT_16
                } else {
                    srec::COUNT_24
                };
                format_srec(record_type, *count, &[], buffer)
            }
            Self::StartAddress(address) => {
                let record_type = termination_type(data_type(*address));
                format_srec(record_type, *address, &[], buffer)
            }
            _ => Err(SerializeError::Unrepresentable),
        }
    }
}

/// Narrowest S-record data type able to address `highest`.
fn data_type(highest: u32) -> u8 {
    if highest <= 0xFFFF {
        srec::DATA_16
    } else if highest <= 0xFF_FFFF {
        srec::DATA_24
    } else {
        srec::DATA_32
    }
}

fn termination_type(data_type: u8) -> u8 {
    match data_type {
        srec::DATA_16 => srec::START_16,
        srec::DATA_24 => srec::START_24,
        _ => srec::START_32,
    }
}

fn format_ihex(
    record_type: u8,
    offset: u16,
    data: &[u8],
    buffer: &mut [u8],
) -> Result<usize, SerializeError> {
    if data.len() > 0xFF {
        return Err(SerializeError::PayloadTooLong(data.len()));
    }

    let length = 4 + data.len();
    let mut fields = [0; 0x104];
    fields[0] = data.len() as u8;
    fields[1..3].copy_from_slice(&offset.to_be_bytes());
    fields[3] = record_type;
    fields[4..length].copy_from_slice(data);
    fields[length] = Encoding::IntelHex.record_checksum(&fields[..length]);

    write_line(b":", &fields[..=length], buffer)
}

fn format_srec(
    record_type: u8,
    address: u32,
    data: &[u8],
    buffer: &mut [u8],
) -> Result<usize, SerializeError> {
    let address_len = srec::address_len(record_type).ok_or(SerializeError::Unrepresentable)?;

    let count = address_len + data.len() + 1;
    if count > 0xFF {
        return Err(SerializeError::PayloadTooLong(data.len()));
    }
    if address_len < 4 && address >> (8 * address_len) != 0 {
        return Err(SerializeError::AddressTooLarge(address));
    }

    let mut fields = [0; 0x100];
    fields[0] = count as u8;
    fields[1..=address_len].copy_from_slice(&address.to_be_bytes()[4 - address_len..]);
    fields[1 + address_len..count].copy_from_slice(data);
    fields[count] = Encoding::Motorola.record_checksum(&fields[..count]);

    write_line(&[b'S', b'0' + record_type], &fields[..=count], buffer)
}

fn write_line(start: &[u8], fields: &[u8], buffer: &mut [u8]) -> Result<usize, SerializeError> {
    let length = start.len() + 2 * fields.len();
    if buffer.len() < length {
        return Err(SerializeError::BufferTooSmall(length));
    }

    buffer[..start.len()].copy_from_slice(start);
    hex::encode_to_slice(fields, &mut buffer[start.len()..length])
        .map_err(|_| SerializeError::BufferTooSmall(length))?;
    buffer[start.len()..length].make_ascii_uppercase();

    Ok(length)
}

fn push_line(out: &mut String, line: &[u8]) {
    out.extend(line.iter().copied().map(char::from));
    out.push('\n');
}

/// Renders `data` loaded at `base` as a complete file.
///
/// Intel Hex output switches segments with extended linear address records
/// and never lets a data record cross a 64K boundary. S-record output uses
/// the narrowest address width for the whole file, followed by a count and a
/// start address record.
pub fn encode_image(
    encoding: Encoding,
    base: u32,
    data: &[u8],
    bytes_per_line: usize,
) -> Result<String, SerializeError> {
    let bytes_per_line = bytes_per_line.clamp(1, MAX_LINE_DATA);
    let highest = u32::try_from(data.len().saturating_sub(1))
        .ok()
        .and_then(|span| base.checked_add(span))
        .ok_or(SerializeError::AddressTooLarge(base))?;

    let mut out = String::new();
    let mut buffer = [0u8; LINE_BUFFER];

    match encoding {
        Encoding::IntelHex => {
            let mut upper = 0u16;
            let mut address = base;
            let mut rest = data;

            while !rest.is_empty() {
                let high = (address >> 16) as u16;
                if high != upper {
                    let length =
                        Record::ExtendedLinearAddress(high).serialize(encoding, &mut buffer)?;
                    push_line(&mut out, &buffer[..length]);
                    upper = high;
                }

                let to_boundary = 0x1_0000 - (address & 0xFFFF) as usize;
                let take = rest.len().min(bytes_per_line).min(to_boundary);
                let length = format_ihex(
                    types::DATA,
                    address as u16,
                    &rest[..take],
                    &mut buffer,
                )?;
                push_line(&mut out, &buffer[..length]);

                address = address.wrapping_add(take as u32);
                rest = &rest[take..];
            }

            let length = Record::EndOfFile.serialize(encoding, &mut buffer)?;
            push_line(&mut out, &buffer[..length]);
        }
        Encoding::Motorola => {
            let record_type = data_type(highest);

            let length = format_srec(srec::HEADER, 0, &[], &mut buffer)?;
            push_line(&mut out, &buffer[..length]);

            let mut address = base;
            let mut records = 0u32;
            for chunk in data.chunks(bytes_per_line) {
                let length = format_srec(record_type, address, chunk, &mut buffer)?;
                push_line(&mut out, &buffer[..length]);
                address = address.wrapping_add(chunk.len() as u32);
                records += 1;
            }

            if records <= 0xFF_FFFF {
                let length = Record::Count(records).serialize(encoding, &mut buffer)?;
                push_line(&mut out, &buffer[..length]);
            }

            let length = format_srec(termination_type(record_type), base, &[], &mut buffer)?;
            push_line(&mut out, &buffer[..length]);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    fn line(record: &Record, encoding: Encoding) -> Vec<u8> {
        let mut buffer = [0u8; LINE_BUFFER];
        let length = record.serialize(encoding, &mut buffer).unwrap();
        buffer[..length].to_vec()
    }

    #[test]
    fn serialize_data() {
        let record = Record::data(0x0010, b"address gap");

        assert_eq!(
            line(&record, Encoding::IntelHex),
            b":0B0010006164647265737320676170A7"
        );
    }

    #[test]
    fn serialize_eof() {
        assert_eq!(line(&Record::EndOfFile, Encoding::IntelHex), b":00000001FF");
    }

    #[test]
    fn serialize_extended_segment_address() {
        assert_eq!(
            line(&Record::ExtendedSegmentAddress(0x12FE), Encoding::IntelHex),
            b":0200000212FEEC"
        );
    }

    #[test]
    fn serialize_start_segment_address() {
        let record = Record::StartSegmentAddress {
            cs: 0x1234,
            ip: 0x3800,
        };

        assert_eq!(line(&record, Encoding::IntelHex), b":04000003123438007B");
    }

    #[test]
    fn serialize_extended_linear_address() {
        assert_eq!(
            line(&Record::ExtendedLinearAddress(0xABCD), Encoding::IntelHex),
            b":02000004ABCD82"
        );
    }

    #[test]
    fn serialize_start_linear_address() {
        assert_eq!(
            line(&Record::StartLinearAddress(0x12345678), Encoding::IntelHex),
            b":0400000512345678E3"
        );
    }

    #[test]
    fn serialize_srecords() {
        let motorola = Encoding::Motorola;

        assert_eq!(line(&Record::Header(b"HDR".to_vec()), motorola), b"S00600004844521B");
        assert_eq!(line(&Record::data(0x0010, &[]), motorola), b"S1030010EC");
        assert_eq!(line(&Record::data(0x01_0000, &[1, 2]), motorola), b"S2060100000102F5");
        assert_eq!(
            line(&Record::data(0x0800_0000, &[0xAA, 0xBB]), motorola),
            b"S30708000000AABB8B"
        );
        assert_eq!(line(&Record::Count(3), motorola), b"S5030003F9");
        assert_eq!(line(&Record::StartAddress(0), motorola), b"S9030000FC");
        assert_eq!(
            line(&Record::StartAddress(0x0800_0000), motorola),
            b"S70508000000F2"
        );
    }

    #[test]
    fn refuses_what_the_encoding_cannot_hold() {
        let mut buffer = [0u8; LINE_BUFFER];

        assert_eq!(
            Record::Header(vec![]).serialize(Encoding::IntelHex, &mut buffer),
            Err(SerializeError::Unrepresentable)
        );
        assert_eq!(
            Record::data(0x1_0000, &[0]).serialize(Encoding::IntelHex, &mut buffer),
            Err(SerializeError::AddressTooLarge(0x1_0000))
        );
        assert_eq!(
            Record::ExtendedLinearAddress(1).serialize(Encoding::Motorola, &mut buffer),
            Err(SerializeError::Unrepresentable)
        );
        assert_eq!(
            Record::data(0, &[0; 256]).serialize(Encoding::IntelHex, &mut buffer),
            Err(SerializeError::PayloadTooLong(256))
        );

        let mut small = [0u8; 8];
        assert_eq!(
            Record::EndOfFile.serialize(Encoding::IntelHex, &mut small),
            Err(SerializeError::BufferTooSmall(11))
        );
    }

    #[test]
    fn intel_image_crosses_segments() {
        let data: Vec<u8> = (0..16).collect();
        let text = encode_image(Encoding::IntelHex, 0xFFF8, &data, 16).unwrap();

        let records: Vec<Record> = Parser::new(&text, Encoding::IntelHex)
            .map(|(_, result)| result.unwrap().record)
            .collect();

        assert_eq!(
            records,
            vec![
                Record::data(0xFFF8, &data[..8]),
                Record::ExtendedLinearAddress(1),
                Record::data(0x0000, &data[8..]),
                Record::EndOfFile,
            ]
        );
    }

    #[test]
    fn motorola_image_uses_one_address_width() {
        let data = [0x5A; 20];
        let text = encode_image(Encoding::Motorola, 0xFFF0, &data, 16).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("S0"));
        assert!(lines[1].starts_with("S2"));
        assert!(lines[2].starts_with("S2"));
        assert!(lines[3].starts_with("S5"));
        assert!(lines[4].starts_with("S8"));

        for (_, result) in Parser::new(&text, Encoding::Motorola) {
            assert!(result.unwrap().checksum.is_valid());
        }
    }
}

use core::fmt;

use log::{info, warn};

use crate::crc::{Crc, CrcWidth};
use crate::{CheckError, ConfigError, MemoryImage};

/// Check methods, numbered as on the command line.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Algorithm {
    /// Bytes summed into 8 bits.
    #[default]
    Sum8,
    /// 16-bit words summed into 16 bits, words read in the configured endianness.
    Sum16,
    /// Bytes summed into 16 bits.
    Sum16Bytes,
    /// Bytes summed into 32 bits.
    Sum32Bytes,
    Crc8,
    Crc16,
    Crc32,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Self::Sum8,
        Self::Sum16,
        Self::Sum16Bytes,
        Self::Sum32Bytes,
        Self::Crc8,
        Self::Crc16,
        Self::Crc32,
    ];

    /// Bytes taken by the result in the image.
    pub fn width(self) -> usize {
        match self {
            Self::Sum8 | Self::Crc8 => 1,
            Self::Sum16 | Self::Sum16Bytes | Self::Crc16 => 2,
            Self::Sum32Bytes | Self::Crc32 => 4,
        }
    }

    pub fn crc_width(self) -> Option<CrcWidth> {
        match self {
            Self::Crc8 => Some(CrcWidth::W8),
            Self::Crc16 => Some(CrcWidth::W16),
            Self::Crc32 => Some(CrcWidth::W32),
            _ => None,
        }
    }

    pub fn is_crc(self) -> bool {
        self.crc_width().is_some()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Runs the algorithm over `bytes`.
    pub fn compute(self, bytes: &[u8], endianness: Endianness, crc: &CrcParams) -> u32 {
        match self {
            Self::Sum8 => u32::from(bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))),
            Self::Sum16 => u32::from(
                bytes
                    .chunks_exact(2)
                    .map(|word| endianness.read_u16([word[0], word[1]]))
                    .fold(0u16, u16::wrapping_add),
            ),
            Self::Sum16Bytes => u32::from(
                bytes
                    .iter()
                    .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b))),
            ),
            Self::Sum32Bytes => bytes
                .iter()
                .fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b))),
            Self::Crc8 | Self::Crc16 | Self::Crc32 => {
                let mut engine = crc.engine(self.crc_width().unwrap_or(CrcWidth::W32));
                engine.update_slice(bytes);
                engine.get_value()
            }
        }
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(ConfigError::UnknownAlgorithm(value))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Sum8 => "checksum 8-bit",
            Self::Sum16 => "checksum 16-bit (adds 16-bit words into a 16-bit sum, data and result BE or LE)",
            Self::Sum16Bytes => "checksum 16-bit (adds bytes into a 16-bit sum, result BE or LE)",
            Self::Sum32Bytes => "checksum 32-bit (adds bytes into a 32-bit sum, result BE or LE)",
            Self::Crc8 => "CRC8",
            Self::Crc16 => "CRC16",
            Self::Crc32 => "CRC32",
        };
        f.write_str(text)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        }
    }

    /// The low `width` bytes of `value` in this byte order.
    pub fn bytes(self, value: u32, width: usize) -> Vec<u8> {
        match self {
            Self::Little => value.to_le_bytes()[..width].to_vec(),
            Self::Big => value.to_be_bytes()[4 - width..].to_vec(),
        }
    }
}

/// CRC model parameters, unreflected as in CRC catalogues.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CrcParams {
    pub polynomial: u32,
    pub initial_value: u32,
    pub reflect_in: bool,
    pub reflect_out: bool,
    pub xor_out: u32,
}

impl Default for CrcParams {
    fn default() -> Self {
        Self {
            polynomial: 0x07,
            initial_value: 0,
            reflect_in: false,
            reflect_out: false,
            xor_out: 0,
        }
    }
}

impl CrcParams {
    pub fn masked(&self, width: CrcWidth) -> Self {
        let mask = width.mask();
        Self {
            polynomial: self.polynomial & mask,
            initial_value: self.initial_value & mask,
            xor_out: self.xor_out & mask,
            ..*self
        }
    }

    pub fn engine(&self, width: CrcWidth) -> Crc {
        let params = self.masked(width);
        Crc::new(
            width,
            params.polynomial,
            params.initial_value,
            params.reflect_in,
            params.reflect_out,
            params.xor_out,
        )
    }
}

/// What to stamp into the finished image, and where.
///
/// Nothing is written unless `target_address` is set. With a
/// `forced_value` the value is written as is and no range is read.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ChecksumRequest {
    pub algorithm: Algorithm,
    pub range: Option<(u32, u32)>,
    pub target_address: Option<u32>,
    pub endianness: Endianness,
    pub forced_value: Option<u32>,
    /// Only meaningful for the CRC methods; defaults apply when unset.
    pub crc: Option<CrcParams>,
}

/// A value written into the image.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Stamp {
    pub address: u32,
    pub value: u32,
    pub width: usize,
    pub forced: bool,
}

impl ChecksumRequest {
    /// Computes (or takes the forced value) and writes it into `image`.
    ///
    /// `Ok(None)` when no target address was requested.
    pub fn stamp(&self, image: &mut MemoryImage) -> Result<Option<Stamp>, CheckError> {
        let Some(address) = self.target_address else {
            return Ok(None);
        };

        let width = self.algorithm.width();
        let offset = image
            .offset_of(address)
            .filter(|&offset| offset + 1 < image.len() && offset + width <= image.len())
            .ok_or(CheckError::OutsideImage(address))?;

        let (value, forced) = match self.forced_value {
            Some(value) => (value, true),
            None => {
                let (start, end) = self.clipped_range(image)?;
                let first = (start - image.lowest_address()) as usize;
                let last = (end - image.lowest_address()) as usize;
                let bytes = &image.as_bytes()[first..=last];
                let crc = self.crc.unwrap_or_default();
                let value = self.algorithm.compute(bytes, self.endianness, &crc);
                info!(
                    "{} over {start:08X}-{end:08X} = 0x{value:0width$X}",
                    self.algorithm,
                    width = width * 2
                );
                (value, false)
            }
        };

        let bytes = self.endianness.bytes(value, width);
        image.as_bytes_mut()[offset..offset + width].copy_from_slice(&bytes);
        info!("Addr 0x{address:08X} set to 0x{value:0width$X}", width = width * 2);

        Ok(Some(Stamp {
            address,
            value,
            width,
            forced,
        }))
    }

    fn clipped_range(&self, image: &MemoryImage) -> Result<(u32, u32), CheckError> {
        let (lowest, highest) = (image.lowest_address(), image.highest_address());
        let (mut start, mut end) = self.range.unwrap_or((lowest, highest));

        if start < lowest {
            warn!("Modifying range start from {start:X} to {lowest:X}");
            start = lowest;
        }
        if end > highest {
            warn!("Modifying range end from {end:X} to {highest:X}");
            end = highest;
        }
        if start > end {
            return Err(CheckError::EmptyRange { start, end });
        }

        Ok((start, end))
    }
}

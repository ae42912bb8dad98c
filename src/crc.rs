/// Register width of a CRC.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CrcWidth {
    W8,
    W16,
    W32,
}

impl CrcWidth {
    pub fn mask(self) -> u32 {
        match self {
            Self::W8 => 0xFF,
            Self::W16 => 0xFFFF,
            Self::W32 => 0xFFFF_FFFF,
        }
    }

    pub fn reflect(self, value: u32) -> u32 {
        match self {
            Self::W8 => u32::from(reflect8(value as u8)),
            Self::W16 => u32::from(reflect16(value as u16)),
            Self::W32 => reflect32(value),
        }
    }
}

pub fn reflect8(value: u8) -> u8 {
    value.reverse_bits()
}

pub fn reflect16(value: u16) -> u16 {
    value.reverse_bits()
}

pub fn reflect32(value: u32) -> u32 {
    value.reverse_bits()
}

/// Lookup table for one byte of input, built for a single polynomial.
///
/// Normal tables fold the most significant bit first, reflected tables the
/// least significant; reflected tables expect a bit-reversed polynomial.
#[derive(Clone)]
pub enum CrcTable {
    Crc8([u8; 256]),
    Crc16([u16; 256]),
    Crc32([u32; 256]),
}

impl CrcTable {
    pub fn normal(width: CrcWidth, poly: u32) -> Self {
        match width {
            CrcWidth::W8 => {
                let poly = poly as u8;
                let mut table = [0u8; 256];
                for (pos, entry) in table.iter_mut().enumerate() {
                    let mut crc = pos as u8;
                    for _ in 0..8 {
                        crc = if crc & 0x80 != 0 { (crc << 1) ^ poly } else { crc << 1 };
                    }
                    *entry = crc;
                }
                Self::Crc8(table)
            }
            CrcWidth::W16 => {
                let poly = poly as u16;
                let mut table = [0u16; 256];
                for (pos, entry) in table.iter_mut().enumerate() {
                    let mut crc = (pos as u16) << 8;
                    for _ in 0..8 {
                        crc = if crc & 0x8000 != 0 { (crc << 1) ^ poly } else { crc << 1 };
                    }
                    *entry = crc;
                }
                Self::Crc16(table)
            }
            CrcWidth::W32 => {
                let mut table = [0u32; 256];
                for (pos, entry) in table.iter_mut().enumerate() {
                    let mut crc = (pos as u32) << 24;
                    for _ in 0..8 {
                        crc = if crc & 0x8000_0000 != 0 { (crc << 1) ^ poly } else { crc << 1 };
                    }
                    *entry = crc;
                }
                Self::Crc32(table)
            }
        }
    }

    pub fn reflected(width: CrcWidth, poly: u32) -> Self {
        let mut table = [0u32; 256];
        for (pos, entry) in table.iter_mut().enumerate() {
            let mut crc = pos as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ poly } else { crc >> 1 };
            }
            *entry = crc;
        }

        match width {
            CrcWidth::W8 => Self::Crc8(table.map(|entry| entry as u8)),
            CrcWidth::W16 => Self::Crc16(table.map(|entry| entry as u16)),
            CrcWidth::W32 => Self::Crc32(table),
        }
    }

    pub fn width(&self) -> CrcWidth {
        match self {
            Self::Crc8(_) => CrcWidth::W8,
            Self::Crc16(_) => CrcWidth::W16,
            Self::Crc32(_) => CrcWidth::W32,
        }
    }
}

/// Table-driven CRC over a stream of bytes.
#[derive(Clone)]
pub struct Crc {
    table: CrcTable,
    reflected: bool,
    reflect_out: bool,
    xor_out: u32,
    value: u32,
}

impl Crc {
    /// Parameters are taken as written in CRC catalogues: `poly` and `init`
    /// unreflected, each masked to `width`.
    pub fn new(
        width: CrcWidth,
        poly: u32,
        init: u32,
        reflect_in: bool,
        reflect_out: bool,
        xor_out: u32,
    ) -> Self {
        let mask = width.mask();
        let (poly, init) = (poly & mask, init & mask);

        let (table, value) = if reflect_in {
            (
                CrcTable::reflected(width, width.reflect(poly)),
                width.reflect(init),
            )
        } else {
            (CrcTable::normal(width, poly), init)
        };

        Self {
            table,
            reflected: reflect_in,
            reflect_out,
            xor_out: xor_out & mask,
            value,
        }
    }

    pub fn update(&mut self, value: u8) {
        let crc = self.value;
        self.value = match (&self.table, self.reflected) {
            (CrcTable::Crc8(table), _) => u32::from(table[usize::from(crc as u8 ^ value)]),
            (CrcTable::Crc16(table), false) => {
                let index = usize::from((crc >> 8) as u8 ^ value);
                ((crc << 8) ^ u32::from(table[index])) & 0xFFFF
            }
            (CrcTable::Crc16(table), true) => {
                let index = usize::from(crc as u8 ^ value);
                (crc >> 8) ^ u32::from(table[index])
            }
            (CrcTable::Crc32(table), false) => {
                let index = usize::from((crc >> 24) as u8 ^ value);
                (crc << 8) ^ table[index]
            }
            (CrcTable::Crc32(table), true) => {
                let index = usize::from(crc as u8 ^ value);
                (crc >> 8) ^ table[index]
            }
        };
    }

    pub fn update_slice(&mut self, value: &[u8]) {
        value.iter().for_each(|&v| self.update(v));
    }

    /// Final CRC, output reflection and XOR applied.
    pub fn get_value(&self) -> u32 {
        let width = self.table.width();
        let value = if self.reflected != self.reflect_out {
            width.reflect(self.value)
        } else {
            self.value
        };

        (value ^ self.xor_out) & width.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK: &[u8] = b"123456789";

    fn check(width: CrcWidth, poly: u32, init: u32, refin: bool, refout: bool, xorout: u32) -> u32 {
        let mut crc = Crc::new(width, poly, init, refin, refout, xorout);
        crc.update_slice(CHECK);
        crc.get_value()
    }

    #[test]
    fn reflections() {
        assert_eq!(reflect8(0x07), 0xE0);
        assert_eq!(reflect16(0x8005), 0xA001);
        assert_eq!(reflect32(0x04C1_1DB7), 0xEDB8_8320);
        assert_eq!(CrcWidth::W16.reflect(0x1021), 0x8408);
    }

    #[test]
    fn normal_tables() {
        let CrcTable::Crc32(table) = CrcTable::normal(CrcWidth::W32, 0x04C1_1DB7) else {
            panic!("wrong width");
        };
        assert_eq!(table[1], 0x04C1_1DB7);
        assert_eq!(table[255], 0xB1F7_40B4);

        let CrcTable::Crc16(table) = CrcTable::normal(CrcWidth::W16, 0x1021) else {
            panic!("wrong width");
        };
        assert_eq!(table[1], 0x1021);
    }

    #[test]
    fn reflected_tables() {
        let CrcTable::Crc32(table) = CrcTable::reflected(CrcWidth::W32, 0xEDB8_8320) else {
            panic!("wrong width");
        };
        assert_eq!(table[128], 0xEDB8_8320);
        assert_eq!(table[255], 0x2D02_EF8D);
    }

    #[test]
    fn crc8_catalogue() {
        // CRC-8/SMBUS
        assert_eq!(check(CrcWidth::W8, 0x07, 0x00, false, false, 0x00), 0xF4);
        // CRC-8/MAXIM-DOW
        assert_eq!(check(CrcWidth::W8, 0x31, 0x00, true, true, 0x00), 0xA1);
    }

    #[test]
    fn crc16_catalogue() {
        // CRC-16/XMODEM
        assert_eq!(check(CrcWidth::W16, 0x1021, 0x0000, false, false, 0x0000), 0x31C3);
        // CRC-16/IBM-3740
        assert_eq!(check(CrcWidth::W16, 0x1021, 0xFFFF, false, false, 0x0000), 0x29B1);
        // CRC-16/ARC
        assert_eq!(check(CrcWidth::W16, 0x8005, 0x0000, true, true, 0x0000), 0xBB3D);
        // CRC-16/KERMIT
        assert_eq!(check(CrcWidth::W16, 0x1021, 0x0000, true, true, 0x0000), 0x2189);
    }

    #[test]
    fn crc32_catalogue() {
        // CRC-32/ISO-HDLC
        assert_eq!(
            check(CrcWidth::W32, 0x04C1_1DB7, 0xFFFF_FFFF, true, true, 0xFFFF_FFFF),
            0xCBF4_3926
        );
        // CRC-32/BZIP2
        assert_eq!(
            check(CrcWidth::W32, 0x04C1_1DB7, 0xFFFF_FFFF, false, false, 0xFFFF_FFFF),
            0xFC89_1918
        );
        // CRC-32/MPEG-2
        assert_eq!(
            check(CrcWidth::W32, 0x04C1_1DB7, 0xFFFF_FFFF, false, false, 0x0000_0000),
            0x0376_E6E7
        );
    }

    #[test]
    fn parameters_are_masked_to_width() {
        assert_eq!(
            check(CrcWidth::W16, 0xFFFF_1021, 0xFFFF_0000, false, false, 0x1234_0000),
            0x31C3
        );
    }
}

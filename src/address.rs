use log::debug;

/// How Intel Hex load offsets are widened to physical addresses.
///
/// The first extended address record of either kind fixes the mode for the
/// rest of the file; records of the other kind are ignored from then on.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum AddressingMode {
    #[default]
    Undetermined,
    Segmented,
    Linear,
}

#[derive(Debug, Default, Clone)]
pub struct Addressing {
    mode: AddressingMode,
    segment: u16,
    upper: u16,
    word_offset: Option<u32>,
}

impl Addressing {
    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    pub fn segment(&self) -> u16 {
        self.segment
    }

    /// Applies a type 02 record. Returns `false` if linear mode is locked in.
    pub fn extended_segment(&mut self, segment: u16) -> bool {
        if self.mode == AddressingMode::Undetermined {
            self.mode = AddressingMode::Segmented;
        }

        if self.mode != AddressingMode::Segmented {
            return false;
        }

        self.segment = segment;
        debug!("Extended Segment address record: {segment:04X}");
        true
    }

    /// Applies a type 04 record. Returns `false` if segmented mode is locked in.
    pub fn extended_linear(&mut self, upper: u16) -> bool {
        if self.mode == AddressingMode::Undetermined {
            self.mode = AddressingMode::Linear;
        }

        if self.mode != AddressingMode::Linear {
            return false;
        }

        self.upper = upper;
        debug!("Extended Linear address record: {upper:04X}");
        true
    }

    /// Offset added to word-aligned addresses, refreshed on every type 04 record.
    pub fn set_word_offset(&mut self, offset: u32) {
        self.word_offset = Some(offset);
    }

    /// Physical address of a data record's load offset.
    ///
    /// Until an extended address record is read the upper bits are zero.
    pub fn resolve(&self, offset: u16) -> u32 {
        match self.mode {
            AddressingMode::Segmented => {
                (u32::from(self.segment) << 4).wrapping_add(u32::from(offset))
            }
            AddressingMode::Linear | AddressingMode::Undetermined => {
                (u32::from(self.upper) << 16).wrapping_add(u32::from(offset))
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but the offset counts 16-bit words.
    pub fn resolve_aligned(&self, offset: u16) -> u32 {
        if self.mode == AddressingMode::Segmented {
            return self.resolve(offset);
        }

        (u32::from(self.upper) << 16)
            .wrapping_add(u32::from(offset) << 1)
            .wrapping_add(self.word_offset.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undetermined_uses_offset_alone() {
        let addressing = Addressing::default();

        assert_eq!(addressing.mode(), AddressingMode::Undetermined);
        assert_eq!(addressing.resolve(0x1234), 0x1234);
    }

    #[test]
    fn segmented_addresses() {
        let mut addressing = Addressing::default();

        assert!(addressing.extended_segment(0x1000));
        assert_eq!(addressing.mode(), AddressingMode::Segmented);
        assert_eq!(addressing.resolve(0x0010), 0x10010);
    }

    #[test]
    fn linear_addresses() {
        let mut addressing = Addressing::default();

        assert!(addressing.extended_linear(0x0800));
        assert_eq!(addressing.mode(), AddressingMode::Linear);
        assert_eq!(addressing.resolve(0x0010), 0x0800_0010);
    }

    #[test]
    fn first_extended_record_locks_mode() {
        let mut addressing = Addressing::default();

        assert!(addressing.extended_linear(0x0001));
        assert!(!addressing.extended_segment(0x2000));
        assert_eq!(addressing.mode(), AddressingMode::Linear);
        assert_eq!(addressing.resolve(0), 0x0001_0000);

        let mut addressing = Addressing::default();

        assert!(addressing.extended_segment(0x2000));
        assert!(!addressing.extended_linear(0x0001));
        assert_eq!(addressing.segment(), 0x2000);
        assert_eq!(addressing.resolve(0), 0x20000);
    }

    #[test]
    fn word_aligned_addresses() {
        let mut addressing = Addressing::default();

        addressing.extended_linear(0x0001);
        addressing.set_word_offset(0x20);
        addressing.set_word_offset(0x10);

        assert_eq!(addressing.resolve_aligned(0x0100), 0x0001_0210);
    }
}

use log::debug;

use crate::Error;

/// Lowest and highest physical address touched by accepted data records.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RangeTracker {
    lowest: u32,
    highest: u32,
}

impl Default for RangeTracker {
    fn default() -> Self {
        Self {
            lowest: u32::MAX,
            highest: 0,
        }
    }
}

impl RangeTracker {
    pub fn include(&mut self, address: u32, len: usize) {
        if len == 0 {
            return;
        }

        let last = address.saturating_add(len as u32 - 1);
        self.lowest = self.lowest.min(address);
        self.highest = self.highest.max(last);
    }

    /// `(lowest, highest)`, or `None` if nothing was included.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        if self.lowest > self.highest {
            return None;
        }
        Some((self.lowest, self.highest))
    }

    /// Word-addressed input covers twice the bytes it was counted with.
    pub(crate) fn double_span(&mut self) {
        if let Some((lowest, highest)) = self.bounds() {
            self.highest = highest.saturating_add((highest - lowest).saturating_add(1));
        }
    }
}

/// Outcome of copying one data record into the image.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Placement {
    pub written: usize,
    pub skipped: usize,
    pub overlapped: bool,
}

/// Binary image spanning `[lowest_address, highest_address]`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MemoryImage {
    bytes: Vec<u8>,
    lowest_address: u32,
    pad_byte: u8,
}

impl MemoryImage {
    /// Allocates `length` bytes starting at `lowest_address`, all set to `pad_byte`.
    pub fn allocate(lowest_address: u32, length: u64, pad_byte: u8) -> Result<Self, Error> {
        let size = usize::try_from(length).map_err(|_| Error::Allocation { size: length })?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| Error::Allocation { size: length })?;
        bytes.resize(size, pad_byte);

        Ok(Self {
            bytes,
            lowest_address,
            pad_byte,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn lowest_address(&self) -> u32 {
        self.lowest_address
    }

    /// Inclusive end address. Meaningless for an empty image.
    pub fn highest_address(&self) -> u32 {
        self.lowest_address
            .wrapping_add(self.bytes.len() as u32)
            .wrapping_sub(1)
    }

    pub fn pad_byte(&self) -> u8 {
        self.pad_byte
    }

    /// Buffer index of `address`, if it lies inside the image.
    pub fn offset_of(&self, address: u32) -> Option<usize> {
        let offset = address.checked_sub(self.lowest_address)? as usize;
        (offset < self.bytes.len()).then_some(offset)
    }

    /// Copies a record's payload to `address`, last write wins.
    ///
    /// With `swap` every byte lands at its index XOR 1. Bytes falling outside
    /// the buffer are counted as skipped.
    pub fn put(&mut self, address: u32, data: &[u8], swap: bool) -> Placement {
        let mut placement = Placement::default();

        let Some(start) = address.checked_sub(self.lowest_address) else {
            placement.skipped = data.len();
            return placement;
        };

        for (i, &byte) in data.iter().enumerate() {
            let index = start as usize + i;
            let index = if swap { index ^ 1 } else { index };

            match self.bytes.get_mut(index) {
                Some(slot) => {
                    if *slot != self.pad_byte {
                        placement.overlapped = true;
                    }
                    *slot = byte;
                    placement.written += 1;
                }
                None => placement.skipped += 1,
            }
        }

        placement
    }

    /// Grows the image with pad bytes to the next multiple of `block_size`.
    /// Returns the grown image and the number of bytes added.
    pub fn pad_to_block(self, block_size: u32) -> (Self, usize) {
        let block_size = block_size.max(1) as usize;
        let remainder = self.bytes.len() % block_size;

        if remainder == 0 {
            return (self, 0);
        }

        let added = block_size - remainder;
        let mut bytes = self.bytes;
        bytes.resize(bytes.len() + added, self.pad_byte);
        debug!("Extended image by {added} pad bytes");

        (
            Self {
                bytes,
                lowest_address: self.lowest_address,
                pad_byte: self.pad_byte,
            },
            added,
        )
    }
}

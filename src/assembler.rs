use log::{debug, info, warn};

use crate::record::RecordChecksum;
use crate::{
    Addressing, AddressingMode, ConfigError, Encoding, Error, MemoryImage, Options, Parser,
    RangeTracker, Record, Stamp,
};

/// What happened to the input while it was assembled.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Report {
    /// Non-blank lines read in the fill pass.
    pub records: usize,
    pub malformed: usize,
    pub checksum_errors: usize,
    pub overlapped: usize,
    /// Data records dropped in whole or in part.
    pub skipped: usize,
    /// Lowest address found in the input, before any starting address override.
    pub records_start: Option<u32>,
    /// Set by a record checksum mismatch when checksum errors are enabled.
    pub checksum_failed: bool,
    pub stamp: Option<Stamp>,
}

#[derive(Debug)]
pub struct Conversion {
    pub image: MemoryImage,
    pub report: Report,
}

impl Conversion {
    /// Whether the run should end with a failure exit status.
    pub fn failed(&self) -> bool {
        self.report.checksum_failed
    }
}

/// State of one file conversion.
///
/// The passes must run in order: [`discover_range`](Self::discover_range),
/// [`allocate`](Self::allocate), [`fill_image`](Self::fill_image) and then
/// [`finish`](Self::finish). [`convert`] does exactly that.
pub struct Session<'a> {
    encoding: Encoding,
    options: &'a Options,
    addressing: Addressing,
    range: RangeTracker,
    report: Report,
}

impl<'a> Session<'a> {
    pub fn new(encoding: Encoding, options: &'a Options) -> Result<Self, ConfigError> {
        options.validate()?;

        Ok(Self {
            encoding,
            options,
            addressing: Addressing::default(),
            range: RangeTracker::default(),
            report: Report::default(),
        })
    }

    fn word_aligned(&self) -> bool {
        self.options.address_alignment_word && self.encoding == Encoding::IntelHex
    }

    fn physical_address(&self, address: u32, aligned: bool) -> u32 {
        match self.encoding {
            Encoding::Motorola => address,
            Encoding::IntelHex if aligned => self.addressing.resolve_aligned(address as u16),
            Encoding::IntelHex => self.addressing.resolve(address as u16),
        }
    }

    /// First pass: the address span covered by the accepted data records.
    ///
    /// Malformed lines are left for the fill pass to report.
    pub fn discover_range(&mut self, text: &str) -> RangeTracker {
        self.addressing = Addressing::default();
        let mut range = RangeTracker::default();

        for (_, result) in Parser::new(text, self.encoding) {
            let Ok(decoded) = result else {
                continue;
            };

            match decoded.record {
                Record::Data { address, bytes } if !bytes.is_empty() => {
                    let address = self.physical_address(address, false);
                    if self.options.admits(address, bytes.len()) {
                        range.include(address, bytes.len());
                    }
                }
                Record::ExtendedSegmentAddress(segment) => {
                    self.addressing.extended_segment(segment);
                }
                Record::ExtendedLinearAddress(upper) => {
                    self.addressing.extended_linear(upper);
                }
                _ => {}
            }
        }

        if self.word_aligned() {
            range.double_span();
        }

        self.range = range;
        range
    }

    /// Allocates the pad-filled image for the discovered range.
    ///
    /// A starting address replaces the discovered lowest address, and a max
    /// length replaces the discovered length.
    pub fn allocate(&mut self) -> Result<MemoryImage, Error> {
        let bounds = self.range.bounds();
        self.report.records_start = bounds.map(|(lowest, _)| lowest);

        let lowest = self
            .options
            .starting_address
            .or(self.report.records_start)
            .unwrap_or(0);

        let length = match (self.options.max_length, bounds) {
            (Some(length), _) => u64::from(length),
            (None, Some((_, highest))) => {
                (u64::from(highest) + 1).saturating_sub(u64::from(lowest))
            }
            (None, None) => 0,
        };

        if let Some((found_lowest, found_highest)) = bounds {
            info!("Lowest address    = {found_lowest:08X}");
            info!("Highest address   = {found_highest:08X}");
        }
        if let Some(start) = self.options.starting_address {
            info!("Starting address  = {start:08X}");
        }
        info!("Max Length        = {length}");

        MemoryImage::allocate(lowest, length, self.options.pad_byte)
    }

    /// Second pass: copies every accepted data record into `image`.
    pub fn fill_image(&mut self, text: &str, image: &mut MemoryImage) {
        self.addressing = Addressing::default();

        for (record_nb, result) in Parser::new(text, self.encoding) {
            self.report.records += 1;

            let decoded = match result {
                Ok(decoded) => decoded,
                Err(err) => {
                    warn!("Error in line {record_nb} of {} file: {err}", self.encoding);
                    self.report.malformed += 1;
                    continue;
                }
            };

            self.verify_checksum(decoded.checksum, record_nb);

            match decoded.record {
                Record::Data { address, bytes } => self.place(image, address, &bytes, record_nb),
                Record::EndOfFile => debug!("End of File record"),
                Record::ExtendedSegmentAddress(segment) => {
                    if !self.addressing.extended_segment(segment) {
                        warn!("Ignored extended segment address record {record_nb}");
                    }
                }
                Record::ExtendedLinearAddress(upper) => {
                    if !self.addressing.extended_linear(upper) {
                        warn!("Ignored extended linear address record {record_nb}");
                    } else if self.word_aligned() {
                        let base = u32::from(upper) << 16;
                        self.addressing
                            .set_word_offset(base.wrapping_sub(image.lowest_address()));
                    }
                }
                Record::StartSegmentAddress { cs, ip } => {
                    debug!("Start Segment Address record: {cs:04X}:{ip:04X}, ignored");
                }
                Record::StartLinearAddress(address) => {
                    debug!("Start Linear Address record: {address:08X}, ignored");
                }
                Record::Header(bytes) => {
                    debug!("Header: {}", String::from_utf8_lossy(&bytes));
                }
                Record::Count(total) => info!("Record total: {total}"),
                Record::StartAddress(address) => {
                    info!("Execution address (unused): {address:08X}");
                }
            }
        }
    }

    fn verify_checksum(&mut self, checksum: RecordChecksum, record_nb: usize) {
        if checksum.is_valid() {
            return;
        }

        self.report.checksum_errors += 1;

        if self.options.enable_checksum_error {
            warn!(
                "checksum error in record {record_nb}: should be {:02X}",
                checksum.expected
            );
            self.report.checksum_failed = true;
        } else {
            debug!(
                "checksum error in record {record_nb}: should be {:02X}",
                checksum.expected
            );
        }
    }

    fn place(&mut self, image: &mut MemoryImage, address: u32, bytes: &[u8], record_nb: usize) {
        if bytes.is_empty() {
            warn!("0 byte length Data record ignored");
            return;
        }

        let unshifted = self.physical_address(address, false);
        if !self.options.admits(unshifted, bytes.len()) {
            self.report.skipped += 1;
            return;
        }

        let physical = self.physical_address(address, self.word_aligned());
        debug!("Physical address: {physical:08X}");

        let placement = image.put(physical, bytes, self.options.swap_wordwise);

        if placement.overlapped {
            warn!("Overlapped record detected in record {record_nb}");
            self.report.overlapped += 1;
        }

        if placement.skipped > 0 {
            self.report.skipped += 1;
            match self.addressing.mode() {
                AddressingMode::Segmented if self.encoding == Encoding::IntelHex => debug!(
                    "Data record skipped at {:04X}:{:04X}",
                    self.addressing.segment(),
                    address
                ),
                _ => debug!("Data record skipped at {physical:08X}"),
            }
        }
    }

    /// Stamps the checksum or forced value, then rounds up to the block size.
    pub fn finish(mut self, mut image: MemoryImage) -> Conversion {
        info!("Binary file start = {:08X}", image.lowest_address());
        if let Some(start) = self.report.records_start {
            info!("Records start     = {start:08X}");
        }
        info!("Highest address   = {:08X}", image.highest_address());
        info!("Pad Byte          = {:02X}", image.pad_byte());

        match self.options.checksum.stamp(&mut image) {
            Ok(stamp) => self.report.stamp = stamp,
            Err(err) => warn!("{err}"),
        }

        if let Some(block_size) = self.options.minimum_block_size {
            let (padded, added) = image.pad_to_block(block_size);
            image = padded;

            if added > 0 {
                if self.options.max_length.is_some() {
                    warn!("Attention Max Length changed by Minimum Block Size");
                }
                info!("Extended");
                info!("Highest address   = {:08X}", image.highest_address());
                info!("Max Length        = {}", image.len());
            }
        }

        Conversion {
            image,
            report: self.report,
        }
    }
}

/// Runs both passes over `text` and returns the finished image.
///
/// Only configuration and allocation problems are errors. Bad records are
/// logged, counted in the [`Report`] and skipped.
pub fn convert(encoding: Encoding, text: &str, options: &Options) -> Result<Conversion, Error> {
    let mut session = Session::new(encoding, options)?;

    session.discover_range(text);
    let mut image = session.allocate()?;
    session.fill_image(text, &mut image);

    Ok(session.finish(image))
}

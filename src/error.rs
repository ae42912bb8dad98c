use thiserror::Error;

/// Problems with a single record. These are reported and the line is skipped.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum ParseError {
    #[error("record does not start with '{0}'")]
    MissingStartCode(char),
    #[error("record contains invalid hex digits")]
    ParseError,
    #[error("record length does not match its contents")]
    BadLength,
    #[error("unsupported record type {0}")]
    BadType(u8),
}

/// Configuration combinations that cannot be run.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum ConfigError {
    #[error("unknown check method {0}, expected 0-6")]
    UnknownAlgorithm(u8),
    #[error("floor address {floor:08X} higher than ceiling address {ceiling:08X}")]
    FloorAboveCeiling { floor: u32, ceiling: u32 },
    #[error("max length {0:#X} exceeds {limit:#X}", limit = crate::options::MAX_LENGTH_LIMIT)]
    MaxLengthTooLarge(u32),
    #[error("minimum block size must not be zero")]
    ZeroBlockSize,
    #[error("CRC parameters given but check method is not a CRC")]
    CrcParamsWithoutCrc,
    #[error("a forced value cannot be combined with a checksum range")]
    ForcedValueWithRange,
    #[error("a forced value needs an address to be written at")]
    ForcedValueWithoutAddress,
}

/// Reasons a checksum or forced value was not written. Never fatal.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum CheckError {
    #[error("Force/Check address {0:08X} outside of memory range")]
    OutsideImage(u32),
    #[error("checksum range {start:08X}-{end:08X} is empty after clipping")]
    EmptyRange { start: u32, end: u32 },
}

/// Records that cannot be written out as requested.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum SerializeError {
    #[error("output buffer too small, {0} bytes needed")]
    BufferTooSmall(usize),
    #[error("payload of {0} bytes does not fit in one record")]
    PayloadTooLong(usize),
    #[error("address {0:08X} does not fit in the record's address field")]
    AddressTooLarge(u32),
    #[error("record has no equivalent in this encoding")]
    Unrepresentable,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("can't allocate {size} bytes of memory")]
    Allocation { size: u64 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

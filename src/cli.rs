//! Command line driver shared by `hex2bin` and `mot2bin`.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use crate::io::{convert_file, output_path, write_image, DEFAULT_EXTENSION};
use crate::{
    Algorithm, ChecksumRequest, ConfigError, Conversion, CrcParams, Encoding, Endianness, Error,
    Options,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid CRC parameter '{0}'")]
    CrcParameter(String),
    #[error("no input file")]
    NoInput,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Run(#[from] Error),
}

fn parse_hex(s: &str) -> Result<u32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|err| format!("'{s}' is not a hex number: {err}"))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let value = parse_hex(s)?;
    u8::try_from(value).map_err(|_| format!("{value:#X} does not fit in a byte"))
}

fn parse_algorithm(s: &str) -> Result<Algorithm, String> {
    let index = parse_byte(s)?;
    Algorithm::try_from(index).map_err(|err| err.to_string())
}

fn parse_endianness(s: &str) -> Result<Endianness, String> {
    match s {
        "0" => Ok(Endianness::Little),
        "1" => Ok(Endianness::Big),
        _ => Err(format!("'{s}' is neither 0 (little) nor 1 (big)")),
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.chars().next()?.to_ascii_lowercase() {
        't' => Some(true),
        'f' => Some(false),
        _ => None,
    }
}

fn crc_params(values: &[String]) -> Result<CrcParams, CliError> {
    let [poly, init, reflect_in, reflect_out, xor_out] = values else {
        return Err(CliError::CrcParameter(values.join(" ")));
    };

    let hex = |s: &String| parse_hex(s).map_err(|_| CliError::CrcParameter(s.clone()));
    let flag = |s: &String| parse_flag(s).ok_or_else(|| CliError::CrcParameter(s.clone()));

    Ok(CrcParams {
        polynomial: hex(poly)?,
        initial_value: hex(init)?,
        reflect_in: flag(reflect_in)?,
        reflect_out: flag(reflect_out)?,
        xor_out: hex(xor_out)?,
    })
}

/// Converts an Intel Hex or Motorola S-record file into a binary image.
///
/// All numbers are hexadecimal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Load offsets count 16-bit words (Intel Hex only)
    #[arg(short = 'a')]
    address_alignment_word: bool,

    /// Batch mode: exit if the input file cannot be opened
    #[arg(short = 'b')]
    batch: bool,

    /// Fail when a record checksum is wrong
    #[arg(short = 'c')]
    enable_checksum_error: bool,

    /// CRC parameters, reflections given as t or f
    #[arg(
        short = 'C',
        num_args = 5,
        value_names = ["POLY", "INIT", "REFIN", "REFOUT", "XOROUT"],
        allow_hyphen_values = true
    )]
    crc: Option<Vec<String>>,

    /// Display the list of check methods
    #[arg(short = 'd')]
    display: bool,

    /// Output filename extension
    #[arg(short = 'e', value_name = "EXT")]
    extension: Option<String>,

    /// Endianness of the check result, 0: little, 1: big
    #[arg(short = 'E', value_name = "0|1", value_parser = parse_endianness, default_value = "0")]
    endianness: Endianness,

    /// Address the check result is written at
    #[arg(short = 'f', value_name = "ADDRESS", value_parser = parse_hex)]
    check_address: Option<u32>,

    /// Address and value to force
    #[arg(short = 'F', num_args = 2, value_names = ["ADDRESS", "VALUE"], value_parser = parse_hex)]
    force: Option<Vec<u32>>,

    /// Check method, see -d
    #[arg(short = 'k', value_name = "0-6", value_parser = parse_algorithm, default_value = "0")]
    algorithm: Algorithm,

    /// Maximal length of the binary image
    #[arg(short = 'l', value_name = "LENGTH", value_parser = parse_hex)]
    max_length: Option<u32>,

    /// Image length is rounded up to a multiple of this size, overriding -l
    #[arg(short = 'm', value_name = "SIZE", value_parser = parse_hex)]
    minimum_block_size: Option<u32>,

    /// Pad byte
    #[arg(short = 'p', value_name = "VALUE", value_parser = parse_byte, default_value = "FF")]
    pad_byte: u8,

    /// Range the check is computed over
    #[arg(short = 'r', num_args = 2, value_names = ["START", "END"], value_parser = parse_hex)]
    range: Option<Vec<u32>>,

    /// Starting address of the binary image
    #[arg(short = 's', value_name = "ADDRESS", value_parser = parse_hex)]
    starting_address: Option<u32>,

    /// Floor address
    #[arg(short = 't', value_name = "ADDRESS", value_parser = parse_hex)]
    floor_address: Option<u32>,

    /// Ceiling address
    #[arg(short = 'T', value_name = "ADDRESS", value_parser = parse_hex)]
    ceiling_address: Option<u32>,

    /// Verbose messages, repeat for more
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Swap wordwise (low <-> high)
    #[arg(short = 'w')]
    swap_wordwise: bool,

    #[arg(value_name = "FILENAME", required_unless_present = "display")]
    file: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> Result<Options, CliError> {
        let crc = self.crc.as_deref().map(crc_params).transpose()?;

        let mut checksum = ChecksumRequest {
            algorithm: self.algorithm,
            range: match self.range.as_deref() {
                Some(&[start, end]) => Some((start, end)),
                _ => None,
            },
            target_address: self.check_address,
            endianness: self.endianness,
            forced_value: None,
            crc,
        };

        if let Some(&[address, value]) = self.force.as_deref() {
            checksum.target_address = Some(address);
            checksum.forced_value = Some(value);
        }

        let options = Options {
            pad_byte: self.pad_byte,
            starting_address: self.starting_address,
            max_length: self.max_length,
            minimum_block_size: self.minimum_block_size,
            floor_address: self.floor_address,
            ceiling_address: self.ceiling_address,
            swap_wordwise: self.swap_wordwise,
            address_alignment_word: self.address_alignment_word,
            enable_checksum_error: self.enable_checksum_error,
            checksum,
        };
        options.validate()?;

        Ok(options)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn display_check_methods() {
    println!("Check methods/value size:");
    for algorithm in Algorithm::ALL {
        println!("{}:  {algorithm}", algorithm.index());
    }
}

/// Converts `input`, asking for another filename on stdin while it cannot be
/// read, unless in batch mode.
fn open_and_convert(
    mut input: PathBuf,
    encoding: Encoding,
    options: &Options,
    batch: bool,
) -> Result<(PathBuf, Conversion), CliError> {
    loop {
        match convert_file(&input, encoding, options) {
            Ok(conversion) => return Ok((input, conversion)),
            Err(Error::Io(err)) if !batch => {
                eprint!(
                    "Input file {} cannot be opened ({err}). Enter new filename: ",
                    input.display()
                );

                let mut line = String::new();
                if std::io::stdin().lock().read_line(&mut line).map_err(Error::from)? == 0 {
                    return Err(CliError::NoInput);
                }
                input = PathBuf::from(line.trim());
            }
            Err(err) => {
                error!("Input file {} cannot be opened.", input.display());
                return Err(err.into());
            }
        }
    }
}

fn execute(encoding: Encoding, args: &Args) -> Result<bool, CliError> {
    let options = args.options()?;
    let extension = args.extension.as_deref().unwrap_or(DEFAULT_EXTENSION);
    let input = args.file.clone().ok_or(CliError::NoInput)?;

    output_path(&input, extension)?;
    let (input, conversion) = open_and_convert(input, encoding, &options, args.batch)?;
    let output = output_path(&input, extension)?;

    write_image(&output, conversion.image.as_bytes())?;

    Ok(!conversion.failed())
}

/// Parses the command line and runs one conversion.
pub fn run(encoding: Encoding) -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(args.verbose);

    if args.display {
        display_check_methods();
        return ExitCode::SUCCESS;
    }

    log::info!("{encoding} to binary converter");

    match execute(encoding, &args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

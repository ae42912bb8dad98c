use std::process::ExitCode;

use hexbin::Encoding;

fn main() -> ExitCode {
    hexbin::cli::run(Encoding::IntelHex)
}

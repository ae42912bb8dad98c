use core::iter::FusedIterator;

use crate::record::Decoded;
use crate::{Encoding, ParseError};

pub type ParseResult = Result<Decoded, ParseError>;

pub(crate) fn strip(mut line: &[u8]) -> &[u8] {
    while let Some((last, rest)) = line.split_last() {
        if !last.is_ascii_whitespace() {
            break;
        }
        line = rest;
    }
    line
}

/// Walks the lines of an input file, decoding the ones with content.
///
/// Line numbers count every physical line starting at 1, blank ones included,
/// so diagnostics point at the right place in the file. An Intel Hex
/// end-of-file record is yielded like any other; reading goes on to the end
/// of the input, so concatenated files are read whole.
pub struct Parser<'a> {
    inner: core::str::Lines<'a>,
    encoding: Encoding,
    line_nb: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str, encoding: Encoding) -> Self {
        Parser {
            inner: s.lines(),
            encoding,
            line_nb: 0,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        for line in &mut self.inner {
            self.line_nb += 1;
            if !strip(line.as_bytes()).is_empty() {
                return Some(line);
            }
        }

        None
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = (usize, ParseResult);

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.next_line()?;

        Some((self.line_nb, self.encoding.decode_line(line)))
    }
}

impl<'a> FusedIterator for Parser<'a> {}

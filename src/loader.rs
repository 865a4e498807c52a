//! Reads `.ls8` program files: one binary byte literal per significant line.

use std::{fs, io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read program file: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: expected an 8-digit binary literal, got {content:?}")]
    InvalidProgramFormat { line: usize, content: String },
    #[error("program is {size} bytes but memory holds only {capacity}")]
    ProgramTooLarge { size: usize, capacity: usize },
}

/// Parses program text. A line counts only if it starts with `0` or `1`; its first
/// eight characters are then read as a binary byte. Everything else is skipped.
pub fn parse_program(text: &str) -> Result<Vec<u8>, LoadError> {
    let mut program = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if !line.starts_with(['0', '1']) {
            continue;
        }
        let invalid = || LoadError::InvalidProgramFormat {
            line: index + 1,
            content: line.to_string(),
        };
        let literal = line.get(..8).ok_or_else(invalid)?;
        if !literal.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(invalid());
        }
        let byte = u8::from_str_radix(literal, 2).map_err(|_| invalid())?;
        program.push(byte);
    }
    Ok(program)
}

pub fn load_program_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, LoadError> {
    let text = fs::read_to_string(path)?;
    parse_program(&text)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_skips_noise() {
        let text = "# print8.ls8\n\
                    10011001 # LDI R0,8\n\
                    00000000\n\
                    00001000\n\
                    \n\
                    ; comment\n\
                    01000011 # PRN R0\n\
                    00000000\n\
                    00000001 # HLT\n";
        let program = parse_program(text).unwrap();
        assert_eq!(program, vec![0b1001_1001, 0, 8, 0b0100_0011, 0, 1]);
    }

    #[test]
    fn test_parse_crlf() {
        let program = parse_program("00000001\r\n10000000\r\n").unwrap();
        assert_eq!(program, vec![1, 128]);
    }

    #[test]
    fn test_parse_short_line() {
        match parse_program("00000001\n0101\n") {
            Err(LoadError::InvalidProgramFormat { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "0101");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_parse_non_binary_digit() {
        assert!(matches!(
            parse_program("0120000001\n"),
            Err(LoadError::InvalidProgramFormat { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_program("# nothing here\n").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_program_file("does/not/exist.ls8"),
            Err(LoadError::Io(_))
        ));
    }
}

//! Loader for register-initialization files: one `R<n>=<int>` per line.

use crate::error::ParseError;
use crate::regfile::RegisterFile;

/// Applies every `R<n>=<int>` assignment in `source` to `regs`. Blank lines
/// and `#`-comments are skipped; any other malformed line is reported with
/// its 0-based line number.
pub fn apply(source: &str, regs: &mut RegisterFile) -> Result<(), ParseError> {
    for (line_no, raw) in source.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (reg_token, value_token) = trimmed
            .split_once('=')
            .ok_or(ParseError::InvalidInitFile { line: line_no })?;
        let reg_token = reg_token.trim();
        let value_token = value_token.trim();

        let id = crate::asm::operand::parse_register(reg_token, line_no)
            .map_err(|_| ParseError::InvalidInitFile { line: line_no })?;
        let value: i64 = value_token
            .parse()
            .map_err(|_| ParseError::InvalidInitFile { line: line_no })?;

        regs.write(id, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_every_assignment() {
        let mut regs = RegisterFile::new();
        apply("R1=100\nr2=-5\n# a comment\n\nR3=0\n", &mut regs).unwrap();
        assert_eq!(regs.read(1), 100);
        assert_eq!(regs.read(2), -5);
        assert_eq!(regs.read(3), 0);
    }

    #[test]
    fn malformed_line_is_reported() {
        let mut regs = RegisterFile::new();
        let err = apply("R1=100\nR2 5\n", &mut regs).unwrap_err();
        assert_eq!(err, ParseError::InvalidInitFile { line: 1 });
    }

    #[test]
    fn bad_register_is_reported() {
        let mut regs = RegisterFile::new();
        let err = apply("R99=1\n", &mut regs).unwrap_err();
        assert_eq!(err, ParseError::InvalidInitFile { line: 0 });
    }
}

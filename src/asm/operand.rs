//! Tokenizers for register and memory-offset operands.

use crate::error::ParseError;

/// Parses a bare register operand: `R<n>` or `r<n>`.
pub fn parse_register(token: &str, line: usize) -> Result<usize, ParseError> {
    let invalid = || ParseError::InvalidOperand {
        line,
        token: token.to_string(),
    };

    let mut chars = token.chars();
    match chars.next() {
        Some('R') | Some('r') => {}
        _ => return Err(invalid()),
    }
    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let id: i64 = digits.parse().map_err(|_| invalid())?;
    if !(0..32).contains(&id) {
        return Err(ParseError::InvalidRegister { line, id });
    }
    Ok(id as usize)
}

/// Parses a memory operand: `<offset>(R<n>)`, offset a non-negative decimal
/// integer, base a register token per [`parse_register`].
pub fn parse_mem_operand(token: &str, line: usize) -> Result<(i64, usize), ParseError> {
    let invalid = || ParseError::InvalidOperand {
        line,
        token: token.to_string(),
    };

    let open = token.find('(').ok_or_else(invalid)?;
    if !token.ends_with(')') {
        return Err(invalid());
    }
    let offset_str = &token[..open];
    let reg_str = &token[open + 1..token.len() - 1];

    if offset_str.is_empty() || !offset_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let offset: i64 = offset_str.parse().map_err(|_| invalid())?;
    let reg = parse_register(reg_str, line)?;
    Ok((offset, reg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upper_and_lower_case_registers() {
        assert_eq!(parse_register("R5", 0).unwrap(), 5);
        assert_eq!(parse_register("r5", 0).unwrap(), 5);
    }

    #[test]
    fn rejects_out_of_range_register() {
        assert_eq!(
            parse_register("R32", 0).unwrap_err(),
            ParseError::InvalidRegister { line: 0, id: 32 }
        );
    }

    #[test]
    fn rejects_malformed_register_token() {
        assert_eq!(
            parse_register("X5", 3).unwrap_err(),
            ParseError::InvalidOperand {
                line: 3,
                token: "X5".to_string()
            }
        );
    }

    #[test]
    fn parses_memory_operand() {
        assert_eq!(parse_mem_operand("599(R5)", 0).unwrap(), (599, 5));
        assert_eq!(parse_mem_operand("0(r2)", 0).unwrap(), (0, 2));
    }

    #[test]
    fn rejects_negative_offset() {
        assert!(parse_mem_operand("-1(R5)", 0).is_err());
    }

    #[test]
    fn rejects_missing_parens() {
        assert!(parse_mem_operand("5R5", 0).is_err());
    }
}

//! Literal audit for generated query text.
//!
//! Operand values must only ever reach the query engine as bound
//! parameters. This pass tokenizes the generated text and rejects any string
//! or numeric literal other than the fixed ones the renderer emits itself:
//! the `'%'` wildcard of pattern matches and the `1`/`0` of the constant
//! predicates.

use sqlparser::dialect::GenericDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::error::{HqlError, Result};

const ALLOWED_STRINGS: &[&str] = &["%"];
const ALLOWED_NUMBERS: &[&str] = &["0", "1"];

pub fn audit_literals(text: &str) -> Result<()> {
    let dialect = GenericDialect {};
    let tokens = Tokenizer::new(&dialect, text)
        .tokenize()
        .map_err(|e| HqlError::Audit(format!("tokenizer rejected generated text: {}", e)))?;

    for token in tokens {
        match token {
            Token::SingleQuotedString(ref s)
            | Token::DoubleQuotedString(ref s)
            | Token::NationalStringLiteral(ref s)
            | Token::EscapedStringLiteral(ref s)
            | Token::HexStringLiteral(ref s) => {
                if !ALLOWED_STRINGS.contains(&s.as_str()) {
                    return Err(HqlError::Audit(format!("string literal '{}'", s)));
                }
            }
            Token::Number(ref n, _) => {
                if !ALLOWED_NUMBERS.contains(&n.as_str()) {
                    return Err(HqlError::Audit(format!("numeric literal {}", n)));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameterized_text_passes() {
        let text = "SELECT example_Book FROM example.Book AS example_Book \
                    WHERE (example_Book.title LIKE CONCAT(:title_0, '%') \
                    OR (1 = 0)) ";
        assert!(audit_literals(text).is_ok());
    }

    #[test]
    fn test_inlined_string_fails() {
        let text = "SELECT b FROM example.Book AS b WHERE b.title IN ('Dune') ";
        assert!(matches!(audit_literals(text), Err(HqlError::Audit(_))));
    }

    #[test]
    fn test_inlined_number_fails() {
        let text = "SELECT b FROM example.Book AS b WHERE b.id < 42 ";
        assert!(matches!(audit_literals(text), Err(HqlError::Audit(_))));
    }
}

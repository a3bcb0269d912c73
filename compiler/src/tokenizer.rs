use lazy_static::lazy_static;
use regex::Regex;

use crate::error::TypeSyntaxError;
use crate::utils::quote;

lazy_static! {
    pub static ref TOKEN_REGEX:   Regex = Regex::new(r"(\b[A-Za-z_][A-Za-z0-9_]*\b|[<>,]|\s+)").unwrap();
    pub static ref WHITESPACE_RX: Regex = Regex::new(r"^\s+$").unwrap();
}

/// Token of a type expression. Columns are 1-based.
#[derive(Debug, PartialEq)]
pub struct Token {
    pub text:   String,
    pub column: usize,
}

/// Splits a type expression such as `Map<List<Node>>` into tokens, followed
/// by an empty end-of-input token.
pub fn tokenize_type(text: &str) -> Result<Vec<Token>, TypeSyntaxError> {
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        if mat.start() > last_end {
            return Err(unexpected(&text[last_end..mat.start()], last_end));
        }

        if !WHITESPACE_RX.is_match(mat.as_str()) {
            tokens.push(Token {
                text:   mat.as_str().to_string(),
                column: mat.start() + 1,
            });
        }
        last_end = mat.end();
    }

    if last_end != text.len() {
        return Err(unexpected(&text[last_end..], last_end));
    }

    tokens.push(Token {
        text:   String::new(),
        column: text.len() + 1,
    });
    Ok(tokens)
}

fn unexpected(part: &str, offset: usize) -> TypeSyntaxError {
    TypeSyntaxError {
        msg:    format!("Syntax error: {}", quote(part)),
        column: offset + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_nested() {
        let expected = vec![
            Token { text: "Map".into(),  column: 1 },
            Token { text: "<".into(),    column: 4 },
            Token { text: "List".into(), column: 5 },
            Token { text: "<".into(),    column: 9 },
            Token { text: "int".into(),  column: 10 },
            Token { text: ">".into(),    column: 13 },
            Token { text: ">".into(),    column: 14 },
            Token { text: "".into(),     column: 15 },
        ];
        assert_eq!(tokenize_type("Map<List<int>>").unwrap(), expected);
    }

    #[test]
    fn test_tokenize_skips_whitespace() {
        let got = tokenize_type(" List < string > ").unwrap();
        let texts: Vec<&str> = got.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["List", "<", "string", ">", ""]);
        assert_eq!(got[2].column, 9);
    }

    #[test]
    fn test_tokenize_unexpected_text() {
        let err = tokenize_type("List<int[]>").unwrap_err();
        assert_eq!(err.column, 9);
        assert!(err.msg.contains("[]"), "unexpected message {:?}", err.msg);
    }
}

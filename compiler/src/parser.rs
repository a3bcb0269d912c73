use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::TypeSyntaxError,
    tokenizer::{tokenize_type, Token},
    utils::quote,
};

lazy_static! {
    static ref IDENTIFIER:  Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref LEFT_ANGLE:  Regex = Regex::new(r"^<$").unwrap();
    static ref RIGHT_ANGLE: Regex = Regex::new(r"^>$").unwrap();
    static ref COMMA:       Regex = Regex::new(r"^,$").unwrap();
    static ref EOF:         Regex = Regex::new(r"^$").unwrap();
}

/// Unresolved type expression: a name with optional type arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub name:   String,
    pub args:   Vec<TypeExpr>,
    pub column: usize,
}

struct Cursor<'a> {
    tokens: &'a [Token],
    index:  usize,
}

impl<'a> Cursor<'a> {
    // The tokenizer always ends the stream with an EOF token, which is never consumed.
    fn current(&self) -> &'a Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn eat(&mut self, test: &Regex) -> bool {
        if test.is_match(&self.current().text) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, test: &Regex, expected: &str) -> Result<&'a Token, TypeSyntaxError> {
        let token = self.current();
        if !self.eat(test) {
            let found = if token.text.is_empty() { "end of input".to_string() } else { quote(&token.text) };
            return Err(TypeSyntaxError {
                msg:    format!("Expected {} but found {}", expected, found),
                column: token.column,
            });
        }
        Ok(token)
    }
}

/// Parses a full type expression, e.g. `List<Map<Node>>`.
pub fn parse_type_expr(text: &str) -> Result<TypeExpr, TypeSyntaxError> {
    let tokens = tokenize_type(text)?;
    let mut cursor = Cursor { tokens: &tokens, index: 0 };
    let expr = parse_expr(&mut cursor)?;
    cursor.expect(&EOF, "end of input")?;
    Ok(expr)
}

fn parse_expr(cursor: &mut Cursor<'_>) -> Result<TypeExpr, TypeSyntaxError> {
    let name = cursor.expect(&IDENTIFIER, "type name")?;
    let mut args = Vec::new();

    if cursor.eat(&LEFT_ANGLE) {
        loop {
            args.push(parse_expr(cursor)?);
            if !cursor.eat(&COMMA) {
                break;
            }
        }
        cursor.expect(&RIGHT_ANGLE, "\">\"")?;
    }

    Ok(TypeExpr {
        name: name.text.clone(),
        args,
        column: name.column,
    })
}

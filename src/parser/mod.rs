//! Parser for the ASCII (old-style) plist dialect used by `project.pbxproj`.
//!
//! This is the text-to-tree converter the loader runs over the raw file.
//! Errors are plain strings so the loader can surface the converter's
//! output verbatim.
//!
//! Grammar:
//! ```text
//! root       = object
//! object     = '{' (identifier '=' value ';')* '}'
//! array      = '(' (value ','?)* ')'
//! identifier = Word | Quoted
//! value      = object | array | identifier
//! ```

pub mod escape;
pub mod lexer;

use indexmap::IndexMap;

use crate::types::Value;
use lexer::{Lexer, Token};

/// Parse a .pbxproj string into a [`Value`]. The root must be a dictionary.
pub fn parse(text: &str) -> Result<Value, String> {
    let mut parser = Parser {
        lexer: Lexer::new(text),
        peeked: None,
    };
    match parser.peek()? {
        Some(Token::OpenBrace) => {}
        Some(tok) => return Err(format!("project file must start with '{{', got {:?}", tok)),
        None => return Err("empty project file".to_string()),
    }
    let root = parser.parse_object()?;
    if parser.peek()?.is_some() {
        return Err("trailing content after the root dictionary".to_string());
    }
    Ok(root)
}

/// Recursive-descent parser driven directly off the token stream.
struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
}

impl Parser<'_> {
    fn peek(&mut self) -> Result<Option<&Token>, String> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn advance(&mut self) -> Result<Option<Token>, String> {
        match self.peeked.take() {
            Some(tok) => Ok(Some(tok)),
            None => self.lexer.next_token(),
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        match self.advance()? {
            Some(ref tok) if tok == expected => Ok(()),
            Some(tok) => Err(format!("expected {:?}, got {:?}", expected, tok)),
            None => Err(format!("expected {:?}, got end of input", expected)),
        }
    }

    fn parse_object(&mut self) -> Result<Value, String> {
        self.expect(&Token::OpenBrace)?;
        let mut map = IndexMap::new();
        loop {
            match self.peek()? {
                Some(Token::CloseBrace) => {
                    self.advance()?;
                    return Ok(Value::Object(map));
                }
                None => return Err("unterminated dictionary".to_string()),
                _ => {
                    let key = match self.advance()? {
                        Some(Token::Word(s)) | Some(Token::Quoted(s)) => s,
                        Some(tok) => return Err(format!("expected a key, got {:?}", tok)),
                        None => return Err("expected a key, got end of input".to_string()),
                    };
                    self.expect(&Token::Equals)?;
                    let value = self.parse_value()?;
                    self.expect(&Token::Semicolon)?;
                    map.insert(key, value);
                }
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, String> {
        self.expect(&Token::OpenParen)?;
        let mut items = Vec::new();
        loop {
            match self.peek()? {
                Some(Token::CloseParen) => {
                    self.advance()?;
                    return Ok(Value::Array(items));
                }
                None => return Err("unterminated array".to_string()),
                _ => {
                    items.push(self.parse_value()?);
                    if let Some(Token::Comma) = self.peek()? {
                        self.advance()?;
                    }
                }
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        match self.peek()? {
            Some(Token::OpenBrace) => self.parse_object(),
            Some(Token::OpenParen) => self.parse_array(),
            Some(Token::Word(_)) => match self.advance()? {
                Some(Token::Word(s)) => Ok(Value::from_literal(&s)),
                _ => unreachable!("peeked Word"),
            },
            Some(Token::Quoted(_)) => match self.advance()? {
                Some(Token::Quoted(s)) => Ok(Value::String(s)),
                _ => unreachable!("peeked Quoted"),
            },
            Some(tok) => Err(format!("unexpected token in value position: {:?}", tok)),
            None => Err("unexpected end of input in value position".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_object() {
        let root = parse("{ archiveVersion = 1; objectVersion = 46; }").unwrap();
        assert_eq!(root.get("archiveVersion").and_then(Value::as_integer), Some(1));
        assert_eq!(root.get("objectVersion").and_then(Value::as_integer), Some(46));
    }

    #[test]
    fn test_parse_nested() {
        let root = parse("{ objects = { A1 = { isa = PBXGroup; }; }; }").unwrap();
        let objects = root.get("objects").unwrap();
        let node = objects.get("A1").unwrap();
        assert_eq!(node.get("isa").and_then(Value::as_str), Some("PBXGroup"));
    }

    #[test]
    fn test_parse_array_with_trailing_commas() {
        let root = parse("{ children = ( one, two, three, ); empty = ( ); }").unwrap();
        let children = root.get("children").unwrap().as_array().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].as_str(), Some("one"));
        assert!(root.get("empty").unwrap().as_array().unwrap().is_empty());
    }

    #[test]
    fn test_parse_quoted_keys_and_values() {
        let root = parse(r#"{ "a key" = "a value"; sourceTree = "<group>"; }"#).unwrap();
        assert_eq!(root.get("a key").and_then(Value::as_str), Some("a value"));
        assert_eq!(root.get("sourceTree").and_then(Value::as_str), Some("<group>"));
    }

    #[test]
    fn test_parse_with_comments() {
        let input = "// !$*UTF8*$!\n{\n\t/* x */ archiveVersion = 1; // eol\n}";
        let root = parse(input).unwrap();
        assert_eq!(root.get("archiveVersion").and_then(Value::as_integer), Some(1));
    }

    #[test]
    fn test_id_stays_string() {
        let root = parse("{ rootObject = 13B07F961A680F5B00A75B9A; }").unwrap();
        assert_eq!(
            root.get("rootObject").and_then(Value::as_str),
            Some("13B07F961A680F5B00A75B9A")
        );
    }

    #[test]
    fn test_errors_are_descriptive() {
        assert!(parse("").unwrap_err().contains("empty"));
        assert!(parse("( a, b )").unwrap_err().contains("must start with '{'"));
        assert!(parse("{ key = value }").unwrap_err().contains("Semicolon"));
        assert!(parse("{ key = value; } junk").unwrap_err().contains("trailing"));
    }
}

//! Line tokenizer.
//!
//! # Responsibilities
//! - Split one line of configuration text into words, quoted strings,
//!   braces, separators and operators
//! - Read pair values as a single word or quoted string
//!
//! # Design Decisions
//! - Works on one line at a time; quoted strings never span lines
//! - Operators are matched longest-first (`:=` before `=`)
//! - A `#` at the start of a token begins a comment running to end of line

use std::fmt;

/// Assignment and comparison operators accepted between an attribute and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Equals,
    Set,
    Add,
    Sub,
    CmpEq,
    NotEq,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    RegexMatch,
    RegexNoMatch,
    Exists,
    NotExists,
}

/// Longest symbols first so prefixes never shadow longer operators.
const OPERATORS: &[(&str, Operator)] = &[
    (":=", Operator::Set),
    ("+=", Operator::Add),
    ("-=", Operator::Sub),
    ("==", Operator::CmpEq),
    ("!=", Operator::NotEq),
    (">=", Operator::GreaterEq),
    ("<=", Operator::LessEq),
    ("=~", Operator::RegexMatch),
    ("!~", Operator::RegexNoMatch),
    ("=*", Operator::Exists),
    ("!*", Operator::NotExists),
    (">", Operator::Greater),
    ("<", Operator::Less),
    ("=", Operator::Equals),
];

impl Operator {
    pub fn symbol(self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(sym, _)| *sym)
            .unwrap_or("=")
    }

    /// Match an operator at the start of `text`, returning it and its length.
    fn match_prefix(text: &str) -> Option<(Operator, usize)> {
        OPERATORS
            .iter()
            .find(|(sym, _)| text.starts_with(sym))
            .map(|(sym, op)| (*op, sym.len()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    /// Contents of a quoted string, escapes already processed.
    Quoted(String),
    LeftBrace,
    RightBrace,
    Semicolon,
    Op(Operator),
    /// `#` comment; the rest of the line is consumed.
    Comment,
    End,
}

impl Token {
    /// True when nothing meaningful follows on the line.
    pub fn is_end(&self) -> bool {
        matches!(self, Token::End | Token::Comment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    UnterminatedQuote(char),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::UnterminatedQuote(q) => write!(f, "Unterminated {} quoted string", q),
        }
    }
}

/// Cursor over the unread remainder of a line.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    /// Unread text, including any leading whitespace.
    pub fn rest(&self) -> &'a str {
        self.rest
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Classify and consume the next token.
    pub fn next_token(&mut self) -> Result<Token, TokenError> {
        self.skip_whitespace();
        let mut chars = self.rest.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return Ok(Token::End),
        };

        match first {
            '#' => {
                self.rest = "";
                return Ok(Token::Comment);
            }
            '{' => {
                self.rest = &self.rest[1..];
                return Ok(Token::LeftBrace);
            }
            '}' => {
                self.rest = &self.rest[1..];
                return Ok(Token::RightBrace);
            }
            ';' => {
                self.rest = &self.rest[1..];
                return Ok(Token::Semicolon);
            }
            '"' | '\'' | '`' => return self.quoted(first).map(Token::Quoted),
            _ => {}
        }

        if let Some((op, len)) = Operator::match_prefix(self.rest) {
            self.rest = &self.rest[len..];
            return Ok(Token::Op(op));
        }

        let end = word_end(self.rest);
        let word = &self.rest[..end];
        self.rest = &self.rest[end..];
        Ok(Token::Word(word.to_string()))
    }

    /// Read a pair value: a quoted string or a run of non-whitespace text.
    ///
    /// Returns `None` when the line has no more text. A trailing `;` on a bare
    /// value is a statement terminator and is dropped.
    pub fn next_value(&mut self) -> Result<Option<String>, TokenError> {
        self.skip_whitespace();
        let first = match self.rest.chars().next() {
            Some(c) => c,
            None => return Ok(None),
        };
        if matches!(first, '"' | '\'' | '`') {
            return self.quoted(first).map(Some);
        }

        let end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        let raw = &self.rest[..end];
        self.rest = &self.rest[end..];
        let value = raw.strip_suffix(';').unwrap_or(raw);
        Ok(Some(value.to_string()))
    }

    fn quoted(&mut self, quote: char) -> Result<String, TokenError> {
        let mut out = String::new();
        let mut chars = self.rest.char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            if c == quote {
                self.rest = &self.rest[i + c.len_utf8()..];
                return Ok(out);
            }
            if c == '\\' {
                match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, other)) => out.push(other),
                    None => break,
                }
                continue;
            }
            out.push(c);
        }
        Err(TokenError::UnterminatedQuote(quote))
    }
}

/// Length of the bare word at the start of `text`.
///
/// Words stop at whitespace, braces, `;`, and at the start of an operator.
/// `+`, `-` and `:` only end a word when followed by `=`, so names such as
/// `Auth-Type` and labels such as `::1` stay intact.
fn word_end(text: &str) -> usize {
    let bytes = text.as_bytes();
    for (i, c) in text.char_indices() {
        if c.is_whitespace() || matches!(c, '{' | '}' | ';' | '=' | '<' | '>' | '!' | '~') {
            return i.max(first_char_len(text, i));
        }
        if matches!(c, '+' | '-' | ':') && bytes.get(i + 1) == Some(&b'=') {
            return i.max(first_char_len(text, i));
        }
    }
    text.len()
}

/// Guarantees progress when a delimiter appears at position 0.
fn first_char_len(text: &str, i: usize) -> usize {
    if i == 0 {
        text.chars().next().map(char::len_utf8).unwrap_or(0)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<Token> {
        let mut cursor = Cursor::new(line);
        let mut out = Vec::new();
        loop {
            let tok = cursor.next_token().unwrap();
            if tok == Token::End {
                break;
            }
            out.push(tok);
        }
        out
    }

    #[test]
    fn test_section_header() {
        assert_eq!(
            tokens("client 10.0.0.1 {"),
            vec![
                Token::Word("client".into()),
                Token::Word("10.0.0.1".into()),
                Token::LeftBrace,
            ]
        );
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            tokens("a := b"),
            vec![
                Token::Word("a".into()),
                Token::Op(Operator::Set),
                Token::Word("b".into()),
            ]
        );
        assert_eq!(
            tokens("Auth-Type==x")[..2],
            [Token::Word("Auth-Type".into()), Token::Op(Operator::CmpEq)]
        );
        assert_eq!(
            tokens("count+=1")[..2],
            [Token::Word("count".into()), Token::Op(Operator::Add)]
        );
    }

    #[test]
    fn test_quoted_escapes() {
        let mut cursor = Cursor::new(r#""a \"b\"\tc" rest"#);
        assert_eq!(cursor.next_token().unwrap(), Token::Quoted("a \"b\"\tc".into()));
        assert_eq!(cursor.rest(), " rest");

        let mut bad = Cursor::new("'never closed");
        assert_eq!(bad.next_token(), Err(TokenError::UnterminatedQuote('\'')));
    }

    #[test]
    fn test_comment_consumes_line() {
        assert_eq!(tokens("   # note = x"), vec![Token::Comment]);
    }

    #[test]
    fn test_value_strips_semicolon() {
        let mut cursor = Cursor::new("  /var/log;  # trailing");
        assert_eq!(cursor.next_value().unwrap(), Some("/var/log".to_string()));
        assert_eq!(cursor.next_token().unwrap(), Token::Comment);

        let mut empty = Cursor::new("   ");
        assert_eq!(empty.next_value().unwrap(), None);
    }
}

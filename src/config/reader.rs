//! Recursive-descent section reader.
//!
//! # Responsibilities
//! - Read a file line by line into a [`ConfigTree`]
//! - Open a nested reader for every `name1 [name2] {` header
//! - Apply `${name}` substitution to every value
//! - Splice `$INCLUDE`d files in at the current nesting point
//!
//! # Design Decisions
//! - A failure at any depth rolls the arena back to where the failing
//!   section started and propagates; nothing partial is ever attached
//! - Text after `{` on a header line is the first statement of the new
//!   section, and a `}` after a complete pair closes the section, so
//!   `foo { bar = "baz" }` reads as one section with one pair
//! - Leading whitespace is skipped before the comment check

use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::error::{ConfigError, Location, Result};
use crate::config::loader::Loader;
use crate::config::substitute::substitute;
use crate::config::token::{Cursor, Operator, Token};
use crate::config::tree::{ConfigTree, NodeId, Pair};

const INCLUDE_DIRECTIVE: &str = "$INCLUDE";
const NOT_A_PAIR: &str = "Line is not in 'attribute = value' format";

/// What the enclosing loop does after a statement.
enum Flow {
    Next,
    Close,
}

pub(crate) struct SectionReader<'l, R> {
    loader: &'l mut Loader,
    file: Arc<Path>,
    source: R,
    line_no: usize,
    /// Nesting depth of this file's root within the including chain.
    base_depth: usize,
    tree: ConfigTree,
    buf: Vec<u8>,
}

impl<'l, R: BufRead> SectionReader<'l, R> {
    pub(crate) fn new(loader: &'l mut Loader, file: Arc<Path>, source: R, base_depth: usize) -> Self {
        Self {
            loader,
            tree: ConfigTree::new(file.clone()),
            file,
            source,
            line_no: 0,
            base_depth,
            buf: Vec::new(),
        }
    }

    /// Read the whole source as the root section.
    pub(crate) fn read(mut self) -> Result<ConfigTree> {
        self.read_section(None, None, None, 0, None)?;
        Ok(self.tree)
    }

    fn location(&self) -> Location {
        Location::new(self.file.clone(), self.line_no)
    }

    fn read_section(
        &mut self,
        name1: Option<&str>,
        name2: Option<&str>,
        parent: Option<NodeId>,
        depth: usize,
        pending: Option<String>,
    ) -> Result<NodeId> {
        if let Some(name) = name1 {
            if name.starts_with('_') {
                return Err(ConfigError::semantic(
                    self.location(),
                    format!("Illegal configuration section name \"{}\"", name),
                ));
            }
        }
        let max_depth = self.loader.options().max_depth;
        if self.base_depth + depth > max_depth {
            return Err(ConfigError::resource(
                self.location(),
                format!("Sections nested too deeply (limit {})", max_depth),
            ));
        }

        let mark = self.tree.mark();
        let id = self.tree.alloc_section(parent, self.line_no, name1, name2);
        match self.read_body(id, name1.is_some(), depth, pending) {
            Ok(()) => Ok(id),
            Err(e) => {
                self.tree.truncate(mark);
                Err(e)
            }
        }
    }

    fn read_body(&mut self, id: NodeId, named: bool, depth: usize, mut pending: Option<String>) -> Result<()> {
        loop {
            let text = match pending.take() {
                Some(text) => text,
                None => match self.next_line()? {
                    Some(text) => text,
                    None => break,
                },
            };
            if let Flow::Close = self.statement(id, named, depth, &text)? {
                return Ok(());
            }
        }

        if named {
            return Err(ConfigError::syntax(self.location(), "Unexpected end of file"));
        }
        Ok(())
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let max = self.loader.options().max_line_length;
        let location = Location::new(self.file.clone(), self.line_no + 1);
        let file = self.file.to_path_buf();
        self.buf.clear();
        // Bound the read so an endless line cannot exhaust memory.
        let mut limited = (&mut self.source).take(max as u64 + 2);
        let read = limited
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| ConfigError::io(location, file, e))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        // Length is checked on raw bytes; the cut may split a character.
        let mut end = self.buf.len();
        while end > 0 && matches!(self.buf[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        if end > max {
            return Err(ConfigError::resource(
                self.location(),
                format!("Line too long (limit {} bytes)", max),
            ));
        }
        match std::str::from_utf8(&self.buf[..end]) {
            Ok(line) => Ok(Some(line.to_string())),
            Err(_) => Err(ConfigError::syntax(self.location(), "Line is not valid UTF-8")),
        }
    }

    fn token(&self, cursor: &mut Cursor<'_>) -> Result<Token> {
        cursor
            .next_token()
            .map_err(|e| ConfigError::syntax(self.location(), e.to_string()))
    }

    fn statement(&mut self, id: NodeId, named: bool, depth: usize, text: &str) -> Result<Flow> {
        let mut cursor = Cursor::new(text);

        let first = self.token(&mut cursor)?;
        let name1 = match first {
            Token::End | Token::Comment | Token::Semicolon => return Ok(Flow::Next),
            Token::RightBrace => return self.close(named, &mut cursor),
            Token::Word(ref word) if word.eq_ignore_ascii_case(INCLUDE_DIRECTIVE) => {
                self.include(id, depth, &mut cursor)?;
                return Ok(Flow::Next);
            }
            Token::Word(word) | Token::Quoted(word) => word,
            Token::LeftBrace => {
                return Err(ConfigError::syntax(self.location(), "Section has no name"));
            }
            Token::Op(_) => return Err(ConfigError::syntax(self.location(), NOT_A_PAIR)),
        };

        match self.token(&mut cursor)? {
            Token::LeftBrace => self.open(id, depth, &name1, None, cursor.rest()),
            Token::Word(name2) | Token::Quoted(name2) => match self.token(&mut cursor)? {
                Token::LeftBrace => self.open(id, depth, &name1, Some(&name2), cursor.rest()),
                _ => Err(ConfigError::syntax(self.location(), NOT_A_PAIR)),
            },
            Token::Op(op) => {
                let value = cursor
                    .next_value()
                    .map_err(|e| ConfigError::syntax(self.location(), e.to_string()))?
                    .ok_or_else(|| ConfigError::syntax(self.location(), NOT_A_PAIR))?;
                self.add_pair(id, name1, op, &value)?;
                self.after_statement(named, &mut cursor)
            }
            Token::End | Token::Comment => {
                self.add_pair(id, name1, Operator::Equals, "")?;
                Ok(Flow::Next)
            }
            Token::Semicolon => {
                self.add_pair(id, name1, Operator::Equals, "")?;
                self.after_statement(named, &mut cursor)
            }
            Token::RightBrace => Err(ConfigError::syntax(self.location(), NOT_A_PAIR)),
        }
    }

    fn open(
        &mut self,
        parent: NodeId,
        depth: usize,
        name1: &str,
        name2: Option<&str>,
        rest: &str,
    ) -> Result<Flow> {
        let pending = Some(rest).filter(|r| !r.trim().is_empty()).map(str::to_string);
        let child = self.read_section(Some(name1), name2, Some(parent), depth + 1, pending)?;
        self.tree.attach(parent, child);
        Ok(Flow::Next)
    }

    /// A `}` ends the current section; only a comment may follow it.
    fn close(&self, named: bool, cursor: &mut Cursor<'_>) -> Result<Flow> {
        if !named {
            return Err(ConfigError::syntax(self.location(), "Unexpected end of section"));
        }
        if !self.token(cursor)?.is_end() {
            return Err(ConfigError::syntax(
                self.location(),
                "Unexpected text after end of section",
            ));
        }
        Ok(Flow::Close)
    }

    fn after_statement(&self, named: bool, cursor: &mut Cursor<'_>) -> Result<Flow> {
        loop {
            match self.token(cursor)? {
                Token::End | Token::Comment => return Ok(Flow::Next),
                Token::Semicolon => continue,
                Token::RightBrace => return self.close(named, cursor),
                _ => {
                    return Err(ConfigError::syntax(self.location(), "Unexpected text after value"));
                }
            }
        }
    }

    fn add_pair(&mut self, section: NodeId, attribute: String, operator: Operator, raw: &str) -> Result<()> {
        if attribute.is_empty() {
            return Err(ConfigError::syntax(self.location(), NOT_A_PAIR));
        }
        if attribute.starts_with('_') {
            return Err(ConfigError::semantic(
                self.location(),
                format!("Illegal configuration pair name \"{}\"", attribute),
            ));
        }

        let location = self.location();
        let max = self.loader.options().max_line_length;
        let value = substitute(&self.tree, section, raw, max, &location)?;
        self.tree.push_pair(
            section,
            self.line_no,
            Pair {
                attribute,
                value,
                operator,
            },
        );
        Ok(())
    }

    /// `$INCLUDE path`: the included file's root becomes a child section here.
    fn include(&mut self, section: NodeId, depth: usize, cursor: &mut Cursor<'_>) -> Result<()> {
        let raw = cursor
            .next_value()
            .map_err(|e| ConfigError::syntax(self.location(), e.to_string()))?
            .filter(|path| !path.is_empty())
            .ok_or_else(|| ConfigError::syntax(self.location(), "$INCLUDE requires a file name"))?;
        match self.token(cursor)? {
            Token::End | Token::Comment | Token::Semicolon => {}
            _ => {
                return Err(ConfigError::syntax(
                    self.location(),
                    "Unexpected text after $INCLUDE",
                ));
            }
        }

        let location = self.location();
        let max = self.loader.options().max_line_length;
        let target = substitute(&self.tree, section, &raw, max, &location)?;
        let path = self.resolve_include(&target);

        tracing::debug!(
            from = %location,
            file = %path.display(),
            "Including configuration file"
        );
        let included = self
            .loader
            .load_nested(&path, self.base_depth + depth + 1, Some(&location))?;
        self.tree.graft(section, included);
        Ok(())
    }

    /// Relative include paths are taken from the including file's directory.
    fn resolve_include(&self, target: &str) -> PathBuf {
        let target = Path::new(target);
        if target.is_absolute() {
            return target.to_path_buf();
        }
        match self.file.parent() {
            Some(dir) => dir.join(target),
            None => target.to_path_buf(),
        }
    }
}

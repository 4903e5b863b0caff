use std::io::{self, Read};

use thiserror::Error;

use crate::ast::MacroHeader;
use crate::parser::HeaderParser;

/// Any line starting with this character ends body collection.
const DIRECTIVE_PREFIX: char = '#';
/// Explicit body terminator; consumed, never re-emitted.
const END_DIRECTIVE: &str = "#enddefine";
/// Joins two physical lines into one logical preprocessor line.
const CONTINUATION: &str = " \\\n";
/// Token-paste operator inserted at qualifying parameter boundaries.
const PASTE: &str = " ## ";

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// The underlying line sequence is exhausted and nothing is pushed back.
    /// This is the normal end-of-run condition, not a failure.
    #[error("end of input")]
    EndOfInput,
}

/// A line iterator where lines can be pushed back for re-reading.
///
/// Pushed lines are returned LIFO before anything from the underlying
/// iterator, so body collection can return a line it does not own to the
/// driver loop. Reads are lazy: the underlying iterator is only advanced
/// when the push-back stack is empty.
#[derive(Debug)]
pub struct Pushback<I: Iterator<Item = String>> {
    iter: I,
    stack: Vec<String>,
}

impl<I: Iterator<Item = String>> Pushback<I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            stack: Vec::new(),
        }
    }

    /// Store a line to be returned by the next read.
    pub fn push(&mut self, line: String) {
        self.stack.push(line);
    }

    /// The most recently pushed line, or the next underlying line.
    pub fn next_line(&mut self) -> Result<String, Error> {
        if let Some(line) = self.stack.pop() {
            return Ok(line);
        }
        self.iter.next().ok_or(Error::EndOfInput)
    }
}

impl<I: Iterator<Item = String>> Iterator for Pushback<I> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.next_line().ok()
    }
}

/// Rewrites multi-line `#define` blocks into single logical definitions
/// joined by `\` line continuations, optionally inserting `##` where a
/// parameter occurrence touches an identifier character.
#[derive(Debug, Clone)]
pub struct Processor {
    auto_paste: bool,
}

impl Default for Processor {
    fn default() -> Self {
        Self { auto_paste: true }
    }
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable `##` insertion at parameter boundaries (default on).
    pub fn auto_paste(mut self, enabled: bool) -> Self {
        self.auto_paste = enabled;
        self
    }

    /// Process an ordered sequence of lines (without terminators) into
    /// output units: one per pass-through line, one per macro definition.
    pub fn process<I>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut source = Pushback::new(lines.into_iter());
        let mut output = Vec::new();

        while let Ok(line) = source.next_line() {
            match HeaderParser::parse_header(&line) {
                Some(header) => {
                    let body = collect_body(&mut source);
                    output.push(self.assemble(&header, &body));
                }
                None => output.push(line),
            }
        }

        output
    }

    /// Process source text, returning the transformed text.
    pub fn process_str(&self, input: &str) -> String {
        let units = self.process(input.lines().map(str::to_string));

        let mut output = String::with_capacity(input.len());
        for unit in &units {
            output.push_str(unit);
            output.push('\n');
        }
        if !input.ends_with('\n') {
            output.pop();
        }
        output
    }

    /// Process a file's contents, returning the transformed text.
    pub fn process_file(&self, path: &str) -> io::Result<String> {
        let source = std::fs::read_to_string(path)?;
        Ok(self.process_str(&source))
    }

    /// Join header and body into one logical definition.
    ///
    /// No continuation marker is emitted after the final body line; when the
    /// body was ended by `#enddefine` that final line is the empty one the
    /// collector appended, so the last real line keeps its marker.
    fn assemble(&self, header: &MacroHeader, body: &[String]) -> String {
        let mut joined = body.join(CONTINUATION);
        if self.auto_paste {
            joined = paste_params(&joined, &header.params);
        }
        format!("{}{}{}", header.raw, CONTINUATION, joined)
    }
}

/// Collect the body lines of one macro definition from `source`.
///
/// Stops at `#enddefine` (consumed; one empty line is appended to the body
/// in its place, so the assembled definition ends with a blank continuation)
/// or at any other `#` directive (pushed back unread; it belongs to the next
/// logical unit). Running out of input simply ends the body.
fn collect_body<I: Iterator<Item = String>>(source: &mut Pushback<I>) -> Vec<String> {
    let mut body = Vec::new();

    while let Ok(line) = source.next_line() {
        if line.starts_with(END_DIRECTIVE) {
            body.push(String::new());
            return body;
        }
        if line.starts_with(DIRECTIVE_PREFIX) {
            source.push(line);
            return body;
        }
        body.push(line.trim_end().to_string());
    }

    body
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Insert ` ## ` around every parameter occurrence that touches an
/// identifier character, over the already-joined body text.
///
/// Scans left to right; at each position the first parameter (in declaration
/// order) that matches as a literal substring wins, and matches never
/// overlap. Occurrences at the very start or end of the text get no operator
/// on that side. This is purely textual: occurrences inside string literals
/// or comments are rewritten too.
fn paste_params(body: &str, params: &[String]) -> String {
    let mut output = String::with_capacity(body.len());
    let mut i = 0;

    while i < body.len() {
        let matched = params
            .iter()
            .find(|p| !p.is_empty() && body[i..].starts_with(p.as_str()));

        match matched {
            Some(param) => {
                let end = i + param.len();
                if body[..i].chars().next_back().is_some_and(is_ident_char) {
                    output.push_str(PASTE);
                }
                output.push_str(param);
                if body[end..].chars().next().is_some_and(is_ident_char) {
                    output.push_str(PASTE);
                }
                i = end;
            }
            None => {
                let Some(c) = body[i..].chars().next() else {
                    break;
                };
                output.push(c);
                i += c.len_utf8();
            }
        }
    }

    output
}

/// A reader wrapper that rewrites multi-line macro definitions on the fly
pub struct ProcessingReader<R: Read> {
    inner: R,
    processor: Processor,
    buffer: Vec<u8>,
    buffer_pos: usize,
    done: bool,
}

impl<R: Read> ProcessingReader<R> {
    pub fn new(inner: R, processor: Processor) -> Self {
        Self {
            inner,
            processor,
            buffer: Vec::new(),
            buffer_pos: 0,
            done: false,
        }
    }

    fn fill_buffer(&mut self) -> io::Result<()> {
        if self.done {
            return Ok(());
        }

        // Read the entire input (for now - could be optimized for streaming)
        let mut input = String::new();
        self.inner.read_to_string(&mut input)?;

        self.buffer = self.processor.process_str(&input).into_bytes();
        self.buffer_pos = 0;
        self.done = true;
        Ok(())
    }
}

impl<R: Read> Read for ProcessingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.buffer_pos >= self.buffer.len() && !self.done {
            self.fill_buffer()?;
        }

        if self.buffer_pos >= self.buffer.len() {
            return Ok(0);
        }

        let available = self.buffer.len() - self.buffer_pos;
        let to_copy = std::cmp::min(available, buf.len());
        buf[..to_copy].copy_from_slice(&self.buffer[self.buffer_pos..self.buffer_pos + to_copy]);
        self.buffer_pos += to_copy;

        Ok(to_copy)
    }
}

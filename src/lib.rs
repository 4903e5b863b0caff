//! Extended `#define` syntax for C-family sources: write macro bodies over
//! multiple lines, terminated by `#enddefine` (or the next directive), and
//! get back a single logical definition joined by `\` continuations, with
//! `##` paste operators inserted wherever a parameter touches adjacent
//! identifier text.

pub mod ast;
pub mod parser;
pub mod processor;

pub use ast::MacroHeader;
pub use parser::HeaderParser;
pub use processor::{Error, ProcessingReader, Processor, Pushback};

//! Implements the tokenizer, splitters, and statement parser for the lash command language.
//!
//! Nothing in this crate performs expansion or execution; it only decides how source text
//! is carved up. Quoting state is tracked identically by every pass via [`QuoteTracker`].

pub mod arithmetic;
pub mod ast;
pub mod test_command;

mod error;
mod heredoc;
mod parser;
mod quoting;
mod split;
mod tokenizer;

pub use error::{ParseError, TestCommandParseError, TokenizerError, WordParseError};
pub use heredoc::{HereDocuments, extract_here_documents};
pub use parser::{Parser, parse_block};
pub use quoting::{CharState, QuoteMode, QuoteTracker, find_closing_paren, is_valid_name};
pub use split::{split_compounds, split_pipeline, strip_background_operator};
pub use tokenizer::{Token, parse_segment, tokenize};

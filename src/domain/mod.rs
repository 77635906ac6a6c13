//! Domain filter parser.
//!
//! Syntax:
//!   ('field','op','value')                      - single term
//!   [term, term, ...]                           - implicit AND of elements
//!   [term, '&', term, term]                     - AND of the next two terms
//!   [term, '|', term, term]                     - OR of the next two terms
//!   [term, '!', term]                           - NOT of the next term
//!
//! A bracketed list always starts with a bare term. Combinators take plain
//! terms as operands and do not nest. Values are strings made of word and
//! whitespace characters; there is no escaping, so values containing quotes
//! or commas cannot be expressed.

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::*;
pub use error::SyntaxError;
pub use lexer::Span;
pub use parser::{is_valid, parse_domain, parse_node, parse_term};

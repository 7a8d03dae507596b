pub mod ast;
pub mod backend;
pub mod context;
pub mod lexer;
pub mod naming;
pub mod parser;
pub mod resolve;
pub mod seed;
pub mod transpile;
pub mod ui;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{App, Node, Token, TokenKind};
pub use context::{Context, ContextError, extract_context};
pub use lexer::tokenize;
pub use parser::{ParseError, parse};
pub use transpile::{
    GeneratedFile, TranspileError, TranspileOptions, TranspileOutput, TranspileStats, transpile,
};

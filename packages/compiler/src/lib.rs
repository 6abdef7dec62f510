//! Template Compiler
//!
//! Compiles HTML templates with interpolations and directives into render
//! functions: tokenizer, tree builder, static optimizer and code generator.

pub mod chars;
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod expression_parser;
pub mod ml_parser;
pub mod optimizer;
pub mod parse_util;
pub mod util;

// Re-exports
pub use codegen::{CodeGenerator, CodegenResult, RenderCodegen};
pub use compiler::{compile, compile_all, compile_with, CompileCache, CompiledResult};
pub use config::{CompilerOptions, WhitespaceMode};
pub use error::{CompileError, Result};
pub use ml_parser::ast::{Ast, AstElement, AstNode, NodeId};
pub use optimizer::optimize;
pub use parse_util::{CompileWarning, SourceRange, WarningKind, WarningSink};

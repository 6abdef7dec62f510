//! Compiler
//!
//! Template to render functions: parse, optimize, generate.

use crate::codegen::{CodeGenerator, RenderCodegen};
use crate::config::CompilerOptions;
use crate::error::Result;
use crate::ml_parser::ast::{visit_all, Ast, AstElement, NodeId, Visitor};
use crate::ml_parser::parser::{parse, ParseResult};
use crate::optimizer::optimize;
use crate::parse_util::CompileWarning;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledResult {
    pub ast: Ast,
    pub render: String,
    pub static_render_fns: Vec<String>,
    pub warnings: Vec<CompileWarning>,
}

/// Compile with the default render code generator.
pub fn compile(template: &str, options: &CompilerOptions) -> Result<CompiledResult> {
    compile_with(template, options, &RenderCodegen)
}

/// Compile with a caller supplied code generator.
pub fn compile_with(
    template: &str,
    options: &CompilerOptions,
    generator: &dyn CodeGenerator,
) -> Result<CompiledResult> {
    let started = Instant::now();
    debug!("compiling template ({} bytes)", template.len());

    let ParseResult { mut ast, warnings } = parse(template.trim(), options)?;
    if options.optimize {
        optimize(&mut ast, options);
    }
    let code = generator.generate(&ast, options);

    debug!(
        "compiled template in {:?}: {} static roots, {} warnings",
        started.elapsed(),
        count_static_roots(&ast),
        warnings.len()
    );

    Ok(CompiledResult {
        ast,
        render: code.render,
        static_render_fns: code.static_render_fns,
        warnings,
    })
}

/// Compile independent templates in parallel, results in input order.
pub fn compile_all(templates: &[&str], options: &CompilerOptions) -> Vec<Result<CompiledResult>> {
    templates
        .par_iter()
        .map(|template| compile(template, options))
        .collect()
}

#[derive(Default)]
struct StaticRootCounter(usize);

impl Visitor for StaticRootCounter {
    fn visit_element(&mut self, _id: NodeId, element: &AstElement) -> bool {
        if element.static_root == Some(true) {
            self.0 += 1;
            return false;
        }
        true
    }
}

/// Number of hoisted subtrees in an optimized tree
pub fn count_static_roots(ast: &Ast) -> usize {
    let mut counter = StaticRootCounter::default();
    if let Some(root) = ast.root {
        visit_all(&mut counter, ast, &[root]);
    }
    counter.0
}

type CacheKey = (Option<(String, String)>, String);

/// Compiled templates keyed by delimiters and source.
///
/// The other options are assumed fixed for the lifetime of a cache.
#[derive(Default)]
pub struct CompileCache {
    entries: RwLock<HashMap<CacheKey, Arc<CompiledResult>>>,
}

impl CompileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&self, template: &str, options: &CompilerOptions) -> Result<Arc<CompiledResult>> {
        let key: CacheKey = (options.delimiters.clone(), template.to_string());
        if let Ok(entries) = self.entries.read() {
            if let Some(hit) = entries.get(&key) {
                return Ok(Arc::clone(hit));
            }
        }

        let compiled = Arc::new(compile(template, options)?);
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, Arc::clone(&compiled));
        }
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

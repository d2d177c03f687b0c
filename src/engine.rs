use crate::ast::Node;
use crate::cache::{AstCache, content_hash};
use crate::context::Context;
use crate::error::TemplateError;
use crate::filters::FilterRegistry;
use crate::serializer::to_value;
use crate::value::Value;
use crate::{parser, render};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Facade over the whole engine: compiles a template once, caches the AST
/// by content hash, and renders the cached AST against arbitrary contexts.
pub struct TemplateEngine {
    filters: FilterRegistry,
    cache: AstCache,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            filters: FilterRegistry::new(),
            cache: AstCache::new(),
        }
    }

    /// Register a custom filter, overwriting any existing entry by that name.
    pub fn register_filter<F>(&mut self, name: &str, filter: F)
    where
        F: Fn(&Value, &[String]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.filters.register(name, filter);
    }

    /// Parse a template, memoized by content hash. Byte-identical input
    /// returns the same cached node sequence. A failed parse caches nothing.
    pub fn compile(&self, template: &str) -> Result<Arc<Vec<Node>>, TemplateError> {
        let key = content_hash(template);
        if let Some(ast) = self.cache.get(key) {
            debug!("compile: cache hit, key={:#018x}", key);
            return Ok(ast);
        }

        let started = Instant::now();
        let ast = Arc::new(parser::parse(template)?);
        debug!(
            "compile: parsed {} top-level nodes in {}us, key={:#018x}",
            ast.len(),
            started.elapsed().as_micros(),
            key
        );
        self.cache.insert(key, ast.clone());
        Ok(ast)
    }

    /// Compile (cached) and render against a serializable context.
    pub fn render<T: Serialize>(&self, template: &str, context: &T) -> Result<String, TemplateError> {
        let root = to_value(context)?;
        self.render_value(template, &root)
    }

    /// Same as [`render`](Self::render) for a pre-built root value.
    pub fn render_value(&self, template: &str, root: &Value) -> Result<String, TemplateError> {
        let ast = self.compile(template)?;

        let started = Instant::now();
        let mut out = String::with_capacity(template.len());
        let mut ctx = Context::new(root);
        render::render_nodes(&ast, &mut ctx, &self.filters, &mut out)?;
        debug!(
            "render: {} bytes in {}us",
            out.len(),
            started.elapsed().as_micros()
        );
        Ok(out)
    }

    /// Read a template file (UTF-8, one blocking read) and render it.
    /// I/O failures belong to the file-system collaborator and propagate
    /// unwrapped.
    pub fn render_from_file<T: Serialize>(
        &self,
        path: impl AsRef<Path>,
        context: &T,
    ) -> Result<String, TemplateError> {
        let template = std::fs::read_to_string(path)?;
        self.render(&template, context)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of distinct templates currently compiled.
    pub fn cached_templates(&self) -> usize {
        self.cache.len()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

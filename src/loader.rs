use crate::engine::TemplateEngine;
use crate::error::TemplateError;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// File extensions treated as templates by [`TemplateEngine::preload_dir`].
const TEMPLATE_EXTENSIONS: [&str; 3] = ["html", "htm", "tpl"];

impl TemplateEngine {
    /// Recursively compile every template file under a directory into the
    /// cache, returning the number of files loaded. A read or parse failure
    /// aborts the load: a template that cannot compile must fail closed
    /// before it is ever rendered.
    pub fn preload_dir(&self, dir: impl AsRef<Path>) -> Result<usize, TemplateError> {
        let mut loaded = 0;
        for entry in WalkDir::new(dir.as_ref()).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || !has_template_extension(path) {
                continue;
            }

            let content = std::fs::read_to_string(path)?;
            self.compile(&content)?;
            debug!("preload: compiled {}", path.display());
            loaded += 1;
        }
        Ok(loaded)
    }
}

fn has_template_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
}

use crate::value::Value;

/// Resolution scope for one render pass: a borrowed root value plus a stack
/// of loop-local bindings. Later pushes shadow earlier ones and the root.
pub struct Context<'a> {
    root: &'a Value,
    locals: Vec<(String, Value)>,
}

impl<'a> Context<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            locals: Vec::new(),
        }
    }

    pub fn push(&mut self, key: &str, value: Value) {
        self.locals.push((key.to_string(), value));
    }

    pub fn pop(&mut self) {
        self.locals.pop();
    }

    /// Resolve a dotted path against locals, then the root map. Resolution
    /// never fails: any miss or non-map intermediate yields `Value::Null`,
    /// which stringifies to the empty string.
    pub fn lookup(&self, path: &str) -> &Value {
        // 1. Exact-name match against locals and the root.
        if let Some(v) = self.get_from_scope(path) {
            return v;
        }

        // 2. Dotted traversal, e.g. "user.name" or "loop.index".
        if let Some((head, rest)) = path.split_once('.') {
            if let Some(head_value) = self.get_from_scope(head) {
                if let Some(target) = Self::resolve_path(head_value, rest) {
                    return target;
                }
            }
        }

        &Value::Null
    }

    fn get_from_scope(&self, key: &str) -> Option<&Value> {
        // Locals are searched from the most recent push so shadowing works.
        if let Some((_, v)) = self.locals.iter().rev().find(|(k, _)| k == key) {
            return Some(v);
        }

        if let Value::Map(m) = self.root {
            return m.get(key);
        }

        None
    }

    fn resolve_path<'v>(mut current: &'v Value, path: &str) -> Option<&'v Value> {
        for part in path.split('.') {
            match current {
                Value::Map(m) => {
                    current = m.get(part)?;
                }
                _ => return None,
            }
        }
        Some(current)
    }
}

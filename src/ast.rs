/// One element of a compiled template. Ownership is strictly tree-shaped:
/// a block node owns its child sequences outright.
#[derive(Debug, Clone)]
pub enum Node {
    Text(String),
    Variable {
        path: String,
        escape: bool,
    },
    FilteredVariable {
        path: String,
        filter: String,
        args: Vec<String>,
        escape: bool,
    },
    If {
        condition: String,
        true_block: Vec<Node>,
        false_block: Vec<Node>,
    },
    For {
        var: String,
        iterable: String,
        body: Vec<Node>,
    },
}

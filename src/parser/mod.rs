mod lexer;

pub use lexer::{Token, lex};

use crate::ast::Node;
use crate::error::TemplateError;

/// An open block awaiting its end tag. Each frame carries its own type so
/// mixed nesting (`if` inside `for` and vice versa) is matched exactly
/// instead of by per-type depth counters.
enum Frame {
    If {
        condition: String,
        true_block: Option<Vec<Node>>,
    },
    For {
        var: String,
        iterable: String,
    },
}

impl Frame {
    fn kind(&self) -> &'static str {
        match self {
            Frame::If { .. } => "if",
            Frame::For { .. } => "for",
        }
    }
}

/// Compile template text into an ordered node sequence. The only parse-time
/// errors are structural: an unclosed block, or an end tag whose type does
/// not match the innermost open block.
pub fn parse(template: &str) -> Result<Vec<Node>, TemplateError> {
    let tokens = lex(template);

    let mut nodes_stack: Vec<Vec<Node>> = vec![Vec::new()];
    let mut frames: Vec<Frame> = Vec::new();

    for token in tokens {
        match token {
            Token::Text(t) => append_text(top(&mut nodes_stack), &t),
            Token::Output(inner) => top(&mut nodes_stack).push(parse_output(&inner)),
            Token::Tag { raw, inner } => {
                if let Some(condition) = inner.strip_prefix("if ") {
                    frames.push(Frame::If {
                        condition: condition.trim().to_string(),
                        true_block: None,
                    });
                    nodes_stack.push(Vec::new());
                } else if let Some(spec) = inner.strip_prefix("for ") {
                    match parse_for_header(spec) {
                        Some((var, iterable)) => {
                            frames.push(Frame::For { var, iterable });
                            nodes_stack.push(Vec::new());
                        }
                        // "for" without a well-formed "x in y" header is not
                        // a block opener; keep it as literal text.
                        None => append_text(top(&mut nodes_stack), &raw),
                    }
                } else if inner == "else" {
                    match frames.last_mut() {
                        Some(Frame::If { true_block, .. }) if true_block.is_none() => {
                            let block = std::mem::take(top(&mut nodes_stack));
                            *true_block = Some(block);
                        }
                        // else outside an if, or a second else: literal text.
                        _ => append_text(top(&mut nodes_stack), &raw),
                    }
                } else if inner == "endif" {
                    close_block(&mut frames, &mut nodes_stack, "if", "endif")?;
                } else if inner == "endfor" {
                    close_block(&mut frames, &mut nodes_stack, "for", "endfor")?;
                } else {
                    // Unknown tag: kept verbatim, never an error.
                    append_text(top(&mut nodes_stack), &raw);
                }
            }
        }
    }

    if let Some(frame) = frames.last() {
        return Err(TemplateError::UnclosedBlock(frame.kind()));
    }

    Ok(nodes_stack.pop().unwrap_or_default())
}

fn top(nodes_stack: &mut [Vec<Node>]) -> &mut Vec<Node> {
    nodes_stack.last_mut().expect("node stack underflow")
}

fn close_block(
    frames: &mut Vec<Frame>,
    nodes_stack: &mut Vec<Vec<Node>>,
    kind: &'static str,
    end_tag: &str,
) -> Result<(), TemplateError> {
    let open_kind = match frames.last() {
        // Stray end tag with no open block: dropped silently. Callers must
        // not rely on detecting this.
        None => return Ok(()),
        Some(frame) => frame.kind(),
    };
    if open_kind != kind {
        return Err(TemplateError::MismatchedEndTag {
            expected: format!("end{}", open_kind),
            found: end_tag.to_string(),
        });
    }

    let frame = frames.pop().expect("frame stack underflow");
    let block = nodes_stack.pop().unwrap_or_default();
    let node = match frame {
        Frame::If {
            condition,
            true_block,
        } => match true_block {
            // An else was seen: the closed block is the false branch.
            Some(true_block) => Node::If {
                condition,
                true_block,
                false_block: block,
            },
            None => Node::If {
                condition,
                true_block: block,
                false_block: Vec::new(),
            },
        },
        Frame::For { var, iterable } => Node::For {
            var,
            iterable,
            body: block,
        },
    };
    top(nodes_stack).push(node);
    Ok(())
}

/// `"item in items"` -> `("item", "items")`.
fn parse_for_header(spec: &str) -> Option<(String, String)> {
    let mut parts = spec.split_whitespace();
    let var = parts.next()?;
    if parts.next()? != "in" {
        return None;
    }
    let iterable = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((var.to_string(), iterable.to_string()))
}

/// Parse the inside of a `{{ ... }}` tag: optional `safe` prefix, optional
/// filter chain. Only the last filter of a chain is applied (current
/// grammar; multi-filter chaining is not evaluated beyond the final one).
fn parse_output(inner: &str) -> Node {
    let parts: Vec<&str> = inner.split('|').collect();
    let mut path = parts[0].trim();

    let mut escape = true;
    if let Some(rest) = path.strip_prefix("safe ") {
        path = rest.trim();
        escape = false;
    }

    if parts.len() > 1 {
        let filter_part = parts[parts.len() - 1].trim();
        let (filter, args) = parse_filter_spec(filter_part);
        return Node::FilteredVariable {
            path: path.to_string(),
            filter,
            args,
            escape,
        };
    }

    Node::Variable {
        path: path.to_string(),
        escape,
    }
}

/// `"default(N/A)"` -> `("default", ["N/A"])`; `"upper"` -> `("upper", [])`.
fn parse_filter_spec(spec: &str) -> (String, Vec<String>) {
    if let Some(open) = spec.find('(') {
        if spec.ends_with(')') {
            let name = spec[..open].trim().to_string();
            let args_str = &spec[open + 1..spec.len() - 1];
            let args = if args_str.trim().is_empty() {
                Vec::new()
            } else {
                args_str
                    .split(',')
                    .map(|a| strip_quotes(a.trim()).to_string())
                    .collect()
            };
            return (name, args);
        }
    }
    (spec.to_string(), Vec::new())
}

fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2
        && ((s.starts_with('\'') && s.ends_with('\'')) || (s.starts_with('"') && s.ends_with('"')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn append_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

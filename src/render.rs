use crate::ast::Node;
use crate::context::Context;
use crate::error::TemplateError;
use crate::filters::FilterRegistry;
use crate::value::Value;
use std::collections::HashMap;

pub(crate) fn render_nodes(
    nodes: &[Node],
    ctx: &mut Context,
    filters: &FilterRegistry,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Variable { path, escape } => {
                let rendered = ctx.lookup(path).to_string();
                push_escaped(out, &rendered, *escape);
            }
            Node::FilteredVariable {
                path,
                filter,
                args,
                escape,
            } => {
                let value = ctx.lookup(path);
                let filtered = filters.apply(filter, value, args)?;
                push_escaped(out, &filtered.to_string(), *escape);
            }
            Node::If {
                condition,
                true_block,
                false_block,
            } => {
                // Exactly one branch renders per invocation.
                let block = if eval_condition(condition, ctx) {
                    true_block
                } else {
                    false_block
                };
                render_nodes(block, ctx, filters, out)?;
            }
            Node::For {
                var,
                iterable,
                body,
            } => {
                // Anything but a list renders to nothing.
                let items = match ctx.lookup(iterable) {
                    Value::List(items) => items.clone(),
                    _ => continue,
                };

                let length = items.len();
                for (i, item) in items.into_iter().enumerate() {
                    ctx.push(var, item);
                    ctx.push("loop", loop_record(i, length));
                    let result = render_nodes(body, ctx, filters, out);
                    ctx.pop();
                    ctx.pop();
                    result?;
                }
            }
        }
    }
    Ok(())
}

/// The synthetic `loop` binding exposed inside a for body.
fn loop_record(index0: usize, length: usize) -> Value {
    let mut rec = HashMap::new();
    rec.insert("index".to_string(), Value::I64(index0 as i64 + 1));
    rec.insert("index0".to_string(), Value::I64(index0 as i64));
    rec.insert("first".to_string(), Value::Bool(index0 == 0));
    rec.insert("last".to_string(), Value::Bool(index0 + 1 == length));
    rec.insert("length".to_string(), Value::I64(length as i64));
    Value::Map(rec)
}

/// Condition grammar: a single token is a truthiness test, a three-token
/// form is `var op literal`. Anything else evaluates to false.
pub(crate) fn eval_condition(condition: &str, ctx: &Context) -> bool {
    let parts: Vec<&str> = condition.split_whitespace().collect();
    match parts.as_slice() {
        [var] => ctx.lookup(var).is_truthy(),
        [var, op, literal] => compare(ctx.lookup(var), op, literal),
        _ => false,
    }
}

fn compare(left: &Value, op: &str, literal: &str) -> bool {
    // Structural literals first.
    if matches!(op, "==" | "!=") {
        let equal = match literal {
            "null" => matches!(left, Value::Null),
            "true" => matches!(left, Value::Bool(true)),
            "false" => matches!(left, Value::Bool(false)),
            _ => {
                if let (Some(l), Some(r)) = (left.as_f64(), literal.parse::<f64>().ok()) {
                    l == r
                } else {
                    left.to_string() == strip_quotes(literal)
                }
            }
        };
        return if op == "==" { equal } else { !equal };
    }

    // Ordering: numeric when both sides coerce, lexicographic otherwise.
    let ordering = if let (Some(l), Some(r)) = (left.as_f64(), literal.parse::<f64>().ok()) {
        l.partial_cmp(&r)
    } else {
        Some(left.to_string().as_str().cmp(strip_quotes(literal)))
    };
    let Some(ordering) = ordering else {
        return false;
    };

    match op {
        ">" => ordering.is_gt(),
        "<" => ordering.is_lt(),
        ">=" => ordering.is_ge(),
        "<=" => ordering.is_le(),
        _ => false,
    }
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

fn push_escaped(out: &mut String, text: &str, escape: bool) {
    if !escape {
        out.push_str(text);
        return;
    }
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

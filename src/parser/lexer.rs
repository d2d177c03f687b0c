/// One span of the template source. Tokens do not overlap and are produced
/// left to right, earliest match first.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Text(String),
    /// Inner text of a `{{ ... }}` output tag, trimmed.
    Output(String),
    /// A `{% ... %}` control tag. `raw` keeps the original span so unknown
    /// tags can be emitted back as literal text.
    Tag { raw: String, inner: String },
}

/// Single linear pass over the source producing a flat token stream.
/// Malformed tags (an opener with no matching close) are not an error:
/// the rest of the input is swallowed as literal text.
pub fn lex(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < template.len() {
        let remaining = &template[pos..];

        let next_output = remaining.find("{{");
        let next_tag = remaining.find("{%");

        let (start, is_output) = match (next_output, next_tag) {
            (Some(o), Some(t)) if o <= t => (o, true),
            (Some(_), Some(t)) => (t, false),
            (Some(o), None) => (o, true),
            (None, Some(t)) => (t, false),
            (None, None) => {
                push_text(&mut tokens, remaining);
                break;
            }
        };

        let closer = if is_output { "}}" } else { "%}" };
        let Some(end) = remaining[start + 2..].find(closer) else {
            // Opener never closed: trailing literal text.
            push_text(&mut tokens, remaining);
            break;
        };

        if start > 0 {
            push_text(&mut tokens, &remaining[..start]);
        }

        let inner = remaining[start + 2..start + 2 + end].trim().to_string();
        if is_output {
            tokens.push(Token::Output(inner));
        } else {
            let raw = remaining[start..start + 2 + end + 2].to_string();
            tokens.push(Token::Tag { raw, inner });
        }

        pos += start + 2 + end + 2;
    }

    tokens
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Token::Text(last)) = tokens.last_mut() {
        last.push_str(text);
    } else {
        tokens.push(Token::Text(text.to_string()));
    }
}

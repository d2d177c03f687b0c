use crate::error::TemplateError;
use crate::value::Value;
use chrono::format::{Item, StrftimeItems};
use std::collections::HashMap;

/// A filter is a pure function over a resolved value. Argument literals come
/// from the template source; an `Err` message is wrapped by the registry.
pub type FilterFn = Box<dyn Fn(&Value, &[String]) -> Result<Value, String> + Send + Sync>;

/// Flat name -> function table. Later registrations overwrite earlier ones.
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            filters: HashMap::new(),
        };
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.register("upper", |v, _| map_str(v, |s| s.to_uppercase()));
        self.register("lower", |v, _| map_str(v, |s| s.to_lowercase()));
        self.register("capitalize", |v, _| map_str(v, capitalize));
        self.register("title", |v, _| map_str(v, title_case));
        self.register("length", |v, _| {
            Ok(Value::I64(v.len().unwrap_or(0) as i64))
        });
        self.register("default", |v, args| {
            if v.is_truthy() {
                Ok(v.clone())
            } else {
                Ok(Value::Str(args.first().cloned().unwrap_or_default()))
            }
        });
        self.register("date", |v, args| {
            let fmt = args.first().map(String::as_str).unwrap_or("%Y-%m-%d");
            format_date(v, fmt)
        });
    }

    pub fn register<F>(&mut self, name: &str, filter: F)
    where
        F: Fn(&Value, &[String]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.filters.insert(name.to_string(), Box::new(filter));
    }

    /// Apply a named filter. An unregistered name is an error; a failure
    /// inside the filter function is re-raised carrying its message.
    pub fn apply(&self, name: &str, value: &Value, args: &[String]) -> Result<Value, TemplateError> {
        let filter = self
            .filters
            .get(name)
            .ok_or_else(|| TemplateError::UnknownFilter(name.to_string()))?;

        filter(value, args).map_err(|message| TemplateError::Filter {
            name: name.to_string(),
            message,
        })
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The string filters map falsey input to the empty string and reject
/// truthy non-strings.
fn map_str(v: &Value, f: impl Fn(&str) -> String) -> Result<Value, String> {
    if !v.is_truthy() {
        return Ok(Value::Str(String::new()));
    }
    match v {
        Value::Str(s) => Ok(Value::Str(f(s))),
        other => Err(format!("expected a string, got {:?}", other)),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

fn format_date(v: &Value, fmt: &str) -> Result<Value, String> {
    // Validate the format up front: chrono's DelayedFormat panics on bad
    // specifiers at display time, which must surface as a filter failure.
    let items: Vec<Item> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|i| matches!(i, Item::Error)) {
        return Err(format!("invalid date format '{}'", fmt));
    }

    let formatted = match v {
        Value::Date(d) => d.format_with_items(items.iter()).to_string(),
        Value::Time(t) => t.format_with_items(items.iter()).to_string(),
        Value::DateTime(dt) => dt.format_with_items(items.iter()).to_string(),
        Value::DateTimeUtc(dt) => dt.format_with_items(items.iter()).to_string(),
        // Non-temporal values pass through unchanged.
        other => return Ok(other.clone()),
    };
    Ok(Value::Str(formatted))
}

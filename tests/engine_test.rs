use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use utpl::{TemplateEngine, TemplateError, Value};

fn ctx(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_plain_text_identity() {
    let engine = TemplateEngine::new();
    for input in [
        "hello world",
        "",
        "multi\nline\ntext",
        "lone { brace } and % signs",
    ] {
        let root = Value::Map(HashMap::new());
        assert_eq!(engine.render_value(input, &root).unwrap(), input);
    }
}

#[test]
fn test_output_is_escaped() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[("x", Value::Str("<b>".into()))]));
    assert_eq!(engine.render_value("{{ x }}", &root).unwrap(), "&lt;b&gt;");
}

#[test]
fn test_safe_bypasses_escaping() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[("x", Value::Str("<b>".into()))]));
    assert_eq!(engine.render_value("{{ safe x }}", &root).unwrap(), "<b>");
}

#[test]
fn test_filter_application() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[("name", Value::Str("bob".into()))]));
    assert_eq!(engine.render_value("{{ name|upper }}", &root).unwrap(), "BOB");
}

#[test]
fn test_conditional_branching() {
    let engine = TemplateEngine::new();
    let tpl = "{% if age > 18 %}adult{% else %}minor{% endif %}";

    let root = Value::Map(ctx(&[("age", Value::I64(20))]));
    assert_eq!(engine.render_value(tpl, &root).unwrap(), "adult");

    let root = Value::Map(ctx(&[("age", Value::I64(10))]));
    assert_eq!(engine.render_value(tpl, &root).unwrap(), "minor");
}

#[test]
fn test_loop_expansion() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[(
        "items",
        Value::List(vec![Value::I64(1), Value::I64(2), Value::I64(3)]),
    )]));
    let out = engine
        .render_value("{% for i in items %}{{ i }},{% endfor %}", &root)
        .unwrap();
    assert_eq!(out, "1,2,3,");
}

#[test]
fn test_loop_metadata() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[(
        "items",
        Value::List(vec![Value::I64(10), Value::I64(20)]),
    )]));
    let out = engine
        .render_value(
            "{% for i in items %}{{ loop.index }}:{{ loop.first }} {% endfor %}",
            &root,
        )
        .unwrap();
    assert_eq!(out, "1:true 2:false ");

    let out = engine
        .render_value(
            "{% for i in items %}{{ loop.index0 }}/{{ loop.last }}/{{ loop.length }} {% endfor %}",
            &root,
        )
        .unwrap();
    assert_eq!(out, "0/false/2 1/true/2 ");
}

#[test]
fn test_loop_variable_shadowing_restored() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[
        ("i", Value::Str("outer".into())),
        ("items", Value::List(vec![Value::I64(1)])),
    ]));
    let out = engine
        .render_value("{% for i in items %}{{ i }}{% endfor %}-{{ i }}", &root)
        .unwrap();
    assert_eq!(out, "1-outer");
}

#[test]
fn test_missing_variable_is_silent() {
    let engine = TemplateEngine::new();
    let root = Value::Map(HashMap::new());
    assert_eq!(engine.render_value("{{ missing.path }}", &root).unwrap(), "");
    assert_eq!(engine.render_value("[{{ nothing }}]", &root).unwrap(), "[]");
}

#[test]
fn test_missing_or_non_list_iterable_renders_nothing() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[("n", Value::I64(5))]));
    assert_eq!(
        engine
            .render_value("{% for i in absent %}x{% endfor %}", &root)
            .unwrap(),
        ""
    );
    assert_eq!(
        engine
            .render_value("{% for i in n %}x{% endfor %}", &root)
            .unwrap(),
        ""
    );
}

#[test]
fn test_compile_caching_identity() {
    let engine = TemplateEngine::new();
    let a = engine.compile("cached {{ x }}").unwrap();
    let b = engine.compile("cached {{ x }}").unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    // A spy filter counts invocations: two renders of the same template
    // must both execute (caching compiles, not renders).
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = counter.clone();
    let mut engine = TemplateEngine::new();
    engine.register_filter("spy", move |v, _| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(v.clone())
    });
    let root = Value::Map(ctx(&[("x", Value::I64(1))]));
    engine.render_value("{{ x|spy }}", &root).unwrap();
    engine.render_value("{{ x|spy }}", &root).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(engine.cached_templates(), 1);
}

#[test]
fn test_cleared_cache_still_renders() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[("x", Value::Str("v".into()))]));
    let warm = engine.render_value("{{ x }}!", &root).unwrap();
    engine.clear_cache();
    assert_eq!(engine.cached_templates(), 0);
    let cold = engine.render_value("{{ x }}!", &root).unwrap();
    assert_eq!(warm, cold);
}

#[test]
fn test_unclosed_block_fails_loudly() {
    let engine = TemplateEngine::new();
    let err = engine.compile("{% if x %}no end").unwrap_err();
    assert!(matches!(err, TemplateError::UnclosedBlock("if")));

    let root = Value::Map(HashMap::new());
    assert!(engine.render_value("{% for i in xs %}no end", &root).is_err());
}

#[test]
fn test_mixed_nesting() {
    let engine = TemplateEngine::new();

    // if inside for inside if, all properly closed.
    let root = Value::Map(ctx(&[
        ("show", Value::Bool(true)),
        (
            "items",
            Value::List(vec![Value::I64(0), Value::I64(7)]),
        ),
    ]));
    let tpl = "{% if show %}{% for i in items %}{% if i %}[{{ i }}]{% endif %}{% endfor %}{% endif %}";
    assert_eq!(engine.render_value(tpl, &root).unwrap(), "[7]");

    // A cross-type end tag is a parse error, not a mis-consumed terminator.
    let err = engine.compile("{% if x %}{% endfor %}").unwrap_err();
    assert!(matches!(err, TemplateError::MismatchedEndTag { .. }));
}

#[test]
fn test_stray_end_tag_disappears() {
    let engine = TemplateEngine::new();
    let root = Value::Map(HashMap::new());
    assert_eq!(engine.render_value("a{% endif %}b", &root).unwrap(), "ab");
}

#[test]
fn test_unknown_tag_renders_verbatim() {
    let engine = TemplateEngine::new();
    let root = Value::Map(HashMap::new());
    assert_eq!(
        engine.render_value("x{% include 'y' %}z", &root).unwrap(),
        "x{% include 'y' %}z"
    );
}

#[test]
fn test_unknown_filter_is_render_error() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[("x", Value::I64(1))]));
    let err = engine.render_value("{{ x|nonexistent }}", &root).unwrap_err();
    assert!(matches!(err, TemplateError::UnknownFilter(name) if name == "nonexistent"));
}

#[test]
fn test_filter_failure_carries_message() {
    let mut engine = TemplateEngine::new();
    engine.register_filter("explode", |_, _| Err("boom".to_string()));
    let root = Value::Map(ctx(&[("x", Value::I64(1))]));
    let err = engine.render_value("{{ x|explode }}", &root).unwrap_err();
    match err {
        TemplateError::Filter { name, message } => {
            assert_eq!(name, "explode");
            assert_eq!(message, "boom");
        }
        other => panic!("expected Filter error, got {other:?}"),
    }
}

#[test]
fn test_filter_chain_applies_last_only() {
    let engine = TemplateEngine::new();
    let root = Value::Map(ctx(&[("name", Value::Str("Bob".into()))]));
    assert_eq!(
        engine.render_value("{{ name|upper|lower }}", &root).unwrap(),
        "bob"
    );
}

#[test]
fn test_default_filter_with_argument() {
    let engine = TemplateEngine::new();
    let root = Value::Map(HashMap::new());
    assert_eq!(
        engine
            .render_value("{{ nick|default('anonymous') }}", &root)
            .unwrap(),
        "anonymous"
    );
}

#[test]
fn test_filtered_output_is_escaped_unless_safe() {
    let mut engine = TemplateEngine::new();
    engine.register_filter("wrap", |v, _| Ok(Value::Str(format!("<i>{}</i>", v))));
    let root = Value::Map(ctx(&[("x", Value::Str("a".into()))]));

    assert_eq!(
        engine.render_value("{{ x|wrap }}", &root).unwrap(),
        "&lt;i&gt;a&lt;/i&gt;"
    );
    assert_eq!(
        engine.render_value("{{ safe x|wrap }}", &root).unwrap(),
        "<i>a</i>"
    );
}

#[test]
fn test_render_with_serialized_struct() {
    #[derive(Serialize)]
    struct Profile {
        user: User,
    }
    #[derive(Serialize)]
    struct User {
        name: String,
        roles: Vec<String>,
    }

    let engine = TemplateEngine::new();
    let profile = Profile {
        user: User {
            name: "alice".into(),
            roles: vec!["admin".into(), "editor".into()],
        },
    };
    let out = engine
        .render(
            "{{ user.name }}: {% for r in user.roles %}{{ r }} {% endfor %}",
            &profile,
        )
        .unwrap();
    assert_eq!(out, "alice: admin editor ");
}

#[test]
fn test_nested_path_resolution() {
    let engine = TemplateEngine::new();
    let mut inner = HashMap::new();
    inner.insert("name".to_string(), Value::Str("deep".into()));
    let mut mid = HashMap::new();
    mid.insert("profile".to_string(), Value::Map(inner));
    let root = Value::Map(ctx(&[("user", Value::Map(mid))]));

    assert_eq!(
        engine.render_value("{{ user.profile.name }}", &root).unwrap(),
        "deep"
    );
    assert_eq!(
        engine.render_value("{{ user.profile.email }}", &root).unwrap(),
        ""
    );
}

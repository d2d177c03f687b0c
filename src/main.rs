use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};
use utpl::{TemplateEngine, Value};

#[derive(Serialize)]
struct Item {
    name: String,
    price: f64,
    in_stock: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    title: &'a str,
    customer: &'a str,
    items: Vec<Item>,
}

const REPORT_TEMPLATE: &str = "\
<h1>{{ title|upper }}</h1>
<p>Customer: {{ customer|default('anonymous') }}</p>
<ul>
{% for item in items %}  <li>{{ loop.index }}. {{ item.name }} - {{ item.price|money }}\
{% if item.in_stock %}{% else %} (out of stock){% endif %}</li>
{% endfor %}</ul>
{% if items %}<p>{{ items|length }} item(s)</p>{% else %}<p>empty</p>{% endif %}
";

fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::new("debug")).init();

    let mut engine = TemplateEngine::new();
    engine.register_filter("money", |v, _| match v {
        Value::F64(n) => Ok(Value::Str(format!("${:.2}", n))),
        Value::I64(n) => Ok(Value::Str(format!("${}.00", n))),
        other => Err(format!("money: expected a number, got {:?}", other)),
    });

    let report = Report {
        title: "Order #1042",
        customer: "alice",
        items: vec![
            Item {
                name: "keyboard".into(),
                price: 59.9,
                in_stock: true,
            },
            Item {
                name: "trackball".into(),
                price: 89.0,
                in_stock: false,
            },
        ],
    };

    // Render from a file when a path is given, otherwise run the built-in demo.
    let output = match std::env::args().nth(1) {
        Some(path) => engine.render_from_file(path, &report)?,
        None => engine.render(REPORT_TEMPLATE, &report)?,
    };

    println!("{}", output);
    Ok(())
}

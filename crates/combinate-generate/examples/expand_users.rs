use std::rc::Rc;

use combinate_generate::{
    GenerateOptions, GenerationEngine, MemorySink, Template, Value, nest, one, optional, some,
};

fn main() {
    let address = Template::new()
        .field("country", "PT")
        .field("city", one(["Lisboa", "Porto"]));

    let template = Template::new()
        .field("name", one(["ana", "bo"]))
        .field("roles", some(["admin", "billing"]))
        .field("nickname", optional("b"))
        .field("address", nest(&address))
        .field("active", true);

    let sink = Rc::new(MemorySink::new());
    let engine = GenerationEngine::new(GenerateOptions {
        log: true,
        ..GenerateOptions::default()
    })
    .with_sink(sink.clone());

    let expansion = engine.run(&template);
    for (key, value) in sink.entries() {
        eprintln!("{key}: {value}");
    }

    let fixtures: Vec<Value> = expansion.results.into_iter().map(Value::object).collect();
    let json = serde_json::to_string_pretty(&fixtures).expect("serialize fixtures");
    println!("{json}");
}

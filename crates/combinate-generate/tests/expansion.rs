use std::rc::Rc;

use combinate_generate::{
    Candidate, CloneMode, Combination, GenerateOptions, GenerationEngine, MemorySink, Record,
    Template, Value, generate, generate_mutable, nest, one, optional, some,
};

fn record(pairs: Vec<(&str, Value)>) -> Record {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn tags_len(record: &Record) -> usize {
    record["tags"].as_array().expect("tags array").borrow().len()
}

#[test]
fn literal_only_template_yields_its_base_object() {
    assert_eq!(generate(&Template::new()), vec![Record::new()]);

    let template = Template::new().field("id", 1).field("name", "ana");
    assert_eq!(
        generate(&template),
        vec![record(vec![("id", 1.into()), ("name", "ana".into())])]
    );
}

#[test]
fn one_varies_field_and_keeps_literals() {
    let template = Template::new().field("a", one([1, 2])).field("b", 6);

    assert_eq!(
        generate(&template),
        vec![
            record(vec![("a", 1.into()), ("b", 6.into())]),
            record(vec![("a", 2.into()), ("b", 6.into())]),
        ]
    );
}

#[test]
fn optional_omits_key_instead_of_setting_null() {
    let template = Template::new().field("a", optional("x")).field("b", 1);

    let results = generate(&template);
    assert_eq!(
        results,
        vec![
            record(vec![("a", "x".into()), ("b", 1.into())]),
            record(vec![("b", 1.into())]),
        ]
    );
    assert!(!results[1].contains_key("a"));
}

#[test]
fn optional_null_is_kept_as_null() {
    let results = generate(&Template::new().field("a", optional(Value::Null)));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].get("a"), Some(&Value::Null));
    assert_eq!(results[1].get("a"), None);
}

#[test]
fn some_binds_every_subset_in_enumeration_order() {
    let results = generate(&Template::new().field("a", some([1, 2])));

    let bound: Vec<Value> = results.iter().map(|result| result["a"].clone()).collect();
    assert_eq!(
        bound,
        vec![
            Value::array(Vec::<Value>::new()),
            Value::array([1]),
            Value::array([2]),
            Value::array([1, 2]),
        ]
    );
}

#[test]
fn two_fields_give_every_pair_in_nested_loop_order() {
    let template = Template::new()
        .field("a", one([1, 2]))
        .field("b", one(["x", "y", "z"]));

    let results = generate(&template);
    assert_eq!(results.len(), 6);

    let pairs: Vec<(i64, String)> = results
        .iter()
        .map(|result| {
            (
                result["a"].as_i64().expect("int"),
                result["b"].as_str().expect("text").to_string(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            (1, "x".to_string()),
            (2, "x".to_string()),
            (1, "y".to_string()),
            (2, "y".to_string()),
            (1, "z".to_string()),
            (2, "z".to_string()),
        ]
    );
}

#[test]
fn repeated_expansion_is_identical() {
    let template = Template::new()
        .field("a", some(["r", "w"]))
        .field("b", optional(3))
        .field("c", one([true, false]))
        .field("d", "fixed");

    let first = generate(&template);
    let second = generate(&template);
    assert_eq!(first.len(), 4 * 2 * 2);
    assert_eq!(first, second);
}

#[test]
fn shallow_results_share_nested_literals() {
    let template = Template::new()
        .field("tags", vec!["a"])
        .field("n", one([1, 2]));

    let results = generate(&template);
    assert!(results[0]["tags"].shares_storage(&results[1]["tags"]));

    results[0]["tags"]
        .as_array()
        .expect("tags array")
        .borrow_mut()
        .push(Value::from("b"));
    assert_eq!(tags_len(&results[1]), 2);
}

#[test]
fn deep_results_are_independent() {
    let template = Template::new()
        .field("tags", vec!["a"])
        .field("n", one([1, 2]));

    let results = generate_mutable(&template);
    results[0]["tags"]
        .as_array()
        .expect("tags array")
        .borrow_mut()
        .push(Value::from("b"));

    assert_eq!(tags_len(&results[0]), 2);
    assert_eq!(tags_len(&results[1]), 1);
    assert_eq!(tags_len(&template.base_object()), 1);
}

#[test]
fn deep_clone_failure_falls_back_to_shared_results() {
    let sink = Rc::new(MemorySink::new());
    let engine = GenerationEngine::new(GenerateOptions {
        clone_mode: CloneMode::Deep,
        ..GenerateOptions::default()
    })
    .with_sink(sink.clone());

    let template = Template::new()
        .field("tags", vec!["a"])
        .field("on_save", Value::callback(|_| Value::Null))
        .field("n", one([1, 2]));

    let expansion = engine.run(&template);
    assert_eq!(expansion.results.len(), 2);
    assert!(expansion.results[0]["tags"].shares_storage(&expansion.results[1]["tags"]));

    let fallback = expansion.report.clone_fallback.expect("fallback reported");
    assert!(fallback.contains("$.on_save"), "unexpected message: {fallback}");
    assert_eq!(sink.values("clone_error"), vec![fallback]);
}

#[test]
fn cyclic_literals_fall_back_instead_of_overflowing() {
    let list = Value::array([1]);
    list.as_array()
        .expect("array")
        .borrow_mut()
        .push(list.clone());

    let sink = Rc::new(MemorySink::new());
    let engine = GenerationEngine::new(GenerateOptions {
        log: true,
        clone_mode: CloneMode::Deep,
        ..GenerateOptions::default()
    })
    .with_sink(sink.clone());
    let template = Template::new()
        .field("self_ref", list.clone())
        .field("n", one([1, 2]));

    let expansion = engine.run(&template);
    assert_eq!(expansion.results.len(), 2);
    assert!(expansion.results[0]["self_ref"].shares_storage(&list));

    let fallback = expansion.report.clone_fallback.expect("fallback reported");
    assert!(fallback.contains("cycle"), "unexpected message: {fallback}");
    assert!(fallback.contains("$.self_ref[1]"), "unexpected message: {fallback}");
    assert_eq!(
        sink.values("base"),
        vec![r#"{"self_ref":[1,<cycle>]}"#.to_string()]
    );

    assert_eq!(generate_mutable(&template).len(), 2);

    list.as_array().expect("array").borrow_mut().pop();
}

#[test]
fn results_keep_declaration_order_of_keys() {
    let template = Template::new()
        .field("id", 7)
        .field("role", one(["admin"]))
        .field("name", "ana")
        .field("nickname", optional("bo"));

    let results = generate(&template);
    let keys: Vec<Vec<&str>> = results
        .iter()
        .map(|result| result.keys().map(String::as_str).collect())
        .collect();
    assert_eq!(
        keys,
        vec![
            vec!["id", "name", "role", "nickname"],
            vec!["id", "name", "role"],
        ]
    );
}

#[test]
fn nested_templates_are_single_choices() {
    let template = Template::new()
        .field("x", one([1, 2]))
        .field("y", nest(&Template::new().field("z", one(["a", "b"]))));

    let results = generate(&template);
    let z = |z: &str| Value::object(record(vec![("z", z.into())]));
    assert_eq!(
        results,
        vec![
            record(vec![("x", 1.into()), ("y", z("a"))]),
            record(vec![("x", 2.into()), ("y", z("a"))]),
            record(vec![("x", 1.into()), ("y", z("b"))]),
            record(vec![("x", 2.into()), ("y", z("b"))]),
        ]
    );
}

#[test]
fn custom_combinations_are_expanded_like_builtins() {
    let variants = Combination::from_fn(|| {
        let name = "Ana";
        vec![
            Candidate::Set(name.into()),
            Candidate::Set(name.to_uppercase().into()),
            Candidate::Set(name.to_lowercase().into()),
        ]
    });

    let names: Vec<String> = generate(&Template::new().field("name", variants))
        .iter()
        .map(|result| result["name"].as_str().expect("text").to_string())
        .collect();
    assert_eq!(names, vec!["Ana", "ANA", "ana"]);
}

#[test]
fn log_mode_records_base_and_candidates() {
    let sink = Rc::new(MemorySink::new());
    let engine = GenerationEngine::new(GenerateOptions {
        log: true,
        ..GenerateOptions::default()
    })
    .with_sink(sink.clone());

    let template = Template::new()
        .field("a", one([1, 2]))
        .field("b", 6)
        .field("c", optional("x"));
    let logged = engine.generate(&template);

    assert_eq!(
        sink.entries(),
        vec![
            ("base".to_string(), r#"{"b":6}"#.to_string()),
            ("a".to_string(), "[1,2]".to_string()),
            ("c".to_string(), r#"["x",<omit>]"#.to_string()),
        ]
    );
    assert_eq!(logged, generate(&template));
}

#[test]
fn quiet_mode_records_nothing() {
    let sink = Rc::new(MemorySink::new());
    let engine = GenerationEngine::default().with_sink(sink.clone());
    engine.generate(&Template::new().field("a", one([1])));
    assert!(sink.entries().is_empty());
}

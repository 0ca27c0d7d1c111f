#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

#[derive(Debug, Serialize, Arbitrary)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, Vec<(&str, &str)>, BTreeMap<String, Value>)| {
    let (page, components, globals) = data;
    let mut engine = slotted::Engine::new();
    engine.set_max_depth(16);
    for (name, source) in components {
        engine.add_template(name, source);
    }
    let _ = engine.render_source(page, &globals);
});

#![cfg(feature = "serde")]

mod helpers;

use std::thread;

use slotted::{value, Engine, ErrorKind, Value};

use crate::helpers::Writer;

#[test]
fn engine_debug() {
    let mut engine = Engine::new();
    engine.add_template("card", "{{ slot }}");
    let debug = format!("{:?}", engine);
    assert!(debug.contains("\"card\""));
    assert!(debug.contains("max_depth: 64"));
}

#[test]
fn engine_send_and_sync() {
    let mut engine = Engine::new();
    engine.add_template("card", "<div>{{ title }}</div>");
    thread::spawn(move || {
        let result = engine.render("card", value! { title: "lorem" }).unwrap();
        assert_eq!(result, "<div>lorem</div>");
    })
    .join()
    .unwrap();
}

#[test]
fn engine_shared_between_threads() {
    let mut engine = Engine::new();
    engine.add_template("n", "{{ n }}");
    thread::scope(|s| {
        for i in 0..4 {
            let engine = &engine;
            s.spawn(move || {
                let result = engine.render("n", value! { n: i }).unwrap();
                assert_eq!(result, i.to_string());
            });
        }
    });
}

#[test]
fn engine_add_template_non_static_source() -> slotted::Result<()> {
    let name = String::from("card");
    let source = String::from("{{ lorem }}");
    let mut engine = Engine::new();
    engine.add_template(&*name, &*source);
    let result = engine.render("card", value! { lorem: "ipsum" })?;
    assert_eq!(result, "ipsum");
    Ok(())
}

#[test]
fn engine_add_template_replaces() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.add_template("card", "old");
    engine.add_template("card", "new");
    assert_eq!(engine.render_from("card", Value::None)?, "new");
    Ok(())
}

#[test]
fn engine_remove_template() {
    let mut engine = Engine::new();
    engine.add_template("card", "x");
    assert_eq!(engine.remove_template("card").as_deref(), Some("x"));
    assert_eq!(engine.remove_template("card"), None);
    let err = engine.render_from("card", Value::None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnknownComponent { name } if name == "card"));
}

#[test]
fn engine_render_serializable() -> slotted::Result<()> {
    #[derive(serde::Serialize)]
    struct Props<'a> {
        title: &'a str,
        tags: &'a [&'a str],
    }

    let mut engine = Engine::new();
    engine.add_template("post", "{{ title }} [{{ tags.0 }}, {{ tags.1 }}]");
    let props = Props {
        title: "Hello",
        tags: &["a", "b"],
    };
    assert_eq!(engine.render("post", &props)?, "Hello [a, b]");
    Ok(())
}

#[test]
fn engine_render_err_properties_not_a_map() {
    let mut engine = Engine::new();
    engine.add_template("card", "");
    let err = engine.render("card", ["a", "b"]).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidArgument));

    let err = engine.render_source("", 1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid argument error: globals must be a map, found integer"
    );
}

#[test]
fn engine_render_to_writer() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.add_template("card", "<div>{{ title }}</div>");

    let mut w = Writer::new();
    engine.render_to_writer(&mut w, "card", value! { title: "lorem" })?;
    assert_eq!(w.into_string(), "<div>lorem</div>");

    let mut w = Writer::new();
    engine.render_from_to_writer(&mut w, "card", value! { title: "ipsum" })?;
    assert_eq!(w.into_string(), "<div>ipsum</div>");
    Ok(())
}

#[test]
fn engine_render_to_writer_err_io() {
    let mut engine = Engine::new();
    engine.add_template("card", "<div>{{ title }}</div>");

    let err = engine
        .render_to_writer(Writer::failing_after(0), "card", value! { title: "x" })
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Io(_)));
    assert_eq!(err.to_string(), "io error: writer closed");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn engine_render_source_globals() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.add_template("greet", "Hello {{ who }}");
    let result = engine.render_source(
        r#"{% include "greet" who: user.name %}!"#,
        value! { user: { name: "Ann" } },
    )?;
    assert_eq!(result, "Hello Ann!");
    Ok(())
}

#[test]
fn engine_render_source_has_no_default_slot() {
    let err = Engine::new()
        .render_source("{{ header }}", value! {})
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Render));
    assert_eq!(Engine::new().render_source("{{ slot }}", value! {}).unwrap(), "");
}

#[test]
fn engine_set_max_depth() {
    let mut engine = Engine::new();
    engine.set_max_depth(3);
    engine.add_template("a", r#"{% include "b" %}"#);
    engine.add_template("b", r#"{% include "c" %}"#);
    engine.add_template("c", r#"{% include "d" %}"#);
    engine.add_template("d", "deep");

    let err = engine.render_from("a", Value::None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MaxDepth(3)));
    assert_eq!(engine.render_from("b", Value::None).unwrap(), "deep");
}

#[test]
fn engine_default_formatter() -> slotted::Result<()> {
    fn quoted(f: &mut slotted::fmt::Formatter<'_>, v: &Value) -> slotted::fmt::Result {
        std::fmt::Write::write_char(f, '"')?;
        slotted::fmt::default(f, v)?;
        std::fmt::Write::write_char(f, '"')?;
        Ok(())
    }

    let mut engine = Engine::new();
    engine.set_default_formatter(&quoted);
    engine.add_template("card", "{{ title }} {{ slot }}");
    let mut cx = engine.context();
    cx.open("card", value! { title: "t" })?;
    cx.push_str("s");
    assert_eq!(cx.close("card")?, "\"t\" s");
    Ok(())
}

use std::fmt::Write;
use std::sync::Mutex;

use slotted::{resolve, value, Engine, ErrorKind, Map, Resolver, Scope, Value};

/// What a resolver was asked to render.
#[derive(Debug, Clone, PartialEq)]
struct Call {
    name: String,
    props: Map<String, Value>,
    default_slot: String,
    slots: Map<String, String>,
}

impl Call {
    fn new(name: &str, props: Value, default_slot: &str, slots: &[(&str, &str)]) -> Self {
        let props = match props {
            Value::Map(map) => map,
            _ => Map::new(),
        };
        let slots = slots
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            name: name.to_owned(),
            props,
            default_slot: default_slot.to_owned(),
            slots,
        }
    }

    fn from_scope(scope: &Scope<'_>) -> Self {
        Self {
            name: scope.name().to_owned(),
            props: scope.properties().clone(),
            default_slot: scope.default_slot().to_owned(),
            slots: scope.slots().clone(),
        }
    }
}

/// A resolver that records every call and renders `<name>default</name>`.
fn recording(calls: &Mutex<Vec<Call>>) -> impl Resolver + Send + Sync + '_ {
    resolve::from_fn(move |name, scope, cx| {
        calls.lock().unwrap().push(Call::from_scope(scope));
        write!(cx, "<{name}>{}</{name}>", scope.default_slot())?;
        Ok(())
    })
}

#[test]
fn protocol_default_slot_is_text_between_open_and_close() -> slotted::Result<()> {
    let calls = Mutex::new(Vec::new());
    let mut engine = Engine::new();
    engine.set_resolver(recording(&calls));

    let mut cx = engine.context();
    cx.open("x", Value::None)?;
    cx.push_str("lorem ");
    write!(cx, "ipsum")?;
    let result = cx.close("x")?;

    assert_eq!(result, "<x>lorem ipsum</x>");
    assert_eq!(
        *calls.lock().unwrap(),
        [Call::new("x", Value::None, "lorem ipsum", &[])]
    );
    Ok(())
}

#[test]
fn protocol_close_output_is_returned_not_written() -> slotted::Result<()> {
    let calls = Mutex::new(Vec::new());
    let mut engine = Engine::new();
    engine.set_resolver(recording(&calls));

    let mut cx = engine.context();
    cx.push_str("a");
    cx.open("x", Value::None)?;
    cx.push_str("b");
    let result = cx.close("x")?;
    cx.push_str("c");

    assert_eq!(result, "<x>b</x>");
    assert_eq!(cx.finish()?, "ac");
    Ok(())
}

#[test]
fn protocol_named_slot_is_passed_to_resolver() -> slotted::Result<()> {
    let calls = Mutex::new(Vec::new());
    let mut engine = Engine::new();
    engine.set_resolver(recording(&calls));

    let mut cx = engine.context();
    cx.open("x", Value::None)?;
    cx.open_slot("footer")?;
    cx.push_str("dolor");
    cx.close_slot("footer")?;
    cx.close("x")?;

    assert_eq!(
        *calls.lock().unwrap(),
        [Call::new("x", Value::None, "", &[("footer", "dolor")])]
    );
    Ok(())
}

#[test]
fn protocol_page_with_header_and_body() -> slotted::Result<()> {
    let calls = Mutex::new(Vec::new());
    let mut engine = Engine::new();
    engine.set_resolver(recording(&calls));

    let mut cx = engine.context();
    cx.open("page", value! { title: "T" })?;
    cx.open_slot("header")?;
    cx.push_str("H");
    cx.close_slot("header")?;
    cx.push_str("Body");
    let result = cx.close("page")?;

    assert_eq!(result, "<page>Body</page>");
    assert_eq!(
        *calls.lock().unwrap(),
        [Call::new(
            "page",
            value! { title: "T" },
            "Body",
            &[("header", "H")]
        )]
    );
    Ok(())
}

#[test]
fn protocol_nested_component_output_lands_in_parent_slot() -> slotted::Result<()> {
    let calls = Mutex::new(Vec::new());
    let mut engine = Engine::new();
    engine.set_resolver(recording(&calls));

    let mut cx = engine.context();
    cx.open("page", Value::None)?;
    cx.open_slot("header")?;
    let logo = cx.simple_component("logo", value! { size: 2 })?;
    cx.push_str(&logo);
    cx.close_slot("header")?;
    cx.open("section", Value::None)?;
    cx.push_str("text");
    let section = cx.close("section")?;
    cx.push_str(&section);
    cx.close("page")?;

    assert_eq!(
        *calls.lock().unwrap(),
        [
            Call::new("logo", value! { size: 2 }, "", &[]),
            Call::new("section", Value::None, "text", &[]),
            Call::new(
                "page",
                Value::None,
                "<section>text</section>",
                &[("header", "<logo></logo>")]
            ),
        ]
    );
    Ok(())
}

#[test]
fn protocol_simple_component_is_open_then_close() -> slotted::Result<()> {
    let calls = Mutex::new(Vec::new());
    let mut engine = Engine::new();
    engine.set_resolver(recording(&calls));

    let mut cx = engine.context();
    let a = cx.simple_component("x", value! { a: 1 })?;
    cx.open("x", value! { a: 1 })?;
    let b = cx.close("x")?;

    assert_eq!(a, b);
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    Ok(())
}

#[test]
fn protocol_slot_closed_twice_last_write_wins() -> slotted::Result<()> {
    let calls = Mutex::new(Vec::new());
    let mut engine = Engine::new();
    engine.set_resolver(recording(&calls));

    let mut cx = engine.context();
    cx.open("x", Value::None)?;
    cx.open_slot("s")?;
    cx.push_str("first");
    cx.close_slot("s")?;
    cx.open_slot("s")?;
    cx.push_str("second");
    cx.close_slot("s")?;
    cx.close("x")?;

    assert_eq!(
        *calls.lock().unwrap(),
        [Call::new("x", Value::None, "", &[("s", "second")])]
    );
    Ok(())
}

#[test]
fn protocol_depth_tracks_open_components() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.set_resolver(resolve::from_fn(|_, _, _| Ok(())));

    let mut cx = engine.context();
    assert_eq!(cx.depth(), 0);
    cx.open("a", Value::None)?;
    cx.open("b", Value::None)?;
    cx.open_slot("s")?;
    assert_eq!(cx.depth(), 2);
    cx.close_slot("s")?;
    cx.close("b")?;
    assert_eq!(cx.depth(), 1);
    cx.close("a")?;
    assert_eq!(cx.depth(), 0);
    assert_eq!(cx.finish()?, "");
    Ok(())
}

#[test]
fn protocol_resolver_can_render_nested_components() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.set_resolver(resolve::from_fn(|name, scope, cx| {
        match name {
            "card" => {
                cx.open("frame", Value::None)?;
                cx.open_slot("title")?;
                write!(cx, "{}", scope.property("title").map_or("", |_| "T"))?;
                cx.close_slot("title")?;
                cx.push_str(scope.default_slot());
                let frame = cx.close("frame")?;
                cx.push_str(&frame);
            }
            "frame" => {
                let title = scope.slot("title").unwrap_or_default();
                write!(cx, "[{title}|{}]", scope.default_slot())?;
            }
            _ => unreachable!(),
        }
        Ok(())
    }));

    let mut cx = engine.context();
    cx.open("card", value! { title: true })?;
    cx.push_str("body");
    let result = cx.close("card")?;
    assert_eq!(result, "[T|body]");
    Ok(())
}

#[test]
fn protocol_err_stack_mismatch() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.set_resolver(resolve::from_fn(|name, _, cx| {
        write!(cx, "{name}")?;
        Ok(())
    }));

    let mut cx = engine.context();
    cx.open("a", Value::None)?;
    let err = cx.close("b").unwrap_err();
    assert!(err.is_mismatch());
    match err.kind() {
        ErrorKind::StackMismatch { open, close } => {
            assert_eq!(open, "a");
            assert_eq!(close, "b");
        }
        kind => panic!("unexpected error kind {kind:?}"),
    }
    assert_eq!(
        err.to_string(),
        "stack mismatch error: trying to close `b` but `a` is the innermost open component"
    );
    assert_eq!(cx.depth(), 0);

    // the component's buffer was released, output goes to the top level
    cx.push_str("top");
    assert_eq!(cx.finish()?, "top");

    // a fresh render is unaffected
    let mut cx = engine.context();
    cx.open("a", Value::None)?;
    assert_eq!(cx.close("a")?, "a");
    assert_eq!(cx.finish()?, "");
    Ok(())
}

#[test]
fn protocol_err_slot_mismatch() -> slotted::Result<()> {
    let calls = Mutex::new(Vec::new());
    let mut engine = Engine::new();
    engine.set_resolver(recording(&calls));

    let mut cx = engine.context();
    cx.open("page", Value::None)?;
    cx.open_slot("a")?;
    cx.push_str("A");
    let err = cx.close_slot("b").unwrap_err();
    assert!(err.is_mismatch());
    match err.kind() {
        ErrorKind::SlotMismatch { open, close } => {
            assert_eq!(open, "a");
            assert_eq!(close, "b");
        }
        kind => panic!("unexpected error kind {kind:?}"),
    }
    assert_eq!(err.component(), Some("page"));
    assert_eq!(
        err.to_string(),
        "slot mismatch error in component `page`: trying to end slot `b` but `a` is the innermost open slot"
    );

    // the slot's buffer was released and nothing was stored for it
    cx.push_str("D");
    assert_eq!(cx.close("page")?, "<page>D</page>");
    assert_eq!(cx.depth(), 0);
    assert_eq!(
        *calls.lock().unwrap(),
        [Call::new("page", Value::None, "D", &[])]
    );
    Ok(())
}

#[test]
fn protocol_err_unclosed_slot() -> slotted::Result<()> {
    let engine = Engine::new();
    let mut cx = engine.context();
    cx.open("page", Value::None)?;
    cx.open_slot("outer")?;
    cx.open_slot("inner")?;
    let err = cx.close("page").unwrap_err();
    match err.kind() {
        ErrorKind::UnclosedSlot { component, slot } => {
            assert_eq!(component, "page");
            assert_eq!(slot, "inner");
        }
        kind => panic!("unexpected error kind {kind:?}"),
    }
    assert_eq!(cx.depth(), 0);
    assert_eq!(cx.finish()?, "");
    Ok(())
}

#[test]
fn protocol_err_no_open_slot() -> slotted::Result<()> {
    let engine = Engine::new();
    let mut cx = engine.context();
    cx.open("page", Value::None)?;
    let err = cx.close_slot("a").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NoOpenSlot));
    assert_eq!(
        err.to_string(),
        "nesting error: cannot end slot `a`, no slot is open"
    );
    Ok(())
}

#[test]
fn protocol_err_no_open_component() {
    let engine = Engine::new();
    let mut cx = engine.context();

    let err = cx.close("a").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NoOpenComponent));
    assert_eq!(
        err.to_string(),
        "nesting error: cannot close `a`, no component is open"
    );

    let err = cx.open_slot("s").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NoOpenComponent));

    let err = cx.close_slot("s").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NoOpenComponent));
}

#[test]
fn protocol_err_name_collision() -> slotted::Result<()> {
    let engine = Engine::new();
    let mut cx = engine.context();

    cx.open("page", value! { title: "T" })?;
    cx.open_slot("title")?;
    cx.close_slot("title")?;
    let err = cx.close("page").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NameCollision { name } if name == "title"));
    assert_eq!(err.component(), Some("page"));

    cx.open("page", Value::None)?;
    cx.open_slot("slot")?;
    cx.close_slot("slot")?;
    let err = cx.close("page").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NameCollision { name } if name == "slot"));

    cx.open("page", value! { slot: 1 })?;
    let err = cx.close("page").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NameCollision { name } if name == "slot"));
    Ok(())
}

#[test]
fn protocol_err_invalid_argument() {
    let engine = Engine::new();
    let mut cx = engine.context();

    let err = cx.open("", Value::None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidArgument));
    assert_eq!(
        err.to_string(),
        "invalid argument error: component name cannot be empty"
    );

    let err = cx.open("x", Value::from(1)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid argument error: properties for `x` must be a map, found integer"
    );
    assert_eq!(cx.depth(), 0);
}

#[test]
fn protocol_err_unclosed_component_on_finish() -> slotted::Result<()> {
    let engine = Engine::new();
    let mut cx = engine.context();
    cx.open("a", Value::None)?;
    cx.open("b", Value::None)?;
    let err = cx.finish().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnclosedComponent { name } if name == "a"));
    assert_eq!(
        err.to_string(),
        "unclosed component error: component `a` was never closed"
    );
    Ok(())
}

#[test]
fn protocol_err_resolver_cannot_close_caller_component() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.set_resolver(resolve::from_fn(|name, _, cx| {
        if name == "inner" {
            cx.close("outer")?;
        }
        write!(cx, "{name}")?;
        Ok(())
    }));

    let mut cx = engine.context();
    cx.open("outer", Value::None)?;
    cx.open("inner", Value::None)?;
    let err = cx.close("inner").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NoOpenComponent));
    assert_eq!(err.component(), Some("inner"));

    // the caller's component is untouched
    assert_eq!(cx.depth(), 1);
    assert_eq!(cx.close("outer")?, "outer");
    Ok(())
}

#[test]
fn protocol_err_resolver_cannot_open_slot_in_caller_component() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.set_resolver(resolve::from_fn(|_, _, cx| cx.open_slot("s")));

    let mut cx = engine.context();
    cx.open("outer", Value::None)?;
    cx.open("inner", Value::None)?;
    let err = cx.close("inner").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NoOpenComponent));
    Ok(())
}

#[test]
fn protocol_err_resolver_leaves_component_open() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.set_resolver(resolve::from_fn(|name, _, cx| {
        if name == "leaky" {
            cx.open("drip", Value::None)?;
            cx.push_str("lost");
        }
        Ok(())
    }));

    let mut cx = engine.context();
    cx.open("leaky", Value::None)?;
    let err = cx.close("leaky").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnclosedComponent { name } if name == "drip"));
    assert_eq!(err.component(), Some("leaky"));
    assert_eq!(cx.depth(), 0);
    assert_eq!(cx.finish()?, "");
    Ok(())
}

#[test]
fn protocol_err_resolver_error_is_annotated() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.set_resolver(resolve::from_fn(|name, _, cx| {
        if name == "outer" {
            cx.simple_component("inner", Value::None)?;
        }
        cx.open("", Value::None)
    }));

    let mut cx = engine.context();
    let err = cx.simple_component("outer", Value::None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidArgument));
    assert_eq!(err.component(), Some("inner"));
    Ok(())
}

#[test]
fn protocol_open_has_no_depth_limit() -> slotted::Result<()> {
    let mut engine = Engine::new();
    engine.set_max_depth(2);
    engine.set_resolver(resolve::from_fn(|name, scope, cx| {
        write!(cx, "({name}{})", scope.default_slot())?;
        Ok(())
    }));

    let names: Vec<String> = (0..100).map(|i| format!("c{i}")).collect();
    let mut cx = engine.context();
    for name in &names {
        cx.open(name, Value::None)?;
    }
    assert_eq!(cx.depth(), 100);
    for name in names.iter().rev() {
        let output = cx.close(name)?;
        cx.push_str(&output);
    }
    assert_eq!(cx.depth(), 0);

    let result = cx.finish()?;
    assert!(result.starts_with("(c0(c1(c2"));
    assert!(result.ends_with("(c99)))"));
    assert_eq!(result.matches('(').count(), 100);
    Ok(())
}

#[test]
fn protocol_err_max_depth_recursive_resolver() {
    let mut engine = Engine::new();
    engine.set_max_depth(8);
    engine.set_resolver(resolve::from_fn(|name, _, cx| {
        let inner = cx.simple_component(name, Value::None)?;
        cx.push_str(&inner);
        Ok(())
    }));

    let mut cx = engine.context();
    let err = cx.simple_component("forever", Value::None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MaxDepth(8)));
    assert_eq!(cx.depth(), 0);
}

#[test]
fn protocol_err_unknown_component() {
    let engine = Engine::new();
    let mut cx = engine.context();
    let err = cx.simple_component("missing", Value::None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnknownComponent { name } if name == "missing"));
    assert_eq!(err.component(), None);
    assert_eq!(
        err.to_string(),
        "unknown component error: unknown component `missing`"
    );
}

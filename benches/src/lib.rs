pub mod context;

use std::fmt::Write;

use slotted::{value, Context, Engine};

use crate::context::Page;

const LAYOUT: &str = "<html><head><title>{{ title }}</title></head>\
                      <body><nav>{{ nav }}</nav>{{ slot }}</body></html>";
const LIST: &str = "<ul>{{ slot }}</ul>";
const USER: &str = "<li>{{ name }} ({{ age }})</li>";

/// Returns an engine with the layout, list and user components.
pub fn engine() -> Engine<'static> {
    let mut engine = Engine::new();
    engine.add_template("layout", LAYOUT);
    engine.add_template("list", LIST);
    engine.add_template("user", USER);
    engine
}

/// Returns page markup that renders `n` users inside the layout.
pub fn markup(n: usize) -> String {
    let mut s = String::from(r#"{% component "layout" title: title %}"#);
    s.push_str(r#"{% slot "nav" %}{% include "user" name: "nav", age: 0 %}{% endslot "nav" %}"#);
    s.push_str(r#"{% component "list" %}"#);
    for i in 0..n {
        write!(s, r#"{{% include "user" name: users.{i}.name, age: users.{i}.age %}}"#).unwrap();
    }
    s.push_str(r#"{% endcomponent "list" %}{% endcomponent "layout" %}"#);
    s
}

/// Renders the same page as [`markup`] by driving a context directly.
pub fn drive(cx: &mut Context<'_>, page: &Page) -> slotted::Result<()> {
    cx.open("layout", value! { title: page.title.as_str() })?;
    cx.open_slot("nav")?;
    let nav = cx.simple_component("user", value! { name: "nav", age: 0 })?;
    cx.push_str(&nav);
    cx.close_slot("nav")?;
    cx.open("list", value! {})?;
    for user in &page.users {
        let row = cx.simple_component("user", value! { name: user.name.as_str(), age: user.age })?;
        cx.push_str(&row);
    }
    let list = cx.close("list")?;
    cx.push_str(&list);
    let layout = cx.close("layout")?;
    cx.push_str(&layout);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_and_context_agree() {
        let engine = engine();
        let page = context::random(10);

        let from_markup = engine.render_source(&markup(10), &page).unwrap();

        let mut cx = engine.context();
        drive(&mut cx, &page).unwrap();
        let from_context = cx.finish().unwrap();

        assert_eq!(from_markup, from_context);
        assert!(from_markup.starts_with("<html>"));
        assert_eq!(from_markup.matches("<li>").count(), 11);
    }
}

//! A nested component template engine with named slots.
//!
//! # Features
//!
//! ### Components
//!
//! - Open and close components, capturing everything in between as the
//!   component's default slot
//! - Named slots: `{% slot "header" %} ... {% endslot "header" %}`
//! - Components may render further components to any depth
//! - Mismatched closes are reported with both names instead of producing
//!   broken output
//!
//! ### Engine
//!
//! - Drive components directly from Rust with a [`Context`], or from markup
//! - Component bodies from registered templates, files on disk, or any
//!   [`Resolver`]
//! - Customizable value formatters: `{{ user.name | escape_html }}`
//! - Configurable delimiters
//! - Render using any [`serde`] serializable values
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the syntax
//! config, formatters, and the source of each component.
//!
//! ```
//! let mut engine = slotted::Engine::new();
//! engine.add_template("card", "<div class=card><h2>{{ title }}</h2>{{ slot }}</div>");
//! ```
//!
//! A component is rendered by opening it, writing its content and closing it
//! again. Everything written in between is available to the component body
//! as `slot`.
//!
//! ```
//! # let mut engine = slotted::Engine::new();
//! # engine.add_template("card", "<div class=card><h2>{{ title }}</h2>{{ slot }}</div>");
//! let result = engine.render_source(
//!     r#"{% component "card" title: "Hello" %}<p>World</p>{% endcomponent "card" %}"#,
//!     slotted::value! {},
//! )?;
//! assert_eq!(result, "<div class=card><h2>Hello</h2><p>World</p></div>");
//! # Ok::<(), slotted::Error>(())
//! ```
//!
//! The same thing can be done from Rust using a [`Context`].
//!
//! ```
//! # let mut engine = slotted::Engine::new();
//! # engine.add_template("card", "<div class=card><h2>{{ title }}</h2>{{ slot }}</div>");
//! use std::fmt::Write;
//!
//! let mut cx = engine.context();
//! cx.open("card", slotted::value! { title: "Hello" })?;
//! write!(cx, "<p>World</p>")?;
//! let result = cx.close("card")?;
//! assert_eq!(result, "<div class=card><h2>Hello</h2><p>World</p></div>");
//! # Ok::<(), slotted::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Named slots
//!
//! A component can expose any number of named slots. Inside the body they
//! are available by name, just like properties.
//!
//! ```
//! let mut engine = slotted::Engine::new();
//! engine.add_template("page", "<header>{{ header }}</header><main>{{ slot }}</main>");
//!
//! let result = engine.render_source(
//!     r#"
//! {%- component "page" -%}
//!   {%- slot "header" %}Home{% endslot "header" -%}
//!   Welcome
//! {%- endcomponent "page" -%}
//! "#,
//!     slotted::value! {},
//! )?;
//! assert_eq!(result, "<header>Home</header><main>Welcome</main>");
//! # Ok::<(), slotted::Error>(())
//! ```
//!
//! ### Render using structured data
//!
//! ```
//! #[derive(serde::Serialize)]
//! struct Props { user: User }
//!
//! #[derive(serde::Serialize)]
//! struct User { name: String }
//!
//! let mut engine = slotted::Engine::new();
//! engine.add_template("greeting", "Hello {{ user.name }}");
//!
//! let props = Props { user: User { name: "John Smith".into() } };
//! let result = engine.render("greeting", &props)?;
//!
//! assert_eq!(result, "Hello John Smith");
//! # Ok::<(), slotted::Error>(())
//! ```
//!
//! ### Mismatched components
//!
//! Closing a component that is not the innermost open one is an error that
//! names both components.
//!
//! ```
//! use slotted::ErrorKind;
//!
//! let engine = slotted::Engine::new();
//! let mut cx = engine.context();
//! cx.open("a", slotted::value! {})?;
//! let err = cx.close("b").unwrap_err();
//!
//! match err.kind() {
//!     ErrorKind::StackMismatch { open, close } => {
//!         assert_eq!(open, "a");
//!         assert_eq!(close, "b");
//!     }
//!     _ => unreachable!(),
//! }
//! # Ok::<(), slotted::Error>(())
//! ```
//!
//! ### Render a component using custom syntax
//!
//! ```
//! let syntax = slotted::Syntax::builder().expr("<{", "}>").block("<[", "]>").build();
//!
//! let mut engine = slotted::Engine::with_syntax(syntax);
//! engine.add_template("hello", "Hello <{ name }>");
//!
//! let result = engine.render_source(r#"<[ include "hello" name: "John" ]>!"#, slotted::value! {})?;
//! assert_eq!(result, "Hello John!");
//! # Ok::<(), slotted::Error>(())
//! ```
//!
//! ### Add and use a custom formatter
//!
//! ```
//! use std::fmt::Write;
//!
//! let mut engine = slotted::Engine::new();
//! engine.add_formatter("debug", |f, value| {
//!     write!(f, "Value::{:?}", value)?;
//!     Ok(())
//! });
//! engine.add_template("age", "User age: {{ user.age | debug }}");
//!
//! let result = engine.render("age", slotted::value! { user: { age: 23 } })?;
//!
//! assert_eq!(result, "User age: Value::Integer(23)");
//! # Ok::<(), slotted::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod compile;
mod error;
pub mod fmt;
mod macros;
mod render;
pub mod resolve;
mod types;
mod value;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;

use tracing::debug;

pub use crate::error::{Error, ErrorKind};
pub use crate::render::{Binding, Context, Scope, DEFAULT_SLOT};
pub use crate::resolve::{FileLoader, Resolver};
pub use crate::types::syntax::{Syntax, SyntaxBuilder};
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::{List, Map, Value};

use crate::compile::Searcher;
use crate::fmt::FormatFn;

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The component rendering engine.
///
/// The engine holds everything that stays the same between renders. Each
/// render gets its own [`Context`], so an engine can be shared between
/// threads.
pub struct Engine<'engine> {
    searcher: Searcher,
    default_formatter: &'engine FormatFn,
    formatters: BTreeMap<Cow<'engine, str>, Box<FormatFn>>,
    templates: BTreeMap<Cow<'engine, str>, Cow<'engine, str>>,
    resolver: Option<Box<dyn Resolver + Send + Sync + 'engine>>,
    max_depth: usize,
}

impl<'engine> Default for Engine<'engine> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'engine> Engine<'engine> {
    /// Construct a new engine.
    #[inline]
    pub fn new() -> Self {
        Self::with_syntax(Syntax::default())
    }

    /// Construct a new engine with custom syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotted::{Engine, Syntax};
    ///
    /// let syntax = Syntax::builder().expr("<{", "}>").block("<[", "]>").build();
    /// let engine = Engine::with_syntax(syntax);
    /// ```
    #[inline]
    pub fn with_syntax(syntax: Syntax<'engine>) -> Self {
        Self {
            searcher: Searcher::new(syntax),
            default_formatter: &fmt::default,
            formatters: BTreeMap::new(),
            templates: BTreeMap::new(),
            resolver: None,
            max_depth: 64,
        }
    }

    /// Set the default formatter, used for properties emitted without a
    /// named formatter.
    #[inline]
    pub fn set_default_formatter<F>(&mut self, f: &'engine F)
    where
        F: Fn(&mut fmt::Formatter<'_>, &Value) -> fmt::Result + Sync + Send + 'static,
    {
        self.default_formatter = f;
    }

    /// Add a new value formatter to the engine.
    #[inline]
    pub fn add_formatter<N, F>(&mut self, name: N, f: F)
    where
        N: Into<Cow<'engine, str>>,
        F: Fn(&mut fmt::Formatter<'_>, &Value) -> fmt::Result + Sync + Send + 'static,
    {
        self.formatters.insert(name.into(), Box::new(f));
    }

    /// Add a component template to the engine.
    ///
    /// The source is kept as is and evaluated every time the component is
    /// rendered. Adding a template with an existing name replaces it.
    #[inline]
    pub fn add_template<N, S>(&mut self, name: N, source: S)
    where
        N: Into<Cow<'engine, str>>,
        S: Into<Cow<'engine, str>>,
    {
        self.templates.insert(name.into(), source.into());
    }

    /// Remove a component template from the engine, returning its source.
    #[inline]
    pub fn remove_template(&mut self, name: &str) -> Option<Cow<'engine, str>> {
        self.templates.remove(name)
    }

    /// Render components with the given resolver instead of the templates
    /// added to this engine.
    #[inline]
    pub fn set_resolver<R>(&mut self, resolver: R)
    where
        R: Resolver + Send + Sync + 'engine,
    {
        self.resolver = Some(Box::new(resolver));
    }

    /// Set the maximum render depth.
    ///
    /// This limits how deeply component bodies may render other components,
    /// for example a template that includes itself. It does not limit how
    /// many components are open at the same time. Defaults to 64.
    #[inline]
    pub fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }

    /// Returns a new render context.
    #[inline]
    pub fn context(&self) -> Context<'_> {
        Context::new(self)
    }

    /// Render a single component with the given properties.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render<S>(&self, name: &str, props: S) -> Result<String>
    where
        S: ::serde::Serialize,
    {
        self.render_from(name, to_value(props)?)
    }

    /// Render a single component with the given properties.
    pub fn render_from(&self, name: &str, props: Value) -> Result<String> {
        let mut cx = self.context();
        let output = cx.simple_component(name, props)?;
        cx.push_str(&output);
        cx.finish()
    }

    /// Render a single component to a writer.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render_to_writer<W, S>(&self, writer: W, name: &str, props: S) -> Result<()>
    where
        W: io::Write,
        S: ::serde::Serialize,
    {
        self.render_from_to_writer(writer, name, to_value(props)?)
    }

    /// Render a single component to a writer.
    pub fn render_from_to_writer<W>(&self, mut writer: W, name: &str, props: Value) -> Result<()>
    where
        W: io::Write,
    {
        let output = self.render_from(name, props)?;
        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    /// Render page markup.
    ///
    /// The markup is not a component itself, it has no slots and its
    /// properties are `globals`. Every component it opens must be closed.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render_source<S>(&self, source: &str, globals: S) -> Result<String>
    where
        S: ::serde::Serialize,
    {
        self.render_source_from(source, to_value(globals)?)
    }

    /// Render page markup, see [`render_source`][Engine::render_source].
    pub fn render_source_from(&self, source: &str, globals: Value) -> Result<String> {
        let human = globals.human();
        let props = globals.into_properties().ok_or_else(|| {
            Error::invalid_argument(format!("globals must be a map, found {human}"))
        })?;
        let slots = Map::new();
        let scope = Scope::new("", &props, "", &slots);
        let mut cx = self.context();
        cx.evaluate(source, &scope)?;
        cx.finish()
    }

    /// Renders the body of a component into `cx`.
    pub(crate) fn resolve(&self, name: &str, scope: &Scope<'_>, cx: &mut Context<'_>) -> Result<()> {
        if let Some(resolver) = &self.resolver {
            return resolver.resolve(name, scope, cx);
        }
        let source = self
            .templates
            .get(name)
            .ok_or_else(|| Error::unknown_component(name))?;
        debug!(component = name, "evaluate template");
        cx.evaluate(source, scope)
    }

    pub(crate) fn get_formatter(&self, name: &str) -> Option<&FormatFn> {
        self.formatters.get(name).map(|f| &**f)
    }
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("Engine");
        d.field("searcher", &self.searcher);
        d.field("formatters", &self.formatters.keys());
        d.field("templates", &self.templates.keys());
        d.field("resolver", &self.resolver.as_ref().map(|_| "<resolver>"));
        d.field("max_depth", &self.max_depth);
        d.finish()
    }
}

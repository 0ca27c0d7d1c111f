//! Where component bodies come from.
//!
//! By default an [`Engine`][crate::Engine] renders components from the
//! templates added with [`add_template`][crate::Engine::add_template]. Use
//! [`set_resolver`][crate::Engine::set_resolver] to render them some other
//! way, for example from Rust code or from files on disk.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::{Context, Error, Result, Scope};

/// Renders the body of a component.
///
/// The resolver writes the body to `cx`. It may open and close further
/// components on `cx`, but cannot close any component that was opened
/// outside of the body.
///
/// # Examples
///
/// ```
/// use std::fmt::Write;
/// use slotted::{Context, Engine, Resolver, Result, Scope};
///
/// struct Upper;
///
/// impl Resolver for Upper {
///     fn resolve(&self, name: &str, scope: &Scope<'_>, cx: &mut Context<'_>) -> Result<()> {
///         write!(cx, "<{name}>{}</{name}>", scope.default_slot().to_uppercase())?;
///         Ok(())
///     }
/// }
///
/// let mut engine = Engine::new();
/// engine.set_resolver(Upper);
/// let mut cx = engine.context();
/// cx.open("b", slotted::value! {})?;
/// write!(cx, "hi")?;
/// assert_eq!(cx.close("b")?, "<b>HI</b>");
/// # Ok::<(), slotted::Error>(())
/// ```
pub trait Resolver {
    fn resolve(&self, name: &str, scope: &Scope<'_>, cx: &mut Context<'_>) -> Result<()>;
}

/// A resolver backed by a function or closure, see [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FromFn<F>(F);

/// Returns a resolver that calls the given function for every component.
///
/// # Examples
///
/// ```
/// use std::fmt::Write;
/// use slotted::{resolve, Engine};
///
/// let mut engine = Engine::new();
/// engine.set_resolver(resolve::from_fn(|name, scope, cx| {
///     write!(cx, "[{name}:{}]", scope.default_slot())?;
///     Ok(())
/// }));
///
/// let result = engine.render_source(
///     r#"{% component "x" %}a{% include "y" %}b{% endcomponent "x" %}"#,
///     slotted::value! {},
/// )?;
/// assert_eq!(result, "[x:a[y:]b]");
/// # Ok::<(), slotted::Error>(())
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&str, &Scope<'_>, &mut Context<'_>) -> Result<()>,
{
    FromFn(f)
}

impl<F> Resolver for FromFn<F>
where
    F: Fn(&str, &Scope<'_>, &mut Context<'_>) -> Result<()>,
{
    fn resolve(&self, name: &str, scope: &Scope<'_>, cx: &mut Context<'_>) -> Result<()> {
        (self.0)(name, scope, cx)
    }
}

/// Loads component markup from a directory.
///
/// The component `card` is read from `<dir>/card.html` and nested names like
/// `ui/button` map to subdirectories. The file is read every time the
/// component is rendered.
#[derive(Debug, Clone)]
pub struct FileLoader {
    dir: PathBuf,
    extension: String,
}

impl FileLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: String::from("html"),
        }
    }

    /// Set the file extension used for components, defaults to `html`.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Returns the file for a component, or `None` if the name could escape
    /// the directory.
    fn path(&self, name: &str) -> Option<PathBuf> {
        let rel = Path::new(name);
        let plain = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !plain {
            return None;
        }
        let mut path = self.dir.join(rel);
        let file_name = path.file_name()?.to_owned();
        let mut file_name = file_name.into_string().ok()?;
        if !self.extension.is_empty() {
            file_name.push('.');
            file_name.push_str(&self.extension);
        }
        path.set_file_name(file_name);
        Some(path)
    }
}

impl Resolver for FileLoader {
    fn resolve(&self, name: &str, scope: &Scope<'_>, cx: &mut Context<'_>) -> Result<()> {
        let path = self
            .path(name)
            .ok_or_else(|| Error::unknown_component(name))?;
        debug!(component = name, path = %path.display(), "load component");
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::unknown_component(name));
            }
            Err(err) => return Err(err.into()),
        };
        cx.evaluate(&source, scope)
    }
}

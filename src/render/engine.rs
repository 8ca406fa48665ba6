//! Template environment: minijinja bound to the templates directory.

use crate::context::Context;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, UndefinedBehavior};
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

pub struct Engine {
    env: Environment<'static>,
    root: PathBuf,
}

impl Engine {
    /// Environment that loads templates by relative path under `root`.
    ///
    /// Strict about unknown variables; output is never escaped. One trailing
    /// newline is dropped from every template, as Jinja does by default.
    pub fn new(root: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(dir_loader(root));
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_: &str| -> AutoEscape { AutoEscape::None });
        Self {
            env,
            root: root.to_path_buf(),
        }
    }

    /// Render the template at `rel` (relative to the root) with `ctx`.
    ///
    /// The source is read straight from disk, so names the loader cannot
    /// express (non-UTF-8) still render; includes go through the loader.
    pub fn render(&self, rel: &Path, ctx: &Context) -> Result<String, Error> {
        let name = template_name(rel);
        let source = read_template(&self.root.join(rel))?.ok_or_else(|| {
            Error::new(
                ErrorKind::TemplateNotFound,
                format!("template {name:?} does not exist"),
            )
        })?;
        self.env.render_named_str(&name, &source, ctx)
    }
}

/// Loader rooted at `dir`. Only `..` segments are refused; dotfiles and
/// dot-directories such as `.github/` load like any other name.
fn dir_loader(
    dir: &Path,
) -> impl Fn(&str) -> Result<Option<String>, Error> + Send + Sync + 'static + use<> {
    let dir = dir.to_path_buf();
    move |name| {
        let mut path = dir.clone();
        for segment in name.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Ok(None),
                s => path.push(s),
            }
        }
        read_template(&path)
    }
}

fn read_template(path: &Path) -> Result<Option<String>, Error> {
    match fs::read_to_string(path) {
        Ok(src) => Ok(Some(src)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read template {}", path.display()),
        )
        .with_source(err)),
    }
}

/// Loader names always use `/`, whatever the host separator.
fn template_name(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

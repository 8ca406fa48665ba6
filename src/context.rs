//! Context loading: the JSON file that feeds template variables.

use crate::prompt::Prompter;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

/// Flat variable scope handed to every template.
///
/// Sorted so that prompting for empty keys happens in a stable order.
pub type Context = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open context file {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error decoding context file {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("context file {} must contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("no value for '{key}'")]
    Prompt {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Load the context at `path`, asking `prompter` for every empty value.
///
/// A path that is not an existing regular file yields an empty context.
pub fn load(path: &Path, prompter: &mut dyn Prompter) -> Result<Context, LoadError> {
    if !path.is_file() {
        debug!(path = %path.display(), "no context file, using empty context");
        return Ok(Context::new());
    }

    let src = fs::read(path).map_err(|source| LoadError::Open {
        path: path.to_owned(),
        source,
    })?;

    parse(&src, path, prompter)
}

fn parse(src: &[u8], path: &Path, prompter: &mut dyn Prompter) -> Result<Context, LoadError> {
    let value: Value = serde_json::from_slice(src).map_err(|source| LoadError::Decode {
        path: path.to_owned(),
        source,
    })?;

    let Value::Object(map) = value else {
        return Err(LoadError::NotAnObject {
            path: path.to_owned(),
        });
    };

    // Collect first so prompts run in key order, not file order.
    let sorted: BTreeMap<String, Value> = map.into_iter().collect();

    let mut ctx = Context::new();
    for (key, value) in sorted {
        let text = match scalar(&value) {
            Some(text) => text,
            None => prompter
                .ask(&key)
                .map_err(|source| LoadError::Prompt {
                    key: key.clone(),
                    source,
                })?,
        };
        ctx.insert(key, text);
    }

    debug!(keys = ctx.len(), "context loaded");
    Ok(ctx)
}

/// String form of a non-empty value, `None` for values that need prompting.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Nested data has no template meaning of its own; keep it as JSON text.
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

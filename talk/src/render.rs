//! Message template rendering.
//!
//! Templates use [minijinja](https://docs.rs/minijinja) (Jinja2-compatible)
//! syntax: `Hello {{ name }}`. Rendering is strict — a placeholder that
//! references a key absent from the data fails instead of substituting an
//! empty string.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Map, Value};

/// Failure while rendering a message template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The template itself does not parse.
    #[error("parse message template: {0}")]
    Parse(#[source] minijinja::Error),

    /// The template references a key that is not present in the data.
    #[error("missing key in message data: {0}")]
    MissingKey(#[source] minijinja::Error),

    /// Any other evaluation failure.
    #[error("render message template: {0}")]
    Render(#[source] minijinja::Error),
}

/// Renders a message template with the provided data.
///
/// Each call builds a fresh environment; no state is shared across calls.
/// Either the fully substituted string is returned or an error — never
/// partial output.
pub fn render(template: &str, data: &Map<String, Value>) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    let tmpl = env
        .template_from_str(template)
        .map_err(RenderError::Parse)?;

    tmpl.render(data).map_err(|err| {
        if err.kind() == minijinja::ErrorKind::UndefinedError {
            RenderError::MissingKey(err)
        } else {
            RenderError::Render(err)
        }
    })
}

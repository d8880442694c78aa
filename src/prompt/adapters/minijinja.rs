//! `minijinja`-backed template renderer.

use crate::prompt::ports::{RenderError, RenderResult, TemplateRenderer};
use minijinja::value::Value as TemplateValue;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use serde_json::Value;

/// Template renderer over a `minijinja` environment.
///
/// Undefined behaviour is chainable: missing and null variables render as
/// empty values, nested access on a missing variable never raises, and
/// iterating an absent list yields nothing. A `tojson` filter renders any
/// variable as pretty-printed JSON for structured artifact payloads.
pub struct MiniJinjaRenderer {
    environment: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer with the contract-mandated settings.
    #[must_use]
    pub fn new() -> Self {
        let mut environment = Environment::new();
        environment.set_undefined_behavior(UndefinedBehavior::Chainable);
        environment.add_filter("tojson", tojson);
        Self { environment }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template: &str, context: &Value) -> RenderResult<String> {
        self.environment
            .render_str(template, context)
            .map_err(|error| RenderError(error.to_string()))
    }
}

/// Renders a template value as pretty-printed JSON.
fn tojson(value: TemplateValue) -> Result<String, minijinja::Error> {
    serde_json::to_string_pretty(&value).map_err(|error| {
        minijinja::Error::new(ErrorKind::InvalidOperation, error.to_string())
    })
}

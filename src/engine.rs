//! External template engine boundary.
//!
//! The pipeline treats expression evaluation (`{{ }}` and non-directive
//! `{% %}` tags) as an external capability behind [`TemplateEngine`].
//! The default implementation is backed by minijinja with lenient
//! undefined behavior, so references to missing context keys render as
//! empty text instead of failing the page.
//!
//! `{% layout %}` and `{% include %}` are pipeline-owned directives, not
//! engine tags. Any such marker still present when a string reaches the
//! engine was deliberately left unexpanded by the single-pass include
//! resolver, so the adapter shields it in `{% raw %}` and it passes
//! through to the output verbatim.

use crate::context::RenderContext;
use minijinja::{Environment, UndefinedBehavior};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// A parse or render failure reported by the engine.
///
/// Parse errors carry a real line; render errors may not, in which case
/// the location defaults to 1:1.
#[derive(Debug, Clone)]
pub struct EngineError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Capability interface for the expression evaluator.
pub trait TemplateEngine {
    /// Parse and render `source` against `context`.
    fn render(&self, source: &str, context: &RenderContext) -> Result<String, EngineError>;
}

static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{%\s*(?:include|layout)\s+"[^"]*"\s*%\}"#).unwrap());

/// Wrap pipeline directives in raw blocks so the engine emits them verbatim.
fn shield_directives(source: &str) -> Cow<'_, str> {
    DIRECTIVE_RE.replace_all(source, "{% raw %}${0}{% endraw %}")
}

// ============================================================================
// minijinja adapter
// ============================================================================

/// Default engine backed by minijinja.
pub struct JinjaEngine {
    env: Environment<'static>,
}

impl JinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        Self { env }
    }
}

impl Default for JinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for JinjaEngine {
    fn render(&self, source: &str, context: &RenderContext) -> Result<String, EngineError> {
        let shielded = shield_directives(source);
        self.env
            .render_str(&shielded, minijinja::Value::from_serialize(context))
            .map_err(|err| EngineError {
                // minijinja reports lines only; column floor is 1
                line: err.line().unwrap_or(1) as u32,
                column: 1,
                message: err.to_string(),
            })
    }
}

// ============================================================================
// Tests
// ============================================================================

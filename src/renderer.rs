//! Rendering of configurable strings.
//! Command arguments and deployment settings may reference values such as
//! `{{ port }}` or `{{ name }}`; this module renders them with MiniJinja.
//! Template files themselves are never rendered here.
use crate::error::Result;
use minijinja::Environment;

/// Trait for string rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based rendering engine.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        Self { env: Environment::new() }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        // Plain strings skip the engine entirely.
        if !template.contains("{{") && !template.contains("{%") {
            return Ok(template.to_string());
        }
        Ok(self.env.render_str(template, context)?)
    }
}

/// Renders every argument of a command line.
pub fn render_command(
    engine: &dyn TemplateRenderer,
    command: &[String],
    context: &serde_json::Value,
) -> Result<Vec<String>> {
    command.iter().map(|arg| engine.render(arg, context)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_command() {
        let engine = MiniJinjaRenderer::new();
        let command: Vec<String> =
            ["npx", "vite", "preview", "--port", "{{ port }}"].map(String::from).to_vec();
        let rendered =
            render_command(&engine, &command, &serde_json::json!({ "port": 4173 })).unwrap();
        assert_eq!(rendered, vec!["npx", "vite", "preview", "--port", "4173"]);
    }

    #[test]
    fn test_plain_string_is_untouched() {
        let engine = MiniJinjaRenderer::new();
        let out = engine.render("Hello {name}", &serde_json::json!({})).unwrap();
        assert_eq!(out, "Hello {name}");
    }
}

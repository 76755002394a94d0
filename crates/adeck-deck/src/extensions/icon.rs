//! `icon:name[]` inline macro.

use adeck_asciidoc::InlineMacro;

/// Emits a reference into the SVG icon sprite sheet.
#[derive(Debug, Default)]
pub struct IconMacro;

impl InlineMacro for IconMacro {
    fn name(&self) -> &str {
        "icon"
    }

    fn process(&mut self, target: &str, _attributes: &str) -> Option<String> {
        let valid = !target.is_empty()
            && target
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            tracing::error!(icon = %target, "Invalid icon name");
            return None;
        }
        Some(format!(
            "<svg class=\"icon icon-{target}\"><use href=\"#icon-{target}\"></use></svg>"
        ))
    }
}

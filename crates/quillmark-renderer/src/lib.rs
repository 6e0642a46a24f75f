use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use quillmark_core::escape_html;

const BASE_CSS: &str = include_str!("../assets/quillmark.css");
const STYLESHEET_NAME: &str = "quillmark.css";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Auto => "auto",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parses `auto`, `light` or `dark`, ignoring case and surrounding space.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Theme::Auto),
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Wraps a rendered fragment in the `markdown-body` container.
///
/// `class_name` is appended to the container's class list after trimming;
/// an empty name adds nothing.
pub fn wrap_content(html: &str, class_name: &str) -> String {
    let extra = class_name.trim();
    let class_attr = if extra.is_empty() {
        "markdown-body".to_string()
    } else {
        format!("markdown-body {}", escape_html(extra))
    };
    format!("<div class=\"{}\">\n{}\n</div>", class_attr, html)
}

#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    custom_vars: BTreeMap<String, String>,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            custom_vars: BTreeMap::new(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Overrides a CSS custom property. Keys without the leading `--` get
    /// it added.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let key = if key.starts_with("--") {
            key
        } else {
            format!("--{}", key)
        };
        self.custom_vars.insert(key, value.into());
        self
    }

    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        let (light_vars, dark_vars) = default_theme_vars();

        match self.theme {
            Theme::Auto => {
                out.push_str(&root_block(&light_vars, Some("light dark")));
                out.push_str("@media (prefers-color-scheme: dark) {\n");
                out.push_str(&indent(&root_block(&dark_vars, None)));
                out.push_str("}\n");
            }
            Theme::Light => out.push_str(&root_block(&light_vars, Some("light"))),
            Theme::Dark => out.push_str(&root_block(&dark_vars, Some("dark"))),
        }

        if !self.custom_vars.is_empty() {
            out.push_str(&root_block(&self.custom_vars, None));
        }

        out.push_str(BASE_CSS);
        out
    }

    /// Builds a standalone HTML document around a fragment.
    pub fn embed_html(&self, html: &str, with_inline_css: bool) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"en\">\n");
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"utf-8\" />\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
        if with_inline_css {
            out.push_str("  <style>\n");
            out.push_str(&self.stylesheet());
            out.push_str("\n  </style>\n");
        } else {
            out.push_str(&format!(
                "  <link rel=\"stylesheet\" href=\"{}\" />\n",
                STYLESHEET_NAME
            ));
        }
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out.push_str(html);
        if !html.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }

    /// Writes the stylesheet into `out_dir`, creating it if needed.
    pub fn generate_files(&self, out_dir: &Path) -> io::Result<()> {
        fs::create_dir_all(out_dir)?;
        let path = out_dir.join(STYLESHEET_NAME);
        fs::write(&path, self.stylesheet())?;
        tracing::debug!(path = %path.display(), theme = self.theme.name(), "wrote stylesheet");
        Ok(())
    }
}

fn default_theme_vars() -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let light = vars(&[
        ("--quillmark-bg", "#f5f7fb"),
        ("--quillmark-card", "#ffffff"),
        ("--quillmark-fg", "#141b2d"),
        ("--quillmark-muted", "#5b6475"),
        ("--quillmark-border", "#d5dcea"),
        ("--quillmark-accent", "#0b7285"),
        ("--quillmark-soft", "#dbe5ff"),
        ("--quillmark-code-bg", "#f0f3f9"),
        ("--quillmark-code-fg", "#141b2d"),
        ("--quillmark-token-keyword", "#7c3aed"),
        ("--quillmark-token-string", "#0a7a3e"),
        ("--quillmark-token-comment", "#6b7280"),
        ("--quillmark-token-number", "#b45309"),
        ("--quillmark-token-tag", "#b91c1c"),
        ("--quillmark-token-attr", "#0b7285"),
        ("--quillmark-token-selector", "#1d4ed8"),
        ("--quillmark-token-property", "#0b7285"),
        ("--quillmark-token-value", "#0a7a3e"),
    ]);

    let dark = vars(&[
        ("--quillmark-bg", "#0c111c"),
        ("--quillmark-card", "#141b2d"),
        ("--quillmark-fg", "#e4e9f5"),
        ("--quillmark-muted", "#98a2b6"),
        ("--quillmark-border", "#2a3350"),
        ("--quillmark-accent", "#3bc9db"),
        ("--quillmark-soft", "#1f2a4a"),
        ("--quillmark-code-bg", "#1a2238"),
        ("--quillmark-code-fg", "#e4e9f5"),
        ("--quillmark-token-keyword", "#c4b5fd"),
        ("--quillmark-token-string", "#86efac"),
        ("--quillmark-token-comment", "#8b95a7"),
        ("--quillmark-token-number", "#fcd34d"),
        ("--quillmark-token-tag", "#fca5a5"),
        ("--quillmark-token-attr", "#66d9e8"),
        ("--quillmark-token-selector", "#93c5fd"),
        ("--quillmark-token-property", "#66d9e8"),
        ("--quillmark-token-value", "#86efac"),
    ]);

    (light, dark)
}

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn root_block(vars: &BTreeMap<String, String>, color_scheme: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(":root {\n");
    if let Some(scheme) = color_scheme {
        out.push_str(&format!("  color-scheme: {};\n", scheme));
    }
    for (key, value) in vars {
        out.push_str("  ");
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out.push_str("}\n");
    out
}

fn indent(block: &str) -> String {
    block
        .lines()
        .map(|line| format!("  {}\n", line))
        .collect()
}

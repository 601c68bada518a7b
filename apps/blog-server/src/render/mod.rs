//! HTML rendering with Tera.

use std::collections::HashMap;
use std::path::Path;

use pulldown_cmark::{Event, Options, Parser, html};
use tera::{Context, Tera, Value};

const EMBEDDED_TEMPLATES: [(&str, &str); 7] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("post_list.html", include_str!("../../templates/post_list.html")),
    ("post_detail.html", include_str!("../../templates/post_detail.html")),
    ("comment_form.html", include_str!("../../templates/comment_form.html")),
    ("confirm_delete.html", include_str!("../../templates/confirm_delete.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

/// Template renderer shared by all handlers.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Templates compiled into the binary.
    pub fn embedded() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(EMBEDDED_TEMPLATES)?;
        Self::register_filters(&mut tera);
        Ok(Self { tera })
    }

    /// Templates from `dir`, falling back to the embedded ones for any
    /// template the directory does not provide.
    pub fn from_dir(dir: &Path) -> tera::Result<Self> {
        let mut tera = Tera::new(&format!("{}/**/*.html", dir.display()))?;
        let embedded = Self::embedded()?;
        tera.extend(&embedded.tera)?;
        Self::register_filters(&mut tera);

        tracing::info!(dir = %dir.display(), "Loaded template overrides");
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template, context)
    }

    fn register_filters(tera: &mut Tera) {
        tera.register_filter("markdown", markdown_filter);
    }
}

/// Render Markdown to HTML. Raw HTML in the source is escaped, not passed
/// through.
pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });

    let mut output = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

fn markdown_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value.as_str() {
        Some(text) => Ok(Value::String(markdown_to_html(text))),
        None => Ok(value.clone()),
    }
}

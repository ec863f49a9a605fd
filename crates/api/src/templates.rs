//! HTML page rendering from on-disk templates.
//!
//! Templates are read on every request so operators can edit them without a
//! restart. `form.html` may contain the `{{ network_options }}` placeholder,
//! which is replaced by one `<option>` per supported network.

use std::fmt::Write as _;
use std::path::PathBuf;

use axum::response::Html;

use beacon_common::error::AppError;
use beacon_common::types::NetworkRegistry;

pub const FORM_TEMPLATE: &str = "form.html";
pub const START_TEMPLATE: &str = "start.html";
pub const NETWORK_OPTIONS_PLACEHOLDER: &str = "{{ network_options }}";

pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The intake form with the network selector filled in.
    pub async fn render_form(&self, networks: &NetworkRegistry) -> Result<Html<String>, AppError> {
        let template = self.load(FORM_TEMPLATE).await?;
        let page = template.replace(NETWORK_OPTIONS_PLACEHOLDER, &network_options(networks));
        Ok(Html(page))
    }

    /// The static confirmation page.
    pub async fn render_start(&self) -> Result<Html<String>, AppError> {
        Ok(Html(self.load(START_TEMPLATE).await?))
    }

    async fn load(&self, name: &str) -> Result<String, AppError> {
        let path = self.dir.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::Template(format!("{}: {}", path.display(), e)))
    }
}

fn network_options(networks: &NetworkRegistry) -> String {
    let mut options = String::new();
    for network in networks.iter() {
        let name = escape_html(&network.name);
        let _ = writeln!(
            options,
            r#"<option value="{}" data-rpc="{}">{}</option>"#,
            name,
            escape_html(&network.default_endpoint),
            name
        );
    }
    options
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

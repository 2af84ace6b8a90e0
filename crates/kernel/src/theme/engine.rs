//! Theme engine wrapping Tera.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tera::Tera;
use tracing::debug;

use crate::listing::View;
use crate::models::CurrentUser;

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
}

impl ThemeEngine {
    /// Create a new theme engine loading templates from the given directory.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;

        // Register custom filters
        Self::register_filters(&mut tera);

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self { tera })
    }

    /// Create a theme engine with no templates (for testing).
    pub fn empty() -> Self {
        let mut tera = Tera::default();
        Self::register_filters(&mut tera);
        Self { tera }
    }

    /// Register custom Tera filters.
    fn register_filters(tera: &mut Tera) {
        // RFC 3339 timestamps (how chrono serializes) as "2024-05-01 18:30"
        tera.register_filter(
            "format_date",
            |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let Some(raw) = value.as_str() else {
                    return Ok(tera::Value::String(String::new()));
                };

                let formatted = chrono::DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|_| "Unknown date".to_string());

                Ok(tera::Value::String(formatted))
            },
        );
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Get a mutable reference to Tera (for adding templates at runtime).
    pub fn tera_mut(&mut self) -> &mut Tera {
        &mut self.tera
    }

    /// Template file for a view name.
    pub fn template_name(view: &str) -> String {
        format!("{view}.html")
    }

    /// Render a view model through its template.
    ///
    /// The view's fields become top-level template variables; `current_user`
    /// is added for the page chrome (null when anonymous).
    pub fn render_view<V: View>(&self, view: &V, user: Option<&CurrentUser>) -> Result<String> {
        let mut context =
            tera::Context::from_serialize(view).context("failed to serialize view model")?;
        context.insert("current_user", &user);

        let template = Self::template_name(V::NAME);
        self.tera
            .render(&template, &context)
            .with_context(|| format!("failed to render template {template}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::listing::TopRestaurantsPage;

    #[test]
    fn template_name_appends_extension() {
        assert_eq!(
            ThemeEngine::template_name("top-restaurants"),
            "top-restaurants.html"
        );
    }

    #[test]
    fn render_view_uses_view_name() {
        let mut engine = ThemeEngine::empty();
        engine
            .tera_mut()
            .add_raw_template(
                "top-restaurants.html",
                "{{ restaurants | length }}:{% if current_user %}{{ current_user.name }}{% else %}anon{% endif %}",
            )
            .unwrap();

        let page = TopRestaurantsPage {
            restaurants: vec![],
        };
        assert_eq!(engine.render_view(&page, None).unwrap(), "0:anon");

        let user = CurrentUser::new(1, "user1");
        assert_eq!(engine.render_view(&page, Some(&user)).unwrap(), "0:user1");
    }

    #[test]
    fn render_view_missing_template_errors() {
        let engine = ThemeEngine::empty();
        let page = TopRestaurantsPage {
            restaurants: vec![],
        };
        assert!(engine.render_view(&page, None).is_err());
    }

    #[test]
    fn format_date_filter() {
        let mut engine = ThemeEngine::empty();
        engine
            .tera_mut()
            .add_raw_template("d.html", "{{ at | format_date }}")
            .unwrap();

        let mut ctx = tera::Context::new();
        ctx.insert("at", "2024-05-01T18:30:00Z");
        assert_eq!(engine.tera().render("d.html", &ctx).unwrap(), "2024-05-01 18:30");

        ctx.insert("at", "yesterday");
        assert_eq!(engine.tera().render("d.html", &ctx).unwrap(), "Unknown date");
    }
}

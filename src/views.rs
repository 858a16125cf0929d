//! Template rendering.
//!
//! Templates live in `views/` and are embedded at compile time, so a built binary
//! needs no template directory at runtime.

use axum::response::Html;
use handlebars::{Handlebars, TemplateError};
use serde::Serialize;
use tracing::error;

use crate::shared::AppError;

const PARTIALS: [(&str, &str); 2] = [
    ("header", include_str!("../views/partials/header.hbs")),
    ("footer", include_str!("../views/partials/footer.hbs")),
];

/// Named views the application renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Index,
    SafePage,
    TokenPage,
    Error,
}

impl View {
    pub const ALL: [View; 4] = [View::Index, View::SafePage, View::TokenPage, View::Error];

    pub fn name(&self) -> &'static str {
        match self {
            View::Index => "index",
            View::SafePage => "safepage",
            View::TokenPage => "tokenpage",
            View::Error => "error",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            View::Index => include_str!("../views/index.hbs"),
            View::SafePage => include_str!("../views/safepage.hbs"),
            View::TokenPage => include_str!("../views/tokenpage.hbs"),
            View::Error => include_str!("../views/error.hbs"),
        }
    }
}

/// Handlebars registry holding every view and partial.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();

        for (name, source) in PARTIALS {
            registry.register_partial(name, source)?;
        }
        for view in View::ALL {
            registry.register_template_string(view.name(), view.source())?;
        }

        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, view: View, data: &T) -> Result<Html<String>, AppError> {
        self.registry
            .render(view.name(), data)
            .map(Html)
            .map_err(|e| {
                error!(view = view.name(), error = %e, "Template rendering failed");
                AppError::Template(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_views_register() {
        let views = Views::new().unwrap();
        for view in View::ALL {
            assert!(views.registry.has_template(view.name()), "{}", view.name());
        }
    }

    #[test]
    fn test_index_reflects_login_state() {
        let views = Views::new().unwrap();
        let data = |logged_in: bool| {
            json!({
                "app": { "name": "demo", "version": "1.0.0", "description": "d" },
                "environment": "test",
                "loggedIn": logged_in,
                "loginUrl": "https://idp.example.com/oauth/authorize?client_id=x"
            })
        };

        let anonymous = views.render(View::Index, &data(false)).unwrap().0;
        assert!(anonymous.contains(r#"data-logged-in="false""#));
        // `=` is entity-escaped by handlebars
        assert!(anonymous.contains("https://idp.example.com/oauth/authorize?client_id"));

        let logged_in = views.render(View::Index, &data(true)).unwrap().0;
        assert!(logged_in.contains(r#"data-logged-in="true""#));
    }

    #[test]
    fn test_safepage_has_close_timer() {
        let views = Views::new().unwrap();
        let html = views
            .render(View::SafePage, &json!({ "closeTimeout": 2000 }))
            .unwrap()
            .0;

        assert!(html.contains("window.close()"));
        assert!(html.contains("}, 2000);"));
    }

    #[test]
    fn test_output_is_escaped() {
        let views = Views::new().unwrap();
        let html = views
            .render(
                View::Error,
                &json!({ "status": 404, "message": "Invalid route: /<script>" }),
            )
            .unwrap()
            .0;

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("/<script>"));
    }
}

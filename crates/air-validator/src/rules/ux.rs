//! Rules that check `@ui`, `@nav`, `@auth` and `@persist` against each
//! other — the "does the frontend hang together" half of the rule set.

use std::collections::HashSet;

use air_diagnostics::{create_diagnostic, Category, Diagnostic, DiagnosticOpts, Severity};

use crate::facts::{all_routes, Facts};
use crate::Rule;

const AUTH_LOOKING_PATHS: [&str; 3] = ["/auth/login", "/signup", "/register"];

/// `AIR-E004` — the same `@page:<name>` scope declared more than once.
pub struct NoDuplicatePages;

impl Rule for NoDuplicatePages {
    fn code(&self) -> &'static str {
        "AIR-E004"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let mut seen = HashSet::new();
        let mut diagnostics = Vec::new();
        for name in &facts.page_names {
            if !seen.insert(name.as_str()) {
                diagnostics.push(create_diagnostic(
                    self.code(),
                    Severity::Error,
                    format!("duplicate @page:{name}"),
                    Category::Structural,
                    DiagnosticOpts::default(),
                ));
            }
        }
        diagnostics
    }
}

/// `AIR-E005` — a `@nav` target or fallback names a page that doesn't
/// exist. Route-like refs (leading `/`) and directive-like refs (the
/// whitelisted navigation-action tokens) are exempt — they resolve at
/// runtime, not against declared pages.
pub struct NavTargetsExist;

const NAV_DIRECTIVES: [&str; 6] = ["redirect", "back", "reload", "replace", "push", "pop"];

impl NavTargetsExist {
    fn is_resolvable(name: &str, pages: &HashSet<&str>) -> bool {
        name.starts_with('/') || NAV_DIRECTIVES.contains(&name) || pages.contains(name)
    }
}

impl Rule for NavTargetsExist {
    fn code(&self) -> &'static str {
        "AIR-E005"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let Some(nav) = facts.app.blocks.iter().find_map(|b| match b {
            air_ast::Block::Nav(n) => Some(n),
            _ => None,
        }) else {
            return Vec::new();
        };
        let pages: HashSet<&str> = facts.page_names.iter().map(String::as_str).collect();
        let mut diagnostics = Vec::new();
        for route in &nav.routes {
            if !Self::is_resolvable(&route.target, &pages) {
                diagnostics.push(create_diagnostic(
                    self.code(),
                    Severity::Error,
                    format!("@nav '{}' targets undefined page '{}'", route.name, route.target),
                    Category::Semantic,
                    DiagnosticOpts::default(),
                ));
            }
            if let Some(fallback) = &route.fallback {
                if !Self::is_resolvable(fallback, &pages) {
                    diagnostics.push(create_diagnostic(
                        self.code(),
                        Severity::Error,
                        format!(
                            "@nav '{}' fallback targets undefined page '{fallback}'",
                            route.name
                        ),
                        Category::Semantic,
                        DiagnosticOpts::default(),
                    ));
                }
            }
        }
        diagnostics
    }
}

/// `AIR-W004` — a `@state` field name never shows up textually anywhere
/// in a `@ui` block, suggesting dead state.
pub struct StateFieldsRendered;

impl Rule for StateFieldsRendered {
    fn code(&self) -> &'static str {
        "AIR-W004"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let Some(state) = facts.app.state_block() else {
            return Vec::new();
        };
        if facts.app.ui_blocks().is_empty() {
            return Vec::new();
        }
        state
            .fields
            .iter()
            .filter(|f| !facts.ui_identifiers.iter().any(|ident| ident.contains(&f.name)))
            .map(|f| {
                create_diagnostic(
                    self.code(),
                    Severity::Warning,
                    format!("state field '{}' is never referenced from @ui", f.name),
                    Category::Semantic,
                    DiagnosticOpts::default(),
                )
            })
            .collect()
    }
}

/// `AIR-W005` — a route that looks like an auth endpoint, declared
/// without an `@auth` block anywhere in the app.
pub struct AuthLookingRouteHasAuth;

impl Rule for AuthLookingRouteHasAuth {
    fn code(&self) -> &'static str {
        "AIR-W005"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let has_auth = crate::facts::has_block(facts.app, |b| matches!(b, air_ast::Block::Auth(_)));
        if has_auth {
            return Vec::new();
        }
        all_routes(facts.app)
            .into_iter()
            .filter(|(_, path, _)| AUTH_LOOKING_PATHS.contains(&path.as_str()))
            .map(|(_, path, _)| {
                create_diagnostic(
                    self.code(),
                    Severity::Warning,
                    format!("route '{path}' looks like an auth endpoint but no @auth block is declared"),
                    Category::Semantic,
                    DiagnosticOpts::default(),
                )
            })
            .collect()
    }
}

/// `AIR-W008` — `@auth(required)` declared with no `/login` route.
pub struct AuthRequiredHasLoginRoute;

impl Rule for AuthRequiredHasLoginRoute {
    fn code(&self) -> &'static str {
        "AIR-W008"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let required = facts.app.blocks.iter().any(|b| match b {
            air_ast::Block::Auth(auth) => auth.required,
            _ => false,
        });
        if !required {
            return Vec::new();
        }
        let has_login = all_routes(facts.app)
            .iter()
            .any(|(_, path, _)| path.as_str() == "/login");
        if has_login {
            Vec::new()
        } else {
            vec![create_diagnostic(
                self.code(),
                Severity::Warning,
                "@auth(required) declared without a /login route",
                Category::Semantic,
                DiagnosticOpts::default(),
            )]
        }
    }
}

/// `AIR-L001` — a frontend with `@state` but no `@persist`.
pub struct StateWithoutPersist;

impl Rule for StateWithoutPersist {
    fn code(&self) -> &'static str {
        "AIR-L001"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let has_persist = crate::facts::has_block(facts.app, |b| matches!(b, air_ast::Block::Persist(_)));
        if facts.app.state_block().is_some() && !has_persist {
            vec![create_diagnostic(
                self.code(),
                Severity::Info,
                "@state present but no @persist block",
                Category::Style,
                DiagnosticOpts::default(),
            )]
        } else {
            Vec::new()
        }
    }
}

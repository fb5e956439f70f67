//! Derived data computed once per [`App`] and shared across rules, so no
//! rule re-walks the whole tree just to ask "does a model named X exist".

use std::collections::HashSet;

use air_ast::{App, Block, RouteMethod, UINode};

pub struct Facts<'a> {
    pub app: &'a App,
    /// Every model name declared in `@db`.
    pub db_models: HashSet<&'a str>,
    /// Every identifier or text literal that appears anywhere in a
    /// `@ui` block — used to approximate "is this state field rendered".
    pub ui_identifiers: HashSet<String>,
    /// Every `@page:<name>` scope name declared under `@ui`, in
    /// declaration order (duplicates are kept, not deduped).
    pub page_names: Vec<String>,
}

impl<'a> Facts<'a> {
    #[must_use]
    pub fn collect(app: &'a App) -> Self {
        let db_models = app
            .db_block()
            .map(|db| db.models.iter().map(|m| m.name.as_str()).collect())
            .unwrap_or_default();

        let mut ui_identifiers = HashSet::new();
        let mut page_names = Vec::new();
        for ui in app.ui_blocks() {
            for node in &ui.children {
                node.walk(&mut |n| collect_ui_node(n, &mut ui_identifiers, &mut page_names));
            }
        }

        Self {
            app,
            db_models,
            ui_identifiers,
            page_names,
        }
    }

    #[must_use]
    pub fn handler_model(handler: &str) -> Option<&str> {
        let rest = handler.strip_prefix("~db.")?;
        rest.split('.').next()
    }
}

fn collect_ui_node(node: &UINode, idents: &mut HashSet<String>, pages: &mut Vec<String>) {
    match node {
        UINode::Text(s) => {
            idents.insert(s.clone());
        }
        UINode::Element { name, .. } => {
            idents.insert(name.clone());
        }
        UINode::Scoped { scope, name, .. } => {
            idents.insert(name.clone());
            if matches!(scope, air_ast::ScopeKind::Page) {
                pages.push(name.clone());
            }
        }
        UINode::Unary { operand, .. } => {
            if let UINode::Text(s) = operand.as_ref() {
                idents.insert(s.clone());
            }
        }
        UINode::Binary { .. } | UINode::Value(_) => {}
    }
}

/// Every route declared anywhere in `@api`, expanded to its concrete
/// method/path pairs (a `CRUD:` route stands for five).
/// Mirrors `air_transpile::context::expand_routes`'s five-entry,
/// path-differentiated CRUD expansion (`GET base` / `GET base/:id` /
/// `POST base` / `PUT base/:id` / `DELETE base/:id`) so route-shape
/// rules (`AIR-W005`/`AIR-W008`) see the same route set the generated
/// server actually exposes. Duplicated rather than shared because
/// `air-validator` sits below `air-transpile` in the dependency graph
/// (transpile assumes its input already validated; validator must not
/// depend back on it).
pub fn all_routes(app: &App) -> Vec<(&'static str, String, &str)> {
    let Some(api) = app.api_block() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for route in &api.routes {
        match &route.method {
            RouteMethod::Http(m) => out.push((m.as_str(), route.path.clone(), route.handler.as_str())),
            RouteMethod::Crud => {
                let base = route.path.trim_end_matches('/');
                let by_id = format!("{base}/:id");
                for (method, path) in [
                    ("GET", base.to_string()),
                    ("GET", by_id.clone()),
                    ("POST", base.to_string()),
                    ("PUT", by_id.clone()),
                    ("DELETE", by_id),
                ] {
                    out.push((method, path, route.handler.as_str()));
                }
            }
        }
    }
    out
}

pub fn has_block(app: &App, predicate: impl Fn(&Block) -> bool) -> bool {
    app.blocks.iter().any(predicate)
}

//! The single pass over the AST (`spec.md` §4.5) that materializes
//! everything the generators need — CRUD expansion, relation
//! resolution, page extraction — so no generator re-walks the tree.

use air_ast::{App, HttpMethod, OnDeleteAction, RouteMethod, Type, UINode};

/// One concrete route after `CRUD:` expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedRoute {
    pub method: HttpMethod,
    /// `:id`-suffixed for the single-resource CRUD routes.
    pub path: String,
    pub handler: String,
}

impl ExpandedRoute {
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.handler.strip_prefix("~db.")?.split('.').next()
    }

    #[must_use]
    pub fn op(&self) -> Option<&str> {
        self.handler.strip_prefix("~db.")?.splitn(2, '.').nth(1)
    }
}

/// A `@db` relation resolved to a concrete foreign-key side. Relations
/// whose FK side can't be determined by the `<field>_id` naming
/// convention on either side are reported as `ambiguous` instead of
/// silently guessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelation {
    pub fk_model: String,
    pub fk_field: String,
    pub target_model: String,
    pub optional: bool,
    pub on_delete: OnDeleteAction,
}

#[derive(Debug, Clone)]
pub struct AmbiguousRelation {
    pub from: String,
    pub to: String,
}

/// A `@page:name` scope extracted from `@ui`, with its own child tree.
#[derive(Debug, Clone)]
pub struct PageInfo<'a> {
    pub name: String,
    pub children: &'a [UINode],
}

pub struct TranspileContext<'a> {
    pub app: &'a App,
    pub has_backend: bool,
    pub routes: Vec<ExpandedRoute>,
    pub relations: Vec<ResolvedRelation>,
    pub ambiguous_relations: Vec<AmbiguousRelation>,
    pub pages: Vec<PageInfo<'a>>,
}

impl<'a> TranspileContext<'a> {
    #[must_use]
    pub fn build(app: &'a App) -> Self {
        let (relations, ambiguous_relations) = resolve_owned_relations(app);
        Self {
            app,
            has_backend: app.has_backend(),
            routes: expand_routes(app),
            relations,
            ambiguous_relations,
            pages: extract_pages(app),
        }
    }
}

fn expand_routes(app: &App) -> Vec<ExpandedRoute> {
    let Some(api) = app.api_block() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for route in &api.routes {
        match &route.method {
            RouteMethod::Http(method) => out.push(ExpandedRoute {
                method: *method,
                path: route.path.clone(),
                handler: route.handler.clone(),
            }),
            RouteMethod::Crud => {
                let base = route.path.trim_end_matches('/');
                let by_id = format!("{base}/:id");
                let model = route.handler.clone();
                for (method, path, op) in [
                    (HttpMethod::Get, base.to_string(), "findMany"),
                    (HttpMethod::Get, by_id.clone(), "findUnique"),
                    (HttpMethod::Post, base.to_string(), "create"),
                    (HttpMethod::Put, by_id.clone(), "update"),
                    (HttpMethod::Delete, by_id.clone(), "delete"),
                ] {
                    out.push(ExpandedRoute {
                        method,
                        path,
                        handler: format!("{model}.{op}"),
                    });
                }
            }
        }
    }
    out
}

fn resolve_owned_relations(app: &App) -> (Vec<ResolvedRelation>, Vec<AmbiguousRelation>) {
    let Some(db) = app.db_block() else {
        return (Vec::new(), Vec::new());
    };
    let mut resolved = Vec::new();
    let mut ambiguous = Vec::new();

    for relation in &db.relations {
        let Some((from_model, from_field)) = relation.from.split_once('.') else {
            continue;
        };
        let Some((to_model, to_field)) = relation.to.split_once('.') else {
            continue;
        };

        let from_is_fk = from_field.ends_with("_id");
        let to_is_fk = to_field.ends_with("_id");

        let (fk_model, fk_field, target_model) = if from_is_fk && !to_is_fk {
            (from_model, from_field, to_model)
        } else if to_is_fk && !from_is_fk {
            (to_model, to_field, from_model)
        } else {
            ambiguous.push(AmbiguousRelation {
                from: relation.from.clone(),
                to: relation.to.clone(),
            });
            continue;
        };

        let optional = db
            .models
            .iter()
            .find(|m| m.name == fk_model)
            .and_then(|m| m.fields.iter().find(|f| f.name == fk_field))
            .is_some_and(|f| matches!(f.ty, Type::Optional(_)) && !f.required);

        let on_delete = relation.on_delete.unwrap_or(if optional {
            OnDeleteAction::SetNull
        } else {
            OnDeleteAction::Cascade
        });

        resolved.push(ResolvedRelation {
            fk_model: fk_model.to_string(),
            fk_field: fk_field.to_string(),
            target_model: target_model.to_string(),
            optional,
            on_delete,
        });
    }

    (resolved, ambiguous)
}

/// Pages can appear nested inside `Binary`/`Unary` UI nodes, not just as
/// direct top-level children, so this walks the whole tree the same way
/// `Facts::collect`'s page discovery does rather than scanning only
/// `ui.children` directly.
fn extract_pages(app: &App) -> Vec<PageInfo<'_>> {
    let mut pages = Vec::new();
    for ui in app.ui_blocks() {
        for node in &ui.children {
            node.walk(&mut |n| {
                if let UINode::Scoped {
                    scope: air_ast::ScopeKind::Page,
                    name,
                    children,
                } = n
                {
                    pages.push(PageInfo {
                        name: name.clone(),
                        children,
                    });
                }
            });
        }
    }
    pages
}

//! Rules that cross-check `@db` against `@api` and against itself.

use std::collections::HashMap;

use air_ast::Type;
use air_diagnostics::{create_diagnostic, Category, Diagnostic, DiagnosticOpts, Severity};

use crate::facts::Facts;
use crate::Rule;

/// `AIR-E003` — a plain (non-`CRUD`) route handler references
/// `~db.<Model>` where `Model` isn't declared in `@db`.
pub struct ApiModelExists;

impl Rule for ApiModelExists {
    fn code(&self) -> &'static str {
        "AIR-E003"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let Some(api) = facts.app.api_block() else {
            return Vec::new();
        };
        api.routes
            .iter()
            .filter(|r| !matches!(r.method, air_ast::RouteMethod::Crud))
            .filter_map(|r| Facts::handler_model(&r.handler))
            .filter(|model| !facts.db_models.contains(model))
            .map(|model| {
                create_diagnostic(
                    self.code(),
                    Severity::Error,
                    format!("@api handler references undefined model '{model}'"),
                    Category::Semantic,
                    DiagnosticOpts::default(),
                )
            })
            .collect()
    }
}

/// `AIR-E007` — a `CRUD:` route references a model not in `@db`.
pub struct CrudModelExists;

impl Rule for CrudModelExists {
    fn code(&self) -> &'static str {
        "AIR-E007"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let Some(api) = facts.app.api_block() else {
            return Vec::new();
        };
        api.routes
            .iter()
            .filter(|r| matches!(r.method, air_ast::RouteMethod::Crud))
            .filter_map(|r| Facts::handler_model(&r.handler))
            .filter(|model| !facts.db_models.contains(model))
            .map(|model| {
                create_diagnostic(
                    self.code(),
                    Severity::Error,
                    format!("CRUD: route references undefined model '{model}'"),
                    Category::Semantic,
                    DiagnosticOpts::default(),
                )
            })
            .collect()
    }
}

/// `AIR-W002` — `@db` present with no `@api` to expose it.
pub struct DbWithoutApi;

impl Rule for DbWithoutApi {
    fn code(&self) -> &'static str {
        "AIR-W002"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        if facts.app.db_block().is_some() && facts.app.api_block().is_none() {
            vec![create_diagnostic(
                self.code(),
                Severity::Warning,
                "@db present but no @api",
                Category::Structural,
                DiagnosticOpts::default(),
            )]
        } else {
            Vec::new()
        }
    }
}

/// `AIR-W003` — two ref-typed fields on the same model point at the same
/// target model, making the relation direction ambiguous at codegen time.
pub struct AmbiguousRelation;

impl Rule for AmbiguousRelation {
    fn code(&self) -> &'static str {
        "AIR-W003"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let Some(db) = facts.app.db_block() else {
            return Vec::new();
        };
        let mut diagnostics = Vec::new();
        for model in &db.models {
            let mut targets: HashMap<&str, u32> = HashMap::new();
            for field in &model.fields {
                if let Type::Ref(target) = &field.ty {
                    *targets.entry(target.as_str()).or_insert(0) += 1;
                }
            }
            for (target, count) in targets {
                if count > 1 {
                    diagnostics.push(create_diagnostic(
                        self.code(),
                        Severity::Warning,
                        format!(
                            "model '{}' has {count} fields referencing '{target}' — ambiguous relation",
                            model.name
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

/// `AIR-W007` — a `@db` model has no field marked `:primary`.
pub struct ModelHasPrimaryKey;

impl Rule for ModelHasPrimaryKey {
    fn code(&self) -> &'static str {
        "AIR-W007"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let Some(db) = facts.app.db_block() else {
            return Vec::new();
        };
        db.models
            .iter()
            .filter(|m| !m.fields.iter().any(|f| f.primary))
            .map(|m| {
                create_diagnostic(
                    self.code(),
                    Severity::Warning,
                    format!("model '{}' has no field marked primary", m.name),
                    Category::Semantic,
                    DiagnosticOpts::default(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_ast::{ApiBlock, App, Block, DbBlock, HttpMethod, Model, Route, RouteMethod};

    fn app_with(db: Option<DbBlock>, api: Option<ApiBlock>) -> App {
        let mut blocks = Vec::new();
        if let Some(db) = db {
            blocks.push(Block::Db(db));
        }
        if let Some(api) = api {
            blocks.push(Block::Api(api));
        }
        App {
            name: "x".into(),
            blocks,
        }
    }

    #[test]
    fn flags_undefined_model_in_plain_route() {
        let api = ApiBlock {
            routes: vec![Route {
                method: RouteMethod::Http(HttpMethod::Get),
                path: "/tasks".into(),
                params: vec![],
                handler: "~db.Task.findMany".into(),
            }],
        };
        let app = app_with(Some(DbBlock::default()), Some(api));
        let facts = Facts::collect(&app);
        assert_eq!(ApiModelExists.check(&facts).len(), 1);
    }

    #[test]
    fn db_without_api_warns() {
        let app = app_with(Some(DbBlock::default()), None);
        let facts = Facts::collect(&app);
        assert_eq!(DbWithoutApi.check(&facts).len(), 1);
    }

    #[test]
    fn model_without_primary_warns() {
        let db = DbBlock {
            models: vec![Model {
                name: "Task".into(),
                fields: vec![],
            }],
            ..Default::default()
        };
        let app = app_with(Some(db), None);
        let facts = Facts::collect(&app);
        assert_eq!(ModelHasPrimaryKey.check(&facts).len(), 1);
    }
}

//! Turns a validated AIR AST into a deterministic set of output files
//! (`spec.md` §4.6). This crate never re-validates — it is a pure
//! function of the tree the parser produced, deliberately independent
//! of `air-validator`'s rule registry.

mod client;
mod context;
mod manifest;
mod pages;
mod schema;
mod server;
mod ui;

pub use context::{AmbiguousRelation, ExpandedRoute, PageInfo, ResolvedRelation, TranspileContext};
pub use manifest::MANIFEST_PATH;

use air_ast::App;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OutputFile {
    pub path: String,
    pub content: String,
}

pub struct TranspileResult {
    pub files: Vec<OutputFile>,
    pub has_backend: bool,
}

#[must_use]
pub fn transpile(app: &App, source_hash: &str) -> TranspileResult {
    let ctx = TranspileContext::build(app);

    let mut files = Vec::new();
    files.extend(client::generate(&ctx));
    files.extend(pages::generate(&ctx));
    files.extend(server::generate(&ctx));
    files.extend(schema::generate(&ctx));
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let manifest_file = manifest::generate(&files, source_hash);
    files.push(manifest_file);

    TranspileResult {
        files,
        has_backend: ctx.has_backend,
    }
}

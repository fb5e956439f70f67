//! §8.9: structural invariants enforced as post-generation checks over
//! generated file contents (INV-001..INV-006).

use air_diagnostics::hash_source;
use air_transpile::{OutputFile, TranspileResult};

const FULLSTACK_WITH_AUTH: &str = r#"
@app:blog
@state{posts:[{id:int,title:str,slug:str}]}
@db{
  Post{id:int:primary:auto,title:str:required,slug:str:required}
}
@api(
  CRUD:/posts>~db.Post,
  GET:/posts/:slug>~db.Post.findFirst,
  GET:/public/posts>~db.Post.findMany
)
@auth(required)
@ui(
  @page:home(h1>"Blog"),
  @page:login(h1>"Login")
)
"#;

fn transpile(source: &str) -> TranspileResult {
    let ast = air_parser::parse(source).expect("fixture must parse");
    air_transpile::transpile(&ast.app, &hash_source(source))
}

fn find<'a>(files: &'a [OutputFile], suffix: &str) -> &'a OutputFile {
    files.iter().find(|f| f.path.ends_with(suffix)).unwrap_or_else(|| panic!("no generated file ending with {suffix}"))
}

#[test]
fn inv_001_list_fetch_unwraps_paginated_response() {
    let result = transpile(FULLSTACK_WITH_AUTH);
    let api = find(&result.files, "lib/api.js");
    assert!(api.content.contains("data ?? response"));
    let hooks = find(&result.files, "hooks/resources.js");
    assert!(hooks.content.contains("fetchModel("));
}

#[test]
fn inv_002_auth_pages_are_never_wrapped_by_a_dashboard_layout() {
    let result = transpile(FULLSTACK_WITH_AUTH);
    let login_page = find(&result.files, "Login.js");
    assert!(!login_page.content.contains("DashboardLayout"));
    let stylesheet = find(&result.files, "main.css");
    assert!(stylesheet.content.contains(".auth-page"));
}

#[test]
fn inv_003_no_unscoped_submit_button_full_width_rule() {
    let result = transpile(FULLSTACK_WITH_AUTH);
    let stylesheet = find(&result.files, "main.css");
    assert!(!stylesheet.content.contains("button[type=submit] { width: 100% }"));
}

#[test]
fn inv_004_public_routes_bypass_the_auth_guard() {
    let result = transpile(FULLSTACK_WITH_AUTH);
    let router = find(&result.files, "router.ts");
    let public_line = router
        .content
        .lines()
        .find(|l| l.contains("/public/posts"))
        .expect("public route must be present");
    assert!(!public_line.contains("requireAuth"));
    let guarded_line = router
        .content
        .lines()
        .find(|l| l.trim_start().starts_with("router.get('/posts',"))
        .expect("guarded findMany route must be present");
    assert!(guarded_line.contains("requireAuth"));
}

#[test]
fn inv_005_public_api_client_requests_omit_the_authorization_header() {
    let result = transpile(FULLSTACK_WITH_AUTH);
    let api = find(&result.files, "lib/api.js");
    assert!(api.content.contains("path.startsWith('/public/')"));
    assert!(api.content.contains("headers.Authorization"));
}

#[test]
fn inv_006_slug_routes_use_a_slug_predicate() {
    let result = transpile(FULLSTACK_WITH_AUTH);
    let router = find(&result.files, "router.ts");
    assert!(router.content.contains("req.params.slug"));
    assert!(router.content.contains("prisma.post.findFirst({ where: { slug } })"));
    assert!(!router.content.contains("prisma.post.findFirst({ where: { id } })"));
}

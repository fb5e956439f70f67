//! §8: the six end-to-end scenarios the rest of the test plan exercises
//! in isolation, driven here as whole pipeline runs through `compile`
//! and `run_loop`.

use air_config::{CompileOptions, LoopOptions, RepairMode};
use air_diagnostics::{hash_source, Severity};

fn diagnose(source: &str) -> air_diagnostics::DiagnosticResult {
    let diagnostics = match air_parser::parse(source) {
        Ok(ast) => air_validator::validate(&ast.app),
        Err(err) => vec![air_parser::wrap_parse_error(&err)],
    };
    air_diagnostics::build_result(diagnostics, hash_source(source))
}

fn has_code(result: &air_diagnostics::DiagnosticResult, code: &str) -> bool {
    result.diagnostics.iter().any(|d| d.code == code)
}

#[test]
fn trivial_valid_source_emits_client_only_output_with_lint_warnings() {
    let source = "@app:todo\n@state{items:[{id:int,text:str,done:bool}]}\n@ui(h1>\"Todo\")";
    let result = diagnose(source);
    assert!(result.valid);
    assert!(has_code(&result, "AIR-L001"));
    assert!(has_code(&result, "AIR-L002"));
    assert!(result.diagnostics.iter().all(|d| d.severity != Severity::Error));

    let dir = tempfile::tempdir().unwrap();
    let outcome = airengine::compile(source, dir.path(), &CompileOptions::default()).unwrap();
    assert!(outcome.diagnostics.valid);
    assert!(dir.path().join("client/src/main.js").exists());
    assert!(!dir.path().join("server").exists());
}

#[test]
fn missing_ui_block_is_an_error_and_deterministic_repair_clears_it() {
    let source = "@app:x\n@state{x:int}";
    let result = diagnose(source);
    assert!(!result.valid);
    assert!(has_code(&result, "AIR-E002"));

    let dir = tempfile::tempdir().unwrap();
    let opts = LoopOptions {
        repair_mode: RepairMode::Deterministic,
        write_artifacts: false,
        ..LoopOptions::default()
    };
    let loop_result = airengine::run_loop("missing_ui.air", source, dir.path(), &opts, None).unwrap();
    assert!(loop_result.diagnostics.valid);
    assert!(!has_code(&loop_result.diagnostics, "AIR-E002"));
}

#[test]
fn missing_app_block_is_a_parse_error_and_deterministic_repair_clears_it() {
    let source = "@state{x:int}\n@ui(h1>\"hi\")";
    let err = air_parser::parse(source).unwrap_err();
    let diagnostic = air_parser::wrap_parse_error(&err);
    assert_eq!(diagnostic.severity, Severity::Error);
    assert!(diagnostic.code.starts_with("AIR-P"));

    let result = diagnose(source);
    assert!(!result.valid);
    assert_eq!(result.diagnostics.len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let opts = LoopOptions {
        repair_mode: RepairMode::Deterministic,
        write_artifacts: false,
        ..LoopOptions::default()
    };
    let loop_result = airengine::run_loop("missing_app.air", source, dir.path(), &opts, None).unwrap();
    assert!(loop_result.diagnostics.valid);
}

#[test]
fn api_route_referencing_an_undefined_model_is_rejected_before_transpile() {
    let source = r#"
@app:x
@db{
  Item{id:int:primary:auto,name:str:required}
}
@api(GET:/tasks>~db.Task.findMany)
@ui(h1>"hi")
"#;
    let result = diagnose(source);
    assert!(!result.valid);
    let e003 = result.diagnostics.iter().find(|d| d.code == "AIR-E003").expect("undefined model must be flagged");
    assert!(e003.message.contains("Task"));

    let dir = tempfile::tempdir().unwrap();
    let outcome = airengine::compile(source, dir.path(), &CompileOptions::default()).unwrap();
    assert_eq!(outcome.files_written, 0);
}

#[test]
fn fullstack_round_trip_emits_client_and_server_with_stable_hashes() {
    let source = r#"
@app:todo
@state{items:[{id:int,text:str,done:bool}]}
@db{
  Todo{id:int:primary:auto,text:str:required,done:bool:default(false)}
}
@api(CRUD:/todos>~db.Todo)
@ui(h1>"Todo")
"#;
    let result = diagnose(source);
    assert!(result.valid);

    let ast = air_parser::parse(source).unwrap();
    let transpiled = air_transpile::transpile(&ast.app, &result.source_hash);
    assert!(transpiled.has_backend);

    let schema = transpiled
        .files
        .iter()
        .find(|f| f.path.ends_with("schema.prisma"))
        .expect("schema must be emitted");
    assert_eq!(schema.content.matches("model Todo").count(), 1);
    assert!(schema.content.contains("@id"));
    assert!(schema.content.contains("@default(false)"));

    let router = transpiled.files.iter().find(|f| f.path.ends_with("router.ts")).unwrap();
    let route_count = router.content.matches("router.get(").count()
        + router.content.matches("router.post(").count()
        + router.content.matches("router.put(").count()
        + router.content.matches("router.delete(").count();
    assert_eq!(route_count, 5);

    let dir = tempfile::tempdir().unwrap();
    let outcome = airengine::compile(source, dir.path(), &CompileOptions::default()).unwrap();
    assert!(outcome.diagnostics.valid);
    assert!(dir.path().join("client/src/main.js").exists());
    assert!(dir.path().join("server/prisma/schema.prisma").exists());

    let second = air_transpile::transpile(&ast.app, &result.source_hash);
    let hashes_a: Vec<_> = transpiled.files.iter().map(|f| (f.path.clone(), air_diagnostics::hash16(&f.content))).collect();
    let hashes_b: Vec<_> = second.files.iter().map(|f| (f.path.clone(), air_diagnostics::hash16(&f.content))).collect();
    assert_eq!(hashes_a, hashes_b);
}

#[test]
fn second_incremental_run_on_identical_source_only_touches_the_manifest() {
    let source = r#"
@app:todo
@state{items:[{id:int,text:str,done:bool}]}
@db{
  Todo{id:int:primary:auto,text:str:required,done:bool:default(false)}
}
@api(CRUD:/todos>~db.Todo)
@ui(h1>"Todo")
"#;
    let dir = tempfile::tempdir().unwrap();
    let opts = LoopOptions {
        write_artifacts: false,
        ..LoopOptions::default()
    };

    let first = airengine::run_loop("todo.air", source, dir.path(), &opts, None).unwrap();
    assert!(first.diagnostics.valid);
    let total_files = first.transpile_result.as_ref().unwrap().files.len();

    let second = airengine::run_loop("todo.air", source, dir.path(), &opts, None).unwrap();
    assert!(second.diagnostics.valid);

    let manifest = air_cache::load(dir.path()).expect("manifest must exist after two runs");
    assert_eq!(manifest.files.len(), total_files);
}

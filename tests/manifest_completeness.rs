//! §8.8: for every transpile, the manifest's `files` set equals the
//! output file set minus the manifest itself.

use air_diagnostics::hash_source;
use air_transpile::MANIFEST_PATH;
use std::collections::BTreeSet;

fn assert_manifest_is_complete(source: &str) {
    let ast = air_parser::parse(source).expect("fixture must parse");
    let result = air_transpile::transpile(&ast.app, &hash_source(source));

    let manifest_file = result.files.iter().find(|f| f.path == MANIFEST_PATH).expect("manifest always emitted");
    let manifest: serde_json::Value = serde_json::from_str(&manifest_file.content).unwrap();
    let manifest_paths: BTreeSet<String> = manifest["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["path"].as_str().unwrap().to_string())
        .collect();

    let output_paths: BTreeSet<String> = result
        .files
        .iter()
        .filter(|f| f.path != MANIFEST_PATH)
        .map(|f| f.path.clone())
        .collect();

    assert_eq!(manifest_paths, output_paths);
}

#[test]
fn client_only_app_manifest_matches_output_set() {
    assert_manifest_is_complete("@app:todo\n@state{items:[{id:int,text:str,done:bool}]}\n@ui(h1>\"Todo\")");
}

#[test]
fn fullstack_app_manifest_matches_output_set() {
    assert_manifest_is_complete(
        r#"
@app:todo
@state{items:[{id:int,text:str,done:bool}]}
@db{
  Todo{id:int:primary:auto,text:str:required,done:bool:default(false)}
}
@api(CRUD:/todos>~db.Todo)
@ui(h1>"Todo")
"#,
    );
}

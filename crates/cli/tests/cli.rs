//! `ngapi generate` / `ngapi check` against files in a temporary directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use ngapi_cli::run_cli;
use tempfile::TempDir;

const PETS_JSON: &str = r##"{
  "openapi": "3.0.1",
  "info": { "title": "Pets" },
  "paths": {
    "/pets/{id}": {
      "get": {
        "operationId": "Pets_Get",
        "parameters": [{ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }],
        "responses": {
          "200": { "description": "OK", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } }
        }
      }
    }
  },
  "components": { "schemas": {
    "Pet": { "type": "object", "required": ["name"], "properties": { "name": { "type": "string" } } }
  } }
}"##;

fn args(list: &[&str]) -> Vec<String> {
    std::iter::once("ngapi")
        .chain(list.iter().copied())
        .map(str::to_string)
        .collect()
}

fn command(name: &str, rest: &[&str]) -> Vec<String> {
    let mut list = vec![name];
    list.extend_from_slice(rest);
    args(&list)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("openapi.json"), PETS_JSON).unwrap();
    dir
}

#[test]
fn test_generate_writes_output() {
    let dir = setup();
    let input = dir.path().join("openapi.json");
    let output = dir.path().join("src/app/api.ts");

    let code = run_cli(args(&["generate", "--input", path_arg(&input), "--output", path_arg(&output)]));
    assert_eq!(code, 0);

    let source = fs::read_to_string(&output).unwrap();
    assert!(source.contains("export class PetsClient {"));
    assert!(source.contains("get(id: number): Observable<Pet> {"));
    assert!(source.contains("export class Pet implements IPet {"));
}

#[test]
fn test_check_detects_stale_output() {
    let dir = setup();
    let input = dir.path().join("openapi.json");
    let output = dir.path().join("api.ts");
    let common = ["--input", path_arg(&input), "--output", path_arg(&output)];

    // Nothing generated yet
    assert_eq!(run_cli(command("check", &common)), 1);

    assert_eq!(run_cli(command("generate", &common)), 0);
    assert_eq!(run_cli(command("check", &common)), 0);

    let stale = fs::read_to_string(&output).unwrap().replace("PetsClient", "OldClient");
    fs::write(&output, stale).unwrap();
    assert_eq!(run_cli(command("check", &common)), 1);
}

#[test]
fn test_check_requires_output() {
    let dir = setup();
    let input = dir.path().join("openapi.json");
    assert_eq!(run_cli(args(&["check", "--input", path_arg(&input)])), 1);
}

#[test]
fn test_config_file_and_flag_overrides() {
    let dir = setup();
    let config = dir.path().join("ngapi.toml");
    fs::write(
        &config,
        "input = \"openapi.json\"\noutput = \"out/api.ts\"\n\n[generator]\nexport_types = false\nrxjs_version = 6.0\n",
    )
    .unwrap();
    let output = dir.path().join("out/api.ts");

    assert_eq!(run_cli(args(&["generate", "--config", path_arg(&config)])), 0);
    let source = fs::read_to_string(&output).unwrap();
    assert!(!source.contains("export "));
    assert!(source.contains("return _observableThrow(new Error("));

    assert_eq!(
        run_cli(args(&[
            "generate",
            "--config",
            path_arg(&config),
            "--rxjs-version",
            "7",
            "--client-interfaces",
        ])),
        0
    );
    let source = fs::read_to_string(&output).unwrap();
    assert!(source.contains("return _observableThrow(() => new Error("));
    assert!(source.contains("class PetsClient implements IPetsClient {"));
}

#[test]
fn test_invalid_input_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.json");
    fs::write(&input, "{ \"openapi\": ").unwrap();
    let output = dir.path().join("api.ts");
    assert_eq!(
        run_cli(args(&["generate", "--input", path_arg(&input), "--output", path_arg(&output)])),
        1
    );
    assert!(!output.exists());

    let missing = dir.path().join("missing.json");
    assert_eq!(run_cli(args(&["generate", "--input", path_arg(&missing)])), 1);
}

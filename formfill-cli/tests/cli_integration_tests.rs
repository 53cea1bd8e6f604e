//! Integration tests for the formfill CLI
//!
//! Runs the built binary against generated form documents and checks both
//! the console output and the written PDFs.

use anyhow::Result;
use formfill_core::fixtures::FormPdfBuilder;
use formfill_core::{forms, ActorRegistry, Module, Organization};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

/// Test helper to get the CLI binary path
fn get_cli_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    if path.ends_with("deps") {
        path.pop(); // Remove "deps" directory
    }
    path.push("formfill");
    #[cfg(windows)]
    path.set_extension("exe");
    path
}

fn setup_temp_dir() -> TempDir {
    tempdir().expect("Failed to create temp directory")
}

/// Run the CLI with a clean environment so local configuration can't leak in
fn run_cli_command(args: &[&str]) -> Result<std::process::Output> {
    let output = Command::new(get_cli_path())
        .args(args)
        .env_remove("FORMFILL_CONFIG")
        .env_remove("FORMFILL_HOST")
        .env_remove("FORMFILL_PORT")
        .env_remove("RUST_LOG")
        .output()?;
    Ok(output)
}

fn write_form(dir: &Path, name: &str, pdf: Vec<u8>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, pdf).expect("Failed to write fixture");
    path
}

fn field_values(path: &Path) -> Vec<(String, Option<String>)> {
    let content = fs::read(path).expect("Failed to read output PDF");
    assert!(
        content.starts_with(b"%PDF-"),
        "File should start with PDF header"
    );
    forms::list_fields(&content)
        .expect("Output should be a readable form")
        .into_iter()
        .map(|f| (f.name, f.value))
        .collect()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_cli_fields_lists_names() {
    let temp_dir = setup_temp_dir();
    let input = write_form(
        temp_dir.path(),
        "form.pdf",
        FormPdfBuilder::new()
            .text_field("NOMBRE_EMPRESA")
            .text_field("Text10")
            .build(),
    );

    let output = run_cli_command(&["fields", path_str(&input)]).unwrap();
    assert!(output.status.success(), "Command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Form fields in"));
    assert!(stdout.contains("NOMBRE_EMPRESA"));
    assert!(stdout.contains("Text10"));
}

#[test]
fn test_cli_fields_json_output() {
    let temp_dir = setup_temp_dir();
    let input = write_form(
        temp_dir.path(),
        "form.pdf",
        FormPdfBuilder::new()
            .text_field_with_value("A", "uno")
            .checkbox("Acepto")
            .build(),
    );

    let output = run_cli_command(&["fields", path_str(&input), "--json"]).unwrap();
    assert!(output.status.success(), "Command should succeed");

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let fields = json.as_array().expect("JSON array of fields");
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["name"], "A");
    assert_eq!(fields[0]["kind"], "text");
    assert_eq!(fields[0]["value"], "uno");
    assert_eq!(fields[1]["name"], "Acepto");
    assert_eq!(fields[1]["kind"], "button");
}

#[test]
fn test_cli_fields_without_form() {
    let temp_dir = setup_temp_dir();
    let input = write_form(
        temp_dir.path(),
        "scan.pdf",
        FormPdfBuilder::new().without_acroform().build(),
    );

    let output = run_cli_command(&["fields", path_str(&input)]).unwrap();
    assert!(output.status.success(), "Listing an empty form is not an error");
    assert!(String::from_utf8_lossy(&output.stdout).contains("No form fields found"));
}

#[test]
fn test_cli_generate_fills_form() {
    let temp_dir = setup_temp_dir();
    let input = write_form(
        temp_dir.path(),
        "form.pdf",
        FormPdfBuilder::new()
            .text_field("RUT_EMPRESA")
            .text_field("Text11")
            .text_field("Comentarios")
            .build(),
    );
    let output_path = temp_dir.path().join("filled.pdf");

    let output = run_cli_command(&[
        "generate",
        path_str(&input),
        "--module",
        "secondary",
        "-o",
        path_str(&output_path),
    ])
    .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Filled 2 of 3 fields"));

    let secondary = ActorRegistry::builtin().resolve(Module::Secondary).clone();
    assert_eq!(
        field_values(&output_path),
        vec![
            (
                "RUT_EMPRESA".to_string(),
                Some(Organization::default().tax_id)
            ),
            ("Text11".to_string(), Some(secondary.email)),
            ("Comentarios".to_string(), None),
        ]
    );
}

#[test]
fn test_cli_generate_default_output_name() {
    let temp_dir = setup_temp_dir();
    let input = write_form(
        temp_dir.path(),
        "solicitud.pdf",
        FormPdfBuilder::new().text_field("NOMBRE_EMPRESA").build(),
    );

    let output = run_cli_command(&["generate", path_str(&input), "--module", "PRIMARY"]).unwrap();
    assert!(output.status.success(), "Command should succeed");

    let expected = temp_dir.path().join("primary_solicitud.pdf");
    assert_eq!(
        field_values(&expected),
        vec![(
            "NOMBRE_EMPRESA".to_string(),
            Some(Organization::default().name)
        )]
    );
}

#[test]
fn test_cli_generate_invalid_module() {
    let temp_dir = setup_temp_dir();
    let input = write_form(
        temp_dir.path(),
        "form.pdf",
        FormPdfBuilder::new().text_field("NOMBRE_EMPRESA").build(),
    );

    let output = run_cli_command(&["generate", path_str(&input), "--module", "FINANCE"]).unwrap();
    assert!(!output.status.success(), "Unknown module should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must be one of PRIMARY, SECONDARY"));
    assert!(!temp_dir.path().join("finance_form.pdf").exists());
}

#[test]
fn test_cli_generate_unfillable_document() {
    let temp_dir = setup_temp_dir();
    let input = write_form(
        temp_dir.path(),
        "scan.pdf",
        FormPdfBuilder::new().without_acroform().build(),
    );

    let output = run_cli_command(&["generate", path_str(&input), "--module", "PRIMARY"]).unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not fillable"));
}

#[test]
fn test_cli_label_truncates_names() {
    let temp_dir = setup_temp_dir();
    let input = write_form(
        temp_dir.path(),
        "form.pdf",
        FormPdfBuilder::new()
            .text_field("NOMBRE_REPRESENTANTE")
            .text_field("Text10")
            .build(),
    );
    let output_path = temp_dir.path().join("labels.pdf");

    let output = run_cli_command(&[
        "label",
        path_str(&input),
        "-o",
        path_str(&output_path),
        "--max-len",
        "6",
    ])
    .unwrap();
    assert!(output.status.success(), "Command should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Labeled 2 fields"));

    assert_eq!(
        field_values(&output_path),
        vec![
            ("NOMBRE_REPRESENTANTE".to_string(), Some("NOMBRE".to_string())),
            ("Text10".to_string(), Some("Text10".to_string())),
        ]
    );
}

#[test]
fn test_cli_label_with_config_file() {
    let temp_dir = setup_temp_dir();
    let config_path = temp_dir.path().join("formfill.toml");
    fs::write(&config_path, "[mapping]\nlabel_max_len = 4\n").unwrap();
    let input = write_form(
        temp_dir.path(),
        "form.pdf",
        FormPdfBuilder::new().text_field("RUT_EMPRESA").build(),
    );

    let output = run_cli_command(&[
        "--config",
        path_str(&config_path),
        "label",
        path_str(&input),
    ])
    .unwrap();
    assert!(output.status.success(), "Command should succeed");

    assert_eq!(
        field_values(&temp_dir.path().join("labeled_form.pdf")),
        vec![("RUT_EMPRESA".to_string(), Some("RUT_".to_string()))]
    );
}

#[test]
fn test_cli_rejects_non_pdf_input() {
    let temp_dir = setup_temp_dir();
    let input = write_form(
        temp_dir.path(),
        "form.docx",
        FormPdfBuilder::new().text_field("A").build(),
    );

    let output = run_cli_command(&["fields", path_str(&input)]).unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported format"));
}

#[test]
fn test_cli_malformed_pdf() {
    let temp_dir = setup_temp_dir();
    let input = write_form(temp_dir.path(), "bad.pdf", b"Not a PDF at all".to_vec());

    let output = run_cli_command(&["fields", path_str(&input)]).unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Malformed document"));
}

#[test]
fn test_cli_missing_input_file() {
    let temp_dir = setup_temp_dir();
    let missing = temp_dir.path().join("missing.pdf");

    let output = run_cli_command(&["fields", path_str(&missing)]).unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

#[test]
fn test_cli_help_lists_commands() {
    let output = run_cli_command(&["--help"]).unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["fields", "label", "generate"] {
        assert!(stdout.contains(command), "help should mention {command}");
    }
}

use std::error::Error;
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("l10n-compiler")?)
}

fn write_pack(dir: &Path) -> Result<(), Box<dyn Error>> {
    fs::write(
        dir.join("en.json"),
        r#"{
            "locale": "en",
            "display_name": "English",
            "strings": {
                "cart": "You have {n:{no items|one item|?? items}}",
                "greeting": "Hello {name|capitalize}",
                "menu": { "file": "File", "edit": "Edit" }
            }
        }"#,
    )?;
    fs::write(
        dir.join("fr.json"),
        r#"{
            "locale": "fr",
            "strings": {
                "cart": "Vous avez {n:{aucun article|?? article|?? articles}}",
                "menu": { "file": "Fichier" }
            }
        }"#,
    )?;
    Ok(())
}

#[test]
fn check_reports_stats_and_missing_keys() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    write_pack(workspace.path())?;

    cli()?
        .args(["check", workspace.path().to_str().unwrap(), "--default-locale", "en"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 2 locale(s); fallback locale: en"))
        .stdout(predicate::str::contains("English [en]: 4 strings (1 plural) [fallback]"))
        .stdout(predicate::str::contains("fr [fr]: 2 strings (1 plural) - missing 2 key(s)"))
        .stdout(predicate::str::contains("· greeting"))
        .stderr(predicate::str::contains("Found 2 missing localization key(s)"));
    Ok(())
}

#[test]
fn check_fails_on_missing_when_requested() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    write_pack(workspace.path())?;

    cli()?
        .args([
            "check",
            workspace.path().to_str().unwrap(),
            "--default-locale",
            "en",
            "--fail-on-missing",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing localization keys detected"));
    Ok(())
}

#[test]
fn check_rejects_malformed_templates() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(
        workspace.path().join("en.json"),
        r#"{ "locale": "en", "strings": { "broken": "Hi {name" } }"#,
    )?;

    cli()?
        .args(["check", workspace.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("message 'broken' has a malformed template"));
    Ok(())
}

#[test]
fn check_verifies_reference_keys() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let langs = workspace.path().join("langs");
    fs::create_dir(&langs)?;
    write_pack(&langs)?;
    let reference = workspace.path().join("reference.json");
    fs::write(
        &reference,
        r#"{ "source": "app", "locale": "en", "keys": ["cart", "menu.file"] }"#,
    )?;

    cli()?
        .args([
            "check",
            langs.to_str().unwrap(),
            "--default-locale",
            "en",
            "--reference",
            reference.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Reference coverage OK for locale 'en' against app (2 keys)",
        ));
    Ok(())
}

#[test]
fn render_uses_named_arguments_and_locale() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    write_pack(workspace.path())?;
    let dir = workspace.path().to_str().unwrap();

    cli()?
        .args(["render", "cart", "--dir", dir, "--locale", "en", "--arg", "n=3"])
        .assert()
        .success()
        .stdout("You have 3 items\n");

    cli()?
        .args(["render", "cart", "--dir", dir, "--locale", "fr", "--arg", "n=0"])
        .assert()
        .success()
        .stdout("Vous avez aucun article\n");

    cli()?
        .args(["render", "greeting", "--dir", dir, "--locale", "en", "--arg", "name=ada"])
        .assert()
        .success()
        .stdout("Hello Ada\n");
    Ok(())
}

#[test]
fn render_falls_back_and_accepts_json_arguments() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let langs = workspace.path().join("langs");
    fs::create_dir(&langs)?;
    write_pack(&langs)?;
    let config = workspace.path().join("phrasekit.json");
    fs::write(&config, r#"{ "default_locale": "en", "locale_dirs": ["langs"] }"#)?;

    cli()?
        .args([
            "--config",
            config.to_str().unwrap(),
            "render",
            "greeting",
            "--locale",
            "fr",
            "--json",
            r#"{"name": "zoé"}"#,
        ])
        .assert()
        .success()
        .stdout("Hello Zoé\n");
    Ok(())
}

#[test]
fn render_unknown_key_fails() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    write_pack(workspace.path())?;

    cli()?
        .args(["render", "nope", "--dir", workspace.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("message 'nope' not found"));
    Ok(())
}

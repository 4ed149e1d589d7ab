use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAMPLE: &str = "I am Sam. Sam I am. I do not like this Sam I am.
Do you like green eggs and ham? I do not like them, Sam I am.
";

#[test]
fn cli_round_trip() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("sample.txt");
    let zip_path = temp_dir.path().join("sample.hzip");
    std::fs::write(&orig_path,SAMPLE)?;

    let mut cmd = Command::cargo_bin("hzip")?;
    cmd.arg("compress")
        .arg("-i").arg(&orig_path)
        .arg("-o").arg(&zip_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("compressed"));

    // remove the original so default-named expansion has to recreate it
    std::fs::remove_file(&orig_path)?;
    let mut cmd = Command::cargo_bin("hzip")?;
    cmd.arg("expand")
        .arg("-i").arg(&zip_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("expanded"));

    assert_eq!(std::fs::read(&orig_path)?,SAMPLE.as_bytes());
    Ok(())
}

#[test]
fn cli_default_compressed_name() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("sample.txt");
    let zip_path = temp_dir.path().join("sample.hzip");
    let out_path = temp_dir.path().join("restored.txt");
    std::fs::write(&orig_path,SAMPLE)?;

    let mut cmd = Command::cargo_bin("hzip")?;
    cmd.arg("compress")
        .arg("-i").arg(&orig_path)
        .assert()
        .success();
    assert!(zip_path.exists());

    let mut cmd = Command::cargo_bin("hzip")?;
    cmd.arg("expand")
        .arg("-i").arg(&zip_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("txt"));

    assert_eq!(std::fs::read(&out_path)?,SAMPLE.as_bytes());
    Ok(())
}

#[test]
fn cli_empty_file_round_trip() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("empty.dat");
    let zip_path = temp_dir.path().join("empty.hzip");
    std::fs::write(&orig_path,"")?;

    let mut cmd = Command::cargo_bin("hzip")?;
    cmd.arg("compress")
        .arg("-i").arg(&orig_path)
        .arg("-o").arg(&zip_path)
        .assert()
        .success();

    std::fs::remove_file(&orig_path)?;
    let mut cmd = Command::cargo_bin("hzip")?;
    cmd.arg("expand")
        .arg("-i").arg(&zip_path)
        .assert()
        .success();

    assert_eq!(std::fs::read(&orig_path)?.len(),0);
    Ok(())
}

mod common;

use std::fs;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use common::*;

macro_rules! cargo_run {
    ($cmd:expr $(, $args:expr)*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

#[test]
fn cifar_usage_on_wrong_arguments() -> Result<()> {
    cargo_run!("convert_cifar_data", "only_one_argument")
        .success()
        .stdout(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn imageset_too_few_arguments() -> Result<()> {
    cargo_run!("convert_imageset", "root/", "list.txt", "pairs.txt").code(1);
    Ok(())
}

#[test]
fn cifar_convert() -> Result<()> {
    let dir = TempDir::new()?;
    write_cifar_batch(&dir.path().join("data_batch.bin"), &[3, 3, 7]);
    write_cifar_batch(&dir.path().join("test_batch.bin"), &[1, 1]);
    fs::write(dir.path().join("train.txt"), "0 1 3 3\n1 2 3 7\n")?;
    fs::write(dir.path().join("test.txt"), "0 1 1 1\n")?;
    let output = dir.path().join("out");

    cargo_run!(
        "convert_cifar_data",
        dir.path(),
        &output,
        "leveldb",
        dir.path().join("train.txt"),
        dir.path().join("test.txt")
    )
    .success();

    assert!(output.join("cifar10_train_leveldb").is_dir());
    assert!(output.join("cifar10_test_leveldb").is_dir());
    Ok(())
}

#[test]
fn cifar_unknown_backend_fails() -> Result<()> {
    let dir = TempDir::new()?;
    write_cifar_batch(&dir.path().join("data_batch.bin"), &[3, 3]);
    write_cifar_batch(&dir.path().join("test_batch.bin"), &[1, 1]);
    fs::write(dir.path().join("train.txt"), "0 1 3 3\n")?;
    fs::write(dir.path().join("test.txt"), "0 1 1 1\n")?;
    let output = dir.path().join("out");

    cargo_run!(
        "convert_cifar_data",
        dir.path(),
        &output,
        "sqlite",
        dir.path().join("train.txt"),
        dir.path().join("test.txt")
    )
    .failure()
    .stderr(predicate::str::contains("invalid value 'sqlite'"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn cifar_usage_on_extra_argument() -> Result<()> {
    cargo_run!("convert_cifar_data", "in", "out", "lmdb", "train.txt", "test.txt", "extra")
        .success()
        .stdout(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn cifar_label_mismatch_fails() -> Result<()> {
    let dir = TempDir::new()?;
    write_cifar_batch(&dir.path().join("data_batch.bin"), &[3, 7]);
    write_cifar_batch(&dir.path().join("test_batch.bin"), &[1, 1]);
    fs::write(dir.path().join("train.txt"), "0 1 3 3\n")?;
    fs::write(dir.path().join("test.txt"), "0 1 1 1\n")?;

    cargo_run!(
        "convert_cifar_data",
        dir.path(),
        dir.path().join("out"),
        "lmdb",
        dir.path().join("train.txt"),
        dir.path().join("test.txt")
    )
    .failure()
    .stderr(predicate::str::contains("label mismatch"));
    Ok(())
}

#[test]
fn imageset_convert() -> Result<()> {
    let dir = TempDir::new()?;
    write_imageset(dir.path());
    fs::write(dir.path().join("pairs.txt"), "0 1 0 0\n0 4 0 1\n1 2 0 1\n")?;

    cargo_run!(
        "convert_imageset",
        "--check_size",
        "--backend=lmdb",
        dir.path(),
        dir.path().join("list.txt"),
        dir.path().join("pairs.txt"),
        dir.path().join("out_db")
    )
    .success()
    .stderr(predicate::str::contains("skipped 1 pairs"));

    assert!(dir.path().join("out_db/data.mdb").is_file());
    Ok(())
}

#[test]
fn imageset_existing_db_fails() -> Result<()> {
    let dir = TempDir::new()?;
    write_imageset(dir.path());
    fs::write(dir.path().join("pairs.txt"), "0 1 0 0\n")?;
    fs::create_dir(dir.path().join("out_db"))?;

    cargo_run!(
        "convert_imageset",
        dir.path(),
        dir.path().join("list.txt"),
        dir.path().join("pairs.txt"),
        dir.path().join("out_db")
    )
    .failure();
    Ok(())
}

//! CLI behavior against the local file backend
//! Each test runs in its own temporary working directory

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn draftline(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("draftline").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("DRAFTLINE_TOKEN")
        .env_remove("DRAFTLINE_LOGIN")
        .env("USER", "alice");
    cmd
}

#[test]
fn test_no_command_shows_instructions() {
    let dir = TempDir::new().unwrap();
    draftline(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("draftline board"))
        .stdout(predicate::str::contains("draftline publish"));
}

#[test]
fn test_empty_board_lists_every_column() {
    let dir = TempDir::new().unwrap();
    draftline(&dir)
        .arg("board")
        .assert()
        .success()
        .stdout(predicate::str::contains("Drafts (0)"))
        .stdout(predicate::str::contains("In Review (0)"))
        .stdout(predicate::str::contains("Ready (0)"));
}

#[test]
fn test_save_rejects_slug_outside_data_dir() {
    let dir = TempDir::new().unwrap();
    draftline(&dir)
        .args(["save", "posts", "../escaped", "-f", "title=Out", "-f", "body=Out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid slug"));
    assert!(!dir.path().join(".draftline/workflow/escaped.json").exists());
    assert!(!dir.path().join(".draftline/content/escaped.json").exists());
}

#[test]
fn test_full_lifecycle() {
    let dir = TempDir::new().unwrap();

    draftline(&dir)
        .args(["save", "posts", "hello", "-f", "title=Hello", "-f", "body=First post"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry saved"));
    assert!(dir.path().join(".draftline/workflow/posts/hello.json").exists());

    draftline(&dir)
        .arg("board")
        .assert()
        .success()
        .stdout(predicate::str::contains("Drafts (1)"))
        .stdout(predicate::str::contains("Posts / hello [New] Hello"))
        .stdout(predicate::str::contains("by alice"))
        .stdout(predicate::str::contains("collections/posts/entries/hello"));

    draftline(&dir)
        .args(["publish", "posts", "hello", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be Ready before publishing"));

    draftline(&dir)
        .args(["move", "posts", "hello", "ready"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drafts → Ready"));

    draftline(&dir)
        .args(["publish", "posts", "hello", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("published"));
    assert!(dir.path().join(".draftline/content/posts/hello.json").exists());
    assert!(!dir.path().join(".draftline/workflow/posts/hello.json").exists());

    draftline(&dir)
        .args(["show", "posts", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(published)"))
        .stdout(predicate::str::contains("First post"));
}

#[test]
fn test_save_with_missing_required_field_is_rejected() {
    let dir = TempDir::new().unwrap();
    draftline(&dir)
        .args(["save", "posts", "hello", "-f", "title=Hello"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("body is required."));
    assert!(!dir.path().join(".draftline/workflow/posts/hello.json").exists());
}

#[test]
fn test_declined_delete_keeps_entry() {
    let dir = TempDir::new().unwrap();
    draftline(&dir)
        .args(["save", "posts", "hello", "--data", r#"{"title": "Hello", "body": "Hi"}"#])
        .assert()
        .success();

    draftline(&dir)
        .args(["delete", "posts", "hello"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Are you sure you want to delete this entry?"))
        .stdout(predicate::str::contains("Delete cancelled"));
    assert!(dir.path().join(".draftline/workflow/posts/hello.json").exists());

    draftline(&dir)
        .args(["delete", "posts", "hello", "-y"])
        .assert()
        .success();
    assert!(!dir.path().join(".draftline/workflow/posts/hello.json").exists());
}

#[test]
fn test_unknown_collection_and_status() {
    let dir = TempDir::new().unwrap();
    draftline(&dir)
        .args(["show", "pages", "about"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown collection 'pages'"));

    draftline(&dir)
        .args(["move", "posts", "hello", "archived"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown workflow status"));
}

#[test]
fn test_login_without_token_fails() {
    let dir = TempDir::new().unwrap();
    draftline(&dir)
        .env_remove("GITLAB_TOKEN")
        .arg("login")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Login with GitLab"))
        .stderr(predicate::str::contains("GITLAB_TOKEN"));
}

#[test]
fn test_login_with_token() {
    let dir = TempDir::new().unwrap();
    draftline(&dir)
        .env("DRAFTLINE_TOKEN", "secret")
        .arg("login")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as alice"));
}

#[test]
fn test_simple_mode_disables_board() {
    let dir = TempDir::new().unwrap();
    draftline(&dir)
        .env("DRAFTLINE__PUBLISH_MODE", "simple")
        .arg("board")
        .assert()
        .success()
        .stdout(predicate::str::contains("Editorial workflow is disabled"));
}

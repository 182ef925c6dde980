use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use tempfile::tempdir;

fn grel(api_url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("grel"));
    cmd.env("GREL_USER", "user")
        .env("GREL_PASSWORD", "secret")
        .env("GREL_REPO", "owner/repo")
        .env("GREL_API_URL", api_url);
    cmd
}

fn release_body(url: &str, id: u64, tag: &str) -> String {
    format!(
        r#"{{
            "id": {id},
            "tag_name": "{tag}",
            "name": "{tag}",
            "html_url": "https://github.com/owner/repo/releases/tag/{tag}",
            "upload_url": "{url}/uploads/{id}/assets{{?name,label}}"
        }}"#
    )
}

#[test]
fn test_end_to_end_create_with_assets() {
    let mut server = Server::new();
    let url = server.url();

    let mock_create = server
        .mock("POST", "/repos/owner/repo/releases")
        .match_header("authorization", "Basic dXNlcjpzZWNyZXQ=")
        .match_body(Matcher::PartialJsonString(
            r#"{"tag_name": "v1.0.0", "body": "First release", "draft": false}"#.to_string(),
        ))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(release_body(&url, 7, "v1.0.0"))
        .create();

    let mock_zip = server
        .mock("POST", "/uploads/7/assets?name=app.zip")
        .match_header("content-type", "application/zip")
        .match_body("zip bytes")
        .with_status(201)
        .with_body(r#"{"name": "app.zip", "state": "uploaded"}"#)
        .expect(1)
        .create();

    let mock_readme = server
        .mock("POST", "/uploads/7/assets?name=README")
        .match_header("content-type", "text/html")
        .with_status(201)
        .with_body(r#"{"name": "README", "state": "uploaded"}"#)
        .expect(1)
        .create();

    let dir = tempdir().unwrap();
    let zip = dir.path().join("app.zip");
    let readme = dir.path().join("README");
    std::fs::write(&zip, "zip bytes").unwrap();
    std::fs::write(&readme, "read me").unwrap();

    grel(&url)
        .arg("create")
        .arg("v1.0.0")
        .arg("-m")
        .arg("First release")
        .arg(&zip)
        .arg(&readme)
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""tag_name": "v1.0.0""#))
        .stdout(predicates::str::contains("html_url"));

    mock_create.assert();
    mock_zip.assert();
    mock_readme.assert();
}

#[test]
fn test_create_with_missing_file_fails() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_create = server
        .mock("POST", "/repos/owner/repo/releases")
        .with_status(201)
        .with_body(release_body(&url, 8, "v1.0.1"))
        .create();

    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.zip");

    grel(&url)
        .arg("create")
        .arg("v1.0.1")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to create release v1.0.1"))
        .stderr(predicates::str::contains("missing.zip"));
}

#[test]
fn test_create_failure_still_uploads_remaining_files() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_create = server
        .mock("POST", "/repos/owner/repo/releases")
        .with_status(201)
        .with_body(release_body(&url, 9, "v1.0.2"))
        .create();

    let mock_present = server
        .mock("POST", "/uploads/9/assets?name=present.zip")
        .match_body("zip bytes")
        .with_status(201)
        .with_body(r#"{"name": "present.zip", "state": "uploaded"}"#)
        .expect(1)
        .create();

    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.zip");
    let present = dir.path().join("present.zip");
    std::fs::write(&present, "zip bytes").unwrap();

    grel(&url)
        .arg("create")
        .arg("v1.0.2")
        .arg(&missing)
        .arg(&present)
        .assert()
        .failure()
        .stderr(predicates::str::contains("missing.zip"));

    mock_present.assert();
}

#[test]
fn test_missing_user_fails() {
    let server = Server::new();

    grel(&server.url())
        .env_remove("GREL_USER")
        .arg("find")
        .arg("v1.0.0")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Missing --user"));
}

#[test]
fn test_global_options_after_subcommand() {
    let mut server = Server::new();
    let url = server.url();

    let mock_list = server
        .mock("GET", "/repos/other/project/releases")
        .match_header("authorization", "Basic bWU6dG9rZW4=")
        .with_status(200)
        .with_body(format!("[{}]", release_body(&url, 3, "v3.0.0")))
        .create();

    grel(&url)
        .arg("find")
        .arg("v3.0.0")
        .args(["-u", "me", "-p", "token", "-r", "other/project"])
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""id": 3"#));

    mock_list.assert();
}

#[test]
fn test_create_bad_credentials_fails() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_create = server
        .mock("POST", "/repos/owner/repo/releases")
        .with_status(200)
        .with_body(r#"{"message": "Bad credentials"}"#)
        .create();

    grel(&url)
        .arg("create")
        .arg("v1.0.0")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Bad credentials"));
}

#[test]
fn test_find_release() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_list = server
        .mock("GET", "/repos/owner/repo/releases")
        .with_status(200)
        .with_body(format!(
            "[{}, {}]",
            release_body(&url, 2, "v2.0.0"),
            release_body(&url, 1, "v1.0.0")
        ))
        .create();

    grel(&url)
        .arg("find")
        .arg("v1.0.0")
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""id": 1"#))
        .stdout(predicates::str::contains(r#""tag_name": "v1.0.0""#));
}

#[test]
fn test_find_missing_release_fails() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_list = server
        .mock("GET", "/repos/owner/repo/releases")
        .with_status(200)
        .with_body("[]")
        .create();

    grel(&url)
        .arg("find")
        .arg("v9.9.9")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Not found"));
}

#[test]
fn test_remove_release() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_list = server
        .mock("GET", "/repos/owner/repo/releases")
        .with_status(200)
        .with_body(format!("[{}]", release_body(&url, 3, "v0.1.0")))
        .create();
    let mock_delete = server
        .mock("DELETE", "/repos/owner/repo/releases/3")
        .with_status(204)
        .create();

    grel(&url)
        .arg("remove")
        .arg("v0.1.0")
        .assert()
        .success()
        .stdout(predicates::str::contains("Removed release v0.1.0"));

    mock_delete.assert();
}

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const KEY: &str = "0123456789abcdefghijABCDEFGHIJkl";

#[allow(deprecated)]
fn wrap(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wrap").unwrap();
    cmd.env_remove("WRAPAPI_KEY")
        .env_remove("WRAPAPI_HOST")
        .env_remove("WRAPAPI_TIMEOUT_SECS")
        .env("WRAPAPI_CONFIG", config_dir.path().join("config.toml"))
        .env("NO_COLOR", "1");
    cmd
}

/// Answer `count` requests with `body`, returning the raw requests received.
fn serve(count: usize, body: &'static str) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = std::thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..count {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let len = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok()).flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= head_end + 4 + len || n == 0 {
                        break;
                    }
                } else if n == 0 {
                    break;
                }
            }
            seen.push(String::from_utf8_lossy(&buf).to_string());
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).unwrap();
        }
        seen
    });
    (format!("http://{addr}"), handle)
}

#[test]
fn malformed_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    wrap(&dir)
        .args(["run", "acme/shop/prices", "--api-key", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid WrapAPI key"));
}

#[test]
fn missing_key_is_reported() {
    let dir = TempDir::new().unwrap();
    wrap(&dir)
        .args(["run", "acme/shop/prices"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API key configured"));
}

#[test]
fn argument_problems_are_listed_together() {
    let dir = TempDir::new().unwrap();
    wrap(&dir)
        .args(["run", "acme//prices/1.2", "--api-key", KEY, "--host", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("repository is missing"))
        .stderr(predicate::str::contains("(1.2)"));
}

#[test]
fn non_object_inputs_are_rejected() {
    let dir = TempDir::new().unwrap();
    wrap(&dir)
        .args(["run", "acme/shop/prices", "--inputs", "\"shoes\"", "--api-key", KEY, "--host", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("but is string instead"));
}

#[test]
fn login_whoami_logout() {
    let dir = TempDir::new().unwrap();

    wrap(&dir)
        .args(["whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No API key configured"));

    wrap(&dir)
        .args(["login", "short"])
        .assert()
        .failure();

    wrap(&dir)
        .args(["login", KEY, "--host", "http://localhost:8080/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved API key"))
        .stdout(predicate::str::contains("ABCDEFGHIJkl").not());

    wrap(&dir)
        .args(["whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jkl"))
        .stdout(predicate::str::contains("http://localhost:8080"));

    wrap(&dir)
        .args(["logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed API key"));

    wrap(&dir)
        .args(["logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No API key saved"));
}

#[test]
fn run_prints_response() {
    let dir = TempDir::new().unwrap();
    let (host, server) = serve(1, r#"{"success":true,"data":{"price":10}}"#);

    wrap(&dir)
        .args(["run", "acme/shop/prices/1.0.0", "-i", "sku=A-1", "--api-key", KEY, "--host", &host])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"price\": 10"));

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with(&format!("POST /use/acme/shop/prices/1.0.0?wrapAPIKey={KEY} ")));
    assert!(requests[0].contains(r#"{"sku":"A-1"}"#));
}

#[test]
fn remote_failure_is_reported_with_types() {
    let dir = TempDir::new().unwrap();
    let (host, server) = serve(1, r#"{"success":false,"messages":["bad input"],"errTypes":["invalid"]}"#);

    wrap(&dir)
        .args(["run", "acme/shop/prices", "--api-key", KEY, "--host", &host])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: bad input"))
        .stderr(predicate::str::contains("types: invalid"));
    server.join().unwrap();
}

#[test]
fn batch_threads_state_token() {
    let dir = TempDir::new().unwrap();
    let calls = dir.path().join("calls.json");
    std::fs::write(
        &calls,
        r#"[{"element": "acme/shop/login", "inputs": {"user": "me"}}, {"element": "acme/shop/orders"}]"#,
    )
    .unwrap();
    let (host, server) = serve(2, r#"{"success":true,"stateToken":"jar-1"}"#);

    wrap(&dir)
        .arg("batch")
        .arg(&calls)
        .args(["--api-key", KEY, "--host", &host])
        .assert()
        .success();

    let requests = server.join().unwrap();
    assert!(requests[0].contains(r#"{"user":"me"}"#));
    assert!(requests[1].contains(r#"{"stateToken":"jar-1"}"#));
}

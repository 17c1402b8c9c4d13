//! Shared helpers for integration tests.

use std::path::PathBuf;

use callcenter_reports::{InMemoryRoster, Row, RosterScope, UserRecord};
use tempfile::TempDir;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

#[allow(dead_code)]
struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Temp directory holding parameter, roster, and row files.
#[allow(dead_code)]
pub struct TempFixtureDir {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TempFixtureDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Write `contents` to `name` inside the temp dir and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }
}

/// Three agents on two teams.
#[allow(dead_code)]
pub fn sample_roster() -> InMemoryRoster {
    InMemoryRoster::new(sample_users(), &RosterScope::default())
}

#[allow(dead_code)]
pub fn sample_users() -> Vec<UserRecord> {
    vec![
        UserRecord::new("userA", "Agent A", "teamX"),
        UserRecord::new("userB", "Agent B", "teamX"),
        UserRecord::new("userC", "Agent C", "teamY"),
    ]
}

/// Same roster as [`sample_roster`] in its TOML form.
#[allow(dead_code)]
pub const SAMPLE_ROSTER_TOML: &str = r#"
[[users]]
user_id = "userA"
display_name = "Agent A"
team = "teamX"

[[users]]
user_id = "userB"
display_name = "Agent B"
team = "teamX"

[[users]]
user_id = "userC"
display_name = "Agent C"
team = "teamY"
"#;

#[allow(dead_code)]
pub fn rows(raw: &[&[&str]]) -> Vec<Row> {
    raw.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

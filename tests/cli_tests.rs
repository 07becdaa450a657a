use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

mod common;
use common::rp;

/// Temp HOME plus the two database paths passed on the command line.
struct Sandbox {
    home: TempDir,
    db: String,
    queue_db: String,
}

impl Sandbox {
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        let db = home.path().join("server.sqlite").to_string_lossy().to_string();
        let queue_db = home.path().join("queue.sqlite").to_string_lossy().to_string();
        Self { home, db, queue_db }
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut c = rp();
        c.env("HOME", self.home.path())
            .env_remove("RUST_LOG")
            .args(["--db", &self.db, "--queue-db", &self.queue_db]);
        c
    }

    fn config_path(&self) -> std::path::PathBuf {
        self.home.path().join(".rpunch").join("rpunch.conf")
    }

    /// Config with a server nobody listens on.
    fn write_config(&self, extra: &str) {
        let dir = self.home.path().join(".rpunch");
        fs::create_dir_all(&dir).unwrap();
        let yaml = format!(
            "database: {}\nqueue_database: {}\nserver_url: http://127.0.0.1:9\nrequest_timeout_secs: 1\nworker_id: w1\n{}",
            self.db, self.queue_db, extra
        );
        fs::write(self.config_path(), yaml).unwrap();
    }

    fn init(&self) {
        self.cmd()
            .args(["--test", "init"])
            .assert()
            .success()
            .stdout(contains("initialization completed"));
    }
}

#[test]
fn test_init_creates_both_databases() {
    let sb = Sandbox::new();
    sb.init();

    assert!(Path::new(&sb.db).exists());
    assert!(Path::new(&sb.queue_db).exists());
    // --test keeps the config file untouched
    assert!(!sb.config_path().exists());
}

#[test]
fn test_db_info_and_log_after_init() {
    let sb = Sandbox::new();
    sb.init();

    sb.cmd()
        .args(["db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Workers:").and(contains("Integrity check passed")));

    sb.cmd()
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied").and(contains("Database initialized")));
}

#[test]
fn test_offline_punch_refused_by_default_plan() {
    let sb = Sandbox::new();
    sb.write_config("latitude: 45.0\nlongitude: 9.0\n");

    sb.cmd()
        .args(["in", "--offline"])
        .assert()
        .failure()
        .stderr(contains("offline punching is not included"));

    sb.cmd()
        .args(["queue", "--list"])
        .assert()
        .success()
        .stdout(contains("Queue is empty."));
}

#[test]
fn test_punch_without_location_is_denied() {
    let sb = Sandbox::new();
    sb.write_config("offline_punch_allowed: true\n");

    sb.cmd()
        .args(["in", "--offline"])
        .assert()
        .failure()
        .stderr(contains("Location permission denied"));
}

#[test]
fn test_offline_queue_status_and_clear() {
    let sb = Sandbox::new();
    sb.write_config("offline_punch_allowed: true\n");

    sb.cmd()
        .args(["in", "--offline", "--lat", "45.4642", "--lon", "9.19"])
        .assert()
        .success()
        .stdout(contains("Time-In queued").and(contains("On the clock")));

    // punching in again only replaces the queued entry
    sb.cmd()
        .args(["in", "--offline", "--lat", "45.4642", "--lon", "9.19"])
        .assert()
        .success();

    sb.cmd()
        .args(["queue", "--list"])
        .assert()
        .success()
        .stdout(contains("1 queued punch(es)").and(contains("w1")).and(contains("45.464200,9.190000")));

    sb.cmd()
        .args(["status", "--offline"])
        .assert()
        .success()
        .stdout(contains("On the clock").and(contains("1 punch(es) waiting to sync")));

    sb.cmd()
        .args(["queue", "--clear"])
        .assert()
        .success()
        .stdout(contains("Discarded 1 queued punch(es)."));

    sb.cmd()
        .args(["queue"])
        .assert()
        .success()
        .stdout(contains("Queue is empty."));
}

#[test]
fn test_sync_with_unreachable_server_keeps_queue() {
    let sb = Sandbox::new();
    sb.write_config("offline_punch_allowed: true\nlatitude: 45.0\nlongitude: 9.0\n");

    sb.cmd().args(["out", "--offline"]).assert().success();

    sb.cmd()
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("Server unreachable").and(contains("1 punch(es) stay queued")));
}

#[test]
fn test_presence_rejects_unknown_status() {
    let sb = Sandbox::new();
    sb.write_config("");

    sb.cmd()
        .args(["presence", "--set", "busy"])
        .assert()
        .failure()
        .stderr(contains("Invalid presence status: busy"));
}

#[test]
fn test_missing_worker_is_a_config_error() {
    let sb = Sandbox::new();

    sb.cmd()
        .args(["status", "--offline"])
        .assert()
        .failure()
        .stderr(contains("no worker id"));
}

#[test]
fn test_config_check_and_migrate() {
    let sb = Sandbox::new();
    sb.write_config("");

    sb.cmd()
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(contains("Missing fields").and(contains("offline_punch_allowed")));

    sb.cmd()
        .args(["config", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Configuration migrated"));

    sb.cmd()
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(contains("Configuration file is complete."));

    // values already present survive the migration
    let content = fs::read_to_string(sb.config_path()).unwrap();
    assert!(content.contains("worker_id: w1"));
}

#[test]
fn test_config_check_without_file() {
    let sb = Sandbox::new();

    sb.cmd()
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(contains("No configuration file"));
}

#[test]
fn test_punch_help_mentions_pending_sync() {
    for cmd in ["in", "out"] {
        rp()
            .args([cmd, "--help"])
            .assert()
            .success()
            .stdout(contains("queued punches are sent first"));
    }
}

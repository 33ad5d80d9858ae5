//! CLI contract tests
//!
//! Drives the built binary against a throwaway site root: grading,
//! publishing into the locale feeds, feed recovery, insights and the
//! growth calculator.

use std::path::Path;
use std::process::Command;

fn divgrade_bin() -> String {
    env!("CARGO_BIN_EXE_divgrade").to_string()
}

/// Site root with a small config so the user config dir is never consulted
fn setup_site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("divgrade.toml"),
        r#"
[universe.categories]
income = ["KO", "MO", "O", "VZ"]

[feed]
cap = 3
lease_timeout_ms = 200
"#,
    )
    .unwrap();
    dir
}

fn run(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(divgrade_bin())
        .arg("--root")
        .arg(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("DIVGRADE_CONFIG")
        .output()
        .expect("Failed to run divgrade");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

fn read_feed(path: &Path) -> Vec<serde_json::Value> {
    let content = std::fs::read_to_string(path).expect("feed file");
    serde_json::from_str::<serde_json::Value>(&content)
        .expect("feed is JSON")
        .as_array()
        .expect("feed is an array")
        .clone()
}

// ============================================================================
// grade
// ============================================================================

#[test]
fn test_grade_json_s_tier() {
    let dir = setup_site();
    let (code, stdout, _) = run(
        dir.path(),
        &[
            "grade", "--yield", "5.5", "--payout", "45", "--avg-yield", "5.0", "--sector",
            "Technology", "--format", "json",
        ],
    );
    assert_eq!(code, 0);
    let v: serde_json::Value = serde_json::from_str(&stdout).expect("grade JSON");
    assert_eq!(v["grade"], "S");
    assert_eq!(v["breakdown"]["total"], 100);
}

#[test]
fn test_grade_reit_explain_in_korean() {
    let dir = setup_site();
    let (code, stdout, _) = run(
        dir.path(),
        &[
            "grade", "--yield", "4.5", "--payout", "98", "--sector", "Real Estate", "--explain",
            "--locale", "ko",
        ],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("B등급"), "stdout: {}", stdout);
    assert!(stdout.contains("REIT curve"));
}

// ============================================================================
// publish / feed
// ============================================================================

#[test]
fn test_publish_fans_out_to_every_locale() {
    let dir = setup_site();
    let (code, stdout, stderr) = run(
        dir.path(),
        &[
            "publish",
            "blog/2026-01-05-SCHD.html",
            "--date",
            "2026-01-05",
            "--title",
            "SCHD deep dive",
            "--summary",
            "Quality dividend ETF",
            "--copy",
            "ko=SCHD 분석|배당 ETF",
        ],
    );
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert_eq!(stdout.lines().count(), 3);

    let en = read_feed(&dir.path().join("posts.json"));
    assert_eq!(en.len(), 1);
    assert_eq!(en[0]["link"], "blog/2026-01-05-SCHD.html");
    assert_eq!(en[0]["date"], "2026-01-05");

    let ko = read_feed(&dir.path().join("ko/posts.json"));
    assert_eq!(ko[0]["title"], "SCHD 분석");
    assert_eq!(read_feed(&dir.path().join("pt/posts.json")).len(), 1);
    assert!(!dir.path().join("posts.json.lock").exists());
}

#[test]
fn test_republish_same_key_replaces() {
    let dir = setup_site();
    for title in ["First draft", "Final"] {
        let (code, _, stderr) = run(
            dir.path(),
            &["publish", "blog/a.html", "--date", "2026-01-05", "--title", title],
        );
        assert_eq!(code, 0, "stderr: {}", stderr);
    }
    let en = read_feed(&dir.path().join("posts.json"));
    assert_eq!(en.len(), 1);
    assert_eq!(en[0]["title"], "Final");
}

#[test]
fn test_feed_is_capped_newest_first() {
    let dir = setup_site();
    for key in ["blog/1.html", "blog/2.html", "blog/3.html", "blog/4.html"] {
        let (code, _, _) = run(
            dir.path(),
            &["publish", key, "--date", "2026-01-05", "--title", key],
        );
        assert_eq!(code, 0);
    }
    let (code, stdout, _) = run(dir.path(), &["feed", "--format", "json"]);
    assert_eq!(code, 0);
    let records: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    let links: Vec<&str> = records.iter().map(|r| r["link"].as_str().unwrap()).collect();
    assert_eq!(links, vec!["blog/4.html", "blog/3.html", "blog/2.html"]);
}

#[test]
fn test_corrupt_feed_is_recovered() {
    let dir = setup_site();
    std::fs::write(dir.path().join("posts.json"), "{ not a feed").unwrap();

    let (code, stdout, _) = run(
        dir.path(),
        &["publish", "blog/new.html", "--date", "2026-01-06", "--copy", "en=New post"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("corrupt"));
    assert!(stdout.contains("skipped"));
    assert_eq!(read_feed(&dir.path().join("posts.json")).len(), 1);
}

#[test]
fn test_held_lease_fails_publish() {
    let dir = setup_site();
    std::fs::write(dir.path().join("posts.json.lock"), "").unwrap();

    let (code, stdout, _) = run(
        dir.path(),
        &["publish", "blog/x.html", "--date", "2026-01-06", "--title", "X"],
    );
    assert_ne!(code, 0);
    assert!(!dir.path().join("posts.json").exists());
    // Other locales still got the item
    assert_eq!(read_feed(&dir.path().join("ko/posts.json")).len(), 1);
    assert!(stdout.contains("Timed out"));
}

#[test]
fn test_publish_rejects_bad_date() {
    let dir = setup_site();
    let (code, _, stderr) = run(
        dir.path(),
        &["publish", "blog/x.html", "--date", "05/01/2026", "--title", "X"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid date"));
}

// ============================================================================
// insights
// ============================================================================

#[test]
fn test_insights_writes_sorted_report() {
    let dir = setup_site();
    let quotes = dir.path().join("quotes.json");
    std::fs::write(
        &quotes,
        r#"[
            {"symbol": "KO", "longName": "Coca-Cola", "sector": "Consumer Defensive",
             "dividendYield": 0.031, "payoutRatio": 0.68, "fiveYearAvgDividendYield": 3.05},
            {"symbol": "MO", "longName": "Altria", "sector": "Consumer Defensive",
             "dividendYield": 0.082, "payoutRatio": 0.77, "fiveYearAvgDividendYield": 7.9},
            {"symbol": "O", "longName": "Realty Income", "sector": "Real Estate",
             "dividendYield": 0.045, "payoutRatio": 0.98},
            {"symbol": "AAPL", "dividendYield": 0.005}
        ]"#,
    )
    .unwrap();

    let (code, _, stderr) = run(dir.path(), &["insights", quotes.to_str().unwrap()]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stderr.contains("VZ"), "missing ticker should be reported");

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("dividend_insights.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["total_stocks"], 3);
    let tickers: Vec<&str> = report["stocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["ticker"].as_str().unwrap())
        .collect();
    assert_eq!(tickers, vec!["MO", "O", "KO"]);
    assert_eq!(report["stocks"][1]["dividend_yield"], 4.5);
}

// ============================================================================
// calc / init / config
// ============================================================================

#[test]
fn test_calc_json_projection() {
    let dir = setup_site();
    let (code, stdout, _) = run(
        dir.path(),
        &[
            "calc", "--principal", "1000", "--monthly", "100", "--yield", "4", "--growth", "5",
            "--years", "5", "--format", "json",
        ],
    );
    assert_eq!(code, 0);
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["years"].as_array().unwrap().len(), 5);
    assert_eq!(v["total_principal"], 7000.0);
    assert!(v["roi_pct"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_init_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run(dir.path(), &["init"]);
    assert_eq!(code, 0);
    let written = std::fs::read_to_string(dir.path().join("divgrade.toml")).unwrap();
    assert!(written.contains("[feed]"));

    std::fs::write(dir.path().join("divgrade.toml"), "# mine\n").unwrap();
    let (code, stdout, _) = run(dir.path(), &["init"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Already initialized"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("divgrade.toml")).unwrap(),
        "# mine\n"
    );
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = setup_site();
    let missing = dir.path().join("nope.toml");
    let (code, _, stderr) = run(
        dir.path(),
        &["feed", "--config", missing.to_str().unwrap()],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to load config"));
}

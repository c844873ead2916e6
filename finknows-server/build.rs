//! Build script for finknows-server
//!
//! Stamps the binaries with the git revision, a UTC build time and the
//! cargo profile. `main` logs all three at startup.

use std::process::Command;

/// Short hash of HEAD, or `unknown` outside a git checkout
fn git_revision() -> String {
    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let stamps = [
        ("GIT_HASH", git_revision()),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ),
        (
            "BUILD_PROFILE",
            std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
    ];

    for (key, value) in stamps {
        println!("cargo:rustc-env={}={}", key, value);
    }

    // No rerun-if-changed directives: Cargo reruns this script on every build
}

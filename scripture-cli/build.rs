use std::process::Command;

/// Runs `cmd args...` and returns trimmed stdout, or "unknown" on any failure.
fn capture(cmd: &str, args: &[&str]) -> String {
    Command::new(cmd)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    // ビルド日時
    println!("cargo:rustc-env=BUILD_DATE={}", capture("date", &["+%Y-%m-%d %H:%M:%S"]));
    // Git コミットハッシュ（git が無い環境では unknown）
    println!("cargo:rustc-env=GIT_HASH={}", capture("git", &["rev-parse", "--short", "HEAD"]));
    println!("cargo:rerun-if-changed=build.rs");
}

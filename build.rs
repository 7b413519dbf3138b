fn main() {
    println!("cargo:rerun-if-env-changed=GLYPHFALL_BUILD");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");

    let build_id = match std::env::var("GLYPHFALL_BUILD") {
        Ok(v) if !v.is_empty() => v,
        _ => infer_build_id(),
    };
    println!("cargo:rustc-env=GLYPHFALL_BUILD={}", build_id);

    let sha = git_short_sha()
        .or_else(|| env_short_sha("GITHUB_SHA"))
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GLYPHFALL_GIT_SHA={}", sha);
}

fn short_hex(v: &str) -> Option<String> {
    let v = v.trim();
    let short = v.get(..7).unwrap_or(v);
    if !short.is_empty() && short.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(short.to_ascii_lowercase())
    } else {
        None
    }
}

fn env_short_sha(name: &str) -> Option<String> {
    short_hex(&std::env::var(name).ok()?)
}

fn git_short_sha() -> Option<String> {
    let out = std::process::Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    short_hex(&String::from_utf8(out.stdout).ok()?)
}

fn infer_build_id() -> String {
    let os = match std::env::var("CARGO_CFG_TARGET_OS").as_deref() {
        Ok("macos") => "darwin".to_string(),
        Ok(other) => other.to_string(),
        Err(_) => "unknown".to_string(),
    };
    let arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_else(|_| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    format!("{os}-{arch}-{profile}")
}

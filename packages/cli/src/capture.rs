//! One-time interactive capture of the search URL.
//!
//! Opens a real browser, lets the user build their search with the
//! platform's own filter UI, then reads the resulting URL, strips the
//! per-session query params, and persists it to `.env`.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm};
use url::Url;
use webdriver::{SessionOptions, WebDriverSession};

use crate::settings::Settings;

const JOBS_HOME: &str = "https://www.linkedin.com/jobs/";

/// Query params that pin a capture to one session or one posting.
const DROPPED_PARAMS: &[&str] = &["currentJobId", "origin"];

pub async fn capture(settings: &Settings) -> Result<()> {
    let term = Term::stdout();

    println!();
    println!("{}", "🔍 Search URL capture".bright_cyan().bold());
    println!(
        "   A browser window will open. Sign in if needed, then build your\n   \
         search with keywords and filters. Come back here when the result\n   \
         list shows what you want scanned every run."
    );
    println!();

    let mut options = SessionOptions::new(&settings.webdriver_url);
    if let Some(dir) = &settings.chrome_profile_dir {
        options = options.with_user_data_dir(dir);
    }
    let session = WebDriverSession::start(options)
        .await
        .context("starting the capture browser session")?;
    session.goto(JOBS_HOME).await?;

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Capture the current search URL?")
        .default(true)
        .interact_on(&term)?;

    if !confirmed {
        session.quit().await.ok();
        println!("{}", "Capture cancelled.".dimmed());
        return Ok(());
    }

    let raw = session.current_url().await?;
    session.quit().await.ok();

    let search_url = sanitize_search_url(&raw)
        .with_context(|| format!("captured URL does not parse: {raw}"))?;
    save_env_var(Path::new(".env"), "SEARCH_URL", &search_url)?;

    println!();
    println!("{} {}", "✅ Saved:".bright_green().bold(), search_url);
    println!("   Runs will now scan this search. Re-run capture any time.");
    Ok(())
}

/// Strip session-specific query params, keeping everything else
/// byte-for-byte as captured.
///
/// The query is filtered textually; decoding and re-encoding it would
/// rewrite the platform's own percent-encoding.
fn sanitize_search_url(raw: &str) -> Result<String> {
    Url::parse(raw)?;

    let (base, query) = match raw.split_once('?') {
        Some(parts) => parts,
        None => return Ok(raw.to_string()),
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or("");
            !DROPPED_PARAMS.contains(&key)
        })
        .collect();

    if kept.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}?{}", kept.join("&")))
    }
}

/// Set `key=value` in an env file, replacing an existing assignment or
/// appending a new one.
fn save_env_var(path: &Path, key: &str, value: &str) -> Result<()> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let updated = upsert_env_var(&contents, key, value);
    std::fs::write(path, updated).with_context(|| format!("writing {}", path.display()))
}

fn upsert_env_var(contents: &str, key: &str, value: &str) -> String {
    let assignment = format!("{key}={value}");
    let prefix = format!("{key}=");
    let mut replaced = false;

    let mut lines: Vec<String> = contents
        .lines()
        .map(|line| {
            if line.trim_start().starts_with(&prefix) {
                replaced = true;
                assignment.clone()
            } else {
                line.to_string()
            }
        })
        .collect();

    if !replaced {
        lines.push(assignment);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_drops_session_params_only() {
        let raw = "https://www.linkedin.com/jobs/search/?currentJobId=123\
                   &keywords=data%20scientist&origin=JOB_SEARCH_PAGE&f_TPR=r86400";
        let clean = sanitize_search_url(raw).unwrap();
        assert!(!clean.contains("currentJobId"));
        assert!(!clean.contains("origin="));
        assert!(clean.contains("keywords=data%20scientist"));
        assert!(clean.contains("f_TPR=r86400"));
    }

    #[test]
    fn sanitize_handles_no_query() {
        let clean = sanitize_search_url("https://www.linkedin.com/jobs/search/").unwrap();
        assert_eq!(clean, "https://www.linkedin.com/jobs/search/");
    }

    #[test]
    fn sanitize_keeps_query_encoding_verbatim() {
        let raw = "https://www.linkedin.com/jobs/search/?keywords=a%20b%2Bc&currentJobId=9";
        let clean = sanitize_search_url(raw).unwrap();
        assert_eq!(
            clean,
            "https://www.linkedin.com/jobs/search/?keywords=a%20b%2Bc"
        );
    }

    #[test]
    fn sanitize_with_only_dropped_params_strips_the_query() {
        let raw = "https://www.linkedin.com/jobs/search/?currentJobId=9&origin=X";
        let clean = sanitize_search_url(raw).unwrap();
        assert_eq!(clean, "https://www.linkedin.com/jobs/search/");
    }

    #[test]
    fn upsert_replaces_existing_assignment() {
        let env = "OPENAI_API_KEY=sk-x\nSEARCH_URL=https://old\nRESEND_API_KEY=re-x\n";
        let updated = upsert_env_var(env, "SEARCH_URL", "https://new");
        assert!(updated.contains("SEARCH_URL=https://new"));
        assert!(!updated.contains("https://old"));
        assert!(updated.contains("OPENAI_API_KEY=sk-x"));
    }

    #[test]
    fn upsert_appends_when_absent() {
        let updated = upsert_env_var("OPENAI_API_KEY=sk-x\n", "SEARCH_URL", "https://new");
        assert!(updated.ends_with("SEARCH_URL=https://new\n"));
    }

    #[test]
    fn upsert_starts_empty_file() {
        let updated = upsert_env_var("", "SEARCH_URL", "https://new");
        assert_eq!(updated, "SEARCH_URL=https://new\n");
    }
}

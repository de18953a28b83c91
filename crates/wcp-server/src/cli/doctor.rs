//! `wcp-server doctor` (`§4.8` CLI): connectivity/config smoke check,
//! mirroring the teacher's `gateway::cli::doctor` shape.

use wcp_domain::config::{Config, ConfigSeverity};

/// Runs every diagnostic check and prints a human-readable summary.
/// Returns `Ok(true)` when every check passes.
pub async fn run(config: &Config) -> anyhow::Result<bool> {
    println!("wcp-server doctor");
    println!("=================\n");

    let mut all_passed = true;

    check_config_validation(config, &mut all_passed);
    check_database(config, &mut all_passed).await;
    check_llm_tiers(config, &mut all_passed);

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }
    Ok(all_passed)
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let errors = issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count();
    print_check("Configuration valid", errors == 0, format!("{} issue(s)", issues.len()));
    for issue in &issues {
        let tag = match issue.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        println!("    [{tag}] {issue}");
    }
    if errors > 0 {
        *all_passed = false;
    }
}

async fn check_database(config: &Config, all_passed: &mut bool) {
    match wcp_persistence::connect(&config.database).await {
        Ok(pool) => {
            print_check("Database reachable", true, config.database.sqlite_url());
            pool.close().await;
        }
        Err(e) => {
            print_check("Database reachable", false, e.to_string());
            *all_passed = false;
        }
    }
}

fn check_llm_tiers(config: &Config, all_passed: &mut bool) {
    let minor_ok = !config.llm.minor.base_url.is_empty();
    let story_ok = !config.llm.story.base_url.is_empty();
    print_check("Minor LLM tier configured", minor_ok, config.llm.minor.base_url.clone());
    print_check("Story LLM tier configured", story_ok, config.llm.story.base_url.clone());
    if !minor_ok || !story_ok {
        *all_passed = false;
    }
}

fn print_check(label: &str, passed: bool, detail: impl Into<String>) {
    let mark = if passed { "OK" } else { "FAIL" };
    println!("[{mark}] {label}: {}", detail.into());
}

//! `wcp-server config show|validate` (`§4.8` CLI).

use wcp_domain::config::{Config, ConfigSeverity};

pub fn show(config: &Config) {
    match serde_json::to_string_pretty(config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize config: {e}"),
    }
}

/// Returns `true` when the config has no `Error`-severity issues.
pub fn validate(config: &Config) -> bool {
    let issues = config.validate();
    if issues.is_empty() {
        println!("configuration valid, no issues found");
        return true;
    }
    let mut ok = true;
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Error => {
                println!("ERROR: {issue}");
                ok = false;
            }
            ConfigSeverity::Warning => println!("WARN: {issue}"),
        }
    }
    ok
}

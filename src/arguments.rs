/// Centralized argument handling for hostwatch
///
/// Consolidates all command-line argument parsing and debug flag checking so
/// the rest of the code never touches `env::args` directly.
///
/// Features:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Debug flag checking functions for all modules
/// - Unified argument parsing utilities
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
/// Returns a vector clone to avoid holding the mutex lock
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => {
            // Fallback to env::args if mutex is poisoned
            env::args().collect()
        }
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
/// Returns None if the flag is not found or has no value
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// =============================================================================

/// Telegram dispatch debug mode
pub fn is_debug_telegram_enabled() -> bool {
    has_arg("--debug-telegram") || has_arg("--debug-all")
}

/// Host registry debug mode
pub fn is_debug_db_enabled() -> bool {
    has_arg("--debug-db") || has_arg("--debug-all")
}

/// Metrics probe debug mode
pub fn is_debug_probe_enabled() -> bool {
    has_arg("--debug-probe") || has_arg("--debug-all")
}

/// Checks whether the user asked for usage information
pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

/// Path to the configuration file (`--config <path>`, default config.json)
pub fn config_path() -> String {
    get_arg_value("--config").unwrap_or_else(|| "config.json".to_string())
}

/// Print usage information
pub fn print_help() {
    println!("hostwatch - Telegram bot for monitoring remote hosts");
    println!();
    println!("USAGE:");
    println!("    hostwatch [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>      Configuration file (default: config.json)");
    println!("    --debug-telegram     Verbose logs for the Telegram dispatch layer");
    println!("    --debug-db           Verbose logs for the host registry");
    println!("    --debug-probe        Verbose logs for the metrics probe");
    println!("    --debug-all          All of the above");
    println!("    -h, --help           Print this help message");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_value_lookup() {
        set_cmd_args(vec![
            "hostwatch".to_string(),
            "--config".to_string(),
            "alt.json".to_string(),
        ]);
        assert_eq!(get_arg_value("--config").as_deref(), Some("alt.json"));
        assert_eq!(config_path(), "alt.json");
        assert!(get_arg_value("--missing").is_none());
        set_cmd_args(vec!["hostwatch".to_string()]);
        assert_eq!(config_path(), "config.json");
    }
}

//! CLI argument definitions for the ordering line.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;

use callorder_core::config::CallOrderConfig;

/// Phone ordering line: simulates a call against a restaurant catalog on the console.
#[derive(Parser, Debug)]
#[command(name = "callorder", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Path to the catalog directory TOML.
    #[arg(long = "catalog")]
    pub catalog: Option<PathBuf>,

    /// Dialed number selecting the restaurant (defaults to the first catalog).
    #[arg(long = "callee")]
    pub callee: Option<String>,

    /// Call identifier recorded on the order.
    #[arg(long = "call-id")]
    pub call_id: Option<String>,

    /// Data directory for the order database and order files.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Print recently placed orders and exit.
    #[arg(long = "list-orders")]
    pub list_orders: bool,

    /// How many orders `--list-orders` prints.
    #[arg(long = "limit", default_value_t = 10)]
    pub limit: u64,
}

impl CliArgs {
    /// Priority: --config flag > CALLORDER_CONFIG env var > ~/.callorder/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CALLORDER_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --catalog flag > `[catalog] path`.
    pub fn resolve_catalog_path(&self, config: &CallOrderConfig) -> PathBuf {
        self.catalog
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.catalog.path))
    }

    /// Priority: --data-dir flag > `[general] data_dir` with `~` expanded.
    pub fn resolve_data_dir(&self, config: &CallOrderConfig) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| config.general.resolved_data_dir())
    }

    /// Priority: --log-level flag > `[general] log_level`.
    pub fn resolve_log_level(&self, config: &CallOrderConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }

    /// --call-id, or a fresh `CONSOLE-xxxxxxxx` id.
    pub fn resolve_call_id(&self) -> String {
        match &self.call_id {
            Some(id) => id.clone(),
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                format!("CONSOLE-{}", &id[..8])
            }
        }
    }
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".callorder").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".callorder").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["callorder"];
        argv.extend_from_slice(args);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert!(!args.list_orders);
        assert_eq!(args.limit, 10);
        assert!(args.callee.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "--catalog",
            "/tmp/menu.toml",
            "--data-dir",
            "/tmp/orders",
            "--log-level",
            "debug",
            "--call-id",
            "CA123",
            "--list-orders",
            "--limit",
            "3",
        ]);
        let config = CallOrderConfig::default();
        assert_eq!(args.resolve_catalog_path(&config), PathBuf::from("/tmp/menu.toml"));
        assert_eq!(args.resolve_data_dir(&config), PathBuf::from("/tmp/orders"));
        assert_eq!(args.resolve_log_level(&config), "debug");
        assert_eq!(args.resolve_call_id(), "CA123");
        assert!(args.list_orders);
        assert_eq!(args.limit, 3);
    }

    #[test]
    fn test_config_values_used_without_flags() {
        let args = parse(&[]);
        let mut config = CallOrderConfig::default();
        config.catalog.path = "menus/all.toml".to_string();
        config.general.log_level = "warn".to_string();
        config.general.data_dir = "/var/lib/callorder".to_string();

        assert_eq!(args.resolve_catalog_path(&config), PathBuf::from("menus/all.toml"));
        assert_eq!(args.resolve_log_level(&config), "warn");
        assert_eq!(args.resolve_data_dir(&config), PathBuf::from("/var/lib/callorder"));
    }

    #[test]
    fn test_generated_call_id() {
        let args = parse(&[]);
        let id = args.resolve_call_id();
        assert!(id.starts_with("CONSOLE-"));
        assert_eq!(id.len(), "CONSOLE-".len() + 8);
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let args = parse(&["--config", "/etc/callorder.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/callorder.toml"));
    }
}

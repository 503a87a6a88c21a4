//! config command - Show where configuration comes from and what it resolves to

use anyhow::Result;

use crate::cli::Context;
use crate::core::config::Config;

/// Print the path of the config file in use.
///
/// When no file exists, prints the canonical location a new file should go.
pub fn path(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    match config.loaded_from() {
        Some(path) => println!("{}", path.display()),
        None => {
            let canonical = Config::canonical_path()?;
            if ctx.quiet {
                println!("{}", canonical.display());
            } else {
                println!("{} (not present, using defaults)", canonical.display());
            }
        }
    }
    Ok(())
}

/// Print the effective configuration, defaults included.
pub fn show(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    for (key, value) in effective_values(&config) {
        println!("{} = {}", key, value);
    }
    Ok(())
}

fn effective_values(config: &Config) -> Vec<(&'static str, String)> {
    let unset = || "(unset)".to_string();
    vec![
        ("api_base", config.api_base().to_string()),
        (
            "upstream",
            config.upstream().map(|r| r.to_string()).unwrap_or_else(unset),
        ),
        (
            "fork.owner",
            config
                .fork_organization()
                .map(str::to_string)
                .unwrap_or_else(|| "(authenticated user)".to_string()),
        ),
        (
            "fork.name",
            config
                .fork_name()
                .map(str::to_string)
                .unwrap_or_else(|| "(upstream name)".to_string()),
        ),
        ("catalog.mods_dir", config.mods_dir().to_string()),
        ("catalog.blacklist_path", config.blacklist_path().to_string()),
        ("catalog.manifest_name", config.manifest_name().to_string()),
        ("fork_poll.attempts", config.fork_poll_attempts().to_string()),
        (
            "fork_poll.delay_ms",
            config.fork_poll_delay().as_millis().to_string(),
        ),
        ("secrets.provider", config.secrets_provider().to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn value<'a>(values: &'a [(&str, String)], key: &str) -> &'a str {
        values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn defaults_are_listed() {
        let values = effective_values(&Config::default());
        assert_eq!(value(&values, "api_base"), "https://api.github.com");
        assert_eq!(value(&values, "upstream"), "(unset)");
        assert_eq!(value(&values, "catalog.mods_dir"), "mods");
        assert_eq!(value(&values, "fork_poll.delay_ms"), "2000");
    }

    #[test]
    fn file_values_override_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[upstream]\nowner = \"mod-catalog\"\nrepo = \"catalog\"\n\n[fork]\nowner = \"my-org\"\n",
        )
        .unwrap();

        let values = effective_values(&Config::load_from(&path).unwrap());
        assert_eq!(value(&values, "upstream"), "mod-catalog/catalog");
        assert_eq!(value(&values, "fork.owner"), "my-org");
    }
}

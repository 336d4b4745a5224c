//! CLI configuration: thin wrapper around `somfly_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--host, --password, etc.).

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::warn;

use somfly_config::ConfigError;
use somfly_core::ControllerConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use somfly_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Build the runtime config from the config file, profile, and flags.
///
/// Flags take priority over the profile. Without any profile, `--host`
/// alone is enough: everything else falls back to vendor defaults.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<ControllerConfig, CliError> {
    let profile = match somfly_config::select_profile(cfg, global.profile.as_deref()) {
        Ok((_, profile)) => profile.clone(),
        // An explicit --profile must exist; the implicit default may not.
        Err(ConfigError::ProfileNotFound { name }) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(cfg),
            });
        }
        Err(ConfigError::ProfileNotFound { .. }) => {
            if global.host.is_none() {
                return Err(CliError::NoConfig {
                    path: config_path().display().to_string(),
                });
            }
            Profile::default()
        }
        Err(e) => return Err(e.into()),
    };
    resolve_profile(&profile, &cfg.defaults, global)
}

/// Apply flag overrides to `profile`, then translate it.
pub fn resolve_profile(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if global.port.is_some() {
        profile.port = global.port;
    }
    if global.username.is_some() {
        profile.username.clone_from(&global.username);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }

    let mut config = somfly_config::profile_to_controller_config(&profile, defaults)?;
    if let Some(ref password) = global.password {
        config.password = SecretString::from(password.clone());
    }
    if config.timeout.is_zero() {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(config)
}

/// Fill `--output` and `--color` from `[defaults]` where no flag was given.
/// Unrecognized values are reported and left to the built-in default.
pub fn apply_display_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = parse_default::<OutputFormat>("output", &defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_default::<ColorMode>("color", &defaults.color);
    }
}

fn parse_default<T: ValueEnum>(key: &str, value: &str) -> Option<T> {
    match T::from_str(value, true) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value, "ignoring unrecognized config default");
            None
        }
    }
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["somfly"];
        argv.extend_from_slice(args);
        argv.push("ping");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_home() -> Config {
        let mut cfg = Config {
            default_profile: Some("home".into()),
            ..Config::default()
        };
        cfg.profiles.insert(
            "home".into(),
            Profile {
                host: "10.1.1.50".into(),
                password: Some("from-profile".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with_home();
        let resolved = resolve(
            &global(&["--host", "10.9.9.9", "--port", "2323", "--password", "flag"]),
            &cfg,
        )
        .unwrap();
        assert_eq!(resolved.host, "10.9.9.9");
        assert_eq!(resolved.port, 2323);
        assert_eq!(resolved.password.expose_secret(), "flag");
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let resolved = resolve(&global(&[]), &config_with_home()).unwrap();
        assert_eq!(resolved.host, "10.1.1.50");
        assert_eq!(resolved.password.expose_secret(), "from-profile");
        assert_eq!(resolved.timeout, Duration::from_secs(10));
    }

    #[test]
    fn host_flag_works_without_a_profile() {
        let resolved = resolve(&global(&["--host", "shades.lan"]), &Config::default()).unwrap();
        assert_eq!(resolved.host, "shades.lan");
        assert_eq!(resolved.username, "Telnet 1");
    }

    #[test]
    fn nothing_configured_is_a_usage_error() {
        let err = resolve(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn explicit_unknown_profile_lists_the_known_ones() {
        let err = resolve(&global(&["--profile", "attic"]), &config_with_home()).unwrap_err();
        assert!(
            matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "home")
        );
    }

    #[test]
    fn display_defaults_fill_absent_flags() {
        let defaults = Defaults {
            output: "json-compact".into(),
            color: "never".into(),
            ..Defaults::default()
        };
        let mut opts = global(&[]);
        apply_display_defaults(&mut opts, &defaults);
        assert_eq!(opts.output(), OutputFormat::JsonCompact);
        assert_eq!(opts.color(), ColorMode::Never);

        let mut opts = global(&["-o", "yaml", "--color", "always"]);
        apply_display_defaults(&mut opts, &defaults);
        assert_eq!(opts.output(), OutputFormat::Yaml);
        assert_eq!(opts.color(), ColorMode::Always);
    }

    #[test]
    fn unknown_display_default_falls_back() {
        let defaults = Defaults {
            output: "sparkles".into(),
            ..Defaults::default()
        };
        let mut opts = global(&[]);
        apply_display_defaults(&mut opts, &defaults);
        assert_eq!(opts.output(), OutputFormat::Table);
        assert_eq!(opts.color(), ColorMode::Auto);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = resolve(&global(&["--host", "x", "--timeout", "0"]), &Config::default())
            .unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "timeout"));
    }
}

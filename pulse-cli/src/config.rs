use std::path::Path;

use pulse::PulseConfig;
use serde::Serialize;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};

/// Values given on the command line, applied over every other source
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Layer defaults, the optional YAML file, `PULSE_` environment variables and command line
/// overrides, in that order.
pub fn figment(path: Option<&Path>, overrides: &Overrides) -> Figment {
    let figment = Figment::new().merge(Serialized::defaults(PulseConfig::default()));

    let figment = match path {
        Some(path) => figment.merge(Yaml::file(path)),
        None => figment,
    };

    figment
        .merge(Env::prefixed("PULSE_"))
        .merge(Serialized::defaults(overrides))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use figment::Jail;
    use pulse::{config::Method, PulseError};

    use super::*;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config: PulseConfig = figment(None, &Overrides::default()).extract()?;
            assert_eq!(config, PulseConfig::default());
            Ok(())
        });
    }

    #[test]
    fn file_then_env_then_cli() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "pulse.yaml",
                "timeout: 3000\ntick: 50\nmethod: get\nfollow_redirects: false\n",
            )?;
            jail.set_env("PULSE_TICK", "40");

            let overrides = Overrides {
                timeout: Some(1500),
                ..Default::default()
            };
            let config: PulseConfig =
                figment(Some(Path::new("pulse.yaml")), &overrides).extract()?;

            assert_eq!(config.timeout, Duration::from_millis(1500));
            assert_eq!(config.tick, Duration::from_millis(40));
            assert_eq!(config.method, Method::Get);
            assert!(!config.follow_redirects);
            Ok(())
        });
    }

    #[test]
    fn zero_tick_from_the_command_line_is_rejected() {
        Jail::expect_with(|_jail| {
            let overrides = Overrides {
                tick: Some(0),
                ..Default::default()
            };
            let error = PulseConfig::from_figment(&figment(None, &overrides)).unwrap_err();
            assert!(matches!(error, PulseError::InvalidConfig { field: "tick", .. }));
            Ok(())
        });
    }

    #[test]
    fn bad_method_is_rejected() {
        Jail::expect_with(|_jail| {
            let overrides = Overrides {
                method: Some("post".to_string()),
                ..Default::default()
            };
            assert!(figment(None, &overrides).extract::<PulseConfig>().is_err());
            Ok(())
        });
    }
}

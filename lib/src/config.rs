use crate::consts::*;
use crate::errors::*;
use crate::util::*;

use std::collections::HashMap;

use serde::Deserialize;
use serde::Deserializer;
use smart_default::SmartDefault;

make_log_macro!(debug, "config");

/// Per-controller tuning knobs.
#[derive(Deserialize, Clone, Debug, SmartDefault)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    /// Microseconds to wait between the steps of a ramped write, for
    /// controllers that need settling time between updates.
    #[default(0)]
    #[serde(deserialize_with = "deserialize_usec")]
    pub usec: u64,
}

fn deserialize_usec<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let usec = Deserialize::deserialize(deserializer)?;
    debug!("{:?}", usec);

    if !SETTLING_USEC_RANGE.contains(&usec) {
        return Err(serde::de::Error::invalid_value(
            serde::de::Unexpected::Unsigned(usec),
            &"number of microseconds between 0 and 1000000",
        ));
    }

    Ok(usec)
}

/// Optional on-disk configuration: a `[global]` table of defaults plus
/// per-controller override tables.
#[derive(Deserialize, Clone, SmartDefault)]
#[serde(default)]
pub struct LumenConfig {
    global: ControllerConfig,
    #[serde(flatten)]
    overrides: HashMap<String, ControllerConfig>,
}

impl LumenConfig {
    pub async fn new() -> Result<Self> {
        if let Some(config_path) = find_config_file() {
            deserialize_toml_file(config_path).await
        } else {
            Ok(LumenConfig::default())
        }
    }

    pub(crate) fn controller(&self, name: &str) -> ControllerConfig {
        if let Some(config) = self.overrides.get(name) {
            debug!("using overrides for {name}");
            config.clone()
        } else {
            debug!("using global config for {name}");
            self.global.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_beat_the_global_table() {
        let config: LumenConfig = toml::from_str(
            "[global]\nusec = 100\n\n[sysfs0]\nusec = 4000\n",
        )
        .unwrap();
        assert_eq!(config.controller("sysfs0").usec, 4000);
        assert_eq!(config.controller("other").usec, 100);
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let config = LumenConfig::default();
        assert_eq!(config.controller("anything").usec, 0);
    }

    #[test]
    fn out_of_range_usec_is_rejected() {
        assert!(toml::from_str::<LumenConfig>("[global]\nusec = 2000000\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<LumenConfig>("[global]\nseconds = 1\n").is_err());
    }
}

#![warn(clippy::match_same_arms)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::unnecessary_wraps)]

//! Get and set the brightness of display and keyboard backlight
//! controllers exposed under sysfs, in raw hardware units or as a linear
//! or exponential percentage. A small cache namespace persists the
//! per-controller minimum cap and saved-brightness snapshots across
//! reboots.
//!
//! Concurrent invocations against the same controller are not
//! coordinated and can race; the last write wins.

#[macro_use]
mod util;
mod config;
mod consts;
mod ctrl;
mod errors;
mod exec;
mod path;
mod storage;
pub mod value;

use std::path::PathBuf;
use std::time::Duration;

pub use crate::config::{ControllerConfig, LumenConfig};
use crate::consts::*;
pub use crate::errors::LumenError;
use crate::errors::*;
use crate::exec::Executor;
pub use crate::exec::{Field, OpMode, Request};
use crate::path::PathResolver;
pub use crate::path::Target;
pub use crate::value::{clamp_percent, ValueMode};

make_log_macro!(debug, "lumen");
make_log_macro!(error, "lumen");

/// How the controller to act on is chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CtrlMode {
    /// Use the controller with the highest maximum brightness.
    #[default]
    Auto,
    /// Use the named controller.
    Specify(String),
    /// Repeat the operation on every controller.
    All,
}

/// Used to construct [`Lumen`].
#[derive(Default)]
pub struct LumenBuilder {
    target: Target,
    ctrl_mode: CtrlMode,
    config: Option<LumenConfig>,
    sys_prefix: Option<PathBuf>,
    cache_prefix: Option<PathBuf>,
}

impl LumenBuilder {
    /// Create a new [`LumenBuilder`].
    pub fn new() -> Self {
        LumenBuilder::default()
    }

    /// Defaults to [`Target::Backlight`].
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Defaults to [`CtrlMode::Auto`].
    pub fn with_controller_mode(mut self, ctrl_mode: CtrlMode) -> Self {
        self.ctrl_mode = ctrl_mode;
        self
    }

    /// Defaults to [`LumenConfig::new()`].
    pub fn with_config(mut self, config: LumenConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the sysfs namespace the target implies.
    pub fn with_sys_prefix(mut self, sys_prefix: impl Into<PathBuf>) -> Self {
        self.sys_prefix = Some(sys_prefix.into());
        self
    }

    /// Override the prefix cache files are named under.
    pub fn with_cache_prefix(mut self, cache_prefix: impl Into<PathBuf>) -> Self {
        self.cache_prefix = Some(cache_prefix.into());
        self
    }

    /// Returns the constructed [`Lumen`] instance.
    pub async fn build(self) -> Result<Lumen> {
        let config = match self.config {
            Some(config) => config,
            None => LumenConfig::new().await?,
        };
        let sys_prefix = self
            .sys_prefix
            .unwrap_or_else(|| self.target.sys_prefix().to_path_buf());
        let cache_prefix = self.cache_prefix.unwrap_or_else(default_cache_prefix);

        Ok(Lumen {
            resolver: PathResolver::new(sys_prefix, cache_prefix),
            ctrl_mode: self.ctrl_mode,
            config,
        })
    }
}

fn default_cache_prefix() -> PathBuf {
    dirs::cache_dir().map_or_else(|| PathBuf::from(SYSTEM_CACHE_PREFIX), |dir| dir.join(PROG))
}

/// Executes operations against one or many backlight controllers.
pub struct Lumen {
    resolver: PathResolver,
    ctrl_mode: CtrlMode,
    config: LumenConfig,
}

impl Lumen {
    /// Run a single request, dispatching on the controller mode.
    pub async fn run(&self, request: &Request) -> Result<()> {
        match &self.ctrl_mode {
            CtrlMode::All => self.run_all(request).await,
            CtrlMode::Specify(name) => self.execute(name, request).await,
            CtrlMode::Auto => {
                let (name, max) = ctrl::auto_select(self.resolver.sys_prefix()).await?;
                debug!("auto-selected controller '{name}'");
                let request = Request {
                    cached_max: Some(max),
                    ..request.clone()
                };
                self.execute(&name, &request).await
            }
        }
    }

    /// Repeat the request across every controller. Failures are logged
    /// and skipped; the overall result only succeeds when every
    /// controller did.
    async fn run_all(&self, request: &Request) -> Result<()> {
        let names = ctrl::enumerate(self.resolver.sys_prefix()).await?;
        let mut failed = false;
        for name in names {
            if request.op == OpMode::Get {
                print!("{name}\t");
            }
            if let Err(e) = self.execute(&name, request).await {
                error!("'{name}': {e}");
                failed = true;
            }
        }
        if failed {
            Err(LumenError::Other(
                "operation failed on one or more controllers".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn execute(&self, name: &str, request: &Request) -> Result<()> {
        let delay = Duration::from_micros(self.config.controller(name).usec);
        Executor::new(&self.resolver, delay).run(name, request).await
    }

    /// Names of the controllers available for the configured target.
    pub async fn list_controllers(&self) -> Result<Vec<String>> {
        ctrl::enumerate(self.resolver.sys_prefix()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_controller(root: &std::path::Path, name: &str, curr: u64, max: u64) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("brightness"), curr.to_string()).unwrap();
        std::fs::write(dir.join("max_brightness"), max.to_string()).unwrap();
    }

    async fn lumen(tmp: &TempDir, ctrl_mode: CtrlMode) -> Lumen {
        LumenBuilder::new()
            .with_controller_mode(ctrl_mode)
            .with_config(LumenConfig::default())
            .with_sys_prefix(tmp.path().join("sys"))
            .with_cache_prefix(tmp.path().join("cache").join("lumen"))
            .build()
            .await
            .unwrap()
    }

    fn read_brightness(tmp: &TempDir, name: &str) -> u64 {
        std::fs::read_to_string(tmp.path().join("sys").join(name).join("brightness"))
            .unwrap()
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn auto_mode_targets_the_brightest_controller() {
        let tmp = TempDir::new().unwrap();
        add_controller(&tmp.path().join("sys"), "small", 10, 255);
        add_controller(&tmp.path().join("sys"), "large", 10, 1023);

        let lumen = lumen(&tmp, CtrlMode::Auto).await;
        let request = Request::new(Field::Brightness, OpMode::Set, ValueMode::Raw, 100);
        lumen.run(&request).await.unwrap();

        assert_eq!(read_brightness(&tmp, "large"), 100);
        assert_eq!(read_brightness(&tmp, "small"), 10);
    }

    #[tokio::test]
    async fn all_mode_touches_every_controller() {
        let tmp = TempDir::new().unwrap();
        add_controller(&tmp.path().join("sys"), "one", 10, 255);
        add_controller(&tmp.path().join("sys"), "two", 20, 255);

        let lumen = lumen(&tmp, CtrlMode::All).await;
        let request = Request::new(Field::Brightness, OpMode::Set, ValueMode::Raw, 50);
        lumen.run(&request).await.unwrap();

        assert_eq!(read_brightness(&tmp, "one"), 50);
        assert_eq!(read_brightness(&tmp, "two"), 50);
    }

    #[tokio::test]
    async fn all_mode_keeps_going_past_failures() {
        let tmp = TempDir::new().unwrap();
        add_controller(&tmp.path().join("sys"), "good", 10, 255);
        // A controller directory without any readable files
        std::fs::create_dir_all(tmp.path().join("sys").join("bad")).unwrap();

        let lumen = lumen(&tmp, CtrlMode::All).await;
        let request = Request::new(Field::Brightness, OpMode::Set, ValueMode::Raw, 50);
        assert!(lumen.run(&request).await.is_err());

        // The good controller was still written
        assert_eq!(read_brightness(&tmp, "good"), 50);
    }

    #[tokio::test]
    async fn specify_mode_validates_the_name() {
        let tmp = TempDir::new().unwrap();
        add_controller(&tmp.path().join("sys"), "good", 10, 255);

        let lumen = lumen(&tmp, CtrlMode::Specify("../good".to_string())).await;
        let request = Request::new(Field::Brightness, OpMode::Get, ValueMode::Raw, 0);
        assert!(matches!(
            lumen.run(&request).await,
            Err(LumenError::InvalidController(_))
        ));
    }

    #[tokio::test]
    async fn list_controllers_reports_every_entry() {
        let tmp = TempDir::new().unwrap();
        add_controller(&tmp.path().join("sys"), "b", 1, 2);
        add_controller(&tmp.path().join("sys"), "a", 1, 2);

        let lumen = lumen(&tmp, CtrlMode::Auto).await;
        assert_eq!(lumen.list_controllers().await.unwrap(), ["a", "b"]);
    }
}

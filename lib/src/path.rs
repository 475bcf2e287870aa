//! Maps a controller and field to a location on disk.
//!
//! Brightness and max brightness live in the sysfs namespace the target
//! implies; mincap and the saved-brightness snapshot live in a persisted
//! cache namespace that survives reboots.

use std::path::{Path, PathBuf};

use crate::consts::*;
use crate::errors::*;
use crate::exec::Field;

/// Which class of controller to operate on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Target {
    /// Display backlights under `/sys/class/backlight`.
    #[default]
    Backlight,
    /// Keyboard leds under `/sys/class/leds`.
    Keyboard,
}

impl Target {
    pub(crate) fn sys_prefix(self) -> &'static Path {
        match self {
            Target::Backlight => Path::new(BACKLIGHT_PATH),
            Target::Keyboard => Path::new(KEYBOARD_PATH),
        }
    }
}

/// Resolves fields to the live sysfs namespace or the cache namespace.
#[derive(Clone, Debug)]
pub(crate) struct PathResolver {
    sys_prefix: PathBuf,
    cache_prefix: PathBuf,
}

impl PathResolver {
    pub(crate) fn new(sys_prefix: PathBuf, cache_prefix: PathBuf) -> Self {
        Self {
            sys_prefix,
            cache_prefix,
        }
    }

    pub(crate) fn sys_prefix(&self) -> &Path {
        &self.sys_prefix
    }

    /// Resolve the file backing `field` for the given controller.
    pub(crate) fn resolve(&self, ctrl: &str, field: Field) -> Result<PathBuf> {
        if !path_component(ctrl) {
            return Err(LumenError::InvalidController(ctrl.to_string()));
        }
        let path = match field {
            Field::Brightness => self.sys_prefix.join(ctrl).join(FILE_BRIGHTNESS),
            Field::MaxBrightness => self.sys_prefix.join(ctrl).join(FILE_MAX_BRIGHTNESS),
            Field::MinCap => self.cache_file(ctrl, CACHE_MINCAP),
            Field::SaveRestore => self.cache_file(ctrl, CACHE_SAVED),
        };
        Ok(path)
    }

    /// Cache files are dot-separated siblings of the prefix, named so
    /// that the mincap and saved-brightness entries for one controller
    /// never collide.
    fn cache_file(&self, ctrl: &str, kind: &str) -> PathBuf {
        let mut name = self.cache_prefix.as_os_str().to_os_string();
        name.push(format!(".{ctrl}.{kind}"));
        PathBuf::from(name)
    }
}

/// A controller name must be a single path component: no separators and
/// no parent-directory segments.
pub(crate) fn path_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

use std::ops::RangeInclusive;

/// Program name, used for cache and config locations
pub const PROG: &str = "lumen";

/// Location of display backlight controllers
pub const BACKLIGHT_PATH: &str = "/sys/class/backlight";

/// Location of keyboard led controllers
pub const KEYBOARD_PATH: &str = "/sys/class/leds";

/// Filename for a controller's current brightness
pub const FILE_BRIGHTNESS: &str = "brightness";

/// Filename for a controller's max brightness
pub const FILE_MAX_BRIGHTNESS: &str = "max_brightness";

/// Suffix for the per-controller mincap cache file
pub const CACHE_MINCAP: &str = "mincap";

/// Suffix for the per-controller saved-brightness cache file
pub const CACHE_SAVED: &str = "brightness";

/// Cache prefix used when no user cache directory exists
pub const SYSTEM_CACHE_PREFIX: &str = "/var/cache/lumen";

/// Full scale of the fixed-point percentage, in hundredths of a percent
pub const PCT_MAX: u64 = 10_000;

/// Range of valid values for `usec`
pub const SETTLING_USEC_RANGE: RangeInclusive<u64> = 0..=1_000_000;

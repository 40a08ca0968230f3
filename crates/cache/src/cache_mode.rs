use std::env;
use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

pub const CACHE_MODE_ENV_VAR: &str = "ORBIT_CACHE";

static WARNED_UNKNOWN: AtomicBool = AtomicBool::new(false);

static FORCED_MODE: OnceLock<CacheMode> = OnceLock::new();

/// Which cache operations are permitted for this process. Applies to the
/// local task cache, the remote cache and the project graph cache.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CacheMode {
    Off,
    Read,
    #[default]
    ReadWrite,
    Write,
}

impl CacheMode {
    pub const ALL: [CacheMode; 4] = [
        CacheMode::Off,
        CacheMode::Read,
        CacheMode::ReadWrite,
        CacheMode::Write,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMode::Off => "off",
            CacheMode::Read => "read",
            CacheMode::ReadWrite => "read-write",
            CacheMode::Write => "write",
        }
    }

    /// Parse an env value. Unknown values fall back to read-write, and are
    /// only warned about once per process.
    pub fn parse(value: &str) -> CacheMode {
        let value = value.trim().to_lowercase();

        if let Some(mode) = Self::ALL.into_iter().find(|mode| mode.as_str() == value) {
            return mode;
        }

        if !WARNED_UNKNOWN.swap(true, Ordering::Relaxed) {
            warn!(
                value = value.as_str(),
                "Unknown {CACHE_MODE_ENV_VAR} value, falling back to read-write mode"
            );
        }

        CacheMode::ReadWrite
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, CacheMode::Read | CacheMode::ReadWrite)
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, CacheMode::Write | CacheMode::ReadWrite)
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Force a cache mode for the rest of the process, taking precedence over
/// the environment. Used by `--skip-cache`. Only the first call has an effect.
pub fn force_cache_mode(mode: CacheMode) {
    let _ = FORCED_MODE.set(mode);
}

pub fn get_cache_mode() -> CacheMode {
    if let Some(mode) = FORCED_MODE.get() {
        return *mode;
    }

    match env::var(CACHE_MODE_ENV_VAR) {
        Ok(value) => CacheMode::parse(&value),
        Err(_) => CacheMode::ReadWrite,
    }
}

use std::env;
use std::sync::OnceLock;

pub fn has_env_var(key: &str) -> bool {
    match env::var(key) {
        Ok(var) => !var.is_empty(),
        Err(_) => false,
    }
}

#[inline]
pub fn is_test_env() -> bool {
    static TEST_CACHE: OnceLock<bool> = OnceLock::new();

    *TEST_CACHE.get_or_init(|| {
        has_env_var("ORBIT_TEST") || has_env_var("STARBASE_TEST") || has_env_var("NEXTEST")
    })
}

#[inline]
pub fn is_formatted_output() -> bool {
    env::args().any(|arg| arg == "--json" || arg == "--dot")
}

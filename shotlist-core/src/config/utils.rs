//! Configuration utility functions
//!
//! Helpers for reading typed overrides from environment variables. A missing
//! or unparsable value falls back to the supplied default.

use std::str::FromStr;

fn get_env_parsed<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid value {:?} for {}", val, key);
            default
        }),
        Err(_) => default,
    }
}

/// Get a f64 value from an environment variable or use the default
pub fn get_env_f64(key: &str, default: f64) -> f64 {
    get_env_parsed(key, default)
}

/// Get a u32 value from an environment variable or use the default
pub fn get_env_u32(key: &str, default: u32) -> u32 {
    get_env_parsed(key, default)
}

/// Get a u64 value from an environment variable or use the default
pub fn get_env_u64(key: &str, default: u64) -> u64 {
    get_env_parsed(key, default)
}

/// Get a usize value from an environment variable or use the default
pub fn get_env_usize(key: &str, default: usize) -> usize {
    get_env_parsed(key, default)
}

/// Get an optional string value; empty strings count as unset.
pub fn get_env_opt_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_uses_default() {
        assert_eq!(get_env_f64("SHOTLIST_TEST_UNSET_F64", 1.5), 1.5);
        assert_eq!(get_env_u32("SHOTLIST_TEST_UNSET_U32", 7), 7);
        assert!(get_env_opt_string("SHOTLIST_TEST_UNSET_STR").is_none());
    }

    #[test]
    fn invalid_value_uses_default() {
        // Unique key so parallel tests do not interfere.
        unsafe { std::env::set_var("SHOTLIST_TEST_BAD_USIZE", "lots") };
        assert_eq!(get_env_usize("SHOTLIST_TEST_BAD_USIZE", 12), 12);
        unsafe { std::env::remove_var("SHOTLIST_TEST_BAD_USIZE") };
    }
}

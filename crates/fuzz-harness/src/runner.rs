//! Fuzz run configuration
//!
//! Case counts default low enough for `cargo test` and can be raised for
//! soak runs with `FUZZ_CASES`.

/// Default cases per property
const DEFAULT_CASES: u32 = 256;

/// Default shrink iterations on failure
const DEFAULT_MAX_SHRINK_ITERS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzConfig {
    /// Number of test cases to run
    pub cases: u32,
    /// Maximum shrink iterations on failure
    pub max_shrink_iters: u32,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            cases: DEFAULT_CASES,
            max_shrink_iters: DEFAULT_MAX_SHRINK_ITERS,
        }
    }
}

impl FuzzConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with `FUZZ_CASES` overriding the case count when it parses
    pub fn from_env() -> Self {
        let cases = std::env::var("FUZZ_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CASES);
        Self::default().cases(cases)
    }

    pub fn cases(mut self, n: u32) -> Self {
        self.cases = n.max(1);
        self
    }

    pub fn max_shrink_iters(mut self, n: u32) -> Self {
        self.max_shrink_iters = n;
        self
    }

    /// Generate proptest config from this
    pub fn to_proptest_config(&self) -> proptest::test_runner::Config {
        proptest::test_runner::Config {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..proptest::test_runner::Config::default()
        }
    }
}

/// Proptest config for the workspace's property tests
pub fn fuzz_config() -> proptest::test_runner::Config {
    FuzzConfig::from_env().to_proptest_config()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = FuzzConfig::new().cases(0).max_shrink_iters(10);
        assert_eq!(config.cases, 1);
        let pt = config.to_proptest_config();
        assert_eq!(pt.cases, 1);
        assert_eq!(pt.max_shrink_iters, 10);
    }
}

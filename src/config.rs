/// Integrity layers and allocation limits, fixed when a list is built.
///
/// The cheap cardinality and sentinel checks always run. Everything
/// else can be switched off for speed.
///
/// ```
/// use cachelist::{Config, List};
///
/// let config = Config::fast().with_hashing(true).with_max_slots(64);
/// let list: List<u8> = List::with_config(8, config).unwrap();
/// assert!(list.config().hashing);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// Canary words around the list header and guard cells around the
    /// slot array.
    pub canaries: bool,
    /// crc32 over the slot array and over the header.
    pub hashing: bool,
    /// Full walks of the active and free chains.
    pub deep_checks: bool,
    /// Upper bound on the backing array length, sentinel included.
    /// Larger requests fail with `ListError::AllocFailed`.
    pub max_slots: Option<usize>,
}

impl Config {
    /// Every layer on.
    pub const fn paranoid() -> Self {
        Config {
            canaries: true,
            hashing: true,
            deep_checks: true,
            max_slots: None,
        }
    }

    /// Only the O(1) checks.
    pub const fn fast() -> Self {
        Config {
            canaries: false,
            hashing: false,
            deep_checks: false,
            max_slots: None,
        }
    }

    pub const fn with_canaries(mut self, on: bool) -> Self {
        self.canaries = on;
        self
    }

    pub const fn with_hashing(mut self, on: bool) -> Self {
        self.hashing = on;
        self
    }

    pub const fn with_deep_checks(mut self, on: bool) -> Self {
        self.deep_checks = on;
        self
    }

    pub const fn with_max_slots(mut self, slots: usize) -> Self {
        self.max_slots = Some(slots);
        self
    }

    /// True if anything beyond the O(1) checks is enabled.
    pub const fn any_integrity(&self) -> bool {
        self.canaries || self.hashing || self.deep_checks
    }

    pub(crate) fn allows(&self, slots: usize) -> bool {
        self.max_slots.map_or(true, |max| slots <= max)
    }
}

impl Default for Config {
    /// [`Config::paranoid`] in debug builds, [`Config::fast`] otherwise.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Config::paranoid()
        } else {
            Config::fast()
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn builder_overrides_preset() {
        let config = Config::paranoid().with_canaries(false).with_max_slots(10);
        assert!(!config.canaries);
        assert!(config.hashing);
        assert!(config.allows(10));
        assert!(!config.allows(11));
        assert!(Config::fast().allows(usize::MAX));
        assert!(!Config::fast().any_integrity());
    }
}

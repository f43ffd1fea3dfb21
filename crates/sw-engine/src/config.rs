//! Engine configuration.

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Feature flag. A disabled engine refuses to evaluate.
    pub enabled: bool,
    /// Unarmored base armor class, before the DEX modifier.
    pub base_armor_class: i32,
    /// Attunement capacity before any effect raises it.
    pub attunement_slots: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_armor_class: 10,
            attunement_slots: 3,
        }
    }
}

impl EngineConfig {
    /// Turn the engine on or off.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the unarmored base armor class.
    pub fn with_base_armor_class(mut self, base: i32) -> Self {
        self.base_armor_class = base;
        self
    }

    /// Set the initial attunement capacity.
    pub fn with_attunement_slots(mut self, slots: u32) -> Self {
        self.attunement_slots = slots;
        self
    }

    /// Interpret a feature-flag value such as `SHEETWRIGHT_ENGINE`.
    ///
    /// `off`, `0`, `false` and `no` disable the engine; anything else
    /// (including an unset variable) leaves it on.
    pub fn flag_enabled(value: Option<&str>) -> bool {
        !matches!(
            value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("off" | "0" | "false" | "no")
        )
    }
}

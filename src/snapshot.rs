//! Point-in-time view of the container for diagnostics.

/// What the container holds at one moment.
///
/// Override names are sorted; scope figures count live entries only.
///
/// # Examples
///
/// ```
/// use injectable::container;
///
/// let snapshot = container().snapshot();
/// println!("{} overrides, {} shared", snapshot.overrides.len(), snapshot.shared);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegistrySnapshot {
    /// Services with a zero-argument override
    pub overrides: Vec<&'static str>,
    /// Services with an argument-aware override
    pub argument_overrides: Vec<&'static str>,
    /// Entries in the application scope
    pub application: usize,
    /// Entries in the cached scope
    pub cached: usize,
    /// Live entries in the shared scope
    pub shared: usize,
}

impl RegistrySnapshot {
    /// Total number of registered overrides across both tables.
    pub fn override_count(&self) -> usize {
        self.overrides.len() + self.argument_overrides.len()
    }

    /// Serializes the snapshot as pretty-printed JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

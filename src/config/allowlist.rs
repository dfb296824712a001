// Origin allowlist module
// Exact-match set of origins permitted cross-origin access

use indexmap::IndexSet;

use crate::logger;

/// Ordered set of exact origin strings, frozen at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    origins: IndexSet<String>,
}

impl Allowlist {
    /// Parse a JSON array of strings.
    ///
    /// Anything that is not a JSON array of strings yields an empty allowlist,
    /// so no cross-origin caller is ever allowed.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        match serde_json::from_str::<Vec<String>>(trimmed) {
            Ok(origins) => origins.into_iter().collect(),
            Err(e) => {
                logger::log_warning(&format!(
                    "Ignoring malformed origin allowlist ({e}); cross-origin access disabled"
                ));
                Self::default()
            }
        }
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.origins.contains(origin)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }
}

impl FromIterator<String> for Allowlist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            origins: iter.into_iter().filter(|o| !o.is_empty()).collect(),
        }
    }
}

//! Product code → pack size lookup.
//!
//! One sold unit of a combo product code ships as several physical packages.
//! The built-in table mirrors the store's current catalogue; a `[pack_sizes]`
//! section in the recon config replaces it wholesale.

use std::collections::BTreeMap;

use serde::Deserialize;

pub const BUILTIN_VERSION: &str = "2025.1";

/// Largest pack size a config may declare.
pub const MAX_PACK_SIZE: u32 = 10_000;

const BUILTIN_SIZES: &[(&str, u32)] = &[
    ("qklcp1", 1),
    ("jgcp1", 1),
    ("sgcp1", 1),
    ("bkymcp", 1),
    ("bkqjsy04", 4),
    ("bkqjy06", 6),
    ("bkqsy06", 6),
    ("bkym20", 20),
    ("bkym4", 4),
    ("bkym6", 6),
    ("bkymcp03", 3),
    ("hhcxzcp03", 3),
    ("bkymjg06", 6),
    ("bkymsg06", 6),
    ("bkysj06", 6),
    ("jgcp20", 20),
    ("jgcp3", 3),
    ("jgcp4", 4),
    ("jgcp6", 6),
    ("qkl3jg3", 6),
    ("qkl3sg3", 6),
    ("qklcp2", 2),
    ("qklcp20", 20),
    ("qklcp3", 3),
    ("qklcp4", 4),
    ("qklcp6", 6),
    ("qkljg3", 3),
    ("sgcp20", 20),
    ("sgcp3", 3),
    ("sgcp4", 4),
    ("sgcp6", 6),
];

/// Case-insensitive pack size table. Keys are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "PackTableToml")]
pub struct PackTable {
    version: String,
    sizes: BTreeMap<String, u32>,
    /// Lowercased codes that appeared more than once; the last size won.
    duplicates: Vec<String>,
}

#[derive(Deserialize)]
struct PackTableToml {
    #[serde(default = "custom_version")]
    version: String,
    #[serde(default)]
    sizes: BTreeMap<String, u32>,
}

fn custom_version() -> String {
    "custom".into()
}

impl From<PackTableToml> for PackTable {
    fn from(t: PackTableToml) -> Self {
        Self::new(t.version, t.sizes)
    }
}

impl Default for PackTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PackTable {
    pub fn new<K: AsRef<str>>(version: impl Into<String>, sizes: impl IntoIterator<Item = (K, u32)>) -> Self {
        let mut table = Self {
            version: version.into(),
            sizes: BTreeMap::new(),
            duplicates: Vec::new(),
        };
        for (code, size) in sizes {
            let code = code.as_ref().trim().to_lowercase();
            if table.sizes.insert(code.clone(), size).is_some() && !table.duplicates.contains(&code) {
                table.duplicates.push(code);
            }
        }
        table
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_VERSION, BUILTIN_SIZES.iter().copied())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Codes that collided after case folding. A valid config has none.
    pub fn duplicate_codes(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Pack size for `code`, or `None` when the code is not in the table.
    pub fn lookup(&self, code: &str) -> Option<u32> {
        self.sizes.get(&code.trim().to_lowercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.sizes.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

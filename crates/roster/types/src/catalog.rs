//! Role catalogs
//!
//! The engine treats role names as opaque. A catalog is the caller's menu of
//! names an organizer may pick from when building a group.

use crate::RoleName;
use serde::{Deserialize, Serialize};

/// Generic "any role" option offered alongside named classes
pub const ANY_ROLE: &str = "Any Class";

/// Character classes offered by the reference deployment
const REFERENCE_CLASSES: [&str; 18] = [
    "Rune Knight",
    "Royal Guard",
    "Warlock",
    "Sorcerer",
    "Ranger",
    "Minstrel",
    "Wanderer",
    "Mechanic",
    "Genetic",
    "Arch Bishop",
    "Sura",
    "Guillotine Cross",
    "Shadow Chaser",
    "Kagerou",
    "Oboro",
    "Rebellion",
    "Soul Reaper",
    "Star Emperor",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCatalog {
    roles: Vec<RoleName>,
}

impl RoleCatalog {
    /// Build a catalog, dropping blanks and repeated names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roles: Vec<RoleName> = Vec::new();
        for name in names {
            let name: String = name.into();
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let role = RoleName::new(name);
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        Self { roles }
    }

    /// "Any Class" followed by the 18 reference classes
    pub fn reference() -> Self {
        Self::new(std::iter::once(ANY_ROLE).chain(REFERENCE_CLASSES))
    }

    pub fn contains(&self, role: &RoleName) -> bool {
        self.roles.contains(role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleName> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

//! Project-wide type lookup
//!
//! Resolves a field type string to the id (`<package-path>.<Name>`) of a
//! declared struct or interface. A qualified type (`store.Store`) resolves
//! only through its qualifier, an unqualified one only inside the declaring
//! package. There is no bare-name guess across packages.

use rustc_hash::{FxHashMap, FxHashSet};

use super::type_names::{normalize_field_type, type_qualifier};
use crate::shared::models::RawProject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredKind {
    Struct,
    Interface,
}

#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    /// `<short name or path>:<Name>` -> (id, kind); first declaration wins
    by_key: FxHashMap<String, (String, DeclaredKind)>,
    kinds: FxHashMap<String, DeclaredKind>,
    known_names: FxHashSet<String>,
}

impl TypeIndex {
    pub fn build(project: &RawProject) -> Self {
        let mut index = Self::default();
        for pkg in &project.packages {
            let declared = pkg
                .interfaces
                .iter()
                .map(|t| (t, DeclaredKind::Interface))
                .chain(pkg.structs.iter().map(|t| (t, DeclaredKind::Struct)));
            for (ty, kind) in declared {
                let id = format!("{}.{}", pkg.path(), ty.name);
                for key in [pkg.name.as_str(), pkg.path()] {
                    index
                        .by_key
                        .entry(format!("{}:{}", key, ty.name))
                        .or_insert_with(|| (id.clone(), kind));
                }
                index.kinds.entry(id).or_insert(kind);
                index.known_names.insert(ty.name.clone());
            }
        }
        index
    }

    /// Id of the declared type `field_type` refers to from `package_path`
    pub fn resolve(&self, package_path: &str, field_type: &str) -> Option<&str> {
        let bare = normalize_field_type(field_type);
        if !self.known_names.contains(bare) {
            return None;
        }
        let key = match type_qualifier(field_type) {
            Some(qualifier) => format!("{}:{}", qualifier, bare),
            None => format!("{}:{}", package_path, bare),
        };
        self.by_key.get(&key).map(|(id, _)| id.as_str())
    }

    pub fn kind_of(&self, id: &str) -> Option<DeclaredKind> {
        self.kinds.get(id).copied()
    }

    pub fn is_struct(&self, id: &str) -> bool {
        self.kind_of(id) == Some(DeclaredKind::Struct)
    }
}

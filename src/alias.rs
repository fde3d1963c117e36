//! Import alias allocation.
//!
//! Every generated file imports the packages its type text references. Two
//! imported packages may share a default name (`errors` from the standard
//! library and `github.com/pkg/errors`, say), so names are allocated per
//! generating scope: the first path seen keeps the default name and later
//! colliding paths get an ascending numeric suffix (`errors2`, `errors3`).

use std::collections::{HashMap, HashSet};

/// Name chosen for one imported path within a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportName {
    /// Identifier the generated code uses for the package.
    pub name: String,
    /// Whether `name` differs from the default and must be written as an alias.
    pub is_alias: bool,
}

/// One import line of a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported package path.
    pub path: String,
    /// Identifier the generated code uses for the package.
    pub name: String,
    /// Whether the import must carry an explicit alias.
    pub is_alias: bool,
}

#[derive(Debug, Default)]
struct Scope {
    by_path: HashMap<String, ImportName>,
    taken: HashSet<String>,
}

/// Per-run table of import names, keyed by generating scope.
///
/// Created empty at the start of a run and threaded by `&mut` through every
/// call that renders type text.
#[derive(Debug, Default)]
pub struct ImportAliasTable {
    scopes: HashMap<String, Scope>,
}

impl ImportAliasTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier `scope` uses for `imported_path`, allocating one
    /// on first sight.
    pub fn alias_for(&mut self, scope: &str, imported_path: &str, default_name: &str) -> String {
        let scope = self.scopes.entry(scope.to_string()).or_default();
        if let Some(existing) = scope.by_path.get(imported_path) {
            return existing.name.clone();
        }

        let mut attempt: u64 = 1;
        let name = loop {
            let candidate = if attempt == 1 {
                default_name.to_string()
            } else {
                format!("{default_name}{attempt}")
            };
            if !scope.taken.contains(&candidate) {
                break candidate;
            }
            attempt += 1;
        };

        scope.taken.insert(name.clone());
        scope
            .by_path
            .insert(imported_path.to_string(), ImportName { name: name.clone(), is_alias: attempt > 1 });
        name
    }

    /// Returns a previous allocation without allocating.
    #[must_use]
    pub fn lookup(&self, scope: &str, imported_path: &str) -> Option<&ImportName> {
        self.scopes.get(scope).and_then(|s| s.by_path.get(imported_path))
    }

    /// Returns every import allocated in `scope`, sorted by path.
    #[must_use]
    pub fn export(&self, scope: &str) -> Vec<Import> {
        let Some(scope) = self.scopes.get(scope) else {
            return Vec::new();
        };
        let mut imports: Vec<Import> = scope
            .by_path
            .iter()
            .map(|(path, chosen)| Import {
                path: path.clone(),
                name: chosen.name.clone(),
                is_alias: chosen.is_alias,
            })
            .collect();
        imports.sort_by(|a, b| a.path.cmp(&b.path));
        imports
    }
}

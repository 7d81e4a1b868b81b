//! Plugin dependency graph
//!
//! Plugin declarations come from two groups (operator-managed and
//! user-managed). Each group maps a root "name:version" to the dependent
//! "name:version"s it requires. Both groups are ingested into one graph of
//! directed edges `root -> dependent`, each edge pinning a version.
//!
//! The graph is consistent when no plugin name is pinned to two different
//! versions anywhere in it, counting roots as pinning themselves. Only the
//! declared two levels are checked: the full transitive closure is computed
//! by whatever installs the plugins.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::plugin::{Plugin, PluginParseError};

/// Which declaration group a plugin entry came from.
///
/// Used only to make diagnostics point at the right field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluginOrigin {
    /// `spec.master.operatorPlugins`
    Operator,
    /// `spec.master.plugins`
    User,
}

impl fmt::Display for PluginOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator => write!(f, "operatorPlugins"),
            Self::User => write!(f, "plugins"),
        }
    }
}

/// A token that could not be parsed into a [`Plugin`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidPluginToken {
    /// Declaration group of the token
    pub origin: PluginOrigin,
    /// Root token the dependent was declared under, `None` if the root itself is bad
    pub root: Option<String>,
    /// Parse failure
    pub error: PluginParseError,
}

impl fmt::Display for InvalidPluginToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(
                f,
                "{}: dependent of root plugin '{}': {}",
                self.origin, root, self.error
            ),
            None => write!(f, "{}: root plugin: {}", self.origin, self.error),
        }
    }
}

/// One root's pin on a plugin name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    /// Pinned version
    pub version: String,
    /// Root plugin that pins it (a root pins itself)
    pub root: Plugin,
    /// Declaration groups the root appeared in; empty for a bare graph
    pub origins: Vec<PluginOrigin>,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' by '{}'", self.version, self.root)?;
        if !self.origins.is_empty() {
            let groups: Vec<String> = self.origins.iter().map(ToString::to_string).collect();
            write!(f, " ({})", groups.join(", "))?;
        }
        Ok(())
    }
}

/// One plugin name pinned to more than one version
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionConflict {
    /// Plugin name with incompatible pins
    pub name: String,
    /// Every pin on this name
    pub requirements: Vec<Requirement>,
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plugin '{}' is required at incompatible versions:", self.name)?;
        for requirement in &self.requirements {
            write!(f, " {requirement};")?;
        }
        Ok(())
    }
}

/// Merged dependency graph over both declaration groups
#[derive(Clone, Debug, Default)]
pub struct PluginGraph {
    dependencies: BTreeMap<Plugin, Vec<Plugin>>,
    origins: BTreeMap<Plugin, BTreeSet<PluginOrigin>>,
    invalid: Vec<InvalidPluginToken>,
}

impl PluginGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one declaration group into the graph.
    ///
    /// Parsing never stops at the first bad token: every invalid root and
    /// dependent is recorded so callers can report them all at once.
    pub fn ingest(&mut self, origin: PluginOrigin, declarations: &BTreeMap<String, Vec<String>>) {
        for (root_token, dependent_tokens) in declarations {
            let root = match root_token.parse::<Plugin>() {
                Ok(p) => Some(p),
                Err(error) => {
                    self.invalid.push(InvalidPluginToken {
                        origin,
                        root: None,
                        error,
                    });
                    None
                }
            };

            let mut dependents = Vec::with_capacity(dependent_tokens.len());
            for token in dependent_tokens {
                match token.parse::<Plugin>() {
                    Ok(p) => dependents.push(p),
                    Err(error) => self.invalid.push(InvalidPluginToken {
                        origin,
                        root: Some(root_token.clone()),
                        error,
                    }),
                }
            }

            if let Some(root) = root {
                self.origins.entry(root.clone()).or_default().insert(origin);
                let edges = self.dependencies.entry(root).or_default();
                for dependent in dependents {
                    if !edges.contains(&dependent) {
                        edges.push(dependent);
                    }
                }
            }
        }
    }

    /// Build a graph from both declaration groups
    pub fn from_groups(
        operator: &BTreeMap<String, Vec<String>>,
        user: &BTreeMap<String, Vec<String>>,
    ) -> Self {
        let mut graph = Self::new();
        graph.ingest(PluginOrigin::Operator, operator);
        graph.ingest(PluginOrigin::User, user);
        graph
    }

    /// Tokens that failed to parse, in declaration order
    pub fn invalid_tokens(&self) -> &[InvalidPluginToken] {
        &self.invalid
    }

    /// The merged `root -> dependents` mapping
    pub fn dependencies(&self) -> &BTreeMap<Plugin, Vec<Plugin>> {
        &self.dependencies
    }

    fn origins_of(&self, root: &Plugin) -> Vec<PluginOrigin> {
        self.origins
            .get(root)
            .map(|o| o.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Version conflicts across the merged graph, each pin tagged with the
    /// declaration groups of its root
    pub fn conflicts(&self) -> Vec<VersionConflict> {
        let mut conflicts = find_conflicts(&self.dependencies);
        for requirement in conflicts.iter_mut().flat_map(|c| c.requirements.iter_mut()) {
            requirement.origins = self.origins_of(&requirement.root);
        }
        conflicts
    }

    /// True when every token parsed and no version conflicts exist
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty() && verify(&self.dependencies)
    }
}

/// Verify that no plugin name is pinned to two different versions
pub fn verify(graph: &BTreeMap<Plugin, Vec<Plugin>>) -> bool {
    find_conflicts(graph).is_empty()
}

/// Collect every plugin name that is pinned to more than one version.
///
/// Roots pin their own version; each edge pins its dependent's version.
pub fn find_conflicts(graph: &BTreeMap<Plugin, Vec<Plugin>>) -> Vec<VersionConflict> {
    let mut pins: BTreeMap<&str, Vec<Requirement>> = BTreeMap::new();
    let pin = |version: &str, root: &Plugin| Requirement {
        version: version.to_string(),
        root: root.clone(),
        origins: Vec::new(),
    };

    for (root, dependents) in graph {
        pins.entry(root.name.as_str())
            .or_default()
            .push(pin(&root.version, root));
        for dependent in dependents {
            pins.entry(dependent.name.as_str())
                .or_default()
                .push(pin(&dependent.version, root));
        }
    }

    pins.into_iter()
        .filter(|(_, requirements)| {
            requirements
                .iter()
                .map(|requirement| requirement.version.as_str())
                .collect::<BTreeSet<_>>()
                .len()
                > 1
        })
        .map(|(name, requirements)| VersionConflict {
            name: name.to_string(),
            requirements,
        })
        .collect()
}

// ABOUTME: Deployable components and their tiers.
// ABOUTME: Components are built from the configured names intersected with what exists on disk.

use crate::types::ResourceName;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Deployment phase. Middleware is applied before any service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Middleware,
    Service,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Middleware => write!(f, "middleware"),
            Tier::Service => write!(f, "service"),
        }
    }
}

/// One deployable unit backed by a manifest directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub name: ResourceName,
    pub tier: Tier,
    pub manifest_path: PathBuf,
}

/// Where a component is in its deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Pending,
    Deploying,
    Succeeded,
    Failed,
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentStatus::Pending => write!(f, "pending"),
            ComponentStatus::Deploying => write!(f, "deploying"),
            ComponentStatus::Succeeded => write!(f, "succeeded"),
            ComponentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Components found on disk, and the ones that were not.
#[derive(Debug, Clone, Default)]
pub struct ResolvedComponents {
    pub components: Vec<Component>,
    pub skipped: Vec<Component>,
}

impl ResolvedComponents {
    pub fn tier(&self, tier: Tier) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.tier == tier)
    }
}

/// Map configured names onto `<base_dir>/<name>` directories.
///
/// Middleware comes first, both tiers keep their configured order.
pub fn resolve_components(
    base_dir: &Path,
    middleware: &[ResourceName],
    services: &[ResourceName],
) -> ResolvedComponents {
    let mut resolved = ResolvedComponents::default();

    let tiers = [(Tier::Middleware, middleware), (Tier::Service, services)];
    for (tier, names) in tiers {
        for name in names {
            let component = Component {
                name: name.clone(),
                tier,
                manifest_path: base_dir.join(name.as_str()),
            };
            if component.manifest_path.is_dir() {
                resolved.components.push(component);
            } else {
                resolved.skipped.push(component);
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<ResourceName> {
        list.iter().map(|n| ResourceName::new(n).unwrap()).collect()
    }

    #[test]
    fn missing_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("gomall-mysql")).unwrap();
        std::fs::create_dir(dir.path().join("cart")).unwrap();

        let resolved = resolve_components(
            dir.path(),
            &names(&["gomall-mysql"]),
            &names(&["cart", "checkout"]),
        );

        let found: Vec<_> = resolved.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(found, vec!["gomall-mysql", "cart"]);
        assert_eq!(resolved.skipped.len(), 1);
        assert_eq!(resolved.skipped[0].name.as_str(), "checkout");
        assert_eq!(resolved.skipped[0].tier, Tier::Service);
    }

    #[test]
    fn plain_files_do_not_count_as_manifest_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cart"), "kind: Deployment").unwrap();

        let resolved = resolve_components(dir.path(), &[], &names(&["cart"]));
        assert!(resolved.components.is_empty());
        assert_eq!(resolved.skipped.len(), 1);
    }
}

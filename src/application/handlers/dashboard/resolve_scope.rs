//! ResolveScopeHandler - Query handler returning a caller's access grant.

use serde::Serialize;

use crate::domain::hierarchy::{Center, Cluster, Region};
use crate::domain::scope::{AccessScope, Role, UserScope};
use crate::ports::{CenterFilter, ClusterFilter};

use super::{DashboardError, ResolvedScope, ScopedReader};

/// Query to resolve what a caller may see.
#[derive(Debug, Clone)]
pub struct ResolveScopeQuery {
    pub user: UserScope,
}

pub type ResolveScopeResult = AccessScope;

/// Nodes a caller may pick as a location override, sorted by name.
///
/// Center reps cannot override, so theirs is always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideOptions {
    pub regions: Vec<Region>,
    pub clusters: Vec<Cluster>,
    pub centers: Vec<Center>,
}

impl OverrideOptions {
    fn sorted(mut self) -> Self {
        self.regions.sort_by(|a, b| a.name.cmp(&b.name));
        self.clusters.sort_by(|a, b| a.name.cmp(&b.name));
        self.centers.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }
}

/// A grant together with the override picker for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeWithOptions {
    pub scope: AccessScope,
    pub options: OverrideOptions,
}

/// Resolves a caller's grant, reading only the hierarchy slice the role needs.
pub struct ResolveScopeHandler {
    reader: ScopedReader,
}

impl ResolveScopeHandler {
    pub fn new(reader: ScopedReader) -> Self {
        Self { reader }
    }

    #[tracing::instrument(skip_all, fields(role = %query.user.role))]
    pub async fn handle(
        &self,
        query: ResolveScopeQuery,
    ) -> Result<ResolveScopeResult, DashboardError> {
        let resolved = self.reader.resolve(&query.user).await?;
        Ok(resolved.scope)
    }

    /// Resolves the grant and lists the nodes the caller may narrow to.
    #[tracing::instrument(skip_all, fields(role = %query.user.role))]
    pub async fn with_options(
        &self,
        query: ResolveScopeQuery,
    ) -> Result<ScopeWithOptions, DashboardError> {
        let resolved = self.reader.resolve(&query.user).await?;
        let options = self.override_options(&resolved).await?;
        Ok(ScopeWithOptions {
            scope: resolved.scope,
            options,
        })
    }

    async fn override_options(
        &self,
        resolved: &ResolvedScope,
    ) -> Result<OverrideOptions, DashboardError> {
        let store = self.reader.store();
        let options = match resolved.user.role {
            Role::SuperAdmin => {
                let (regions, clusters, centers) = tokio::try_join!(
                    store.regions(),
                    store.clusters(&ClusterFilter::All),
                    store.centers(&CenterFilter::All),
                )?;
                OverrideOptions {
                    regions,
                    clusters,
                    centers,
                }
            }
            Role::RegionAdmin => {
                let regions = store.regions().await?;
                OverrideOptions {
                    regions: regions
                        .into_iter()
                        .filter(|r| resolved.scope.can_view_region(&r.id))
                        .collect(),
                    clusters: resolved.hierarchy.clusters().cloned().collect(),
                    centers: resolved.hierarchy.centers().cloned().collect(),
                }
            }
            Role::ClusterAdmin => {
                let clusters = store
                    .clusters(&ClusterFilter::Ids(resolved.scope.cluster_ids.clone()))
                    .await?;
                OverrideOptions {
                    regions: Vec::new(),
                    clusters,
                    centers: resolved.hierarchy.centers().cloned().collect(),
                }
            }
            Role::CenterRep => OverrideOptions::default(),
        };
        Ok(options.sorted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::dashboard::test_support::{Fixture, MockRecordStore};
    use crate::domain::foundation::{ClusterId, RegionId};
    use crate::domain::scope::{Role, ScopeError};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn handler(store: Arc<MockRecordStore>) -> ResolveScopeHandler {
        ResolveScopeHandler::new(ScopedReader::new(store))
    }

    #[tokio::test]
    async fn test_super_admin_is_unrestricted_without_reads() {
        let store = Arc::new(MockRecordStore::new(Fixture::new()));

        let scope = handler(store.clone())
            .handle(ResolveScopeQuery {
                user: UserScope::super_admin(),
            })
            .await
            .unwrap();

        assert!(scope.unrestricted);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_region_admin_gets_region_subtree() {
        let fx = Fixture::new();
        let store = Arc::new(MockRecordStore::new(fx.clone()));

        let scope = handler(store.clone())
            .handle(ResolveScopeQuery {
                user: UserScope::region_admin(fx.north),
            })
            .await
            .unwrap();

        assert_eq!(scope.region_ids, BTreeSet::from([fx.north]));
        assert_eq!(scope.cluster_ids, BTreeSet::from([fx.k1, fx.k2]));
        assert_eq!(scope.center_ids, BTreeSet::from([fx.c1, fx.c2, fx.c3]));
        assert!(!scope.center_ids.contains(&fx.legacy_center));
        assert_eq!(store.calls(), vec!["clusters", "centers"]);
    }

    #[tokio::test]
    async fn test_cluster_admin_reads_only_centers() {
        let fx = Fixture::new();
        let store = Arc::new(MockRecordStore::new(fx.clone()));

        let scope = handler(store.clone())
            .handle(ResolveScopeQuery {
                user: UserScope::cluster_admin(fx.k1),
            })
            .await
            .unwrap();

        assert_eq!(scope.cluster_ids, BTreeSet::from([fx.k1]));
        assert_eq!(scope.center_ids, BTreeSet::from([fx.c1, fx.c2]));
        assert_eq!(store.calls(), vec!["centers"]);
    }

    #[tokio::test]
    async fn test_center_rep_gets_own_center() {
        let fx = Fixture::new();
        let store = Arc::new(MockRecordStore::new(fx.clone()));

        let scope = handler(store.clone())
            .handle(ResolveScopeQuery {
                user: UserScope::center_rep(fx.c2),
            })
            .await
            .unwrap();

        assert_eq!(scope.center_ids, BTreeSet::from([fx.c2]));
        assert!(scope.cluster_ids.is_empty());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_assignment_is_scope_error() {
        let store = Arc::new(MockRecordStore::new(Fixture::new()));
        let mut user = UserScope::cluster_admin(ClusterId::new());
        user.cluster_id = None;

        let result = handler(store.clone())
            .handle(ResolveScopeQuery { user })
            .await;

        assert_eq!(result, Err(DashboardError::Scope(ScopeError::MissingCluster)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_region_without_clusters_is_empty_grant() {
        let store = Arc::new(MockRecordStore::new(Fixture::new()));

        let scope = handler(store)
            .handle(ResolveScopeQuery {
                user: UserScope::region_admin(RegionId::new()),
            })
            .await
            .unwrap();

        assert!(scope.cluster_ids.is_empty());
        assert!(scope.center_ids.is_empty());
        assert_eq!(scope.region_ids.len(), 1);
    }

    fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|i| name(i).to_string()).collect()
    }

    #[tokio::test]
    async fn test_super_admin_options_cover_whole_organization() {
        let fx = Fixture::new();
        let store = Arc::new(MockRecordStore::new(fx.clone()));

        let resolved = handler(store.clone())
            .with_options(ResolveScopeQuery {
                user: UserScope::super_admin(),
            })
            .await
            .unwrap();

        let options = resolved.options;
        assert_eq!(names(&options.regions, |r| &r.name), vec!["North", "South"]);
        assert_eq!(
            names(&options.clusters, |c| &c.name),
            vec!["Harbor", "Lakeside", "Old Town", "Riverside"]
        );
        assert_eq!(options.centers.len(), 5);
        assert!(options.clusters.iter().any(|c| c.id == fx.legacy));
        let mut calls = store.calls();
        calls.sort();
        assert_eq!(calls, vec!["centers", "clusters", "regions"]);
    }

    #[tokio::test]
    async fn test_region_admin_options_stay_inside_region() {
        let fx = Fixture::new();
        let store = Arc::new(MockRecordStore::new(fx.clone()));

        let options = handler(store)
            .with_options(ResolveScopeQuery {
                user: UserScope::region_admin(fx.north),
            })
            .await
            .unwrap()
            .options;

        assert_eq!(names(&options.regions, |r| &r.name), vec!["North"]);
        assert!(options.regions.iter().all(|r| r.id != fx.south));
        assert_eq!(names(&options.clusters, |c| &c.name), vec!["Lakeside", "Riverside"]);
        assert_eq!(
            names(&options.centers, |c| &c.name),
            vec!["Hilltop", "Shore", "Valley"]
        );
    }

    #[tokio::test]
    async fn test_cluster_admin_options_are_own_cluster_and_centers() {
        let fx = Fixture::new();
        let store = Arc::new(MockRecordStore::new(fx.clone()));

        let options = handler(store)
            .with_options(ResolveScopeQuery {
                user: UserScope::cluster_admin(fx.k1),
            })
            .await
            .unwrap()
            .options;

        assert!(options.regions.is_empty());
        assert_eq!(names(&options.clusters, |c| &c.name), vec!["Riverside"]);
        assert_eq!(names(&options.centers, |c| &c.name), vec!["Hilltop", "Valley"]);
    }

    #[tokio::test]
    async fn test_center_rep_has_no_options_and_no_reads() {
        let fx = Fixture::new();
        let store = Arc::new(MockRecordStore::new(fx.clone()));

        let options = handler(store.clone())
            .with_options(ResolveScopeQuery {
                user: UserScope::center_rep(fx.c1),
            })
            .await
            .unwrap()
            .options;

        assert_eq!(options, OverrideOptions::default());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let fx = Fixture::new();
        let store = Arc::new(MockRecordStore::new(fx.clone()).failing_on("clusters"));

        let result = handler(store)
            .handle(ResolveScopeQuery {
                user: UserScope {
                    role: Role::RegionAdmin,
                    region_id: Some(fx.north),
                    cluster_id: None,
                    center_id: None,
                },
            })
            .await;

        assert!(matches!(result, Err(DashboardError::Store(_))));
    }
}

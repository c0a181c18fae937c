//! # API Catalog
//!
//! Discovers every API group with its resource kinds and verbs, for picking
//! the resource and verbs of a new rule.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::kubernetes::{resources, KubeError, KubernetesApi};
use crate::rbac::{core_api_group, APIGroup, APIResource};

/// An API group with the resources it serves at its preferred version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiGrouping {
    pub api: APIGroup,
    pub resources: Vec<APIResource>,
}

/// All non-core API groups with their resources, sorted by group name
///
/// Group resource lists are fetched concurrently. Any failed fetch fails
/// the whole catalog; no partial result is returned.
///
/// # Errors
///
/// Propagates the first [`KubeError`] of the group list or any group.
pub async fn list_all_resource_types<A: KubernetesApi + ?Sized>(
    api: &A,
) -> Result<Vec<ApiGrouping>, KubeError> {
    let groups = resources::list_api_groups(api).await?;
    debug!("Discovered {} API groups", groups.len());

    let mut catalog = try_join_all(groups.into_iter().map(|group| async move {
        let resources = resources::list_group_resources(api, &group).await?;
        Ok::<_, KubeError>(ApiGrouping {
            api: group,
            resources,
        })
    }))
    .await?;

    catalog.sort_by(|a, b| a.api.name.cmp(&b.api.name));
    info!("Resolved API catalog with {} groups", catalog.len());
    Ok(catalog)
}

/// The core group (`""`, served at `/api/v1`) as a catalog entry
///
/// # Errors
///
/// Propagates the [`KubeError`] of the discovery request.
pub async fn list_core_resource_types<A: KubernetesApi + ?Sized>(
    api: &A,
) -> Result<ApiGrouping, KubeError> {
    Ok(ApiGrouping {
        api: core_api_group(),
        resources: resources::list_core_resources(api).await?,
    })
}

/// The catalog, optionally including the core group
///
/// The core group's name is the empty string, so it sorts first.
///
/// # Errors
///
/// Propagates the first failed discovery request.
pub async fn list_resource_types<A: KubernetesApi + ?Sized>(
    api: &A,
    include_core: bool,
) -> Result<Vec<ApiGrouping>, KubeError> {
    if !include_core {
        return list_all_resource_types(api).await;
    }
    let (core, mut catalog) =
        tokio::try_join!(list_core_resource_types(api), list_all_resource_types(api))?;
    catalog.insert(0, core);
    Ok(catalog)
}

/// The first grouping serving a resource named `resource_name`, with that resource
pub fn find_resource<'a>(
    catalog: &'a [ApiGrouping],
    resource_name: &str,
) -> Option<(&'a ApiGrouping, &'a APIResource)> {
    catalog.iter().find_map(|grouping| {
        grouping
            .resources
            .iter()
            .find(|r| r.name == resource_name)
            .map(|resource| (grouping, resource))
    })
}

/// The grouping's resources ordered by kind
pub fn resources_by_kind(grouping: &ApiGrouping) -> Vec<&APIResource> {
    let mut sorted: Vec<&APIResource> = grouping.resources.iter().collect();
    sorted.sort_by(|a, b| a.kind.cmp(&b.kind));
    sorted
}

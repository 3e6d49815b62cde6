// ─── Version Resolver ───
// Two-level (memory, disk) cached access to the version manifest and to
// per-version descriptors.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LauncherConfig;
use crate::error::{SdkError, SdkResult};

use super::descriptor::VersionDescriptor;
use super::manifest::{CachedManifest, VersionManifest, VersionStub};

/// Disk cache envelope for a pristine per-version descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedDescriptor {
    #[serde(rename = "cacheTime")]
    cache_time: DateTime<Utc>,
    descriptor: VersionDescriptor,
}

impl CachedDescriptor {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.cache_time < chrono::Duration::hours(super::manifest::MANIFEST_CACHE_HOURS)
    }
}

/// Routed download URLs for a version's main binaries.
#[derive(Debug, Clone)]
pub struct DownloadUrls {
    pub client: String,
    pub server: Option<String>,
}

pub struct VersionResolver {
    client: Client,
    config: LauncherConfig,
    manifest: Option<VersionManifest>,
    descriptors: HashMap<String, VersionDescriptor>,
}

impl VersionResolver {
    pub fn new(client: Client, config: LauncherConfig) -> Self {
        Self {
            client,
            config,
            manifest: None,
            descriptors: HashMap::new(),
        }
    }

    /// Fetch or recall the version manifest.
    ///
    /// Memory first, then the on-disk cache while younger than 24 hours,
    /// then the network. A network failure falls back to a stale cache when
    /// one exists and surfaces `Manifest` otherwise. `force_refresh`
    /// bypasses both cache levels.
    pub async fn get_manifest(&mut self, force_refresh: bool) -> SdkResult<&VersionManifest> {
        if force_refresh || self.manifest.is_none() {
            let manifest = self.load_manifest(force_refresh).await?;
            self.manifest = Some(manifest);
        }
        self.manifest
            .as_ref()
            .ok_or_else(|| SdkError::Manifest("manifest unavailable".into()))
    }

    async fn load_manifest(&self, force_refresh: bool) -> SdkResult<VersionManifest> {
        let cache_path = self.config.manifest_cache_path();

        if !force_refresh {
            if let Some(cached) = read_json::<CachedManifest>(&cache_path).await {
                if cached.is_fresh(Utc::now()) {
                    debug!("Using cached version manifest");
                    return Ok(cached.manifest);
                }
            }
        }

        let url = self.config.source.manifest_url();
        match self.fetch_json::<VersionManifest>(url).await {
            Ok(manifest) => {
                info!("Loaded {} versions from manifest", manifest.versions.len());
                write_json(&cache_path, &CachedManifest::new(manifest.clone())).await?;
                Ok(manifest)
            }
            Err(e) => {
                if let Some(cached) = read_json::<CachedManifest>(&cache_path).await {
                    warn!("Manifest fetch failed ({}); using stale cache", e);
                    return Ok(cached.manifest);
                }
                Err(SdkError::Manifest(e.to_string()))
            }
        }
    }

    /// Fetch or recall a version's descriptor, with the same two-level
    /// cache discipline as the manifest, keyed on `version_id`.
    pub async fn get_descriptor(
        &mut self,
        version_id: &str,
        force_refresh: bool,
    ) -> SdkResult<&VersionDescriptor> {
        if force_refresh || !self.descriptors.contains_key(version_id) {
            let descriptor = self.load_descriptor(version_id, force_refresh).await?;
            self.descriptors.insert(version_id.to_string(), descriptor);
        }
        self.descriptors
            .get(version_id)
            .ok_or_else(|| SdkError::UnknownVersion(version_id.to_string()))
    }

    async fn load_descriptor(
        &mut self,
        version_id: &str,
        force_refresh: bool,
    ) -> SdkResult<VersionDescriptor> {
        let cache_path = self.config.descriptor_cache_path(version_id);

        if !force_refresh {
            if let Some(cached) = read_json::<CachedDescriptor>(&cache_path).await {
                if cached.is_fresh(Utc::now()) {
                    debug!("Using cached descriptor for {}", version_id);
                    return Ok(cached.descriptor);
                }
            }
        }

        let stub_url = {
            let manifest = self.get_manifest(false).await?;
            let stub = manifest
                .find(version_id)
                .ok_or_else(|| SdkError::UnknownVersion(version_id.to_string()))?;
            stub.url.clone()
        };

        let url = self.config.source.rewrite(&stub_url);
        match self.fetch_json::<VersionDescriptor>(&url).await {
            Ok(descriptor) => {
                write_json(
                    &cache_path,
                    &CachedDescriptor {
                        cache_time: Utc::now(),
                        descriptor: descriptor.clone(),
                    },
                )
                .await?;
                Ok(descriptor)
            }
            Err(e) => {
                if let Some(cached) = read_json::<CachedDescriptor>(&cache_path).await {
                    warn!(
                        "Descriptor fetch for {} failed ({}); using stale cache",
                        version_id, e
                    );
                    return Ok(cached.descriptor);
                }
                Err(e)
            }
        }
    }

    /// The stubs named by `latest.release` and `latest.snapshot`.
    pub async fn latest_versions(&mut self) -> SdkResult<(VersionStub, VersionStub)> {
        let manifest = self.get_manifest(false).await?;
        let release = manifest
            .find(&manifest.latest.release)
            .cloned()
            .ok_or_else(|| SdkError::UnknownVersion(manifest.latest.release.clone()))?;
        let snapshot = manifest
            .find(&manifest.latest.snapshot)
            .cloned()
            .ok_or_else(|| SdkError::UnknownVersion(manifest.latest.snapshot.clone()))?;
        Ok((release, snapshot))
    }

    /// Client and server JAR URLs for a version, routed through the source.
    pub async fn download_urls(&mut self, version_id: &str) -> SdkResult<DownloadUrls> {
        let source = self.config.source;
        let descriptor = self.get_descriptor(version_id, false).await?;
        let downloads = descriptor
            .downloads
            .as_ref()
            .ok_or_else(|| SdkError::Other(format!("{} has no downloads section", version_id)))?;
        let client = downloads
            .client
            .as_ref()
            .ok_or_else(|| SdkError::Other(format!("{} has no client download", version_id)))?;
        Ok(DownloadUrls {
            client: source.rewrite(&client.url),
            server: downloads.server.as_ref().map(|s| source.rewrite(&s.url)),
        })
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> SdkResult<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SdkError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }

    #[cfg(test)]
    fn with_manifest(mut self, manifest: VersionManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = tokio::fs::read_to_string(path).await.ok()?;
    serde_json::from_str(&raw).ok()
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> SdkResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SdkError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| SdkError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

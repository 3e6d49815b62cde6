// ─── Launcher Configuration ───
// Single source of truth for the on-disk data layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};
use crate::source::Source;

/// Default width of the concurrent download batch.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// SDK configuration, persisted as pretty JSON next to the data it describes.
///
/// All game files live under `data_dir`:
/// - `version_manifest.json` — timestamped manifest cache
/// - `versions_info_cache/` — pristine per-version descriptors
/// - `versions/<name>/` — installed versions (descriptor, JAR, natives)
/// - `libraries/` — Maven-layout library JARs
/// - `assets/` — asset indexes and content-addressed objects
/// - `downloads/` — mod-loader installer artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    pub data_dir: PathBuf,
    #[serde(default)]
    pub source: Source,
    #[serde(default = "default_concurrency")]
    pub max_concurrent: usize,
    #[serde(default = "default_launcher_name")]
    pub launcher_name: String,
    #[serde(default = "default_launcher_version")]
    pub launcher_version: String,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_launcher_name() -> String {
    "craftkit".to_string()
}

fn default_launcher_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for LauncherConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("craftkit"))
    }
}

impl LauncherConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            source: Source::default(),
            max_concurrent: DEFAULT_CONCURRENCY,
            launcher_name: default_launcher_name(),
            launcher_version: default_launcher_version(),
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    // ── Layout helpers ──────────────────────────────────

    pub fn manifest_cache_path(&self) -> PathBuf {
        self.data_dir.join("version_manifest.json")
    }

    pub fn descriptor_cache_path(&self, version_id: &str) -> PathBuf {
        self.data_dir
            .join("versions_info_cache")
            .join(format!("{}.json", version_id))
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    pub fn version_dir(&self, version_name: &str) -> PathBuf {
        self.versions_dir().join(version_name)
    }

    pub fn version_json_path(&self, version_name: &str) -> PathBuf {
        self.version_dir(version_name)
            .join(format!("{}.json", version_name))
    }

    pub fn version_jar_path(&self, version_name: &str) -> PathBuf {
        self.version_dir(version_name)
            .join(format!("{}.jar", version_name))
    }

    pub fn server_jar_path(&self, version_name: &str) -> PathBuf {
        self.version_dir(version_name)
            .join(format!("{}-server.jar", version_name))
    }

    pub fn natives_dir(&self, version_name: &str) -> PathBuf {
        self.version_dir(version_name)
            .join(format!("{}-natives", version_name))
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.data_dir.join("libraries")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join("assets")
    }

    pub fn asset_indexes_dir(&self) -> PathBuf {
        self.assets_dir().join("indexes")
    }

    pub fn asset_objects_dir(&self) -> PathBuf {
        self.assets_dir().join("objects")
    }

    pub fn forge_downloads_dir(&self) -> PathBuf {
        self.data_dir.join("downloads").join("forge")
    }

    pub fn fabric_downloads_dir(&self) -> PathBuf {
        self.data_dir.join("downloads").join("fabric")
    }

    // ── Persistence ─────────────────────────────────────

    pub async fn save(&self, path: &Path) -> SdkResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SdkError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        tokio::fs::write(path, json)
            .await
            .map_err(|e| SdkError::Io {
                path: path.to_path_buf(),
                source: e,
            })
    }

    pub async fn load(path: &Path) -> SdkResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SdkError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_version_name() {
        let config = LauncherConfig::new("/data");
        assert_eq!(
            config.version_json_path("1.20.4-fabric"),
            PathBuf::from("/data/versions/1.20.4-fabric/1.20.4-fabric.json")
        );
        assert_eq!(
            config.natives_dir("1.20.4"),
            PathBuf::from("/data/versions/1.20.4/1.20.4-natives")
        );
        assert_eq!(
            config.descriptor_cache_path("1.20.4"),
            PathBuf::from("/data/versions_info_cache/1.20.4.json")
        );
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");

        let config = LauncherConfig::new("/data")
            .with_source(Source::Mirror)
            .with_concurrency(4);
        config.save(&path).await.expect("save");

        let loaded = LauncherConfig::load(&path).await.expect("load");
        assert_eq!(loaded.data_dir, PathBuf::from("/data"));
        assert_eq!(loaded.source, Source::Mirror);
        assert_eq!(loaded.max_concurrent, 4);
    }

    #[test]
    fn concurrency_never_zero() {
        let config = LauncherConfig::new("/data").with_concurrency(0);
        assert_eq!(config.max_concurrent, 1);
    }
}

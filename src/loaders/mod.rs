// ─── Mod Loaders ───
// Overlays that rewrite an installed version's descriptor: Fabric merges a
// published profile document, Forge runs the upstream installer and merges
// its output.

mod fabric;
mod forge;
pub mod merge;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::LauncherConfig;
use crate::downloader::Downloader;
use crate::error::SdkResult;
use crate::version::rules::Platform;

pub use fabric::FabricInstaller;
pub use forge::ForgeInstaller;

/// Everything an overlay needs to run against an installed version.
pub struct InstallContext<'a> {
    pub config: &'a LauncherConfig,
    pub client: &'a reqwest::Client,
    pub downloader: &'a Downloader,
    /// Installed version to mutate (`versions/<target_name>/`).
    pub target_name: &'a str,
    pub minecraft_version: &'a str,
    pub loader_version: &'a str,
    pub platform: &'a Platform,
    /// Java binary for loaders that shell out to an installer.
    pub java_path: Option<&'a Path>,
}

/// Unified overlay result.
#[derive(Debug, Clone)]
pub struct LoaderInstall {
    pub target_name: String,
    pub descriptor_path: PathBuf,
    /// Set when the overlay replaced the version JAR (Forge).
    pub jar_path: Option<PathBuf>,
}

#[async_trait]
pub trait LoaderInstaller: Send + Sync {
    async fn install(&self, ctx: InstallContext<'_>) -> SdkResult<LoaderInstall>;
}

// ─── Launcher Facade ───
// Thin composition of the resolver, download engine and pipelines behind a
// single entry point.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::info;

use crate::assets::{self, AssetOutcome, AssetProgressFn};
use crate::config::LauncherConfig;
use crate::downloader::Downloader;
use crate::error::{SdkError, SdkResult};
use crate::http::build_http_client;
use crate::launch::{self, LaunchCommand, LaunchParameters, LaunchedGame};
use crate::library::{self, LibraryOutcome};
use crate::loaders::merge::{read_target_descriptor, write_descriptor_atomic};
use crate::loaders::{
    FabricInstaller, ForgeInstaller, InstallContext, LoaderInstall, LoaderInstaller,
};
use crate::version::rules::Platform;
use crate::version::{
    DownloadUrls, VersionDescriptor, VersionManifest, VersionResolver, VersionStub,
};

/// Outcome of a full version install.
#[derive(Debug, Clone, Copy)]
pub struct InstallReport {
    pub libraries: LibraryOutcome,
    pub assets: AssetOutcome,
}

/// One SDK instance owning a data directory and its caches.
///
/// Concurrent operations on the same data directory from several instances
/// are not coordinated; keep one instance per directory.
pub struct Launcher {
    config: LauncherConfig,
    client: Client,
    downloader: Downloader,
    resolver: VersionResolver,
}

impl Launcher {
    pub fn new(config: LauncherConfig) -> SdkResult<Self> {
        let client = build_http_client()?;
        let downloader = Downloader::new(client.clone()).with_concurrency(config.max_concurrent);
        let resolver = VersionResolver::new(client.clone(), config.clone());
        Ok(Self {
            config,
            client,
            downloader,
            resolver,
        })
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    // ── Version resolution ──────────────────────────────

    pub async fn get_manifest(&mut self, force_refresh: bool) -> SdkResult<&VersionManifest> {
        self.resolver.get_manifest(force_refresh).await
    }

    pub async fn get_descriptor(
        &mut self,
        version_id: &str,
        force_refresh: bool,
    ) -> SdkResult<&VersionDescriptor> {
        self.resolver.get_descriptor(version_id, force_refresh).await
    }

    pub async fn latest_versions(&mut self) -> SdkResult<(VersionStub, VersionStub)> {
        self.resolver.latest_versions().await
    }

    pub async fn download_urls(&mut self, version_id: &str) -> SdkResult<DownloadUrls> {
        self.resolver.download_urls(version_id).await
    }

    // ── Installation ────────────────────────────────────

    /// Install a version end to end: effective descriptor, client JAR,
    /// libraries (with natives) and assets. `name` defaults to the version
    /// id and becomes the directory name under `versions/`.
    pub async fn install_version(
        &mut self,
        version_id: &str,
        name: Option<&str>,
        progress: Option<AssetProgressFn>,
    ) -> SdkResult<InstallReport> {
        let descriptor = self.resolver.get_descriptor(version_id, false).await?.clone();
        let version_name = name.unwrap_or(version_id).to_string();
        info!("Installing {} as {}", version_id, version_name);

        write_descriptor_atomic(&self.config.version_json_path(&version_name), &descriptor)
            .await?;

        self.download_client(&version_name).await?;

        let platform = Platform::current();
        let libraries = library::download_libraries(
            &self.config,
            &self.downloader,
            &descriptor,
            &version_name,
            &platform,
        )
        .await?;
        let assets =
            assets::download_all_assets(&self.config, &self.downloader, &descriptor, progress)
                .await?;

        info!("Installed {}", version_name);
        Ok(InstallReport { libraries, assets })
    }

    /// Download (or re-verify) the client JAR of an installed version.
    /// Idempotent: a JAR already matching its SHA-1 costs no network I/O.
    pub async fn download_client(&self, version_name: &str) -> SdkResult<PathBuf> {
        let descriptor = self.effective_descriptor(version_name).await?;
        let client_download = descriptor
            .downloads
            .as_ref()
            .and_then(|d| d.client.as_ref())
            .ok_or_else(|| {
                SdkError::Other(format!("{} has no client download", version_name))
            })?;

        let jar_path = self.config.version_jar_path(version_name);
        self.downloader
            .download_file(
                &self.config.source.rewrite(&client_download.url),
                &jar_path,
                client_download.sha1.as_deref(),
                None,
            )
            .await?;
        Ok(jar_path)
    }

    /// Download the server JAR of an installed version; prefers the
    /// Windows-specific server binary on Windows hosts when one exists.
    pub async fn download_server(&self, version_name: &str) -> SdkResult<PathBuf> {
        let descriptor = self.effective_descriptor(version_name).await?;
        let downloads = descriptor.downloads.as_ref().ok_or_else(|| {
            SdkError::Other(format!("{} has no downloads section", version_name))
        })?;

        let server_download = if cfg!(windows) {
            downloads.windows_server.as_ref().or(downloads.server.as_ref())
        } else {
            downloads.server.as_ref()
        }
        .ok_or_else(|| SdkError::Other(format!("{} has no server download", version_name)))?;

        let jar_path = self.config.server_jar_path(version_name);
        self.downloader
            .download_file(
                &self.config.source.rewrite(&server_download.url),
                &jar_path,
                server_download.sha1.as_deref(),
                None,
            )
            .await?;
        Ok(jar_path)
    }

    /// Re-run the library pipeline (plain JARs + natives rebuild) for an
    /// installed version.
    pub async fn download_libraries(&self, version_name: &str) -> SdkResult<LibraryOutcome> {
        let descriptor = self.effective_descriptor(version_name).await?;
        library::download_libraries(
            &self.config,
            &self.downloader,
            &descriptor,
            version_name,
            &Platform::current(),
        )
        .await
    }

    /// Download the asset index and every object for an installed version.
    pub async fn download_assets(
        &self,
        version_name: &str,
        progress: Option<AssetProgressFn>,
    ) -> SdkResult<AssetOutcome> {
        let descriptor = self.effective_descriptor(version_name).await?;
        assets::download_all_assets(&self.config, &self.downloader, &descriptor, progress).await
    }

    // ── Mod loaders ─────────────────────────────────────

    /// Merge the Fabric loader profile into an installed version.
    pub async fn install_fabric(
        &self,
        target_name: &str,
        minecraft_version: &str,
        loader_version: &str,
    ) -> SdkResult<LoaderInstall> {
        let platform = Platform::current();
        FabricInstaller
            .install(InstallContext {
                config: &self.config,
                client: &self.client,
                downloader: &self.downloader,
                target_name,
                minecraft_version,
                loader_version,
                platform: &platform,
                java_path: None,
            })
            .await
    }

    /// Run the Forge installer against an installed version and merge its
    /// output. `java_path` must point at a usable Java binary.
    pub async fn install_forge(
        &self,
        target_name: &str,
        minecraft_version: &str,
        loader_version: &str,
        java_path: &Path,
    ) -> SdkResult<LoaderInstall> {
        let platform = Platform::current();
        ForgeInstaller
            .install(InstallContext {
                config: &self.config,
                client: &self.client,
                downloader: &self.downloader,
                target_name,
                minecraft_version,
                loader_version,
                platform: &platform,
                java_path: Some(java_path),
            })
            .await
    }

    // ── Launch ──────────────────────────────────────────

    pub async fn generate_command(&self, params: &LaunchParameters) -> SdkResult<LaunchCommand> {
        launch::generate_command(&self.config, params).await
    }

    pub async fn launch(&self, params: &LaunchParameters) -> SdkResult<LaunchedGame> {
        launch::launch(&self.config, params).await
    }

    async fn effective_descriptor(&self, version_name: &str) -> SdkResult<VersionDescriptor> {
        read_target_descriptor(&self.config.version_json_path(version_name), version_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher_in(dir: &Path) -> Launcher {
        Launcher::new(LauncherConfig::new(dir)).expect("launcher")
    }

    #[tokio::test]
    async fn operations_on_uninstalled_versions_fail_cleanly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let launcher = launcher_in(dir.path());

        let err = launcher
            .download_client("ghost")
            .await
            .expect_err("no target");
        assert!(matches!(err, SdkError::TargetMissing(name) if name == "ghost"));

        let err = launcher
            .download_libraries("ghost")
            .await
            .expect_err("no target");
        assert!(matches!(err, SdkError::TargetMissing(_)));
    }

    #[tokio::test]
    async fn descriptor_without_downloads_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let launcher = launcher_in(dir.path());

        let descriptor: VersionDescriptor = serde_json::from_str(
            r#"{"id": "1.20.4", "mainClass": "net.minecraft.client.main.Main"}"#,
        )
        .expect("descriptor");
        write_descriptor_atomic(
            &launcher.config().version_json_path("1.20.4"),
            &descriptor,
        )
        .await
        .expect("seed");

        let err = launcher
            .download_client("1.20.4")
            .await
            .expect_err("no client download");
        assert!(matches!(err, SdkError::Other(_)));
    }
}

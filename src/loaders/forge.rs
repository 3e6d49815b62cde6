use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{SdkError, SdkResult};
use crate::library;
use crate::maven::FORGE_MAVEN;
use crate::version::VersionDescriptor;

use super::merge::{merge_descriptors, read_target_descriptor, write_descriptor_atomic};
use super::{InstallContext, LoaderInstall, LoaderInstaller};

/// The installer refuses to run in a directory without a launcher profile
/// registry, so one is seeded before spawning it.
const LAUNCHER_PROFILES_SEED: &[u8] = br#"{"profiles":{},"selectedProfile":null}"#;

/// Installs Forge by downloading and executing the official installer JAR,
/// then merging the version document it emits.
pub struct ForgeInstaller;

/// Coarse installer phase recognized from the child's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgePhase {
    Downloading,
    Extracting,
    Installing,
}

fn classify_hint(line: &str) -> Option<ForgePhase> {
    if line.contains("Downloading") {
        Some(ForgePhase::Downloading)
    } else if line.contains("Extracting") {
        Some(ForgePhase::Extracting)
    } else if line.contains("Installing") {
        Some(ForgePhase::Installing)
    } else {
        None
    }
}

impl ForgeInstaller {
    fn installer_url(minecraft_version: &str, loader_version: &str) -> String {
        let forge_id = format!("{}-{}", minecraft_version, loader_version);
        format!(
            "{}/net/minecraftforge/forge/{}/forge-{}-installer.jar",
            FORGE_MAVEN, forge_id, forge_id
        )
    }

    async fn run_installer(
        java_path: &Path,
        installer_path: &Path,
        install_dir: &Path,
    ) -> SdkResult<()> {
        let mut child = tokio::process::Command::new(java_path)
            .arg("-jar")
            .arg(installer_path)
            .arg("--installClient")
            .arg(install_dir)
            .current_dir(install_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SdkError::JavaExecution(e.to_string()))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut captured_out = String::new();
        let mut captured_err = String::new();
        tokio::join!(
            drain_output(stdout, &mut captured_out),
            drain_output(stderr, &mut captured_err),
        );

        // The installer runs until it exits; there is no timeout here.
        let status = child
            .wait()
            .await
            .map_err(|e| SdkError::JavaExecution(e.to_string()))?;

        if !status.success() {
            return Err(SdkError::InstallerFailed {
                code: status.code(),
                output: format!("STDOUT:\n{}\nSTDERR:\n{}", captured_out, captured_err),
            });
        }
        Ok(())
    }

    /// Find the `versions/<forge-id>/<forge-id>.json` the installer wrote
    /// into the temp directory.
    async fn locate_emitted_version(install_dir: &Path) -> SdkResult<(String, PathBuf)> {
        let versions_dir = install_dir.join("versions");
        let mut entries = tokio::fs::read_dir(&versions_dir)
            .await
            .map_err(|e| SdkError::Io {
                path: versions_dir.clone(),
                source: e,
            })?;

        let mut fallback: Option<(String, PathBuf)> = None;
        while let Some(entry) = entries.next_entry().await.map_err(|e| SdkError::Io {
            path: versions_dir.clone(),
            source: e,
        })? {
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let json = entry.path().join(format!("{}.json", name));
            if json.exists() {
                if name.contains("forge") {
                    return Ok((name, json));
                }
                fallback = Some((name, json));
            }
        }

        fallback.ok_or_else(|| {
            SdkError::Other("Forge installer emitted no version descriptor".into())
        })
    }
}

async fn drain_output<R: AsyncRead + Unpin>(reader: Option<R>, captured: &mut String) {
    let Some(reader) = reader else { return };
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(phase) = classify_hint(&line) {
            info!("Forge installer: {:?}", phase);
        } else {
            debug!("Forge installer output: {}", line);
        }
        captured.push_str(&line);
        captured.push('\n');
    }
}

#[async_trait]
impl LoaderInstaller for ForgeInstaller {
    async fn install(&self, ctx: InstallContext<'_>) -> SdkResult<LoaderInstall> {
        info!(
            "Installing Forge {} for Minecraft {} onto {}",
            ctx.loader_version, ctx.minecraft_version, ctx.target_name
        );

        let descriptor_path = ctx.config.version_json_path(ctx.target_name);
        let base = read_target_descriptor(&descriptor_path, ctx.target_name).await?;

        // The installer is the only producer of the overlay metadata, so a
        // usable Java binary is a hard prerequisite.
        let java_path = ctx
            .java_path
            .ok_or_else(|| SdkError::JavaExecution("no Java binary provided".into()))?;
        if !java_path.exists() {
            return Err(SdkError::JavaExecution(format!(
                "Java binary not found at {:?}",
                java_path
            )));
        }

        let forge_id = format!("{}-{}", ctx.minecraft_version, ctx.loader_version);
        let installer_url = ctx
            .config
            .source
            .rewrite(&Self::installer_url(ctx.minecraft_version, ctx.loader_version));
        let installer_path = ctx
            .config
            .forge_downloads_dir()
            .join(format!("forge-{}-installer.jar", forge_id));
        ctx.downloader
            .download_file(&installer_url, &installer_path, None, None)
            .await?;

        let install_dir = ctx
            .config
            .forge_downloads_dir()
            .join(format!("install-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&install_dir)
            .await
            .map_err(|e| SdkError::Io {
                path: install_dir.clone(),
                source: e,
            })?;
        tokio::fs::write(
            install_dir.join("launcher_profiles.json"),
            LAUNCHER_PROFILES_SEED,
        )
        .await
        .map_err(|e| SdkError::Io {
            path: install_dir.join("launcher_profiles.json"),
            source: e,
        })?;

        Self::run_installer(java_path, &installer_path, &install_dir).await?;

        let (emitted_id, emitted_json) = Self::locate_emitted_version(&install_dir).await?;
        let raw = tokio::fs::read_to_string(&emitted_json)
            .await
            .map_err(|e| SdkError::Io {
                path: emitted_json.clone(),
                source: e,
            })?;
        let overlay: VersionDescriptor = serde_json::from_str(&raw)?;

        let mut merged = merge_descriptors(&base, &overlay);
        merged.forge_version = Some(ctx.loader_version.to_string());
        write_descriptor_atomic(&descriptor_path, &merged).await?;

        let jar_path = ctx.config.version_jar_path(ctx.target_name);
        let emitted_jar = install_dir
            .join("versions")
            .join(&emitted_id)
            .join(format!("{}.jar", emitted_id));
        if emitted_jar.exists() {
            tokio::fs::copy(&emitted_jar, &jar_path)
                .await
                .map_err(|e| SdkError::Io {
                    path: jar_path.clone(),
                    source: e,
                })?;
        }

        library::download_libraries(
            ctx.config,
            ctx.downloader,
            &merged,
            ctx.target_name,
            ctx.platform,
        )
        .await?;

        let _ = tokio::fs::remove_dir_all(&install_dir).await;

        info!("Forge {} installed successfully", forge_id);
        Ok(LoaderInstall {
            target_name: ctx.target_name.to_string(),
            descriptor_path,
            jar_path: Some(jar_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LauncherConfig;
    use crate::downloader::Downloader;
    use crate::http::build_http_client;
    use crate::version::rules::LINUX_X64;

    #[test]
    fn installer_url_shape() {
        assert_eq!(
            ForgeInstaller::installer_url("1.20.1", "47.2.0"),
            "https://files.minecraftforge.net/maven/net/minecraftforge/forge/1.20.1-47.2.0/forge-1.20.1-47.2.0-installer.jar"
        );
    }

    #[test]
    fn output_hints_classify() {
        assert_eq!(
            classify_hint("Downloading library org/ow2/asm/asm/9.7/asm-9.7.jar"),
            Some(ForgePhase::Downloading)
        );
        assert_eq!(
            classify_hint("Extracting json from installer"),
            Some(ForgePhase::Extracting)
        );
        assert_eq!(
            classify_hint("Installing client into /tmp/forge"),
            Some(ForgePhase::Installing)
        );
        assert_eq!(classify_hint("Considering library cache"), None);
    }

    fn ctx<'a>(
        config: &'a LauncherConfig,
        client: &'a reqwest::Client,
        downloader: &'a Downloader,
        java_path: Option<&'a Path>,
    ) -> InstallContext<'a> {
        InstallContext {
            config,
            client,
            downloader,
            target_name: "1.20.1",
            minecraft_version: "1.20.1",
            loader_version: "47.2.0",
            platform: &LINUX_X64,
            java_path,
        }
    }

    #[tokio::test]
    async fn install_fails_on_missing_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LauncherConfig::new(dir.path());
        let client = build_http_client().expect("client");
        let downloader = Downloader::new(client.clone());

        let err = ForgeInstaller
            .install(ctx(&config, &client, &downloader, None))
            .await
            .expect_err("no target");
        assert!(matches!(err, SdkError::TargetMissing(name) if name == "1.20.1"));
    }

    #[tokio::test]
    async fn install_fails_loudly_when_java_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LauncherConfig::new(dir.path());
        let client = build_http_client().expect("client");
        let downloader = Downloader::new(client.clone());

        // Install a bare target so the java check is reached.
        let descriptor: VersionDescriptor =
            serde_json::from_str(r#"{"id": "1.20.1", "mainClass": "net.minecraft.client.main.Main"}"#)
                .expect("descriptor");
        write_descriptor_atomic(&config.version_json_path("1.20.1"), &descriptor)
            .await
            .expect("seed target");

        let missing_java = dir.path().join("not-java");
        let err = ForgeInstaller
            .install(ctx(&config, &client, &downloader, Some(&missing_java)))
            .await
            .expect_err("java missing");
        assert!(matches!(err, SdkError::JavaExecution(_)));
    }
}

use async_trait::async_trait;
use tracing::info;

use crate::error::{SdkError, SdkResult};
use crate::library;
use crate::version::{Library, VersionDescriptor};

use super::merge::{merge_descriptors, read_target_descriptor, write_descriptor_atomic};
use super::{InstallContext, LoaderInstall, LoaderInstaller};

const FABRIC_META_BASE: &str = "https://meta.fabricmc.net/v2";

/// Installs Fabric by merging the loader profile published by Fabric Meta.
/// No installer process; the overlay is plain JSON.
pub struct FabricInstaller;

impl FabricInstaller {
    fn profile_url(minecraft_version: &str, loader_version: &str) -> String {
        format!(
            "{}/versions/loader/{}/{}/profile/json",
            FABRIC_META_BASE, minecraft_version, loader_version
        )
    }

    async fn fetch_profile(
        client: &reqwest::Client,
        minecraft_version: &str,
        loader_version: &str,
    ) -> SdkResult<VersionDescriptor> {
        let url = Self::profile_url(minecraft_version, loader_version);
        let response = client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SdkError::LoaderApi(format!(
                "Fabric Meta returned {} for {}",
                status, url
            )));
        }

        let profile = response.json::<VersionDescriptor>().await?;
        if profile.main_class.as_deref().unwrap_or_default().is_empty() {
            return Err(SdkError::LoaderApi(
                "Fabric profile missing main class".into(),
            ));
        }
        Ok(profile)
    }
}

/// Whether a library belongs to the Fabric toolchain (loader, intermediary
/// and the mixin/asm stack published under the Fabric group).
fn is_fabric_library(library: &Library) -> bool {
    let name = library.name.to_ascii_lowercase();
    name.contains("fabric") || name.starts_with("net.fabricmc:")
}

#[async_trait]
impl LoaderInstaller for FabricInstaller {
    async fn install(&self, ctx: InstallContext<'_>) -> SdkResult<LoaderInstall> {
        info!(
            "Installing Fabric {} for Minecraft {} onto {}",
            ctx.loader_version, ctx.minecraft_version, ctx.target_name
        );

        let descriptor_path = ctx.config.version_json_path(ctx.target_name);
        let base = read_target_descriptor(&descriptor_path, ctx.target_name).await?;

        let profile =
            Self::fetch_profile(ctx.client, ctx.minecraft_version, ctx.loader_version).await?;

        let mut merged = merge_descriptors(&base, &profile);
        merged.fabric_version = Some(ctx.loader_version.to_string());
        write_descriptor_atomic(&descriptor_path, &merged).await?;

        let fabric_libraries: Vec<Library> = profile
            .libraries
            .iter()
            .filter(|l| is_fabric_library(l))
            .cloned()
            .collect();
        let outcome = library::download_plain_libraries(
            ctx.config,
            ctx.downloader,
            &fabric_libraries,
            ctx.platform,
        )
        .await?;
        info!(
            "Fabric {} installed: {} loader libraries materialized",
            ctx.loader_version, outcome.succeeded
        );

        Ok(LoaderInstall {
            target_name: ctx.target_name.to_string(),
            descriptor_path,
            jar_path: None,
        })
    }
}

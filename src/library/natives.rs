// ─── Natives Extraction ───
// Downloads platform-native JARs and flattens their contents into the
// per-version natives directory.

use std::path::Path;

use tracing::{debug, warn};

use crate::config::LauncherConfig;
use crate::downloader::Downloader;
use crate::error::{SdkError, SdkResult};

use super::NativeJar;

/// Download and extract `jars` into `versions/<name>/<name>-natives`.
///
/// The directory is removed and recreated first so no stale binaries from a
/// previous pass survive. Per-jar failures are logged and counted; the
/// `META-INF` subtree is removed once every jar has been processed.
/// Returns `(succeeded, failed)`.
pub(crate) async fn install_natives(
    config: &LauncherConfig,
    downloader: &Downloader,
    version_name: &str,
    jars: Vec<NativeJar>,
) -> SdkResult<(usize, usize)> {
    let natives_dir = config.natives_dir(version_name);

    if natives_dir.exists() {
        tokio::fs::remove_dir_all(&natives_dir)
            .await
            .map_err(|e| SdkError::Io {
                path: natives_dir.clone(),
                source: e,
            })?;
    }
    tokio::fs::create_dir_all(&natives_dir)
        .await
        .map_err(|e| SdkError::Io {
            path: natives_dir.clone(),
            source: e,
        })?;

    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for jar in jars {
        if let Err(e) = downloader
            .download_file(
                &jar.artifact.url,
                &jar.artifact.path,
                jar.artifact.sha1.as_deref(),
                None,
            )
            .await
        {
            warn!("Native download failed for {}: {}", jar.artifact.url, e);
            failed += 1;
            continue;
        }

        let exclude = jar.extract.map(|e| e.exclude).unwrap_or_default();
        match extract_archive(&jar.artifact.path, &natives_dir, &exclude) {
            Ok(()) => succeeded += 1,
            Err(e) => {
                warn!(
                    "Native extraction failed for {:?}: {}",
                    jar.artifact.path, e
                );
                failed += 1;
            }
        }
    }

    let meta_inf = natives_dir.join("META-INF");
    if meta_inf.exists() {
        let _ = tokio::fs::remove_dir_all(&meta_inf).await;
    }

    Ok((succeeded, failed))
}

/// Extract a JAR's full contents into `dest`, skipping entries whose path
/// starts with one of `exclude`.
fn extract_archive(jar_path: &Path, dest: &Path, exclude: &[String]) -> SdkResult<()> {
    let file = std::fs::File::open(jar_path).map_err(|e| SdkError::Io {
        path: jar_path.to_path_buf(),
        source: e,
    })?;
    let mut archive = zip::ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if exclude.iter().any(|prefix| name.starts_with(prefix.as_str())) {
            continue;
        }
        // Reject entries escaping the destination (zip-slip).
        let relative = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                warn!("Skipping unsafe archive entry: {}", name);
                continue;
            }
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| SdkError::Io {
                path: out_path.clone(),
                source: e,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SdkError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let mut out = std::fs::File::create(&out_path).map_err(|e| SdkError::Io {
            path: out_path.clone(),
            source: e,
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|e| SdkError::Io {
            path: out_path.clone(),
            source: e,
        })?;
        debug!("Extracted native entry: {}", name);
    }

    Ok(())
}

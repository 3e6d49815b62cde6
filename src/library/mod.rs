// ─── Library Pipeline ───
// Decides which libraries apply on the host platform, downloads plain JARs,
// and hands native JARs to the extraction step.

mod natives;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::LauncherConfig;
use crate::downloader::{DownloadEntry, Downloader};
use crate::error::SdkResult;
use crate::maven::{MavenCoordinate, MOJANG_LIBRARIES};
use crate::source::Source;
use crate::version::rules::Platform;
use crate::version::{ExtractPolicy, Library, VersionDescriptor};

pub(crate) use natives::install_natives;

/// Aggregate result of a library materialization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Libraries with no reachable URL (no artifact entry and an
    /// unparseable coordinate).
    pub skipped: usize,
}

/// A library artifact with its download URL routed and its destination
/// resolved below the libraries directory.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedArtifact {
    pub url: String,
    pub path: PathBuf,
    pub sha1: Option<String>,
    pub size: Option<u64>,
}

/// A native JAR scheduled for extraction into the natives directory.
#[derive(Debug, Clone)]
pub(crate) struct NativeJar {
    pub artifact: ResolvedArtifact,
    pub extract: Option<ExtractPolicy>,
}

#[derive(Debug, Default)]
pub(crate) struct LibraryPlan {
    pub plain: Vec<ResolvedArtifact>,
    pub natives: Vec<NativeJar>,
    pub skipped: usize,
}

/// Download every applicable library of `descriptor` and rebuild the
/// natives directory for `version_name`.
pub async fn download_libraries(
    config: &LauncherConfig,
    downloader: &Downloader,
    descriptor: &VersionDescriptor,
    version_name: &str,
    platform: &Platform,
) -> SdkResult<LibraryOutcome> {
    let plan = plan_downloads(
        &descriptor.libraries,
        platform,
        config.source,
        &config.libraries_dir(),
    );
    let skipped = plan.skipped;

    let entries: Vec<DownloadEntry> = plan
        .plain
        .iter()
        .map(|artifact| {
            let mut entry =
                DownloadEntry::new(artifact.url.clone(), artifact.path.clone(), artifact.sha1.clone());
            entry.size = artifact.size;
            entry
        })
        .collect();
    let plain_total = entries.len();
    let batch = downloader.download_batch(entries, None).await;

    let native_total = plan.natives.len();
    let (native_ok, native_failed) =
        install_natives(config, downloader, version_name, plan.natives).await?;

    let outcome = LibraryOutcome {
        total: plain_total + native_total + skipped,
        succeeded: batch.succeeded + native_ok,
        failed: batch.failed + native_failed,
        skipped,
    };
    info!(
        "Processed {} libraries for {}: {} ok, {} failed, {} skipped",
        outcome.total, version_name, outcome.succeeded, outcome.failed, outcome.skipped
    );
    Ok(outcome)
}

/// Download a set of plain library JARs without touching the natives
/// directory. Used by overlays that materialize only their own additions.
pub async fn download_plain_libraries(
    config: &LauncherConfig,
    downloader: &Downloader,
    libraries: &[Library],
    platform: &Platform,
) -> SdkResult<LibraryOutcome> {
    let plan = plan_downloads(libraries, platform, config.source, &config.libraries_dir());

    let entries: Vec<DownloadEntry> = plan
        .plain
        .iter()
        .map(|artifact| {
            let mut entry =
                DownloadEntry::new(artifact.url.clone(), artifact.path.clone(), artifact.sha1.clone());
            entry.size = artifact.size;
            entry
        })
        .collect();
    let total = entries.len() + plan.skipped;
    let batch = downloader.download_batch(entries, None).await;

    Ok(LibraryOutcome {
        total,
        succeeded: batch.succeeded,
        failed: batch.failed,
        skipped: plan.skipped,
    })
}

/// Classify `libraries` for `platform` into plain downloads, native JARs
/// and skipped entries. Pure: no I/O besides path construction.
pub(crate) fn plan_downloads(
    libraries: &[Library],
    platform: &Platform,
    source: Source,
    libraries_dir: &Path,
) -> LibraryPlan {
    let mut plan = LibraryPlan::default();

    for lib in libraries {
        if !lib.is_applicable(platform) {
            debug!("Skipping library (rules): {}", lib.name);
            continue;
        }

        // Legacy split entries: the `natives` map names a classifier JAR to
        // extract for this OS.
        if let Some(classifier) = lib.native_classifier(platform) {
            match resolve_classifier(lib, &classifier, source, libraries_dir) {
                Some(artifact) => plan.natives.push(NativeJar {
                    artifact,
                    extract: lib.extract.clone(),
                }),
                None => plan.skipped += 1,
            }
            continue;
        }

        // Modern entries carry the natives classifier in the coordinate
        // itself; each such entry is one platform's native JAR.
        if let Some(classifier) = lib.name_classifier() {
            if classifier.starts_with("natives-") {
                if native_classifier_matches(classifier, platform) {
                    match resolve_artifact(lib, source, libraries_dir) {
                        Some(artifact) => plan.natives.push(NativeJar {
                            artifact,
                            extract: lib.extract.clone(),
                        }),
                        None => plan.skipped += 1,
                    }
                }
                continue;
            }
        }

        if lib.is_native(platform) {
            // Native via the classifier table or a platform-named version:
            // prefer the OS classifier JAR, fall back to the main artifact.
            let os_classifier = format!("natives-{}", platform.os_name);
            match resolve_classifier(lib, &os_classifier, source, libraries_dir)
                .filter(|_| has_classifier_entry(lib, &os_classifier))
                .or_else(|| resolve_artifact(lib, source, libraries_dir))
            {
                Some(artifact) => plan.natives.push(NativeJar {
                    artifact,
                    extract: lib.extract.clone(),
                }),
                None => plan.skipped += 1,
            }
            continue;
        }

        match resolve_artifact(lib, source, libraries_dir) {
            Some(artifact) => plan.plain.push(artifact),
            None => plan.skipped += 1,
        }
    }

    plan
}

/// Resolve a library's main artifact: explicit `downloads.artifact` wins,
/// otherwise the Maven coordinate is derived against the library's own
/// repository or the Mojang one.
pub(crate) fn resolve_artifact(
    lib: &Library,
    source: Source,
    libraries_dir: &Path,
) -> Option<ResolvedArtifact> {
    let explicit = lib
        .downloads
        .as_ref()
        .and_then(|d| d.artifact.as_ref())
        .filter(|a| !a.url.is_empty());

    if let Some(artifact) = explicit {
        let rel = match &artifact.path {
            Some(path) => PathBuf::from(path),
            None => MavenCoordinate::parse(&lib.name).ok()?.repository_path(),
        };
        return Some(ResolvedArtifact {
            url: source.rewrite(&artifact.url),
            path: libraries_dir.join(rel),
            sha1: artifact.sha1.clone(),
            size: artifact.size,
        });
    }

    let coordinate = MavenCoordinate::parse(&lib.name).ok()?;
    let base = lib.url.as_deref().unwrap_or(MOJANG_LIBRARIES);
    Some(ResolvedArtifact {
        url: source.rewrite(&coordinate.url(base)),
        path: libraries_dir.join(coordinate.repository_path()),
        sha1: None,
        size: None,
    })
}

fn has_classifier_entry(lib: &Library, classifier: &str) -> bool {
    lib.downloads
        .as_ref()
        .and_then(|d| d.classifiers.as_ref())
        .is_some_and(|c| c.contains_key(classifier))
}

fn resolve_classifier(
    lib: &Library,
    classifier: &str,
    source: Source,
    libraries_dir: &Path,
) -> Option<ResolvedArtifact> {
    let entry = lib
        .downloads
        .as_ref()
        .and_then(|d| d.classifiers.as_ref())
        .and_then(|c| c.get(classifier))
        .filter(|e| !e.url.is_empty());

    if let Some(entry) = entry {
        let rel = match &entry.path {
            Some(path) => PathBuf::from(path),
            None => MavenCoordinate::parse(&lib.name)
                .ok()?
                .with_classifier(classifier)
                .repository_path(),
        };
        return Some(ResolvedArtifact {
            url: source.rewrite(&entry.url),
            path: libraries_dir.join(rel),
            sha1: entry.sha1.clone(),
            size: entry.size,
        });
    }

    let coordinate = MavenCoordinate::parse(&lib.name)
        .ok()?
        .with_classifier(classifier);
    let base = lib.url.as_deref().unwrap_or(MOJANG_LIBRARIES);
    Some(ResolvedArtifact {
        url: source.rewrite(&coordinate.url(base)),
        path: libraries_dir.join(coordinate.repository_path()),
        sha1: None,
        size: None,
    })
}

/// Whether a `natives-*` classifier addresses this platform. Modern Mojang
/// descriptors tag macOS JARs `natives-macos`, older ones `natives-osx`;
/// arch-specific variants append the arch (`natives-windows-x86`).
fn native_classifier_matches(classifier: &str, platform: &Platform) -> bool {
    let Some(rest) = classifier.strip_prefix("natives-") else {
        return false;
    };
    let os_tag = if platform.os_name == "osx" {
        "macos"
    } else {
        platform.os_name
    };
    rest == os_tag
        || rest == platform.os_name
        || rest == format!("{}-{}", os_tag, platform.arch)
        || rest == format!("{}-{}", platform.os_name, platform.arch)
}

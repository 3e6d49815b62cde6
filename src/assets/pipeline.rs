// ─── Asset Pipeline ───
// Resolves the asset index and fans out content-addressed object downloads.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::LauncherConfig;
use crate::downloader::{DownloadEntry, Downloader};
use crate::error::{SdkError, SdkResult};
use crate::version::VersionDescriptor;

/// Share of aggregate progress attributed to the index fetch; object
/// completions fill the rest.
const INDEX_PROGRESS_PERCENT: u8 = 2;

/// Aggregate progress callback, fired with a floored percentage on change.
pub type AssetProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Top-level asset index JSON structure.
#[derive(Debug, Deserialize)]
pub struct AssetIndexFile {
    pub objects: HashMap<String, AssetObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Location of an object below `assets/objects/`: the first two hash
/// characters form the shard directory, the full hash the file name.
pub fn object_relative_path(hash: &str) -> PathBuf {
    PathBuf::from(&hash[..2.min(hash.len())]).join(hash)
}

pub fn object_url(resources_base: &str, hash: &str) -> String {
    format!(
        "{}/{}/{}",
        resources_base.trim_end_matches('/'),
        &hash[..2.min(hash.len())],
        hash
    )
}

/// Download the asset index referenced by `descriptor`, then every object it
/// names. Objects are content-addressed, so a file already present at its
/// hash path is trusted without re-verification; per-object failures are
/// counted but never abort the batch.
pub async fn download_all_assets(
    config: &LauncherConfig,
    downloader: &Downloader,
    descriptor: &VersionDescriptor,
    progress: Option<AssetProgressFn>,
) -> SdkResult<AssetOutcome> {
    let index_ref = descriptor
        .asset_index
        .as_ref()
        .ok_or_else(|| SdkError::Other(format!("{} has no asset index", descriptor.id)))?;

    let index_path = config
        .asset_indexes_dir()
        .join(format!("{}.json", index_ref.id));

    // The index document itself is integrity-checked; a matching local copy
    // skips the network entirely.
    let index_url = config.source.rewrite(&index_ref.url);
    downloader
        .download_file(&index_url, &index_path, index_ref.sha1.as_deref(), None)
        .await?;

    if let Some(callback) = progress.as_ref() {
        callback(INDEX_PROGRESS_PERCENT);
    }

    let raw = tokio::fs::read_to_string(&index_path)
        .await
        .map_err(|e| SdkError::Io {
            path: index_path.clone(),
            source: e,
        })?;
    let index: AssetIndexFile = serde_json::from_str(&raw)?;

    let total = index.objects.len();
    let objects_dir = config.asset_objects_dir();
    let resources_base = config.source.resources_base();

    let mut entries = Vec::new();
    let mut cached = 0usize;
    for object in index.objects.values() {
        let dest = objects_dir.join(object_relative_path(&object.hash));
        if dest.exists() {
            cached += 1;
            continue;
        }
        // The file name is the SHA-1, so per-file verification is redundant;
        // presence implies correctness.
        let mut entry = DownloadEntry::new(object_url(resources_base, &object.hash), dest, None);
        entry.size = Some(object.size);
        entries.push(entry);
    }

    info!(
        "Downloading {} asset objects ({} already cached)",
        entries.len(),
        cached
    );

    let aggregate = progress.map(|callback| {
        let last_emitted = AtomicU8::new(INDEX_PROGRESS_PERCENT);
        let span_base = cached;
        Arc::new(move |done: usize, _batch_total: usize| {
            let finished = span_base + done;
            let percent = if total == 0 {
                100
            } else {
                INDEX_PROGRESS_PERCENT + ((100 - INDEX_PROGRESS_PERCENT) as usize * finished / total) as u8
            };
            // Floored to whole percents; only emit on change to avoid
            // flooding the callback with thousands of identical updates.
            if last_emitted.swap(percent, Ordering::SeqCst) != percent {
                callback(percent);
            }
        }) as crate::downloader::BatchProgressFn
    });

    let outcome = downloader.download_batch(entries, aggregate).await;
    if outcome.failed > 0 {
        warn!("{} asset downloads failed", outcome.failed);
    }

    Ok(AssetOutcome {
        total,
        succeeded: cached + outcome.succeeded,
        failed: outcome.failed,
    })
}

// ─── Version Manifest ───
// The top-level catalog of available game versions, cached on disk with a
// timestamp and trusted for 24 hours.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long the on-disk manifest cache is trusted.
pub const MANIFEST_CACHE_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
}

/// A single manifest entry pointing at a version's descriptor document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionStub {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: VersionKind,
    pub url: String,
    #[serde(rename = "releaseTime")]
    pub release_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestPointers {
    pub release: String,
    pub snapshot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestPointers,
    pub versions: Vec<VersionStub>,
}

impl VersionManifest {
    /// Find a version entry by id (e.g. `"1.20.4"`).
    pub fn find(&self, id: &str) -> Option<&VersionStub> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// All stable releases, in manifest order.
    pub fn releases(&self) -> impl Iterator<Item = &VersionStub> {
        self.versions
            .iter()
            .filter(|v| v.kind == VersionKind::Release)
    }
}

/// On-disk cache envelope: `{"cacheTime": ..., "manifest": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedManifest {
    #[serde(rename = "cacheTime")]
    pub cache_time: DateTime<Utc>,
    pub manifest: VersionManifest,
}

impl CachedManifest {
    pub fn new(manifest: VersionManifest) -> Self {
        Self {
            cache_time: Utc::now(),
            manifest,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.cache_time < Duration::hours(MANIFEST_CACHE_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> VersionManifest {
        serde_json::from_str(
            r#"{
                "latest": {"release": "1.20.4", "snapshot": "24w07a"},
                "versions": [
                    {"id": "24w07a", "type": "snapshot", "url": "https://launchermeta.mojang.com/24w07a.json", "releaseTime": "2024-02-14T10:00:00+00:00"},
                    {"id": "1.20.4", "type": "release", "url": "https://launchermeta.mojang.com/1.20.4.json", "releaseTime": "2023-12-07T08:00:00+00:00", "sha1": "abc123"},
                    {"id": "b1.8.1", "type": "old_beta", "url": "https://launchermeta.mojang.com/b1.8.1.json", "releaseTime": "2011-09-19T22:00:00+00:00"}
                ]
            }"#,
        )
        .expect("manifest json")
    }

    #[test]
    fn finds_versions_by_id() {
        let manifest = sample_manifest();
        let stub = manifest.find("1.20.4").expect("present");
        assert_eq!(stub.kind, VersionKind::Release);
        assert_eq!(stub.sha1.as_deref(), Some("abc123"));
        assert!(manifest.find("1.0.0").is_none());
    }

    #[test]
    fn filters_releases() {
        let manifest = sample_manifest();
        let releases: Vec<_> = manifest.releases().map(|v| v.id.as_str()).collect();
        assert_eq!(releases, vec!["1.20.4"]);
    }

    #[test]
    fn old_version_kinds_deserialize() {
        let manifest = sample_manifest();
        assert_eq!(manifest.find("b1.8.1").map(|v| v.kind), Some(VersionKind::OldBeta));
    }

    #[test]
    fn cache_freshness_window() {
        let cached = CachedManifest::new(sample_manifest());
        let now = cached.cache_time;

        assert!(cached.is_fresh(now + Duration::hours(1)));
        assert!(cached.is_fresh(now + Duration::hours(23)));
        assert!(!cached.is_fresh(now + Duration::hours(25)));
    }

    #[test]
    fn cache_envelope_round_trips() {
        let cached = CachedManifest::new(sample_manifest());
        let json = serde_json::to_string_pretty(&cached).expect("serialize");
        assert!(json.contains("\"cacheTime\""));

        let back: CachedManifest = serde_json::from_str(&json).expect("parse");
        assert_eq!(back.manifest.versions.len(), 3);
    }
}

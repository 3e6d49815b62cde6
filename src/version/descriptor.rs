// ─── Version Descriptor ───
// The per-version document: downloads, asset index, libraries, arguments.
// Mod-loader overlays rewrite this document; the launch materializer only
// reads it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::manifest::VersionKind;
use super::rules::{evaluate_rules, FeatureSet, Platform, Rule};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<VersionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<GameDownloads>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<AssetIndexRef>,
    /// Asset index id, e.g. `"17"`. Redundant with `asset_index.id` in
    /// modern descriptors but the only id source in very old ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<String>,
    #[serde(default)]
    pub libraries: Vec<Library>,
    /// New argument schema (1.13+). Mutually exclusive with
    /// `minecraft_arguments` in practice; both are modeled to accept
    /// either era of descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Arguments>,
    /// Legacy space-delimited game arguments (pre-1.13).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft_arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_version: Option<JavaVersionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar: Option<String>,
    /// Set by the Forge overlay so the launch layer can identify the
    /// loader that produced this descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forge_version: Option<String>,
    /// Set by the Fabric overlay; see `forge_version`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric_version: Option<String>,
}

impl VersionDescriptor {
    /// The asset index id used for `${assets_index_name}`.
    pub fn asset_index_id(&self) -> Option<&str> {
        self.asset_index
            .as_ref()
            .map(|ai| ai.id.as_str())
            .or(self.assets.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<FileDownload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<FileDownload>,
    #[serde(
        default,
        rename = "windows_server",
        skip_serializing_if = "Option::is_none"
    )]
    pub windows_server: Option<FileDownload>,
}

/// A downloadable file reference: client/server JARs, library artifacts and
/// native classifiers all share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDownload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    pub major_version: u32,
}

// ─── Libraries ───

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
    /// Legacy OS → classifier map, e.g. `{"linux": "natives-linux"}`. The
    /// classifier may contain `${arch}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natives: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractPolicy>,
    /// Repository base for coordinate-derived downloads (Fabric profile
    /// convention).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<FileDownload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifiers: Option<HashMap<String, FileDownload>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractPolicy {
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Library {
    /// Whether this library applies on `platform`. A library with no rules
    /// is always applicable; with rules, the last matching rule decides.
    pub fn is_applicable(&self, platform: &Platform) -> bool {
        match &self.rules {
            None => true,
            Some(rules) => evaluate_rules(rules, platform, &FeatureSet::new()),
        }
    }

    /// The coordinate classifier embedded in `name`, if any
    /// (`org.lwjgl:lwjgl:3.3.3:natives-linux` → `natives-linux`).
    pub fn name_classifier(&self) -> Option<&str> {
        let mut parts = self.name.split('@').next().unwrap_or(&self.name).split(':');
        parts.nth(3)
    }

    fn name_version(&self) -> Option<&str> {
        self.name.split('@').next().unwrap_or(&self.name).split(':').nth(2)
    }

    /// The classifier naming this platform's native JAR, resolved from the
    /// legacy `natives` map with `${arch}` substituted.
    pub fn native_classifier(&self, platform: &Platform) -> Option<String> {
        let natives = self.natives.as_ref()?;
        natives
            .get(platform.os_name)
            .map(|c| c.replace("${arch}", platform.arch_bits()))
    }

    /// Classify the library as native (platform shared libraries to be
    /// extracted) or plain (a classpath JAR). A library is native when its
    /// coordinate carries a `natives-*` classifier, when its classifier
    /// table or legacy `natives` map addresses the current OS, or when its
    /// version field names a platform directly.
    pub fn is_native(&self, platform: &Platform) -> bool {
        if self
            .name_classifier()
            .is_some_and(|c| c.starts_with("natives-"))
        {
            return true;
        }
        if self.native_classifier(platform).is_some() {
            return true;
        }
        if let Some(classifiers) = self.downloads.as_ref().and_then(|d| d.classifiers.as_ref()) {
            if classifiers.contains_key(&format!("natives-{}", platform.os_name)) {
                return true;
            }
        }
        if let Some(version) = self.name_version() {
            if version == platform.os_name
                || version == format!("{}-{}", platform.os_name, platform.arch)
            {
                return true;
            }
        }
        false
    }
}

// ─── Arguments ───

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<Argument>,
    #[serde(default)]
    pub jvm: Vec<Argument>,
}

/// One entry of an argument array: either a bare string or a rule-gated
/// record whose value is a string or a list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Plain(String),
    Gated { rules: Vec<Rule>, value: ArgValue },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Single(String),
    Many(Vec<String>),
}

impl ArgValue {
    pub fn tokens(&self) -> &[String] {
        match self {
            ArgValue::Single(s) => std::slice::from_ref(s),
            ArgValue::Many(v) => v.as_slice(),
        }
    }
}

mod descriptor;
mod manifest;
mod resolver;
pub mod rules;

pub use descriptor::{
    ArgValue, Argument, Arguments, AssetIndexRef, ExtractPolicy, FileDownload, GameDownloads,
    JavaVersionInfo, Library, LibraryDownloads, VersionDescriptor,
};
pub use manifest::{CachedManifest, LatestPointers, VersionKind, VersionManifest, VersionStub};
pub use resolver::{DownloadUrls, VersionResolver};
pub use rules::{evaluate_rules, FeatureSet, OsConstraint, Platform, Rule, RuleAction};

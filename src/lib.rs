// ─── craftkit ───
// SDK for fetching, assembling and launching Minecraft Java Edition,
// including the Forge and Fabric modded variants.
//
// Architecture:
//   source      — official/mirror URL routing
//   downloader  — concurrent downloads with SHA-1 validation
//   maven       — coordinate parsing, path/URL derivation
//   version     — manifest + descriptor models, rules, cached resolver
//   assets      — asset index + content-addressed object pipeline
//   library     — rule-filtered library downloads + natives extraction
//   loaders     — descriptor merge, Fabric and Forge overlays
//   launch      — classpath, argument materializer, process spawner

pub mod assets;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod launch;
pub mod launcher;
pub mod library;
pub mod loaders;
pub mod maven;
pub mod source;
pub mod version;

pub use config::LauncherConfig;
pub use error::{SdkError, SdkResult};
pub use launch::{Identity, LaunchCommand, LaunchParameters, LaunchedGame};
pub use launcher::{InstallReport, Launcher};
pub use source::Source;
pub use version::{VersionDescriptor, VersionManifest, VersionStub};

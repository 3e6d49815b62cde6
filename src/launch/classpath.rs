// ─── Classpath Builder ───
// Applicable non-native libraries in descriptor order, main JAR last.

use std::path::PathBuf;

use tracing::debug;

use crate::config::LauncherConfig;
use crate::maven::MavenCoordinate;
use crate::version::rules::Platform;
use crate::version::{Library, VersionDescriptor};

/// The host's classpath entry separator.
pub fn classpath_separator() -> &'static str {
    if cfg!(windows) {
        ";"
    } else {
        ":"
    }
}

/// Build the classpath string for a launch.
///
/// Entries appear in library-declaration order with the main JAR appended
/// last, which keeps mod-loader libraries (appended by the merge) ahead of
/// nothing they need to shadow and makes the result stable across runs.
/// Duplicate paths from merged descriptors are collapsed to their first
/// occurrence so the classpath stays well-formed.
pub fn build_classpath(
    descriptor: &VersionDescriptor,
    config: &LauncherConfig,
    version_name: &str,
    platform: &Platform,
) -> String {
    let libs_dir = config.libraries_dir();
    let mut entries: Vec<String> = Vec::new();

    for lib in &descriptor.libraries {
        if !lib.is_applicable(platform) || lib.is_native(platform) {
            continue;
        }
        let Some(relative) = library_relative_path(lib) else {
            debug!("No classpath entry derivable for {}", lib.name);
            continue;
        };
        let entry = libs_dir.join(relative).display().to_string();
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }

    entries.push(
        config
            .version_jar_path(version_name)
            .display()
            .to_string(),
    );
    entries.join(classpath_separator())
}

fn library_relative_path(lib: &Library) -> Option<PathBuf> {
    if let Some(path) = lib
        .downloads
        .as_ref()
        .and_then(|d| d.artifact.as_ref())
        .and_then(|a| a.path.as_ref())
    {
        return Some(PathBuf::from(path));
    }
    MavenCoordinate::parse(&lib.name)
        .ok()
        .map(|c| c.repository_path())
}

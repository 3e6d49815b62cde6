// ─── Descriptor Merge ───
// Folds a loader overlay into a base descriptor. The merge never mutates
// its inputs; only the on-disk file is overwritten, atomically.

use std::path::Path;

use crate::error::{SdkError, SdkResult};
use crate::version::{Arguments, VersionDescriptor};

/// Merge `overlay` onto `base`:
/// - the overlay's `main_class` wins when present;
/// - overlay libraries are appended after the base's, so later entries win
///   class-loading precedence on the classpath;
/// - when either side uses the new `arguments` schema, jvm and game arrays
///   are concatenated base-first;
/// - otherwise a legacy `minecraft_arguments` on the overlay replaces the
///   base's;
/// - `inherits_from` and `jar` are copied from the overlay when present.
pub fn merge_descriptors(
    base: &VersionDescriptor,
    overlay: &VersionDescriptor,
) -> VersionDescriptor {
    let mut merged = base.clone();

    if let Some(main_class) = overlay.main_class.as_ref().filter(|m| !m.is_empty()) {
        merged.main_class = Some(main_class.clone());
    }

    merged.libraries.extend(overlay.libraries.iter().cloned());

    if base.arguments.is_some() || overlay.arguments.is_some() {
        let base_args = base.arguments.clone().unwrap_or_default();
        let overlay_args = overlay.arguments.clone().unwrap_or_default();
        merged.arguments = Some(Arguments {
            jvm: [base_args.jvm, overlay_args.jvm].concat(),
            game: [base_args.game, overlay_args.game].concat(),
        });
    } else if overlay.minecraft_arguments.is_some() {
        merged.minecraft_arguments = overlay.minecraft_arguments.clone();
    }

    if overlay.inherits_from.is_some() {
        merged.inherits_from = overlay.inherits_from.clone();
    }
    if overlay.jar.is_some() {
        merged.jar = overlay.jar.clone();
    }

    merged
}

/// Read an effective descriptor from disk, mapping a missing file to
/// `TargetMissing` so overlays fail cleanly on uninstalled targets.
pub async fn read_target_descriptor(
    path: &Path,
    target_name: &str,
) -> SdkResult<VersionDescriptor> {
    if !path.exists() {
        return Err(SdkError::TargetMissing(target_name.to_string()));
    }
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SdkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write a descriptor via temp file + rename so a crash mid-write never
/// leaves a truncated document behind.
pub async fn write_descriptor_atomic(
    path: &Path,
    descriptor: &VersionDescriptor,
) -> SdkResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SdkError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }
    let json = serde_json::to_string_pretty(descriptor)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| SdkError::Io {
            path: tmp.clone(),
            source: e,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| SdkError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{Argument, Library};

    fn descriptor(id: &str, main_class: Option<&str>, libraries: &[&str]) -> VersionDescriptor {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "mainClass": main_class,
            "libraries": libraries
                .iter()
                .map(|name| serde_json::json!({"name": name}))
                .collect::<Vec<_>>(),
        }))
        .expect("descriptor")
    }

    fn library_names(libraries: &[Library]) -> Vec<&str> {
        libraries.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn overlay_main_class_wins() {
        let base = descriptor("1.20.4", Some("net.minecraft.client.main.Main"), &[]);
        let overlay = descriptor(
            "fabric",
            Some("net.fabricmc.loader.impl.launch.knot.KnotClient"),
            &[],
        );
        let merged = merge_descriptors(&base, &overlay);
        assert_eq!(
            merged.main_class.as_deref(),
            Some("net.fabricmc.loader.impl.launch.knot.KnotClient")
        );

        let keep = merge_descriptors(&base, &descriptor("x", None, &[]));
        assert_eq!(
            keep.main_class.as_deref(),
            Some("net.minecraft.client.main.Main")
        );
    }

    #[test]
    fn libraries_append_in_order() {
        let base = descriptor("1.20.4", None, &["a:a:1", "b:b:1"]);
        let overlay = descriptor("fabric", None, &["c:c:1"]);
        let merged = merge_descriptors(&base, &overlay);
        assert_eq!(library_names(&merged.libraries), vec!["a:a:1", "b:b:1", "c:c:1"]);
        assert_eq!(
            merged.libraries.len(),
            base.libraries.len() + overlay.libraries.len()
        );
    }

    #[test]
    fn library_merge_is_associative() {
        let a = descriptor("a", None, &["a:a:1"]);
        let b = descriptor("b", None, &["b:b:1", "b:b2:1"]);
        let c = descriptor("c", None, &["c:c:1"]);

        let left = merge_descriptors(&merge_descriptors(&a, &b), &c);
        let right = merge_descriptors(&a, &merge_descriptors(&b, &c));
        assert_eq!(library_names(&left.libraries), library_names(&right.libraries));
    }

    #[test]
    fn new_schema_arguments_concatenate() {
        let mut base = descriptor("1.20.4", None, &[]);
        base.arguments = Some(serde_json::from_value(serde_json::json!({
            "jvm": ["-cp", "${classpath}"],
            "game": ["--username", "${auth_player_name}"]
        }))
        .expect("args"));

        let mut overlay = descriptor("fabric", None, &[]);
        overlay.arguments = Some(serde_json::from_value(serde_json::json!({
            "jvm": ["-DFabricMcEmu=net.minecraft.client.main.Main"],
            "game": []
        }))
        .expect("args"));

        let merged = merge_descriptors(&base, &overlay);
        let arguments = merged.arguments.expect("merged arguments");
        assert_eq!(arguments.jvm.len(), 3);
        assert_eq!(
            arguments.jvm[2],
            Argument::Plain("-DFabricMcEmu=net.minecraft.client.main.Main".into())
        );
        assert_eq!(arguments.game.len(), 2);
    }

    #[test]
    fn one_sided_new_schema_still_concatenates() {
        let base = descriptor("1.7.10", None, &[]);
        let mut overlay = descriptor("loader", None, &[]);
        overlay.arguments = Some(serde_json::from_value(serde_json::json!({
            "jvm": [], "game": ["--tweakClass", "x.y.Tweaker"]
        }))
        .expect("args"));

        let merged = merge_descriptors(&base, &overlay);
        assert!(merged.arguments.is_some());
    }

    #[test]
    fn legacy_arguments_copied_when_no_new_schema() {
        let mut base = descriptor("1.7.10", None, &[]);
        base.minecraft_arguments = Some("--username ${auth_player_name}".into());

        let mut overlay = descriptor("forge", None, &[]);
        overlay.minecraft_arguments =
            Some("--username ${auth_player_name} --tweakClass cpw.mods.fml.common.launcher.FMLTweaker".into());

        let merged = merge_descriptors(&base, &overlay);
        assert_eq!(
            merged.minecraft_arguments.as_deref(),
            Some("--username ${auth_player_name} --tweakClass cpw.mods.fml.common.launcher.FMLTweaker")
        );
    }

    #[tokio::test]
    async fn atomic_write_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("1.20.4.json");

        let descriptor = descriptor("1.20.4", Some("net.minecraft.client.main.Main"), &["a:a:1"]);
        write_descriptor_atomic(&path, &descriptor).await.expect("write");

        let back = read_target_descriptor(&path, "1.20.4").await.expect("read");
        assert_eq!(back.id, "1.20.4");
        assert_eq!(back.libraries.len(), 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn missing_target_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_target_descriptor(&dir.path().join("nope.json"), "nope")
            .await
            .expect_err("missing");
        assert!(matches!(err, SdkError::TargetMissing(name) if name == "nope"));
    }
}

// Cross-module flows exercised against a temporary data directory, without
// touching the network: descriptor merge → launch command, and the
// hash-check idempotence of the client download.

use std::path::Path;

use craftkit::config::LauncherConfig;
use craftkit::launch::{self, Identity, LaunchParameters};
use craftkit::loaders::merge::{merge_descriptors, write_descriptor_atomic};
use craftkit::version::VersionDescriptor;
use craftkit::Launcher;

fn base_descriptor() -> VersionDescriptor {
    serde_json::from_value(serde_json::json!({
        "id": "1.21.1",
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "assets": "17",
        "libraries": [
            {"name": "com.mojang:brigadier:1.2.9"},
            {"name": "com.google.guava:guava:32.1.2-jre"}
        ],
        "arguments": {
            "jvm": ["-Djava.library.path=${natives_directory}", "-cp", "${classpath}"],
            "game": ["--username", "${auth_player_name}", "--assetIndex", "${assets_index_name}"]
        }
    }))
    .expect("base descriptor")
}

fn fabric_profile() -> VersionDescriptor {
    serde_json::from_value(serde_json::json!({
        "id": "fabric-loader-0.16.10-1.21.1",
        "inheritsFrom": "1.21.1",
        "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient",
        "libraries": [
            {"name": "net.fabricmc:intermediary:1.21.1", "url": "https://maven.fabricmc.net/"},
            {"name": "net.fabricmc:fabric-loader:0.16.10", "url": "https://maven.fabricmc.net/"}
        ],
        "arguments": {
            "jvm": ["-DFabricMcEmu= net.minecraft.client.main.Main "],
            "game": []
        }
    }))
    .expect("fabric profile")
}

fn offline_params(version: &str, java: &Path) -> LaunchParameters {
    LaunchParameters::new(version, java, Identity::offline("Steve"))
}

#[tokio::test]
async fn merged_descriptor_launches_with_loader_main_class() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = LauncherConfig::new(dir.path());

    let base = base_descriptor();
    let profile = fabric_profile();
    let mut merged = merge_descriptors(&base, &profile);
    merged.fabric_version = Some("0.16.10".into());

    // The merged library list is the concatenation of both inputs.
    assert_eq!(
        merged.libraries.len(),
        base.libraries.len() + profile.libraries.len()
    );
    assert_eq!(
        merged.main_class.as_deref(),
        Some("net.fabricmc.loader.impl.launch.knot.KnotClient")
    );

    let json_path = config.version_json_path("1.21.1");
    write_descriptor_atomic(&json_path, &merged).await.expect("write");
    std::fs::write(config.version_jar_path("1.21.1"), b"jar").expect("jar");

    let command = launch::generate_command(&config, &offline_params("1.21.1", Path::new("/usr/bin/java")))
        .await
        .expect("command");

    // Loader main class, with the game's own class surviving only inside
    // the classpath and the Fabric emu property.
    assert!(command
        .args
        .iter()
        .any(|a| a == "net.fabricmc.loader.impl.launch.knot.KnotClient"));
    assert!(command.args.iter().all(|a| !a.contains("${")));

    let cp_at = command
        .args
        .iter()
        .position(|a| a == "-cp")
        .expect("classpath flag");
    let classpath = &command.args[cp_at + 1];
    assert!(classpath.contains("brigadier-1.2.9.jar"));
    assert!(classpath.contains("fabric-loader-0.16.10.jar"));
    assert!(classpath.ends_with("1.21.1.jar"));
}

#[tokio::test]
async fn re_running_the_merge_write_is_stable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = LauncherConfig::new(dir.path());
    let json_path = config.version_json_path("1.21.1");

    let merged = merge_descriptors(&base_descriptor(), &fabric_profile());
    write_descriptor_atomic(&json_path, &merged).await.expect("first write");
    let first = std::fs::read_to_string(&json_path).expect("read");

    write_descriptor_atomic(&json_path, &merged).await.expect("second write");
    let second = std::fs::read_to_string(&json_path).expect("read");

    assert_eq!(first, second);
}

#[tokio::test]
async fn verified_client_jar_is_not_refetched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let launcher = Launcher::new(LauncherConfig::new(dir.path())).expect("launcher");
    let config = launcher.config().clone();

    // SHA-1 of "client jar bytes"; the URL is unreachable, so success on
    // both calls proves the hash check short-circuits the network.
    let jar_bytes = b"client jar bytes";
    let sha1 = {
        use sha1::{Digest, Sha1};
        let mut hasher = Sha1::new();
        hasher.update(jar_bytes);
        hex::encode(hasher.finalize())
    };

    let descriptor: VersionDescriptor = serde_json::from_value(serde_json::json!({
        "id": "1.21.1",
        "mainClass": "net.minecraft.client.main.Main",
        "downloads": {
            "client": {"sha1": sha1, "size": jar_bytes.len(), "url": "http://127.0.0.1:1/client.jar"}
        }
    }))
    .expect("descriptor");

    write_descriptor_atomic(&config.version_json_path("1.21.1"), &descriptor)
        .await
        .expect("seed descriptor");
    std::fs::write(config.version_jar_path("1.21.1"), jar_bytes).expect("seed jar");

    let first = launcher.download_client("1.21.1").await.expect("first call");
    let second = launcher.download_client("1.21.1").await.expect("second call");
    assert_eq!(first, second);
    assert_eq!(std::fs::read(first).expect("jar intact"), jar_bytes);
}

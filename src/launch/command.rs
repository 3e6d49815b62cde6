// ─── Launch Command ───
// Composes the final process command line and spawns the game.

use std::path::PathBuf;
use std::process::Stdio;

use tracing::{debug, info};

use crate::config::LauncherConfig;
use crate::error::{SdkError, SdkResult};
use crate::version::rules::Platform;
use crate::version::{Argument, VersionDescriptor};

use super::arguments::{
    feature_set, materialize_arguments, LaunchParameters, PlaceholderContext,
};
use super::classpath::build_classpath;

/// A fully materialized command line: `program [args...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// A spawned game process.
#[derive(Debug)]
pub struct LaunchedGame {
    pub pid: Option<u32>,
    pub child: tokio::process::Child,
}

/// Build the launch command for an installed version without spawning it.
///
/// Shape: `[custom jvm args, descriptor jvm args, memory flags, main class,
/// game args, custom game args]`, with every `${...}` placeholder resolved
/// or dropped.
pub async fn generate_command(
    config: &LauncherConfig,
    params: &LaunchParameters,
) -> SdkResult<LaunchCommand> {
    let version_name = &params.version_name;

    let descriptor_path = config.version_json_path(version_name);
    if !descriptor_path.exists() {
        return Err(SdkError::Launch(format!(
            "version {} is not installed (descriptor missing)",
            version_name
        )));
    }
    let raw = tokio::fs::read_to_string(&descriptor_path)
        .await
        .map_err(|e| SdkError::Io {
            path: descriptor_path.clone(),
            source: e,
        })?;
    let descriptor: VersionDescriptor = serde_json::from_str(&raw)?;

    let jar_path = config.version_jar_path(version_name);
    if !jar_path.exists() {
        return Err(SdkError::Launch(format!(
            "main JAR missing for {}: {:?}",
            version_name, jar_path
        )));
    }

    let main_class = descriptor
        .main_class
        .clone()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| SdkError::Launch(format!("{} has no main class", version_name)))?;

    let platform = Platform::current();
    let features = feature_set(params);
    let classpath = build_classpath(&descriptor, config, version_name, &platform);

    // JVM arguments: caller overrides first, then the descriptor's array
    // (legacy descriptors get the baseline template), then memory flags.
    let mut args: Vec<String> = params.custom_jvm_args.clone();

    let jvm_ctx = PlaceholderContext::build(config, &descriptor, params, Some(&classpath));
    let jvm_template: Vec<Argument> = match descriptor.arguments.as_ref() {
        Some(arguments) if !arguments.jvm.is_empty() => arguments.jvm.clone(),
        _ => default_jvm_arguments(),
    };
    args.extend(materialize_arguments(
        &jvm_template,
        &platform,
        &features,
        &jvm_ctx,
    ));

    if let Some(min_mb) = params.memory.min_mb {
        args.push(format!("-Xmn{}m", min_mb));
    }
    if let Some(max_mb) = params.memory.max_mb {
        args.push(format!("-Xmx{}m", max_mb));
    }

    args.push(main_class);

    // Game arguments: new schema, else whitespace-split legacy string.
    let game_ctx = PlaceholderContext::build(config, &descriptor, params, None);
    let game_template: Vec<Argument> = match descriptor.arguments.as_ref() {
        Some(arguments) => arguments.game.clone(),
        None => descriptor
            .minecraft_arguments
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(|token| Argument::Plain(token.to_string()))
            .collect(),
    };
    args.extend(materialize_arguments(
        &game_template,
        &platform,
        &features,
        &game_ctx,
    ));
    args.extend(params.custom_game_args.iter().cloned());

    debug!("Generated launch command with {} arguments", args.len());
    Ok(LaunchCommand {
        program: params.java_path.clone(),
        args,
    })
}

/// Baseline JVM arguments for descriptors predating the `arguments` schema.
fn default_jvm_arguments() -> Vec<Argument> {
    [
        "-Djava.library.path=${natives_directory}",
        "-Dminecraft.launcher.brand=${launcher_name}",
        "-Dminecraft.launcher.version=${launcher_version}",
        "-cp",
        "${classpath}",
    ]
    .into_iter()
    .map(|s| Argument::Plain(s.to_string()))
    .collect()
}

/// Generate the command and spawn the game process.
///
/// The working directory is the configured game directory (current process
/// directory when unset); stdout/stderr are piped for the caller to drain.
pub async fn launch(
    config: &LauncherConfig,
    params: &LaunchParameters,
) -> SdkResult<LaunchedGame> {
    let command = generate_command(config, params).await?;

    let cwd = match params.game_directory.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| SdkError::Io {
            path: PathBuf::from("."),
            source: e,
        })?,
    };
    tokio::fs::create_dir_all(&cwd)
        .await
        .map_err(|e| SdkError::Io {
            path: cwd.clone(),
            source: e,
        })?;

    info!("Launching {} with {:?}", params.version_name, command.program);
    let child = tokio::process::Command::new(&command.program)
        .args(&command.args)
        .current_dir(&cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SdkError::Launch(format!("failed to spawn game process: {}", e)))?;

    Ok(LaunchedGame {
        pid: child.id(),
        child,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::arguments::Identity;

    fn install_fixture(config: &LauncherConfig, version_name: &str, descriptor: serde_json::Value) {
        let json_path = config.version_json_path(version_name);
        std::fs::create_dir_all(json_path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&json_path, descriptor.to_string()).expect("descriptor");
        std::fs::write(config.version_jar_path(version_name), b"jar bytes").expect("jar");
    }

    fn modern_descriptor() -> serde_json::Value {
        serde_json::json!({
            "id": "1.20.4",
            "type": "release",
            "mainClass": "net.minecraft.client.main.Main",
            "assets": "12",
            "libraries": [
                {"name": "com.a:a:1"},
                {"name": "com.b:b:2"}
            ],
            "arguments": {
                "jvm": ["-Djava.library.path=${natives_directory}", "-cp", "${classpath}"],
                "game": ["--username", "${auth_player_name}",
                         "--gameDir", "${game_directory}",
                         "--width", "${resolution_width}",
                         {"rules": [{"action": "allow", "features": {"is_demo_user": true}}],
                          "value": "--demo"}]
            }
        })
    }

    fn params(version: &str) -> LaunchParameters {
        let mut identity = Identity::offline("Steve");
        identity.uuid = "11112222333344445555666677778888".into();
        LaunchParameters::new(version, "/usr/bin/java", identity)
    }

    #[tokio::test]
    async fn command_is_ordered_and_placeholder_free() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LauncherConfig::new(dir.path());
        install_fixture(&config, "1.20.4", modern_descriptor());

        let mut params = params("1.20.4");
        params.custom_jvm_args = vec!["-XX:+UseG1GC".into()];
        params.memory.max_mb = Some(4096);
        params.custom_game_args = vec!["--server".into(), "mc.example.com".into()];

        let command = generate_command(&config, &params).await.expect("command");
        assert_eq!(command.program, PathBuf::from("/usr/bin/java"));

        // Custom JVM args come first so they can override defaults.
        assert_eq!(command.args[0], "-XX:+UseG1GC");

        let main_at = command
            .args
            .iter()
            .position(|a| a == "net.minecraft.client.main.Main")
            .expect("main class present");
        let xmx_at = command
            .args
            .iter()
            .position(|a| a == "-Xmx4096m")
            .expect("memory flag");
        assert!(xmx_at < main_at, "memory flags precede the main class");

        let username_at = command
            .args
            .iter()
            .position(|a| a == "Steve")
            .expect("username resolved");
        assert!(username_at > main_at, "game args follow the main class");

        // No token may retain an unresolved placeholder, and the dangling
        // `--width ${resolution_width}` pair must vanish entirely.
        assert!(command.args.iter().all(|a| !a.contains("${")));
        assert!(!command.args.iter().any(|a| a == "--width"));
        assert!(!command.args.iter().any(|a| a == "--demo"));

        assert_eq!(command.args.last(), Some(&"mc.example.com".to_string()));

        // The classpath token resolved to entries ending with the main JAR.
        let cp_at = command.args.iter().position(|a| a == "-cp").expect("-cp");
        assert!(command.args[cp_at + 1].ends_with("1.20.4.jar"));
    }

    #[tokio::test]
    async fn legacy_descriptor_gets_baseline_jvm_arguments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LauncherConfig::new(dir.path());
        install_fixture(
            &config,
            "1.7.10",
            serde_json::json!({
                "id": "1.7.10",
                "mainClass": "net.minecraft.client.main.Main",
                "minecraftArguments": "--username ${auth_player_name} --uuid ${auth_uuid} --clientId ${clientid}",
                "libraries": []
            }),
        );

        let command = generate_command(&config, &params("1.7.10"))
            .await
            .expect("command");

        assert!(command.args.iter().any(|a| a == "-cp"));
        assert!(command
            .args
            .iter()
            .any(|a| a.starts_with("-Djava.library.path=")));

        // `${clientid}` has no value: the token and its flag are gone.
        assert!(!command.args.iter().any(|a| a == "--clientId"));
        assert!(command.args.iter().all(|a| !a.contains("${")));
        assert!(command.args.iter().any(|a| a == "Steve"));
    }

    #[tokio::test]
    async fn missing_descriptor_is_a_launch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LauncherConfig::new(dir.path());

        let err = generate_command(&config, &params("ghost"))
            .await
            .expect_err("not installed");
        assert!(matches!(err, SdkError::Launch(_)));
    }

    #[tokio::test]
    async fn missing_jar_is_a_launch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LauncherConfig::new(dir.path());

        let json_path = config.version_json_path("1.20.4");
        std::fs::create_dir_all(json_path.parent().expect("parent")).expect("mkdir");
        std::fs::write(
            &json_path,
            r#"{"id": "1.20.4", "mainClass": "net.minecraft.client.main.Main"}"#,
        )
        .expect("descriptor");

        let err = generate_command(&config, &params("1.20.4"))
            .await
            .expect_err("jar missing");
        assert!(matches!(err, SdkError::Launch(reason) if reason.contains("JAR")));
    }

    #[tokio::test]
    async fn spawn_failure_is_a_launch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LauncherConfig::new(dir.path());
        install_fixture(&config, "1.20.4", modern_descriptor());

        let mut params = params("1.20.4");
        params.java_path = dir.path().join("no-such-java");
        params.game_directory = Some(dir.path().join("game"));

        let err = launch(&config, &params).await.expect_err("spawn fails");
        assert!(matches!(err, SdkError::Launch(_)));
    }
}

// ─── Launch Arguments ───
// Per-invocation parameters, placeholder resolution, and the interpreter
// that turns descriptor argument arrays into concrete command tokens.

use std::collections::BTreeMap;
use std::path::PathBuf;

use uuid::Uuid;

use crate::config::LauncherConfig;
use crate::version::rules::{evaluate_rules, FeatureSet, Platform};
use crate::version::{Argument, VersionDescriptor, VersionKind};

/// Account identity passed through to the game.
#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
    pub uuid: String,
    pub access_token: String,
    pub user_type: String,
    pub client_id: Option<String>,
    pub xuid: Option<String>,
}

impl Identity {
    /// Offline-mode identity with a random UUID and a dummy token.
    pub fn offline(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            uuid: Uuid::new_v4().simple().to_string(),
            access_token: "0".to_string(),
            user_type: "mojang".to_string(),
            client_id: None,
            xuid: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WindowSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fullscreen: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    pub min_mb: Option<u32>,
    pub max_mb: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct QuickPlay {
    pub path: Option<String>,
    pub singleplayer: Option<String>,
    pub multiplayer: Option<String>,
    pub realms: Option<String>,
}

/// Everything one launch invocation needs beyond the descriptor.
#[derive(Debug, Clone)]
pub struct LaunchParameters {
    pub version_name: String,
    pub java_path: PathBuf,
    pub game_directory: Option<PathBuf>,
    pub identity: Identity,
    pub window: WindowSettings,
    pub memory: MemorySettings,
    /// Emitted before the descriptor's JVM arguments so they can override
    /// defaults.
    pub custom_jvm_args: Vec<String>,
    /// Appended after the descriptor's game arguments.
    pub custom_game_args: Vec<String>,
    pub quick_play: QuickPlay,
    pub demo: bool,
    pub version_type: Option<String>,
    /// Free-form placeholder overrides, consulted after the built-ins and
    /// the known Mojang aliases.
    pub extra: BTreeMap<String, String>,
}

impl LaunchParameters {
    pub fn new(
        version_name: impl Into<String>,
        java_path: impl Into<PathBuf>,
        identity: Identity,
    ) -> Self {
        Self {
            version_name: version_name.into(),
            java_path: java_path.into(),
            game_directory: None,
            identity,
            window: WindowSettings::default(),
            memory: MemorySettings::default(),
            custom_jvm_args: Vec::new(),
            custom_game_args: Vec::new(),
            quick_play: QuickPlay::default(),
            demo: false,
            version_type: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Feature flags derived from the launch parameters, matched by argument
/// rules. `has_custom_resolution` requires both dimensions.
pub fn feature_set(params: &LaunchParameters) -> FeatureSet {
    FeatureSet::from([
        (
            "has_custom_resolution".to_string(),
            params.window.width.is_some() && params.window.height.is_some(),
        ),
        ("is_demo_user".to_string(), params.demo),
        (
            "has_quick_plays_support".to_string(),
            params.quick_play.path.is_some(),
        ),
        (
            "is_quick_play_singleplayer".to_string(),
            params.quick_play.singleplayer.is_some(),
        ),
        (
            "is_quick_play_multiplayer".to_string(),
            params.quick_play.multiplayer.is_some(),
        ),
        (
            "is_quick_play_realms".to_string(),
            params.quick_play.realms.is_some(),
        ),
    ])
}

/// Resolves `${name}` tokens. Lookup order: built-ins, then the Mojang
/// parameter aliases, then the caller's `extra` map. Empty resolutions are
/// treated as absent so the token gets dropped rather than emitted blank.
pub struct PlaceholderContext {
    values: BTreeMap<String, String>,
    extra: BTreeMap<String, String>,
}

impl PlaceholderContext {
    pub fn build(
        config: &LauncherConfig,
        descriptor: &VersionDescriptor,
        params: &LaunchParameters,
        classpath: Option<&str>,
    ) -> Self {
        let mut values = BTreeMap::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                values.insert(key.to_string(), value);
            }
        };

        let version_name = &params.version_name;
        let game_directory = params
            .game_directory
            .clone()
            .unwrap_or_else(|| config.data_dir.clone());

        // Built-ins.
        set(
            "natives_directory",
            Some(config.natives_dir(version_name).display().to_string()),
        );
        set("launcher_name", Some(config.launcher_name.clone()));
        set("launcher_version", Some(config.launcher_version.clone()));
        // The classpath exists only while materializing JVM arguments; game
        // arguments never see it.
        set("classpath", classpath.map(str::to_string));

        // Mojang parameter aliases.
        set("auth_player_name", Some(params.identity.username.clone()));
        set("version_name", Some(version_name.clone()));
        set("game_directory", Some(game_directory.display().to_string()));
        set("assets_root", Some(config.assets_dir().display().to_string()));
        set(
            "assets_index_name",
            descriptor.asset_index_id().map(str::to_string),
        );
        set("auth_uuid", Some(params.identity.uuid.clone()));
        set("auth_access_token", Some(params.identity.access_token.clone()));
        set("clientid", params.identity.client_id.clone());
        set("auth_xuid", params.identity.xuid.clone());
        set("user_type", Some(params.identity.user_type.clone()));
        set(
            "version_type",
            params
                .version_type
                .clone()
                .or_else(|| descriptor.kind.map(|k| kind_label(k).to_string())),
        );
        set("resolution_width", params.window.width.map(|w| w.to_string()));
        set(
            "resolution_height",
            params.window.height.map(|h| h.to_string()),
        );
        set("quickPlayPath", params.quick_play.path.clone());
        set(
            "quickPlaySingleplayer",
            params.quick_play.singleplayer.clone(),
        );
        set("quickPlayMultiplayer", params.quick_play.multiplayer.clone());
        set("quickPlayRealms", params.quick_play.realms.clone());

        Self {
            values,
            extra: params.extra.clone(),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .or_else(|| self.extra.get(name))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn kind_label(kind: VersionKind) -> &'static str {
    match kind {
        VersionKind::Release => "release",
        VersionKind::Snapshot => "snapshot",
        VersionKind::OldBeta => "old_beta",
        VersionKind::OldAlpha => "old_alpha",
    }
}

/// Substitute every `${name}` in `token`. `None` when any placeholder fails
/// to resolve; such tokens are dropped, never emitted half-filled.
pub fn substitute(token: &str, ctx: &PlaceholderContext) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}')?;
        out.push_str(ctx.resolve(&after[..end])?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Some(out)
}

/// Interpret an argument array into concrete tokens: gated entries are
/// included only when their rules allow, and a token whose placeholder
/// cannot be resolved is dropped together with the `--flag` it was meant to
/// pair with.
pub fn materialize_arguments(
    args: &[Argument],
    platform: &Platform,
    features: &FeatureSet,
    ctx: &PlaceholderContext,
) -> Vec<String> {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Argument::Plain(token) => emit_token(&mut out, token, ctx),
            Argument::Gated { rules, value } => {
                if evaluate_rules(rules, platform, features) {
                    for token in value.tokens() {
                        emit_token(&mut out, token, ctx);
                    }
                }
            }
        }
    }
    out
}

fn emit_token(out: &mut Vec<String>, token: &str, ctx: &PlaceholderContext) {
    match substitute(token, ctx) {
        Some(resolved) => out.push(resolved),
        None => {
            if out.last().is_some_and(|prev| prev.starts_with("--")) {
                out.pop();
            }
        }
    }
}

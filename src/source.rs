// ─── Source Router ───
// Maps canonical upstream URLs onto the selected download source.

use serde::{Deserialize, Serialize};

/// Canonical upstream endpoints.
pub const OFFICIAL_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";
pub const OFFICIAL_RESOURCES_BASE: &str = "https://resources.download.minecraft.net";
pub const OFFICIAL_LIBRARIES_BASE: &str = "https://libraries.minecraft.net";

const MIRROR_MANIFEST_URL: &str = "https://bmclapi2.bangbang93.com/mc/game/version_manifest.json";
const MIRROR_RESOURCES_BASE: &str = "https://bmclapi2.bangbang93.com/assets";
const MIRROR_LIBRARIES_BASE: &str = "https://bmclapi2.bangbang93.com/maven";

/// Host substitutions applied when rewriting a canonical URL for the mirror.
/// Longest prefixes first so `files.minecraftforge.net/maven` wins over any
/// shorter overlap.
const MIRROR_REWRITES: &[(&str, &str)] = &[
    (
        "https://resources.download.minecraft.net",
        "https://bmclapi2.bangbang93.com/assets",
    ),
    (
        "https://libraries.minecraft.net",
        "https://bmclapi2.bangbang93.com/maven",
    ),
    (
        "https://files.minecraftforge.net/maven",
        "https://bmclapi2.bangbang93.com/forge",
    ),
    (
        "https://launchermeta.mojang.com",
        "https://bmclapi2.bangbang93.com",
    ),
    (
        "https://piston-meta.mojang.com",
        "https://bmclapi2.bangbang93.com",
    ),
    (
        "https://piston-data.mojang.com",
        "https://bmclapi2.bangbang93.com",
    ),
    (
        "https://launcher.mojang.com",
        "https://bmclapi2.bangbang93.com",
    ),
];

/// Where game files are fetched from: the canonical Mojang upstream, or the
/// BMCLAPI mirror for users closer to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Official,
    Mirror,
}

impl Source {
    /// URL of the top-level version manifest.
    pub fn manifest_url(self) -> &'static str {
        match self {
            Source::Official => OFFICIAL_MANIFEST_URL,
            Source::Mirror => MIRROR_MANIFEST_URL,
        }
    }

    /// Base URL for content-addressed asset objects.
    pub fn resources_base(self) -> &'static str {
        match self {
            Source::Official => OFFICIAL_RESOURCES_BASE,
            Source::Mirror => MIRROR_RESOURCES_BASE,
        }
    }

    /// Base URL for library JARs resolved from Maven coordinates.
    pub fn libraries_base(self) -> &'static str {
        match self {
            Source::Official => OFFICIAL_LIBRARIES_BASE,
            Source::Mirror => MIRROR_LIBRARIES_BASE,
        }
    }

    /// Rewrite a canonical upstream URL for this source.
    ///
    /// Stateless and total: for the official source the URL passes through
    /// untouched, and so does any URL whose host has no mirror mapping.
    pub fn rewrite(self, url: &str) -> String {
        if self == Source::Official {
            return url.to_string();
        }
        for (canonical, mirror) in MIRROR_REWRITES {
            if let Some(rest) = url.strip_prefix(canonical) {
                return format!("{}{}", mirror, rest);
            }
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_is_identity() {
        let url = "https://resources.download.minecraft.net/a1/a1b2";
        assert_eq!(Source::Official.rewrite(url), url);
    }

    #[test]
    fn mirror_rewrites_resources() {
        assert_eq!(
            Source::Mirror.rewrite("https://resources.download.minecraft.net/a1/a1b2"),
            "https://bmclapi2.bangbang93.com/assets/a1/a1b2"
        );
    }

    #[test]
    fn mirror_rewrites_libraries() {
        assert_eq!(
            Source::Mirror.rewrite("https://libraries.minecraft.net/org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3.jar"),
            "https://bmclapi2.bangbang93.com/maven/org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3.jar"
        );
    }

    #[test]
    fn mirror_rewrites_version_metadata() {
        assert_eq!(
            Source::Mirror.rewrite("https://launchermeta.mojang.com/v1/packages/abc/1.20.4.json"),
            "https://bmclapi2.bangbang93.com/v1/packages/abc/1.20.4.json"
        );
    }

    #[test]
    fn mirror_rewrites_forge_maven() {
        assert_eq!(
            Source::Mirror
                .rewrite("https://files.minecraftforge.net/maven/net/minecraftforge/forge/x.jar"),
            "https://bmclapi2.bangbang93.com/forge/net/minecraftforge/forge/x.jar"
        );
    }

    #[test]
    fn unknown_hosts_pass_through() {
        let url = "https://meta.fabricmc.net/v2/versions/loader";
        assert_eq!(Source::Mirror.rewrite(url), url);
    }
}

// ─── Rule Evaluation ───
// OS/arch/feature gating shared by libraries and launch arguments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A conditional gate controlling whether a library or argument applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

/// Feature flags provided by the caller, matched against rule `features`
/// clauses. Missing keys count as `false`.
pub type FeatureSet = BTreeMap<String, bool>;

/// The host (or simulated) platform a descriptor is evaluated against.
/// Keeping this a plain value makes rule evaluation a pure function of
/// `(rules, platform, features)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Mojang OS name: `windows`, `osx` or `linux`.
    pub os_name: &'static str,
    /// `x86`, `x64` or `arm64`.
    pub arch: &'static str,
}

pub const WINDOWS_X64: Platform = Platform::new("windows", "x64");
pub const OSX_ARM64: Platform = Platform::new("osx", "arm64");
pub const LINUX_X64: Platform = Platform::new("linux", "x64");

impl Platform {
    pub const fn new(os_name: &'static str, arch: &'static str) -> Self {
        Self { os_name, arch }
    }

    pub fn current() -> Self {
        let os_name = if cfg!(target_os = "windows") {
            "windows"
        } else if cfg!(target_os = "macos") {
            "osx"
        } else {
            "linux"
        };
        let arch = if cfg!(target_arch = "aarch64") {
            "arm64"
        } else if cfg!(target_arch = "x86") {
            "x86"
        } else {
            "x64"
        };
        Self { os_name, arch }
    }

    /// JVM pointer width, substituted for `${arch}` in legacy native
    /// classifier names.
    pub fn arch_bits(&self) -> &'static str {
        if self.arch == "x86" {
            "32"
        } else {
            "64"
        }
    }
}

/// Evaluate a rule list.
///
/// Rules are scanned in order; the action of the last matching rule wins.
/// The initial state is disallowed, so a list in which no rule matches
/// evaluates to not applicable. Callers decide what an absent list means
/// (libraries without rules are always applicable).
pub fn evaluate_rules(rules: &[Rule], platform: &Platform, features: &FeatureSet) -> bool {
    let mut allowed = false;
    for rule in rules {
        if rule_matches(rule, platform, features) {
            allowed = rule.action == RuleAction::Allow;
        }
    }
    allowed
}

fn rule_matches(rule: &Rule, platform: &Platform, features: &FeatureSet) -> bool {
    if let Some(os) = &rule.os {
        if let Some(name) = &os.name {
            if name != platform.os_name {
                return false;
            }
        }
        if let Some(arch) = &os.arch {
            if arch != platform.arch {
                return false;
            }
        }
        // os.version carries an OS-release regex in some descriptors. No
        // portable host probe exists for it, so a name/arch match is
        // accepted regardless of the version clause.
    }
    if let Some(required) = &rule.features {
        for (key, expected) in required {
            if features.get(key).copied().unwrap_or(false) != *expected {
                return false;
            }
        }
    }
    true
}

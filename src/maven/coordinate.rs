use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SdkError;

/// A parsed `group:artifact:version[:classifier][@extension]` coordinate.
///
/// Library names in version descriptors double as Maven coordinates, so a
/// download path and URL can be derived deterministically whenever the
/// descriptor omits an explicit `downloads.artifact` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MavenCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension; `jar` unless the coordinate carries `@<ext>`.
    pub extension: String,
}

impl FromStr for MavenCoordinate {
    type Err = SdkError;

    fn from_str(coord: &str) -> Result<Self, Self::Err> {
        let (gav, extension) = match coord.rsplit_once('@') {
            Some((gav, ext)) if !ext.is_empty() && !ext.contains(':') => (gav, ext),
            _ => (coord, "jar"),
        };

        let mut parts = gav.split(':');
        let (group, artifact, version) = match (parts.next(), parts.next(), parts.next()) {
            (Some(g), Some(a), Some(v)) if !g.is_empty() && !a.is_empty() && !v.is_empty() => {
                (g, a, v)
            }
            _ => return Err(SdkError::InvalidMavenCoordinate(coord.to_string())),
        };
        let classifier = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(SdkError::InvalidMavenCoordinate(coord.to_string()));
        }

        Ok(Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            classifier,
            extension: extension.to_string(),
        })
    }
}

impl MavenCoordinate {
    pub fn parse(coord: &str) -> Result<Self, SdkError> {
        coord.parse()
    }

    /// `artifact-version[-classifier].extension`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}-{}-{}.{}", self.artifact, self.version, c, self.extension),
            None => format!("{}-{}.{}", self.artifact, self.version, self.extension),
        }
    }

    /// Path relative to a libraries directory, mirroring the Maven repo
    /// layout: `group/with/slashes/artifact/version/file`.
    pub fn repository_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.group.split('.') {
            path.push(segment);
        }
        path.push(&self.artifact);
        path.push(&self.version);
        path.push(self.file_name());
        path
    }

    /// Absolute URL under `repo_base`.
    pub fn url(&self, repo_base: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            repo_base.trim_end_matches('/'),
            self.group.replace('.', "/"),
            self.artifact,
            self.version,
            self.file_name()
        )
    }

    /// Coordinate variant carrying a classifier, used to address native JARs
    /// (`natives-linux`, `natives-windows`, ...).
    pub fn with_classifier(&self, classifier: &str) -> Self {
        let mut coord = self.clone();
        coord.classifier = Some(classifier.to_string());
        coord
    }

    /// Whether the coordinate itself names a platform-native artifact.
    pub fn has_natives_classifier(&self) -> bool {
        self.classifier
            .as_deref()
            .is_some_and(|c| c.starts_with("natives-"))
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{}", c)?;
        }
        if self.extension != "jar" {
            write!(f, "@{}", self.extension)?;
        }
        Ok(())
    }
}

//! Project and build records as supplied by a release catalog.

use serde::{Deserialize, Serialize};

use crate::fact::Field;

/// A project whose releases are being classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Canonical project name.
    pub name: String,
    /// Every spelling the project uses in asset names. Replaces `name` for
    /// file-name matching when non-empty.
    #[serde(
        rename = "_names",
        alias = "names",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub names: Vec<String>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Project {
            name: name.into(),
            names: Vec::new(),
        }
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Names to look for in asset file names.
    pub fn file_names(&self) -> Vec<&str> {
        if self.names.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.names.iter().map(String::as_str).collect()
        }
    }
}

/// One downloadable asset of one release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Build {
    /// Asset file name, when the catalog reports it separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Download URL or file name.
    pub download: String,
    /// File name to classify instead of `download` (for opaque URLs).
    #[serde(alias = "_filename", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Normalized release version.
    pub version: String,
    /// The version exactly as it appears in file names, if it differs.
    #[serde(
        rename = "_version",
        alias = "raw_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libc: Option<String>,
}

impl Build {
    pub fn new(download: impl Into<String>, version: impl Into<String>) -> Self {
        Build {
            download: download.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// The text whose terms describe this build.
    pub fn source_text(&self) -> &str {
        self.filename.as_deref().unwrap_or(&self.download)
    }

    /// The version as spelled in file names.
    pub fn file_version(&self) -> &str {
        self.raw_version.as_deref().unwrap_or(&self.version)
    }

    /// A caller-supplied value for `field`, ignoring empty strings.
    pub fn hint(&self, field: Field) -> Option<&str> {
        let hint = match field {
            Field::Os => &self.os,
            Field::Arch => &self.arch,
            Field::Vendor => &self.vendor,
            Field::Libc => &self.libc,
        };
        hint.as_deref().filter(|value| !value.is_empty())
    }

    /// Identifies the build in error messages.
    pub fn subject(&self, project: &Project) -> String {
        format!("{} {}", project.name, self.download)
    }
}

//! ONIX release detection.

use std::fmt;

use tracing::debug;

use super::tree::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnixRelease {
    V2_1,
    V3_0,
}

impl OnixRelease {
    pub fn as_str(self) -> &'static str {
        match self {
            OnixRelease::V2_1 => "2.1",
            OnixRelease::V3_0 => "3.0",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with("3.") || value == "3" {
            Some(OnixRelease::V3_0)
        } else if value.starts_with("2.") || value == "2" {
            Some(OnixRelease::V2_1)
        } else {
            None
        }
    }
}

impl fmt::Display for OnixRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release and tag format of an input message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnixVersion {
    pub release: OnixRelease,
    pub reference_tags: bool,
}

fn namespaces(root: &Element) -> impl Iterator<Item = &str> {
    root.attributes
        .iter()
        .filter(|(key, _)| key == "xmlns" || key.starts_with("xmlns:"))
        .map(|(_, value)| value.as_str())
}

/// Work out which ONIX release and tag format `root` uses.
///
/// Checked in order: namespace URI, `Header/Release` (or the `release`
/// attribute of the root), then structural fingerprints. Without any
/// evidence the message is taken as 2.1 with reference tags.
pub fn detect_version(root: &Element) -> OnixVersion {
    let short_tags = root.name == "ONIXmessage"
        || namespaces(root).any(|ns| ns.contains("/short"))
        || root.name == "a001"
        || root.find("a001").is_some();
    let version = |release| OnixVersion {
        release,
        reference_tags: !short_tags,
    };

    for ns in namespaces(root) {
        if ns.contains("onix/3.0") {
            debug!(namespace = ns, "Release from namespace");
            return version(OnixRelease::V3_0);
        }
        if ns.contains("onix/2.1") {
            debug!(namespace = ns, "Release from namespace");
            return version(OnixRelease::V2_1);
        }
    }

    let declared = root
        .child("Header")
        .or_else(|| root.child("header"))
        .and_then(|header| header.child_text("Release"))
        .or_else(|| root.attr("release").map(str::to_string));
    if let Some(release) = declared.as_deref().and_then(OnixRelease::parse) {
        debug!(release = %release, "Release declared");
        return version(release);
    }

    if root.name == "ProductComposition"
        || root.find("ProductComposition").is_some()
        || root.find("x314").is_some()
    {
        return version(OnixRelease::V3_0);
    }
    version(OnixRelease::V2_1)
}

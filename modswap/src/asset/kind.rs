//! Asset kinds and extracted asset payloads.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The closed set of asset kinds the replacement engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Texture,
    Material,
    Mesh,
    Animation,
    AudioClip,
    Sprite,
    Shader,
    Font,
    WholeObject,
}

impl AssetKind {
    /// All kinds, in declaration order.
    pub const ALL: [AssetKind; 9] = [
        AssetKind::Texture,
        AssetKind::Material,
        AssetKind::Mesh,
        AssetKind::Animation,
        AssetKind::AudioClip,
        AssetKind::Sprite,
        AssetKind::Shader,
        AssetKind::Font,
        AssetKind::WholeObject,
    ];

    /// Canonical tag written in archive indexes.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Texture => "Texture",
            Self::Material => "Material",
            Self::Mesh => "Mesh",
            Self::Animation => "Animation",
            Self::AudioClip => "AudioClip",
            Self::Sprite => "Sprite",
            Self::Shader => "Shader",
            Self::Font => "Font",
            Self::WholeObject => "WholeObject",
        }
    }

    /// Parse an archive index tag.
    ///
    /// `Audio` and `GameObject` are accepted as older spellings. Returns
    /// `None` for tags outside the supported set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "Texture" => Self::Texture,
            "Material" => Self::Material,
            "Mesh" => Self::Mesh,
            "Animation" => Self::Animation,
            "AudioClip" | "Audio" => Self::AudioClip,
            "Sprite" => Self::Sprite,
            "Shader" => Self::Shader,
            "Font" => Self::Font,
            "WholeObject" | "GameObject" => Self::WholeObject,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Name and raw bytes of one asset.
///
/// Cloning is cheap: the payload is reference counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetData {
    /// Asset name inside its archive.
    pub name: String,
    /// Raw payload.
    pub bytes: Bytes,
}

impl AssetData {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// An asset extracted from an archive, tagged with its kind.
///
/// Produced by the asset loader, consumed once by the replacement engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedAsset {
    Texture(AssetData),
    Material(AssetData),
    Mesh(AssetData),
    Animation(AssetData),
    AudioClip(AssetData),
    Sprite(AssetData),
    Shader(AssetData),
    Font(AssetData),
    WholeObject(AssetData),
}

impl ExtractedAsset {
    /// Tag a payload with its kind.
    pub fn new(kind: AssetKind, data: AssetData) -> Self {
        match kind {
            AssetKind::Texture => Self::Texture(data),
            AssetKind::Material => Self::Material(data),
            AssetKind::Mesh => Self::Mesh(data),
            AssetKind::Animation => Self::Animation(data),
            AssetKind::AudioClip => Self::AudioClip(data),
            AssetKind::Sprite => Self::Sprite(data),
            AssetKind::Shader => Self::Shader(data),
            AssetKind::Font => Self::Font(data),
            AssetKind::WholeObject => Self::WholeObject(data),
        }
    }

    /// The kind tag.
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Texture(_) => AssetKind::Texture,
            Self::Material(_) => AssetKind::Material,
            Self::Mesh(_) => AssetKind::Mesh,
            Self::Animation(_) => AssetKind::Animation,
            Self::AudioClip(_) => AssetKind::AudioClip,
            Self::Sprite(_) => AssetKind::Sprite,
            Self::Shader(_) => AssetKind::Shader,
            Self::Font(_) => AssetKind::Font,
            Self::WholeObject(_) => AssetKind::WholeObject,
        }
    }

    /// The payload, whatever the kind.
    pub fn data(&self) -> &AssetData {
        match self {
            Self::Texture(d)
            | Self::Material(d)
            | Self::Mesh(d)
            | Self::Animation(d)
            | Self::AudioClip(d)
            | Self::Sprite(d)
            | Self::Shader(d)
            | Self::Font(d)
            | Self::WholeObject(d) => d,
        }
    }

    /// Asset name.
    pub fn name(&self) -> &str {
        &self.data().name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip_for_all_kinds() {
        for kind in AssetKind::ALL {
            assert_eq!(AssetKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn test_legacy_tags() {
        assert_eq!(AssetKind::from_tag("Audio"), Some(AssetKind::AudioClip));
        assert_eq!(AssetKind::from_tag("GameObject"), Some(AssetKind::WholeObject));
    }

    #[test]
    fn test_unsupported_tags() {
        assert_eq!(AssetKind::from_tag("ScriptableObject"), None);
        assert_eq!(AssetKind::from_tag("SceneAsset"), None);
        assert_eq!(AssetKind::from_tag("texture"), None);
    }

    #[test]
    fn test_extracted_asset_kind_matches_constructor() {
        for kind in AssetKind::ALL {
            let asset = ExtractedAsset::new(kind, AssetData::new("a", vec![1u8, 2, 3]));
            assert_eq!(asset.kind(), kind);
            assert_eq!(asset.name(), "a");
            assert_eq!(asset.data().bytes.as_ref(), &[1, 2, 3]);
        }
    }
}

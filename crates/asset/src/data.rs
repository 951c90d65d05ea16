//! Decoded asset payloads.

use anyhow::{Context, Result};

use crate::{asset::AssetType, texture::TextureData};

#[derive(Clone, Debug, PartialEq)]
pub enum AssetData {
    Texture(TextureData),
    /// Encoded audio; playback decodes it.
    Audio(Vec<u8>),
    Text(String),
    Binary(Vec<u8>),
}

impl AssetData {
    /// Turn raw source bytes into the payload for `asset_type`.
    pub fn decode(asset_type: AssetType, bytes: Vec<u8>) -> Result<Self> {
        match asset_type {
            AssetType::Image => TextureData::decode(&bytes).map(AssetData::Texture),
            AssetType::Audio => Ok(AssetData::Audio(bytes)),
            AssetType::Text => String::from_utf8(bytes)
                .context("Text asset is not valid UTF-8")
                .map(AssetData::Text),
            AssetType::Binary => Ok(AssetData::Binary(bytes)),
        }
    }

    pub fn as_texture(&self) -> Option<&TextureData> {
        match self {
            AssetData::Texture(tex) => Some(tex),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AssetData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AssetData::Texture(tex) => tex.data.len(),
            AssetData::Audio(bytes) | AssetData::Binary(bytes) => bytes.len(),
            AssetData::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

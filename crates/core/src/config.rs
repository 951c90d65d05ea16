//! Flat option structure every entity is configured from.

use serde::Deserialize;

use crate::{CoreError, CoreResult, Pivot, Transform, vec3};

/// Placement and identity options shared by every entity kind.
///
/// Missing fields fall back to an untransformed, fully opaque entity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub scale_z: f32,
    pub pivot_x: f32,
    pub pivot_y: f32,
    pub alpha: f32,
    pub tag: Option<String>,
    pub name: Option<String>,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            width: 0.0,
            height: 0.0,
            depth: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            scale_z: 1.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
            alpha: 1.0,
            tag: None,
            name: None,
        }
    }
}

impl EntityConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Reject values that would poison the transform.
    pub fn validate(&self) -> CoreResult<()> {
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("z", self.z),
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
            ("scale_x", self.scale_x),
            ("scale_y", self.scale_y),
            ("scale_z", self.scale_z),
            ("pivot_x", self.pivot_x),
            ("pivot_y", self.pivot_y),
            ("alpha", self.alpha),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(CoreError::InvalidConfig {
                    field,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(CoreError::InvalidConfig {
                field: "alpha",
                reason: format!("must be within [0, 1], got {}", self.alpha),
            });
        }
        Ok(())
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: vec3(self.x, self.y, self.z),
            scale: vec3(self.scale_x, self.scale_y, self.scale_z),
            size: vec3(self.width, self.height, self.depth),
            pivot: Pivot::new(self.pivot_x, self.pivot_y),
            alpha: self.alpha.clamp(0.0, 1.0),
            ..Transform::identity()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_identity_like() {
        let config = EntityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transform(), Transform::identity());
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        let config = EntityConfig {
            alpha: 1.5,
            ..EntityConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { field: "alpha", .. }));
    }

    #[test]
    fn rejects_non_finite_position() {
        let config = EntityConfig {
            y: f32::NAN,
            ..EntityConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig { field: "y", .. })
        ));
    }
}

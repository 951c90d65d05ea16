//! Core shared types: errors, event channels, transform math and entity options.

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod config;
pub mod error;
pub mod event;
pub mod pivot;
pub mod transform;

pub use config::EntityConfig;
pub use error::{CoreError, CoreResult};
pub use event::{Channel, Subscription};
pub use pivot::Pivot;
pub use transform::Transform;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let t = Transform::identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_matrix() {
        let t = Transform::from_trs(
            vec3(1.0, 2.0, 3.0),
            vec3(0.0, 0.0, 0.0),
            vec3(2.0, 2.0, 2.0),
        );
        // Last column holds the translation, diagonal the scale (no rotation, no pivot).
        let m = t.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
        assert!((m[0] - 2.0).abs() < 1e-6);
        assert!((m[5] - 2.0).abs() < 1e-6);
        assert!((m[10] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn config_builds_matching_transform() {
        let config = EntityConfig {
            x: 4.0,
            width: 10.0,
            height: 20.0,
            pivot_x: 0.5,
            pivot_y: 0.5,
            ..EntityConfig::default()
        };
        let t = config.transform();
        assert_eq!(t.translation, vec3(4.0, 0.0, 0.0));
        assert_eq!(t.pivot, Pivot::CENTER);
        // Centered pivot shifts the origin by half the size.
        let origin = t.matrix().transform_point3(Vec3::ZERO);
        assert!((origin.x - -1.0).abs() < 1e-6);
        assert!((origin.y - -10.0).abs() < 1e-6);
    }
}

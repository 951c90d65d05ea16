use crate::{EulerRot, Mat4, Quat, Vec3, pivot::Pivot};

/// Entity transform: placement, bounds, scale, pivot and opacity (Euler XYZ).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in radians (XYZ order).
    pub rotation_euler: Vec3,
    pub scale: Vec3,
    /// Width/height/depth of the entity bounds, used to place the pivot.
    pub size: Vec3,
    pub pivot: Pivot,
    pub alpha: f32,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            scale: Vec3::ONE,
            size: Vec3::ZERO,
            pivot: Pivot::TOP_LEFT,
            alpha: 1.0,
        }
    }

    #[inline]
    pub fn from_trs(translation: Vec3, rotation_euler: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation_euler,
            scale,
            ..Self::identity()
        }
    }

    /// Offset of the pivot inside the bounds, in local units.
    #[inline]
    pub fn pivot_offset(&self) -> Vec3 {
        Vec3::new(
            self.pivot.x() * self.size.x,
            self.pivot.y() * self.size.y,
            0.0,
        )
    }

    /// Build matrix = T * R * S * P (column-major Mat4 per glam), P moves the pivot to the origin.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation_euler.x,
            self.rotation_euler.y,
            self.rotation_euler.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, q, self.translation)
            * Mat4::from_translation(-self.pivot_offset())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

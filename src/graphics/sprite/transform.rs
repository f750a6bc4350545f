use cgmath::{Matrix4, Rad, Vector2, Vector3};

/// A sprite's placement in a pixel-space viewport (top-left origin, y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteTransform {
    /// Where the anchor lands, in pixels.
    pub position: Vector2<f32>,
    /// Rendered size in pixels.
    pub size: Vector2<f32>,
    /// Clockwise on screen.
    pub rotation: Rad<f32>,
    /// The pivot within the sprite, normalized from its top-left corner.
    pub anchor: Vector2<f32>,
}

impl SpriteTransform {
    /// A sprite of `size` with its top-left corner at `position`.
    pub fn at(position: Vector2<f32>, size: Vector2<f32>) -> Self {
        Self {
            position,
            size,
            rotation: Rad(0.0),
            anchor: Vector2::new(0.0, 0.0),
        }
    }

    /// A sprite of `size` centred on `position`.
    pub fn centred(position: Vector2<f32>, size: Vector2<f32>) -> Self {
        Self {
            anchor: Vector2::new(0.5, 0.5),
            ..Self::at(position, size)
        }
    }

    pub fn with_rotation(mut self, rotation: Rad<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local quad space -> viewport pixels.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        // the quad is y-up, pixels are y-down
        let flip = Matrix4::from_nonuniform_scale(1.0, -1.0, 1.0);
        let pivot = Matrix4::from_translation(Vector3::new(
            0.5 - self.anchor.x,
            0.5 - self.anchor.y,
            0.0,
        ));
        let scale = Matrix4::from_nonuniform_scale(self.size.x, self.size.y, 1.0);
        let rotation = Matrix4::from_angle_z(self.rotation);
        let translation = Matrix4::from_translation(self.position.extend(0.0));
        translation * rotation * scale * pivot * flip
    }

    /// Local quad space -> clip space for a viewport of the given pixel size.
    pub fn to_clip_matrix(&self, viewport: Vector2<f32>) -> Matrix4<f32> {
        pixel_projection(viewport) * self.model_matrix()
    }
}

/// Maps viewport pixels (top-left origin, y down) to clip space.
pub fn pixel_projection(viewport: Vector2<f32>) -> Matrix4<f32> {
    cgmath::ortho(0.0, viewport.x, viewport.y, 0.0, -1.0, 1.0)
}

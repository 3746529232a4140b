//! Cover-fit UV math: crop a source texture so it fully fills a target frame
//! of a different aspect ratio without distortion, centered.

/// Affine UV transform applied in the fragment shader:
/// `uv' = uv * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvTransform {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
}

impl UvTransform {
    pub fn identity() -> Self {
        Self {
            scale: [1.0, 1.0],
            offset: [0.0, 0.0],
        }
    }

    /// Packed `[scale.x, scale.y, offset.x, offset.y]` for the uniform block.
    pub fn to_array(self) -> [f32; 4] {
        [self.scale[0], self.scale[1], self.offset[0], self.offset[1]]
    }
}

/// Computes the centered crop transform for a source of intrinsic size
/// `source_width` x `source_height` covering a frame of `target_aspect`.
///
/// Intrinsic dimensions are the decoded media's pixel size (for a video
/// source, its natural dimensions rather than any layout size). When the
/// target is narrower than the source the U axis is scaled down and V left
/// alone; when it is wider the V axis scales instead. Degenerate inputs
/// yield the identity transform.
pub fn cover_fit(source_width: f32, source_height: f32, target_aspect: f32) -> UvTransform {
    if source_width <= 0.0 || source_height <= 0.0 || target_aspect <= 0.0 {
        return UvTransform::identity();
    }

    let source_aspect = source_width / source_height;
    let scale = if target_aspect < source_aspect {
        [target_aspect / source_aspect, 1.0]
    } else {
        [1.0, source_aspect / target_aspect]
    };

    UvTransform {
        scale,
        // Centering about (0.5, 0.5).
        offset: [(1.0 - scale[0]) * 0.5, (1.0 - scale[1]) * 0.5],
    }
}

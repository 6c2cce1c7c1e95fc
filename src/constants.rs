//! Engine-wide constants, grouped by subsystem.

/// Terrain generation constants
pub mod terrain {
    /// Opacity samples below this are snapped to fully transparent
    pub const MIN_BLEND_ALPHA: u8 = 15;

    /// Opacity samples above this are snapped to fully opaque
    pub const MAX_BLEND_ALPHA: u8 = 220;

    /// Direction the sun shines in, used to pre-light terrain vertices
    pub const SUN_DIRECTION: [f32; 3] = [0.650945, -0.390567, 0.650945];

    /// Flat boost added to the averaged N.L term
    pub const BRIGHTNESS_BOOST: f32 = 0.25;

    pub const MIN_BRIGHTNESS: f32 = 0.4;
    pub const MAX_BRIGHTNESS: f32 = 1.0;

    pub const DEFAULT_TERRAIN_SIZE: [u32; 2] = [257, 257];
    pub const DEFAULT_BLOCK_SIZE: [u32; 2] = [17, 17];
    pub const DEFAULT_BLEND_TEX_RATIO: u32 = 1;

    /// Texture stage the ground texture is bound to
    pub const GROUND_STAGE: u32 = 0;

    /// Texture stage the splat blend texture is bound to
    pub const BLEND_STAGE: u32 = 1;
}

/// Limits imposed by 16-bit index buffers
pub mod gpu_limits {
    /// Largest vertex index addressable by a 16-bit index buffer
    pub const MAX_INDEX_16: u32 = u16::MAX as u32;

    /// Largest number of vertices a single terrain block may contain
    pub const MAX_BLOCK_VERTICES: u32 = MAX_INDEX_16 + 1;
}

/// Scene batching constants
pub mod scene {
    /// Growth step used when staging arrays are first allocated
    pub const STAGING_GROWTH: usize = 100;
}

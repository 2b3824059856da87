#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileSettings {
    /// BVH leaves hold at most this many triangles (values below 1 are treated as 1)
    pub max_triangles_per_leaf: usize,

    /// Whether the compiled scene carries the offsets of primitives with an
    /// emissive emission texture
    pub light_emitting_primitives: bool,

    // empty arrays become a single 0 element, so kernels never see a zero-length buffer;
    // the light array is exempt since 0 is a valid primitive offset there
    pub pad_empty_arrays: bool,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            max_triangles_per_leaf: 4,
            light_emitting_primitives: true,
            pad_empty_arrays: true,
        }
    }
}

/// Resource limits to keep every request small and predictable
///
/// These limits reject pathological inputs while being generous enough
/// for anything a student types by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum input length in bytes
    /// Real usage: ~40 bytes, Limit: 4KB (100x)
    pub max_input_bytes: usize,

    /// Maximum expression nesting depth
    /// Real usage: ~5 levels, Limit: 64
    pub max_expression_depth: usize,

    /// Maximum degree of any polynomial the engine expands
    pub max_polynomial_degree: u32,

    /// Maximum number of branches of one piecewise expression
    pub max_piecewise_branches: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: 4 * 1024, // 4 KB
            max_expression_depth: 64,
            max_polynomial_degree: 64,
            max_piecewise_branches: 16,
        }
    }
}

impl ResourceLimits {
    /// Create a new ResourceLimits with default values
    pub fn new() -> Self {
        Self::default()
    }
}

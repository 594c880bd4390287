/// Numerical tolerances for geometric computations.
///
/// Passed explicitly to every query; there is no process-wide tolerance.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Linear tolerance for distance comparisons (in model units).
    /// Two entities closer than this are considered touching.
    pub linear: f64,
    /// Angular tolerance (in radians)
    pub angular: f64,
    /// Parameter-space tolerance for curve/surface parameters
    pub parametric: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-6;
    pub const DEFAULT_ANGULAR: f64 = 1e-10;
    pub const DEFAULT_PARAMETRIC: f64 = 1e-9;

    pub fn new(linear: f64, angular: f64, parametric: f64) -> Self {
        Self {
            linear,
            angular,
            parametric,
        }
    }

    /// Default tolerances with a custom linear tolerance.
    pub fn with_linear(linear: f64) -> Self {
        Self {
            linear,
            ..Self::default()
        }
    }

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            angular: Self::DEFAULT_ANGULAR,
            parametric: Self::DEFAULT_PARAMETRIC,
        }
    }

    pub fn loose() -> Self {
        Self {
            linear: 1e-4,
            angular: 1e-6,
            parametric: 1e-7,
        }
    }

    pub fn tight() -> Self {
        Self {
            linear: 1e-10,
            angular: 1e-12,
            parametric: 1e-12,
        }
    }

    /// Check if two values are equal within linear tolerance
    pub fn linear_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.linear
    }

    /// Check if a value is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() <= self.linear
    }

    /// Check if two angles are equal within angular tolerance
    pub fn angular_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.angular
    }

    /// Check if two parameter values are equal within parametric tolerance
    pub fn parametric_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.parametric
    }

    /// Whether every field is finite and strictly positive.
    pub fn is_valid(self) -> bool {
        [self.linear, self.angular, self.parametric]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}

use crate::cascades::{ComplexityLevel, ModelTier};

/// Returned for any pair the matrix cannot index.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Expected answer confidence for a complexity level served by a tier.
///
/// Rows are `ComplexityLevel` (simple, moderate, complex), columns are
/// `ModelTier` (tiny, medium, large).
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceMatrix {
    cells: [[f64; 3]; 3],
}

impl ConfidenceMatrix {
    pub fn new(cells: [[f64; 3]; 3]) -> Self {
        let mut cells = cells;
        for row in cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = if cell.is_finite() {
                    cell.clamp(0.0, 1.0)
                } else {
                    DEFAULT_CONFIDENCE
                };
            }
        }
        Self { cells }
    }

    pub fn estimate(&self, complexity: ComplexityLevel, tier: ModelTier) -> f64 {
        self.cells
            .get(Self::row(complexity))
            .and_then(|row| row.get(tier.index()))
            .copied()
            .unwrap_or(DEFAULT_CONFIDENCE)
    }

    fn row(complexity: ComplexityLevel) -> usize {
        match complexity {
            ComplexityLevel::Simple => 0,
            ComplexityLevel::Moderate => 1,
            ComplexityLevel::Complex => 2,
        }
    }
}

impl Default for ConfidenceMatrix {
    fn default() -> Self {
        Self::new([
            [0.95, 0.98, 0.99],
            [0.60, 0.90, 0.95],
            [0.30, 0.70, 0.95],
        ])
    }
}

/// Unit of a [`Scalar`] length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Cells,
    Percent,
    /// Share of the space left after fixed lengths.
    Fraction,
    Auto,
}

/// A length with its unit. Style values only carry it; sizing happens
/// elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scalar {
    pub value: f64,
    pub unit: Unit,
}

impl Scalar {
    pub const AUTO: Self = Self::new(0.0, Unit::Auto);
    pub const ZERO: Self = Self::new(0.0, Unit::Cells);

    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub const fn cells(value: f64) -> Self {
        Self::new(value, Unit::Cells)
    }

    pub const fn percent(value: f64) -> Self {
        Self::new(value, Unit::Percent)
    }
}

/// Edge lengths in top, right, bottom, left order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spacing {
    pub top: Scalar,
    pub right: Scalar,
    pub bottom: Scalar,
    pub left: Scalar,
}

impl Spacing {
    pub fn uniform(value: Scalar) -> Self {
        Self::symmetric(value, value)
    }

    pub fn symmetric(vertical: Scalar, horizontal: Scalar) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn edges(&self) -> [Scalar; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    pub fn is_zero(&self) -> bool {
        self.edges().iter().all(|edge| edge.value == 0.0)
    }
}

use std::{fmt::Display, ops::Deref};

/// Non-negative percentage, printed with one decimal.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Share of `part` in `whole`. A non-positive whole is treated as zero share.
    pub fn of(part: f64, whole: f64) -> Percentage {
        if whole <= 0. {
            return Percentage(0.);
        }
        Percentage::new_opt(part / whole * 100.).unwrap_or(Percentage(0.))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

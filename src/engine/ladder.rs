//! Threshold ladders: ordered `(threshold, points)` tables.
//!
//! Rungs are checked in table order and the first one the metric reaches
//! wins. A metric that reaches no rung (including NaN) earns nothing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `>=` for rising ladders, `<=` for falling ones
    Inclusive,
    /// `>` for rising ladders, `<` for falling ones
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ladder {
    rungs: &'static [(f64, f64)],
    rising: bool,
    bound: Bound,
}

impl Ladder {
    /// Metric `>=` threshold. List the highest threshold first.
    pub const fn at_least(rungs: &'static [(f64, f64)]) -> Self {
        Ladder { rungs, rising: true, bound: Bound::Inclusive }
    }

    /// Metric `>` threshold. List the highest threshold first.
    pub const fn above(rungs: &'static [(f64, f64)]) -> Self {
        Ladder { rungs, rising: true, bound: Bound::Exclusive }
    }

    /// Metric `<=` threshold. List the lowest threshold first.
    pub const fn at_most(rungs: &'static [(f64, f64)]) -> Self {
        Ladder { rungs, rising: false, bound: Bound::Inclusive }
    }

    /// Metric `<` threshold. List the lowest threshold first.
    pub const fn below(rungs: &'static [(f64, f64)]) -> Self {
        Ladder { rungs, rising: false, bound: Bound::Exclusive }
    }

    /// Points for the first rung reached, if any
    pub fn rung(&self, metric: f64) -> Option<f64> {
        self.rungs
            .iter()
            .find(|(threshold, _)| self.reaches(metric, *threshold))
            .map(|(_, points)| *points)
    }

    /// Points for the first rung reached, 0.0 otherwise
    pub fn award(&self, metric: f64) -> f64 {
        self.rung(metric).unwrap_or(0.0)
    }

    pub fn rungs(&self) -> &'static [(f64, f64)] {
        self.rungs
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    /// Thresholds are ordered so that the strictest rung is checked first
    pub fn is_well_ordered(&self) -> bool {
        self.rungs.windows(2).all(|pair| {
            if self.rising {
                pair[0].0 > pair[1].0
            } else {
                pair[0].0 < pair[1].0
            }
        })
    }

    fn reaches(&self, metric: f64, threshold: f64) -> bool {
        match (self.rising, self.bound) {
            (true, Bound::Inclusive) => metric >= threshold,
            (true, Bound::Exclusive) => metric > threshold,
            (false, Bound::Inclusive) => metric <= threshold,
            (false, Bound::Exclusive) => metric < threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RISING: Ladder = Ladder::at_least(&[(1.2, 3.5), (1.1, 2.5), (1.0, 1.5)]);
    const STRICT: Ladder = Ladder::above(&[(0.5, 1.5), (0.2, 0.75)]);
    const FALLING: Ladder = Ladder::at_most(&[(0.85, 2.0), (0.95, 1.0)]);

    #[test]
    fn inclusive_boundary_takes_the_rung() {
        assert_relative_eq!(RISING.award(1.2), 3.5);
        assert_relative_eq!(RISING.award(1.1), 2.5);
        assert_relative_eq!(RISING.award(1.0), 1.5);
    }

    #[test]
    fn first_match_wins() {
        assert_relative_eq!(RISING.award(5.0), 3.5);
        assert_relative_eq!(RISING.award(1.15), 2.5);
    }

    #[test]
    fn below_every_rung_awards_zero() {
        assert_relative_eq!(RISING.award(0.99), 0.0);
        assert!(RISING.rung(0.5).is_none());
    }

    #[test]
    fn exclusive_boundary_skips_the_rung() {
        assert_relative_eq!(STRICT.award(0.5), 0.75);
        assert_relative_eq!(STRICT.award(0.2), 0.0);
        assert_relative_eq!(STRICT.award(0.51), 1.5);
    }

    #[test]
    fn falling_ladder_checks_lowest_first() {
        assert_relative_eq!(FALLING.award(0.80), 2.0);
        assert_relative_eq!(FALLING.award(0.85), 2.0);
        assert_relative_eq!(FALLING.award(0.90), 1.0);
        assert_relative_eq!(FALLING.award(0.96), 0.0);
    }

    #[test]
    fn nan_reaches_nothing() {
        assert!(RISING.rung(f64::NAN).is_none());
        assert!(FALLING.rung(f64::NAN).is_none());
    }

    #[test]
    fn infinity_reaches_the_top_rung() {
        assert_relative_eq!(RISING.award(f64::INFINITY), 3.5);
    }

    #[test]
    fn ordering_check() {
        assert!(RISING.is_well_ordered());
        assert!(FALLING.is_well_ordered());
        let backwards = Ladder::at_least(&[(1.0, 1.5), (1.2, 3.5)]);
        assert!(!backwards.is_well_ordered());
    }
}

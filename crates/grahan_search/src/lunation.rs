//! Lunation numbering, the node pre-filter and approximate syzygy times.
//!
//! Lunation `k` counts new moons from 2000 January 6 (k = 0). Full moons
//! carry `k + 0.5`. Times follow the mean-phase series with the principal
//! periodic terms of Meeus, "Astronomical Algorithms", Ch. 49 and 54.

use grahan_core::J2000_JD;

use crate::eclipse_types::SearchDirection;

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;

/// Lunations per tropical year, used to seed the lunation index.
const LUNATIONS_PER_YEAR: f64 = 12.3685;

/// Days per year used with [`LUNATIONS_PER_YEAR`].
const DAYS_PER_YEAR: f64 = 365.2425;

/// Mean new moon of lunation 0, JD ET.
const LUNATION_EPOCH_JD: f64 = 2_451_550.097_66;

/// Argument of latitude (folded to [0, 180)) must lie outside
/// `(NODE_WINDOW_MIN_DEG, NODE_WINDOW_MAX_DEG)` for an eclipse to be possible.
const NODE_WINDOW_MIN_DEG: f64 = 21.0;
const NODE_WINDOW_MAX_DEG: f64 = 159.0;

/// New or full moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syzygy {
    NewMoon,
    FullMoon,
}

impl Syzygy {
    fn offset(self) -> f64 {
        match self {
            Self::NewMoon => 0.0,
            Self::FullMoon => 0.5,
        }
    }
}

/// One numbered syzygy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lunation {
    pub index: i64,
    pub syzygy: Syzygy,
}

impl Lunation {
    /// First lunation to examine for a search starting at `jd`.
    ///
    /// Starts one lunation behind the start so an eclipse whose maximum
    /// lies just after `jd` is never skipped.
    pub fn starting_at(jd: f64, syzygy: Syzygy, direction: SearchDirection) -> Self {
        let k = ((jd - J2000_JD) / DAYS_PER_YEAR * LUNATIONS_PER_YEAR).floor() as i64;
        Self {
            index: k - direction.step(),
            syzygy,
        }
    }

    pub fn next(self, direction: SearchDirection) -> Self {
        Self {
            index: self.index + direction.step(),
            syzygy: self.syzygy,
        }
    }

    /// Lunation number including the full-moon half.
    pub fn k(&self) -> f64 {
        self.index as f64 + self.syzygy.offset()
    }

    fn centuries(&self) -> f64 {
        self.k() / 1236.85
    }

    /// Moon's argument of latitude at the mean syzygy, folded into [0, 180).
    pub fn argument_of_latitude_deg(&self) -> f64 {
        let k = self.k();
        let t = self.centuries();
        let f = 160.7108 + 390.670_502_84 * k - 0.001_6118 * t * t - 0.000_002_27 * t * t * t
            + 0.000_000_011 * t * t * t * t;
        f.rem_euclid(180.0)
    }

    /// False when the Moon is too far from a node for any eclipse.
    pub fn may_eclipse(&self) -> bool {
        let f = self.argument_of_latitude_deg();
        !(f > NODE_WINDOW_MIN_DEG && f < NODE_WINDOW_MAX_DEG)
    }

    /// Approximate instant of the syzygy, JD ET, good to a few minutes.
    pub fn approximate_jd_et(&self) -> f64 {
        let k = self.k();
        let t = self.centuries();
        let t2 = t * t;
        let mean = LUNATION_EPOCH_JD + SYNODIC_MONTH_DAYS * k + 0.000_1337 * t2
            - 0.000_000_150 * t2 * t
            + 0.000_000_000_73 * t2 * t2;

        let e = 1.0 - 0.002_516 * t - 0.000_0074 * t2;
        let m = (2.5534 + 29.105_356_70 * k - 0.000_0014 * t2 - 0.000_000_11 * t2 * t).to_radians();
        let mp = (201.5643 + 385.816_935_28 * k + 0.010_7582 * t2 + 0.000_012_38 * t2 * t
            - 0.000_000_058 * t2 * t2)
            .to_radians();
        let f = (160.7108 + 390.670_502_84 * k - 0.001_6118 * t2 - 0.000_002_27 * t2 * t
            + 0.000_000_011 * t2 * t2)
            .to_radians();
        let omega = (124.7746 - 1.563_755_88 * k + 0.002_0672 * t2 + 0.000_002_15 * t2 * t)
            .to_radians();
        let f1 = f - 0.02665_f64.to_radians() * omega.sin();
        let a1 = (299.77 + 0.107_408 * k - 0.009_173 * t2).to_radians();

        let (c_mp, c_m) = match self.syzygy {
            Syzygy::NewMoon => (-0.4075, 0.1721),
            Syzygy::FullMoon => (-0.4065, 0.1727),
        };
        let correction = c_mp * mp.sin()
            + c_m * e * m.sin()
            + 0.0161 * (2.0 * mp).sin()
            - 0.0097 * (2.0 * f1).sin()
            + 0.0073 * e * (mp - m).sin()
            - 0.0050 * e * (mp + m).sin()
            - 0.0023 * (mp - 2.0 * f1).sin()
            + 0.0021 * e * (2.0 * m).sin()
            + 0.0012 * (mp + 2.0 * f1).sin()
            + 0.0006 * e * (2.0 * mp + m).sin()
            - 0.0004 * (3.0 * mp).sin()
            - 0.0003 * e * (m + 2.0 * f1).sin()
            + 0.0003 * a1.sin()
            - 0.0002 * e * (m - 2.0 * f1).sin()
            - 0.0002 * e * (2.0 * mp - m).sin()
            - 0.0002 * omega.sin();
        mean + correction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn start_lunation_is_one_behind() {
        // 2024-04-01 seeds k = 299; the eclipse of 2024-04-08 is lunation 300.
        let l = Lunation::starting_at(2_460_401.5, Syzygy::NewMoon, SearchDirection::Forward);
        assert_eq!(l.index, 298);
        let l = Lunation::starting_at(2_460_401.5, Syzygy::NewMoon, SearchDirection::Backward);
        assert_eq!(l.index, 300);
    }

    #[test]
    fn next_follows_direction() {
        let l = Lunation { index: 10, syzygy: Syzygy::FullMoon };
        assert_eq!(l.next(SearchDirection::Forward).index, 11);
        assert_eq!(l.next(SearchDirection::Backward).index, 9);
        assert_abs_diff_eq!(l.k(), 10.5);
    }

    #[test]
    fn meeus_example_54a_solar_eclipse() {
        // Solar eclipse of 1993 May 21, k = -82: greatest eclipse JDE 2449129.0979.
        let l = Lunation { index: -82, syzygy: Syzygy::NewMoon };
        assert_abs_diff_eq!(l.approximate_jd_et(), 2_449_129.097_9, epsilon = 5e-4);
    }

    #[test]
    fn meeus_example_54b_lunar_eclipse() {
        // Lunar eclipse of 1973 June 15, k = -328.5: maximum JDE 2441849.3687.
        let l = Lunation { index: -329, syzygy: Syzygy::FullMoon };
        assert_abs_diff_eq!(l.k(), -328.5);
        assert_abs_diff_eq!(l.approximate_jd_et(), 2_441_849.368_7, epsilon = 5e-4);
    }

    #[test]
    fn eclipse_lunations_pass_the_node_window() {
        // 2024-04-08 total solar eclipse.
        let l = Lunation { index: 300, syzygy: Syzygy::NewMoon };
        assert!(l.may_eclipse());
        let t = l.approximate_jd_et();
        assert_abs_diff_eq!(t, 2_460_409.26, epsilon = 0.1);
        // 2024-05-08 new moon: far from a node.
        let l = Lunation { index: 301, syzygy: Syzygy::NewMoon };
        assert!(!l.may_eclipse());
    }

    #[test]
    fn full_moon_of_lunar_eclipse() {
        // 2022-11-08 total lunar eclipse, maximum 10:59 UT.
        let l = Lunation { index: 282, syzygy: Syzygy::FullMoon };
        assert!(l.may_eclipse());
        assert_abs_diff_eq!(l.approximate_jd_et(), 2_459_891.96, epsilon = 0.1);
    }
}

//! # Legislated Rate Schedule
//!
//! The dual-tax reform phases in over three eras, selected purely by
//! the operation date's calendar year (never time-of-day):
//!
//! - **Current** (before 2026): the legacy system is still in force;
//!   all new-regime rates are zero so documents template uniformly.
//! - **Transition** (2026..=2032): per-year rates from the schedule
//!   below. Both IBS components and the composite tax are monotonically
//!   non-decreasing across the window.
//! - **New** (2033 onward): fixed full rates — composite 8.80%, IBS
//!   17.70% split 60/40 between state and municipal shares — constant
//!   for all future years.
//!
//! The schedule is immutable reference data; the sampled years the
//! legislation publishes (2026, 2027, 2030, 2032) bound the table and
//! monotonicity is the binding invariant, enforced by tests.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// First calendar year of the transition era.
pub const FIRST_TRANSITION_YEAR: i32 = 2026;

/// First calendar year of the full new regime.
pub const NEW_REGIME_YEAR: i32 = 2033;

/// The rate-schedule era applicable to a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// Legacy system in force; new-regime rates are zero.
    Current,
    /// Phase-in years with per-year rates.
    Transition,
    /// Full rates, constant from 2033 onward.
    New,
}

impl Regime {
    /// Select the regime for an operation date, by calendar year only.
    pub fn for_date(date: NaiveDate) -> Self {
        Self::for_year(date.year())
    }

    /// Select the regime for a calendar year.
    pub fn for_year(year: i32) -> Self {
        if year < FIRST_TRANSITION_YEAR {
            Self::Current
        } else if year < NEW_REGIME_YEAR {
            Self::Transition
        } else {
            Self::New
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "CURRENT"),
            Self::Transition => write!(f, "TRANSITION"),
            Self::New => write!(f, "NEW"),
        }
    }
}

/// One row of the rate schedule: the three component rates (percent)
/// applicable to a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeWindow {
    /// Calendar year the row applies to.
    pub year: i32,
    /// IBS state-share rate.
    pub ibs_state_rate: Decimal,
    /// IBS municipal-share rate.
    pub ibs_municipal_rate: Decimal,
    /// Composite federal consumption tax rate.
    pub composite_rate: Decimal,
}

impl RegimeWindow {
    const fn new(
        year: i32,
        ibs_state_rate: Decimal,
        ibs_municipal_rate: Decimal,
        composite_rate: Decimal,
    ) -> Self {
        Self {
            year,
            ibs_state_rate,
            ibs_municipal_rate,
            composite_rate,
        }
    }

    /// Total IBS rate (state + municipal shares).
    pub fn ibs_total_rate(&self) -> Decimal {
        self.ibs_state_rate + self.ibs_municipal_rate
    }
}

/// Transition-era schedule, one row per year 2026..=2032.
///
/// 2026 carries the legislated test rates (IBS 0.10% total, composite
/// 0.90%); the composite tax reaches its full 8.80% in 2027; the IBS
/// shares ramp through 2032 as the legacy state/municipal taxes phase
/// out, always splitting 60/40 state/municipal.
const TRANSITION_SCHEDULE: [RegimeWindow; 7] = [
    RegimeWindow::new(2026, dec!(0.05), dec!(0.05), dec!(0.90)),
    RegimeWindow::new(2027, dec!(0.05), dec!(0.05), dec!(8.80)),
    RegimeWindow::new(2028, dec!(0.10), dec!(0.10), dec!(8.80)),
    RegimeWindow::new(2029, dec!(1.062), dec!(0.708), dec!(8.80)),
    RegimeWindow::new(2030, dec!(2.124), dec!(1.416), dec!(8.80)),
    RegimeWindow::new(2031, dec!(3.186), dec!(2.124), dec!(8.80)),
    RegimeWindow::new(2032, dec!(4.248), dec!(2.832), dec!(8.80)),
];

/// Full new-regime rates, constant from [`NEW_REGIME_YEAR`] onward.
const NEW_REGIME_RATES: RegimeWindow =
    RegimeWindow::new(NEW_REGIME_YEAR, dec!(10.62), dec!(7.08), dec!(8.80));

/// Zero-rate row used for pre-2026 years so downstream consumers can
/// template documents uniformly.
const CURRENT_REGIME_RATES: RegimeWindow =
    RegimeWindow::new(0, dec!(0), dec!(0), dec!(0));

/// Look up the applicable rate row for a calendar year.
///
/// Total function: every year maps to a row (zeroes before 2026, the
/// fixed full rates from 2033 onward).
pub fn window_for_year(year: i32) -> RegimeWindow {
    match Regime::for_year(year) {
        Regime::Current => RegimeWindow {
            year,
            ..CURRENT_REGIME_RATES
        },
        Regime::Transition => TRANSITION_SCHEDULE[(year - FIRST_TRANSITION_YEAR) as usize],
        Regime::New => RegimeWindow {
            year,
            ..NEW_REGIME_RATES
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regime_selection_by_year() {
        assert_eq!(Regime::for_year(2020), Regime::Current);
        assert_eq!(Regime::for_year(2025), Regime::Current);
        assert_eq!(Regime::for_year(2026), Regime::Transition);
        assert_eq!(Regime::for_year(2032), Regime::Transition);
        assert_eq!(Regime::for_year(2033), Regime::New);
        assert_eq!(Regime::for_year(2050), Regime::New);
    }

    #[test]
    fn boundary_dates_select_by_calendar_year_only() {
        let dec31 = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let jan1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(Regime::for_date(dec31), Regime::Current);
        assert_eq!(Regime::for_date(jan1), Regime::Transition);

        let last_transition = NaiveDate::from_ymd_opt(2032, 12, 31).unwrap();
        let first_new = NaiveDate::from_ymd_opt(2033, 1, 1).unwrap();
        assert_eq!(Regime::for_date(last_transition), Regime::Transition);
        assert_eq!(Regime::for_date(first_new), Regime::New);
    }

    #[test]
    fn sampled_years_match_legislation() {
        let w2026 = window_for_year(2026);
        assert_eq!(w2026.ibs_total_rate(), dec!(0.10));
        assert_eq!(w2026.composite_rate, dec!(0.90));

        let w2027 = window_for_year(2027);
        assert_eq!(w2027.composite_rate, dec!(8.80));

        let w2033 = window_for_year(2033);
        assert_eq!(w2033.ibs_total_rate(), dec!(17.70));
        assert_eq!(w2033.composite_rate, dec!(8.80));
        assert_eq!(w2033.ibs_state_rate, dec!(10.62));
        assert_eq!(w2033.ibs_municipal_rate, dec!(7.08));
    }

    #[test]
    fn rates_monotonically_non_decreasing_2026_to_2033() {
        let mut prev = window_for_year(2026);
        for year in 2027..=2033 {
            let w = window_for_year(year);
            assert!(
                w.ibs_total_rate() >= prev.ibs_total_rate(),
                "IBS total decreased entering {year}"
            );
            assert!(
                w.ibs_state_rate >= prev.ibs_state_rate,
                "IBS state decreased entering {year}"
            );
            assert!(
                w.ibs_municipal_rate >= prev.ibs_municipal_rate,
                "IBS municipal decreased entering {year}"
            );
            assert!(
                w.composite_rate >= prev.composite_rate,
                "composite decreased entering {year}"
            );
            prev = w;
        }
    }

    #[test]
    fn new_regime_constant_beyond_2033() {
        let w2033 = window_for_year(2033);
        for year in [2034, 2040, 2099] {
            let w = window_for_year(year);
            assert_eq!(w.ibs_state_rate, w2033.ibs_state_rate);
            assert_eq!(w.ibs_municipal_rate, w2033.ibs_municipal_rate);
            assert_eq!(w.composite_rate, w2033.composite_rate);
            assert_eq!(w.year, year);
        }
    }

    #[test]
    fn state_municipal_split_is_60_40_from_2029() {
        // Once the IBS ramp proper begins the split is fixed 60/40.
        for year in 2029..=2033 {
            let w = window_for_year(year);
            let total = w.ibs_total_rate();
            assert_eq!(w.ibs_state_rate, total * dec!(0.6), "state share {year}");
            assert_eq!(w.ibs_municipal_rate, total * dec!(0.4), "municipal share {year}");
        }
    }

    #[test]
    fn current_regime_is_all_zero() {
        let w = window_for_year(2024);
        assert_eq!(w.ibs_state_rate, dec!(0));
        assert_eq!(w.ibs_municipal_rate, dec!(0));
        assert_eq!(w.composite_rate, dec!(0));
        assert_eq!(w.year, 2024);
    }

    #[test]
    fn schedule_rows_carry_their_own_year() {
        for year in 2026..=2032 {
            assert_eq!(window_for_year(year).year, year);
        }
    }
}

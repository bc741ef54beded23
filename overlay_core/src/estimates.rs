//! Time-until-affordable labels for factories, research, upgrades and achievements.
//!
//! Everything here is a pure function of the current economy numbers; callers
//! recompute on every UI update.

use std::fmt;

/// Magnitude of an estimate, used by hosts to pick a label style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBand {
    Seconds,
    Minutes,
    Hours,
    Days,
    Years,
}

impl TimeBand {
    pub fn style_class(self) -> &'static str {
        match self {
            TimeBand::Seconds => "te-seconds",
            TimeBand::Minutes => "te-mins",
            TimeBand::Hours => "te-hours",
            TimeBand::Days => "te-days",
            TimeBand::Years => "te-years",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeEstimate {
    /// No income (or no data) to estimate from.
    Unknown,
    /// Already past the target.
    Overdue,
    Eta { band: TimeBand, text: String },
}

impl TimeEstimate {
    pub fn band(&self) -> Option<TimeBand> {
        match self {
            TimeEstimate::Eta { band, .. } => Some(*band),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TimeEstimate::Unknown)
    }
}

impl fmt::Display for TimeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeEstimate::Unknown => Ok(()),
            TimeEstimate::Overdue => f.write_str("-"),
            TimeEstimate::Eta { text, .. } => f.write_str(text),
        }
    }
}

pub fn format_time(seconds: f64) -> TimeEstimate {
    if seconds.is_nan() || seconds == f64::INFINITY {
        return TimeEstimate::Unknown;
    }
    if seconds < 0.0 {
        return TimeEstimate::Overdue;
    }

    let eta = |band, text: String| TimeEstimate::Eta { band, text };
    let secs = seconds.floor() as u64;
    if secs < 60 {
        return eta(TimeBand::Seconds, format!("{secs}s"));
    }
    let mins = secs / 60;
    if mins < 60 {
        return eta(TimeBand::Minutes, format!("{mins}m {}s", secs % 60));
    }
    let hours = mins / 60;
    if hours < 24 {
        return eta(TimeBand::Hours, format!("{hours}h {}m", mins % 60));
    }
    let days = hours / 24;
    if days < 365 {
        return eta(TimeBand::Days, format!("{days}d {}h", hours % 24));
    }
    let years = days / 365;
    if years < 100 {
        return eta(TimeBand::Years, format!("{years}y {}d", days % 365));
    }
    eta(TimeBand::Years, format!("{years}y"))
}

/// Average income per tick and the ticker's measured speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeRates {
    pub avg_per_tick: f64,
    pub ticks_per_sec: f64,
}

impl IncomeRates {
    pub fn per_second(&self) -> f64 {
        self.avg_per_tick * self.ticks_per_sec
    }

    /// Zero or negative income yields a non-finite or negative time, which
    /// [`format_time`] turns into `Unknown` or `Overdue`.
    pub fn estimate(&self, needed: f64) -> TimeEstimate {
        format_time(needed / self.per_second())
    }
}

pub fn factory_purchase(
    is_bought: bool,
    price: f64,
    money: f64,
    profit: IncomeRates,
) -> Option<TimeEstimate> {
    if is_bought {
        return None;
    }
    Some(profit.estimate(price - money))
}

pub fn research_purchase(
    could_purchase: bool,
    price: f64,
    research_points: f64,
    research: IncomeRates,
) -> Option<TimeEstimate> {
    if !could_purchase || price < research_points {
        return None;
    }
    Some(research.estimate(price - research_points))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeAction {
    Buy,
    Sell,
}

/// Label for the next upgrade level, prefixed with `"in "`.
pub fn upgrade_purchase(
    action: UpgradeAction,
    next_level_price: Option<f64>,
    money: f64,
    profit: IncomeRates,
) -> Option<String> {
    if action == UpgradeAction::Sell {
        return None;
    }
    let price = next_level_price?;
    if price < money {
        return None;
    }
    Some(format!("in {}", profit.estimate(price - money)))
}

#[derive(Debug, Clone, PartialEq)]
pub enum AchievementTest {
    AmountOfMoney { amount: f64 },
    Other,
}

pub fn achievement_progress(
    completed: bool,
    tests: &[AchievementTest],
    money: f64,
    profit: IncomeRates,
) -> Option<TimeEstimate> {
    if completed {
        return None;
    }
    let amount = tests.iter().find_map(|test| match test {
        AchievementTest::AmountOfMoney { amount } => Some(*amount),
        AchievementTest::Other => None,
    })?;
    if amount < money {
        return None;
    }
    Some(profit.estimate(amount - money))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFIT: IncomeRates = IncomeRates {
        avg_per_tick: 10.0,
        ticks_per_sec: 2.0,
    };

    #[test]
    fn bands_and_formats() {
        assert_eq!(format_time(59.9).to_string(), "59s");
        assert_eq!(format_time(61.0).to_string(), "1m 1s");
        assert_eq!(format_time(3_600.0 + 120.0).to_string(), "1h 2m");
        assert_eq!(format_time(86_400.0 * 3.0 + 3_600.0 * 5.0).to_string(), "3d 5h");
        assert_eq!(format_time(86_400.0 * 366.0).to_string(), "1y 1d");
        assert_eq!(format_time(86_400.0 * 365.0 * 150.0).to_string(), "150y");
        assert_eq!(format_time(61.0).band(), Some(TimeBand::Minutes));
        assert_eq!(TimeBand::Years.style_class(), "te-years");
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(format_time(f64::NAN), TimeEstimate::Unknown);
        assert_eq!(format_time(f64::INFINITY), TimeEstimate::Unknown);
        assert_eq!(format_time(f64::INFINITY).to_string(), "");
        assert_eq!(format_time(-1.0).to_string(), "-");
        assert_eq!(format_time(0.0).to_string(), "0s");
    }

    #[test]
    fn zero_income_is_unknown() {
        let idle = IncomeRates {
            avg_per_tick: 0.0,
            ticks_per_sec: 2.0,
        };
        assert_eq!(idle.estimate(100.0), TimeEstimate::Unknown);
        assert!(!idle.estimate(100.0).is_known());
    }

    #[test]
    fn factory_estimate_uses_money_gap() {
        assert_eq!(factory_purchase(true, 1_000.0, 0.0, PROFIT), None);
        assert_eq!(
            factory_purchase(false, 1_000.0, 400.0, PROFIT).map(|eta| eta.to_string()),
            Some("30s".to_string())
        );
    }

    #[test]
    fn research_skips_owned_and_affordable() {
        assert_eq!(research_purchase(false, 50.0, 0.0, PROFIT), None);
        assert_eq!(research_purchase(true, 50.0, 80.0, PROFIT), None);
        assert_eq!(
            research_purchase(true, 500.0, 100.0, PROFIT).map(|eta| eta.to_string()),
            Some("20s".to_string())
        );
    }

    #[test]
    fn upgrade_labels_are_prefixed() {
        assert_eq!(
            upgrade_purchase(UpgradeAction::Sell, Some(10.0), 0.0, PROFIT),
            None
        );
        assert_eq!(upgrade_purchase(UpgradeAction::Buy, None, 0.0, PROFIT), None);
        assert_eq!(
            upgrade_purchase(UpgradeAction::Buy, Some(5.0), 10.0, PROFIT),
            None
        );
        assert_eq!(
            upgrade_purchase(UpgradeAction::Buy, Some(2_410.0), 10.0, PROFIT),
            Some("in 2m 0s".to_string())
        );
    }

    #[test]
    fn achievements_only_track_money_tests() {
        let money_goal = [
            AchievementTest::Other,
            AchievementTest::AmountOfMoney { amount: 200.0 },
        ];
        assert_eq!(achievement_progress(true, &money_goal, 0.0, PROFIT), None);
        assert_eq!(
            achievement_progress(false, &[AchievementTest::Other], 0.0, PROFIT),
            None
        );
        assert_eq!(
            achievement_progress(false, &money_goal, 300.0, PROFIT),
            None
        );
        assert_eq!(
            achievement_progress(false, &money_goal, 0.0, PROFIT).map(|eta| eta.to_string()),
            Some("10s".to_string())
        );
    }
}

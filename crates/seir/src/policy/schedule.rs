use std::cmp::Ordering;

use jiff::civil::DateTime;
use tracing::warn;

use super::{PolicyError, PolicyStep};

/// Threshold below which [`PolicySchedule::strength_at`] uses linear search.
const LINEAR_SEARCH_THRESHOLD: usize = 32;

/// A span of time over which one policy strength holds.
///
/// Covers the half-open range `[start, end)`. The last regime of a schedule
/// has no end: its strength holds indefinitely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regime {
    start: DateTime,
    end: Option<DateTime>,
    strength: f64,
}

impl Regime {
    /// Returns the inclusive start of the regime.
    #[must_use]
    pub fn start(&self) -> DateTime {
        self.start
    }

    /// Returns the exclusive end, or `None` for the final regime.
    #[must_use]
    pub fn end(&self) -> Option<DateTime> {
        self.end
    }

    /// Returns the policy strength held over this regime.
    #[must_use]
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Returns `true` if `time` falls within this regime.
    #[must_use]
    pub fn contains(&self, time: DateTime) -> bool {
        self.cmp_to_time(time) == Ordering::Equal
    }

    /// Number of whole days in a bounded regime; any partial day is dropped.
    #[must_use]
    pub fn whole_days(&self) -> Option<i64> {
        self.end
            .map(|end| end.duration_since(self.start).as_secs() / 86_400)
    }

    /// Returns how this regime relates to `time`.
    ///
    /// - [`Ordering::Less`] if the regime ends at or before `time`
    /// - [`Ordering::Greater`] if the regime starts after `time`
    /// - [`Ordering::Equal`] if `time` is within the regime
    fn cmp_to_time(&self, time: DateTime) -> Ordering {
        if self.end.is_some_and(|end| end <= time) {
            Ordering::Less
        } else if self.start > time {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// A validated, chronologically ordered list of policy breakpoints.
///
/// Each breakpoint opens a [`Regime`] that lasts until the next breakpoint.
///
/// # Examples
///
/// ```
/// use contagion_seir::policy::PolicySchedule;
///
/// let schedule = PolicySchedule::parse([
///     ("2020-03-01", 0.0),
///     ("2020-03-15", 0.6),
///     ("2020-05-01", 0.3),
/// ])
/// .unwrap();
///
/// let mid_march = "2020-03-20T00:00:00".parse().unwrap();
/// assert_eq!(schedule.strength_at(mid_march), Some(0.6));
/// assert_eq!(schedule.regimes().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySchedule {
    regimes: Vec<Regime>,
}

impl PolicySchedule {
    /// Creates a schedule from breakpoints given in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::TooFewBreakpoints`] for fewer than two
    /// breakpoints and [`PolicyError::NonChronological`] if any date does not
    /// come strictly after its predecessor.
    pub fn new<I>(steps: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = PolicyStep>,
    {
        let steps: Vec<_> = steps.into_iter().collect();
        if steps.len() < 2 {
            return Err(PolicyError::TooFewBreakpoints { count: steps.len() });
        }

        if let Some(index) = steps.windows(2).position(|pair| pair[0].date >= pair[1].date) {
            return Err(PolicyError::NonChronological {
                index: index + 1,
                previous: steps[index].date,
                date: steps[index + 1].date,
            });
        }

        for step in steps.iter().filter(|step| !(0.0..=1.0).contains(&step.strength)) {
            warn!(date = %step.date, strength = step.strength, "policy strength outside [0, 1]");
        }

        let regimes = steps
            .iter()
            .enumerate()
            .map(|(index, step)| Regime {
                start: step.date,
                end: steps.get(index + 1).map(|next| next.date),
                strength: step.strength,
            })
            .collect();

        Ok(Self { regimes })
    }

    /// Creates a schedule from `(ISO 8601 date, strength)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidDate`] for an unparseable date, or any
    /// error from [`PolicySchedule::new`].
    pub fn parse<I, S>(steps: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let steps = steps
            .into_iter()
            .map(|(date, strength)| PolicyStep::parse(date.as_ref(), strength))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(steps)
    }

    /// Returns the regimes in chronological order.
    #[must_use]
    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    /// Date of the first breakpoint.
    #[must_use]
    pub fn start(&self) -> DateTime {
        self.regimes[0].start
    }

    /// Date of the last breakpoint, which bounds the expanded path.
    #[must_use]
    pub fn end(&self) -> DateTime {
        self.final_regime().start
    }

    /// Strength of the last breakpoint, in force from [`end`](Self::end) on.
    #[must_use]
    pub fn terminal_strength(&self) -> f64 {
        self.final_regime().strength
    }

    /// Returns the policy strength in force at `time`.
    ///
    /// Returns `None` before the first breakpoint.
    #[must_use]
    pub fn strength_at(&self, time: DateTime) -> Option<f64> {
        if self.regimes.len() < LINEAR_SEARCH_THRESHOLD {
            self.regimes
                .iter()
                .find(|regime| regime.contains(time))
                .map(Regime::strength)
        } else {
            self.regimes
                .binary_search_by(|regime| regime.cmp_to_time(time))
                .ok()
                .map(|index| self.regimes[index].strength)
        }
    }

    fn final_regime(&self) -> &Regime {
        // `new` guarantees at least two regimes.
        &self.regimes[self.regimes.len() - 1]
    }
}

// Live-window controller - Per-chart visible ranges over a growing sequence
use crate::domain::chart::ChartId;
use crate::domain::range::{RangeError, RangeOrigin, VisibleRange};
use std::sync::Arc;

/// A chart whose end index is within this many samples of the displayed
/// tail still counts as live. The brush widget reports its end index with
/// an off-by-one slack, so this must stay at 2.
pub const LIVE_EDGE_TOLERANCE: i64 = 2;

/// Result of feeding a new authoritative sequence to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowthOutcome {
    NoGrowth,
    /// Every chart was live: ranges shifted and the displayed sequence swapped
    Advanced { diff: usize },
    /// At least one chart is looking at history; new samples stay buffered
    Held {
        buffered: usize,
        blocked_by: Vec<ChartId>,
    },
}

/// Result of a range-change notification from a chart's brush
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeOutcome {
    UnknownChart,
    /// Programmatic echo from the widget, discarded
    Echo,
    Rejected(RangeError),
    Unchanged,
    Stored,
    /// The user dragged back to the tail and buffered samples were revealed
    CaughtUp { diff: usize },
}

impl RangeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeOutcome::UnknownChart => "unknown_chart",
            RangeOutcome::Echo => "echo",
            RangeOutcome::Rejected(_) => "rejected",
            RangeOutcome::Unchanged => "unchanged",
            RangeOutcome::Stored => "stored",
            RangeOutcome::CaughtUp { .. } => "caught_up",
        }
    }
}

#[derive(Debug, Clone)]
struct ChartWindow {
    id: ChartId,
    range: VisibleRange,
}

/// Keeps N charts sharing one displayed sequence in sync with the live tail.
///
/// The displayed sequence only grows, and only together with the range
/// shifts that accompany it, so any reader holding `&self` sees ranges that
/// are valid indices into `displayed()`.
#[derive(Debug, Clone)]
pub struct LiveWindowController<T> {
    displayed: Arc<Vec<T>>,
    authoritative: Arc<Vec<T>>,
    charts: Vec<ChartWindow>,
}

fn is_live(range: &VisibleRange, len: usize) -> bool {
    match range.end_index {
        None => true,
        Some(end) => end as i64 >= len as i64 - LIVE_EDGE_TOLERANCE,
    }
}

impl<T> LiveWindowController<T> {
    pub fn new(charts: impl IntoIterator<Item = ChartId>, initial: Arc<Vec<T>>) -> Self {
        let charts = charts
            .into_iter()
            .map(|id| ChartWindow {
                id,
                range: VisibleRange::FULL,
            })
            .collect();

        Self {
            displayed: initial.clone(),
            authoritative: initial,
            charts,
        }
    }

    pub fn displayed(&self) -> &Arc<Vec<T>> {
        &self.displayed
    }

    pub fn authoritative_len(&self) -> usize {
        self.authoritative.len()
    }

    /// Chart ids in registration order
    pub fn charts(&self) -> impl Iterator<Item = &ChartId> {
        self.charts.iter().map(|c| &c.id)
    }

    /// Samples known but not yet displayed
    pub fn pending(&self) -> usize {
        self.authoritative.len().saturating_sub(self.displayed.len())
    }

    pub fn range(&self, chart: &ChartId) -> Option<VisibleRange> {
        self.window(chart).map(|c| c.range)
    }

    pub fn is_live(&self, chart: &ChartId) -> Option<bool> {
        self.window(chart)
            .map(|c| is_live(&c.range, self.displayed.len()))
    }

    /// Slice of the displayed sequence a chart currently shows
    pub fn visible(&self, chart: &ChartId) -> Option<&[T]> {
        let window = self.window(chart)?;
        match window.range.bounds() {
            Some((start, end)) => self.displayed.get(start..=end),
            None => Some(self.displayed.as_slice()),
        }
    }

    pub fn on_data_grown(&mut self, next: Arc<Vec<T>>) -> GrowthOutcome {
        if next.len() > self.authoritative.len() {
            self.authoritative = next;
        }

        let diff = self.pending();
        if diff == 0 {
            return GrowthOutcome::NoGrowth;
        }

        let len = self.displayed.len();
        let blocked_by: Vec<ChartId> = self
            .charts
            .iter()
            .filter(|c| !is_live(&c.range, len))
            .map(|c| c.id.clone())
            .collect();

        if !blocked_by.is_empty() {
            tracing::debug!(
                "Holding {} new samples, charts away from the live edge: {:?}",
                diff,
                blocked_by
            );
            return GrowthOutcome::Held {
                buffered: diff,
                blocked_by,
            };
        }

        for chart in &mut self.charts {
            chart.range = chart.range.shifted(diff);
        }
        self.displayed = self.authoritative.clone();

        tracing::debug!("Advanced all charts by {} samples", diff);
        GrowthOutcome::Advanced { diff }
    }

    pub fn on_range_change(
        &mut self,
        chart: &ChartId,
        range: VisibleRange,
        origin: RangeOrigin,
    ) -> RangeOutcome {
        let len = self.displayed.len();
        let Some(index) = self.charts.iter().position(|c| &c.id == chart) else {
            return RangeOutcome::UnknownChart;
        };

        if origin == RangeOrigin::Programmatic {
            tracing::trace!(
                "Discarding programmatic echo for {} (full reset: {})",
                chart,
                range.spans_all(len)
            );
            return RangeOutcome::Echo;
        }

        if let Err(e) = range.validate(len) {
            tracing::debug!("Ignoring range {:?} for {}: {}", range, chart, e);
            return RangeOutcome::Rejected(e);
        }

        let stored = self.charts[index].range != range;
        if stored {
            self.charts[index].range = range;
        }

        let at_tail = range.end_index.is_some_and(|end| end + 1 >= len);
        let diff = self.pending();
        if at_tail && diff > 0 {
            self.charts[index].range = range.shifted(diff);
            self.displayed = self.authoritative.clone();
            tracing::debug!("Chart {} caught up by {} samples", chart, diff);
            return RangeOutcome::CaughtUp { diff };
        }

        if stored {
            RangeOutcome::Stored
        } else {
            RangeOutcome::Unchanged
        }
    }

    fn window(&self, chart: &ChartId) -> Option<&ChartWindow> {
        self.charts.iter().find(|c| &c.id == chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn seq(len: usize) -> Arc<Vec<usize>> {
        Arc::new((0..len).collect())
    }

    fn temperature() -> ChartId {
        ChartId::from("temperature")
    }

    fn humidity() -> ChartId {
        ChartId::from("humidity")
    }

    fn controller(len: usize) -> LiveWindowController<usize> {
        LiveWindowController::new([temperature(), humidity()], seq(len))
    }

    fn user(
        ctl: &mut LiveWindowController<usize>,
        chart: &ChartId,
        start: usize,
        end: usize,
    ) -> RangeOutcome {
        ctl.on_range_change(chart, VisibleRange::new(start, end), RangeOrigin::User)
    }

    #[test]
    fn test_initial_state_is_full_and_live() {
        let ctl = controller(10);
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::FULL));
        assert_eq!(ctl.is_live(&humidity()), Some(true));
        assert_eq!(ctl.visible(&temperature()).map(<[usize]>::len), Some(10));
        assert_eq!(ctl.pending(), 0);
        assert_eq!(ctl.authoritative_len(), 10);
        assert_eq!(ctl.charts().collect::<Vec<_>>(), vec![&temperature(), &humidity()]);
    }

    #[test]
    fn test_scenario_a_live_chart_follows_tail() {
        let mut ctl = controller(10);
        assert_eq!(user(&mut ctl, &temperature(), 0, 9), RangeOutcome::Stored);

        let outcome = ctl.on_data_grown(seq(13));

        assert_eq!(outcome, GrowthOutcome::Advanced { diff: 3 });
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(3, 12)));
        assert_eq!(ctl.range(&humidity()), Some(VisibleRange::FULL));
        assert_eq!(ctl.displayed().len(), 13);
        assert_eq!(ctl.visible(&temperature()), Some(&[3, 4, 5, 6, 7, 8, 9, 10, 11, 12][..]));
    }

    #[test]
    fn test_scenario_b_history_view_is_frozen() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 0, 4);

        let outcome = ctl.on_data_grown(seq(13));

        assert_eq!(
            outcome,
            GrowthOutcome::Held {
                buffered: 3,
                blocked_by: vec![temperature()]
            }
        );
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(0, 4)));
        assert_eq!(ctl.range(&humidity()), Some(VisibleRange::FULL));
        assert_eq!(ctl.displayed().len(), 10);
        assert_eq!(ctl.pending(), 3);
    }

    #[test]
    fn test_scenario_c_drag_to_tail_catches_up() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 0, 4);
        ctl.on_data_grown(seq(13));

        let outcome = user(&mut ctl, &temperature(), 6, 9);

        assert_eq!(outcome, RangeOutcome::CaughtUp { diff: 3 });
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(9, 12)));
        assert_eq!(ctl.range(&humidity()), Some(VisibleRange::FULL));
        assert_eq!(ctl.displayed().len(), 13);
        assert_eq!(ctl.pending(), 0);
    }

    #[test]
    fn test_scenario_d_programmatic_reset_echo_is_discarded() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 3, 9);
        ctl.on_data_grown(seq(12));
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(5, 11)));

        let outcome =
            ctl.on_range_change(&temperature(), VisibleRange::new(0, 11), RangeOrigin::Programmatic);

        assert_eq!(outcome, RangeOutcome::Echo);
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(5, 11)));
    }

    #[test]
    fn test_user_full_range_selection_is_honored() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 3, 9);
        ctl.on_data_grown(seq(12));

        assert_eq!(user(&mut ctl, &temperature(), 0, 11), RangeOutcome::Stored);
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(0, 11)));
    }

    #[test]
    fn test_catch_up_without_pending_data_is_noop() {
        let mut ctl = controller(10);
        let before = ctl.displayed().clone();

        assert_eq!(user(&mut ctl, &temperature(), 5, 9), RangeOutcome::Stored);
        assert_eq!(user(&mut ctl, &temperature(), 5, 9), RangeOutcome::Unchanged);

        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(5, 9)));
        assert!(Arc::ptr_eq(&before, ctl.displayed()));
    }

    #[test]
    fn test_catch_up_only_shifts_dragged_chart() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 0, 4);
        user(&mut ctl, &humidity(), 2, 6);
        ctl.on_data_grown(seq(15));

        user(&mut ctl, &humidity(), 4, 9);

        assert_eq!(ctl.range(&humidity()), Some(VisibleRange::new(9, 14)));
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(0, 4)));
        assert_eq!(ctl.displayed().len(), 15);
    }

    #[test]
    fn test_malformed_ranges_are_ignored() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 2, 5);

        assert_eq!(
            user(&mut ctl, &temperature(), 6, 3),
            RangeOutcome::Rejected(RangeError::Inverted { start: 6, end: 3 })
        );
        assert_eq!(
            user(&mut ctl, &temperature(), 0, 10),
            RangeOutcome::Rejected(RangeError::OutOfBounds { end: 10, len: 10 })
        );
        let half = VisibleRange {
            start_index: Some(1),
            end_index: None,
        };
        assert_eq!(
            ctl.on_range_change(&temperature(), half, RangeOrigin::User),
            RangeOutcome::Rejected(RangeError::Incomplete)
        );
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(2, 5)));
    }

    #[test]
    fn test_unknown_chart() {
        let mut ctl = controller(10);
        assert_eq!(
            user(&mut ctl, &ChartId::from("pressure"), 0, 1),
            RangeOutcome::UnknownChart
        );
        assert_eq!(ctl.range(&ChartId::from("pressure")), None);
    }

    #[test]
    fn test_non_positive_growth_is_noop() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 0, 9);

        assert_eq!(ctl.on_data_grown(seq(10)), GrowthOutcome::NoGrowth);
        assert_eq!(ctl.on_data_grown(seq(4)), GrowthOutcome::NoGrowth);
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(0, 9)));
        assert_eq!(ctl.displayed().len(), 10);
    }

    #[test]
    fn test_empty_sequence_keeps_ranges_undefined() {
        let mut ctl = controller(0);
        assert_eq!(
            user(&mut ctl, &temperature(), 0, 0),
            RangeOutcome::Rejected(RangeError::OutOfBounds { end: 0, len: 0 })
        );

        assert_eq!(ctl.on_data_grown(seq(3)), GrowthOutcome::Advanced { diff: 3 });
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::FULL));
        assert_eq!(ctl.displayed().len(), 3);
    }

    #[test]
    fn test_liveness_tolerance_boundary() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 0, 8);
        assert_eq!(ctl.is_live(&temperature()), Some(true));

        user(&mut ctl, &temperature(), 0, 7);
        assert_eq!(ctl.is_live(&temperature()), Some(false));
    }

    #[test]
    fn test_held_samples_are_revealed_on_next_live_growth() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 0, 4);
        ctl.on_data_grown(seq(12));

        // Back within tolerance of the tail, but not on it: no catch-up yet
        assert_eq!(user(&mut ctl, &temperature(), 4, 8), RangeOutcome::Stored);
        assert_eq!(ctl.displayed().len(), 10);

        assert_eq!(ctl.on_data_grown(seq(13)), GrowthOutcome::Advanced { diff: 3 });
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(7, 11)));
    }

    #[test]
    fn test_shorter_sequence_than_buffer_keeps_buffer() {
        let mut ctl = controller(10);
        user(&mut ctl, &temperature(), 0, 4);
        ctl.on_data_grown(seq(15));

        assert_eq!(
            ctl.on_data_grown(seq(12)),
            GrowthOutcome::Held {
                buffered: 5,
                blocked_by: vec![temperature()]
            }
        );
        assert_eq!(ctl.authoritative_len(), 15);

        user(&mut ctl, &temperature(), 4, 8);
        assert_eq!(ctl.on_data_grown(seq(12)), GrowthOutcome::Advanced { diff: 5 });
        assert_eq!(ctl.displayed().len(), 15);
        assert_eq!(ctl.range(&temperature()), Some(VisibleRange::new(9, 13)));
    }

    #[test]
    fn test_non_live_chart_stays_frozen_across_growth() {
        let mut ctl = controller(10);
        user(&mut ctl, &humidity(), 1, 4);
        let before = ctl.displayed().clone();

        for len in 11..40 {
            ctl.on_data_grown(seq(len));
            assert_eq!(ctl.range(&humidity()), Some(VisibleRange::new(1, 4)));
            assert!(Arc::ptr_eq(&before, ctl.displayed()));
        }
        assert_eq!(ctl.pending(), 29);
    }

    #[test]
    fn test_growth_matches_liveness_classification() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let charts = [temperature(), humidity()];
            let mut len = rng.random_range(0..20usize);
            let mut ctl = LiveWindowController::new(charts.clone(), seq(len));

            for _ in 0..200 {
                if rng.random_bool(0.4) {
                    let shown = ctl.displayed().len();
                    if shown > 0 {
                        let chart = &charts[rng.random_range(0..charts.len())];
                        let start = rng.random_range(0..shown);
                        let end = rng.random_range(start..shown);
                        user(&mut ctl, chart, start, end);
                    }
                    continue;
                }

                let shown = ctl.displayed().len();
                let before: Vec<VisibleRange> = charts
                    .iter()
                    .map(|c| ctl.range(c).unwrap())
                    .collect();
                let all_live = before.iter().all(|r| is_live(r, shown));

                len += rng.random_range(0..4usize);
                let outcome = ctl.on_data_grown(seq(len));
                let diff = len - shown;

                for (chart, prev) in charts.iter().zip(&before) {
                    let now = ctl.range(chart).unwrap();
                    if all_live && diff > 0 {
                        assert_eq!(now, prev.shifted(diff));
                        let width = |r: VisibleRange| r.bounds().map(|(s, e)| e - s);
                        assert_eq!(width(now), width(*prev));
                    } else {
                        assert_eq!(now, *prev);
                    }
                }

                if diff == 0 {
                    assert_eq!(outcome, GrowthOutcome::NoGrowth);
                } else if all_live {
                    assert_eq!(outcome, GrowthOutcome::Advanced { diff });
                    assert_eq!(ctl.displayed().len(), len);
                } else {
                    assert!(matches!(outcome, GrowthOutcome::Held { .. }));
                    assert_eq!(ctl.displayed().len(), shown);
                }

                for chart in &charts {
                    if let Some((start, end)) = ctl.range(chart).unwrap().bounds() {
                        assert!(start <= end && end < ctl.displayed().len());
                    }
                }
            }
        }
    }
}

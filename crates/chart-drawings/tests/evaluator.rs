// File: crates/chart-drawings/tests/evaluator.rs
// Purpose: TP/SL evaluation rules: write-once hits, tie-break, strictly-after-entry, replay order.

use chart_drawings::{Bar, HitType, Point, PositionEvaluator, PositionLevels, Side};

fn levels(side: Side, entry: Point, tp: f64, sl: f64) -> PositionLevels {
    PositionLevels { side, entry, take_profit: tp, stop_loss: sl }
}

fn bar(time: i64, high: f64, low: f64) -> Bar {
    Bar::new(time, (high + low) / 2.0, high, low, (high + low) / 2.0)
}

#[test]
fn hit_is_written_once() {
    let lv = levels(Side::Long, Point::at_logical(0.0, 100.0), 110.0, 95.0);
    let mut ev = PositionEvaluator::new();
    assert!(ev.check_bar(&lv, &bar(60, 105.0, 99.0), Some(1.0)).is_none());
    let hit = ev.check_bar(&lv, &bar(120, 112.0, 101.0), Some(2.0)).expect("tp on second bar");
    assert_eq!(hit.kind, HitType::Tp);
    assert_eq!(hit.price, 112.0);
    assert_eq!(hit.logical, Some(2.0));

    assert!(ev.check_bar(&lv, &bar(180, 108.0, 90.0), Some(3.0)).is_none());
    assert_eq!(ev.hit().map(|h| h.kind), Some(HitType::Tp));
    assert_eq!(ev.hit().map(|h| h.time), Some(Some(120)));
    // Close still tracks the latest bar.
    assert_eq!(ev.last_close(), Some(99.0));
}

#[test]
fn long_tie_break_prefers_take_profit() {
    let lv = levels(Side::Long, Point::at_logical(0.0, 100.0), 110.0, 95.0);
    let mut ev = PositionEvaluator::new();
    let hit = ev.check_bar(&lv, &bar(60, 115.0, 80.0), Some(1.0)).expect("hit");
    assert_eq!(hit.kind, HitType::Tp);
    assert_eq!(hit.price, 115.0);
}

#[test]
fn short_side_uses_opposite_extremes() {
    let lv = levels(Side::Short, Point::at_logical(0.0, 100.0), 90.0, 105.0);
    let mut ev = PositionEvaluator::new();
    let hit = ev.check_bar(&lv, &bar(60, 106.0, 98.0), Some(1.0)).expect("sl");
    assert_eq!(hit.kind, HitType::Sl);
    assert_eq!(hit.price, 106.0);

    let mut ev = PositionEvaluator::new();
    let hit = ev.check_bar(&lv, &bar(60, 101.0, 89.0), Some(1.0)).expect("tp");
    assert_eq!(hit.kind, HitType::Tp);
    assert_eq!(hit.price, 89.0);
}

#[test]
fn entry_bar_and_earlier_bars_are_ignored() {
    let lv = levels(Side::Long, Point::at_logical(5.0, 100.0), 110.0, 95.0);
    let mut ev = PositionEvaluator::new();
    assert!(ev.check_bar(&lv, &bar(300, 120.0, 80.0), Some(5.0)).is_none());
    assert!(ev.check_bar(&lv, &bar(240, 120.0, 80.0), Some(4.0)).is_none());
    assert!(ev.hit().is_none());
    assert_eq!(ev.last_close(), Some(100.0));

    // Time comparison when the bar has no logical index.
    let lv = levels(Side::Long, Point::at_time(1_000, 100.0), 110.0, 95.0);
    assert!(ev.check_bar(&lv, &bar(1_000, 120.0, 99.0), None).is_none());
    assert!(ev.check_bar(&lv, &bar(1_060, 120.0, 99.0), None).is_some());
}

#[test]
fn replay_walks_bars_in_time_order() {
    let lv = levels(Side::Long, Point::at_logical(0.0, 100.0), 110.0, 95.0);
    let bars = vec![bar(0, 101.0, 99.0), bar(60, 104.0, 94.0), bar(120, 111.0, 100.0)];
    let mut ev = PositionEvaluator::new();
    let hit = ev.replay(&lv, &bars).expect("sl first");
    assert_eq!(hit.kind, HitType::Sl);
    assert_eq!(hit.logical, Some(1.0));
    assert_eq!(ev.last_close(), Some(105.5));
}

#[test]
fn reset_allows_re_evaluation() {
    let lv = levels(Side::Long, Point::at_logical(0.0, 100.0), 110.0, 95.0);
    let mut ev = PositionEvaluator::new();
    ev.check_bar(&lv, &bar(60, 111.0, 100.0), Some(1.0));
    assert!(ev.hit().is_some());
    ev.reset();
    assert!(ev.hit().is_none());
    let moved = levels(Side::Long, Point::at_logical(0.0, 100.0), 120.0, 95.0);
    assert!(ev.check_bar(&moved, &bar(60, 111.0, 100.0), Some(1.0)).is_none());
}

#[test]
fn arrow_direction_follows_last_close() {
    let lv = levels(Side::Long, Point::at_logical(0.0, 100.0), 110.0, 95.0);
    let mut ev = PositionEvaluator::new();
    assert!(ev.moving_toward_tp(&lv), "no bars yet: defaults to TP");
    ev.check_bar(&lv, &Bar::new(60, 100.0, 101.0, 97.0, 98.0), Some(1.0));
    assert!(!ev.moving_toward_tp(&lv));

    let short = levels(Side::Short, Point::at_logical(0.0, 100.0), 90.0, 105.0);
    assert!(ev.moving_toward_tp(&short));
}

//! Property tests for TransitionController
//!
//! These tests drive the controller directly (no runtime, no driver task) and
//! feed completion tickets back by hand, checking:
//! - Cyclic navigation closes after `count` steps
//! - Only the most recent deferred request survives a busy window
//! - Direction follows the shorter way around for plain jumps
//! - Stale tickets never unblock the current transition

use hero_carousel::render::{CompletionReceiver, completion_channel};
use hero_carousel::{CarouselEvent, Direction, InstantAdapter, Slide, TransitionController};
use proptest::prelude::*;

fn controller(count: usize) -> (TransitionController, CompletionReceiver) {
    let slides: Vec<Slide> = (0..count)
        .map(|i| Slide::new(format!("/images/{i}.jpg")))
        .collect();
    let (tx, rx) = completion_channel();
    (
        TransitionController::new(slides, Box::new(InstantAdapter), tx),
        rx,
    )
}

/// Feed every queued completion back into the controller
fn drain(ctl: &mut TransitionController, rx: &mut CompletionReceiver) -> Vec<CarouselEvent> {
    let mut events = Vec::new();
    while let Ok(ticket) = rx.try_recv() {
        events.extend(ctl.on_transition_complete(ticket));
    }
    events
}

#[test]
fn test_instant_adapter_completion_is_queued_not_reentrant() {
    let (mut ctl, mut rx) = controller(3);

    ctl.request_next();
    // completed inside begin_transition, but the controller only learns about it here
    assert!(ctl.is_busy());

    let events = drain(&mut ctl, &mut rx);
    assert!(matches!(events[0], CarouselEvent::TransitionCompleted { index: 1, .. }));
    assert!(!ctl.is_busy());
}

#[test]
fn test_prev_from_zero_wraps_to_last() {
    let (mut ctl, _rx) = controller(4);

    let events = ctl.request_prev();

    assert_eq!(ctl.index(), 3);
    assert!(matches!(
        events[0],
        CarouselEvent::IndexChanged {
            index: 3,
            previous: 0,
            direction: Direction::Backward
        }
    ));
}

proptest! {
    #[test]
    fn prop_next_count_times_returns_to_start(count in 2usize..12, start in 0usize..12) {
        let (mut ctl, mut rx) = controller(count);
        let start = start % count;
        ctl.request_jump(start);
        drain(&mut ctl, &mut rx);

        for _ in 0..count {
            ctl.request_next();
            drain(&mut ctl, &mut rx);
        }

        prop_assert_eq!(ctl.index(), start);
        prop_assert!(!ctl.is_busy());
    }

    #[test]
    fn prop_prev_undoes_next(count in 2usize..12, steps in 1usize..20) {
        let (mut ctl, mut rx) = controller(count);

        for _ in 0..steps {
            ctl.request_next();
            drain(&mut ctl, &mut rx);
        }
        for _ in 0..steps {
            ctl.request_prev();
            drain(&mut ctl, &mut rx);
        }

        prop_assert_eq!(ctl.index(), 0);
    }

    #[test]
    fn prop_only_latest_request_survives(
        count in 3usize..10,
        first in 1usize..10,
        burst in proptest::collection::vec(0usize..10, 1..12),
    ) {
        let (mut ctl, mut rx) = controller(count);
        let first = first % count;
        prop_assume!(first != 0);

        ctl.request_jump(first);
        prop_assert!(ctl.is_busy());

        let burst: Vec<usize> = burst.into_iter().map(|i| i % count).collect();
        for &index in &burst {
            ctl.request_jump(index);
        }

        // the last request that differs from the in-flight index wins
        let expected = burst
            .iter()
            .rev()
            .copied()
            .find(|&i| i != first)
            .unwrap_or(first);

        drain(&mut ctl, &mut rx);
        prop_assert_eq!(ctl.index(), expected);
        prop_assert!(!ctl.is_busy());
    }

    #[test]
    fn prop_jump_direction_takes_shorter_way(count in 3usize..16, from in 0usize..16, to in 0usize..16) {
        let (mut ctl, mut rx) = controller(count);
        let (from, to) = (from % count, to % count);
        prop_assume!(from != to);

        ctl.request_jump(from);
        drain(&mut ctl, &mut rx);
        let events = ctl.request_jump(to);

        let forward = (to + count - from) % count;
        let backward = count - forward;
        let expected = if forward <= backward { Direction::Forward } else { Direction::Backward };
        let is_expected = matches!(
            events[0],
            CarouselEvent::IndexChanged { direction, .. } if direction == expected
        );
        prop_assert!(is_expected);
    }

    #[test]
    fn prop_stale_tickets_are_ignored(count in 2usize..8, rounds in 1usize..6) {
        let (mut ctl, mut rx) = controller(count);
        let mut seen = Vec::new();

        for _ in 0..rounds {
            ctl.request_next();
            while let Ok(ticket) = rx.try_recv() {
                seen.push(ticket);
                ctl.on_transition_complete(ticket);
            }
        }

        ctl.request_next();
        prop_assert!(ctl.is_busy());
        for ticket in seen {
            prop_assert!(ctl.on_transition_complete(ticket).is_empty());
        }
        prop_assert!(ctl.is_busy());
    }
}

//! Property-based tests for counter state

use proptest::prelude::*;

use livecount::backend::counter::CounterState;
use livecount::shared::CounterAction;

fn action() -> impl Strategy<Value = CounterAction> {
    prop_oneof![
        Just(CounterAction::Increment),
        Just(CounterAction::Decrement),
        Just(CounterAction::Reset),
    ]
}

proptest! {
    #[test]
    fn test_history_is_bounded_and_most_recent(
        actions in prop::collection::vec(action(), 0..200),
        limit in 1usize..40,
    ) {
        let mut state = CounterState::new(limit);
        let mut expected = 0i64;
        for (n, action) in actions.iter().enumerate() {
            expected = action.apply(expected);
            prop_assert_eq!(state.apply_action(*action, format!("c{}", n)), expected);
        }

        let snapshot = state.snapshot();
        prop_assert_eq!(snapshot.value, expected);
        prop_assert_eq!(snapshot.recent_actions.len(), actions.len().min(limit));

        let skipped = actions.len().saturating_sub(limit);
        for (offset, record) in snapshot.recent_actions.iter().enumerate() {
            prop_assert_eq!(&record.client_id, &format!("c{}", skipped + offset));
            prop_assert_eq!(record.action, actions[skipped + offset]);
        }
    }
}

//! Property-based tests for optimistic reconciliation
//! Any mix of committed and reverted transactions must leave exactly the
//! committed effects, whatever order they resolve in

use draftline::actions::{self, Action, Payload};
use draftline::notifications::{Notification, NotificationKind};
use draftline::optimist::OptimisticLayer;
use draftline::workflow::{TransactionId, WorkflowStatus};
use proptest::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
struct Log {
    moved: Vec<String>,
    notices: usize,
}

fn log_reducer(state: &mut Log, action: &Action) {
    match &action.payload {
        Payload::StatusChangeRequest { slug, .. } => state.moved.push(slug.clone()),
        Payload::NotifSend(_) => state.notices += 1,
        _ => {}
    }
}

fn notice() -> Action {
    actions::notif_send(Notification::new("tick", NotificationKind::Info, Duration::from_secs(1)))
}

// Transaction count, commit/revert outcome per transaction, resolution order
fn scenario() -> impl Strategy<Value = (Vec<bool>, Vec<usize>)> {
    (1usize..8).prop_flat_map(|n| {
        (
            proptest::collection::vec(any::<bool>(), n),
            Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
        )
    })
}

proptest! {
    #[test]
    fn prop_only_committed_transactions_survive((outcomes, order) in scenario()) {
        let mut optimist = OptimisticLayer::new(Log::default(), log_reducer);
        let ids: Vec<TransactionId> = outcomes.iter().map(|_| TransactionId::generate()).collect();

        for (i, id) in ids.iter().enumerate() {
            optimist.apply(actions::unpublished_entry_status_change_request(
                "posts",
                &format!("entry-{i}"),
                WorkflowStatus::Draft,
                WorkflowStatus::Review,
                *id,
            ));
        }
        prop_assert_eq!(optimist.pending(), ids.len());

        for &i in &order {
            let slug = format!("entry-{i}");
            let action = if outcomes[i] {
                actions::unpublished_entry_status_change_persisted(
                    "posts",
                    &slug,
                    WorkflowStatus::Draft,
                    WorkflowStatus::Review,
                    ids[i],
                )
            } else {
                actions::unpublished_entry_status_change_error("posts", &slug, ids[i])
            };
            optimist.apply(action);
            optimist.apply(notice());
        }

        let expected: Vec<String> = (0..ids.len())
            .filter(|&i| outcomes[i])
            .map(|i| format!("entry-{i}"))
            .collect();
        prop_assert_eq!(&optimist.state().moved, &expected);
        prop_assert_eq!(optimist.state().notices, ids.len());
        prop_assert_eq!(optimist.pending(), 0);
    }

    #[test]
    fn prop_plain_actions_are_never_rolled_back(reverts in 1usize..6, notices in 0usize..6) {
        let mut optimist = OptimisticLayer::new(Log::default(), log_reducer);
        let ids: Vec<TransactionId> = (0..reverts).map(|_| TransactionId::generate()).collect();

        for id in &ids {
            optimist.apply(actions::unpublished_entry_publish_request("posts", "a", *id));
        }
        for _ in 0..notices {
            optimist.apply(notice());
        }
        for id in &ids {
            optimist.apply(actions::unpublished_entry_publish_error("posts", "a", *id));
        }

        prop_assert_eq!(optimist.state().notices, notices);
        prop_assert!(optimist.state().moved.is_empty());
        prop_assert_eq!(optimist.pending(), 0);
    }
}

//! Reconciliation tests

use std::collections::HashSet;
use std::time::Duration;

use dashsync::models::deployment::{DeploymentAction, DeploymentStatus};
use dashsync::store::snapshot::Snapshot;
use dashsync::view::reconcile::{render_full_list, ReconcilePath, Reconciler};
use dashsync::view::state::ViewState;

use crate::mock::info;

fn snapshot(entries: &[(i64, &str, u8)]) -> Snapshot {
    Snapshot::from_wire(entries.iter().map(|(id, status, p)| info(*id, status, *p)).collect()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_reconcile_is_idempotent() {
    let reconciler = Reconciler::default();
    let fresh = snapshot(&[(1, "pending", 1), (2, "running", 2), (3, "failed", 3)]);

    let (once, _) = reconciler.reconcile(ViewState::default(), &fresh);
    let (twice, outcome) = reconciler.reconcile(once.clone(), &fresh);

    assert_eq!(once, twice);
    assert_eq!(outcome.path, ReconcilePath::Incremental);
    assert!(outcome.highlighted.is_empty());
    assert_eq!(outcome.bound, 0);
    assert_eq!(outcome.unbound, 0);
}

#[tokio::test(start_paused = true)]
async fn test_first_pass_matches_full_render() {
    let reconciler = Reconciler::default();
    let fresh = snapshot(&[(4, "stopped", 1), (2, "cancelled", 2), (9, "pending", 3)]);

    let (view, outcome) = reconciler.reconcile(ViewState::default(), &fresh);
    assert_eq!(outcome.path, ReconcilePath::FullRebuild);
    assert_eq!(view, render_full_list(&fresh));

    let order: Vec<i64> = view.rows().iter().map(|r| r.deployment_id).collect();
    assert_eq!(order, vec![4, 2, 9]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_snapshot_renders_nothing() {
    let reconciler = Reconciler::default();
    let (view, outcome) = reconciler.reconcile(ViewState::default(), &Snapshot::default());
    assert!(view.is_empty());
    assert_eq!(view.rebuilds(), 0);
    assert_eq!(outcome.path, ReconcilePath::Incremental);
    assert_eq!(view, render_full_list(&Snapshot::default()));
}

#[tokio::test(start_paused = true)]
async fn test_emptied_list_matches_full_render() {
    let reconciler = Reconciler::default();
    let (view, _) = reconciler.reconcile(ViewState::default(), &snapshot(&[(1, "pending", 1)]));

    let (view, outcome) = reconciler.reconcile(view, &Snapshot::default());
    assert_eq!(outcome.path, ReconcilePath::FullRebuild);
    assert!(view.is_empty());
    assert!(view.resolve_handler(1).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_membership_change_replaces_every_element() {
    let reconciler = Reconciler::default();
    let (view, _) = reconciler.reconcile(
        ViewState::default(),
        &snapshot(&[(1, "pending", 1), (2, "running", 2)]),
    );
    let before: HashSet<u64> = view.rows().iter().map(|r| r.element_id).collect();
    let handlers: Vec<u64> = view.rows()[0].controls.iter().map(|c| c.handler_id).collect();

    let (view, outcome) = reconciler.reconcile(
        view,
        &snapshot(&[(1, "pending", 1), (2, "running", 2), (3, "pending", 2)]),
    );
    assert_eq!(outcome.path, ReconcilePath::FullRebuild);
    assert_eq!(view.rows().len(), 3);
    assert_eq!(view.rebuilds(), 2);

    let after: HashSet<u64> = view.rows().iter().map(|r| r.element_id).collect();
    assert!(before.is_disjoint(&after));
    for handler_id in handlers {
        assert!(view.resolve_handler(handler_id).is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn test_removal_rebuilds_remaining_rows() {
    let reconciler = Reconciler::default();
    let (view, _) = reconciler.reconcile(
        ViewState::default(),
        &snapshot(&[(1, "pending", 1), (2, "running", 2)]),
    );

    let (view, outcome) = reconciler.reconcile(view, &snapshot(&[(2, "running", 2)]));
    assert_eq!(outcome.path, ReconcilePath::FullRebuild);
    assert_eq!(view.rendered_ids(), HashSet::from([2]));
    // three controls for the pending row, two for the running one
    assert_eq!(outcome.unbound, 5);
    assert_eq!(outcome.bound, 2);
}

#[tokio::test(start_paused = true)]
async fn test_status_change_is_highlighted_and_rebinds_controls() {
    let reconciler = Reconciler::new(Duration::from_millis(1500));
    let (view, _) = reconciler.reconcile(ViewState::default(), &snapshot(&[(1, "pending", 2)]));

    let row = view.row(1).unwrap();
    assert_eq!(
        row.actions(),
        vec![DeploymentAction::Start, DeploymentAction::Cancel, DeploymentAction::Delete]
    );
    let element_id = row.element_id;
    let start = row.controls[0].handler_id;
    let delete = row.controls[2].handler_id;

    let (view, outcome) = reconciler.reconcile(view, &snapshot(&[(1, "running", 2)]));
    assert_eq!(outcome.path, ReconcilePath::Incremental);
    assert_eq!(outcome.highlighted, vec![1]);
    assert_eq!(outcome.bound, 1);
    assert_eq!(outcome.unbound, 2);

    let row = view.row(1).unwrap();
    assert_eq!(row.element_id, element_id);
    assert_eq!(row.status, DeploymentStatus::Running);
    assert_eq!(row.badge.label, "RUNNING");
    assert_eq!(row.badge.class, "badge-running");
    assert_eq!(row.actions(), vec![DeploymentAction::Stop, DeploymentAction::Delete]);
    assert_eq!(row.controls[1].handler_id, delete);
    assert!(view.resolve_handler(start).is_none());
    assert_eq!(view.resolve_handler(delete), Some((1, DeploymentAction::Delete)));
    assert!(row.is_highlighted(tokio::time::Instant::now()));
}

#[tokio::test(start_paused = true)]
async fn test_highlight_expires_and_retriggers() {
    let reconciler = Reconciler::new(Duration::from_millis(1500));
    let (view, _) = reconciler.reconcile(ViewState::default(), &snapshot(&[(1, "pending", 2)]));
    let (view, _) = reconciler.reconcile(view, &snapshot(&[(1, "running", 2)]));
    let first = view.row(1).unwrap().emphasis.clone().unwrap();

    tokio::time::advance(Duration::from_millis(500)).await;
    let (view, outcome) = reconciler.reconcile(view, &snapshot(&[(1, "stopped", 2)]));
    assert_eq!(outcome.highlighted, vec![1]);
    let second = view.row(1).unwrap().emphasis.clone().unwrap();
    assert_ne!(first.marker, second.marker);
    assert!(second.expires_at > first.expires_at);

    tokio::time::advance(Duration::from_millis(1600)).await;
    let mut view = view;
    assert!(!view.row(1).unwrap().is_highlighted(tokio::time::Instant::now()));
    assert_eq!(view.clear_expired_emphasis(tokio::time::Instant::now()), 1);
    assert!(view.row(1).unwrap().emphasis.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_reorder_keeps_rendered_order() {
    let reconciler = Reconciler::default();
    let (view, _) = reconciler.reconcile(
        ViewState::default(),
        &snapshot(&[(1, "pending", 1), (2, "running", 2)]),
    );
    let (view, outcome) = reconciler.reconcile(
        view,
        &snapshot(&[(2, "running", 2), (1, "pending", 1)]),
    );

    assert_eq!(outcome.path, ReconcilePath::Incremental);
    let order: Vec<i64> = view.rows().iter().map(|r| r.deployment_id).collect();
    assert_eq!(order, vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_fields_are_not_patched() {
    let reconciler = Reconciler::default();
    let (view, _) = reconciler.reconcile(ViewState::default(), &snapshot(&[(1, "pending", 1)]));

    let mut renamed = info(1, "pending", 1);
    renamed.name = "renamed".to_string();
    let (view, outcome) = reconciler.reconcile(view, &Snapshot::from_wire(vec![renamed]).unwrap());

    assert_eq!(outcome.path, ReconcilePath::Incremental);
    assert_eq!(view.row(1).unwrap().name, "dep-1");
}

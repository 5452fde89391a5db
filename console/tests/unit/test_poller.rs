//! Poller worker tests

use std::time::Duration;

use dashsync::workers::poller;
use tokio::sync::oneshot;

use crate::mock::{dashboard, info, FakeApi, FakeSession};

fn options() -> poller::Options {
    poller::Options {
        interval: Duration::from_secs(5),
        visible_refresh_delay: Duration::from_secs(1),
    }
}

#[tokio::test(start_paused = true)]
async fn test_poller_only_fetches_while_visible() {
    let api = FakeApi::new(vec![info(1, "pending", 1)]);
    let dashboard = dashboard(api.clone(), FakeSession::signed_in());
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let worker = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move {
            poller::run(
                &options(),
                dashboard.as_ref(),
                Box::pin(async move {
                    let _ = shutdown_rx.await;
                }),
            )
            .await;
        })
    };

    // six ticks go by with the view hidden
    tokio::time::sleep(Duration::from_secs(32)).await;
    assert_eq!(api.list_calls(), 0);

    // becoming visible schedules one extra refresh (list and candidates)
    dashboard.set_visible(true);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(api.list_calls(), 2);
    assert_eq!(dashboard.view().await.rows().len(), 1);
    assert_eq!(dashboard.form().await.candidates.len(), 1);

    // the regular tick at 35s
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(api.list_calls(), 3);

    // hidden again: ticks keep firing but fetch nothing
    dashboard.set_visible(false);
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(api.list_calls(), 3);

    shutdown_tx.send(()).unwrap();
    worker.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_quick_toggle_schedules_refresh_once() {
    let api = FakeApi::new(vec![info(1, "running", 2)]);
    let dashboard = dashboard(api.clone(), FakeSession::signed_in());
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let worker = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move {
            poller::run(
                &options(),
                dashboard.as_ref(),
                Box::pin(async move {
                    let _ = shutdown_rx.await;
                }),
            )
            .await;
        })
    };
    tokio::task::yield_now().await;

    dashboard.set_visible(true);
    tokio::time::sleep(Duration::from_millis(400)).await;
    dashboard.set_visible(false);
    tokio::time::sleep(Duration::from_millis(400)).await;
    dashboard.set_visible(true);

    // one refresh, one second after the last showing
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(api.list_calls(), 0);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(api.list_calls(), 2);

    shutdown_tx.send(()).unwrap();
    worker.await.unwrap();
}

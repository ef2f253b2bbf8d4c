//! Tests for the background sweeper.

mod common;

use std::time::Duration;

use covergen_ai::CreativeDirection;
use covergen_api::background::sweeper::{self, SweepReport};
use covergen_core::generation::CoverBatch;
use tokio_util::sync::CancellationToken;

fn direction() -> CreativeDirection {
    CreativeDirection {
        title: "Old".into(),
        title_suggestions: vec!["Old".into()],
        image_prompt: "an hourglass".into(),
        negative_prompt: None,
        model: "stub-text".into(),
    }
}

#[tokio::test]
async fn sweep_purges_expired_state() {
    let app = common::build_test_app().await;
    let state = &app.state;

    state
        .directions
        .set("direction:stale", direction(), Duration::from_millis(1));
    state.directions.set_default("direction:fresh", direction());

    let job = state
        .jobs
        .submit("anonymous".into(), vec!["youtube".into()], |id| async move {
            Ok(CoverBatch::new(id, "modern".into(), Vec::new()))
        })
        .await;
    for _ in 0..100 {
        if state.jobs.get(job.id).await.unwrap().status.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;

    let report = sweeper::sweep(state, Duration::ZERO).await;

    assert_eq!(
        report,
        SweepReport {
            cache_entries: 1,
            rate_limit_windows: 0,
            jobs: 1,
        }
    );
    assert!(state.directions.get("direction:fresh").is_some());
    assert!(state.jobs.get(job.id).await.is_none());
}

#[tokio::test]
async fn sweep_keeps_recent_jobs() {
    let app = common::build_test_app().await;
    let job = app
        .state
        .jobs
        .submit("anonymous".into(), Vec::new(), |id| async move {
            Ok(CoverBatch::new(id, "modern".into(), Vec::new()))
        })
        .await;

    let report = sweeper::sweep(&app.state, Duration::from_secs(3600)).await;

    assert_eq!(report.jobs, 0);
    assert!(app.state.jobs.get(job.id).await.is_some());
}

#[tokio::test]
async fn sweeper_stops_on_cancel() {
    let app = common::build_test_app().await;
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(sweeper::run(app.state.clone(), cancel.clone()));

    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("sweeper should stop promptly")
        .unwrap();
}

//! Scenario tests for the title pipeline and the scheduled summary, run
//! in process against the in-memory store and fake upstream services.

mod fixtures;
mod helpers;

use std::sync::Arc;

use strum::IntoEnumIterator;
use tokio_test::assert_ok;
use uuid::Uuid;

use fixtures::*;
use helpers::*;
use titleforge::db::settings::SummarySettings;
use titleforge::db::state_store::{MemoryStateStore, Namespace};
use titleforge::models::event::{Event, SubmitPayload, Topic, VideosFetchedPayload};
use titleforge::models::job::JobStatus;
use titleforge::models::summary::ChannelInfo;
use titleforge::pipeline::{self, Pipeline};
use titleforge::scheduler::run_summary_once;

fn happy_harness() -> Harness {
    let videos = sample_videos(5);
    let reply = titles_json(&videos);
    Harness::new(
        FakePlatform::new(Some(sample_channel()), videos),
        FakeGenerator::replying(reply),
        FakeMailer::new(),
    )
}

fn topics(trace: &[Event]) -> Vec<Topic> {
    trace.iter().map(Event::topic).collect()
}

async fn submit(h: &Harness, pipeline: &Pipeline, channel: &str) -> (Uuid, Vec<Event>) {
    let job = h.jobs().create(channel, REQUESTER).await.unwrap();
    assert_eq!(job.status, JobStatus::Queued);

    let trace = pipeline
        .drain(Event::Submit(SubmitPayload {
            job_id: job.job_id,
            channel: job.channel.clone(),
            email: job.email.clone(),
        }))
        .await;
    (job.job_id, trace)
}

#[test]
fn test_every_topic_has_a_subscriber() {
    let h = happy_harness();
    let pipeline = assert_ok!(pipeline::build_pipeline(&h.collaborators));
    for topic in Topic::iter() {
        assert!(
            !pipeline.subscribers(topic).is_empty(),
            "{topic} has no subscriber"
        );
    }
}

#[tokio::test]
async fn test_handle_submission_completes_with_five_titles() {
    let h = happy_harness();
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    let (job_id, trace) = submit(&h, &pipeline, "@somehandle").await;

    assert_eq!(
        topics(&trace),
        vec![
            Topic::Submit,
            Topic::ChannelResolved,
            Topic::VideosFetched,
            Topic::TitlesReady,
            Topic::EmailSent,
        ]
    );

    let job = h.jobs().get(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.channel_id.as_deref(), Some(CHANNEL_ID));
    assert_eq!(job.channel_name.as_deref(), Some(CHANNEL_NAME));
    assert!(job.completed_at.is_some());
    assert!(job.error.is_none());

    let videos = sample_videos(5);
    assert_eq!(job.improved_titles.len(), 5);
    for (title, video) in job.improved_titles.iter().zip(&videos) {
        assert_eq!(title.url, video.url);
        assert_eq!(title.original, video.title);
    }

    assert_eq!(*h.platform.searches.lock().unwrap(), vec!["somehandle".to_string()]);
    assert_eq!(
        *h.platform.listings.lock().unwrap(),
        vec![(CHANNEL_ID.to_string(), pipeline::INTERACTIVE_VIDEO_LIMIT)]
    );

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, REQUESTER);
    assert_eq!(sent[0].subject, format!("Your AI-optimized titles for {CHANNEL_NAME}"));
    assert!(sent[0].html.contains("My video number 0 (You Won&#39;t Believe It)"));
}

#[tokio::test]
async fn test_free_text_channel_is_searched_verbatim() {
    let h = happy_harness();
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    submit(&h, &pipeline, "Some Handle Official").await;

    assert_eq!(
        *h.platform.searches.lock().unwrap(),
        vec!["Some Handle Official".to_string()]
    );
}

#[tokio::test]
async fn test_unknown_channel_fails_and_notifies_once() {
    let h = Harness::new(
        FakePlatform::new(None, sample_videos(5)),
        FakeGenerator::failing(),
        FakeMailer::new(),
    );
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    let (job_id, trace) = submit(&h, &pipeline, "NoSuchChannelXYZ").await;

    assert_eq!(
        topics(&trace),
        vec![Topic::Submit, Topic::ChannelError, Topic::ErrorNotified]
    );

    let job = h.jobs().get(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.is_some());
    assert!(h.platform.listings.lock().unwrap().is_empty());

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, REQUESTER);
    assert!(sent[0].html.contains("No channel found for this name or handle"));
}

#[tokio::test]
async fn test_zero_videos_never_reaches_titles_or_email() {
    let h = Harness::new(
        FakePlatform::new(Some(sample_channel()), vec![]),
        FakeGenerator::replying(titles_json(&[])),
        FakeMailer::new(),
    );
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    let (job_id, trace) = submit(&h, &pipeline, "@somehandle").await;

    let seen = topics(&trace);
    assert!(seen.contains(&Topic::VideosError));
    assert!(!seen.contains(&Topic::TitlesReady));
    assert!(!seen.contains(&Topic::EmailSent));
    assert!(h.generator.requests.lock().unwrap().is_empty());

    let job = h.jobs().get(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.improved_titles.is_empty());

    let failure = trace.iter().find_map(Event::as_failure).unwrap();
    assert_eq!(failure.channel_name.as_deref(), Some(CHANNEL_NAME));
    assert_eq!(failure.error.as_deref(), Some("No videos found for this channel"));
}

#[tokio::test]
async fn test_rejected_email_fails_job_without_email_sent() {
    let videos = sample_videos(5);
    let h = Harness::new(
        FakePlatform::new(Some(sample_channel()), videos.clone()),
        FakeGenerator::replying(titles_json(&videos)),
        FakeMailer::rejecting(),
    );
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    let (job_id, trace) = submit(&h, &pipeline, "@somehandle").await;

    let seen = topics(&trace);
    assert_eq!(seen.last(), Some(&Topic::EmailError));
    assert!(!seen.contains(&Topic::EmailSent));
    // The failure notice is rejected too and is not re-notified.
    assert!(!seen.contains(&Topic::ErrorNotified));

    let job = h.jobs().get(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("not verified"));
}

#[tokio::test]
async fn test_short_model_response_is_a_title_failure() {
    let videos = sample_videos(5);
    let h = Harness::new(
        FakePlatform::new(Some(sample_channel()), videos.clone()),
        FakeGenerator::replying(titles_json(&videos[..4])),
        FakeMailer::new(),
    );
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    let (job_id, trace) = submit(&h, &pipeline, "@somehandle").await;

    let seen = topics(&trace);
    assert!(seen.contains(&Topic::TitlesError));
    assert!(!seen.contains(&Topic::TitlesReady));

    let job = h.jobs().get(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.improved_titles.is_empty());
    assert!(job.error.unwrap().contains("4 titles for 5 videos"));

    // Internal detail stays in the record; the requester gets the generic text.
    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html.contains("Failed to generate improved titles. Please try again!"));
    assert!(!sent[0].html.contains("4 titles"));
}

#[tokio::test]
async fn test_missing_api_key_fails_job_with_generic_notice() {
    let h = Harness::new(
        FakePlatform::new(Some(sample_channel()), sample_videos(5)),
        FakeGenerator::misconfigured(),
        FakeMailer::new(),
    );
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    let (job_id, trace) = submit(&h, &pipeline, "@somehandle").await;

    assert_eq!(
        topics(&trace),
        vec![
            Topic::Submit,
            Topic::ChannelResolved,
            Topic::VideosFetched,
            Topic::TitlesError,
            Topic::ErrorNotified,
        ]
    );

    let job = h.jobs().get(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("not configured"));

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html.contains("Failed to generate improved titles. Please try again!"));
    assert!(!sent[0].html.contains("not configured"));
}

#[tokio::test]
async fn test_delivered_email_is_reported_sent_when_record_cannot_close() {
    let videos = sample_videos(5);
    let store = Arc::new(MemoryStateStore::new());
    let h = Harness::with_store(
        store.clone(),
        Arc::new(FaultyStore::refusing_status(store, "completed")),
        FakePlatform::new(Some(sample_channel()), videos.clone()),
        FakeGenerator::replying(titles_json(&videos)),
        FakeMailer::new(),
    );
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    let (job_id, trace) = submit(&h, &pipeline, "@somehandle").await;

    let seen = topics(&trace);
    assert_eq!(seen.last(), Some(&Topic::EmailSent));
    assert!(!seen.contains(&Topic::EmailError));
    assert!(!seen.contains(&Topic::ErrorNotified));
    assert_eq!(h.mailer.sent().len(), 1);

    let job = h.jobs().get(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::SendingEmail);
}

#[tokio::test]
async fn test_relay_publishes_follow_ups() {
    let h = happy_harness();
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();
    let sink = CollectingSink::new();
    let job = h.jobs().create("@somehandle", REQUESTER).await.unwrap();

    pipeline
        .relay(
            &Event::Submit(SubmitPayload {
                job_id: job.job_id,
                channel: job.channel.clone(),
                email: job.email.clone(),
            }),
            &sink,
        )
        .await;

    assert_eq!(topics(&sink.events()), vec![Topic::ChannelResolved]);
    let job = h.jobs().get(job.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::ResolvingChannel);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_relay_with_queue_down_finishes_job_in_process() {
    let h = happy_harness();
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();
    let sink = CollectingSink::offline();
    let job = h.jobs().create("@somehandle", REQUESTER).await.unwrap();

    pipeline
        .relay(
            &Event::Submit(SubmitPayload {
                job_id: job.job_id,
                channel: job.channel.clone(),
                email: job.email.clone(),
            }),
            &sink,
        )
        .await;

    assert!(sink.events().is_empty());
    let job = h.jobs().get(job.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.improved_titles.len(), 5);
    assert_eq!(h.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_event_for_closed_job_is_dropped() {
    let h = happy_harness();
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    let job = h.jobs().create("@somehandle", REQUESTER).await.unwrap();
    h.jobs().mark_failed(job.job_id, "cancelled").await.unwrap();

    let emitted = pipeline
        .dispatch(&Event::VideosFetched(VideosFetchedPayload {
            job_id: job.job_id,
            channel_name: CHANNEL_NAME.to_string(),
            channel_id: CHANNEL_ID.to_string(),
            videos: sample_videos(5),
            email: REQUESTER.to_string(),
        }))
        .await;

    assert!(emitted.is_empty());
    let job = h.jobs().get(job.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("cancelled"));
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_concurrent_jobs_are_independent() {
    let h = happy_harness();
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();

    let runs = futures::future::join_all((0..4).map(|_| submit(&h, &pipeline, "@somehandle"))).await;

    let mut ids: Vec<Uuid> = runs.iter().map(|(id, _)| *id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    for (job_id, trace) in &runs {
        assert_eq!(trace.last().map(Event::topic), Some(Topic::EmailSent));
        assert!(trace.iter().all(|e| e.job_id() == Some(*job_id)));
        let job = h.jobs().get(*job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.improved_titles.len(), 5);
    }
    assert_eq!(h.mailer.sent().len(), 4);
}

async fn toggle(h: &Harness, enabled: bool) -> SummarySettings {
    let settings = SummarySettings::new(h.store.clone());
    settings
        .save(
            &ChannelInfo {
                channel_id: CHANNEL_ID.to_string(),
                channel_name: CHANNEL_NAME.to_string(),
                should_enable_summary: enabled,
            },
            REQUESTER,
        )
        .await
        .unwrap();
    settings
}

#[tokio::test]
async fn test_scheduled_summary_emits_exactly_one_ready() {
    let h = Harness::new(
        FakePlatform::new(Some(sample_channel()), sample_videos(12)).with_stats(sample_stats(12)),
        FakeGenerator::replying(fenced_summary_json()),
        FakeMailer::new(),
    );
    let settings = toggle(&h, true).await;
    let reporter = pipeline::performance_reporter(&h.collaborators);
    let sink = CollectingSink::new();

    run_summary_once(&settings, &reporter, &sink).await;

    let events = sink.events();
    assert_eq!(topics(&events), vec![Topic::PerformanceReady]);
    let Event::PerformanceReady(ready) = &events[0] else {
        unreachable!()
    };
    assert_eq!(ready.channel_id, CHANNEL_ID);
    assert_eq!(ready.summary.overall_trend, "Views are climbing week over week");

    assert_eq!(
        *h.platform.listings.lock().unwrap(),
        vec![(CHANNEL_ID.to_string(), 10)]
    );

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, REQUESTER);
    assert_eq!(sent[0].subject, format!("Your performance summary for {CHANNEL_NAME}"));
    assert_eq!(sent[0].html, ready.email_html);

    // Only the two scheduler singletons exist; no job key was touched.
    let keys = h.store.keys().await;
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().all(|k| k.namespace == Namespace::Scheduler));
}

#[tokio::test]
async fn test_scheduled_summary_reports_unparseable_model_output() {
    let h = Harness::new(
        FakePlatform::new(Some(sample_channel()), sample_videos(3)).with_stats(sample_stats(3)),
        FakeGenerator::replying("Here is your summary: it went well."),
        FakeMailer::new(),
    );
    let settings = toggle(&h, true).await;
    let reporter = pipeline::performance_reporter(&h.collaborators);
    let sink = CollectingSink::new();

    run_summary_once(&settings, &reporter, &sink).await;

    assert_eq!(topics(&sink.events()), vec![Topic::PerformanceError]);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_scheduled_summary_without_statistics_is_an_error() {
    let h = Harness::new(
        FakePlatform::new(Some(sample_channel()), sample_videos(3)),
        FakeGenerator::replying(fenced_summary_json()),
        FakeMailer::new(),
    );
    let settings = toggle(&h, true).await;
    let reporter = pipeline::performance_reporter(&h.collaborators);
    let sink = CollectingSink::new();

    run_summary_once(&settings, &reporter, &sink).await;

    let events = sink.events();
    assert_eq!(events.len(), 1);
    let Event::PerformanceError(err) = &events[0] else {
        panic!("expected a performance error, got {:?}", events[0].topic());
    };
    assert_eq!(err.error, "No video details found");
    assert!(h.generator.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_scheduled_summary_is_noop_when_disabled_or_unset() {
    let h = Harness::new(
        FakePlatform::new(Some(sample_channel()), sample_videos(3)).with_stats(sample_stats(3)),
        FakeGenerator::replying(fenced_summary_json()),
        FakeMailer::new(),
    );
    let reporter = pipeline::performance_reporter(&h.collaborators);
    let sink = CollectingSink::new();

    let unset = SummarySettings::new(h.store.clone());
    run_summary_once(&unset, &reporter, &sink).await;

    let disabled = toggle(&h, false).await;
    run_summary_once(&disabled, &reporter, &sink).await;

    assert!(sink.events().is_empty());
    assert!(h.platform.listings.lock().unwrap().is_empty());
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_scheduled_summary_with_unreadable_settings_reports_error() {
    let h = Harness::new(
        FakePlatform::new(Some(sample_channel()), sample_videos(3)).with_stats(sample_stats(3)),
        FakeGenerator::replying(fenced_summary_json()),
        FakeMailer::new(),
    );
    let settings = SummarySettings::new(Arc::new(FaultyStore::unreadable()));
    let reporter = pipeline::performance_reporter(&h.collaborators);
    let sink = CollectingSink::new();

    run_summary_once(&settings, &reporter, &sink).await;

    let events = sink.events();
    assert_eq!(topics(&events), vec![Topic::PerformanceError]);
    let Event::PerformanceError(err) = &events[0] else {
        unreachable!()
    };
    assert!(!err.error.is_empty());
    assert!(h.platform.listings.lock().unwrap().is_empty());
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_pipeline_drives_reporter_events_to_tracker() {
    let h = happy_harness();
    let pipeline = pipeline::build_pipeline(&h.collaborators).unwrap();
    let sink = Arc::new(CollectingSink::new());
    let reporter = pipeline::performance_reporter(&h.collaborators);
    let settings = toggle(&h, true).await;

    run_summary_once(&settings, &reporter, sink.as_ref()).await;

    // The tracker consumes summary outcomes and emits nothing further.
    for event in sink.events() {
        assert!(pipeline.dispatch(&event).await.is_empty());
    }
}

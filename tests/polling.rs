//! Read-loop behavior: sampling, dispatch caps, stop control, and the
//! open-failure path.

mod common;

use std::sync::{Arc, atomic::Ordering};

use common::{CollectingSink, CompletionRecorder, ScriptedBackend, TestFrame};
use framepoll::{
    FrameContext, FramePoller, FrameSink, PollControl, PollError, SilentLogger, SourceSelector,
};

fn poller(
    backend: ScriptedBackend,
    sink: Arc<CollectingSink>,
) -> FramePoller<ScriptedBackend> {
    FramePoller::new(backend, sink).with_logger(Arc::new(SilentLogger))
}

#[test]
fn dispatches_every_frame_by_default() {
    let sink = CollectingSink::new();
    let mut poller = poller(ScriptedBackend::with_frames(5), sink.clone());

    poller.process(SourceSelector::Webcam(0)).unwrap();

    assert_eq!(sink.dispatched(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn sample_stride_dispatches_every_nth_frame() {
    let sink = CollectingSink::new();
    let mut poller =
        poller(ScriptedBackend::with_frames(10), sink.clone()).with_sample_stride(3);

    poller.process(SourceSelector::Webcam(0)).unwrap();

    // floor(10 / 3) dispatches, at multiples of the stride.
    assert_eq!(sink.dispatched(), vec![3, 6, 9]);
}

#[test]
fn stride_is_clamped_to_one() {
    let sink = CollectingSink::new();
    let mut poller = poller(ScriptedBackend::with_frames(3), sink.clone()).with_sample_stride(0);

    poller.process(SourceSelector::Webcam(0)).unwrap();

    assert_eq!(sink.dispatched(), vec![1, 2, 3]);
}

#[test]
fn max_frames_caps_dispatches() {
    let sink = CollectingSink::new();
    let recorder = CompletionRecorder::new();
    let mut poller = poller(ScriptedBackend::with_frames(100), sink.clone())
        .with_max_frames(Some(4))
        .with_completion(recorder.clone());

    poller.process(SourceSelector::Webcam(0)).unwrap();

    assert_eq!(sink.dispatched(), vec![1, 2, 3, 4]);
    let summary = recorder.single_summary();
    assert!(summary.source_opened);
    assert_eq!(summary.frames_read, 4);
    assert!(!summary.stopped);
}

#[test]
fn stride_and_cap_compose() {
    // stride=2, max=3 over a 10-frame source: frames 2, 4, 6 only.
    let sink = CollectingSink::new();
    let recorder = CompletionRecorder::new();
    let mut poller = poller(ScriptedBackend::with_frames(10), sink.clone())
        .with_sample_stride(2)
        .with_max_frames(Some(3))
        .with_completion(recorder.clone());

    poller.process(SourceSelector::Webcam(0)).unwrap();

    assert_eq!(sink.dispatched(), vec![2, 4, 6]);
    let summary = recorder.single_summary();
    assert!(summary.source_opened);
    assert_eq!(summary.frames_dispatched, 3);
}

#[test]
fn positions_come_from_the_source() {
    let sink = CollectingSink::new();
    let mut poller = poller(ScriptedBackend::with_frames(2), sink.clone());

    poller.process(SourceSelector::Webcam(0)).unwrap();

    let positions = sink.positions.lock().unwrap().clone();
    assert_eq!(positions, vec![common::FRAME_STEP_MILLIS, 2.0 * common::FRAME_STEP_MILLIS]);
}

#[test]
fn open_failure_skips_the_loop_but_completes() {
    let backend = ScriptedBackend::failing();
    let releases = Arc::clone(&backend.release_count);
    let sink = CollectingSink::new();
    let recorder = CompletionRecorder::new();
    let mut poller = poller(backend, sink.clone()).with_completion(recorder.clone());

    poller.process(SourceSelector::Webcam(3)).unwrap();

    assert!(sink.dispatched().is_empty());
    let summary = recorder.single_summary();
    assert!(!summary.source_opened);
    assert_eq!(summary.frames_read, 0);
    // The never-opened handle is still released, without error.
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn source_released_before_completion_fires() {
    let backend = ScriptedBackend::with_frames(3);
    let recorder = CompletionRecorder::watching_releases(Arc::clone(&backend.release_count));
    let sink = CollectingSink::new();
    let mut poller = poller(backend, sink).with_completion(recorder.clone());

    poller.process(SourceSelector::Webcam(0)).unwrap();

    assert_eq!(*recorder.releases_at_completion.lock().unwrap(), vec![1]);
}

#[test]
fn stop_from_sink_halts_before_the_next_frame() {
    let sink = CollectingSink::stopping_at(2);
    let recorder = CompletionRecorder::new();
    let mut poller = poller(ScriptedBackend::with_frames(10), sink.clone())
        .with_completion(recorder.clone());

    poller.process(SourceSelector::Webcam(0)).unwrap();

    // The dispatch that requested the stop is the last one.
    assert_eq!(sink.dispatched(), vec![1, 2]);
    assert!(poller.is_stopped());
    let summary = recorder.single_summary();
    assert!(summary.stopped);
    assert_eq!(summary.frames_read, 2);
}

#[test]
fn stop_state_resets_on_the_next_run() {
    let sink = CollectingSink::stopping_at(1);
    let mut poller = poller(ScriptedBackend::with_frames(3), sink.clone());

    poller.process(SourceSelector::Webcam(0)).unwrap();
    assert!(poller.is_stopped());

    // stop_at matches frame 1 again, but the run starts unstopped and
    // dispatches before stopping — proving the flag was cleared.
    poller.process(SourceSelector::Webcam(0)).unwrap();
    assert_eq!(sink.dispatched(), vec![1, 1]);
}

#[test]
fn stale_stop_requests_are_cleared_at_run_start() {
    let sink = CollectingSink::new();
    let mut poller = poller(ScriptedBackend::with_frames(3), sink.clone());

    // A stale stop request from a previous run must not leak into this one.
    poller.request_stop();
    poller.process(SourceSelector::Webcam(0)).unwrap();

    assert_eq!(sink.dispatched(), vec![1, 2, 3]);
    assert!(!poller.is_stopped());
}

#[test]
fn external_control_stops_a_run() {
    // Stop requested through a cloned control handle between dispatches.
    struct StopOutside {
        inner: Arc<CollectingSink>,
        control: std::sync::Mutex<Option<PollControl>>,
    }

    impl FrameSink<TestFrame> for StopOutside {
        fn on_frame(
            &self,
            frame: &TestFrame,
            context: &FrameContext<'_>,
        ) -> Result<(), PollError> {
            self.inner.on_frame(frame, context)?;
            if context.frame_number == 2 {
                // Simulates a supervisor thread acting mid-run.
                self.control.lock().unwrap().as_ref().unwrap().request_stop();
            }
            Ok(())
        }
    }

    let inner = CollectingSink::new();
    let sink = Arc::new(StopOutside {
        inner: inner.clone(),
        control: std::sync::Mutex::new(None),
    });
    let mut poller = FramePoller::new(ScriptedBackend::with_frames(10), sink.clone())
        .with_logger(Arc::new(SilentLogger));
    *sink.control.lock().unwrap() = Some(poller.control());

    poller.process(SourceSelector::Webcam(0)).unwrap();

    assert_eq!(inner.dispatched(), vec![1, 2]);
    assert!(poller.is_stopped());
}

#[test]
fn busy_flag_is_raised_only_during_dispatch() {
    let sink = CollectingSink::new();
    let mut poller = poller(ScriptedBackend::with_frames(3), sink.clone());
    *sink.busy_probe.lock().unwrap() = Some(poller.control());

    assert!(!poller.is_busy());
    poller.process(SourceSelector::Webcam(0)).unwrap();
    // The probe inside the sink asserted busy==true for each dispatch.
    assert!(!poller.is_busy());
}

#[test]
fn sink_error_propagates_after_release() {
    let backend = ScriptedBackend::with_frames(10);
    let releases = Arc::clone(&backend.release_count);
    let sink = CollectingSink::failing_at(2);
    let recorder = CompletionRecorder::new();
    let mut poller = poller(backend, sink.clone()).with_completion(recorder.clone());

    let error = poller.process(SourceSelector::Webcam(0)).unwrap_err();

    assert!(matches!(error, PollError::Sink { .. }));
    assert_eq!(sink.dispatched(), vec![1, 2]);
    // The source was released even though the run errored out...
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    // ...and the completion callback does not fire on the error path.
    assert!(recorder.summaries.lock().unwrap().is_empty());
}

#[test]
fn interrupt_logs_and_stops() {
    let logger = common::RecordingLogger::new();
    let sink = CollectingSink::new();
    let poller = FramePoller::new(ScriptedBackend::with_frames(1), sink)
        .with_logger(logger.clone());

    poller.interrupt();

    assert!(poller.is_stopped());
    let messages = logger.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, framepoll::LogLevel::Error);
    assert_eq!(messages[0].1, "Interrupted, exiting");
}

#[test]
fn runs_are_independent() {
    let sink = CollectingSink::new();
    let backend = ScriptedBackend::with_frames(2);
    let opens = Arc::clone(&backend.open_count);
    let releases = Arc::clone(&backend.release_count);
    let mut poller = poller(backend, sink.clone());

    poller.process(SourceSelector::Webcam(0)).unwrap();
    poller.process(SourceSelector::File("ignored".into())).unwrap_err();
    poller.process(SourceSelector::Webcam(1)).unwrap();

    // The failed precondition run opened nothing.
    assert_eq!(opens.load(Ordering::SeqCst), 2);
    assert_eq!(releases.load(Ordering::SeqCst), 2);
    assert_eq!(sink.dispatched(), vec![1, 2, 1, 2]);
}

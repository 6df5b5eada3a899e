use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use super::*;
use crate::error::ServiceError;
use crate::scheduler::{FetchStage, FetchTicket, UpdateScheduler};
use crate::service::Artifact;
use crate::types::{ApiParameters, Axis, Bounds, LayoutType, ParamKey, Point, PreviewGeometry};
use eframe::egui;

/// Records requests instead of sending them.
#[derive(Clone, Default)]
struct RecordingBackend {
    previews: Arc<Mutex<Vec<FetchTicket>>>,
    artifacts: Arc<Mutex<Vec<ApiParameters>>>,
}

impl RecordingBackend {
    fn previews(&self) -> Vec<FetchTicket> {
        self.previews.lock().unwrap().clone()
    }

    fn artifact_requests(&self) -> usize {
        self.artifacts.lock().unwrap().len()
    }
}

impl GeometryBackend for RecordingBackend {
    fn fetch_preview(&self, _ctx: &egui::Context, ticket: FetchTicket, _events: Sender<AppEvent>) {
        self.previews.lock().unwrap().push(ticket);
    }

    fn generate_artifact(&self, _ctx: &egui::Context, params: ApiParameters, _events: Sender<AppEvent>) {
        self.artifacts.lock().unwrap().push(params);
    }
}

fn test_app() -> (PreviewApp, RecordingBackend) {
    let backend = RecordingBackend::default();
    let app = PreviewApp::with_backend(Box::new(backend.clone()), UpdateScheduler::new(0.010, 0.050));
    (app, backend)
}

fn geometry(width: f64, height: f64) -> PreviewGeometry {
    PreviewGeometry {
        pillars: vec![
            Point::new(0.0, 0.0),
            Point::new(0.35, 0.0),
            Point::new(width, height),
        ],
        holes: vec![Point::new(0.7, 0.0)],
        bounds: Bounds {
            min_x: -0.25,
            max_x: width + 0.25,
            min_y: -0.25,
            max_y: height + 0.25,
        },
    }
}

/// Run a single headless egui frame at `time` with the provided closure.
fn run_ui_at(ctx: &egui::Context, time: f64, mut f: impl FnMut(&egui::Context)) -> egui::FullOutput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw.time = Some(time);
    ctx.run(raw, |ctx| f(ctx))
}

fn respond(app: &PreviewApp, ticket: &FetchTicket, result: Result<PreviewGeometry, ServiceError>) {
    app.events
        .send(AppEvent::Preview {
            generation: ticket.generation,
            stage: ticket.stage,
            result,
        })
        .unwrap();
}

#[test]
fn first_frames_request_initial_preview() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();

    run_ui_at(&ctx, 0.0, |ctx| app.show(ctx));
    assert!(backend.previews().is_empty());

    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    let sent = backend.previews();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].stage, FetchStage::Initial);
    assert_eq!(app.status_text(0.02).map(|(t, _)| t), Some("⟳ Updating preview...".to_string()));
}

#[test]
fn accepted_geometry_is_drawn_and_clears_indicator() {
    let (mut app, backend) = test_app();
    app.view.show_measurements = true;
    let ctx = egui::Context::default();
    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    let ticket = backend.previews()[0].clone();

    respond(&app, &ticket, Ok(geometry(10.0, 5.0)));
    let output = run_ui_at(&ctx, 0.1, |ctx| app.show(ctx));

    assert_eq!(app.store.preview().map(|g| g.pillars.len()), Some(3));
    assert!(!app.scheduler.is_busy());
    assert_eq!(app.status_text(0.1), None);
    assert!(!output.shapes.is_empty());

    let frame = app.build_frame(&crate::render::ApproxMeasure).unwrap();
    assert!(frame.labels().any(|l| l.text == "Side View (mm)"));
    assert!(frame.labels().any(|l| l.text == "Spacing: 0.350 mm"));
}

#[test]
fn edits_during_flight_coalesce_into_one_follow_up() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();
    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    let first = backend.previews()[0].clone();

    for (i, rows) in [11.0, 12.0, 13.0].into_iter().enumerate() {
        app.edit(ParamKey::Rows, rows, 0.03 + i as f64 * 0.001);
        run_ui_at(&ctx, 0.04 + i as f64 * 0.01, |ctx| app.show(ctx));
    }
    assert_eq!(backend.previews().len(), 1);

    respond(&app, &first, Ok(geometry(10.0, 5.0)));
    run_ui_at(&ctx, 0.2, |ctx| app.show(ctx));
    assert_eq!(backend.previews().len(), 1);

    run_ui_at(&ctx, 0.3, |ctx| app.show(ctx));
    let sent = backend.previews();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].params.rows, Some(13));
    assert!(sent[1].generation > first.generation);
}

#[test]
fn stale_response_does_not_replace_geometry() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();
    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    let first = backend.previews()[0].clone();
    respond(&app, &first, Err(ServiceError::Transport("timeout".into())));
    run_ui_at(&ctx, 0.05, |ctx| app.show(ctx));

    app.edit(ParamKey::Spacing, 0.4, 0.06);
    run_ui_at(&ctx, 0.1, |ctx| app.show(ctx));
    let second = backend.previews()[1].clone();
    respond(&app, &second, Ok(geometry(10.0, 5.0)));
    respond(&app, &first, Ok(geometry(99.0, 99.0)));
    run_ui_at(&ctx, 0.2, |ctx| app.show(ctx));

    assert_eq!(app.store.preview(), Some(&geometry(10.0, 5.0)));
}

#[test]
fn failed_preview_shows_error() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();
    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    let ticket = backend.previews()[0].clone();
    respond(
        &app,
        &ticket,
        Err(ServiceError::Status {
            status: 500,
            body: "boom".into(),
        }),
    );
    run_ui_at(&ctx, 1.0, |ctx| app.show(ctx));

    let (text, kind) = app.status_text(1.0).unwrap();
    assert_eq!(text, "Error: service returned 500: boom");
    assert_eq!(kind, StatusKind::Error);
    assert_eq!(app.status_text(6.5), None);
}

#[test]
fn width_lock_issues_correction_with_solved_padding() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();
    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    respond(&app, &backend.previews()[0].clone(), Ok(geometry(10.0, 5.0)));
    run_ui_at(&ctx, 0.05, |ctx| app.show(ctx));

    app.form.target_width = "12".into();
    app.toggle_lock(Axis::Width, 0.06);
    assert!(app.store.is_locked(Axis::Width));
    run_ui_at(&ctx, 0.1, |ctx| app.show(ctx));
    let initial = backend.previews()[1].clone();

    // Raw width 10 against a target of 12.
    respond(&app, &initial, Ok(geometry(10.0, 5.0)));
    run_ui_at(&ctx, 0.15, |ctx| app.show(ctx));

    let sent = backend.previews();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2].stage, FetchStage::Correction);
    assert_eq!(sent[2].generation, initial.generation);
    assert!((sent[2].params.floor_padding_x - 1.0).abs() < 1e-12);
    // Linked padding only mirrors user edits.
    assert_eq!(app.store.parameters().floor_padding_y, 0.25);
}

#[test]
fn locking_before_geometry_is_rejected() {
    let (mut app, _backend) = test_app();
    app.form.target_height = "8".into();
    app.toggle_lock(Axis::Height, 0.0);
    assert!(!app.store.is_locked(Axis::Height));
    assert_eq!(
        app.status_text(0.5).map(|(_, kind)| kind),
        Some(StatusKind::Error)
    );
}

#[test]
fn linked_padding_edit_sets_both_axes() {
    let (mut app, _backend) = test_app();
    app.edit_padding(Axis::Height, 0.5, 0.0);
    assert_eq!(app.store.parameters().floor_padding_x, 0.5);
    assert_eq!(app.store.parameters().floor_padding_y, 0.5);

    app.view.link_padding = false;
    app.edit_padding(Axis::Width, 0.1, 0.0);
    assert_eq!(app.store.parameters().floor_padding_x, 0.1);
    assert_eq!(app.store.parameters().floor_padding_y, 0.5);
}

#[test]
fn generate_runs_once_and_reports_failure() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();
    app.start_generate(&ctx, 1.0);
    app.start_generate(&ctx, 1.1);
    assert_eq!(backend.artifact_requests(), 1);
    assert_eq!(
        app.status_text(2.3).map(|(t, _)| t),
        Some("Generating... 1.3s".to_string())
    );

    app.events
        .send(AppEvent::Generated(Err(ServiceError::MalformedParameter("seed".into()))))
        .unwrap();
    run_ui_at(&ctx, 3.0, |ctx| app.show(ctx));
    assert!(app.generating_since.is_none());
    assert_eq!(
        app.status_text(3.0).map(|(t, _)| t),
        Some("Error: parameter 'seed' is not a valid number".to_string())
    );
}

#[test]
fn generated_artifact_is_queued_for_saving() {
    let (mut app, _backend) = test_app();
    let ctx = egui::Context::default();
    app.start_generate(&ctx, 0.0);
    let artifact = Artifact {
        bytes: b"solid".to_vec(),
        generation_time: Some("1.5".into()),
        dimensions: Some("12 x 7 x 12 mm".into()),
    };
    app.events
        .send(AppEvent::Generated(Ok(artifact.clone())))
        .unwrap();
    app.handle_events(&ctx, 1.0);

    assert!(app.generating_since.is_none());
    assert_eq!(
        app.pending_file_operation,
        Some(PendingFileOperation::SaveArtifact(artifact))
    );
}

#[test]
fn loaded_parameter_document_schedules_update() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();
    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    respond(&app, &backend.previews()[0].clone(), Ok(geometry(10.0, 5.0)));
    run_ui_at(&ctx, 0.05, |ctx| app.show(ctx));

    app.events
        .send(AppEvent::File(FileOperationResult::ParamsLoaded {
            path: "params.txt".into(),
            content: "Type: organic\nRows: 4\nRandom Seed: 7\n".into(),
        }))
        .unwrap();
    run_ui_at(&ctx, 0.1, |ctx| app.show(ctx));
    assert_eq!(app.store.parameters().layout_type, LayoutType::Organic);
    assert_eq!(app.form.seed, "7");
    assert_eq!(app.status_text(0.1).map(|(t, _)| t), Some("Parameters loaded".to_string()));

    run_ui_at(&ctx, 0.2, |ctx| app.show(ctx));
    let sent = backend.previews();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].params.rows, Some(4));
    assert_eq!(sent[1].params.seed, Some(7));
}

#[test]
fn rejected_style_document_keeps_active_style() {
    let (mut app, _backend) = test_app();
    let before = app.styles.get().clone();
    app.apply_file_result(
        FileOperationResult::StylesLoaded {
            path: "styles.json".into(),
            content: "[1, 2]".into(),
        },
        0.0,
    );
    assert_eq!(app.styles.get(), &before);
    assert_eq!(app.status_text(0.0).map(|(_, k)| k), Some(StatusKind::Error));
}

#[test]
fn canvas_keeps_previous_geometry_while_correction_is_outstanding() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();
    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    respond(&app, &backend.previews()[0].clone(), Ok(geometry(10.0, 5.0)));
    run_ui_at(&ctx, 0.05, |ctx| app.show(ctx));

    app.form.target_width = "12".into();
    app.toggle_lock(Axis::Width, 0.06);
    run_ui_at(&ctx, 0.1, |ctx| app.show(ctx));
    let initial = backend.previews()[1].clone();

    respond(&app, &initial, Ok(geometry(20.0, 5.0)));
    run_ui_at(&ctx, 0.15, |ctx| app.show(ctx));
    let correction = backend.previews()[2].clone();
    assert_eq!(correction.stage, FetchStage::Correction);
    assert_eq!(app.store.preview(), Some(&geometry(10.0, 5.0)));
    assert!(app.scheduler.is_busy());

    respond(&app, &correction, Ok(geometry(12.0, 5.0)));
    run_ui_at(&ctx, 0.2, |ctx| app.show(ctx));
    assert_eq!(app.store.preview(), Some(&geometry(12.0, 5.0)));
    assert!(!app.scheduler.is_busy());
}

#[test]
fn timed_out_preview_reports_error_and_unblocks_updates() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();
    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    respond(
        &app,
        &backend.previews()[0].clone(),
        Err(ServiceError::Timeout("operation timed out".into())),
    );
    run_ui_at(&ctx, 20.0, |ctx| app.show(ctx));
    assert_eq!(
        app.status_text(20.0).map(|(t, _)| t),
        Some("Error: service did not respond in time: operation timed out".to_string())
    );

    app.edit(ParamKey::Rows, 7.0, 20.1);
    run_ui_at(&ctx, 20.2, |ctx| app.show(ctx));
    let sent = backend.previews();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].params.rows, Some(7));
}

#[test]
fn unchanged_seed_does_not_schedule_update() {
    let (mut app, backend) = test_app();
    let ctx = egui::Context::default();
    run_ui_at(&ctx, 0.02, |ctx| app.show(ctx));
    respond(&app, &backend.previews()[0].clone(), Ok(geometry(10.0, 5.0)));
    run_ui_at(&ctx, 0.05, |ctx| app.show(ctx));
    assert!(!app.scheduler.is_busy());

    app.commit_seed(0.1);
    assert!(!app.scheduler.is_busy());

    app.form.seed = "43".into();
    app.commit_seed(0.2);
    assert!(app.scheduler.is_busy());
    assert_eq!(app.store.parameters().seed, 43.0);
}

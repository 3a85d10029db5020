use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use gdi_drawer::drawer::window::{headless_factory, HeadlessProbe, WindowEvent, WindowFactory};
use gdi_drawer::drawer::{
    BoxStyle, Canvas, Color, CoordSpace, Drawer, DrawerError, MouseKind, Point, PresenterState,
};
use gdi_drawer::settings::DrawerSettings;

fn settings(continuous: bool) -> DrawerSettings {
    DrawerSettings {
        width: 200,
        height: 150,
        continuous_update: continuous,
        tick_interval_ms: 5,
        close_timeout_ms: 2000,
        ..DrawerSettings::default()
    }
}

fn start(continuous: bool) -> (Drawer, HeadlessProbe) {
    let (factory, probe) = headless_factory();
    let drawer = Drawer::with_window(settings(continuous), factory).unwrap();
    (drawer, probe)
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn startup_waits_for_first_paint() {
    let (drawer, probe) = start(true);
    assert!(drawer.is_running());
    assert!(probe.present_count() >= 1);
    assert!(matches!(
        drawer.presenter_state(),
        PresenterState::Ready | PresenterState::Rendering
    ));
}

#[test]
fn continuous_mode_shows_new_shapes_without_render() {
    let (drawer, probe) = start(true);
    drawer
        .add_rectangle(10, 10, 20, 20, BoxStyle::filled(Color::RED))
        .unwrap();
    assert!(wait_until(|| probe
        .last_frame()
        .and_then(|frame| frame.pixel(15, 15))
        == Some(Color::RED)));
}

#[test]
fn render_now_draws_when_continuous_is_off() {
    let (drawer, probe) = start(false);
    drawer
        .add_rectangle(10, 10, 20, 20, BoxStyle::filled(Color::RED))
        .unwrap();
    sleep(Duration::from_millis(50));
    assert_eq!(
        probe.last_frame().and_then(|frame| frame.pixel(15, 15)),
        Some(Color::BLACK)
    );

    drawer.render();
    assert!(wait_until(|| probe
        .last_frame()
        .and_then(|frame| frame.pixel(15, 15))
        == Some(Color::RED)));
}

#[test]
fn title_reports_render_time_and_shape_count() {
    let (drawer, probe) = start(true);
    drawer.add_ellipse(0, 0, 10, 10, BoxStyle::default()).unwrap();
    assert!(wait_until(|| probe.title().ends_with("(1 shape)")));
    assert!(probe.title().starts_with("GDIDrawer - Render Time = "));
    assert!(drawer.render_stats().frames_total >= 1);
}

#[test]
fn failed_present_is_not_fatal() {
    let (drawer, probe) = start(true);
    let before = probe.present_count();
    probe.fail_next_present();
    assert!(wait_until(|| probe.present_count() > before + 2));
    assert!(drawer.is_running());
}

#[test]
fn failed_present_still_updates_stats() {
    let (drawer, probe) = start(true);
    wait_until(|| drawer.render_stats().frames_total >= 2);
    let frames = drawer.render_stats().frames_total;
    probe.fail_next_present();
    assert!(wait_until(|| drawer.render_stats().frames_total > frames + 2));
    assert!(probe.title().starts_with("GDIDrawer - Render Time = "));
}

#[test]
fn far_away_shapes_do_not_stall_the_presenter() {
    let (drawer, probe) = start(true);
    let far = i32::MAX - 5;
    drawer
        .add_rectangle(far, far, 10, 10, BoxStyle::filled(Color::RED))
        .unwrap();
    drawer.add_text("hi", 1.0e9, None).unwrap();
    drawer
        .add_line(Point::new(0, 0), Point::new(20_000_000, 1), Color::RED, 1)
        .unwrap();
    drawer
        .add_rectangle(10, 10, 5, 5, BoxStyle::filled(Color::LIME))
        .unwrap();
    drawer.set_scale(4).unwrap();

    assert!(wait_until(|| probe
        .last_frame()
        .and_then(|frame| frame.pixel(45, 45))
        == Some(Color::LIME)));
    let frames = drawer.render_stats().frames_total;
    assert!(wait_until(|| drawer.render_stats().frames_total > frames + 3));
    assert!(wait_until(|| probe.title().ends_with("(4 shapes)")));
    assert!(drawer.is_running());
}

#[test]
fn window_close_stops_presenter() {
    let (drawer, probe) = start(true);
    probe.push_event(WindowEvent::CloseRequested);
    assert!(wait_until(|| drawer.presenter_state() == PresenterState::Stopped));
    assert!(!drawer.is_running());
    assert!(probe.is_shut_down());
}

#[test]
fn close_is_idempotent() {
    let (drawer, probe) = start(true);
    drawer.close();
    drawer.close();
    assert_eq!(drawer.presenter_state(), PresenterState::Stopped);
    assert!(probe.is_shut_down());
}

#[test]
fn failing_window_factory_reports_start_failure() {
    let factory: WindowFactory =
        Box::new(|_| Err(DrawerError::Window("no display".to_string())));
    match Drawer::with_window(settings(true), factory) {
        Err(DrawerError::StartFailure(message)) => assert!(message.contains("no display")),
        other => panic!("expected start failure, got {:?}", other.err()),
    }
}

#[test]
fn invalid_settings_are_rejected_before_starting() {
    let (factory, probe) = headless_factory();
    let bad = DrawerSettings {
        width: 0,
        ..settings(true)
    };
    assert!(matches!(
        Drawer::with_window(bad, factory),
        Err(DrawerError::InvalidArgument(_))
    ));
    assert_eq!(probe.present_count(), 0);
}

#[test]
fn pointer_events_reach_the_latch() {
    let (drawer, probe) = start(true);
    probe.push_event(WindowEvent::LeftButtonDown(Point::new(40, 30)));
    let mut first = None;
    assert!(wait_until(|| {
        let sample = drawer.last_left_click();
        if sample.point == Point::new(40, 30) {
            first = Some(sample);
        }
        first.is_some()
    }));
    assert!(first.is_some_and(|sample| sample.is_new));
    assert!(!drawer.last_left_click().is_new);
}

#[test]
fn pointer_events_outside_the_window_are_dropped() {
    let (drawer, probe) = start(true);
    probe.push_event(WindowEvent::PointerMoved(Point::new(500, 10)));
    probe.push_event(WindowEvent::PointerMoved(Point::new(10, -1)));
    probe.push_event(WindowEvent::PointerMoved(Point::new(0, 0)));
    assert!(wait_until(|| drawer.last_mouse_move().point == Point::new(0, 0)));
}

#[test]
fn subscribers_run_on_the_presenter_thread() {
    let (drawer, probe) = start(true);
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&hits);
    drawer.on_mouse(MouseKind::RightClick, CoordSpace::Raw, move |_: Point, canvas: &Canvas| {
        seen.fetch_add(1, Ordering::SeqCst);
        let _ = canvas.add_ellipse(0, 0, 4, 4, BoxStyle::default());
    });
    probe.push_event(WindowEvent::RightButtonDown(Point::new(5, 5)));
    assert!(wait_until(|| hits.load(Ordering::SeqCst) == 1));
    assert_eq!(drawer.shape_count(), 1);
}

#[test]
fn window_position_can_be_moved_and_queried() {
    let (drawer, _probe) = start(true);
    drawer.set_position(Point::new(120, 40));
    assert!(wait_until(|| drawer.position() == Some(Point::new(120, 40))));
    assert_eq!(drawer.window_size(), Some((200, 150)));
}

mod common;

use common::test_window;
use common::MockDevice;
use common::MockWindow;
use d3d12_clear_window::gpu::viewport::Viewport;
use d3d12_clear_window::gpu::ClearColor;
use d3d12_clear_window::settings::GraphicsSettings;
use d3d12_clear_window::window::PumpedMessage;
use d3d12_clear_window::window::Window;
use d3d12_clear_window::window::WindowModeParams;
use d3d12_clear_window::window::DEFAULT_WINDOW_SIZE;

#[test]
fn initialize_opens_a_fixed_size_window() {
    let mut window = test_window();
    window.initialize().unwrap();

    let native = window.native();
    assert_eq!(native.opened.len(), 1);
    let (title, mode) = &native.opened[0];
    assert_eq!(title, "D3D12 Example");
    assert_eq!((mode.width, mode.height), DEFAULT_WINDOW_SIZE);
    assert!(!mode.resizable);
    assert_eq!(mode.multi_sample, 1);

    assert_eq!(window.device().created_for.len(), 1);
    assert_eq!(
        window.device().viewport,
        Some(Viewport::covering(1334, 750))
    );
    assert!(!window.is_exiting());
}

#[test]
fn idle_frame_renders_and_keeps_running() {
    let mut window = test_window();
    window.initialize().unwrap();

    window.run_frame();
    window.run_frame();

    assert!(!window.is_exiting());
    assert_eq!(window.native().pumped, 2);
    assert_eq!(window.device().presented, 2);
    assert_eq!(window.device().cleared_with, vec![ClearColor::default(); 2]);
}

#[test]
fn each_frame_pumps_a_single_message() {
    let mut window = test_window();
    window.initialize().unwrap();
    window
        .native_mut()
        .messages
        .extend([PumpedMessage::Dispatched, PumpedMessage::Dispatched]);

    window.run_frame();

    assert_eq!(window.native().pumped, 1);
    assert_eq!(window.native().messages.len(), 1);
    assert_eq!(window.device().presented, 1);

    window.run_frame();

    assert!(window.native().messages.is_empty());
    assert_eq!(window.device().presented, 2);
}

#[test]
fn dispatched_message_still_renders() {
    let mut window = test_window();
    window.initialize().unwrap();
    window
        .native_mut()
        .messages
        .push_back(PumpedMessage::Dispatched);

    window.run_frame();

    assert_eq!(window.device().presented, 1);
}

#[test]
fn exit_is_idempotent() {
    let mut window = test_window();
    window.initialize().unwrap();

    window.exit();
    window.exit();

    assert!(window.is_exiting());
}

#[test]
fn run_frame_after_exit_does_nothing() {
    let mut window = test_window();
    window.initialize().unwrap();
    window.exit();

    window.run_frame();

    assert_eq!(window.native().pumped, 0);
    assert_eq!(window.device().presented, 0);
}

#[test]
fn quit_message_stops_without_rendering() {
    let mut window = test_window();
    window.initialize().unwrap();
    window.native_mut().messages.push_back(PumpedMessage::Quit);

    window.run_frame();

    assert!(window.is_exiting());
    assert_eq!(window.device().presented, 0);
}

#[test]
fn escape_frame_still_renders_then_stops() {
    let mut window = test_window();
    window.initialize().unwrap();
    window
        .native_mut()
        .messages
        .push_back(PumpedMessage::ExitRequested);

    window.run_frame();

    assert!(window.is_exiting());
    assert_eq!(window.device().presented, 1);

    window.run_frame();

    assert_eq!(window.native().pumped, 1);
    assert_eq!(window.device().presented, 1);
}

#[test]
fn resizing_reuses_the_window() {
    let mut window = test_window();
    window.initialize().unwrap();

    window.set_window_size(640, 480).unwrap();

    assert_eq!(window.native().opened.len(), 1);
    assert_eq!(window.native().resized, vec![(640, 480)]);
    let created_for = &window.device().created_for;
    assert_eq!(created_for.len(), 2);
    assert_eq!(created_for[0].0, created_for[1].0);
    assert_eq!(window.device().viewport, Some(Viewport::covering(640, 480)));
}

#[test]
fn mode_is_forwarded_to_the_device() {
    let mut window = test_window();
    let mode = WindowModeParams {
        width: 800,
        height: 600,
        resizable: true,
        multi_sample: 4,
        monitor: 0,
        refresh_rate: 60,
    };

    window.set_window_mode(mode).unwrap();

    assert_eq!(window.mode(), &mode);
    assert_eq!(window.native().opened[0].1, mode);
    assert_eq!(window.device().created_for[0].1, mode);
}

#[test]
fn title_is_cached_until_the_window_exists() {
    let mut window = test_window();

    window.set_window_title("Before").unwrap();
    assert!(window.native().titles.is_empty());

    window.initialize().unwrap();
    assert_eq!(window.native().opened[0].0, "Before");

    window.set_window_title("After").unwrap();
    assert_eq!(window.native().titles, vec!["After".to_owned()]);
    assert_eq!(window.title(), "After");
}

#[test]
fn failed_device_creation_fails_initialize() {
    let mut device = MockDevice::default();
    device.fail_create = true;
    let mut window = Window::new(MockWindow::default(), device, &GraphicsSettings::default());

    let error = window.initialize().unwrap_err();

    assert_eq!(error.to_string(), "no Direct3D12 capable adapter");
    assert_eq!(window.native().opened.len(), 1);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "run_frame called before initialize")]
fn run_frame_before_initialize_is_a_bug() {
    let mut window = test_window();
    window.run_frame();
}

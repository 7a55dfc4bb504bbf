mod common;

use common::test_window;
use common::MockDevice;
use common::MockWindow;
use d3d12_clear_window::app::AppContext;
use d3d12_clear_window::app::Application;
use d3d12_clear_window::app::Runner;
use d3d12_clear_window::app::ERROR_DIALOG_TITLE;
use d3d12_clear_window::app::EXIT_FAILURE;
use d3d12_clear_window::settings::GraphicsSettings;
use d3d12_clear_window::window::PumpedMessage;
use d3d12_clear_window::window::Window;

#[derive(Default)]
struct RecordingApp {
    calls: Vec<&'static str>,
    fail_setup: bool,
    retitle_on_start: bool,
}

impl Application for RecordingApp {
    fn setup(&mut self, ctx: &mut AppContext<'_>) {
        self.calls.push("setup");
        if self.fail_setup {
            ctx.set_exit_code(3);
        }
    }

    fn start(&mut self, ctx: &mut AppContext<'_>) {
        self.calls.push("start");
        if self.retitle_on_start {
            ctx.window().set_window_title("Started").unwrap();
        }
    }

    fn stop(&mut self, _ctx: &mut AppContext<'_>) {
        self.calls.push("stop");
    }
}

#[test]
fn clean_run_calls_every_hook_in_order() {
    let mut window = test_window();
    window.native_mut().messages.extend([
        PumpedMessage::Dispatched,
        PumpedMessage::Empty,
        PumpedMessage::Quit,
    ]);
    let mut runner = Runner::new(window);
    let mut app = RecordingApp {
        retitle_on_start: true,
        ..Default::default()
    };

    let code = runner.run(&mut app);

    assert_eq!(code, 0);
    assert_eq!(app.calls, ["setup", "start", "stop"]);
    assert_eq!(runner.window().device().presented, 2);
    assert_eq!(runner.window().native().titles, ["Started".to_owned()]);
    assert!(runner.window().native().errors.borrow().is_empty());
}

#[test]
fn exit_code_from_setup_aborts_the_run() {
    let mut runner = Runner::new(test_window());
    let mut app = RecordingApp {
        fail_setup: true,
        ..Default::default()
    };

    let code = runner.run(&mut app);

    assert_eq!(code, 3);
    assert_eq!(app.calls, ["setup"]);
    assert!(runner.window().native().opened.is_empty());
}

#[test]
fn initialization_failure_is_reported_once() {
    let mut device = MockDevice::default();
    device.fail_create = true;
    let window = Window::new(MockWindow::default(), device, &GraphicsSettings::default());
    let mut runner = Runner::new(window);
    let mut app = RecordingApp::default();

    let code = runner.run(&mut app);

    assert_eq!(code, EXIT_FAILURE);
    assert_eq!(runner.exit_code(), EXIT_FAILURE);
    assert_eq!(app.calls, ["setup"]);
    assert!(runner.window().is_exiting());

    let errors = runner.window().native().errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, ERROR_DIALOG_TITLE);
    assert!(errors[0].1.contains("no Direct3D12 capable adapter"));
}

#[test]
fn error_exit_keeps_an_existing_failure_code() {
    struct FailingStart;

    impl Application for FailingStart {
        fn start(&mut self, ctx: &mut AppContext<'_>) {
            ctx.set_exit_code(7);
            ctx.error_exit("assets missing");
        }
    }

    let mut runner = Runner::new(test_window());

    let code = runner.run(&mut FailingStart);

    assert_eq!(code, 7);
    assert!(runner.window().is_exiting());
    assert_eq!(runner.window().device().presented, 0);
    assert_eq!(
        runner.window().native().errors.borrow()[0],
        (ERROR_DIALOG_TITLE.to_owned(), "assets missing".to_owned())
    );
}

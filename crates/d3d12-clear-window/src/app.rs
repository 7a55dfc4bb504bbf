use crate::gpu::SwapChainDevice;
use crate::window::NativeWindow;
use crate::window::Window;
use crate::window::WindowControl;
use tracing::error;
use tracing::info;

/// Exit code reported when the application fails.
pub const EXIT_FAILURE: i32 = 1;

/// Title of the dialog shown when the application cannot continue.
pub const ERROR_DIALOG_TITLE: &str = "Application";

/// Extension points around the main loop. Every hook does nothing by default.
pub trait Application {
    /// Runs before the window exists. Setting a non-zero exit code stops the run.
    fn setup(&mut self, _ctx: &mut AppContext<'_>) {}

    /// Runs after the window and device are ready, before the first frame.
    fn start(&mut self, _ctx: &mut AppContext<'_>) {}

    /// Runs once the main loop has ended.
    fn stop(&mut self, _ctx: &mut AppContext<'_>) {}
}

/// What an [`Application`] hook can reach.
pub struct AppContext<'a> {
    window: &'a mut dyn WindowControl,
    exit_code: &'a mut i32,
}

impl AppContext<'_> {
    pub fn window(&mut self) -> &mut dyn WindowControl {
        &mut *self.window
    }

    pub fn exit_code(&self) -> i32 {
        *self.exit_code
    }

    pub fn set_exit_code(&mut self, code: i32) {
        *self.exit_code = code;
    }

    /// Stops the application with a failure code and shows `message` to the user.
    pub fn error_exit(&mut self, message: &str) {
        error_exit(&mut *self.window, &mut *self.exit_code, message);
    }
}

fn error_exit(window: &mut dyn WindowControl, exit_code: &mut i32, message: &str) {
    window.exit();
    if *exit_code == 0 {
        *exit_code = EXIT_FAILURE;
    }
    error!("{message}");
    window.show_error(ERROR_DIALOG_TITLE, message);
}

/// Drives an [`Application`] through setup, the main loop, and teardown.
pub struct Runner<W: NativeWindow, D> {
    window: Window<W, D>,
    exit_code: i32,
}

impl<W, D> Runner<W, D>
where
    W: NativeWindow,
    D: SwapChainDevice<Surface = W::Surface>,
{
    pub fn new(window: Window<W, D>) -> Self {
        Self {
            window,
            exit_code: 0,
        }
    }

    pub fn window(&self) -> &Window<W, D> {
        &self.window
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Runs `app` to completion and returns the process exit code.
    pub fn run<A: Application>(&mut self, app: &mut A) -> i32 {
        app.setup(&mut self.context());
        if self.exit_code != 0 {
            return self.exit_code;
        }

        if let Err(e) = self.window.initialize() {
            let message = format!("{e:#}");
            error_exit(&mut self.window, &mut self.exit_code, &message);
            return self.exit_code;
        }

        app.start(&mut self.context());
        if self.exit_code != 0 {
            return self.exit_code;
        }

        info!("Entering main loop");
        while !self.window.is_exiting() {
            self.window.run_frame();
        }

        app.stop(&mut self.context());
        info!(exit_code = self.exit_code, "Main loop finished");
        self.exit_code
    }

    fn context(&mut self) -> AppContext<'_> {
        AppContext {
            window: &mut self.window,
            exit_code: &mut self.exit_code,
        }
    }
}

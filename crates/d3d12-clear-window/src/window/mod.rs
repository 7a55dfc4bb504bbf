mod mode;
mod native;

pub use mode::WindowModeParams;
pub use native::NativeWindow;
pub use native::PumpedMessage;

use crate::error::Result;
use crate::gpu::SwapChainDevice;
use crate::render::FrameRenderer;
use crate::settings::GraphicsSettings;
use tracing::error;
use tracing::info;

/// Client size applied by [`Window::initialize`].
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1334, 750);

/// The single application window and the device that renders into it.
///
/// Lifecycle: uninitialized until [`Window::initialize`] succeeds, then running until
/// [`Window::exit`] is called or the OS asks the window to quit. Exiting is terminal.
pub struct Window<W: NativeWindow, D> {
    // Declared first so the swap chain is released before the window it presents to.
    device: D,
    native: W,
    renderer: FrameRenderer,
    surface: Option<W::Surface>,
    title: String,
    mode: WindowModeParams,
    initialized: bool,
    exiting: bool,
}

impl<W, D> Window<W, D>
where
    W: NativeWindow,
    D: SwapChainDevice<Surface = W::Surface>,
{
    pub fn new(native: W, device: D, settings: &GraphicsSettings) -> Self {
        Self {
            device,
            native,
            renderer: FrameRenderer::new(settings.clear_color),
            surface: None,
            title: settings.title.clone(),
            mode: WindowModeParams::default(),
            initialized: false,
            exiting: false,
        }
    }

    /// Opens the default fixed-size window and creates the device for it.
    pub fn initialize(&mut self) -> Result<()> {
        let (width, height) = DEFAULT_WINDOW_SIZE;
        self.set_window_size(width, height)?;
        self.initialized = true;
        info!(width, height, "Window initialized");
        Ok(())
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Pumps one OS message, then updates and renders unless it was the quit message.
    ///
    /// Calling this before [`Window::initialize`] has succeeded is a bug.
    pub fn run_frame(&mut self) {
        debug_assert!(self.initialized, "run_frame called before initialize");
        if !self.initialized {
            error!("run_frame called before initialize");
            return;
        }
        if self.exiting {
            return;
        }

        match self.native.pump_message() {
            PumpedMessage::Quit => {
                info!("Quit message received");
                self.exiting = true;
                return;
            }
            // The frame that saw Escape is still drawn; the loop stops after it.
            PumpedMessage::ExitRequested => self.exit(),
            PumpedMessage::Empty | PumpedMessage::Dispatched => {}
        }

        self.update();
        self.render();
    }

    /// Per-frame update. Nothing moves in this example.
    pub fn update(&mut self) {}

    pub fn render(&mut self) {
        if let Err(e) = self.renderer.render(&mut self.device) {
            error!("Render error: {e:?}");
        }
    }

    pub fn exit(&mut self) {
        if !self.exiting {
            info!("Exit requested");
        }
        self.exiting = true;
    }

    pub fn set_window_title(&mut self, title: &str) -> Result<()> {
        self.title = title.to_owned();
        if let Some(surface) = &self.surface {
            self.native.set_title(surface, &self.title)?;
        }
        Ok(())
    }

    /// Fixed-size, single-sampled shorthand for [`Window::set_window_mode`].
    pub fn set_window_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.set_window_mode(WindowModeParams::sized(width, height))
    }

    /// Applies `mode`, opening the window on first use, and rebuilds the device for it.
    ///
    /// Title and resizability are fixed once the window exists.
    pub fn set_window_mode(&mut self, mode: WindowModeParams) -> Result<()> {
        self.mode = mode;

        let already_open = self.surface.is_some();
        let surface = match self.surface.take() {
            Some(surface) => surface,
            None => self.native.open(&self.title, &mode)?,
        };
        let surface = &*self.surface.insert(surface);

        if already_open {
            self.native.resize(surface, mode.width, mode.height)?;
        }
        self.device.create_device(surface, &self.mode)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn mode(&self) -> &WindowModeParams {
        &self.mode
    }

    pub fn native(&self) -> &W {
        &self.native
    }

    pub fn native_mut(&mut self) -> &mut W {
        &mut self.native
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn show_error(&self, title: &str, message: &str) {
        self.native.show_error(title, message);
    }
}

/// What application hooks may do with the window.
pub trait WindowControl {
    fn is_exiting(&self) -> bool;
    fn exit(&mut self);
    fn set_window_title(&mut self, title: &str) -> Result<()>;
    fn set_window_size(&mut self, width: u32, height: u32) -> Result<()>;
    fn set_window_mode(&mut self, mode: WindowModeParams) -> Result<()>;
    fn show_error(&self, title: &str, message: &str);
}

impl<W, D> WindowControl for Window<W, D>
where
    W: NativeWindow,
    D: SwapChainDevice<Surface = W::Surface>,
{
    fn is_exiting(&self) -> bool {
        Window::is_exiting(self)
    }

    fn exit(&mut self) {
        Window::exit(self)
    }

    fn set_window_title(&mut self, title: &str) -> Result<()> {
        Window::set_window_title(self, title)
    }

    fn set_window_size(&mut self, width: u32, height: u32) -> Result<()> {
        Window::set_window_size(self, width, height)
    }

    fn set_window_mode(&mut self, mode: WindowModeParams) -> Result<()> {
        Window::set_window_mode(self, mode)
    }

    fn show_error(&self, title: &str, message: &str) {
        Window::show_error(self, title, message)
    }
}

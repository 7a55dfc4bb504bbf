/// Window and swap chain configuration, applied as a whole by `set_window_mode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowModeParams {
    /// Client width in pixels.
    pub width: u32,
    /// Client height in pixels.
    pub height: u32,
    /// Only honored when the window is created.
    pub resizable: bool,
    /// Samples per pixel.
    pub multi_sample: u32,
    /// Monitor for fullscreen mode. Has no effect in windowed mode.
    pub monitor: u32,
    /// Refresh rate in hertz. 0 to pick automatically.
    pub refresh_rate: u32,
}

impl Default for WindowModeParams {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            resizable: false,
            multi_sample: 1,
            monitor: 0,
            refresh_rate: 0,
        }
    }
}

impl WindowModeParams {
    /// A fixed-size, single-sampled window.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

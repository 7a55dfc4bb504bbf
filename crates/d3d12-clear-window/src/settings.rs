use crate::gpu::ClearColor;

/// Settings fixed for the lifetime of the process.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphicsSettings {
    pub title: String,
    /// Write to an sRGB back buffer.
    pub srgb: bool,
    pub clear_color: ClearColor,
    pub use_warp_device: bool,
    pub debug_layer: bool,
    /// First argument to `Present`. 0 disables vsync.
    pub sync_interval: u32,
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            title: "D3D12 Example".into(),
            srgb: false,
            clear_color: ClearColor::default(),
            use_warp_device: false,
            debug_layer: cfg!(debug_assertions),
            sync_interval: 0,
        }
    }
}

impl GraphicsSettings {
    /// Builds settings from process arguments. Only `-warp` or `/warp` is recognized.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut settings = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if arg.eq_ignore_ascii_case("-warp") || arg.eq_ignore_ascii_case("/warp") {
                settings.use_warp_device = true;
            }
        }
        settings
    }
}

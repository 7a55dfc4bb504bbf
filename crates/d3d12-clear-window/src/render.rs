use crate::error::Result;
use crate::gpu::ClearColor;
use crate::gpu::SwapChainDevice;

/// Records one frame: clear the back buffer, then present it.
///
/// There is no scene. Draw calls belong between `begin` and `end`.
#[derive(Clone, Debug, Default)]
pub struct FrameRenderer {
    clear_color: ClearColor,
}

impl FrameRenderer {
    pub fn new(clear_color: ClearColor) -> Self {
        Self { clear_color }
    }

    pub fn render<D: SwapChainDevice>(&self, device: &mut D) -> Result<()> {
        device.begin(&self.clear_color)?;
        device.end()
    }
}

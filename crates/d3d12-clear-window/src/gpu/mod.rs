pub mod back_buffers;
#[cfg(windows)]
pub mod d3d12;
pub mod fence;
pub mod multisample;
pub mod viewport;

use crate::error::Result;
use crate::window::WindowModeParams;
use viewport::Viewport;

/// Number of back buffers in the swap chain.
pub const SWAP_CHAIN_BUFFER_COUNT: usize = 2;

/// RGBA color the back buffer is cleared to at the start of every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearColor(pub [f32; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        Self([0.2, 0.3, 0.7, 1.0])
    }
}

/// A GPU device bound to a window surface, owning the swap chain and everything it renders into.
pub trait SwapChainDevice {
    /// Native handle of the surface the swap chain presents to.
    type Surface;

    /// Creates the device on first use, then rebuilds command objects, descriptor heaps and
    /// every swap-chain-dependent view for `mode`.
    fn create_device(&mut self, surface: &Self::Surface, mode: &WindowModeParams) -> Result<()>;

    /// Opens the frame: the current back buffer becomes a cleared render target.
    fn begin(&mut self, clear_color: &ClearColor) -> Result<()>;

    /// Closes the frame: submits, presents, advances the back buffer and waits for the GPU.
    fn end(&mut self) -> Result<()>;

    /// Viewport matching the current swap chain, if one exists.
    fn viewport(&self) -> Option<&Viewport>;
}

//! Direct3D12 implementation of [`SwapChainDevice`](super::SwapChainDevice).

mod barrier;
mod device;
mod fence;

pub use device::DeviceManager;

//! A single window cleared to a solid color every frame with Direct3D12.
//!
//! The window state machine, frame ring and fence bookkeeping are platform independent and
//! reach the OS through [`window::NativeWindow`] and [`gpu::SwapChainDevice`]. The Win32 and
//! Direct3D12 implementations of those seams only build on Windows.

pub mod app;
pub mod error;
pub mod gpu;
pub mod logging;
pub mod render;
pub mod settings;
#[cfg(windows)]
pub mod win32;
pub mod window;

//! Win32 implementation of the native window.

mod window;
mod window_class;

pub use window::Win32Window;

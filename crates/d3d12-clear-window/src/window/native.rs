use super::WindowModeParams;
use crate::error::Result;

/// Outcome of pumping at most one message from the OS queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpedMessage {
    /// Nothing was pending.
    Empty,
    /// A message was dispatched to the window procedure.
    Dispatched,
    /// The quit message was retrieved.
    Quit,
    /// The window procedure saw a request to leave (Escape).
    ExitRequested,
}

/// OS side of the window: creation, title, and the message queue.
pub trait NativeWindow {
    /// Handle the swap chain presents to.
    type Surface;

    /// Creates and shows a window whose client area is `mode.width` by `mode.height`.
    fn open(&mut self, title: &str, mode: &WindowModeParams) -> Result<Self::Surface>;

    /// Resizes the client area of an open window.
    fn resize(&mut self, surface: &Self::Surface, width: u32, height: u32) -> Result<()>;

    fn set_title(&mut self, surface: &Self::Surface, title: &str) -> Result<()>;

    /// Removes and dispatches at most one pending message without blocking.
    fn pump_message(&mut self) -> PumpedMessage;

    /// Shows a modal error message.
    fn show_error(&self, title: &str, message: &str);
}

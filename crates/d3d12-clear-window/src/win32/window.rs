use super::window_class::register_window_class;
use super::window_class::WindowContext;
use super::window_class::CLASS_NAME;
use crate::error::NativeContext;
use crate::error::Result;
use crate::window::NativeWindow;
use crate::window::PumpedMessage;
use crate::window::WindowModeParams;
use tracing::debug;
use tracing::info;
use widestring::U16CString;
use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::UpdateWindow;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;

/// A single top-level Win32 window.
pub struct Win32Window {
    instance: HMODULE,
    context: Box<WindowContext>,
    hwnd: Option<HWND>,
    style: WINDOW_STYLE,
}

impl Win32Window {
    pub fn new() -> Result<Self> {
        let instance = unsafe { GetModuleHandleW(None) }.native("get module handle")?;
        register_window_class(instance)?;
        Ok(Self {
            instance,
            context: Box::default(),
            hwnd: None,
            style: WINDOW_STYLE::default(),
        })
    }

    /// Outer window size whose client area is `width` by `height`.
    fn outer_size(&self, width: u32, height: u32) -> Result<(i32, i32)> {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: width as i32,
            bottom: height as i32,
        };
        unsafe { AdjustWindowRect(&mut rect, self.style, false) }.native("adjust window rect")?;
        Ok((rect.right - rect.left, rect.bottom - rect.top))
    }
}

fn wide(text: &str) -> U16CString {
    U16CString::from_str_truncate(text)
}

impl NativeWindow for Win32Window {
    type Surface = HWND;

    fn open(&mut self, title: &str, mode: &WindowModeParams) -> Result<HWND> {
        self.style = WS_OVERLAPPED | WS_CAPTION | WS_MINIMIZEBOX | WS_SYSMENU;
        if mode.resizable {
            self.style |= WS_SIZEBOX;
        }
        let (width, height) = self.outer_size(mode.width, mode.height)?;
        let title = wide(title);

        let context: *const WindowContext = &*self.context;
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                CLASS_NAME,
                PCWSTR(title.as_ptr()),
                self.style,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                width,
                height,
                None,
                None,
                Some(self.instance.into()),
                Some(context.cast()),
            )
        }
        .native("create window")?;

        unsafe {
            _ = ShowWindow(hwnd, SW_SHOWDEFAULT);
            _ = UpdateWindow(hwnd);
        }
        self.hwnd = Some(hwnd);
        info!(width = mode.width, height = mode.height, resizable = mode.resizable, "Window opened");
        Ok(hwnd)
    }

    fn resize(&mut self, surface: &HWND, width: u32, height: u32) -> Result<()> {
        let (outer_width, outer_height) = self.outer_size(width, height)?;
        unsafe {
            SetWindowPos(
                *surface,
                None,
                0,
                0,
                outer_width,
                outer_height,
                SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        }
        .native("resize window")?;
        debug!(width, height, "Window resized");
        Ok(())
    }

    fn set_title(&mut self, surface: &HWND, title: &str) -> Result<()> {
        let title = wide(title);
        unsafe { SetWindowTextW(*surface, PCWSTR(title.as_ptr())) }.native("set window title")
    }

    fn pump_message(&mut self) -> PumpedMessage {
        let mut message = MSG::default();
        if !unsafe { PeekMessageW(&mut message, None, 0, 0, PM_REMOVE) }.as_bool() {
            return PumpedMessage::Empty;
        }
        if message.message == WM_QUIT {
            return PumpedMessage::Quit;
        }

        unsafe {
            _ = TranslateMessage(&message);
            DispatchMessageW(&message);
        }

        if self.context.take_exit_request() {
            PumpedMessage::ExitRequested
        } else {
            PumpedMessage::Dispatched
        }
    }

    fn show_error(&self, title: &str, message: &str) {
        let title = wide(title);
        let message = wide(message);
        unsafe {
            MessageBoxW(
                self.hwnd,
                PCWSTR(message.as_ptr()),
                PCWSTR(title.as_ptr()),
                MB_ICONERROR | MB_OK,
            );
        }
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        if let Some(hwnd) = self.hwnd.take() {
            unsafe {
                // Detach the context first; it is freed right after this.
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                // Fails harmlessly when the user already closed the window.
                _ = DestroyWindow(hwnd);
            }
        }
    }
}

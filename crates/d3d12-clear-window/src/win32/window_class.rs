use crate::error::NativeContext;
use crate::error::Result;
use std::cell::Cell;
use windows::core::w;
use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::GetStockObject;
use windows::Win32::Graphics::Gdi::BLACK_BRUSH;
use windows::Win32::Graphics::Gdi::HBRUSH;
use windows::Win32::UI::Input::KeyboardAndMouse::VK_ESCAPE;
use windows::Win32::UI::WindowsAndMessaging::*;

pub const CLASS_NAME: PCWSTR = w!("D3D12ExampleWindowClass");

/// State shared between a window and its window procedure.
///
/// A pointer to it lives in the window's `GWLP_USERDATA` slot from `WM_CREATE` until the
/// owning [`super::Win32Window`] is dropped.
#[derive(Default)]
pub struct WindowContext {
    exit_requested: Cell<bool>,
}

impl WindowContext {
    /// Returns whether exit was requested since the last call, and clears the request.
    pub fn take_exit_request(&self) -> bool {
        self.exit_requested.replace(false)
    }
}

/// Registers the window class. Registering it again from the same module is not an error.
pub fn register_window_class(instance: HMODULE) -> Result<()> {
    let wc = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc),
        hInstance: instance.into(),
        hIcon: unsafe { LoadIconW(None, IDI_APPLICATION) }.native("load application icon")?,
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.native("load arrow cursor")?,
        hbrBackground: HBRUSH(unsafe { GetStockObject(BLACK_BRUSH) }.0),
        lpszClassName: CLASS_NAME,
        ..Default::default()
    };

    let atom = unsafe { RegisterClassExW(&wc) };
    if atom == 0 {
        let error = unsafe { GetLastError() };
        if error != ERROR_CLASS_ALREADY_EXISTS {
            return Err(windows::core::Error::from_hresult(error.to_hresult()))
                .native("register window class");
        }
    }
    Ok(())
}

extern "system" fn wndproc(window: HWND, message: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if message == WM_CREATE {
        unsafe {
            let create_struct: &CREATESTRUCTW = &*(lparam.0 as *const CREATESTRUCTW);
            SetWindowLongPtrW(window, GWLP_USERDATA, create_struct.lpCreateParams as _);
        }
        return LRESULT(0);
    }

    // Messages can arrive before WM_CREATE and after the context is detached.
    let user_data = unsafe { GetWindowLongPtrW(window, GWLP_USERDATA) };
    let context = unsafe { (user_data as *const WindowContext).as_ref() };

    match message {
        WM_KEYDOWN => {
            if wparam.0 == VK_ESCAPE.0 as usize {
                if let Some(context) = context {
                    context.exit_requested.set(true);
                }
            }
            LRESULT(0)
        }
        WM_DESTROY => {
            unsafe { PostQuitMessage(0) };
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(window, message, wparam, lparam) },
    }
}

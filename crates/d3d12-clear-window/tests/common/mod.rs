#![allow(dead_code)]

use d3d12_clear_window::error::Result;
use d3d12_clear_window::gpu::viewport::Viewport;
use d3d12_clear_window::gpu::ClearColor;
use d3d12_clear_window::gpu::SwapChainDevice;
use d3d12_clear_window::settings::GraphicsSettings;
use d3d12_clear_window::window::NativeWindow;
use d3d12_clear_window::window::PumpedMessage;
use d3d12_clear_window::window::Window;
use d3d12_clear_window::window::WindowModeParams;
use eyre::eyre;
use std::collections::VecDeque;

pub type TestWindow = Window<MockWindow, MockDevice>;

pub fn test_window() -> TestWindow {
    Window::new(
        MockWindow::default(),
        MockDevice::default(),
        &GraphicsSettings::default(),
    )
}

/// Stands in for an OS window. Surfaces are numbered in creation order.
#[derive(Default)]
pub struct MockWindow {
    pub opened: Vec<(String, WindowModeParams)>,
    pub resized: Vec<(u32, u32)>,
    pub titles: Vec<String>,
    pub messages: VecDeque<PumpedMessage>,
    pub pumped: usize,
    pub errors: std::cell::RefCell<Vec<(String, String)>>,
    pub fail_open: bool,
}

impl NativeWindow for MockWindow {
    type Surface = u32;

    fn open(&mut self, title: &str, mode: &WindowModeParams) -> Result<u32> {
        if self.fail_open {
            return Err(eyre!("window class is not registered"));
        }
        self.opened.push((title.to_owned(), *mode));
        Ok(self.opened.len() as u32)
    }

    fn resize(&mut self, _surface: &u32, width: u32, height: u32) -> Result<()> {
        self.resized.push((width, height));
        Ok(())
    }

    fn set_title(&mut self, _surface: &u32, title: &str) -> Result<()> {
        self.titles.push(title.to_owned());
        Ok(())
    }

    fn pump_message(&mut self) -> PumpedMessage {
        self.pumped += 1;
        self.messages.pop_front().unwrap_or(PumpedMessage::Empty)
    }

    fn show_error(&self, title: &str, message: &str) {
        self.errors
            .borrow_mut()
            .push((title.to_owned(), message.to_owned()));
    }
}

/// Records what the window asks of the GPU.
#[derive(Default)]
pub struct MockDevice {
    pub created_for: Vec<(u32, WindowModeParams)>,
    pub viewport: Option<Viewport>,
    pub cleared_with: Vec<ClearColor>,
    pub presented: usize,
    pub fail_create: bool,
}

impl SwapChainDevice for MockDevice {
    type Surface = u32;

    fn create_device(&mut self, surface: &u32, mode: &WindowModeParams) -> Result<()> {
        if self.fail_create {
            return Err(eyre!("no Direct3D12 capable adapter"));
        }
        self.created_for.push((*surface, *mode));
        self.viewport = Some(Viewport::covering(mode.width, mode.height));
        Ok(())
    }

    fn begin(&mut self, clear_color: &ClearColor) -> Result<()> {
        self.cleared_with.push(*clear_color);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.presented += 1;
        Ok(())
    }

    fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }
}

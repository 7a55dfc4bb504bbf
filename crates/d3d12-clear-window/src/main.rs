use d3d12_clear_window::app::Application;
use d3d12_clear_window::error::Result;
use d3d12_clear_window::logging;
use d3d12_clear_window::settings::GraphicsSettings;
use std::process::ExitCode;
use tracing::info;

/// Clears the window and nothing else.
struct ClearWindow;

impl Application for ClearWindow {}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    logging::init();

    let settings = GraphicsSettings::from_args(std::env::args());
    info!(warp = settings.use_warp_device, "Starting {}", settings.title);

    run(&settings, &mut ClearWindow)
}

#[cfg(windows)]
fn run<A: Application>(settings: &GraphicsSettings, app: &mut A) -> Result<ExitCode> {
    use d3d12_clear_window::app::Runner;
    use d3d12_clear_window::gpu::d3d12::DeviceManager;
    use d3d12_clear_window::win32::Win32Window;
    use d3d12_clear_window::window::Window;

    let window = Window::new(Win32Window::new()?, DeviceManager::new(settings), settings);
    let mut runner = Runner::new(window);
    let code = runner.run(app);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX)))
}

#[cfg(not(windows))]
fn run<A: Application>(_settings: &GraphicsSettings, _app: &mut A) -> Result<ExitCode> {
    tracing::error!("Direct3D12 is only available on Windows");
    Ok(ExitCode::FAILURE)
}

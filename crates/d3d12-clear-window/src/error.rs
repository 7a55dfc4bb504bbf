pub type Result<T, E = eyre::Report> = core::result::Result<T, E>;

/// A failed native graphics or windowing call, carrying the HRESULT it returned.
pub struct NativeCallError {
    action: &'static str,
    code: i32,
}

impl NativeCallError {
    pub fn new(action: &'static str, code: i32) -> Self {
        Self { action, code }
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl std::error::Error for NativeCallError {}

impl std::fmt::Display for NativeCallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to {} (HRESULT {:#010X})", self.action, self.code)
    }
}

impl std::fmt::Debug for NativeCallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Logs a failed native call and turns it into a report.
pub trait NativeContext<T> {
    fn native(self, action: &'static str) -> Result<T>;
}

#[cfg(windows)]
impl<T> NativeContext<T> for windows::core::Result<T> {
    fn native(self, action: &'static str) -> Result<T> {
        self.map_err(|error| {
            let error = NativeCallError::new(action, error.code().0);
            tracing::error!("{error}");
            eyre::Report::new(error)
        })
    }
}

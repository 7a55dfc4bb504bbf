use crate::error::NativeContext;
use crate::error::Result;
use crate::gpu::fence::GpuFence;
use tracing::warn;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::Foundation::GetLastError;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Foundation::WAIT_OBJECT_0;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::System::Threading::*;

/// An `ID3D12Fence` signaled from a command queue, with the event used to wait on it.
pub struct QueueFence {
    queue: ID3D12CommandQueue,
    fence: ID3D12Fence,
    event: HANDLE,
}

impl QueueFence {
    pub fn new(device: &ID3D12Device, queue: ID3D12CommandQueue) -> Result<Self> {
        let fence: ID3D12Fence =
            unsafe { device.CreateFence(0, D3D12_FENCE_FLAG_NONE) }.native("create D3D12 fence")?;
        let event = unsafe { CreateEventA(None, false, false, None) }.native("create fence event")?;
        Ok(Self {
            queue,
            fence,
            event,
        })
    }

    pub fn queue(&self) -> &ID3D12CommandQueue {
        &self.queue
    }
}

impl GpuFence for QueueFence {
    fn signal(&self, value: u64) -> Result<()> {
        unsafe { self.queue.Signal(&self.fence, value) }.native("signal fence")
    }

    fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    fn wait_for(&self, value: u64) -> Result<()> {
        unsafe { self.fence.SetEventOnCompletion(value, self.event) }
            .native("set fence completion event")?;
        if unsafe { WaitForSingleObjectEx(self.event, INFINITE, false) } != WAIT_OBJECT_0 {
            let error = unsafe { GetLastError() };
            return Err(windows::core::Error::from_hresult(error.to_hresult()))
                .native("wait for fence event");
        }
        Ok(())
    }
}

impl Drop for QueueFence {
    fn drop(&mut self) {
        if !self.event.is_invalid() {
            if let Err(e) = unsafe { CloseHandle(self.event) } {
                warn!("Failed to close fence event: {e}");
            }
        }
    }
}

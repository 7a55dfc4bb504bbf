use super::barrier::transition_barrier;
use super::fence::QueueFence;
use crate::error::NativeContext;
use crate::error::Result;
use crate::gpu::back_buffers::BackBufferRing;
use crate::gpu::fence::FrameFence;
use crate::gpu::multisample::ensure_sample_count_unchanged;
use crate::gpu::multisample::multisample_quality;
use crate::gpu::viewport::ScissorRect;
use crate::gpu::viewport::Viewport;
use crate::gpu::ClearColor;
use crate::gpu::SwapChainDevice;
use crate::gpu::SWAP_CHAIN_BUFFER_COUNT;
use crate::settings::GraphicsSettings;
use crate::window::WindowModeParams;
use eyre::bail;
use eyre::eyre;
use std::ffi::c_void;
use tracing::debug;
use tracing::info;
use tracing::warn;
use windows::core::Interface;
use windows::Win32::Foundation::HWND;
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL;
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL_11_0;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

const MIN_FEATURE_LEVEL: D3D_FEATURE_LEVEL = D3D_FEATURE_LEVEL_11_0;

/// Storage format of the swap chain buffers. Flip-model swap chains reject sRGB storage, so
/// sRGB output is done through the render target view instead.
const SWAP_CHAIN_FORMAT: DXGI_FORMAT = DXGI_FORMAT_R8G8B8A8_UNORM;

const DEPTH_STENCIL_FORMAT: DXGI_FORMAT = DXGI_FORMAT_D24_UNORM_S8_UINT;

/// Format the back buffers are written through.
fn back_buffer_format(srgb: bool) -> DXGI_FORMAT {
    if srgb {
        DXGI_FORMAT_R8G8B8A8_UNORM_SRGB
    } else {
        DXGI_FORMAT_R8G8B8A8_UNORM
    }
}

/// Descriptor handle increments, fixed for the lifetime of a device.
#[derive(Clone, Copy, Debug)]
struct DescriptorSizes {
    rtv: u32,
    dsv: u32,
    cbv_srv_uav: u32,
}

/// Owns every Direct3D12 and DXGI object used to render into the window.
///
/// The device, queue and fence are created on the first [`SwapChainDevice::create_device`]
/// call and live as long as the manager. Command objects, descriptor heaps and every
/// swap-chain-dependent view are rebuilt on each call.
pub struct DeviceManager {
    settings: GraphicsSettings,
    gpu: Option<Gpu>,
}

impl DeviceManager {
    pub fn new(settings: &GraphicsSettings) -> Self {
        Self {
            settings: settings.clone(),
            gpu: None,
        }
    }

    /// Blocks until the GPU has finished all submitted work.
    pub fn flush_command_queue(&mut self) -> Result<()> {
        match &mut self.gpu {
            Some(gpu) => gpu.flush_command_queue(),
            None => Ok(()),
        }
    }

    fn gpu_mut(&mut self) -> Result<&mut Gpu> {
        self.gpu
            .as_mut()
            .ok_or_else(|| eyre!("the Direct3D12 device has not been created"))
    }
}

impl SwapChainDevice for DeviceManager {
    type Surface = HWND;

    fn create_device(&mut self, surface: &HWND, mode: &WindowModeParams) -> Result<()> {
        let existing = self.gpu.is_some();
        let gpu = match self.gpu.take() {
            Some(gpu) => gpu,
            None => Gpu::new(&self.settings)?,
        };
        let gpu = self.gpu.insert(gpu);

        if existing {
            // The allocator may still be referenced by in-flight work.
            gpu.flush_command_queue()?;
            gpu.create_command_objects()?;
            gpu.create_descriptor_heaps()?;
        }

        gpu.update_swap_chain(*surface, mode, self.settings.srgb)
    }

    fn begin(&mut self, clear_color: &ClearColor) -> Result<()> {
        self.gpu_mut()?.begin(clear_color)
    }

    fn end(&mut self) -> Result<()> {
        let sync_interval = self.settings.sync_interval;
        self.gpu_mut()?.end(sync_interval)
    }

    fn viewport(&self) -> Option<&Viewport> {
        self.gpu.as_ref().and_then(|gpu| gpu.viewport.as_ref())
    }
}

struct Gpu {
    factory: IDXGIFactory4,
    device: ID3D12Device,
    fence: FrameFence<QueueFence>,

    descriptor_sizes: DescriptorSizes,

    command_allocator: ID3D12CommandAllocator,
    command_list: ID3D12GraphicsCommandList,
    rtv_heap: ID3D12DescriptorHeap,
    dsv_heap: ID3D12DescriptorHeap,

    swap_chain: Option<IDXGISwapChain3>,
    back_buffers: BackBufferRing<ID3D12Resource, SWAP_CHAIN_BUFFER_COUNT>,
    depth_stencil: Option<ID3D12Resource>,
    viewport: Option<Viewport>,
    scissor: ScissorRect,
}

impl Gpu {
    fn new(settings: &GraphicsSettings) -> Result<Self> {
        let factory = create_factory(settings.debug_layer)?;

        let adapter = select_adapter(&factory, settings.use_warp_device)?;

        let mut device: Option<ID3D12Device> = None;
        unsafe { D3D12CreateDevice(&adapter, MIN_FEATURE_LEVEL, &mut device) }
            .native("create D3D12 device")?;
        let device = device.ok_or_else(|| eyre!("D3D12CreateDevice returned no device"))?;

        let descriptor_sizes = unsafe {
            DescriptorSizes {
                rtv: device.GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV),
                dsv: device.GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_DSV),
                cbv_srv_uav: device
                    .GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV),
            }
        };
        debug!(
            rtv = descriptor_sizes.rtv,
            dsv = descriptor_sizes.dsv,
            cbv_srv_uav = descriptor_sizes.cbv_srv_uav,
            "Queried descriptor strides"
        );

        let queue: ID3D12CommandQueue = unsafe {
            device.CreateCommandQueue(&D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
                ..Default::default()
            })
        }
        .native("create D3D12 command queue")?;
        let fence = FrameFence::new(QueueFence::new(&device, queue)?);

        let (command_allocator, command_list) = command_objects(&device)?;
        let (rtv_heap, dsv_heap) = descriptor_heaps(&device)?;

        info!("Direct3D12 device created");
        Ok(Self {
            factory,
            device,
            fence,
            descriptor_sizes,
            command_allocator,
            command_list,
            rtv_heap,
            dsv_heap,
            swap_chain: None,
            back_buffers: BackBufferRing::new(),
            depth_stencil: None,
            viewport: None,
            scissor: ScissorRect::covering(0, 0),
        })
    }

    fn create_command_objects(&mut self) -> Result<()> {
        let (allocator, list) = command_objects(&self.device)?;
        self.command_allocator = allocator;
        self.command_list = list;
        Ok(())
    }

    fn create_descriptor_heaps(&mut self) -> Result<()> {
        let (rtv_heap, dsv_heap) = descriptor_heaps(&self.device)?;
        self.rtv_heap = rtv_heap;
        self.dsv_heap = dsv_heap;
        Ok(())
    }

    fn flush_command_queue(&mut self) -> Result<()> {
        self.fence.flush().map(|_| ())
    }

    /// Closes the command list and submits it. A list that fails to close is dropped.
    fn execute_command_list(&self) {
        if unsafe { self.command_list.Close() }
            .native("close command list")
            .is_err()
        {
            return;
        }
        if let Ok(list) = self
            .command_list
            .cast::<ID3D12CommandList>()
            .native("cast command list")
        {
            unsafe { self.fence.inner().queue().ExecuteCommandLists(&[Some(list)]) };
        }
    }

    fn multisample_quality_levels(&self, format: DXGI_FORMAT, sample_count: u32) -> Option<u32> {
        let mut levels = D3D12_FEATURE_DATA_MULTISAMPLE_QUALITY_LEVELS {
            Format: format,
            SampleCount: sample_count,
            Flags: D3D12_MULTISAMPLE_QUALITY_LEVELS_FLAG_NONE,
            NumQualityLevels: 0,
        };
        unsafe {
            self.device.CheckFeatureSupport(
                D3D12_FEATURE_MULTISAMPLE_QUALITY_LEVELS,
                &mut levels as *mut _ as *mut c_void,
                std::mem::size_of_val(&levels) as u32,
            )
        }
        .ok()?;
        Some(levels.NumQualityLevels)
    }

    fn update_swap_chain(&mut self, hwnd: HWND, mode: &WindowModeParams, srgb: bool) -> Result<()> {
        self.flush_command_queue()?;
        unsafe { self.command_list.Reset(&self.command_allocator, None) }
            .native("reset command list")?;

        let format = back_buffer_format(srgb);
        let requested_count = mode.multi_sample.max(1);

        // ResizeBuffers cannot change the sample count, so an existing swap chain dictates it
        // for every view built below.
        let sample_desc = match &self.swap_chain {
            Some(swap_chain) => {
                let current = unsafe { swap_chain.GetDesc1() }.native("describe swap chain")?;
                ensure_sample_count_unchanged(current.SampleDesc.Count, requested_count)?;
                current.SampleDesc
            }
            None => DXGI_SAMPLE_DESC {
                Count: requested_count,
                Quality: multisample_quality(requested_count, |count| {
                    self.multisample_quality_levels(format, count)
                }),
            },
        };

        // Buffers of the old swap chain must be released before it can be resized.
        self.back_buffers.clear();
        self.depth_stencil = None;

        let swap_chain = match self.swap_chain.clone() {
            Some(swap_chain) => {
                unsafe {
                    swap_chain.ResizeBuffers(
                        SWAP_CHAIN_BUFFER_COUNT as u32,
                        mode.width,
                        mode.height,
                        SWAP_CHAIN_FORMAT,
                        Default::default(),
                    )
                }
                .native("resize swap chain buffers")?;
                swap_chain
            }
            None => {
                let swap_chain = self.create_swap_chain(hwnd, mode, sample_desc)?;
                self.swap_chain = Some(swap_chain.clone());
                swap_chain
            }
        };

        self.reset_render_target_views(&swap_chain, format, sample_desc.Count)?;
        self.reset_depth_stencil_view(mode.width, mode.height, sample_desc)?;
        self.viewport = Some(Viewport::covering(mode.width, mode.height));
        self.scissor = ScissorRect::covering(mode.width, mode.height);

        info!(
            width = mode.width,
            height = mode.height,
            sample_count = sample_desc.Count,
            sample_quality = sample_desc.Quality,
            "Swap chain ready"
        );
        Ok(())
    }

    fn create_swap_chain(
        &self,
        hwnd: HWND,
        mode: &WindowModeParams,
        sample_desc: DXGI_SAMPLE_DESC,
    ) -> Result<IDXGISwapChain3> {
        let desc = DXGI_SWAP_CHAIN_DESC1 {
            BufferCount: SWAP_CHAIN_BUFFER_COUNT as u32,
            Width: mode.width,
            Height: mode.height,
            Format: SWAP_CHAIN_FORMAT,
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            SampleDesc: sample_desc,
            ..Default::default()
        };
        let fullscreen_desc = (mode.refresh_rate != 0).then(|| DXGI_SWAP_CHAIN_FULLSCREEN_DESC {
            RefreshRate: DXGI_RATIONAL {
                Numerator: mode.refresh_rate,
                Denominator: 1,
            },
            Windowed: true.into(),
            ..Default::default()
        });

        let swap_chain: IDXGISwapChain1 = unsafe {
            self.factory.CreateSwapChainForHwnd(
                self.fence.inner().queue(),
                hwnd,
                &desc,
                fullscreen_desc.as_ref().map(|desc| desc as *const _),
                None,
            )
        }
        .native("create swap chain")?;

        // Fullscreen transitions are not supported.
        unsafe { self.factory.MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER) }
            .native("disable alt-enter")?;

        swap_chain.cast().native("query IDXGISwapChain3")
    }

    fn reset_render_target_views(
        &mut self,
        swap_chain: &IDXGISwapChain3,
        format: DXGI_FORMAT,
        sample_count: u32,
    ) -> Result<()> {
        let device = &self.device;
        let start = unsafe { self.rtv_heap.GetCPUDescriptorHandleForHeapStart() };
        let stride = self.descriptor_sizes.rtv as usize;
        let desc = D3D12_RENDER_TARGET_VIEW_DESC {
            Format: format,
            ViewDimension: if sample_count > 1 {
                D3D12_RTV_DIMENSION_TEXTURE2DMS
            } else {
                D3D12_RTV_DIMENSION_TEXTURE2D
            },
            ..Default::default()
        };

        self.back_buffers.fill(|index| -> Result<ID3D12Resource> {
            let buffer: ID3D12Resource = unsafe { swap_chain.GetBuffer(index as u32) }
                .native("get swap chain buffer")?;
            let handle = D3D12_CPU_DESCRIPTOR_HANDLE {
                ptr: start.ptr + index * stride,
            };
            unsafe { device.CreateRenderTargetView(&buffer, Some(&desc), handle) };
            Ok(buffer)
        })
    }

    fn reset_depth_stencil_view(
        &mut self,
        width: u32,
        height: u32,
        sample_desc: DXGI_SAMPLE_DESC,
    ) -> Result<()> {
        let heap_properties = D3D12_HEAP_PROPERTIES {
            Type: D3D12_HEAP_TYPE_DEFAULT,
            CPUPageProperty: D3D12_CPU_PAGE_PROPERTY_UNKNOWN,
            MemoryPoolPreference: D3D12_MEMORY_POOL_UNKNOWN,
            CreationNodeMask: 1,
            VisibleNodeMask: 1,
        };
        let desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
            Alignment: 0,
            Width: u64::from(width),
            Height: height,
            DepthOrArraySize: 1,
            MipLevels: 1,
            Format: DXGI_FORMAT_R24G8_TYPELESS,
            SampleDesc: sample_desc,
            Layout: D3D12_TEXTURE_LAYOUT_UNKNOWN,
            Flags: D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL,
        };
        let optimized_clear = D3D12_CLEAR_VALUE {
            Format: DEPTH_STENCIL_FORMAT,
            Anonymous: D3D12_CLEAR_VALUE_0 {
                DepthStencil: D3D12_DEPTH_STENCIL_VALUE {
                    Depth: 1.0,
                    Stencil: 0,
                },
            },
        };

        let mut depth_stencil: Option<ID3D12Resource> = None;
        unsafe {
            self.device.CreateCommittedResource(
                &heap_properties,
                D3D12_HEAP_FLAG_NONE,
                &desc,
                D3D12_RESOURCE_STATE_COMMON,
                Some(&optimized_clear),
                &mut depth_stencil,
            )
        }
        .native("create depth stencil buffer")?;
        let depth_stencil =
            depth_stencil.ok_or_else(|| eyre!("CreateCommittedResource returned no resource"))?;

        let view_desc = D3D12_DEPTH_STENCIL_VIEW_DESC {
            Format: DEPTH_STENCIL_FORMAT,
            ViewDimension: if sample_desc.Count > 1 {
                D3D12_DSV_DIMENSION_TEXTURE2DMS
            } else {
                D3D12_DSV_DIMENSION_TEXTURE2D
            },
            Flags: D3D12_DSV_FLAG_NONE,
            ..Default::default()
        };
        unsafe {
            self.device
                .CreateDepthStencilView(&depth_stencil, Some(&view_desc), self.depth_stencil_view());
            self.command_list.ResourceBarrier(&[transition_barrier(
                &depth_stencil,
                D3D12_RESOURCE_STATE_COMMON,
                D3D12_RESOURCE_STATE_DEPTH_WRITE,
            )]);
        }

        self.execute_command_list();
        self.flush_command_queue()?;
        self.depth_stencil = Some(depth_stencil);
        Ok(())
    }

    fn current_back_buffer_view(&self) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        let start = unsafe { self.rtv_heap.GetCPUDescriptorHandleForHeapStart() };
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: start.ptr
                + self.back_buffers.current_index() * self.descriptor_sizes.rtv as usize,
        }
    }

    fn depth_stencil_view(&self) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        unsafe { self.dsv_heap.GetCPUDescriptorHandleForHeapStart() }
    }

    fn begin(&mut self, clear_color: &ClearColor) -> Result<()> {
        let viewport = self
            .viewport
            .as_ref()
            .map(d3d12_viewport)
            .ok_or_else(|| eyre!("no swap chain to render into"))?;
        let back_buffer = self
            .back_buffers
            .current()
            .ok_or_else(|| eyre!("swap chain has no back buffers"))?;

        unsafe { self.command_allocator.Reset() }.native("reset command allocator")?;
        unsafe { self.command_list.Reset(&self.command_allocator, None) }
            .native("reset command list")?;

        let rtv = self.current_back_buffer_view();
        let dsv = self.depth_stencil_view();
        let scissor = RECT {
            left: self.scissor.left,
            top: self.scissor.top,
            right: self.scissor.right,
            bottom: self.scissor.bottom,
        };

        let list = &self.command_list;
        unsafe {
            list.ResourceBarrier(&[transition_barrier(
                back_buffer,
                D3D12_RESOURCE_STATE_PRESENT,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
            )]);
            list.RSSetViewports(&[viewport]);
            list.RSSetScissorRects(&[scissor]);
            list.ClearRenderTargetView(rtv, &clear_color.0, None);
            list.ClearDepthStencilView(
                dsv,
                D3D12_CLEAR_FLAG_DEPTH | D3D12_CLEAR_FLAG_STENCIL,
                1.0,
                0,
                None,
            );
            list.OMSetRenderTargets(1, Some(&rtv), true, Some(&dsv));
        }
        Ok(())
    }

    fn end(&mut self, sync_interval: u32) -> Result<()> {
        let swap_chain = self
            .swap_chain
            .clone()
            .ok_or_else(|| eyre!("no swap chain to present"))?;
        let back_buffer = self
            .back_buffers
            .current()
            .ok_or_else(|| eyre!("swap chain has no back buffers"))?;

        unsafe {
            self.command_list.ResourceBarrier(&[transition_barrier(
                back_buffer,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
                D3D12_RESOURCE_STATE_PRESENT,
            )]);
        }
        self.execute_command_list();

        unsafe { swap_chain.Present(sync_interval, DXGI_PRESENT(0)) }
            .ok()
            .native("present")?;
        self.back_buffers.advance();
        debug_assert_eq!(
            unsafe { swap_chain.GetCurrentBackBufferIndex() } as usize,
            self.back_buffers.current_index()
        );

        self.flush_command_queue()
    }
}

impl Drop for Gpu {
    fn drop(&mut self) {
        // Nothing may be released while the GPU still uses it.
        if let Err(e) = self.flush_command_queue() {
            warn!("Failed to flush the command queue before release: {e}");
        }
    }
}

fn create_factory(debug_layer: bool) -> Result<IDXGIFactory4> {
    let mut flags = DXGI_CREATE_FACTORY_FLAGS(0);
    if debug_layer {
        let mut debug: Option<ID3D12Debug> = None;
        if let Some(debug) = unsafe { D3D12GetDebugInterface(&mut debug) }.ok().and(debug) {
            unsafe { debug.EnableDebugLayer() };
            flags |= DXGI_CREATE_FACTORY_DEBUG;
            info!("D3D12 debug layer enabled");
        } else {
            warn!("D3D12 debug layer unavailable");
        }
    }
    unsafe { CreateDXGIFactory2(flags) }.native("create DXGI factory")
}

/// The WARP adapter when requested, otherwise the first hardware adapter able to host a
/// device at [`MIN_FEATURE_LEVEL`].
fn select_adapter(factory: &IDXGIFactory4, use_warp: bool) -> Result<IDXGIAdapter1> {
    if use_warp {
        info!("Using WARP adapter");
        return unsafe { factory.EnumWarpAdapter() }.native("enumerate WARP adapter");
    }

    let mut index = 0;
    loop {
        let adapter = match unsafe { factory.EnumAdapters1(index) } {
            Ok(adapter) => adapter,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
            Err(e) => return Err(e).native("enumerate adapters"),
        };
        index += 1;

        let desc = unsafe { adapter.GetDesc1() }.native("describe adapter")?;
        let name = String::from_utf16_lossy(&desc.Description);
        let name = name.trim_end_matches('\0');
        if desc.Flags & DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32 != 0 {
            debug!(adapter = name, "Skipping software adapter");
            continue;
        }

        // A null output only asks whether the device could be created.
        let can_create = unsafe {
            D3D12CreateDevice(
                &adapter,
                MIN_FEATURE_LEVEL,
                std::ptr::null_mut::<Option<ID3D12Device>>(),
            )
        };
        match can_create {
            Ok(()) => {
                info!(adapter = name, "Using hardware adapter");
                return Ok(adapter);
            }
            Err(_) => debug!(adapter = name, "Adapter lacks feature level 11_0"),
        }
    }

    bail!("no hardware adapter supports Direct3D feature level 11_0")
}

fn command_objects(
    device: &ID3D12Device,
) -> Result<(ID3D12CommandAllocator, ID3D12GraphicsCommandList)> {
    let allocator: ID3D12CommandAllocator =
        unsafe { device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT) }
            .native("create D3D12 command allocator")?;
    let list: ID3D12GraphicsCommandList = unsafe {
        device.CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, &allocator, None)
    }
    .native("create D3D12 command list")?;
    // Lists are created recording; every user resets before recording.
    unsafe { list.Close() }.native("close new command list")?;
    Ok((allocator, list))
}

fn descriptor_heaps(device: &ID3D12Device) -> Result<(ID3D12DescriptorHeap, ID3D12DescriptorHeap)> {
    let rtv_heap: ID3D12DescriptorHeap = unsafe {
        device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
            Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
            NumDescriptors: SWAP_CHAIN_BUFFER_COUNT as u32,
            Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
            NodeMask: 0,
        })
    }
    .native("create RTV descriptor heap")?;
    let dsv_heap: ID3D12DescriptorHeap = unsafe {
        device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
            Type: D3D12_DESCRIPTOR_HEAP_TYPE_DSV,
            NumDescriptors: 1,
            Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
            NodeMask: 0,
        })
    }
    .native("create DSV descriptor heap")?;
    Ok((rtv_heap, dsv_heap))
}

fn d3d12_viewport(viewport: &Viewport) -> D3D12_VIEWPORT {
    D3D12_VIEWPORT {
        TopLeftX: viewport.top_left_x,
        TopLeftY: viewport.top_left_y,
        Width: viewport.width,
        Height: viewport.height,
        MinDepth: viewport.min_depth,
        MaxDepth: viewport.max_depth,
    }
}

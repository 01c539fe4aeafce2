// ============================================================
// Layer 6 — Device Resolution
// ============================================================
// Turns the --gpu selector into the device the run will use,
// after asking wgpu which adapters this host actually has:
//
//   cpu              → CPU (ndarray)
//   auto             → wgpu default adapter, CPU if there is none
//   <n>              → discrete GPU n, CPU if there are fewer
//
// A wgpu device built for an adapter that does not exist panics
// inside the runtime, so the check happens before dispatch.

use burn::backend::wgpu::WgpuDevice;

use crate::domain::run::DeviceSelector;

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedDevice {
    Cpu,
    Wgpu(WgpuDevice),
}

/// Adapter types wgpu can see on this host, in enumeration order.
pub fn available_adapters() -> Vec<wgpu::DeviceType> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    instance
        .enumerate_adapters(wgpu::Backends::all())
        .iter()
        .map(|adapter| adapter.get_info().device_type)
        .collect()
}

/// Pick the device for `selector` given the adapters on this host.
pub fn resolve_device(selector: DeviceSelector, adapters: &[wgpu::DeviceType]) -> ResolvedDevice {
    match selector {
        DeviceSelector::Cpu => ResolvedDevice::Cpu,
        DeviceSelector::Auto => {
            if adapters.is_empty() {
                tracing::warn!("No wgpu adapter found, falling back to CPU");
                ResolvedDevice::Cpu
            } else {
                ResolvedDevice::Wgpu(WgpuDevice::default())
            }
        }
        DeviceSelector::Gpu(index) => {
            let discrete = adapters
                .iter()
                .filter(|t| **t == wgpu::DeviceType::DiscreteGpu)
                .count();
            if index < discrete {
                ResolvedDevice::Wgpu(WgpuDevice::DiscreteGpu(index))
            } else {
                tracing::warn!(
                    "Discrete GPU {index} not available ({discrete} found), falling back to CPU"
                );
                ResolvedDevice::Cpu
            }
        }
    }
}

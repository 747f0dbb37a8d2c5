//! Integration tests for VulkanGraphicsDevice
//!
//! These tests verify that the backend correctly implements the
//! GraphicsDevice trait against a real driver. All tests require a
//! Vulkan-capable GPU and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_device_tests -- --ignored

use ash::vk;
use sdf_ray_engine::graphics_device::{
    Config, GraphicsDevice, LayoutBinding, BindingType, ShaderModuleDesc, ShaderStage,
    ShaderStageFlags,
};
use sdf_ray_engine::material::{Material, MaterialDesc};
use sdf_ray_engine::pipeline::PipelineBuilder;
use sdf_ray_engine::shader::{CompileExecutor, ShaderCompiler, ShaderSource, ShaderStatus};
use sdf_ray_engine::swap::HotSwapCoordinator;
use sdf_ray_engine_renderer_vulkan::{NagaCompiler, VulkanGraphicsDevice};
use serial_test::serial;
use std::sync::Arc;

const VERTEX_GLSL: &str = r#"
#version 450
layout(location = 0) in vec2 position;
void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
"#;

const FRAGMENT_GLSL: &str = r#"
#version 450
layout(location = 0) out vec4 fragColor;
void main() {
    fragColor = vec4(0.2, 0.4, 0.8, 1.0);
}
"#;

const FRAGMENT_GLSL_EDITED: &str = r#"
#version 450
layout(location = 0) out vec4 fragColor;
void main() {
    fragColor = vec4(0.9, 0.1, 0.1, 1.0);
}
"#;

/// Headless instance + logical device; no surface is needed for the
/// shader/pipeline subsystem.
struct TestGpu {
    _entry: ash::Entry,
    instance: ash::Instance,
    device: ash::Device,
}

impl TestGpu {
    fn new() -> Self {
        unsafe {
            let entry = ash::Entry::load().expect("Vulkan loader not available");

            let app_info = vk::ApplicationInfo::default().api_version(vk::API_VERSION_1_1);
            let create_info = vk::InstanceCreateInfo::default().application_info(&app_info);
            let instance = entry
                .create_instance(&create_info, None)
                .expect("failed to create instance");

            let physical_device = instance
                .enumerate_physical_devices()
                .expect("failed to enumerate physical devices")
                .into_iter()
                .next()
                .expect("no Vulkan-capable GPU found");

            let queue_families =
                instance.get_physical_device_queue_family_properties(physical_device);
            let graphics_family = queue_families
                .iter()
                .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                .expect("no graphics queue family") as u32;

            let priorities = [1.0];
            let queue_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(graphics_family)
                .queue_priorities(&priorities)];
            let device_info = vk::DeviceCreateInfo::default().queue_create_infos(&queue_infos);
            let device = instance
                .create_device(physical_device, &device_info, None)
                .expect("failed to create device");

            Self {
                _entry: entry,
                instance,
                device,
            }
        }
    }
}

impl Drop for TestGpu {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_shader_module_roundtrip() {
    let gpu = TestGpu::new();
    {
        let wrapper = VulkanGraphicsDevice::new(gpu.device.clone(), &Config::default()).unwrap();
        let compiled = NagaCompiler::new().compile(ShaderStage::Vertex, VERTEX_GLSL);
        assert!(compiled.is_ok(), "diagnostic: {}", compiled.diagnostic);

        let module = wrapper
            .create_shader_module(&ShaderModuleDesc {
                stage: ShaderStage::Vertex,
                code: &compiled.spirv,
                entry_point: "main",
            })
            .unwrap();
        assert!(!module.is_null());
        wrapper.destroy_shader_module(module);
    }
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_full_pipeline_build() {
    let gpu = TestGpu::new();
    {
        let device: Arc<dyn GraphicsDevice> = Arc::new(
            VulkanGraphicsDevice::new(gpu.device.clone(), &Config::default()).unwrap(),
        );
        let compiler: Arc<dyn ShaderCompiler> = Arc::new(NagaCompiler::new());
        let executor = Arc::new(CompileExecutor::new("shader-compile").unwrap());

        let material = Arc::new(Material::new(
            device.clone(),
            compiler,
            executor,
            MaterialDesc {
                hot_swappable: true,
                layout_bindings: vec![LayoutBinding {
                    binding: 0,
                    binding_type: BindingType::UniformBuffer,
                    count: 1,
                    stage_flags: ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT,
                }],
                ..Default::default()
            },
        ));

        material
            .vertex_unit()
            .submit(ShaderSource::text(ShaderStage::Vertex, VERTEX_GLSL));
        material
            .fragment_unit()
            .submit(ShaderSource::text(ShaderStage::Fragment, FRAGMENT_GLSL));
        assert_eq!(material.vertex_unit().wait().status, ShaderStatus::Ready);
        assert_eq!(material.fragment_unit().wait().status, ShaderStatus::Ready);

        let builder = PipelineBuilder::new(device.clone());
        let pipeline = builder.build(&material).unwrap();
        assert!(!pipeline.pipeline().is_null());

        let coordinator = HotSwapCoordinator::new(device.clone());
        coordinator.register(&material);
        coordinator.install_initial(&material, pipeline).unwrap();
        assert_eq!(material.active_pipeline().unwrap().generation, 1);

        material.destroy();
    }
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_hot_swap_cycle() {
    let gpu = TestGpu::new();
    {
        let device: Arc<dyn GraphicsDevice> = Arc::new(
            VulkanGraphicsDevice::new(gpu.device.clone(), &Config::default()).unwrap(),
        );
        let compiler: Arc<dyn ShaderCompiler> = Arc::new(NagaCompiler::new());
        let executor = Arc::new(CompileExecutor::new("shader-compile").unwrap());

        let material = Arc::new(Material::new(
            device.clone(),
            compiler,
            executor,
            MaterialDesc {
                hot_swappable: true,
                ..Default::default()
            },
        ));

        material
            .vertex_unit()
            .submit(ShaderSource::text(ShaderStage::Vertex, VERTEX_GLSL));
        material
            .fragment_unit()
            .submit(ShaderSource::text(ShaderStage::Fragment, FRAGMENT_GLSL));
        material.vertex_unit().wait();
        material.fragment_unit().wait();

        let builder = PipelineBuilder::new(device.clone());
        let coordinator = HotSwapCoordinator::new(device.clone());
        coordinator.register(&material);

        let first = builder.build(&material).unwrap();
        coordinator.install_initial(&material, first).unwrap();
        material.bind_for_frame(1);

        // Simulated graph edit
        material.fragment_unit().submit(ShaderSource::text(
            ShaderStage::Fragment,
            FRAGMENT_GLSL_EDITED,
        ));
        assert_eq!(material.fragment_unit().wait().status, ShaderStatus::Ready);
        let rebuilt = builder.build(&material).unwrap();
        coordinator.request_swap(&material, rebuilt).unwrap();

        coordinator.notify_frame_boundary(1);
        assert_eq!(material.active_pipeline().unwrap().generation, 2);

        material.destroy();
    }
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_pipeline_cache_survives_rebuilds() {
    let gpu = TestGpu::new();
    {
        let device: Arc<dyn GraphicsDevice> = Arc::new(
            VulkanGraphicsDevice::new(gpu.device.clone(), &Config::default()).unwrap(),
        );
        let compiler: Arc<dyn ShaderCompiler> = Arc::new(NagaCompiler::new());
        let executor = Arc::new(CompileExecutor::new("shader-compile").unwrap());

        let material = Arc::new(Material::new(
            device.clone(),
            compiler,
            executor,
            MaterialDesc {
                hot_swappable: true,
                ..Default::default()
            },
        ));
        material
            .vertex_unit()
            .submit(ShaderSource::text(ShaderStage::Vertex, VERTEX_GLSL));
        material
            .fragment_unit()
            .submit(ShaderSource::text(ShaderStage::Fragment, FRAGMENT_GLSL));
        material.vertex_unit().wait();
        material.fragment_unit().wait();

        // Repeated builds of identical state all go through the one shared
        // cache; each must succeed and produce a distinct pipeline object
        let builder = PipelineBuilder::new(device.clone());
        let first = builder.build(&material).unwrap();
        let second = builder.build(&material).unwrap();
        assert_ne!(first.pipeline(), second.pipeline());

        let coordinator = HotSwapCoordinator::new(device.clone());
        coordinator.register(&material);
        coordinator.install_initial(&material, first).unwrap();
        coordinator.request_swap(&material, second).unwrap();
        coordinator.notify_frame_boundary(1);

        material.destroy();
    }
}

//! Unit tests for the mock device's bookkeeping

use crate::graphics_device::mock_device::{DeviceEvent, MockGraphicsDevice};
use crate::graphics_device::{
    GraphicsDevice, LayoutBinding, PipelineLayoutDesc, ShaderModuleDesc, ShaderStage,
};

fn module_desc(code: &[u32]) -> ShaderModuleDesc<'_> {
    ShaderModuleDesc {
        stage: ShaderStage::Vertex,
        code,
        entry_point: "main",
    }
}

#[test]
fn test_create_destroy_tracks_live_counts() {
    let device = MockGraphicsDevice::new();
    let code = [0x0723_0203u32, 1];

    let module = device.create_shader_module(&module_desc(&code)).unwrap();
    assert_eq!(device.live_shader_modules(), 1);

    device.destroy_shader_module(module);
    assert_eq!(device.live_shader_modules(), 0);
    assert!(device.all_released());
}

#[test]
fn test_event_log_preserves_order() {
    let device = MockGraphicsDevice::new();
    let code = [0x0723_0203u32, 1];

    let module = device.create_shader_module(&module_desc(&code)).unwrap();
    let bindings: Vec<LayoutBinding> = Vec::new();
    let set_layout = device.create_descriptor_set_layout(&bindings).unwrap();
    device.destroy_shader_module(module);

    let create_module = device
        .event_index(DeviceEvent::CreateShaderModule(module))
        .unwrap();
    let create_layout = device
        .event_index(DeviceEvent::CreateDescriptorSetLayout(set_layout))
        .unwrap();
    let destroy_module = device
        .event_index(DeviceEvent::DestroyShaderModule(module))
        .unwrap();

    assert!(create_module < create_layout);
    assert!(create_layout < destroy_module);

    device.destroy_descriptor_set_layout(set_layout);
}

#[test]
fn test_fail_next_pipeline_is_one_shot() {
    let device = MockGraphicsDevice::new();
    let code = [0x0723_0203u32, 1];
    let module = device.create_shader_module(&module_desc(&code)).unwrap();
    let set_layouts = [];
    let layout = device
        .create_pipeline_layout(&PipelineLayoutDesc {
            set_layouts: &set_layouts,
            push_constant_ranges: &[],
        })
        .unwrap();

    let desc = crate::graphics_device::PipelineDesc {
        stages: vec![crate::graphics_device::StageDesc {
            stage: ShaderStage::Vertex,
            module,
            entry_point: "main".to_string(),
        }],
        vertex_layout: Default::default(),
        topology: crate::graphics_device::PrimitiveTopology::TriangleList,
        rasterization: Default::default(),
        depth_stencil: Default::default(),
        color_blend: Default::default(),
        multisample: Default::default(),
        layout,
    };

    device.fail_next_pipeline();
    assert!(device.create_graphics_pipeline(&desc).is_err());

    // Next attempt succeeds
    let pipeline = device.create_graphics_pipeline(&desc).unwrap();
    device.destroy_pipeline(pipeline);
    device.destroy_pipeline_layout(layout);
    device.destroy_shader_module(module);
    assert!(device.all_released());
}

#[test]
#[should_panic(expected = "unknown shader module")]
fn test_double_destroy_panics() {
    let device = MockGraphicsDevice::new();
    let code = [0x0723_0203u32, 1];
    let module = device.create_shader_module(&module_desc(&code)).unwrap();
    device.destroy_shader_module(module);
    device.destroy_shader_module(module);
}

#[test]
fn test_empty_bytecode_rejected() {
    let device = MockGraphicsDevice::new();
    assert!(device.create_shader_module(&module_desc(&[])).is_err());
}

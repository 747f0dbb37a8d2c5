//! VulkanGraphicsDevice - ash implementation of the GraphicsDevice trait
//!
//! Wraps an injected `ash::Device` (the host's window/device layer owns
//! instance and device creation) and maps the core's opaque u64 handles to
//! Vulkan objects through interior-mutable handle tables. One
//! `VkPipelineCache` is created up front and used for every graphics
//! pipeline; callers serialize pipeline creation through the core's
//! `PipelineBuilder`, which is what makes the shared cache safe.

use ash::vk;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use sdf_ray_engine::graphics_device::{
    BindingType, BlendFactor, BlendOp, ColorWriteMask, CompareOp, Config, CullMode,
    DescriptorSetLayoutHandle, FrontFace, GraphicsDevice, LayoutBinding, PipelineDesc,
    PipelineHandle, PipelineLayoutDesc, PipelineLayoutHandle, PolygonMode, PrimitiveTopology,
    SampleCount, ShaderModuleDesc, ShaderModuleHandle, ShaderStage, ShaderStageFlags,
    VertexFormat, VertexInputRate,
};
use sdf_ray_engine::sdfray::{Error, Result};
use sdf_ray_engine::{engine_error, engine_info, engine_warn};
use std::ffi::CString;
use std::sync::atomic::{AtomicU64, Ordering};

/// Color attachment format assumed for the throwaway render passes built
/// during pipeline creation; must match the swapchain format the host
/// renders into.
const PIPELINE_COLOR_FORMAT: vk::Format = vk::Format::B8G8R8A8_SRGB;

/// Depth attachment format for pipelines with depth testing enabled
const PIPELINE_DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

#[derive(Default)]
struct HandleTables {
    shader_modules: FxHashMap<u64, vk::ShaderModule>,
    set_layouts: FxHashMap<u64, vk::DescriptorSetLayout>,
    pipeline_layouts: FxHashMap<u64, vk::PipelineLayout>,
    pipelines: FxHashMap<u64, vk::Pipeline>,
}

/// Vulkan device capability implementation
pub struct VulkanGraphicsDevice {
    device: ash::Device,
    pipeline_cache: vk::PipelineCache,
    next_id: AtomicU64,
    tables: Mutex<HandleTables>,
}

impl VulkanGraphicsDevice {
    /// Wrap an existing logical device
    ///
    /// # Arguments
    ///
    /// * `device` - Logical device created by the host's device layer; the
    ///   host remains its owner and must keep it alive past this wrapper
    /// * `config` - Subsystem configuration
    pub fn new(device: ash::Device, config: &Config) -> Result<Self> {
        // One cache for all pipeline creation. Most drivers cache
        // internally as well, but the explicit cache also covers layouts
        // recreated on every hot swap.
        let cache_info = vk::PipelineCacheCreateInfo::default();
        let pipeline_cache = unsafe {
            device.create_pipeline_cache(&cache_info, None).map_err(|e| {
                engine_error!(
                    "sdfray::vulkan",
                    "Failed to create pipeline cache: {:?}",
                    e
                );
                Error::DeviceResource(format!("vkCreatePipelineCache failed: {:?}", e))
            })?
        };

        engine_info!(
            "sdfray::vulkan",
            "Vulkan device wrapper ready for '{}' (validation: {})",
            config.app_name,
            config.enable_validation
        );

        Ok(Self {
            device,
            pipeline_cache,
            // Handle 0 is reserved for NULL
            next_id: AtomicU64::new(1),
            tables: Mutex::new(HandleTables::default()),
        })
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Build the temporary render pass a pipeline is created against.
    ///
    /// Pipelines only need a *compatible* render pass at creation time, so
    /// a throwaway pass with the fixed attachment formats is enough; it is
    /// destroyed as soon as the pipeline exists.
    unsafe fn create_compatible_render_pass(&self, needs_depth: bool) -> Result<vk::RenderPass> {
        let color_attachment = vk::AttachmentDescription::default()
            .format(PIPELINE_COLOR_FORMAT)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

        let color_attachment_ref = vk::AttachmentReference::default()
            .attachment(0)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

        let mut attachments = vec![color_attachment];

        let depth_attachment_ref = vk::AttachmentReference::default()
            .attachment(1)
            .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

        if needs_depth {
            let depth_attachment = vk::AttachmentDescription::default()
                .format(PIPELINE_DEPTH_FORMAT)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::DONT_CARE)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);
            attachments.push(depth_attachment);
        }

        let mut subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(std::slice::from_ref(&color_attachment_ref));

        if needs_depth {
            subpass = subpass.depth_stencil_attachment(&depth_attachment_ref);
        }

        let stage_mask = if needs_depth {
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
        } else {
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
        };
        let access_mask = if needs_depth {
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
        } else {
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE
        };

        let dependency = vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(stage_mask)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(stage_mask)
            .dst_access_mask(access_mask);

        let render_pass_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(std::slice::from_ref(&subpass))
            .dependencies(std::slice::from_ref(&dependency));

        self.device
            .create_render_pass(&render_pass_info, None)
            .map_err(|e| {
                engine_error!(
                    "sdfray::vulkan",
                    "Failed to create render pass for pipeline: {:?}",
                    e
                );
                Error::DeviceResource(format!("vkCreateRenderPass failed: {:?}", e))
            })
    }
}

// ===== ENUM CONVERSIONS =====

fn shader_stage_to_vk(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
        ShaderStage::Compute => vk::ShaderStageFlags::COMPUTE,
    }
}

fn stage_flags_to_vk(flags: ShaderStageFlags) -> vk::ShaderStageFlags {
    let mut vk_flags = vk::ShaderStageFlags::empty();
    if flags.contains(ShaderStageFlags::VERTEX) {
        vk_flags |= vk::ShaderStageFlags::VERTEX;
    }
    if flags.contains(ShaderStageFlags::FRAGMENT) {
        vk_flags |= vk::ShaderStageFlags::FRAGMENT;
    }
    if flags.contains(ShaderStageFlags::COMPUTE) {
        vk_flags |= vk::ShaderStageFlags::COMPUTE;
    }
    vk_flags
}

fn binding_type_to_vk(binding_type: BindingType) -> vk::DescriptorType {
    match binding_type {
        BindingType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        BindingType::UniformBufferDynamic => vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
        BindingType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
        BindingType::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
    }
}

fn topology_to_vk(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

fn cull_mode_to_vk(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

fn front_face_to_vk(face: FrontFace) -> vk::FrontFace {
    match face {
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

fn polygon_mode_to_vk(mode: PolygonMode) -> vk::PolygonMode {
    match mode {
        PolygonMode::Fill => vk::PolygonMode::FILL,
        PolygonMode::Line => vk::PolygonMode::LINE,
    }
}

fn compare_op_to_vk(op: CompareOp) -> vk::CompareOp {
    match op {
        CompareOp::Never => vk::CompareOp::NEVER,
        CompareOp::Less => vk::CompareOp::LESS,
        CompareOp::Equal => vk::CompareOp::EQUAL,
        CompareOp::LessOrEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareOp::Greater => vk::CompareOp::GREATER,
        CompareOp::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareOp::GreaterOrEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareOp::Always => vk::CompareOp::ALWAYS,
    }
}

fn blend_factor_to_vk(factor: BlendFactor) -> vk::BlendFactor {
    match factor {
        BlendFactor::Zero => vk::BlendFactor::ZERO,
        BlendFactor::One => vk::BlendFactor::ONE,
        BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
    }
}

fn blend_op_to_vk(op: BlendOp) -> vk::BlendOp {
    match op {
        BlendOp::Add => vk::BlendOp::ADD,
        BlendOp::Subtract => vk::BlendOp::SUBTRACT,
        BlendOp::Min => vk::BlendOp::MIN,
        BlendOp::Max => vk::BlendOp::MAX,
    }
}

fn sample_count_to_vk(count: SampleCount) -> vk::SampleCountFlags {
    match count {
        SampleCount::S1 => vk::SampleCountFlags::TYPE_1,
        SampleCount::S2 => vk::SampleCountFlags::TYPE_2,
        SampleCount::S4 => vk::SampleCountFlags::TYPE_4,
        SampleCount::S8 => vk::SampleCountFlags::TYPE_8,
    }
}

fn color_write_mask_to_vk(mask: &ColorWriteMask) -> vk::ColorComponentFlags {
    let mut flags = vk::ColorComponentFlags::empty();
    if mask.r {
        flags |= vk::ColorComponentFlags::R;
    }
    if mask.g {
        flags |= vk::ColorComponentFlags::G;
    }
    if mask.b {
        flags |= vk::ColorComponentFlags::B;
    }
    if mask.a {
        flags |= vk::ColorComponentFlags::A;
    }
    flags
}

fn vertex_format_to_vk(format: VertexFormat) -> vk::Format {
    match format {
        VertexFormat::R32_SFLOAT => vk::Format::R32_SFLOAT,
        VertexFormat::R32G32_SFLOAT => vk::Format::R32G32_SFLOAT,
        VertexFormat::R32G32B32_SFLOAT => vk::Format::R32G32B32_SFLOAT,
        VertexFormat::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
    }
}

// ===== TRAIT IMPLEMENTATION =====

impl GraphicsDevice for VulkanGraphicsDevice {
    fn create_shader_module(&self, desc: &ShaderModuleDesc) -> Result<ShaderModuleHandle> {
        let create_info = vk::ShaderModuleCreateInfo::default().code(desc.code);

        let module = unsafe {
            self.device
                .create_shader_module(&create_info, None)
                .map_err(|e| {
                    engine_error!(
                        "sdfray::vulkan",
                        "Failed to create {:?} shader module: {:?}",
                        desc.stage,
                        e
                    );
                    Error::DeviceResource(format!("vkCreateShaderModule failed: {:?}", e))
                })?
        };

        let handle = ShaderModuleHandle::new(self.next_id());
        self.tables.lock().shader_modules.insert(handle.0, module);
        Ok(handle)
    }

    fn destroy_shader_module(&self, module: ShaderModuleHandle) {
        let Some(vk_module) = self.tables.lock().shader_modules.remove(&module.0) else {
            engine_warn!(
                "sdfray::vulkan",
                "destroy_shader_module: unknown handle {:?}",
                module
            );
            return;
        };
        unsafe {
            self.device.destroy_shader_module(vk_module, None);
        }
    }

    fn create_descriptor_set_layout(
        &self,
        bindings: &[LayoutBinding],
    ) -> Result<DescriptorSetLayoutHandle> {
        let vk_bindings: Vec<vk::DescriptorSetLayoutBinding> = bindings
            .iter()
            .map(|binding| {
                vk::DescriptorSetLayoutBinding::default()
                    .binding(binding.binding)
                    .descriptor_type(binding_type_to_vk(binding.binding_type))
                    .descriptor_count(binding.count)
                    .stage_flags(stage_flags_to_vk(binding.stage_flags))
            })
            .collect();

        let layout_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&vk_bindings);

        let layout = unsafe {
            self.device
                .create_descriptor_set_layout(&layout_info, None)
                .map_err(|e| {
                    engine_error!(
                        "sdfray::vulkan",
                        "Failed to create descriptor set layout: {:?}",
                        e
                    );
                    Error::DeviceResource(format!("vkCreateDescriptorSetLayout failed: {:?}", e))
                })?
        };

        let handle = DescriptorSetLayoutHandle(self.next_id());
        self.tables.lock().set_layouts.insert(handle.0, layout);
        Ok(handle)
    }

    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutHandle) {
        let Some(vk_layout) = self.tables.lock().set_layouts.remove(&layout.0) else {
            engine_warn!(
                "sdfray::vulkan",
                "destroy_descriptor_set_layout: unknown handle {:?}",
                layout
            );
            return;
        };
        unsafe {
            self.device.destroy_descriptor_set_layout(vk_layout, None);
        }
    }

    fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> Result<PipelineLayoutHandle> {
        let vk_set_layouts: Vec<vk::DescriptorSetLayout> = {
            let tables = self.tables.lock();
            desc.set_layouts
                .iter()
                .map(|handle| {
                    tables.set_layouts.get(&handle.0).copied().ok_or_else(|| {
                        Error::InvalidResource(format!(
                            "unknown descriptor set layout handle {:?}",
                            handle
                        ))
                    })
                })
                .collect::<Result<_>>()?
        };

        let push_constant_ranges: Vec<vk::PushConstantRange> = desc
            .push_constant_ranges
            .iter()
            .map(|range| vk::PushConstantRange {
                stage_flags: stage_flags_to_vk(range.stages),
                offset: range.offset,
                size: range.size,
            })
            .collect();

        let mut layout_info = vk::PipelineLayoutCreateInfo::default();
        if !vk_set_layouts.is_empty() {
            layout_info = layout_info.set_layouts(&vk_set_layouts);
        }
        if !push_constant_ranges.is_empty() {
            layout_info = layout_info.push_constant_ranges(&push_constant_ranges);
        }

        let layout = unsafe {
            self.device
                .create_pipeline_layout(&layout_info, None)
                .map_err(|e| {
                    engine_error!(
                        "sdfray::vulkan",
                        "Failed to create pipeline layout: {:?}",
                        e
                    );
                    Error::DeviceResource(format!("vkCreatePipelineLayout failed: {:?}", e))
                })?
        };

        let handle = PipelineLayoutHandle(self.next_id());
        self.tables.lock().pipeline_layouts.insert(handle.0, layout);
        Ok(handle)
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle) {
        let Some(vk_layout) = self.tables.lock().pipeline_layouts.remove(&layout.0) else {
            engine_warn!(
                "sdfray::vulkan",
                "destroy_pipeline_layout: unknown handle {:?}",
                layout
            );
            return;
        };
        unsafe {
            self.device.destroy_pipeline_layout(vk_layout, None);
        }
    }

    fn create_graphics_pipeline(&self, desc: &PipelineDesc) -> Result<PipelineHandle> {
        // Resolve core handles into Vulkan objects up front.
        let (vk_modules, vk_layout) = {
            let tables = self.tables.lock();
            let modules: Vec<vk::ShaderModule> = desc
                .stages
                .iter()
                .map(|stage| {
                    tables
                        .shader_modules
                        .get(&stage.module.0)
                        .copied()
                        .ok_or_else(|| {
                            Error::InvalidResource(format!(
                                "unknown shader module handle {:?} for stage {:?}",
                                stage.module, stage.stage
                            ))
                        })
                })
                .collect::<Result<_>>()?;
            let layout = tables
                .pipeline_layouts
                .get(&desc.layout.0)
                .copied()
                .ok_or_else(|| {
                    Error::InvalidResource(format!(
                        "unknown pipeline layout handle {:?}",
                        desc.layout
                    ))
                })?;
            (modules, layout)
        };

        unsafe {
            let needs_depth = desc.depth_stencil.depth_test_enable;
            let render_pass = self.create_compatible_render_pass(needs_depth)?;

            let entry_points: Result<Vec<CString>> = desc
                .stages
                .iter()
                .map(|stage| {
                    CString::new(stage.entry_point.as_str()).map_err(|_| {
                        Error::InvalidResource(format!(
                            "entry point '{}' contains a NUL byte",
                            stage.entry_point
                        ))
                    })
                })
                .collect();
            let entry_points = match entry_points {
                Ok(entry_points) => entry_points,
                Err(e) => {
                    self.device.destroy_render_pass(render_pass, None);
                    return Err(e);
                }
            };

            let shader_stages: Vec<vk::PipelineShaderStageCreateInfo> = desc
                .stages
                .iter()
                .zip(vk_modules.iter())
                .zip(entry_points.iter())
                .map(|((stage, module), entry_point)| {
                    vk::PipelineShaderStageCreateInfo::default()
                        .stage(shader_stage_to_vk(stage.stage))
                        .module(*module)
                        .name(entry_point)
                })
                .collect();

            // Vertex input state
            let vertex_bindings: Vec<vk::VertexInputBindingDescription> = desc
                .vertex_layout
                .bindings
                .iter()
                .map(|binding| vk::VertexInputBindingDescription {
                    binding: binding.binding,
                    stride: binding.stride,
                    input_rate: match binding.input_rate {
                        VertexInputRate::Vertex => vk::VertexInputRate::VERTEX,
                        VertexInputRate::Instance => vk::VertexInputRate::INSTANCE,
                    },
                })
                .collect();

            let vertex_attributes: Vec<vk::VertexInputAttributeDescription> = desc
                .vertex_layout
                .attributes
                .iter()
                .map(|attribute| vk::VertexInputAttributeDescription {
                    location: attribute.location,
                    binding: attribute.binding,
                    format: vertex_format_to_vk(attribute.format),
                    offset: attribute.offset,
                })
                .collect();

            let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
                .vertex_binding_descriptions(&vertex_bindings)
                .vertex_attribute_descriptions(&vertex_attributes);

            let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(topology_to_vk(desc.topology))
                .primitive_restart_enable(false);

            // Viewport and scissor are set dynamically; the pipeline
            // survives window resizes untouched.
            let viewports = [vk::Viewport::default()];
            let scissors = [vk::Rect2D::default()];
            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewports(&viewports)
                .scissors(&scissors);

            let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
                .depth_clamp_enable(false)
                .rasterizer_discard_enable(false)
                .polygon_mode(polygon_mode_to_vk(desc.rasterization.polygon_mode))
                .line_width(1.0)
                .cull_mode(cull_mode_to_vk(desc.rasterization.cull_mode))
                .front_face(front_face_to_vk(desc.rasterization.front_face));

            let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
                .depth_test_enable(desc.depth_stencil.depth_test_enable)
                .depth_write_enable(desc.depth_stencil.depth_write_enable)
                .depth_compare_op(compare_op_to_vk(desc.depth_stencil.depth_compare_op))
                .depth_bounds_test_enable(false)
                .stencil_test_enable(false);

            let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
                .sample_shading_enable(false)
                .rasterization_samples(sample_count_to_vk(desc.multisample.sample_count));

            let color_blend_attachment = {
                let mut attachment = vk::PipelineColorBlendAttachmentState::default()
                    .color_write_mask(color_write_mask_to_vk(&desc.color_blend.color_write_mask))
                    .blend_enable(desc.color_blend.blend_enable);
                if desc.color_blend.blend_enable {
                    attachment = attachment
                        .src_color_blend_factor(blend_factor_to_vk(desc.color_blend.src_color_factor))
                        .dst_color_blend_factor(blend_factor_to_vk(desc.color_blend.dst_color_factor))
                        .color_blend_op(blend_op_to_vk(desc.color_blend.color_blend_op))
                        .src_alpha_blend_factor(blend_factor_to_vk(desc.color_blend.src_alpha_factor))
                        .dst_alpha_blend_factor(blend_factor_to_vk(desc.color_blend.dst_alpha_factor))
                        .alpha_blend_op(blend_op_to_vk(desc.color_blend.alpha_blend_op));
                }
                attachment
            };

            let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
                .logic_op_enable(false)
                .attachments(std::slice::from_ref(&color_blend_attachment));

            let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
            let dynamic_state =
                vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

            let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&shader_stages)
                .vertex_input_state(&vertex_input_state)
                .input_assembly_state(&input_assembly_state)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterization_state)
                .depth_stencil_state(&depth_stencil_state)
                .multisample_state(&multisample_state)
                .color_blend_state(&color_blend_state)
                .dynamic_state(&dynamic_state)
                .layout(vk_layout)
                .render_pass(render_pass)
                .subpass(0);

            let pipelines = match self.device.create_graphics_pipelines(
                self.pipeline_cache,
                &[pipeline_info],
                None,
            ) {
                Ok(pipelines) => pipelines,
                Err((_, e)) => {
                    self.device.destroy_render_pass(render_pass, None);
                    engine_error!(
                        "sdfray::vulkan",
                        "Failed to create graphics pipeline: {:?}",
                        e
                    );
                    return Err(Error::DeviceResource(format!(
                        "vkCreateGraphicsPipelines failed: {:?}",
                        e
                    )));
                }
            };

            self.device.destroy_render_pass(render_pass, None);

            let handle = PipelineHandle(self.next_id());
            self.tables.lock().pipelines.insert(handle.0, pipelines[0]);
            Ok(handle)
        }
    }

    fn destroy_pipeline(&self, pipeline: PipelineHandle) {
        let Some(vk_pipeline) = self.tables.lock().pipelines.remove(&pipeline.0) else {
            engine_warn!(
                "sdfray::vulkan",
                "destroy_pipeline: unknown handle {:?}",
                pipeline
            );
            return;
        };
        unsafe {
            self.device.destroy_pipeline(vk_pipeline, None);
        }
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        // The host guarantees device idleness before tearing the subsystem
        // down; anything still in the tables at this point leaked out of
        // the retire/drain protocol, so reclaim it here with a warning.
        let tables = std::mem::take(&mut *self.tables.lock());
        let leftovers = tables.pipelines.len()
            + tables.pipeline_layouts.len()
            + tables.set_layouts.len()
            + tables.shader_modules.len();
        if leftovers > 0 {
            engine_warn!(
                "sdfray::vulkan",
                "{} GPU objects were never released through the drain protocol; destroying now",
                leftovers
            );
        }
        unsafe {
            for (_, pipeline) in tables.pipelines {
                self.device.destroy_pipeline(pipeline, None);
            }
            for (_, layout) in tables.pipeline_layouts {
                self.device.destroy_pipeline_layout(layout, None);
            }
            for (_, layout) in tables.set_layouts {
                self.device.destroy_descriptor_set_layout(layout, None);
            }
            for (_, module) in tables.shader_modules {
                self.device.destroy_shader_module(module, None);
            }
            self.device.destroy_pipeline_cache(self.pipeline_cache, None);
        }
    }
}

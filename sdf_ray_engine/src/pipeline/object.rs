//! PipelineObject - a fully built graphics pipeline plus its layout
//!
//! Created unattached by `PipelineBuilder`, made visible to the render
//! thread by `HotSwapCoordinator`, and destroyed only once the coordinator
//! confirms no in-flight frame still references it. The object deliberately
//! has no `Drop` impl; ownership of the underlying GPU handles moves through
//! the swap/retire protocol and ends in an explicit release.

use crate::graphics_device::{
    DescriptorSetLayoutHandle, GraphicsDevice, PipelineHandle, PipelineLayoutHandle,
};

/// A built, GPU-resident graphics pipeline
#[derive(Debug)]
pub struct PipelineObject {
    pipeline: PipelineHandle,
    layout: PipelineLayoutHandle,
    set_layouts: Vec<DescriptorSetLayoutHandle>,
    /// Hot-swap generation; 0 until stamped by the coordinator
    generation: u64,
}

impl PipelineObject {
    pub(crate) fn new(
        pipeline: PipelineHandle,
        layout: PipelineLayoutHandle,
        set_layouts: Vec<DescriptorSetLayoutHandle>,
    ) -> Self {
        Self {
            pipeline,
            layout,
            set_layouts,
            generation: 0,
        }
    }

    /// Pipeline handle for binding
    pub fn pipeline(&self) -> PipelineHandle {
        self.pipeline
    }

    /// Layout handle for descriptor/push-constant binding
    pub fn layout(&self) -> PipelineLayoutHandle {
        self.layout
    }

    /// Hot-swap generation stamped at swap request time (0 = never stamped)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Destroy the pipeline, its layout, and its descriptor set layouts
    pub(crate) fn release(self, device: &dyn GraphicsDevice) {
        device.destroy_pipeline(self.pipeline);
        device.destroy_pipeline_layout(self.layout);
        for set_layout in self.set_layouts {
            device.destroy_descriptor_set_layout(set_layout);
        }
    }
}

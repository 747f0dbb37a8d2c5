/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Records every create/destroy call in one ordered event log so tests can
/// assert resource-lifetime ordering (in particular that retired pipelines
/// are destroyed only after their drain barrier). Also tracks live handles
/// per kind to catch leaks and double destroys.

use crate::error::{Error, Result};
use crate::graphics_device::{
    DescriptorSetLayoutHandle, GraphicsDevice, LayoutBinding, PipelineDesc, PipelineHandle,
    PipelineLayoutDesc, PipelineLayoutHandle, ShaderModuleDesc, ShaderModuleHandle,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// One recorded device call, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    CreateShaderModule(ShaderModuleHandle),
    DestroyShaderModule(ShaderModuleHandle),
    CreateDescriptorSetLayout(DescriptorSetLayoutHandle),
    DestroyDescriptorSetLayout(DescriptorSetLayoutHandle),
    CreatePipelineLayout(PipelineLayoutHandle),
    DestroyPipelineLayout(PipelineLayoutHandle),
    CreatePipeline(PipelineHandle),
    DestroyPipeline(PipelineHandle),
}

#[derive(Default)]
struct LiveSets {
    shader_modules: HashSet<u64>,
    set_layouts: HashSet<u64>,
    pipeline_layouts: HashSet<u64>,
    pipelines: HashSet<u64>,
}

/// Mock device recording all calls
pub struct MockGraphicsDevice {
    next_id: AtomicU64,
    events: Mutex<Vec<DeviceEvent>>,
    live: Mutex<LiveSets>,
    fail_next_pipeline: AtomicBool,
    fail_next_shader_module: AtomicBool,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            // Handle 0 is reserved for NULL
            next_id: AtomicU64::new(1),
            events: Mutex::new(Vec::new()),
            live: Mutex::new(LiveSets::default()),
            fail_next_pipeline: AtomicBool::new(false),
            fail_next_shader_module: AtomicBool::new(false),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn record(&self, event: DeviceEvent) {
        self.events.lock().push(event);
    }

    /// Make the next `create_graphics_pipeline` call fail
    pub fn fail_next_pipeline(&self) {
        self.fail_next_pipeline.store(true, Ordering::SeqCst);
    }

    /// Make the next `create_shader_module` call fail
    pub fn fail_next_shader_module(&self) {
        self.fail_next_shader_module.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the ordered event log
    pub fn events(&self) -> Vec<DeviceEvent> {
        self.events.lock().clone()
    }

    /// Index of the first occurrence of `event` in the log
    pub fn event_index(&self, event: DeviceEvent) -> Option<usize> {
        self.events.lock().iter().position(|e| *e == event)
    }

    pub fn live_shader_modules(&self) -> usize {
        self.live.lock().shader_modules.len()
    }

    pub fn live_set_layouts(&self) -> usize {
        self.live.lock().set_layouts.len()
    }

    pub fn live_pipeline_layouts(&self) -> usize {
        self.live.lock().pipeline_layouts.len()
    }

    pub fn live_pipelines(&self) -> usize {
        self.live.lock().pipelines.len()
    }

    /// True when every created object has been destroyed
    pub fn all_released(&self) -> bool {
        let live = self.live.lock();
        live.shader_modules.is_empty()
            && live.set_layouts.is_empty()
            && live.pipeline_layouts.is_empty()
            && live.pipelines.is_empty()
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_shader_module(&self, desc: &ShaderModuleDesc) -> Result<ShaderModuleHandle> {
        if self.fail_next_shader_module.swap(false, Ordering::SeqCst) {
            return Err(Error::DeviceResource(
                "mock: shader module creation failed".to_string(),
            ));
        }
        if desc.code.is_empty() {
            return Err(Error::InvalidResource(
                "mock: empty shader bytecode".to_string(),
            ));
        }
        let handle = ShaderModuleHandle::new(self.next_id());
        self.live.lock().shader_modules.insert(handle.0);
        self.record(DeviceEvent::CreateShaderModule(handle));
        Ok(handle)
    }

    fn destroy_shader_module(&self, module: ShaderModuleHandle) {
        assert!(
            self.live.lock().shader_modules.remove(&module.0),
            "mock: destroying unknown shader module {:?}",
            module
        );
        self.record(DeviceEvent::DestroyShaderModule(module));
    }

    fn create_descriptor_set_layout(
        &self,
        _bindings: &[LayoutBinding],
    ) -> Result<DescriptorSetLayoutHandle> {
        let handle = DescriptorSetLayoutHandle(self.next_id());
        self.live.lock().set_layouts.insert(handle.0);
        self.record(DeviceEvent::CreateDescriptorSetLayout(handle));
        Ok(handle)
    }

    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutHandle) {
        assert!(
            self.live.lock().set_layouts.remove(&layout.0),
            "mock: destroying unknown descriptor set layout {:?}",
            layout
        );
        self.record(DeviceEvent::DestroyDescriptorSetLayout(layout));
    }

    fn create_pipeline_layout(&self, _desc: &PipelineLayoutDesc) -> Result<PipelineLayoutHandle> {
        let handle = PipelineLayoutHandle(self.next_id());
        self.live.lock().pipeline_layouts.insert(handle.0);
        self.record(DeviceEvent::CreatePipelineLayout(handle));
        Ok(handle)
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle) {
        assert!(
            self.live.lock().pipeline_layouts.remove(&layout.0),
            "mock: destroying unknown pipeline layout {:?}",
            layout
        );
        self.record(DeviceEvent::DestroyPipelineLayout(layout));
    }

    fn create_graphics_pipeline(&self, desc: &PipelineDesc) -> Result<PipelineHandle> {
        if self.fail_next_pipeline.swap(false, Ordering::SeqCst) {
            return Err(Error::DeviceResource(
                "mock: pipeline creation failed".to_string(),
            ));
        }
        for stage in &desc.stages {
            if stage.module.is_null() {
                return Err(Error::InvalidResource(format!(
                    "mock: null module for stage {:?}",
                    stage.stage
                )));
            }
        }
        let handle = PipelineHandle(self.next_id());
        self.live.lock().pipelines.insert(handle.0);
        self.record(DeviceEvent::CreatePipeline(handle));
        Ok(handle)
    }

    fn destroy_pipeline(&self, pipeline: PipelineHandle) {
        assert!(
            self.live.lock().pipelines.remove(&pipeline.0),
            "mock: destroying unknown pipeline {:?}",
            pipeline
        );
        self.record(DeviceEvent::DestroyPipeline(pipeline));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;

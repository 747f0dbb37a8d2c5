//! HotSwapCoordinator - publishes newly built pipelines and retires old ones
//!
//! The coordinator mediates between the build side (background compiles and
//! `PipelineBuilder::build`) and the render thread. A newly built pipeline
//! is staged with `request_swap` and becomes visible only at the next frame
//! boundary; the outgoing pipeline is retired with a drain barrier at the
//! highest frame that observed it and destroyed once the render thread
//! reports that frame complete. Superseded pending pipelines were never
//! published, so they are destroyed immediately with no barrier.
//!
//! Generations are stamped at request time and are strictly increasing per
//! material; the published stream may skip generations that were coalesced
//! away, but never reorders. The render thread is shielded from every
//! compile/build failure: a failed build simply never reaches
//! `request_swap`.

use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, ShaderModuleHandle};
use crate::material::Material;
use crate::pipeline::PipelineObject;
use crate::swap::tracker::{RetiredBatch, SwapState};
use crate::{engine_debug, engine_warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Orchestrates pipeline publication and retire-after-drain
pub struct HotSwapCoordinator {
    device: Arc<dyn GraphicsDevice>,
    materials: Mutex<Vec<Arc<Material>>>,
    /// Highest generation whose retired resources are fully destroyed
    retired_watermark: AtomicU64,
    /// Highest frame the render thread has reported complete
    last_completed_frame: AtomicU64,
}

impl HotSwapCoordinator {
    /// Create a coordinator over an injected device capability
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            materials: Mutex::new(Vec::new()),
            retired_watermark: AtomicU64::new(0),
            last_completed_frame: AtomicU64::new(0),
        }
    }

    /// Track a material's swaps and retirements
    pub fn register(&self, material: &Arc<Material>) {
        let mut materials = self.materials.lock();
        if !materials.iter().any(|m| Arc::ptr_eq(m, material)) {
            materials.push(material.clone());
        }
    }

    /// Stop tracking a material (it keeps its own resources; see
    /// `Material::destroy` for teardown)
    pub fn unregister(&self, material: &Arc<Material>) {
        self.materials.lock().retain(|m| !Arc::ptr_eq(m, material));
    }

    /// Publish a material's very first pipeline immediately
    ///
    /// Legal only while the material has no active and no pending pipeline;
    /// nothing can reference a pipeline that was never published, so no
    /// frame-boundary wait is needed.
    ///
    /// # Errors
    ///
    /// `ProtocolViolation` when a pipeline is already attached; the passed
    /// pipeline is destroyed (it was never published).
    pub fn install_initial(&self, material: &Material, mut pipeline: PipelineObject) -> Result<u64> {
        if material.is_destroyed() {
            pipeline.release(self.device.as_ref());
            return Err(Error::ProtocolViolation(
                "install_initial() on a destroyed material".to_string(),
            ));
        }

        let mut swap = material.swap_tracker();
        if swap.active.is_some() || swap.pending.is_some() {
            drop(swap);
            engine_warn!(
                "sdfray::HotSwapCoordinator",
                "install_initial() with a pipeline already attached; ignoring"
            );
            pipeline.release(self.device.as_ref());
            return Err(Error::ProtocolViolation(
                "material already has a pipeline".to_string(),
            ));
        }

        let generation = swap.next_generation;
        swap.next_generation += 1;
        pipeline.set_generation(generation);
        swap.active = Some(pipeline);
        Ok(generation)
    }

    /// Stage a newly built pipeline for publication at the next frame
    /// boundary
    ///
    /// Only hot-swappable materials may swap. A request arriving while an
    /// earlier one is still staged coalesces: the latest pipeline wins and
    /// the superseded one is destroyed immediately (it was never
    /// published).
    ///
    /// # Returns
    ///
    /// The generation stamped on the staged pipeline.
    pub fn request_swap(&self, material: &Material, mut pipeline: PipelineObject) -> Result<u64> {
        if material.is_destroyed() {
            pipeline.release(self.device.as_ref());
            return Err(Error::ProtocolViolation(
                "request_swap() on a destroyed material".to_string(),
            ));
        }
        if !material.is_hot_swappable() {
            engine_warn!(
                "sdfray::HotSwapCoordinator",
                "request_swap() on a material that is not hot-swappable; ignoring"
            );
            pipeline.release(self.device.as_ref());
            return Err(Error::ProtocolViolation(
                "material is not hot-swappable".to_string(),
            ));
        }

        let (generation, superseded) = {
            let mut swap = material.swap_tracker();
            let generation = swap.next_generation;
            swap.next_generation += 1;
            pipeline.set_generation(generation);

            let superseded = swap.pending.replace(pipeline);
            swap.state = SwapState::SwapRequested;

            if superseded.is_some() {
                engine_debug!(
                    "sdfray::HotSwapCoordinator",
                    "coalesced swap request; generation {} supersedes a staged pipeline",
                    generation
                );
            }
            (generation, superseded)
        };

        if let Some(old) = superseded {
            // Never published: no drain barrier applies.
            old.release(self.device.as_ref());
        }
        Ok(generation)
    }

    /// Frame-boundary notification from the render thread
    ///
    /// `completed_frame` means that frame and every earlier frame have
    /// fully finished GPU execution. At this safe point the coordinator
    /// publishes staged pipelines, retires the outgoing ones behind a drain
    /// barrier, and destroys every retired batch whose barrier has been
    /// crossed.
    pub fn notify_frame_boundary(&self, completed_frame: u64) {
        let previous = self
            .last_completed_frame
            .fetch_max(completed_frame, Ordering::AcqRel);
        if completed_frame < previous {
            engine_warn!(
                "sdfray::HotSwapCoordinator",
                "notify_frame_boundary({}) after frame {} already completed",
                completed_frame,
                previous
            );
        }

        let materials = self.materials.lock().clone();
        for material in &materials {
            if material.is_destroyed() {
                continue;
            }
            self.advance_material(material, completed_frame);
        }
    }

    /// Highest generation whose retired resources are fully destroyed
    pub fn retired_watermark(&self) -> u64 {
        self.retired_watermark.load(Ordering::Acquire)
    }

    /// Publish + drain one material at a frame boundary
    fn advance_material(&self, material: &Material, completed_frame: u64) {
        let mut destroy_now: Vec<RetiredBatch> = Vec::new();

        {
            let mut swap = material.swap_tracker();

            // Publish the staged pipeline, retiring the outgoing one.
            if swap.pending.is_some() {
                swap.state = SwapState::Swapping;
                // Checked above; take() under the same lock.
                let incoming = swap.pending.take().unwrap();
                let generation = incoming.generation();
                let modules = material.drain_retired_modules();
                let outgoing = swap.active.replace(incoming);

                match outgoing {
                    Some(old) => {
                        let barrier = swap
                            .observed
                            .filter(|o| o.generation == old.generation())
                            .map(|o| o.frame);
                        let batch = RetiredBatch {
                            barrier_frame: barrier.unwrap_or(0),
                            generation: old.generation(),
                            pipeline: Some(old),
                            modules,
                        };
                        if barrier.is_some() {
                            swap.retired.push(batch);
                        } else {
                            // Never observed by any frame.
                            destroy_now.push(batch);
                        }
                    }
                    None => {
                        // First publish through the swap path; superseded
                        // modules were never referenced by a published
                        // pipeline.
                        if !modules.is_empty() {
                            destroy_now.push(RetiredBatch {
                                barrier_frame: 0,
                                generation: 0,
                                pipeline: None,
                                modules,
                            });
                        }
                    }
                }
                swap.state = SwapState::Stable;
                engine_debug!(
                    "sdfray::HotSwapCoordinator",
                    "published pipeline generation {}",
                    generation
                );
            }

            // Collect retired batches whose drain barrier has been crossed.
            let mut index = 0;
            while index < swap.retired.len() {
                if swap.retired[index].barrier_frame <= completed_frame {
                    destroy_now.push(swap.retired.swap_remove(index));
                } else {
                    index += 1;
                }
            }
        }

        for batch in destroy_now {
            self.release_batch(batch);
        }
    }

    fn release_batch(&self, batch: RetiredBatch) {
        if let Some(pipeline) = batch.pipeline {
            pipeline.release(self.device.as_ref());
        }
        for module in batch.modules {
            self.destroy_module(module);
        }
        if batch.generation > 0 {
            self.retired_watermark
                .fetch_max(batch.generation, Ordering::AcqRel);
        }
    }

    fn destroy_module(&self, module: ShaderModuleHandle) {
        if !module.is_null() {
            self.device.destroy_shader_module(module);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;

//! Render State Cache
//!
//! Remembers what is resident on the GPU so consecutive renders of the same
//! model (or with the same space settings) skip redundant uploads.

use crate::mesh::{AssembledModel, ModelId, ModelSpec};

use super::uniforms::SpaceUniforms;

/// Geometry that is currently in the vertex/index buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidentModel {
    pub id: ModelId,
    pub cube_count: usize,
    pub index_count: u32,
}

/// Last uploaded model identity and uniform block.
#[derive(Debug, Default)]
pub struct RenderStateCache {
    model: Option<ResidentModel>,
    space: Option<SpaceUniforms>,
}

impl RenderStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `model` resident, calling `upload` only if a different model is
    /// currently resident. Returns the resident geometry and whether an
    /// upload happened.
    pub fn sync_model(
        &mut self,
        model: &ModelSpec,
        upload: impl FnOnce(&AssembledModel),
    ) -> (ResidentModel, bool) {
        if let Some(resident) = self.model.filter(|resident| resident.id == model.id()) {
            return (resident, false);
        }

        let assembled = model.assemble();
        upload(&assembled);
        let resident = ResidentModel {
            id: model.id(),
            cube_count: assembled.cube_count,
            index_count: assembled.index_count(),
        };
        self.model = Some(resident);
        (resident, true)
    }

    /// Upload `uniforms` unless the identical block is already resident.
    /// Returns whether an upload happened.
    pub fn sync_space(
        &mut self,
        uniforms: &SpaceUniforms,
        upload: impl FnOnce(&SpaceUniforms),
    ) -> bool {
        if self.space.as_ref() == Some(uniforms) {
            return false;
        }
        upload(uniforms);
        self.space = Some(*uniforms);
        true
    }

    pub fn resident_model(&self) -> Option<ResidentModel> {
        self.model
    }

    /// Forget everything; the next sync uploads unconditionally.
    pub fn invalidate(&mut self) {
        self.model = None;
        self.space = None;
    }
}

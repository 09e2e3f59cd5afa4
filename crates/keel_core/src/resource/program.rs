//! Linked shader programs

use crate::handle::{Resource, ResourceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type ProgramRef = Arc<Program>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEval,
    Geometry,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub const COUNT: usize = 6;

    pub const ALL: [ShaderStage; Self::COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::TessControl,
        ShaderStage::TessEval,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
        ShaderStage::Compute,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A linked program. Only its identity and subroutine layout matter here.
#[derive(Debug)]
pub struct Program {
    id: ResourceId,
    label: String,
    /// Subroutine uniform count per stage
    subroutines: [u32; ShaderStage::COUNT],
}

impl Program {
    pub fn new(label: impl Into<String>) -> ProgramRef {
        Self::with_subroutines(label, [0; ShaderStage::COUNT])
    }

    pub fn with_subroutines(label: impl Into<String>, subroutines: [u32; ShaderStage::COUNT]) -> ProgramRef {
        Arc::new(Self {
            id: ResourceId::next(),
            label: label.into(),
            subroutines,
        })
    }

    pub fn subroutine_count(&self, stage: ShaderStage) -> u32 {
        self.subroutines[stage.index()]
    }

    pub fn has_subroutines(&self) -> bool {
        self.subroutines.iter().any(|&n| n > 0)
    }
}

impl Resource for Program {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

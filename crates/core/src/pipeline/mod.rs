//! Declarative pipeline definitions.
//!
//! Each variant is an ordered list of stage descriptors interpreted
//! generically by the engine's worker; the sequencing logic is never
//! duplicated per variant. Progress milestones are fixed per stage, not
//! computed from elapsed time: the properties to preserve are monotonicity
//! and a deterministic stage-to-percentage mapping.

use crate::job::{JobStatus, PipelineVariant};

/// Which remote operation a stage invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOp {
    /// Upload the original source image.
    Upload,
    /// Upscale the uploaded copy.
    Upscale,
    /// Color-grade the uploaded copy.
    ColorGrade,
    /// Fix metadata on the enhanced result.
    FixMetadata,
}

impl StageOp {
    /// Returns the operation name (for logs and metric labels).
    pub fn as_str(&self) -> &'static str {
        match self {
            StageOp::Upload => "upload",
            StageOp::Upscale => "upscale",
            StageOp::ColorGrade => "color_grade",
            StageOp::FixMetadata => "fix_metadata",
        }
    }
}

/// One stage: a remote operation plus its status label and progress
/// milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    /// The remote operation to invoke.
    pub op: StageOp,
    /// Status the job carries while this stage's call is in flight.
    pub status: JobStatus,
    /// Progress milestone set when the stage begins.
    pub progress_on_start: u8,
    /// Progress milestone set when the stage's call succeeds.
    pub progress_on_success: u8,
}

const UPSCALE_STAGES: [Stage; 3] = [
    Stage {
        op: StageOp::Upload,
        status: JobStatus::Uploading,
        progress_on_start: 25,
        progress_on_success: 50,
    },
    Stage {
        op: StageOp::Upscale,
        status: JobStatus::Upscaling,
        progress_on_start: 50,
        progress_on_success: 70,
    },
    Stage {
        op: StageOp::FixMetadata,
        status: JobStatus::Uploading,
        progress_on_start: 85,
        progress_on_success: 100,
    },
];

const COLOR_STAGES: [Stage; 3] = [
    Stage {
        op: StageOp::Upload,
        status: JobStatus::Uploading,
        progress_on_start: 25,
        progress_on_success: 50,
    },
    Stage {
        op: StageOp::ColorGrade,
        status: JobStatus::ColorGrading,
        progress_on_start: 50,
        progress_on_success: 70,
    },
    Stage {
        op: StageOp::FixMetadata,
        status: JobStatus::Uploading,
        progress_on_start: 85,
        progress_on_success: 100,
    },
];

/// The ordered stage list governing one pipeline variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineDefinition {
    variant: PipelineVariant,
    stages: &'static [Stage],
}

impl PipelineDefinition {
    /// Returns the definition for the given variant.
    pub fn for_variant(variant: PipelineVariant) -> Self {
        let stages = match variant {
            PipelineVariant::Upscale => &UPSCALE_STAGES[..],
            PipelineVariant::Color => &COLOR_STAGES[..],
        };
        Self { variant, stages }
    }

    /// The governed variant.
    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    /// The ordered stages.
    pub fn stages(&self) -> &'static [Stage] {
        self.stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_variants_upload_first_and_fix_last() {
        for variant in [PipelineVariant::Upscale, PipelineVariant::Color] {
            let def = PipelineDefinition::for_variant(variant);
            let stages = def.stages();
            assert_eq!(stages.first().map(|s| s.op), Some(StageOp::Upload));
            assert_eq!(stages.last().map(|s| s.op), Some(StageOp::FixMetadata));
        }
    }

    #[test]
    fn test_upscale_variant_never_color_grades() {
        let def = PipelineDefinition::for_variant(PipelineVariant::Upscale);
        assert!(def.stages().iter().all(|s| s.op != StageOp::ColorGrade));
        assert!(def.stages().iter().any(|s| s.op == StageOp::Upscale));
    }

    #[test]
    fn test_color_variant_never_upscales() {
        let def = PipelineDefinition::for_variant(PipelineVariant::Color);
        assert!(def.stages().iter().all(|s| s.op != StageOp::Upscale));
        assert!(def.stages().iter().any(|s| s.op == StageOp::ColorGrade));
    }

    #[test]
    fn test_milestones_are_monotonic() {
        for variant in [PipelineVariant::Upscale, PipelineVariant::Color] {
            let def = PipelineDefinition::for_variant(variant);
            let mut last = 0u8;
            for stage in def.stages() {
                assert!(stage.progress_on_start >= last);
                assert!(stage.progress_on_success >= stage.progress_on_start);
                last = stage.progress_on_success;
            }
            assert_eq!(last, 100);
        }
    }

    #[test]
    fn test_fixed_milestones() {
        let def = PipelineDefinition::for_variant(PipelineVariant::Upscale);
        let stages = def.stages();
        assert_eq!(stages[0].progress_on_start, 25);
        assert_eq!(stages[0].progress_on_success, 50);
        assert_eq!(stages[1].progress_on_success, 70);
        assert_eq!(stages[2].progress_on_start, 85);
        assert_eq!(stages[2].progress_on_success, 100);
    }

    #[test]
    fn test_metadata_fix_runs_as_uploading() {
        for variant in [PipelineVariant::Upscale, PipelineVariant::Color] {
            let def = PipelineDefinition::for_variant(variant);
            assert_eq!(def.stages().last().map(|s| s.status), Some(JobStatus::Uploading));
        }
    }
}

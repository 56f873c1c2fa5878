//! # Static Catalogs
//!
//! The read-only model catalog and training preset catalog. Both are
//! compiled in; the CORE never mutates them.

use crate::types::{Difficulty, ModelDescriptor, PresetKind, TrainingParameters};
use serde::Serialize;
use std::sync::OnceLock;

// =============================================================================
// MODEL CATALOG
// =============================================================================

fn model(
    id: &str,
    name: &str,
    provider: &str,
    ram_required_gb: u32,
    hf_path: &str,
    difficulty: Difficulty,
    training_time_estimate: &str,
    description: &str,
) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        provider: provider.to_string(),
        ram_required_gb,
        hf_path: hf_path.to_string(),
        difficulty,
        training_time_estimate: training_time_estimate.to_string(),
        description: description.to_string(),
    }
}

/// All base models the wizard offers, smallest first.
#[must_use]
pub fn model_catalog() -> &'static [ModelDescriptor] {
    static MODELS: OnceLock<Vec<ModelDescriptor>> = OnceLock::new();
    MODELS.get_or_init(|| {
        vec![
            model(
                "phi3",
                "Phi-3-Mini-128K",
                "Microsoft",
                4,
                "microsoft/Phi-3-mini-128k-instruct",
                Difficulty::Beginner,
                "1-2 hours",
                "Lightweight model, ideal for systems with limited RAM, supports LoRA fine-tuning.",
            ),
            model(
                "gemma",
                "Gemma-2B",
                "Google",
                6,
                "google/gemma-2b",
                Difficulty::Beginner,
                "2-3 hours",
                "Compact model from Google, excellent for general-purpose tasks and experimentation.",
            ),
            model(
                "mistral",
                "Mistral-7B",
                "Mistral AI",
                12,
                "mistralai/Mixtral-7B-Instruct-v0.1",
                Difficulty::Intermediate,
                "4-6 hours",
                "Efficient model for complex tasks, supports QLoRA for memory optimization.",
            ),
            model(
                "llama",
                "Llama-3-8B",
                "Meta",
                16,
                "meta-llama/Llama-3-8b",
                Difficulty::Advanced,
                "6-8 hours",
                "Versatile model, ideal for fine-tuning on specific tasks with high performance.",
            ),
        ]
    })
}

/// Look up a model by id.
#[must_use]
pub fn find_model(id: &str) -> Option<&'static ModelDescriptor> {
    model_catalog().iter().find(|m| m.id == id)
}

// =============================================================================
// PRESET CATALOG
// =============================================================================

/// A named, fixed bundle of training parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub kind: PresetKind,
    pub name: &'static str,
    pub description: &'static str,
    pub time_estimate: &'static str,
    pub learning_rate: &'static str,
    pub rank: u32,
    pub alpha: u32,
    pub iterations: u32,
    pub batch_size: u32,
}

impl Preset {
    /// Materialize the preset's parameter snapshot.
    #[must_use]
    pub fn params(&self) -> TrainingParameters {
        TrainingParameters {
            learning_rate: self.learning_rate.to_string(),
            rank: self.rank,
            alpha: self.alpha,
            iterations: self.iterations,
            batch_size: self.batch_size,
        }
    }
}

const PRESETS: [Preset; 3] = [
    Preset {
        kind: PresetKind::Light,
        name: "Light Training",
        description: "Quick training for testing and low-resource systems",
        time_estimate: "1-2 hours",
        learning_rate: "1e-5",
        rank: 8,
        alpha: 16,
        iterations: 200,
        batch_size: 8,
    },
    Preset {
        kind: PresetKind::Standard,
        name: "Standard Training",
        description: "Balanced approach between efficiency and quality",
        time_estimate: "4-6 hours",
        learning_rate: "5e-5",
        rank: 16,
        alpha: 32,
        iterations: 600,
        batch_size: 16,
    },
    Preset {
        kind: PresetKind::Intensive,
        name: "Intensive Training",
        description: "Deep training for maximum quality, requires more resources",
        time_estimate: "8-12 hours",
        learning_rate: "1e-4",
        rank: 32,
        alpha: 64,
        iterations: 1000,
        batch_size: 32,
    },
];

/// All named presets, lightest first.
#[must_use]
pub fn preset_catalog() -> &'static [Preset] {
    &PRESETS
}

/// Look up a named preset. `Custom` has no snapshot and yields `None`.
#[must_use]
pub fn preset(kind: PresetKind) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.kind == kind)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_ids_are_unique() {
        let models = model_catalog();
        for (i, a) in models.iter().enumerate() {
            for b in &models[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn find_model_by_id() {
        let phi3 = find_model("phi3").expect("phi3 in catalog");
        assert_eq!(phi3.hf_path, "microsoft/Phi-3-mini-128k-instruct");
        assert_eq!(phi3.ram_required_gb, 4);
        assert!(find_model("gpt-5").is_none());
    }

    #[test]
    fn light_preset_values() {
        let light = preset(PresetKind::Light).expect("light preset").params();
        assert_eq!(light.learning_rate, "1e-5");
        assert_eq!(light.rank, 8);
        assert_eq!(light.alpha, 16);
        assert_eq!(light.iterations, 200);
        assert_eq!(light.batch_size, 8);
    }

    #[test]
    fn custom_has_no_snapshot() {
        assert!(preset(PresetKind::Custom).is_none());
        assert_eq!(preset_catalog().len(), 3);
    }
}

//! # Trainer Command Generation
//!
//! Produces the `mlx_lm.lora` invocation a user copies to start training.
//!
//! The flag order and names are a contract with the external trainer. The
//! model (`selected_model`) and data file (`train_data.jsonl`) are fixed
//! literals, as are the evaluation cadence (200) and validation batches (25);
//! only the five training parameters vary.

use crate::types::TrainingParameters;

/// Trainer module invoked through `python -m`.
pub const TRAINER_MODULE: &str = "mlx_lm.lora";

/// Placeholder passed to `--model`.
pub const MODEL_PLACEHOLDER: &str = "selected_model";

/// Data file passed to `--data`.
pub const DATA_FILE: &str = "train_data.jsonl";

/// Steps between validation passes.
pub const STEPS_PER_EVAL: u32 = 200;

/// Validation batches per pass.
pub const VAL_BATCHES: u32 = 25;

/// Build the single-line trainer command for a parameter set.
///
/// Values are interpolated verbatim, without quoting or validation.
#[must_use]
pub fn generate_command(params: &TrainingParameters) -> String {
    format!(
        "python -m {} --model {} --train --data {} --iters {} --steps-per-eval {} --val-batches {} --learning-rate {} --rank {} --alpha {} --batch-size {}",
        TRAINER_MODULE,
        MODEL_PLACEHOLDER,
        DATA_FILE,
        params.iterations,
        STEPS_PER_EVAL,
        VAL_BATCHES,
        params.learning_rate,
        params.rank,
        params.alpha,
        params.batch_size,
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> TrainingParameters {
        TrainingParameters {
            learning_rate: "5e-5".to_string(),
            rank: 16,
            alpha: 32,
            iterations: 600,
            batch_size: 16,
        }
    }

    #[test]
    fn standard_parameters_produce_reference_command() {
        assert_eq!(
            generate_command(&standard()),
            "python -m mlx_lm.lora --model selected_model --train --data train_data.jsonl --iters 600 --steps-per-eval 200 --val-batches 25 --learning-rate 5e-5 --rank 16 --alpha 32 --batch-size 16"
        );
    }

    #[test]
    fn learning_rate_is_not_normalized() {
        let mut params = standard();
        params.learning_rate = "0.00005".to_string();
        assert!(generate_command(&params).contains("--learning-rate 0.00005 "));
    }

    #[test]
    fn command_is_single_line() {
        assert!(!generate_command(&standard()).contains('\n'));
    }
}

//! # Wizard Flow Tests (W0-W3)
//!
//! End-to-end walks through the orchestration engine.
//!
//! ## Tiers
//! - W0: Empty Session
//! - W1: Gating
//! - W2: Status Progression
//! - W3: Navigation and Overwrite

use loraprep_core::{
    DataMethod, DataProcessor, FixedDataProcessor, FixedSystemChecker, PresetKind,
    ProcessedDataResult, Session, Severity, SourceFileRef, StageId, StagePayload, SystemChecker,
    find_model, generate_command, preset,
};

fn book_payload(entries: u64) -> StagePayload {
    StagePayload::DataProcessing(ProcessedDataResult::new(
        DataMethod::Book,
        SourceFileRef::new("book.txt"),
        entries,
    ))
}

// =============================================================================
// TIER W0: EMPTY SESSION
// =============================================================================

mod w0_empty_session {
    use super::*;

    /// W0.1: A new session reports "Checking System" at stage 0.
    #[test]
    fn starts_checking_system() {
        let session = Session::new();
        let status = session.status();

        assert_eq!(session.active_index(), 0);
        assert_eq!(status.label, "Checking System");
        assert_eq!(status.severity, Severity::Neutral);
    }

    /// W0.2: Only stage 0 is enterable.
    #[test]
    fn only_first_stage_enterable() {
        let session = Session::new();
        assert!(session.can_enter(0));
        for k in 1..4 {
            assert!(!session.can_enter(k), "stage {} should be gated", k);
        }
    }
}

// =============================================================================
// TIER W1: GATING
// =============================================================================

mod w1_gating {
    use super::*;

    /// W1.1: A passing system check opens stage 1.
    #[test]
    fn system_ready_opens_model_selection() {
        let mut session = Session::new();
        let report = FixedSystemChecker::passing().run_checks();
        session.apply_system_report(&report);

        assert!(session.can_enter(1));
        assert_eq!(session.status().label, "Selecting Model");
    }

    /// W1.2: A failing system check keeps stage 1 closed.
    #[test]
    fn failed_check_blocks() {
        let mut session = Session::new();
        let report = FixedSystemChecker::failing("Available RAM (>=8GB)").run_checks();
        session.apply_system_report(&report);

        assert!(!session.can_enter(1));
        assert_eq!(session.status().label, "Checking System");
    }

    /// W1.3: Gating looks only at the immediate predecessor.
    #[test]
    fn single_predecessor_gating() {
        let mut session = Session::new();
        session.report_completion(StagePayload::SystemCheck(true));
        session.report_completion(book_payload(10));

        // Stage 2 is gated on stage 1 even though stage 2's own slot is set
        assert!(!session.can_enter(2));
        // Stage 3 is open because stage 2 is complete, despite stage 1 missing
        assert!(session.can_enter(3));
    }
}

// =============================================================================
// TIER W2: STATUS PROGRESSION
// =============================================================================

mod w2_status_progression {
    use super::*;

    /// W2.1: Model then data yields "Configuring", with stage 2 open in between.
    #[test]
    fn model_then_data_is_configuring() {
        let mut session = Session::new();
        let phi3 = find_model("phi3").expect("phi3").clone();

        session
            .report_completion_at(1, StagePayload::ModelSelection(phi3))
            .expect("stage 1 completion");
        assert!(session.can_enter(2));

        session
            .report_completion_at(2, book_payload(150))
            .expect("stage 2 completion");
        assert_eq!(session.status().label, "Configuring");
    }

    /// W2.2: The full happy path ends "Ready to Train" with the standard command.
    #[test]
    fn full_run_is_ready_to_train() {
        let mut session = Session::new();

        session.apply_system_report(&FixedSystemChecker::passing().run_checks());
        session.advance();
        assert!(session.can_proceed());

        session.select_model("gemma").expect("gemma");
        session.advance();
        assert!(session.can_proceed());

        let result = FixedDataProcessor::new(321)
            .process(&SourceFileRef::new("qa.json"), DataMethod::Structured)
            .expect("process");
        session.report_completion(StagePayload::DataProcessing(result));
        session.advance();
        assert!(session.can_proceed());

        let config = session.save_training_config();
        let status = session.status();

        assert_eq!(status.label, "Ready to Train");
        assert_eq!(status.severity, Severity::Success);
        assert_eq!(config.preset, PresetKind::Standard);
        assert_eq!(
            config.command,
            "python -m mlx_lm.lora --model selected_model --train --data train_data.jsonl --iters 600 --steps-per-eval 200 --val-batches 25 --learning-rate 5e-5 --rank 16 --alpha 32 --batch-size 16"
        );
    }

    /// W2.3: The saved command equals the generator applied to the saved params.
    #[test]
    fn saved_command_matches_generator() {
        let mut session = Session::new();
        session.draft_mut().select_preset(PresetKind::Intensive);
        let config = session.save_training_config();

        assert_eq!(config.command, generate_command(&config.params));
        assert_eq!(
            config.params,
            preset(PresetKind::Intensive).expect("intensive").params()
        );
    }
}

// =============================================================================
// TIER W3: NAVIGATION AND OVERWRITE
// =============================================================================

mod w3_navigation {
    use super::*;

    /// W3.1: Backward navigation keeps every slot.
    #[test]
    fn retreat_keeps_slots() {
        let mut session = Session::new();
        session.report_completion(StagePayload::SystemCheck(true));
        session.advance();
        session.select_model("llama").expect("llama");
        session.advance();
        session.report_completion(book_payload(200));

        let before = session.store().clone();
        session.retreat();
        session.retreat();
        session.advance();
        session.advance();

        assert_eq!(session.active(), StageId::DataProcessing);
        assert_eq!(session.store(), &before);
    }

    /// W3.2: A late collaborator result overwrites the slot after navigation.
    #[test]
    fn late_result_overwrites() {
        let mut session = Session::new();
        session.report_completion(book_payload(100));
        session.retreat();
        session.report_completion(book_payload(400));

        assert_eq!(
            session.store().data().map(|d| d.entries_generated),
            Some(400)
        );
    }

    /// W3.3: Re-running the system check can revoke readiness.
    #[test]
    fn redo_system_check_revokes() {
        let mut session = Session::new();
        session.report_completion(StagePayload::SystemCheck(true));
        assert!(session.can_enter(1));

        session.report_completion(StagePayload::SystemCheck(false));
        assert!(!session.can_enter(1));
    }
}

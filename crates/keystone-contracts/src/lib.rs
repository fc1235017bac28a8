//! # keystone-contracts
//!
//! Shared types for the keystone resource composers.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, small pure helpers, and error types.

pub mod agent;
pub mod error;
pub mod identity;
pub mod policy;
pub mod resource;

#[cfg(test)]
mod tests {
    use super::*;
    use agent::{CapabilityGroup, OverrideFields, OverridePayload, PromptConfiguration, PromptStage};
    use error::KeystoneError;
    use identity::ResourceIdentity;
    use policy::{Condition, Effect, PolicyDocument, PolicyStatement, Principal};

    fn prod_identity() -> ResourceIdentity {
        ResourceIdentity {
            stage: "prod".to_string(),
            account: "123456789012".to_string(),
            partition: "aws".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    // ── Physical naming ──────────────────────────────────────────────────────

    #[test]
    fn bucket_name_is_lowercased_hyphen_joined() {
        let identity = prod_identity();
        assert_eq!(
            identity.physical_bucket_name("chat-logs"),
            "chat-logs-prod-123456789012"
        );
    }

    #[test]
    fn bucket_name_lowercases_mixed_case_base() {
        let identity = prod_identity();
        assert_eq!(
            identity.physical_bucket_name("Chat-Logs"),
            "chat-logs-prod-123456789012"
        );
    }

    #[test]
    fn bucket_arn_uses_partition_and_physical_name() {
        let identity = prod_identity();
        assert_eq!(
            identity.bucket_arn("chat-logs"),
            "arn:aws:s3:::chat-logs-prod-123456789012"
        );
    }

    // ── Policy conflict detection ────────────────────────────────────────────

    #[test]
    fn unconditioned_allow_deny_overlap_conflicts() {
        let mut doc = PolicyDocument::new();
        doc.push(PolicyStatement::allow(
            vec!["s3:GetObject".to_string()],
            vec!["arn:aws:s3:::b/*".to_string()],
        ));
        doc.push(PolicyStatement::deny(
            vec!["s3:GetObject".to_string()],
            vec!["arn:aws:s3:::b/*".to_string()],
        ));

        match doc.detect_conflicts() {
            Err(KeystoneError::PolicyConflict { reason }) => {
                assert!(reason.contains("no explicit precedence"), "got: {reason}");
            }
            other => panic!("expected PolicyConflict, got {:?}", other),
        }
    }

    #[test]
    fn wildcard_action_overlaps_specific_action() {
        let mut doc = PolicyDocument::new();
        doc.push(PolicyStatement::allow(
            vec!["s3:GetObject".to_string()],
            vec!["arn:aws:s3:::b/*".to_string()],
        ));
        doc.push(PolicyStatement::deny(
            vec!["s3:*".to_string()],
            vec!["arn:aws:s3:::b/*".to_string()],
        ));

        assert!(doc.detect_conflicts().is_err());
    }

    #[test]
    fn conditioned_deny_never_conflicts() {
        // The mandatory insecure-transport DENY coexists with ALLOW grants.
        let mut doc = PolicyDocument::new();
        doc.push(PolicyStatement::allow(
            vec!["s3:GetObject".to_string()],
            vec!["arn:aws:s3:::b/*".to_string()],
        ));
        doc.push(
            PolicyStatement::deny(vec!["s3:*".to_string()], vec!["arn:aws:s3:::b/*".to_string()])
                .with_principal(Principal::Any)
                .with_condition(Condition::BoolEquals {
                    key: "aws:SecureTransport".to_string(),
                    value: false,
                }),
        );

        assert!(doc.detect_conflicts().is_ok());
    }

    #[test]
    fn disjoint_actions_do_not_conflict() {
        let mut doc = PolicyDocument::new();
        doc.push(PolicyStatement::allow(
            vec!["s3:GetObject".to_string()],
            vec!["arn:aws:s3:::b/*".to_string()],
        ));
        doc.push(PolicyStatement::deny(
            vec!["kms:Decrypt".to_string()],
            vec!["arn:aws:s3:::b/*".to_string()],
        ));

        assert!(doc.detect_conflicts().is_ok());
    }

    #[test]
    fn duplicate_sids_are_two_statements() {
        let mut doc = PolicyDocument::new();
        let stmt = PolicyStatement::allow(
            vec!["s3:GetObject".to_string()],
            vec!["arn:aws:s3:::b/*".to_string()],
        )
        .with_sid("SameSid");
        doc.push(stmt.clone());
        doc.push(stmt);

        // Documents are ordered lists, not sid-keyed maps.
        assert_eq!(doc.statements.len(), 2);
    }

    // ── Prompt stages ────────────────────────────────────────────────────────

    #[test]
    fn stage_order_is_fixed() {
        assert_eq!(
            PromptStage::ALL,
            [
                PromptStage::PreProcessing,
                PromptStage::Orchestration,
                PromptStage::KnowledgeBaseResponseGeneration,
                PromptStage::PostProcessing,
            ]
        );
    }

    #[test]
    fn disabled_stage_marker_serializes_without_payload_fields() {
        let marker = PromptConfiguration {
            prompt_type: PromptStage::Orchestration,
            payload: None,
        };
        let json = serde_json::to_value(&marker).unwrap();

        assert_eq!(json["prompt_type"], "ORCHESTRATION");
        assert!(json.get("prompt_state").is_none());
        assert!(json.get("prompt_creation_mode").is_none());
    }

    #[test]
    fn enabled_stage_with_no_fields_omits_sampling_parameters() {
        // Round-trip from spec: ENABLED with no fields emits the state and
        // creation mode with all sampling fields absent, not zeroed.
        let entry = PromptConfiguration {
            prompt_type: PromptStage::PreProcessing,
            payload: Some(OverridePayload::from_fields(&OverrideFields::default())),
        };
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["prompt_state"], "ENABLED");
        assert_eq!(json["prompt_creation_mode"], "OVERRIDDEN");
        let inference = &json["inference_configuration"];
        assert!(inference.get("temperature").is_none());
        assert!(inference.get("maximum_length").is_none());
        assert!(inference.get("top_p").is_none());
        assert!(inference.get("top_k").is_none());
    }

    #[test]
    fn enabled_stage_emits_supplied_fields_verbatim() {
        let fields = OverrideFields {
            base_prompt_template: Some("You are a helpful assistant.".to_string()),
            stop_sequences: vec!["Human:".to_string()],
            maximum_length: Some(2048),
            temperature: Some(0.0),
            top_p: None,
            top_k: Some(250),
        };
        let json = serde_json::to_value(OverridePayload::from_fields(&fields)).unwrap();

        // A caller-supplied zero is preserved, not dropped as falsy.
        assert_eq!(json["inference_configuration"]["temperature"], 0.0);
        assert_eq!(json["inference_configuration"]["maximum_length"], 2048);
        assert!(json["inference_configuration"].get("top_p").is_none());
    }

    // ── Capability groups ────────────────────────────────────────────────────

    #[test]
    fn synthetic_user_input_group_is_recognized() {
        let group = CapabilityGroup::user_input();
        assert!(group.is_user_input());
        assert_eq!(group.name, "UserInput");
        assert!(group.executor.is_none());
    }

    #[test]
    fn handler_group_is_not_user_input() {
        let group = CapabilityGroup::handler("OrderLookup", identity::LogicalId::new("OrderFn"));
        assert!(!group.is_user_input());
        assert_eq!(group.executor, Some(identity::LogicalId::new("OrderFn")));
    }

    // ── Effect serde ─────────────────────────────────────────────────────────

    #[test]
    fn effect_serializes_as_allow_deny() {
        assert_eq!(serde_json::to_value(Effect::Allow).unwrap(), "Allow");
        assert_eq!(serde_json::to_value(Effect::Deny).unwrap(), "Deny");
    }

    // ── Error display ────────────────────────────────────────────────────────

    #[test]
    fn error_configuration_display() {
        let err = KeystoneError::configuration("empty service principal");
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("empty service principal"));
    }

    #[test]
    fn error_dependency_order_display() {
        let err = KeystoneError::dependency_order("alias references unknown agent");
        let msg = err.to_string();
        assert!(msg.contains("dependency order violation"));
        assert!(msg.contains("unknown agent"));
    }
}

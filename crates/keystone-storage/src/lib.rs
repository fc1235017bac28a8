//! # keystone-storage
//!
//! The storage composer: encrypted, access-blocked buckets.
//!
//! ## Contract
//!
//! Given a base name and a deployment identity, produce one bucket whose
//! physical name is `lowercase(base-stage-account)`. Defaults are
//! provider-managed encryption and retain-on-removal. Every bucket carries a
//! DENY statement blocking all actions from any principal when transport is
//! not secured — mandatory and not configurable.
//!
//! Post-composition operations (valid while the pass is open):
//! - [`grant_read_write`] — idempotent per compute function
//! - [`extend_bucket_policy`] — appends scoped ALLOW statements; mirrors
//!   key-usage grants onto a caller-managed key; never deduplicates by sid

pub mod bucket;

pub use bucket::{compose_bucket, extend_bucket_policy, grant_read_write, BucketConfig, PolicyExtension};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use keystone_contracts::{
        error::KeystoneError,
        identity::{LogicalId, ResourceIdentity},
        policy::{Condition, Effect, ManagedPolicyRef, PolicyDocument, Principal},
        resource::{
            AccessRole, BucketEncryption, ComputeResource, RemovalPolicy, Resource, RuntimeProfile,
        },
    };
    use keystone_core::graph::{FunctionHandle, ResourceGraph, RoleHandle};

    use crate::bucket::{
        compose_bucket, extend_bucket_policy, grant_read_write, BucketConfig, PolicyExtension,
    };

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn prod_identity() -> ResourceIdentity {
        ResourceIdentity {
            stage: "prod".to_string(),
            account: "123456789012".to_string(),
            partition: "aws".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    fn cfg(bucket_name: &str) -> BucketConfig {
        BucketConfig {
            bucket_name: bucket_name.to_string(),
            identity: prod_identity(),
            encryption: None,
            removal_policy: None,
            grantees: Vec::new(),
        }
    }

    /// Seed a function (and its role) so grants have a target.
    fn seed_function(graph: &mut ResourceGraph, name: &str) -> FunctionHandle {
        let role_id = LogicalId::new(format!("{name}ExecutionRole"));
        graph
            .insert(
                role_id.clone(),
                Resource::Role(AccessRole {
                    role_name: role_id.0.clone(),
                    description: format!("Execution role for {name}"),
                    service_principal: "lambda.amazonaws.com".to_string(),
                    managed_policies: vec![ManagedPolicyRef::Aws(
                        "service-role/AWSLambdaBasicExecutionRole".to_string(),
                    )],
                    grants: PolicyDocument::new(),
                }),
            )
            .unwrap();

        let function_id = LogicalId::new(name.to_string());
        graph
            .insert(
                function_id.clone(),
                Resource::Function(ComputeResource {
                    function_name: format!("{name}-Function"),
                    handler: "handler.entry".to_string(),
                    role: role_id,
                    profile: RuntimeProfile {
                        memory_mb: 3008,
                        timeout_seconds: 300,
                        retry_attempts: 2,
                    },
                    environment: Default::default(),
                    reserved_concurrency: None,
                    autoscaling: None,
                }),
            )
            .unwrap();
        FunctionHandle(function_id)
    }

    fn extension(bucket_sid: Option<&str>, key_sid: Option<&str>) -> PolicyExtension {
        PolicyExtension {
            principals: vec![Principal::Arn(
                "arn:aws:iam::123456789012:role/Reader".to_string(),
            )],
            actions: vec!["s3:GetObject".to_string()],
            resources: vec!["arn:aws:s3:::chat-logs-prod-123456789012/*".to_string()],
            bucket_policy_sid: bucket_sid.map(|s| s.to_string()),
            key_policy_sid: key_sid.map(|s| s.to_string()),
        }
    }

    // ── 1. physical naming ────────────────────────────────────────────────────

    #[test]
    fn physical_name_is_lowercased_base_stage_account() {
        let mut graph = ResourceGraph::new();
        let handle = compose_bucket(&cfg("chat-logs"), &mut graph).unwrap();
        let bucket = graph.bucket(&handle).unwrap();

        assert_eq!(bucket.bucket_name, "chat-logs-prod-123456789012");
    }

    // ── 2. mandatory insecure-transport DENY ──────────────────────────────────

    #[test]
    fn every_bucket_carries_the_insecure_transport_deny() {
        let mut graph = ResourceGraph::new();
        let handle = compose_bucket(&cfg("chat-logs"), &mut graph).unwrap();

        // Extensions must not displace the mandatory statement.
        extend_bucket_policy(&mut graph, &handle, &extension(Some("ReaderAccess"), None)).unwrap();

        let bucket = graph.bucket(&handle).unwrap();
        let denies: Vec<_> = bucket
            .resource_policy
            .statements
            .iter()
            .filter(|s| {
                s.effect == Effect::Deny
                    && s.conditions.iter().any(|c| {
                        matches!(c, Condition::BoolEquals { key, value }
                            if key == "aws:SecureTransport" && !value)
                    })
            })
            .collect();

        assert_eq!(denies.len(), 1);
        assert!(denies[0].principals.contains(&Principal::Any));
        assert_eq!(denies[0].actions, vec!["s3:*".to_string()]);
    }

    // ── 3. default resolution ─────────────────────────────────────────────────

    #[test]
    fn unset_options_resolve_to_provider_managed_and_retain() {
        let mut graph = ResourceGraph::new();
        let handle = compose_bucket(&cfg("chat-logs"), &mut graph).unwrap();
        let bucket = graph.bucket(&handle).unwrap();

        assert_eq!(bucket.encryption, BucketEncryption::ProviderManaged);
        assert_eq!(bucket.removal_policy, RemovalPolicy::Retain);
        assert!(bucket.block_public_access);
    }

    #[test]
    fn explicit_options_are_preserved() {
        let mut graph = ResourceGraph::new();
        let mut config = cfg("scratch");
        config.encryption = Some(BucketEncryption::CallerManaged {
            key_ref: "arn:aws:kms:us-east-1:123456789012:key/abc".to_string(),
        });
        config.removal_policy = Some(RemovalPolicy::Destroy);

        let handle = compose_bucket(&config, &mut graph).unwrap();
        let bucket = graph.bucket(&handle).unwrap();

        assert!(matches!(bucket.encryption, BucketEncryption::CallerManaged { .. }));
        assert_eq!(bucket.removal_policy, RemovalPolicy::Destroy);
    }

    // ── 4. read/write grants ──────────────────────────────────────────────────

    #[test]
    fn grant_read_write_lands_on_the_function_role() {
        let mut graph = ResourceGraph::new();
        let function = seed_function(&mut graph, "ChatHandler");
        let bucket = compose_bucket(&cfg("chat-logs"), &mut graph).unwrap();

        grant_read_write(&mut graph, &bucket, &function).unwrap();

        let role = graph
            .role(&RoleHandle(LogicalId::new("ChatHandlerExecutionRole")))
            .unwrap();
        assert_eq!(role.grants.statements.len(), 1);
        let grant = &role.grants.statements[0];
        assert_eq!(grant.effect, Effect::Allow);
        assert!(grant.resources.contains(&"arn:aws:s3:::chat-logs-prod-123456789012".to_string()));
        assert!(grant.actions.iter().any(|a| a == "s3:PutObject*"));
    }

    #[test]
    fn grant_read_write_is_idempotent_per_function() {
        let mut graph = ResourceGraph::new();
        let function = seed_function(&mut graph, "ChatHandler");
        let bucket = compose_bucket(&cfg("chat-logs"), &mut graph).unwrap();

        grant_read_write(&mut graph, &bucket, &function).unwrap();
        grant_read_write(&mut graph, &bucket, &function).unwrap();

        let role = graph
            .role(&RoleHandle(LogicalId::new("ChatHandlerExecutionRole")))
            .unwrap();
        assert_eq!(role.grants.statements.len(), 1);
        assert_eq!(graph.bucket(&bucket).unwrap().grantees.len(), 1);
    }

    #[test]
    fn grant_to_uncomposed_function_is_dependency_order_error() {
        let mut graph = ResourceGraph::new();
        let bucket = compose_bucket(&cfg("chat-logs"), &mut graph).unwrap();

        let ghost = FunctionHandle(LogicalId::new("NeverComposed"));
        let result = grant_read_write(&mut graph, &bucket, &ghost);
        assert!(matches!(result, Err(KeystoneError::DependencyOrder { .. })));
    }

    #[test]
    fn config_grantees_are_granted_during_composition() {
        let mut graph = ResourceGraph::new();
        let function = seed_function(&mut graph, "ChatHandler");
        let mut config = cfg("chat-logs");
        config.grantees = vec![function.clone()];

        let bucket = compose_bucket(&config, &mut graph).unwrap();
        assert!(graph.bucket(&bucket).unwrap().grantees.contains(&function.0));
    }

    // ── 5. policy extension ───────────────────────────────────────────────────

    #[test]
    fn extension_with_same_sid_twice_appends_two_statements() {
        // Documented edge case: the composer does not deduplicate by sid.
        let mut graph = ResourceGraph::new();
        let bucket = compose_bucket(&cfg("chat-logs"), &mut graph).unwrap();

        let ext = extension(Some("ReaderAccess"), None);
        extend_bucket_policy(&mut graph, &bucket, &ext).unwrap();
        extend_bucket_policy(&mut graph, &bucket, &ext).unwrap();

        let bucket_node = graph.bucket(&bucket).unwrap();
        let with_sid: Vec<_> = bucket_node
            .resource_policy
            .statements
            .iter()
            .filter(|s| s.sid.as_deref() == Some("ReaderAccess"))
            .collect();
        assert_eq!(with_sid.len(), 2);
    }

    #[test]
    fn extension_mirrors_key_usage_onto_caller_managed_key() {
        let mut graph = ResourceGraph::new();
        let mut config = cfg("chat-logs");
        config.encryption = Some(BucketEncryption::CallerManaged {
            key_ref: "arn:aws:kms:us-east-1:123456789012:key/abc".to_string(),
        });
        let bucket = compose_bucket(&config, &mut graph).unwrap();

        extend_bucket_policy(&mut graph, &bucket, &extension(Some("Bucket"), Some("Key"))).unwrap();

        let bucket_node = graph.bucket(&bucket).unwrap();
        assert_eq!(bucket_node.key_policy.statements.len(), 1);
        let key_stmt = &bucket_node.key_policy.statements[0];
        assert_eq!(key_stmt.sid.as_deref(), Some("Key"));
        assert_eq!(
            key_stmt.actions,
            vec!["kms:Encrypt", "kms:GenerateDataKey*", "kms:DescribeKey"]
        );
        assert_eq!(key_stmt.resources, vec!["*".to_string()]);
    }

    #[test]
    fn extension_leaves_key_policy_empty_under_provider_managed_encryption() {
        let mut graph = ResourceGraph::new();
        let bucket = compose_bucket(&cfg("chat-logs"), &mut graph).unwrap();

        extend_bucket_policy(&mut graph, &bucket, &extension(Some("Bucket"), Some("Key"))).unwrap();

        assert!(graph.bucket(&bucket).unwrap().key_policy.statements.is_empty());
    }
}

//! Model registry and identifier resolution
//!
//! Static tables mapping model keys to callable identifiers. Certain model
//! families are rejected by Bedrock when invoked by bare model id and must go
//! through an inference profile instead; the resolver front-loads that check
//! so the orchestrator never issues a call doomed to be rejected server-side.

use std::collections::HashMap;

use serde::Serialize;

use super::error::DomainError;

/// Structural prefix of an inference profile ARN
const PROFILE_ARN_PREFIX: &str = "arn:aws:bedrock:";

/// Identifier substrings that mark a model as invocable only through an
/// inference profile. Closed list; matching is by substring, so both the
/// bare and the `us.`-prefixed forms are covered.
const PROFILE_ONLY_MODELS: &[&str] = &[
    // Nova family
    "amazon.nova-premier-v1:0",
    "amazon.nova-lite-v1:0",
    "amazon.nova-pro-v1:0",
    "amazon.nova-micro-v1:0",
    // Claude 3.5 / 3.7
    "anthropic.claude-3-5-sonnet-20240620-v1:0",
    "anthropic.claude-3-7-sonnet-20250219-v1:0",
    // DeepSeek
    "deepseek.r1-v1:0",
];

/// A model as presented to callers: callable identifier, human-readable name,
/// and whether the identifier requires profile routing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: String,
    pub display_name: String,
    pub requires_profile: bool,
}

/// Ordered UI grouping of models
#[derive(Debug, Clone, Serialize)]
pub struct ModelGroup {
    pub name: String,
    pub models: Vec<ModelDescriptor>,
}

/// Static registry of foundation models and inference profiles.
///
/// Built once at startup; read-only thereafter. Profile table order is
/// significant: it is the tie-break when searching for a corresponding or
/// alternate profile.
#[derive(Debug)]
pub struct ModelRegistry {
    foundation: Vec<(&'static str, String)>,
    profiles: Vec<(&'static str, String)>,
    display_names: HashMap<String, String>,
    groups: Vec<(&'static str, Vec<String>)>,
}

impl ModelRegistry {
    /// Build the registry from the built-in tables, rendering profile ARNs
    /// for the deployment's region and account.
    pub fn builtin(region: &str, account_id: &str) -> Self {
        let arn = |suffix: &str| {
            format!("{PROFILE_ARN_PREFIX}{region}:{account_id}:inference-profile/{suffix}")
        };

        let foundation: Vec<(&'static str, String)> = vec![
            ("claude3_sonnet", "anthropic.claude-3-sonnet-20240229-v1:0".to_string()),
            ("claude3_haiku", "anthropic.claude-3-haiku-20240307-v1:0".to_string()),
            ("claude3_opus", "anthropic.claude-3-opus-20240229-v1:0".to_string()),
        ];

        let profiles: Vec<(&'static str, String)> = vec![
            // Claude family
            ("claude3_sonnet_profile", arn("us.anthropic.claude-3-sonnet-20240229-v1:0")),
            ("claude3_opus_profile", arn("us.anthropic.claude-3-opus-20240229-v1:0")),
            ("claude3_haiku_profile", arn("us.anthropic.claude-3-haiku-20240307-v1:0")),
            ("claude3_5_sonnet", arn("us.anthropic.claude-3-5-sonnet-20240620-v1:0")),
            ("claude3_5_sonnet_v2", arn("us.anthropic.claude-3-5-sonnet-20241022-v2:0")),
            ("claude3_5_haiku", arn("us.anthropic.claude-3-5-haiku-20241022-v1:0")),
            ("claude3_7_sonnet", arn("us.anthropic.claude-3-7-sonnet-20250219-v1:0")),
            ("claude4_opus", arn("us.anthropic.claude-opus-4-20250514-v1:0")),
            ("claude4_sonnet", arn("us.anthropic.claude-sonnet-4-20250514-v1:0")),
            // Nova family
            ("nova_premier", arn("us.amazon.nova-premier-v1:0")),
            ("nova_lite", arn("us.amazon.nova-lite-v1:0")),
            ("nova_pro", arn("us.amazon.nova-pro-v1:0")),
            ("nova_micro", arn("us.amazon.nova-micro-v1:0")),
            // Meta Llama family
            ("llama3_1_8b", arn("us.meta.llama3-1-8b-instruct-v1:0")),
            ("llama3_1_70b", arn("us.meta.llama3-1-70b-instruct-v1:0")),
            ("llama3_2_1b", arn("us.meta.llama3-2-1b-instruct-v1:0")),
            ("llama3_2_3b", arn("us.meta.llama3-2-3b-instruct-v1:0")),
            ("llama3_2_11b", arn("us.meta.llama3-2-11b-instruct-v1:0")),
            ("llama3_2_90b", arn("us.meta.llama3-2-90b-instruct-v1:0")),
            ("llama3_3_70b", arn("us.meta.llama3-3-70b-instruct-v1:0")),
            ("llama4_scout_17b", arn("us.meta.llama4-scout-17b-instruct-v1:0")),
            ("llama4_maverick_17b", arn("us.meta.llama4-maverick-17b-instruct-v1:0")),
            // Other models
            ("deepseek_r1", arn("us.deepseek.r1-v1:0")),
            ("mistral_pixtral_large", arn("us.mistral.pixtral-large-2502-v1:0")),
        ];

        let mut registry = Self {
            foundation,
            profiles,
            display_names: HashMap::new(),
            groups: Vec::new(),
        };

        registry.register_display_names();
        registry.register_groups();
        registry
    }

    fn register_display_names(&mut self) {
        let foundation_names = [
            ("claude3_sonnet", "Claude 3 Sonnet"),
            ("claude3_haiku", "Claude 3 Haiku"),
            ("claude3_opus", "Claude 3 Opus"),
        ];
        for (key, name) in foundation_names {
            if let Some(id) = self.foundation_id(key).map(str::to_string) {
                self.display_names.insert(id, name.to_string());
            }
        }

        let profile_names = [
            ("claude3_sonnet_profile", "Claude 3 Sonnet (Inference Profile)"),
            ("claude3_opus_profile", "Claude 3 Opus (Inference Profile)"),
            ("claude3_haiku_profile", "Claude 3 Haiku (Inference Profile)"),
            ("claude3_5_sonnet", "Claude 3.5 Sonnet"),
            ("claude3_5_sonnet_v2", "Claude 3.5 Sonnet v2"),
            ("claude3_5_haiku", "Claude 3.5 Haiku"),
            ("claude3_7_sonnet", "Claude 3.7 Sonnet"),
            ("claude4_opus", "Claude 4 Opus"),
            ("claude4_sonnet", "Claude 4 Sonnet"),
            ("nova_premier", "Nova Premier"),
            ("nova_lite", "Nova Lite"),
            ("nova_pro", "Nova Pro"),
            ("nova_micro", "Nova Micro"),
            ("llama3_1_8b", "Llama 3.1 8B"),
            ("llama3_1_70b", "Llama 3.1 70B"),
            ("llama3_2_1b", "Llama 3.2 1B"),
            ("llama3_2_3b", "Llama 3.2 3B"),
            ("llama3_2_11b", "Llama 3.2 11B"),
            ("llama3_2_90b", "Llama 3.2 90B"),
            ("llama3_3_70b", "Llama 3.3 70B"),
            ("llama4_scout_17b", "Llama 4 Scout 17B"),
            ("llama4_maverick_17b", "Llama 4 Maverick 17B"),
            ("deepseek_r1", "DeepSeek-R1"),
            ("mistral_pixtral_large", "Mistral Pixtral Large"),
        ];
        for (key, name) in profile_names {
            if let Some(arn) = self.profile_arn(key).map(str::to_string) {
                self.display_names.insert(arn, name.to_string());
            }
        }
    }

    fn register_groups(&mut self) {
        let group = |keys: &[&str], registry: &Self| -> Vec<String> {
            keys.iter()
                .filter_map(|k| {
                    registry
                        .foundation_id(k)
                        .or_else(|| registry.profile_arn(k))
                        .map(str::to_string)
                })
                .collect()
        };

        self.groups = vec![
            (
                "Claude 3",
                group(
                    &[
                        "claude3_sonnet",
                        "claude3_haiku",
                        "claude3_opus",
                        "claude3_sonnet_profile",
                        "claude3_opus_profile",
                        "claude3_haiku_profile",
                    ],
                    self,
                ),
            ),
            (
                "Claude 3.5 / 3.7",
                group(
                    &["claude3_5_sonnet", "claude3_5_sonnet_v2", "claude3_5_haiku", "claude3_7_sonnet"],
                    self,
                ),
            ),
            ("Claude 4", group(&["claude4_opus", "claude4_sonnet"], self)),
            (
                "Amazon Nova",
                group(&["nova_premier", "nova_lite", "nova_pro", "nova_micro"], self),
            ),
            (
                "Meta Llama",
                group(
                    &[
                        "llama3_1_8b",
                        "llama3_1_70b",
                        "llama3_2_1b",
                        "llama3_2_3b",
                        "llama3_2_11b",
                        "llama3_2_90b",
                        "llama3_3_70b",
                        "llama4_scout_17b",
                        "llama4_maverick_17b",
                    ],
                    self,
                ),
            ),
            (
                "Other Models",
                group(&["deepseek_r1", "mistral_pixtral_large"], self),
            ),
        ];
    }

    fn foundation_id(&self, key: &str) -> Option<&str> {
        self.foundation
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, id)| id.as_str())
    }

    fn profile_arn(&self, key: &str) -> Option<&str> {
        self.profiles
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, arn)| arn.as_str())
    }

    /// All callable models: directly invocable foundation models first, then
    /// every inference profile, in table order.
    pub fn list_models(&self) -> Vec<ModelDescriptor> {
        let mut models = Vec::new();

        for (_, id) in &self.foundation {
            if !self.requires_inference_profile(id) {
                models.push(self.describe(id));
            }
        }
        for (_, arn) in &self.profiles {
            models.push(self.describe(arn));
        }

        models
    }

    /// Models organized by family group, for UI consumption. Unknown ids are
    /// skipped; empty groups are omitted.
    pub fn list_groups(&self) -> Vec<ModelGroup> {
        self.groups
            .iter()
            .map(|(name, ids)| ModelGroup {
                name: (*name).to_string(),
                models: ids.iter().map(|id| self.describe(id)).collect(),
            })
            .filter(|g| !g.models.is_empty())
            .collect()
    }

    fn describe(&self, id: &str) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            display_name: self.display_name(id),
            requires_profile: !Self::is_inference_profile(id)
                && self.requires_inference_profile(id),
        }
    }

    /// Human-readable name for an identifier. Unknown identifiers echo back
    /// as their own display name; this never fails.
    pub fn display_name(&self, id: &str) -> String {
        self.display_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Syntactic check: does this identifier have the inference profile ARN
    /// shape? No network involved.
    pub fn is_inference_profile(id: &str) -> bool {
        id.starts_with(PROFILE_ARN_PREFIX)
    }

    /// Whether this identifier belongs to a family Bedrock only serves
    /// through inference profiles.
    pub fn requires_inference_profile(&self, id: &str) -> bool {
        PROFILE_ONLY_MODELS.iter().any(|m| id.contains(m))
    }

    /// First profile ARN whose value contains `id` as a substring, in table
    /// order.
    pub fn corresponding_profile(&self, id: &str) -> Option<&str> {
        self.profiles
            .iter()
            .map(|(_, arn)| arn.as_str())
            .find(|arn| arn.contains(id))
    }

    /// Normalize an identifier into its callable form.
    ///
    /// Profile ARNs and models without a profile requirement pass through
    /// unchanged. A profile-only bare id is rewritten to its corresponding
    /// profile ARN, or rejected if none is configured.
    pub fn resolve(&self, id: &str) -> Result<String, DomainError> {
        if Self::is_inference_profile(id) || !self.requires_inference_profile(id) {
            return Ok(id.to_string());
        }

        self.corresponding_profile(id)
            .map(str::to_string)
            .ok_or_else(|| DomainError::unresolvable_model(id))
    }

    /// Profile ARNs in table order, for alternate-candidate search.
    pub fn profile_arns(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|(_, arn)| arn.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ModelRegistry {
        ModelRegistry::builtin("us-east-1", "123456789012")
    }

    #[test]
    fn test_is_inference_profile_syntax_only() {
        assert!(ModelRegistry::is_inference_profile(
            "arn:aws:bedrock:us-east-1:123456789012:inference-profile/us.amazon.nova-pro-v1:0"
        ));
        assert!(!ModelRegistry::is_inference_profile(
            "anthropic.claude-3-sonnet-20240229-v1:0"
        ));
    }

    #[test]
    fn test_resolve_passes_through_direct_models() {
        let registry = registry();
        let id = "anthropic.claude-3-sonnet-20240229-v1:0";
        assert_eq!(registry.resolve(id).unwrap(), id);
    }

    #[test]
    fn test_resolve_passes_through_profile_arns() {
        let registry = registry();
        let arn = registry.profile_arns().next().unwrap().to_string();
        assert_eq!(registry.resolve(&arn).unwrap(), arn);
    }

    #[test]
    fn test_resolve_rewrites_profile_only_models() {
        let registry = registry();
        let resolved = registry.resolve("amazon.nova-pro-v1:0").unwrap();
        assert_ne!(resolved, "amazon.nova-pro-v1:0");
        assert!(ModelRegistry::is_inference_profile(&resolved));
        assert!(resolved.contains("nova-pro"));
    }

    #[test]
    fn test_resolve_never_returns_profile_only_id_unchanged() {
        // Every identifier in the profile-only list either resolves to a
        // distinct profile ARN or fails outright.
        let registry = registry();
        for id in PROFILE_ONLY_MODELS {
            match registry.resolve(id) {
                Ok(resolved) => {
                    assert_ne!(&resolved, id);
                    assert!(ModelRegistry::is_inference_profile(&resolved));
                }
                Err(DomainError::UnresolvableModel { model_id }) => {
                    assert_eq!(&model_id, id);
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_resolve_unknown_profile_only_model_fails() {
        let registry = registry();
        // Profile-only by substring match, but no profile carries this exact id
        let err = registry.resolve("eu.amazon.nova-pro-v1:0").unwrap_err();
        assert!(matches!(err, DomainError::UnresolvableModel { .. }));
        assert!(err.to_string().contains("eu.amazon.nova-pro-v1:0"));
    }

    #[test]
    fn test_display_name_falls_back_to_identifier() {
        let registry = registry();
        assert_eq!(
            registry.display_name("anthropic.claude-3-sonnet-20240229-v1:0"),
            "Claude 3 Sonnet"
        );
        assert_eq!(registry.display_name("mystery.model-v9"), "mystery.model-v9");
    }

    #[test]
    fn test_list_models_excludes_profile_only_foundation_models() {
        let registry = registry();
        let models = registry.list_models();
        assert!(models.iter().all(|m| !m.requires_profile));
        // 3 foundation Claude 3 models + 24 profiles
        assert_eq!(models.len(), 27);
    }

    #[test]
    fn test_profile_table_order_is_stable() {
        let registry = registry();
        let first: Vec<_> = registry.profile_arns().take(3).collect();
        assert!(first[0].contains("claude-3-sonnet"));
        assert!(first[1].contains("claude-3-opus"));
        assert!(first[2].contains("claude-3-haiku"));
    }

    #[test]
    fn test_groups_are_ordered_and_nonempty() {
        let registry = registry();
        let groups = registry.list_groups();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Claude 3",
                "Claude 3.5 / 3.7",
                "Claude 4",
                "Amazon Nova",
                "Meta Llama",
                "Other Models"
            ]
        );
        assert_eq!(groups[3].models.len(), 4);
    }

    #[test]
    fn test_arns_render_region_and_account() {
        let registry = ModelRegistry::builtin("eu-central-1", "999999999999");
        let arn = registry.profile_arns().next().unwrap();
        assert!(arn.starts_with("arn:aws:bedrock:eu-central-1:999999999999:inference-profile/"));
    }
}

//! Generation policy: the read-only configuration of a single run.

use serde::{Deserialize, Serialize};

/// Target client flavor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// `@Injectable()` clients on Angular's `HttpClient` returning RxJS observables.
    #[default]
    Angular,
}

/// How operations are distributed over client classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientGrouping {
    /// `Pets_GetPet` goes to `PetsClient.getPet`; names without `_` go to `Client`.
    #[default]
    OperationId,
    /// The operation's first tag names the client.
    FirstTag,
    /// Every operation goes to a single `Client`.
    Single,
}

/// Options recognized by the emitter. Resolved once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationPolicy {
    /// Target client flavor.
    pub template: Template,
    /// Target TypeScript version; gates nullability and definite-assignment syntax.
    pub typescript_version: f64,
    /// Target RxJS version; selects the stream-combinator call shapes.
    pub rxjs_version: f64,
    /// Put `export` on every top-level declaration.
    pub export_types: bool,
    /// Emit an `I<Name>Client` interface next to each client.
    pub generate_client_interfaces: bool,
    /// Emit DTO classes; otherwise schemas are inlined as structural types.
    pub generate_dto_types: bool,
    /// Treat a `default` response entry as a success branch.
    pub default_response_is_success: bool,
    /// How operations are split into clients.
    pub client_grouping: ClientGrouping,
    /// Fallback base URL used when none is injected.
    pub base_url: String,
    /// Name of the Angular injection token carrying the base URL.
    pub injection_token: String,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            template: Template::Angular,
            typescript_version: 4.3,
            rxjs_version: 7.0,
            export_types: true,
            generate_client_interfaces: false,
            generate_dto_types: true,
            default_response_is_success: false,
            client_grouping: ClientGrouping::OperationId,
            base_url: String::new(),
            injection_token: "API_BASE_URL".to_string(),
        }
    }
}

impl GenerationPolicy {
    /// Default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TypeScript version token.
    pub fn with_typescript_version(mut self, version: f64) -> Self {
        self.typescript_version = version;
        self
    }

    /// Set the RxJS version token.
    pub fn with_rxjs_version(mut self, version: f64) -> Self {
        self.rxjs_version = version;
        self
    }

    /// Toggle `export` modifiers.
    pub fn with_export_types(mut self, export_types: bool) -> Self {
        self.export_types = export_types;
        self
    }

    /// Toggle client interfaces.
    pub fn with_client_interfaces(mut self, enabled: bool) -> Self {
        self.generate_client_interfaces = enabled;
        self
    }

    /// Toggle DTO classes.
    pub fn with_dto_types(mut self, enabled: bool) -> Self {
        self.generate_dto_types = enabled;
        self
    }

    /// Toggle whether `default` responses count as success.
    pub fn with_default_response_is_success(mut self, enabled: bool) -> Self {
        self.default_response_is_success = enabled;
        self
    }

    /// Choose the client grouping.
    pub fn with_client_grouping(mut self, grouping: ClientGrouping) -> Self {
        self.client_grouping = grouping;
        self
    }

    /// Set the fallback base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Rename the base URL injection token.
    pub fn with_injection_token(mut self, token: impl Into<String>) -> Self {
        self.injection_token = token.into();
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = GenerationPolicy::default();
        assert_eq!(policy.template, Template::Angular);
        assert!(policy.export_types);
        assert!(policy.generate_dto_types);
        assert!(!policy.generate_client_interfaces);
        assert_eq!(policy.injection_token, "API_BASE_URL");
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let policy: GenerationPolicy =
            serde_json::from_str(r#"{"rxjs_version": 6.5, "client_grouping": "first_tag"}"#)
                .unwrap();
        assert!((policy.rxjs_version - 6.5).abs() < f64::EPSILON);
        assert_eq!(policy.client_grouping, ClientGrouping::FirstTag);
        assert!((policy.typescript_version - 4.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<GenerationPolicy, _> = serde_json::from_str(r#"{"exportTypes": false}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_setters() {
        let policy = GenerationPolicy::new()
            .with_export_types(false)
            .with_client_interfaces(true)
            .with_rxjs_version(5.5);
        assert!(!policy.export_types);
        assert!(policy.generate_client_interfaces);
        assert!((policy.rxjs_version - 5.5).abs() < f64::EPSILON);
    }
}

use crate::domain::value_objects::enums::cancellation_scopes::CancellationScope;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub click: ClickMerchant,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Clone)]
pub struct ClickMerchant {
    pub secret_key: String,
    pub cancellation_scope: CancellationScope,
}

// Keep the shared secret out of `{:?}` output, the config is logged at startup.
impl std::fmt::Debug for ClickMerchant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickMerchant")
            .field("secret_key", &"<redacted>")
            .field("cancellation_scope", &self.cancellation_scope)
            .finish()
    }
}

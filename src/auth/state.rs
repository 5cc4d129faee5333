//! Authentication state trait and macro.

use crate::db::Database;
use crate::gateway::GatewayClient;

/// Trait for router state types that provide the backends identity
/// resolution needs.
pub trait HasAuthBackend {
    fn gateway(&self) -> &GatewayClient;
    fn db(&self) -> &Database;
}

/// Implement [`HasAuthBackend`] for state structs with the standard
/// `gateway: GatewayClient` and `db: Database` fields.
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn gateway(&self) -> &$crate::gateway::GatewayClient {
                &self.gateway
            }
            fn db(&self) -> &$crate::db::Database {
                &self.db
            }
        }
    };
}

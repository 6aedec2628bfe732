use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::ConfigManager;
use crate::db::client::PostgresDb;
use crate::db::error::DbError;
use crate::registry::Registry;

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Returns the global database handle, constructing it from the loaded
/// settings on first call. A failed construction is not cached; the next
/// caller attempts it again.
pub async fn shared_database() -> Result<Arc<PostgresDb>, DbError> {
    REGISTRY
        .get_or_try_init(|| async {
            let settings = ConfigManager::load_settings();
            PostgresDb::new(&settings).await
        })
        .await
}

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Process-wide set of lazily constructed, shared instances. Each type can
/// hold at most one instance; every caller receives a clone of the same
/// `Arc`.
pub struct Registry {
    instances: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the stored instance of `T`, running `factory` to build it if
    /// this is the first request. Callers racing on the same type serialize
    /// on the registry lock, so the factory runs at most once per stored
    /// instance and nobody can observe a half-built one.
    ///
    /// A factory error propagates to the caller and nothing is cached; the
    /// next call attempts construction again.
    pub async fn get_or_try_init<T, E, F, Fut>(&self, factory: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut instances = self.instances.lock().await;

        if let Some(existing) = instances
            .get(&TypeId::of::<T>())
            .and_then(|instance| instance.clone().downcast::<T>().ok())
        {
            return Ok(existing);
        }

        let instance = Arc::new(factory().await?);
        instances.insert(TypeId::of::<T>(), instance.clone());

        Ok(instance)
    }

    /// Whether an instance of `T` has been constructed and stored.
    pub async fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.instances.lock().await.contains_key(&TypeId::of::<T>())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

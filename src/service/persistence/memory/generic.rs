use async_trait::async_trait;
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::persistence::{PersistableModel, Persistence};

#[derive(Debug)]
pub struct MemoryPersistence<Model>
where
    Model: PersistableModel<Model>,
{
    models: Arc<Mutex<HashMap<String, Model>>>,
}

#[async_trait]
impl<Model> Persistence<Model> for MemoryPersistence<Model>
where
    Model: PersistableModel<Model> + 'static,
{
    async fn upsert(&self, model: &Model) -> anyhow::Result<u64> {
        let mut locked_models = self.get_models_locked()?;

        locked_models.insert(model.get_id(), model.clone());

        Ok(1)
    }

    async fn delete(&self, model_id: &str) -> anyhow::Result<u64> {
        let mut locked_models = self.get_models_locked()?;

        match locked_models.remove(model_id) {
            Some(_) => Ok(1),
            None => Ok(0),
        }
    }

    async fn get_by_id(&self, model_id: &str) -> anyhow::Result<Option<Model>> {
        let locked_models = self.get_models_locked()?;

        Ok(locked_models.get(model_id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Model>> {
        let locked_models = self.get_models_locked()?;

        let models = locked_models.values().cloned().collect();

        Ok(models)
    }
}

impl<Model> Default for MemoryPersistence<Model>
where
    Model: PersistableModel<Model>,
{
    fn default() -> Self {
        Self {
            models: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<Model> MemoryPersistence<Model>
where
    Model: PersistableModel<Model>,
{
    fn get_models_locked(&self) -> anyhow::Result<MutexGuard<HashMap<String, Model>>> {
        match self.models.lock() {
            Ok(locked_models) => Ok(locked_models),
            Err(_) => Err(anyhow::anyhow!("failed to acquire lock")),
        }
    }
}

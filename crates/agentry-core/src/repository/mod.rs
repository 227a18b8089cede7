//! Agent repository over the row store.
//!
//! Wraps the [`AgentStore`] primitives with typed decoding and a
//! process-wide identity cache: for any persisted id there is exactly one
//! live [`Agent`] instance, shared by every caller, so a mutation made
//! through one handle is visible through every other without re-querying.

pub mod codec;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use agentry_storage::{AgentStore, Filter, Order, schema};

use crate::error::{AgentError, Result};
use crate::models::{AgentCollection, AgentId, SharedAgent};
use codec::TAG_PREFIX;

/// Repository of persisted agents.
pub struct AgentRepository {
    store: Arc<dyn AgentStore>,
    tracked: Mutex<HashMap<AgentId, SharedAgent>>,
}

impl AgentRepository {
    pub fn new(store: Arc<dyn AgentStore>) -> Self {
        Self {
            store,
            tracked: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch every agent matching the filter, in the given order.
    ///
    /// Rows are decoded into transient agents and reconciled against the
    /// identity cache: an already-tracked id keeps its existing instance
    /// (refreshed in place from the fetched state); unseen ids enter the
    /// cache. The returned handles are always the canonical ones.
    pub fn all_fit(&self, filter: &Filter, order: &Order) -> Result<AgentCollection> {
        let rows = self.store.query(filter, order)?;

        let mut tracked = self.tracked.lock();
        let mut agents = Vec::with_capacity(rows.len());
        for row in &rows {
            let fetched = codec::decode_row(row)?;
            let id = fetched
                .id()
                .ok_or_else(|| AgentError::Decode("decoded row carries no id".to_string()))?;

            let shared = match tracked.get(&id) {
                Some(existing) => {
                    existing.lock().sync_from(&fetched)?;
                    existing.clone()
                }
                None => {
                    let shared = fetched.into_shared();
                    tracked.insert(id, shared.clone());
                    shared
                }
            };
            agents.push(shared);
        }

        debug!("fetched {} agents", agents.len());
        Ok(AgentCollection::new(agents))
    }

    /// Fetch every agent carrying the given tag.
    ///
    /// The store is asked for rows whose name field contains the encoded
    /// tag line as a substring; that pre-filter is coarse (a tag that is a
    /// prefix of another would also match), so membership is re-checked
    /// against the decoded tag list.
    pub fn all_tagged(&self, tag: &str) -> Result<AgentCollection> {
        if tag.is_empty() {
            return Err(AgentError::Validation(
                "tag must not be an empty string".to_string(),
            ));
        }

        let filter = Filter::new().contains(schema::NAME, format!("{TAG_PREFIX}{tag}"));
        let candidates = self.all_fit(&filter, &Order::new())?;

        Ok(candidates
            .into_iter()
            .filter(|agent| agent.lock().tags().iter().any(|candidate| candidate == tag))
            .collect())
    }

    /// Persist the agent: insert when it has no id yet, update otherwise.
    /// Afterwards the agent is tracked in the identity cache.
    pub fn save(&self, agent: &SharedAgent) -> Result<()> {
        // Bind the id first: a guard held across the match would make the
        // re-lock inside the insert/update paths block forever.
        let current = agent.lock().id();
        let id = match current {
            None => self.insert_agent(agent)?,
            Some(id) => {
                self.update_agent(id, agent)?;
                id
            }
        };

        self.tracked
            .lock()
            .entry(id)
            .or_insert_with(|| agent.clone());
        Ok(())
    }

    /// Delete the agent from the store and drop it from the cache.
    pub fn remove(&self, agent: &SharedAgent) -> Result<()> {
        let id = agent.lock().id().ok_or_else(|| {
            AgentError::Validation("cannot remove an agent that was never persisted".to_string())
        })?;

        if !self.store.delete(id)? {
            return Err(AgentError::Repository(format!(
                "store refused to delete agent [{id}]"
            )));
        }

        self.tracked.lock().remove(&id);
        debug!("removed agent {}", id);
        Ok(())
    }

    fn insert_agent(&self, agent: &SharedAgent) -> Result<AgentId> {
        let mut inner = agent.lock();
        let row = codec::encode_row(&inner);

        let id = self.store.insert(&row)?;
        if id < 1 {
            return Err(AgentError::Repository(format!(
                "store returned unusable id [{id}] for inserted agent"
            )));
        }

        inner.persist_as(id)?;
        debug!("inserted agent {} ({})", id, inner.procedure());
        Ok(id)
    }

    fn update_agent(&self, id: AgentId, agent: &SharedAgent) -> Result<()> {
        let row = codec::encode_row(&agent.lock());

        if !self.store.update(id, &row)? {
            return Err(AgentError::Repository(format!(
                "store refused to update agent [{id}]"
            )));
        }
        Ok(())
    }
}

//! Ordered collection of shared agent handles.

use crate::models::{AgentId, SharedAgent};

/// Result set returned by repository queries. Order follows the store's
/// answer; elements are the repository's canonical shared handles.
#[derive(Debug, Clone, Default)]
pub struct AgentCollection {
    agents: Vec<SharedAgent>,
}

impl AgentCollection {
    pub fn new(agents: Vec<SharedAgent>) -> Self {
        Self { agents }
    }

    /// Ids of the contained agents, in collection order. Agents that were
    /// never persisted are skipped; duplicate ids are kept.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter_map(|agent| agent.lock().id())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedAgent> {
        self.agents.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SharedAgent> {
        self.agents.get(index)
    }
}

impl IntoIterator for AgentCollection {
    type Item = SharedAgent;
    type IntoIter = std::vec::IntoIter<SharedAgent>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.into_iter()
    }
}

impl FromIterator<SharedAgent> for AgentCollection {
    fn from_iter<I: IntoIterator<Item = SharedAgent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::engine::error::EngineError;
use crate::profiles::artifact::GroupProfileSet;

/// Holds the currently published profile set.
///
/// Readers clone the `Arc` and drop the lock before ranking; a publish swaps the
/// pointer in one write, so a request sees either the old set or the new one.
#[derive(Default)]
pub struct ProfileCell {
    current: RwLock<Option<Arc<GroupProfileSet>>>,
}

impl ProfileCell {
    pub fn current(&self) -> Option<Arc<GroupProfileSet>> {
        self.current.read().clone()
    }

    pub fn version(&self) -> Option<String> {
        self.current.read().as_ref().map(|set| set.version.clone())
    }

    /// Validates `set` and makes it the published set. An invalid set leaves
    /// the previous one in place.
    pub fn publish(&self, set: GroupProfileSet) -> Result<Arc<GroupProfileSet>, EngineError> {
        set.validate()?;
        let set = Arc::new(set);
        let previous = self.current.write().replace(Arc::clone(&set));
        info!(
            version = %set.version,
            previous = previous.as_ref().map(|p| p.version.as_str()).unwrap_or("none"),
            profiles = set.profiles.len(),
            "Published profile set"
        );
        Ok(set)
    }
}

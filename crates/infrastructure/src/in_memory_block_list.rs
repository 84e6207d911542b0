use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use clubgate_application::BlockListRepository;
use clubgate_core::AppResult;
use clubgate_domain::IpBlock;

/// In-memory blocked-address set with expiry observed at read time.
#[derive(Debug, Default)]
pub struct InMemoryBlockList {
    blocks: RwLock<HashMap<IpAddr, IpBlock>>,
}

impl InMemoryBlockList {
    /// Creates an empty block list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl BlockListRepository for InMemoryBlockList {
    async fn insert(&self, block: IpBlock) -> AppResult<()> {
        tracing::warn!(
            address = %block.address,
            reason = block.reason.as_str(),
            until = %block.expires_at,
            "address blocked"
        );
        self.blocks.write().await.insert(block.address, block);
        Ok(())
    }

    async fn find_active(&self, address: IpAddr, now: DateTime<Utc>) -> AppResult<Option<IpBlock>> {
        let expired = {
            let blocks = self.blocks.read().await;
            match blocks.get(&address) {
                Some(block) if block.is_active(now) => return Ok(Some(block.clone())),
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            self.blocks.write().await.remove(&address);
        }

        Ok(None)
    }

    async fn remove(&self, address: IpAddr) -> AppResult<bool> {
        let removed = self.blocks.write().await.remove(&address).is_some();
        if removed {
            tracing::info!(address = %address, "address unblocked");
        }

        Ok(removed)
    }

    async fn list_active(&self, now: DateTime<Utc>) -> AppResult<Vec<IpBlock>> {
        let mut blocks = self.blocks.write().await;
        blocks.retain(|_, block| block.is_active(now));

        let mut active: Vec<IpBlock> = blocks.values().cloned().collect();
        active.sort_by_key(|block| block.blocked_at);
        Ok(active)
    }
}

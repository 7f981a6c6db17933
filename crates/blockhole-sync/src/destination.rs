use async_trait::async_trait;
use blockhole_client::{CreateOutcome, DeleteOutcome, InstanceClient};
use blockhole_core::{Blocklist, DomainBlock, FieldSet, Result};

/// An instance whose domain blocks can be read and changed
#[async_trait]
pub trait BlockDestination: Send + Sync {
    /// Host name used in logs and errors
    fn name(&self) -> &str;

    /// Current blocks carrying `fields`, with destination ids attached.
    ///
    /// Attributes outside `fields` are left at their defaults.
    async fn list_blocks(&self, fields: &FieldSet) -> Result<Blocklist>;

    async fn create_block(&self, block: &DomainBlock) -> Result<CreateOutcome>;

    async fn update_block(&self, id: &str, block: &DomainBlock) -> Result<()>;

    async fn delete_block(&self, id: &str) -> Result<DeleteOutcome>;

    /// Number of local accounts following accounts at `domain`
    async fn count_followers(&self, domain: &str) -> Result<u64>;
}

#[async_trait]
impl BlockDestination for InstanceClient {
    fn name(&self) -> &str {
        self.host()
    }

    async fn list_blocks(&self, fields: &FieldSet) -> Result<Blocklist> {
        self.domain_blocks().list_admin(fields).await
    }

    async fn create_block(&self, block: &DomainBlock) -> Result<CreateOutcome> {
        self.domain_blocks().create(block).await
    }

    async fn update_block(&self, id: &str, block: &DomainBlock) -> Result<()> {
        self.domain_blocks().update(id, block).await
    }

    async fn delete_block(&self, id: &str) -> Result<DeleteOutcome> {
        self.domain_blocks().delete(id).await
    }

    async fn count_followers(&self, domain: &str) -> Result<u64> {
        self.measures().instance_follows(domain).await
    }
}

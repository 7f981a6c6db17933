//! Push a merged blocklist to one destination with the fewest calls needed.

use crate::destination::BlockDestination;
use crate::pacing::Pacer;
use blockhole_client::CreateOutcome;
use blockhole_core::{
    BlockField, Blocklist, BlockholeError, DomainBlock, FieldSet, Result, SeverityLevel,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Settings for one destination push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOptions {
    /// Report intended changes without making them
    pub dryrun: bool,
    /// Fields compared against the destination. `id` is added when listing.
    pub import_fields: FieldSet,
    /// Highest severity applied to a domain local accounts follow
    pub max_followed_severity: SeverityLevel,
    /// Private comment used on every block pushed to this destination
    pub override_private_comment: Option<String>,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            dryrun: false,
            import_fields: FieldSet::new(),
            max_followed_severity: SeverityLevel::Silence,
            override_private_comment: None,
        }
    }
}

/// What a push did, or would do, to one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Change {
    Create { block: DomainBlock },
    Update { block: DomainBlock, fields: Vec<String> },
}

impl Change {
    pub fn domain(&self) -> &str {
        match self {
            Self::Create { block } | Self::Update { block, .. } => &block.domain,
        }
    }
}

/// Outcome of pushing a blocklist to one destination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub destination: String,
    pub dryrun: bool,
    /// Changes made, or planned in dry run
    pub changes: Vec<Change>,
    /// Domains already matching the destination
    pub unchanged: usize,
    /// Domains whose severity was held back because local accounts follow them
    pub capped: Vec<String>,
    /// Non-fatal responses from the destination
    pub warnings: Vec<String>,
}

impl PushReport {
    fn new(destination: &str, dryrun: bool) -> Self {
        Self {
            destination: destination.to_string(),
            dryrun,
            ..Self::default()
        }
    }

    pub fn created(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, Change::Create { .. }))
            .count()
    }

    pub fn updated(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, Change::Update { .. }))
            .count()
    }
}

/// Reconciles blocklists against one destination
pub struct Reconciler<'a, D: BlockDestination + ?Sized> {
    destination: &'a D,
    pacer: &'a Pacer,
    options: &'a PushOptions,
}

impl<'a, D: BlockDestination + ?Sized> Reconciler<'a, D> {
    pub const fn new(destination: &'a D, pacer: &'a Pacer, options: &'a PushOptions) -> Self {
        Self {
            destination,
            pacer,
            options,
        }
    }

    /// Bring the destination in line with `blocklist`.
    ///
    /// Existing blocks are only updated in the fields that differ, new domains
    /// are created, and nothing is removed.
    pub async fn push(&self, blocklist: &Blocklist) -> Result<PushReport> {
        let name = self.destination.name();
        info!(
            destination = name,
            dryrun = self.options.dryrun,
            blocks = blocklist.len(),
            "pushing blocklist"
        );

        // Updates resend the whole record, so every attribute is read
        let existing = self.destination.list_blocks(&FieldSet::all()).await?;
        debug!(destination = name, existing = existing.len(), "fetched destination blocks");

        let mut report = PushReport::new(name, self.options.dryrun);
        for incoming in blocklist {
            let incoming = self.with_override(incoming);
            match existing.get(&incoming.domain) {
                Some(current) => self.reconcile_existing(current, incoming, &mut report).await?,
                None => self.create_new(incoming, &mut report).await?,
            }
        }

        info!(
            destination = name,
            created = report.created(),
            updated = report.updated(),
            unchanged = report.unchanged,
            "push complete"
        );
        Ok(report)
    }

    /// Severity to apply to `domain`, held at the followed ceiling when
    /// local accounts follow it.
    pub async fn check_followed_severity(
        &self,
        domain: &str,
        proposed: SeverityLevel,
    ) -> Result<SeverityLevel> {
        let ceiling = self.options.max_followed_severity;
        if proposed <= ceiling {
            return Ok(proposed);
        }

        self.pacer.ready().await;
        let follows = self.destination.count_followers(domain).await?;
        if follows > 0 {
            warn!(
                domain,
                follows,
                proposed = %proposed,
                applied = %ceiling,
                "local accounts follow this domain, limiting severity"
            );
            Ok(ceiling)
        } else {
            Ok(proposed)
        }
    }

    fn with_override(&self, block: &DomainBlock) -> DomainBlock {
        let mut block = block.clone();
        block.id = None;
        if let Some(comment) = &self.options.override_private_comment {
            block.private_comment.clone_from(comment);
        }
        block
    }

    async fn reconcile_existing(
        &self,
        current: &DomainBlock,
        mut incoming: DomainBlock,
        report: &mut PushReport,
    ) -> Result<()> {
        let mut changed = current.compare_fields(&incoming, &self.options.import_fields);

        if changed.contains(&BlockField::Severity) && incoming.severity > current.severity {
            let allowed = self
                .check_followed_severity(&incoming.domain, incoming.severity)
                .await?;
            if allowed != incoming.severity {
                report.capped.push(incoming.domain.clone());
            }
            if allowed == current.severity {
                info!(
                    domain = %incoming.domain,
                    severity = %current.severity,
                    "keeping current severity"
                );
                changed.retain(|&field| field != BlockField::Severity);
            }
            incoming.severity = allowed;
        }

        if changed.is_empty() {
            debug!(domain = %incoming.domain, "block unchanged");
            report.unchanged += 1;
            return Ok(());
        }

        let id = current.id.as_deref().ok_or_else(|| {
            BlockholeError::Parse(format!("destination block for {} has no id", current.domain))
        })?;
        let updated = current.overlaid(&incoming, &changed);
        let fields = changed.iter().map(ToString::to_string).collect::<Vec<_>>();

        if self.options.dryrun {
            info!(
                domain = %updated.domain,
                fields = %fields.join(","),
                "dry run: would update block"
            );
        } else {
            info!(domain = %updated.domain, fields = %fields.join(","), "updating block");
            self.pacer.ready().await;
            self.destination.update_block(id, &updated).await?;
        }

        report.changes.push(Change::Update {
            block: updated,
            fields,
        });
        Ok(())
    }

    async fn create_new(&self, mut block: DomainBlock, report: &mut PushReport) -> Result<()> {
        let allowed = self
            .check_followed_severity(&block.domain, block.severity)
            .await?;
        if allowed != block.severity {
            report.capped.push(block.domain.clone());
            block.severity = allowed;
        }

        if self.options.dryrun {
            info!(domain = %block.domain, severity = %block.severity, "dry run: would add block");
            report.changes.push(Change::Create { block });
            return Ok(());
        }

        info!(domain = %block.domain, severity = %block.severity, "adding block");
        self.pacer.ready().await;
        match self.destination.create_block(&block).await? {
            CreateOutcome::Created(_) => report.changes.push(Change::Create { block }),
            CreateOutcome::StricterBlockExists(message) => {
                report.warnings.push(format!("{}: {message}", block.domain));
            }
        }
        Ok(())
    }
}

/// Push `blocklist` to `destination`, tagging any error with the destination.
pub async fn push_blocklist<D: BlockDestination + ?Sized>(
    destination: &D,
    blocklist: &Blocklist,
    options: &PushOptions,
    pacer: &Pacer,
) -> Result<PushReport> {
    Reconciler::new(destination, pacer, options)
        .push(blocklist)
        .await
        .map_err(|e| e.for_destination(destination.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blockhole_client::DeleteOutcome;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Calls {
        lists: usize,
        creates: usize,
        updates: usize,
        follower_queries: usize,
    }

    #[derive(Default)]
    struct FakeInstance {
        blocks: Mutex<Blocklist>,
        followers: BTreeMap<String, u64>,
        stricter: Vec<String>,
        calls: Mutex<Calls>,
        next_id: Mutex<u32>,
    }

    impl FakeInstance {
        fn with_blocks(blocks: impl IntoIterator<Item = DomainBlock>) -> Self {
            let fake = Self::default();
            for block in blocks {
                fake.store(block);
            }
            fake
        }

        fn store(&self, mut block: DomainBlock) {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            block.id = Some(next_id.to_string());
            self.blocks.lock().unwrap().insert(block);
        }

        fn block(&self, domain: &str) -> DomainBlock {
            self.blocks.lock().unwrap().get(domain).unwrap().clone()
        }

        fn reset_calls(&self) {
            *self.calls.lock().unwrap() = Calls::default();
        }
    }

    #[async_trait]
    impl BlockDestination for FakeInstance {
        fn name(&self) -> &str {
            "fake.example"
        }

        /// Like the admin API parser, only `fields` and `id` are populated
        async fn list_blocks(&self, fields: &FieldSet) -> Result<Blocklist> {
            self.calls.lock().unwrap().lists += 1;
            let fields: Vec<BlockField> = fields.with_id().iter().collect();
            let blocks = self.blocks.lock().unwrap();
            Ok(Blocklist::from_blocks(
                blocks.origin.clone(),
                blocks
                    .iter()
                    .map(|block| DomainBlock::default().overlaid(block, &fields)),
            ))
        }

        async fn create_block(&self, block: &DomainBlock) -> Result<CreateOutcome> {
            self.calls.lock().unwrap().creates += 1;
            if self.stricter.contains(&block.domain) {
                return Ok(CreateOutcome::StricterBlockExists(
                    "A stricter domain block already exists".into(),
                ));
            }
            self.store(block.clone());
            Ok(CreateOutcome::Created(None))
        }

        async fn update_block(&self, id: &str, block: &DomainBlock) -> Result<()> {
            self.calls.lock().unwrap().updates += 1;
            let mut block = block.clone();
            block.id = Some(id.to_string());
            self.blocks.lock().unwrap().insert(block);
            Ok(())
        }

        async fn delete_block(&self, _id: &str) -> Result<DeleteOutcome> {
            Ok(DeleteOutcome::AlreadyAbsent)
        }

        async fn count_followers(&self, domain: &str) -> Result<u64> {
            self.calls.lock().unwrap().follower_queries += 1;
            Ok(self.followers.get(domain).copied().unwrap_or(0))
        }
    }

    fn block(domain: &str, severity: SeverityLevel, comment: &str) -> DomainBlock {
        let mut block = DomainBlock::new(domain, severity);
        block.public_comment = comment.into();
        block
    }

    fn options() -> PushOptions {
        PushOptions {
            import_fields: FieldSet::from_names(["public_comment", "reject_media"]).unwrap(),
            ..PushOptions::default()
        }
    }

    fn merged() -> Blocklist {
        Blocklist::from_blocks(
            "merged",
            [
                block("gab.ai", SeverityLevel::Suspend, "nazis"),
                block("qoto.org", SeverityLevel::Silence, "spam"),
                block("example.org", SeverityLevel::Suspend, "harassment"),
            ],
        )
    }

    #[tokio::test]
    async fn test_second_push_is_a_noop() {
        let fake = FakeInstance::with_blocks([block("gab.ai", SeverityLevel::Silence, "")]);
        let pacer = Pacer::unpaced();
        let options = options();

        let report = push_blocklist(&fake, &merged(), &options, &pacer).await.unwrap();
        assert_eq!(report.created(), 2);
        assert_eq!(report.updated(), 1);
        assert_eq!(fake.block("gab.ai").severity, SeverityLevel::Suspend);
        assert_eq!(fake.block("gab.ai").public_comment, "nazis");

        fake.reset_calls();
        let report = push_blocklist(&fake, &merged(), &options, &pacer).await.unwrap();
        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls.creates, 0);
        assert_eq!(calls.updates, 0);
        assert_eq!(report.unchanged, 3);
        assert!(report.changes.is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_unimported_fields() {
        let mut existing = block("gab.ai", SeverityLevel::Suspend, "old");
        existing.private_comment = "internal note".into();
        existing.reject_reports = true;
        existing.obfuscate = true;
        let fake = FakeInstance::with_blocks([existing]);
        let id = fake.block("gab.ai").id;

        let incoming =
            Blocklist::from_blocks("merged", [block("gab.ai", SeverityLevel::Suspend, "new")]);
        let report = push_blocklist(&fake, &incoming, &options(), &Pacer::unpaced())
            .await
            .unwrap();

        let stored = fake.block("gab.ai");
        assert_eq!(stored.id, id);
        assert_eq!(stored.public_comment, "new");
        assert_eq!(stored.private_comment, "internal note");
        assert!(stored.reject_reports);
        assert!(stored.obfuscate);
        assert!(!stored.reject_media);
        assert!(matches!(
            &report.changes[0],
            Change::Update { fields, .. } if fields == &["public_comment"]
        ));
    }

    #[tokio::test]
    async fn test_destination_calls_are_paced() {
        let fake = FakeInstance::default();
        let pacer = Pacer::new(Duration::from_millis(40));

        let start = Instant::now();
        push_blocklist(&fake, &merged(), &options(), &pacer).await.unwrap();
        let elapsed = start.elapsed();

        // Two follower queries and three creates, the first one unpaced
        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls.follower_queries + calls.creates, 5);
        assert!(elapsed >= Duration::from_millis(150), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_followed_domain_is_capped() {
        let mut fake =
            FakeInstance::with_blocks([block("gab.ai", SeverityLevel::Silence, "nazis")]);
        fake.followers.insert("gab.ai".into(), 4);
        fake.followers.insert("example.org".into(), 1);

        let report = push_blocklist(&fake, &merged(), &options(), &Pacer::unpaced()).await.unwrap();

        // gab.ai stays silenced, so no update is needed
        assert_eq!(fake.block("gab.ai").severity, SeverityLevel::Silence);
        assert_eq!(fake.block("example.org").severity, SeverityLevel::Silence);
        assert_eq!(fake.block("qoto.org").severity, SeverityLevel::Silence);
        assert_eq!(report.updated(), 0);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.capped, ["example.org", "gab.ai"]);
        // qoto.org is only silenced and never needs a follower check
        assert_eq!(fake.calls.lock().unwrap().follower_queries, 2);
    }

    #[tokio::test]
    async fn test_unfollowed_domain_escalates() {
        let fake = FakeInstance::with_blocks([block("gab.ai", SeverityLevel::Silence, "nazis")]);
        let incoming =
            Blocklist::from_blocks("merged", [block("gab.ai", SeverityLevel::Suspend, "nazis")]);

        let report = push_blocklist(&fake, &incoming, &options(), &Pacer::unpaced()).await.unwrap();
        assert_eq!(fake.block("gab.ai").severity, SeverityLevel::Suspend);
        assert!(report.capped.is_empty());
        assert_eq!(fake.calls.lock().unwrap().follower_queries, 1);
    }

    #[tokio::test]
    async fn test_no_query_below_ceiling() {
        let fake = FakeInstance::default();
        let options = PushOptions {
            max_followed_severity: SeverityLevel::Suspend,
            ..options()
        };
        push_blocklist(&fake, &merged(), &options, &Pacer::unpaced()).await.unwrap();
        assert_eq!(fake.calls.lock().unwrap().follower_queries, 0);
        assert_eq!(fake.calls.lock().unwrap().creates, 3);
    }

    #[tokio::test]
    async fn test_dryrun_changes_nothing() {
        let fake = FakeInstance::with_blocks([block("gab.ai", SeverityLevel::Silence, "")]);
        let options = PushOptions {
            dryrun: true,
            ..options()
        };

        let report = push_blocklist(&fake, &merged(), &options, &Pacer::unpaced()).await.unwrap();
        assert!(report.dryrun);
        assert_eq!(report.created(), 2);
        assert_eq!(report.updated(), 1);
        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls.creates, 0);
        assert_eq!(calls.updates, 0);
        drop(calls);
        assert_eq!(fake.block("gab.ai").severity, SeverityLevel::Silence);
    }

    #[tokio::test]
    async fn test_stricter_block_is_a_warning() {
        let fake = FakeInstance {
            stricter: vec!["qoto.org".into()],
            ..FakeInstance::default()
        };
        let report = push_blocklist(&fake, &merged(), &options(), &Pacer::unpaced()).await.unwrap();
        assert_eq!(report.created(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("qoto.org:"));
    }

    #[tokio::test]
    async fn test_private_comment_override() {
        let fake = FakeInstance::default();
        let options = PushOptions {
            import_fields: FieldSet::from_names(["private_comment"]).unwrap(),
            override_private_comment: Some("synced from merged list".into()),
            max_followed_severity: SeverityLevel::Suspend,
            ..PushOptions::default()
        };
        let mut incoming = block("gab.ai", SeverityLevel::Suspend, "");
        incoming.private_comment = "source note".into();
        let list = Blocklist::from_blocks("merged", [incoming]);

        push_blocklist(&fake, &list, &options, &Pacer::unpaced()).await.unwrap();
        assert_eq!(fake.block("gab.ai").private_comment, "synced from merged list");

        fake.reset_calls();
        push_blocklist(&fake, &list, &options, &Pacer::unpaced()).await.unwrap();
        assert_eq!(fake.calls.lock().unwrap().updates, 0);
    }

    #[tokio::test]
    async fn test_errors_name_destination() {
        struct Broken;

        #[async_trait]
        impl BlockDestination for Broken {
            fn name(&self) -> &str {
                "broken.example"
            }
            async fn list_blocks(&self, _: &FieldSet) -> Result<Blocklist> {
                Err(BlockholeError::Http("connection refused".into()))
            }
            async fn create_block(&self, _: &DomainBlock) -> Result<CreateOutcome> {
                unreachable!()
            }
            async fn update_block(&self, _: &str, _: &DomainBlock) -> Result<()> {
                unreachable!()
            }
            async fn delete_block(&self, _: &str) -> Result<DeleteOutcome> {
                unreachable!()
            }
            async fn count_followers(&self, _: &str) -> Result<u64> {
                unreachable!()
            }
        }

        let err = push_blocklist(&Broken, &merged(), &options(), &Pacer::unpaced())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BlockholeError::Destination { ref host, .. } if host == "broken.example"
        ));
    }
}

//! The fetch, merge, filter and push run.

use anyhow::Result;
use blockhole::{
    apply_allowlists, merge_blocklists, parse_blocklist, push_blocklist, BlockAuditList,
    Blocklist, BlockholeError, FieldSet, InstanceClient, MergeOptions, Pacer, PushOptions,
    PushReport, UrlFetcher, DEFAULT_CALL_INTERVAL,
};
use std::time::Duration;
use tracing::{error, info};

use crate::config::{Config, Destination, InstanceSource, UrlSource};
use crate::output;

/// A destination whose push failed
#[derive(Debug)]
pub struct DestinationFailure {
    pub destination: String,
    pub error: BlockholeError,
}

/// Everything a run produced
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Number of source lists merged
    pub sources: usize,
    pub merged: Blocklist,
    pub reports: Vec<PushReport>,
    pub failures: Vec<DestinationFailure>,
}

/// One configured sync run
pub struct Pipeline {
    config: Config,
    fetcher: UrlFetcher,
    import_fields: FieldSet,
    export_fields: FieldSet,
    pacer: Pacer,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let import_fields = FieldSet::from_names(&config.import_fields)?;
        let export_fields = FieldSet::from_names(&config.export_fields)?;
        let interval = match config.api_call_interval_secs {
            Some(secs) => Duration::try_from_secs_f64(secs).map_err(|e| {
                BlockholeError::Config(format!("invalid api_call_interval_secs {secs}: {e}"))
            })?,
            None => DEFAULT_CALL_INTERVAL,
        };

        Ok(Self {
            fetcher: UrlFetcher::new()?,
            pacer: Pacer::new(interval),
            import_fields,
            export_fields,
            config,
        })
    }

    /// Run every configured stage.
    ///
    /// Source failures abort the run. A failed destination is recorded in the
    /// outcome and the remaining destinations are still pushed.
    pub async fn run(&self) -> Result<SyncOutcome> {
        let sources = self.fetch_sources().await?;

        let mut audit = self
            .config
            .blocklist_auditfile
            .as_ref()
            .map(|_| BlockAuditList::new("audit"));
        let options = MergeOptions::new(self.config.mergeplan)
            .threshold(self.config.merge_threshold, self.config.merge_threshold_type);
        let merged = merge_blocklists(&sources, &options, audit.as_mut());

        let allowlists = self.fetch_allowlists().await?;
        let merged = apply_allowlists(merged, &allowlists, &self.config.allow_domains);

        if let Some(path) = &self.config.blocklist_savefile {
            info!(path = %path.display(), blocks = merged.len(), "saving merged blocklist");
            output::save_blocklist(&merged, &self.export_fields, path)?;
        }
        if let (Some(path), Some(audit)) = (&self.config.blocklist_auditfile, &audit) {
            info!(path = %path.display(), domains = audit.len(), "saving merge audit");
            output::save_audit(audit, path)?;
        }

        let mut outcome = SyncOutcome {
            sources: sources.len(),
            ..SyncOutcome::default()
        };
        if self.config.no_push_instance {
            info!("not pushing to instances");
        } else {
            self.push_all(&merged, &mut outcome).await?;
        }
        outcome.merged = merged;
        Ok(outcome)
    }

    async fn fetch_sources(&self) -> Result<Vec<Blocklist>> {
        let mut blocklists = Vec::new();

        if self.config.no_fetch_url {
            info!("not fetching from URLs");
        } else {
            info!(
                sources = self.config.blocklist_url_sources.len(),
                "fetching domain blocks from URLs"
            );
            for source in &self.config.blocklist_url_sources {
                let fields = self.source_fields(&source.import_fields)?;
                let blocklist = self.fetch_url(source, &fields).await?;
                self.save_intermediate(&blocklist)?;
                blocklists.push(blocklist);
            }
        }

        if self.config.no_fetch_instance {
            info!("not fetching from instances");
        } else {
            info!(
                sources = self.config.blocklist_instance_sources.len(),
                "fetching domain blocks from instances"
            );
            for source in &self.config.blocklist_instance_sources {
                let fields = self.source_fields(&source.import_fields)?;
                let blocklist = fetch_instance(source, &fields).await?;
                self.save_intermediate(&blocklist)?;
                blocklists.push(blocklist);
            }
        }

        Ok(blocklists)
    }

    /// Allowlists are read with every field so no column is rejected
    async fn fetch_allowlists(&self) -> Result<Vec<Blocklist>> {
        let mut allowlists = Vec::new();
        for source in &self.config.allowlist_url_sources {
            allowlists.push(self.fetch_url(source, &FieldSet::all()).await?);
        }
        Ok(allowlists)
    }

    async fn fetch_url(&self, source: &UrlSource, fields: &FieldSet) -> Result<Blocklist> {
        let raw = self
            .fetcher
            .fetch(&source.url)
            .await
            .map_err(|e| e.for_source(&source.url))?;
        let blocklist =
            parse_blocklist(&raw, &source.url, source.format, fields, source.max_severity)?;
        info!(url = %source.url, blocks = blocklist.len(), "fetched blocklist");
        Ok(blocklist)
    }

    /// Global import fields plus a source's own, without touching the globals
    fn source_fields(&self, extra: &[String]) -> Result<FieldSet> {
        Ok(self.import_fields.extended(FieldSet::from_names(extra)?.iter()))
    }

    fn save_intermediate(&self, blocklist: &Blocklist) -> Result<()> {
        if self.config.save_intermediate {
            output::save_intermediate(blocklist, &self.export_fields, self.config.savedir())?;
        }
        Ok(())
    }

    async fn push_all(&self, merged: &Blocklist, outcome: &mut SyncOutcome) -> Result<()> {
        info!(
            destinations = self.config.blocklist_instance_destinations.len(),
            dryrun = self.config.dryrun,
            "pushing domain blocks to instances"
        );

        for destination in &self.config.blocklist_instance_destinations {
            let client = InstanceClient::builder(destination.domain.as_str())
                .token(destination.token.as_str())
                .build()?;
            let options = self.push_options(destination);

            match push_blocklist(&client, merged, &options, &self.pacer).await {
                Ok(report) => outcome.reports.push(report),
                Err(error) => {
                    error!(destination = %destination.domain, %error, "push failed");
                    outcome.failures.push(DestinationFailure {
                        destination: destination.domain.clone(),
                        error,
                    });
                }
            }
        }
        Ok(())
    }

    fn push_options(&self, destination: &Destination) -> PushOptions {
        PushOptions {
            dryrun: self.config.dryrun,
            import_fields: self.import_fields.clone(),
            max_followed_severity: destination.max_followed_severity,
            override_private_comment: destination.override_private_comment.clone(),
        }
    }
}

async fn fetch_instance(source: &InstanceSource, fields: &FieldSet) -> Result<Blocklist> {
    let client = InstanceClient::builder(source.domain.as_str())
        .maybe_token(source.token.clone())
        .build()?;
    let blocklist = client
        .domain_blocks()
        .list(source.admin, fields)
        .await
        .map_err(|e| e.for_source(&source.domain))?;

    let origin = blocklist.origin.clone();
    let capped = Blocklist::from_blocks(
        origin,
        blocklist.into_iter().map(|mut block| {
            block.severity = block.severity.min(source.max_severity);
            block
        }),
    );
    info!(domain = %source.domain, blocks = capped.len(), "fetched instance blocklist");
    Ok(capped)
}

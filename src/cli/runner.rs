//! CLI runner, wires parsed arguments to discovery or sync

use crate::auth::Authenticator;
use crate::catalog::{resolve, Catalog};
use crate::cli::commands::Cli;
use crate::config::TapConfig;
use crate::discover::discover;
use crate::error::{Error, Result};
use crate::http::{HelpScoutClient, HttpClientConfig};
use crate::output::StdoutEmitter;
use crate::state::StateStore;
use crate::sync::{self, SyncContext};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the requested mode
    pub async fn run(&self) -> Result<()> {
        let config = TapConfig::from_file(&self.cli.config)?;
        if self.cli.discover {
            Self::discover()
        } else {
            self.sync(config).await
        }
    }

    /// Print the discovered catalog to stdout.
    fn discover() -> Result<()> {
        let catalog = discover()?;
        let json = serde_json::to_string_pretty(&catalog)?;
        println!("{json}");
        Ok(())
    }

    /// Run a sync over the streams the catalog selects.
    async fn sync(&self, config: TapConfig) -> Result<()> {
        let catalog_path = self.cli.catalog.as_ref().ok_or_else(|| {
            Error::catalog("sync mode needs --catalog (run --discover to generate one)")
        })?;
        let catalog = Catalog::from_file(catalog_path)?;
        let selection = resolve(&catalog)?;

        let state = match &self.cli.state {
            Some(path) => StateStore::from_file(path)?,
            None => StateStore::in_memory(),
        };

        let http = HttpClientConfig::builder()
            .user_agent(&config.user_agent)
            .build();
        let authenticator = Authenticator::new(&config, &self.cli.config);
        let client = HelpScoutClient::with_auth(http, authenticator);

        let mut ctx = SyncContext::new(config, client, state, StdoutEmitter::new());
        let summary = sync::sync(&mut ctx, &selection).await?;

        info!(
            streams = summary.streams_synced,
            records = summary.records_emitted,
            "run finished"
        );
        Ok(())
    }
}

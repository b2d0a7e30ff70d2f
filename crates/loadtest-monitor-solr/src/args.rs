//! CLI argument definitions for the Solr monitor.

use crate::count::SolrCount;
use crate::error::SolrCountError;
use clap::Args;
use loadtest_monitor::CommonMonitorArgs;

/// Solr-specific monitor arguments.
#[derive(Args, Clone, Debug)]
pub struct SolrMonitorArgs {
    /// Solr collection URL (e.g., http://localhost:8983/solr/planes)
    #[arg(long, env = "SOLR_URL")]
    pub solr_url: String,

    /// Basic auth username
    #[arg(long, env = "SOLR_USERNAME")]
    pub solr_username: Option<String>,

    /// Basic auth password
    #[arg(long, env = "SOLR_PASSWORD", hide_env_values = true)]
    pub solr_password: Option<String>,

    /// Skip TLS certificate verification (self-signed test clusters)
    #[arg(long)]
    pub solr_accept_invalid_certs: bool,

    #[command(flatten)]
    pub common: CommonMonitorArgs,
}

impl SolrMonitorArgs {
    pub fn count_source(&self) -> Result<SolrCount, SolrCountError> {
        SolrCount::new(
            &self.solr_url,
            self.solr_username.clone(),
            self.solr_password.clone(),
            self.solr_accept_invalid_certs,
        )
    }
}

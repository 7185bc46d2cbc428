//! One module per subcommand.

mod availability;
mod browse;
mod dashboard;
mod donor;
mod request;

use crate::app::App;
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Live donor/request reconciliation with the organ registry
    Dashboard,
    /// Show organ availability
    Availability {
        /// Only organs whose name contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
        /// Submit the search to the organ bank
        #[arg(long, requires = "search")]
        submit: bool,
    },
    /// Register a donor
    RegisterDonor(donor::RegisterDonorArgs),
    /// Send a hospital organ request
    SendRequest(request::SendRequestArgs),
    /// Browse hospital requests page by page
    Requests(browse::BrowseArgs),
}

impl Command {
    pub async fn run(self, app: &App) -> anyhow::Result<()> {
        match self {
            Command::Dashboard => dashboard::run(app).await,
            Command::Availability { search, submit } => {
                availability::run(app, search, submit).await
            }
            Command::RegisterDonor(args) => donor::run(app, args).await,
            Command::SendRequest(args) => request::run(app, args).await,
            Command::Requests(args) => browse::run(app, args).await,
        }
    }
}

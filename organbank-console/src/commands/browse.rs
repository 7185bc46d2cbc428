use crate::app::App;
use crate::render;
use clap::{ArgGroup, Args, ValueEnum};
use organbank_sdk::objects::{RequestFilter, RequestQuery, SortDirection};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SortDirArg {
    Asc,
    #[default]
    Desc,
}

impl From<SortDirArg> for SortDirection {
    fn from(value: SortDirArg) -> Self {
        match value {
            SortDirArg::Asc => SortDirection::Asc,
            SortDirArg::Desc => SortDirection::Desc,
        }
    }
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("filter").args(["hospital", "organ", "status"])))]
pub struct BrowseArgs {
    /// Zero-based page number.
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = organbank_sdk::objects::request::DEFAULT_PAGE_SIZE)]
    size: u32,
    #[arg(long, default_value = "id")]
    sort_by: String,
    #[arg(long, value_enum, default_value_t)]
    sort_dir: SortDirArg,
    /// Only requests from this hospital.
    #[arg(long)]
    hospital: Option<String>,
    /// Only requests for this organ type.
    #[arg(long)]
    organ: Option<String>,
    /// Only requests with this status.
    #[arg(long)]
    status: Option<String>,
}

impl BrowseArgs {
    fn query(self) -> RequestQuery {
        let filter = match (self.hospital, self.organ, self.status) {
            (Some(name), _, _) => Some(RequestFilter::Hospital(name)),
            (_, Some(organ), _) => Some(RequestFilter::Organ(organ)),
            (_, _, Some(status)) => Some(RequestFilter::Status(status)),
            _ => None,
        };
        RequestQuery {
            page: self.page,
            size: self.size,
            sort_by: self.sort_by,
            sort_dir: self.sort_dir.into(),
            filter,
        }
    }
}

/// List one page of hospital requests.
///
/// Paging is a plain HTTP listing and goes straight through the client.
pub async fn run(app: &App, args: BrowseArgs) -> anyhow::Result<()> {
    let query = args.query();
    tracing::debug!(base_url = %app.client.base_url(), ?query, "Browsing requests");
    let page = app.client.browse_requests(&query).await?;
    print!("{}", render::request_page(&page, query.page));
    Ok(())
}

use bookstack_client::{
    ApiError,
    PageContent,
    Tag,
};
use bookstack_monitor_config::{
    version,
    ConfigArgs,
};
use clap::{
    Parser,
    Subcommand,
};

/// Polls a BookStack instance and reports library statistics and connectivity.
#[derive(Parser, Debug, Clone)]
#[command(author, version = version(), about, long_about = None)]
pub struct Cli {
    #[clap(flatten)]
    pub config: ConfigArgs,

    /// Log at debug level unless `RUST_LOG` is set.
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Poll until interrupted and print a report after every cycle. The default.
    Run,

    /// Run a single cycle and print the result.
    Status {
        /// Print JSON instead of tables.
        #[clap(long)]
        json: bool,
    },

    /// Print the redacted configuration and the latest data as JSON.
    Diagnostics,

    /// Create a book and attach it to a shelf.
    CreateBook {
        #[clap(long, value_name = "ID")]
        shelf: u64,

        #[clap(long)]
        name: String,

        #[clap(long, default_value = "")]
        description: String,

        #[clap(flatten)]
        tags: TagArgs,
    },

    /// Create a page in a book, or in one of its chapters.
    CreatePage {
        #[clap(long, value_name = "ID")]
        book: u64,

        #[clap(long, value_name = "ID")]
        chapter: Option<u64>,

        #[clap(long)]
        name: String,

        #[clap(flatten)]
        content: ContentArgs,

        #[clap(flatten)]
        tags: TagArgs,
    },

    /// Append content to an existing page.
    AppendPage {
        #[clap(long, value_name = "ID")]
        page: u64,

        #[clap(flatten)]
        content: ContentArgs,

        #[clap(flatten)]
        tags: TagArgs,
    },
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct ContentArgs {
    #[clap(long, conflicts_with = "markdown")]
    pub html: Option<String>,

    #[clap(long)]
    pub markdown: Option<String>,
}

impl ContentArgs {
    pub fn content(&self) -> Result<PageContent, ApiError> {
        PageContent::from_parts(self.html.clone(), self.markdown.clone())
    }
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct TagArgs {
    /// Tag as `name=value`, may be repeated.
    #[clap(long = "tag", value_name = "NAME=VALUE", value_parser = parse_tag)]
    pub tags: Vec<Tag>,
}

fn parse_tag(raw: &str) -> Result<Tag, String> {
    Tag::parse(raw).map_err(|err| err.to_string())
}

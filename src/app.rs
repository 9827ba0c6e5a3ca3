use crate::{
    args::{
        Cli,
        Command,
    },
    report,
};
use bookstack_client::{
    BookStackClient,
    NewBook,
    NewPage,
    PageAppend,
};
use bookstack_monitor_coordinator::{
    diagnostics,
    Actions,
    CachedResult,
    ConfigSource,
    Coordinator,
    CycleOutcome,
    Scheduler,
    SettingsSource as _,
};
use color_eyre::Result;
use eyre::Context as _;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct App {
    cli: Cli,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> Result<()> {
        let source = ConfigSource::new(self.cli.config.clone());
        match self.cli.command.clone().unwrap_or(Command::Run) {
            Command::Run => run_daemon(source).await,
            Command::Status { json } => {
                let (_, coordinator) = connect_and_poll(&source).await?;
                let cached = coordinator.cached();
                if json {
                    println!("{}", report::json(&cached)?);
                } else {
                    println!("{}", report::render(&cached));
                }
                Ok(())
            }
            Command::Diagnostics => {
                let config = source.config()?;
                let cached = match connect_and_poll(&source).await {
                    Ok((_, coordinator)) => coordinator.cached(),
                    Err(err) => {
                        warn!("Reporting without data: {err:#}");
                        CachedResult::default()
                    }
                };
                println!("{}", serde_json::to_string_pretty(&diagnostics(&config, &cached))?);
                Ok(())
            }
            Command::CreateBook {
                shelf,
                name,
                description,
                tags,
            } => {
                let book = NewBook {
                    shelf_id: shelf,
                    name,
                    description,
                    tags: tags.tags,
                };
                let actions = actions(&source).await?;
                print_created(actions.create_book(book).await.wrap_err("Failed to create book")?)
            }
            Command::CreatePage {
                book,
                chapter,
                name,
                content,
                tags,
            } => {
                let page = NewPage {
                    book_id: book,
                    chapter_id: chapter,
                    name,
                    content: content.content()?,
                    tags: tags.tags,
                };
                let actions = actions(&source).await?;
                print_created(actions.create_page(page).await.wrap_err("Failed to create page")?)
            }
            Command::AppendPage { page, content, tags } => {
                let append = PageAppend {
                    page_id: page,
                    content: content.content()?,
                    tags: tags.tags,
                };
                let actions = actions(&source).await?;
                print_created(actions.append_to_page(append).await.wrap_err("Failed to append to page")?)
            }
        }
    }
}

async fn run_daemon(source: ConfigSource) -> Result<()> {
    let mut scheduler = Scheduler::new(source)?;
    let mut outcomes = scheduler.outcomes();
    let reader = scheduler.subscribe();
    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutting down"),
                Err(err) => error!("Failed to listen for ctrl-c: {err}"),
            }
            cancel.cancel();
        }
    });

    let scheduler = tokio::spawn(scheduler.run(cancel));
    while let Some(outcome) = outcomes.recv().await {
        if let CycleOutcome::Failed(failure) = &outcome {
            error!(%failure, "Cycle failed");
        }
        println!("{}", report::render(&reader.read()));
    }

    scheduler.await.wrap_err("Scheduler task failed")?
}

/// Runs one cycle so the one-shot commands see the current connectivity.
async fn connect_and_poll(source: &ConfigSource) -> Result<(Arc<BookStackClient>, Coordinator)> {
    let settings = source.load()?;
    let client = Arc::new(BookStackClient::new(settings.client.clone()).wrap_err("Failed to create BookStack client")?);
    let mut coordinator = Coordinator::new(client.clone(), settings);
    let outcome = coordinator.run_cycle().await;
    debug!(?outcome, "Initial cycle finished");
    Ok((client, coordinator))
}

async fn actions(source: &ConfigSource) -> Result<Actions> {
    let (client, coordinator) = connect_and_poll(source).await?;
    Ok(Actions::new(client, coordinator.subscribe()))
}

fn print_created(value: Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

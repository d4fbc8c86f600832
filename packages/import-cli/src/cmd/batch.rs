//! Import every link on a listing page.

use anyhow::{anyhow, Result};
use clap::Args;
use console::style;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use job_import::{
    BatchImporter, BatchOutcome, BatchSnapshot, LinkDescriptor, LinkStatus, PersistenceSink,
};

use super::RequestArgs;
use crate::context::{describe, AppContext};

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Listing page with links to import
    pub url: String,

    #[command(flatten)]
    pub request: RequestArgs,
}

pub async fn run(ctx: &AppContext, args: BatchArgs) -> Result<()> {
    let request = args.request.build(&args.url).await?;
    let kind = args.request.kind;
    let importer = BatchImporter::new(
        ctx.extraction_client()?,
        ctx.sink(),
        ctx.config.batch_config(),
    );

    ctx.print_header(&format!("Looking for links on {}", request.url()));
    let links = importer
        .discover(&request)
        .await
        .map_err(|e| anyhow!(describe(&e)))?;

    print_links(&links);
    println!();

    if !ctx.confirm(&format!("Import {} {}s?", links.len(), kind), true)? {
        ctx.print_warning("Nothing imported");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!(
                    "{}",
                    style("Stopping after the current item...").yellow()
                );
                cancel.cancel();
            }
        })
    };

    let mut updates = importer.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(snapshot) => {
                    print_status(&snapshot);
                    if snapshot.is_done() {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = importer.run(&request, links, kind, &cancel).await;
    ctrl_c.abort();
    let summary = match result {
        Ok(summary) => {
            let _ = printer.await;
            summary
        }
        Err(e) => {
            printer.abort();
            return Err(anyhow!(describe(&e)));
        }
    };

    println!();
    match summary.outcome {
        BatchOutcome::Completed => ctx.print_success(&summary.message()),
        BatchOutcome::PartiallyFailed => {
            ctx.print_warning(&summary.message());
            for link in summary
                .snapshot
                .links
                .iter()
                .filter(|l| l.status == LinkStatus::Error)
            {
                println!(
                    "  {} {}: {}",
                    style("✗").red(),
                    link.name,
                    link.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        BatchOutcome::Cancelled => ctx.print_warning(&summary.message()),
    }

    if let Some(delay) = summary.auto_close_after {
        tokio::time::sleep(delay).await;
        let total = importer.sink().count().await?;
        ctx.print_info(&format!(
            "{} entries in {}",
            total,
            ctx.config.store_path.display()
        ));
    }

    Ok(())
}

fn print_links(links: &[LinkDescriptor]) {
    for (i, link) in links.iter().enumerate() {
        let hint = link
            .hint
            .as_deref()
            .map(|h| format!(" [{}]", h))
            .unwrap_or_default();
        println!(
            "{:>4}. {}{} {}",
            i + 1,
            link.name,
            style(hint).magenta(),
            style(&link.url).dim()
        );
    }
}

fn print_status(snapshot: &BatchSnapshot) {
    let current = snapshot
        .links
        .iter()
        .find(|l| l.status == LinkStatus::Importing)
        .map(|l| format!("importing {}", l.name))
        .unwrap_or_default();

    println!(
        "[{:>3}%] {} {} {} {}",
        snapshot.progress,
        style(format!("✓ {}", snapshot.succeeded)).green(),
        style(format!("✗ {}", snapshot.failed)).red(),
        style(remaining_label(snapshot)).dim(),
        current
    );
}

/// Items not yet attempted: still pending during the run, skipped once it ends.
fn remaining_label(snapshot: &BatchSnapshot) -> String {
    let state = if snapshot.is_done() {
        "skipped"
    } else {
        "pending"
    };
    format!("… {} {}", snapshot.skipped(), state)
}

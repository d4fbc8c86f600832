//! Import one page: extract, show, confirm, store.

use anyhow::{anyhow, bail, Result};
use clap::Args;

use job_import::{ClassifierHints, ImportError, PersistenceSink, SingleImport};

use super::RequestArgs;
use crate::context::{describe, AppContext};

#[derive(Args, Debug)]
pub struct SingleArgs {
    /// Page to import
    pub url: String,

    #[command(flatten)]
    pub request: RequestArgs,

    /// Category (jobs) or topic (sessions) to use instead of inferring one
    #[arg(long)]
    pub category: Option<String>,

    /// Region to use instead of resolving it from the location
    #[arg(long)]
    pub region: Option<String>,
}

pub async fn run(ctx: &AppContext, args: SingleArgs) -> Result<()> {
    let request = args.request.build(&args.url).await?;
    let kind = args.request.kind;
    let flow = SingleImport::new(ctx.extraction_client()?, ctx.sink());

    ctx.print_header(&format!("Extracting {} from {}", kind, request.url()));
    let preview = flow
        .preview(request)
        .await
        .map_err(|e| anyhow!(describe(&e)))?;

    println!("{}", preview.render());
    println!();

    if !ctx.confirm(&format!("Import this record as a {}?", kind), true)? {
        preview.reject();
        ctx.print_warning("Nothing imported");
        return Ok(());
    }

    let hints = ClassifierHints {
        category: args.category,
        region: args.region,
    };

    match flow.confirm(preview, kind, &hints).await {
        Ok(entity) => {
            ctx.print_success(&format!(
                "Imported {} \"{}\" ({})",
                entity.kind(),
                entity.title(),
                entity.id()
            ));
            let total = flow.sink().count().await?;
            ctx.print_info(&format!(
                "{} entries in {}",
                total,
                ctx.config.store_path.display()
            ));
            Ok(())
        }
        Err(ImportError::RecordValidation(errors)) => {
            ctx.print_error(&format!("Record rejected ({} problems):", errors.len()));
            for error in errors.errors() {
                eprintln!("  - {}", error);
            }
            bail!("record failed validation")
        }
        Err(e) => Err(anyhow!(describe(&e))),
    }
}

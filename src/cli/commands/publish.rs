//! cli::commands::publish
//!
//! Publish one mod release to the catalog.
//!
//! # Flow
//!
//! 1. Load the manifest from the package directory (absent ⇒ clean exit)
//! 2. Resolve the catalog repository and settings (flags over config)
//! 3. Optionally download the package to hash it
//! 4. `--dry-run`: print the plan and stop
//! 5. Build the GitHub forge and run the [`Publisher`]

use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};

use crate::auth::{StaticTokenProvider, StoredTokenProvider, TokenProvider};
use crate::cli::args::PublishArgs;
use crate::cli::Context;
use crate::core::config::Config;
use crate::forge::github::{host_for_api_base, GitHubForge};
use crate::manifest::{DirectorySource, ManifestSource, ModManifest};
use crate::package;
use crate::publish::{
    ContributorUpdate, PrOutcome, PublishPlan, PublishReport, PublishRequest, PublishSettings,
    Publisher, TokioSleeper,
};
use crate::secrets;
use crate::ui::output::{self, Verbosity};

/// Run the publish command.
pub fn publish(ctx: &Context, args: PublishArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let verbosity = ctx.verbosity();

    let source = DirectorySource::new(&args.package, config.manifest_name());
    let manifest = match source.load()? {
        Some(manifest) => manifest,
        None => {
            output::error(format!("no manifest found: {}", source.describe()));
            return Ok(());
        }
    };
    output::debug(
        format!("loaded manifest {} v{}", manifest.id, manifest.version),
        verbosity,
    );

    let settings = settings(&config, &args)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(publish_async(ctx, &config, settings, args, manifest, verbosity))
}

/// Catalog repository and fork settings, flags taking precedence over config.
fn settings(config: &Config, args: &PublishArgs) -> Result<PublishSettings> {
    let upstream = args
        .upstream
        .clone()
        .or_else(|| config.upstream())
        .ok_or_else(|| {
            anyhow!(
                "No catalog repository configured. \
                 Pass --upstream OWNER/REPO or set [upstream] in the config file."
            )
        })?;

    let mut settings = PublishSettings::from_config(config, upstream);
    if let Some(org) = &args.fork_org {
        settings.fork_organization = Some(org.clone());
    }
    Ok(settings)
}

async fn publish_async(
    ctx: &Context,
    config: &Config,
    settings: PublishSettings,
    args: PublishArgs,
    manifest: ModManifest,
    verbosity: Verbosity,
) -> Result<()> {
    let hash = if args.hash {
        let digest = package::fetch_digest(&reqwest::Client::new(), &args.download_url).await?;
        output::stage(
            "package",
            format!("sha256 {} ({} bytes)", digest.sha256, digest.size),
            verbosity,
        );
        Some(digest.sha256)
    } else {
        None
    };

    let request = PublishRequest {
        manifest,
        download_url: args.download_url.clone(),
        source_url: args.source.clone(),
        funding: args.funding.clone(),
        website: args.website.clone(),
        hash,
    };

    if args.dry_run {
        let plan = PublishPlan::build(&request, &settings, None)?;
        print_plan(&plan, &settings);
        return Ok(());
    }

    let forge = GitHubForge::with_api_base(token_provider(config, &args)?, config.api_base());
    let publisher = Publisher::new(&forge, &TokioSleeper, settings, verbosity);
    let report = publisher.run(&request).await?;

    print_report(&report, verbosity);

    if args.open {
        let url = &report.pull_request.pull_request().url;
        if let Err(e) = open::that(url) {
            output::warn(format!("could not open {}: {}", url, e), verbosity);
        }
    } else if ctx.quiet {
        // Scripts get the URL even in quiet mode
        println!("{}", report.pull_request.pull_request().url);
    }

    Ok(())
}

/// `--token` for this run, else the environment variable, else the secret store.
fn token_provider(config: &Config, args: &PublishArgs) -> Result<Arc<dyn TokenProvider>> {
    let host = host_for_api_base(config.api_base());
    if let Some(token) = &args.token {
        return Ok(Arc::new(StaticTokenProvider::new(host, token.trim())));
    }

    let store = secrets::create_store(config.secrets_provider())
        .context("Failed to initialize secret store")?;
    Ok(Arc::new(StoredTokenProvider::new(host, store)))
}

fn print_plan(plan: &PublishPlan, settings: &PublishSettings) {
    println!("Dry run: nothing will be sent to {}.", settings.upstream);
    println!();
    println!("Branch:  {}", plan.branch);
    println!("Path:    {}", plan.entry_path);
    match &plan.contributor {
        Some(c) => println!("Contributor: {} ({})", c, settings.blacklist_path),
        None => println!("Contributor: (none)"),
    }
    println!();
    println!("Pull request title: {}", plan.pr.title);
    println!();
    println!("--- commit message ---");
    println!("{}", plan.commit_message);
    println!("--- {} ---", plan.entry_path);
    print!("{}", plan.entry_json);
}

fn print_report(report: &PublishReport, verbosity: Verbosity) {
    let contributor = match &report.contributor {
        ContributorUpdate::Skipped => "not updated",
        ContributorUpdate::ListedUpstream => "already listed upstream",
        ContributorUpdate::ListedOnBranch => "already listed on branch",
        ContributorUpdate::Appended(_) => "appended",
    };
    output::print(
        format!(
            "Published {} on {}:{} (contributor list {}).",
            report.entry.path, report.fork, report.branch.name, contributor
        ),
        verbosity,
    );

    match &report.pull_request {
        PrOutcome::Created(pr) => {
            output::print(format!("Opened pull request #{}: {}", pr.number, pr.url), verbosity)
        }
        PrOutcome::Commented { pull_request, .. } => output::print(
            format!(
                "Updated pull request #{}: {}",
                pull_request.number, pull_request.url
            ),
            verbosity,
        ),
    }
}

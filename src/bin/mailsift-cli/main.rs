use std::io::{self, BufRead};

use anyhow::{Context, Result};
use clap::CommandFactory;
use tracing_subscriber::EnvFilter;

use mailsift::{Classifier, SmtpProber, filter_file, public_resolver};

mod args;
mod output;

use args::{Cli, Commands, OutputFormat};
use output::{Classified, print_classified, print_summary};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Filter {
        input,
        out,
        resume,
        interval,
        checkpoint_dir,
    }) = &cli.cmd
    {
        let mut config = mailsift::FilterConfig::new(cli.sender.clone());
        config.probe_enabled = cli.probe;
        config.resume = *resume;
        config.checkpoint_interval = *interval;
        let summary = filter_file(input, out.as_deref(), checkpoint_dir, &config)
            .with_context(|| format!("filtering {} failed", input.display()))?;
        print_summary(&summary, cli.format)?;
        return Ok(());
    }

    let mut results: Vec<Classified> = Vec::new();
    if cli.stdin {
        let classifier = live_classifier(&cli)?;
        for line in io::stdin().lock().lines() {
            let address = line.context("read stdin")?;
            let address = address.trim().to_string();
            if address.is_empty() {
                continue;
            }
            let outcome = classifier.classify(&address);
            results.push(Classified { address, outcome });
        }
    } else if let Some(Commands::Validate { email }) = &cli.cmd {
        let classifier = live_classifier(&cli)?;
        results.push(Classified {
            address: email.trim().to_string(),
            outcome: classifier.classify(email.trim()),
        });
    } else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    print_classified(&results, cli.format)?;

    // 0 all deliverable, 2 otherwise; fatal errors exit 1 through anyhow.
    if results.iter().any(|r| !r.outcome.is_deliverable()) {
        std::process::exit(2);
    }
    Ok(())
}

fn live_classifier(
    cli: &Cli,
) -> Result<Classifier<trust_dns_resolver::Resolver, SmtpProber>> {
    let resolver = public_resolver().context("DNS resolver initialization failed")?;
    Ok(Classifier::new(
        resolver,
        SmtpProber::default(),
        cli.sender.clone(),
        cli.probe,
    ))
}

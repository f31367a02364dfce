use anyhow::Result;
use clap::Parser;
use dotnet_bump::{
    arguments::Arguments, bump_all, projects::UpdateReport, resolve_targets, version::VersionPart,
};
use log::{LevelFilter, info};

fn main() -> Result<()> {
    let args = Arguments::parse();
    pretty_env_logger::env_logger::builder()
        .filter_level(if args.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .format_timestamp(None)
        .init();

    if !args.should_run() {
        info!(
            "Configuration {:?} does not match target {:?}, skipping",
            args.configuration.as_deref().unwrap_or_default(),
            args.target_configuration.as_deref().unwrap_or_default()
        );
        return Ok(());
    }

    let part = VersionPart::from(args.part);
    let targets = resolve_targets(&args.path)?;

    match bump_all(&targets, part, args.suffix.as_deref()) {
        Ok(reports) => {
            log_reports(&reports);
            Ok(())
        }
        Err(error) => {
            log_reports(&error.completed);
            Err(error.into())
        }
    }
}

fn log_reports(reports: &[UpdateReport]) {
    let mut updated = 0;
    for report in reports {
        if report.is_unchanged() {
            info!("No version found in {}, left unchanged", report.path.display());
            continue;
        }
        info!("{}:", report.path.display());
        for change in &report.changes {
            info!("  {}", change);
        }
        updated += 1;
    }

    info!("Updated {} project file(s)", updated);
}

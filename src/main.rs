use clap::Parser;
use std::error::Error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = tvtscrape::cli::Args::parse();
    init_logging(args.verbose, args.quiet);
    if let Err(e) = tvtscrape::cli::run(&args).await {
        eprintln!("{}", e);
        if args.verbose > 0 {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tvtscrape=info,warn"),
            1 => EnvFilter::new("tvtscrape=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

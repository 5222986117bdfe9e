use std::env;

fn print_usage() {
    eprintln!("Usage: pod [OPTIONS] [output-dir]");
    eprintln!();
    eprintln!("Downloads every episode from the configured feed into output-dir");
    eprintln!("(default: downloaded_music), embedding the album tag and cover");
    eprintln!("art into each file. Already-complete episodes are skipped.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -h, --help          Show this help");
}

#[tokio::main]
async fn main() -> pod_dl::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        std::process::exit(0);
    }

    let mut config = pod_dl::AppConfig::load()?;
    // First positional argument overrides the output directory.
    if let Some(dir) = args.iter().find(|a| !a.starts_with('-')) {
        config.output_dir = dir.into();
    }

    pod_dl::cli::run(config).await
}

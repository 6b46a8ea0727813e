use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

mod build;
mod commands;
mod config;
mod logging;

#[derive(Parser)]
#[command(version, about = "A static site generator for blogs")]
struct Args {
    /// Show more output (repeat for trace output)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    command: QuillCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the site in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(long)]
    create: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file (default: quill.yaml)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Write the site here instead of `site.output`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also render posts in `_drafts/`
    #[arg(long)]
    drafts: bool,

    /// Keep running and rebuild when files change
    #[arg(short, long)]
    watch: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "4000")]
    port: u16,

    /// Open the site in the default browser
    #[arg(long)]
    open: bool,

    /// The path to the configuration file (default: quill.yaml)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Write the site here instead of `site.output`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also render posts in `_drafts/`
    #[arg(long)]
    drafts: bool,

    /// Whether to watch for changes and rebuild automatically
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    watch: bool,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file (default: quill.yaml)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Print what would be deleted without deleting it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum QuillCommand {
    /// Create a new site with starter layouts and a first post
    Init(InitArgs),

    /// Build the site
    Build(BuildArgs),

    /// Build the site and serve it on a local port
    Serve(ServeArgs),

    /// Delete the output directory
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    logging::init_logging(logging::level_from_flags(args.verbose, args.quiet));

    match args.command {
        QuillCommand::Init(args) => commands::init::run(&args)?,
        QuillCommand::Build(args) => {
            tokio::task::spawn_blocking(move || commands::build::run(&args)).await??
        }
        QuillCommand::Serve(args) => commands::serve::run(&args).await?,
        QuillCommand::Clean(args) => commands::clean::run(&args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let args = Args::parse_from(["quill", "serve", "--watch=false", "-p", "8080", "-v"]);
        assert_eq!(args.verbose, 1);
        match args.command {
            QuillCommand::Serve(serve) => {
                assert!(!serve.watch);
                assert_eq!(serve.port, 8080);
                assert_eq!(serve.bind, "127.0.0.1");
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_build_flags() {
        let args = Args::parse_from(["quill", "-q", "build", "-c", "site/quill.yaml", "--drafts"]);
        assert!(args.quiet);
        match args.command {
            QuillCommand::Build(build) => {
                assert_eq!(build.config_file, Some(PathBuf::from("site/quill.yaml")));
                assert!(build.drafts);
                assert!(!build.watch);
            }
            _ => panic!("expected build"),
        }
    }
}

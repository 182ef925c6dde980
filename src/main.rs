use anyhow::{Context, Result};
use clap::Parser;
use grel::runtime::RealRuntime;
use grel::{Config, Credentials, Release, ReleaseClient, RepoId};
use std::path::PathBuf;

/// grel - GitHub Release uploader
///
/// Create a release and attach files to it, or look up an existing one.
///
/// Examples:
///   grel --repo owner/repo create v1.0.0 -m "First release" dist/app.zip
///   grel --repo owner/repo find v1.0.0
#[derive(Parser, Debug)]
#[command(author, version = env!("GREL_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Account name used for basic authentication (also via GREL_USER)
    #[arg(long, short = 'u', env = "GREL_USER", global = true)]
    user: Option<String>,

    /// Password or personal access token (also via GREL_PASSWORD)
    #[arg(
        long,
        short = 'p',
        env = "GREL_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    password: Option<String>,

    /// The repository in the format "owner/repo" (also via GREL_REPO)
    #[arg(
        long,
        short = 'r',
        env = "GREL_REPO",
        value_name = "OWNER/REPO",
        global = true
    )]
    repo: Option<RepoId>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", env = "GREL_API_URL", value_name = "URL", global = true)]
    api_url: Option<String>,
}

impl Cli {
    /// Global options cannot be `required`, so they are checked here.
    fn credentials(&mut self) -> Result<Credentials> {
        let user = self.user.take().context("Missing --user (or GREL_USER)")?;
        let password = self
            .password
            .take()
            .context("Missing --password (or GREL_PASSWORD)")?;
        let repo = self.repo.take().context("Missing --repo (or GREL_REPO)")?;
        Ok(Credentials::for_repo(user, password, repo))
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create a release and upload files to it
    Create(CreateArgs),

    /// Show the release with the given tag
    Find(FindArgs),

    /// Delete the release with the given tag
    Remove(FindArgs),
}

#[derive(clap::Args, Debug)]
struct CreateArgs {
    /// Tag and name of the new release
    #[arg(value_name = "TAG")]
    tag: String,

    /// Release description
    #[arg(long, short = 'm', default_value = "")]
    message: String,

    /// Files to attach as release assets
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct FindArgs {
    #[arg(value_name = "TAG")]
    tag: String,
}

fn print_release(release: &Release) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(release)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let mut cli = Cli::parse();

    let credentials = cli.credentials()?;
    let client = ReleaseClient::new(Config::new(credentials, cli.api_url)?, RealRuntime);

    match cli.command {
        Commands::Create(args) => {
            let result = client.create(&args.tag, &args.message, &args.files).await;
            // Uploads still running after a failed batch finish before the runtime stops.
            client.wait_for_uploads().await;
            let release =
                result.with_context(|| format!("Failed to create release {}", args.tag))?;
            print_release(&release)?;
        }
        Commands::Find(args) => {
            let release = client
                .find(&args.tag)
                .await
                .with_context(|| format!("Failed to find release {}", args.tag))?;
            print_release(&release)?;
        }
        Commands::Remove(args) => {
            let release = client
                .find(&args.tag)
                .await
                .with_context(|| format!("Failed to find release {}", args.tag))?;
            client
                .remove(&release)
                .await
                .with_context(|| format!("Failed to remove release {}", args.tag))?;
            println!("Removed release {}", release.tag_name);
        }
    }
    Ok(())
}

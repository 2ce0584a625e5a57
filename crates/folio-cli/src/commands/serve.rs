//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_core::files::watcher::WatcherConfig;
use folio_core::media::S3Config;
use folio_web::ServerConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::Stores;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "3030")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory for locally stored images, served under /uploads
    #[arg(long, env = "FOLIO_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Secret required by protected operations
    #[arg(long, env = "API_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Store images in this S3 bucket instead of the upload directory
    #[arg(long, env = "AWS_BUCKET_NAME")]
    pub bucket: Option<String>,

    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// S3-compatible endpoint (path-style addressing)
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Do not watch the task directory for new files
    #[arg(long)]
    pub no_watch: bool,

    /// Task directory poll interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub poll_ms: u64,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file used with --log
    #[arg(long, default_value = "data/serve.log")]
    pub log_file: PathBuf,
}

impl ServeArgs {
    fn s3(&self) -> Result<Option<S3Config>> {
        let Some(bucket) = &self.bucket else {
            return Ok(None);
        };
        let (Some(access_key_id), Some(secret_access_key)) = (&self.access_key_id, &self.secret_access_key) else {
            anyhow::bail!("AWS_BUCKET_NAME is set but AWS credentials are missing");
        };
        Ok(Some(S3Config {
            bucket: bucket.clone(),
            region: self.region.clone(),
            access_key_id: access_key_id.clone(),
            secret_access_key: secret_access_key.clone(),
            endpoint: self.s3_endpoint.clone(),
        }))
    }
}

pub async fn execute(args: ServeArgs, stores: &Stores) -> Result<()> {
    let s3 = args.s3()?;
    let watcher = (!args.no_watch).then(|| WatcherConfig {
        poll_interval: Duration::from_millis(args.poll_ms.max(50)),
        ..WatcherConfig::default()
    });

    let config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        backend: stores.backend.into(),
        db_path: stores.db_path.clone(),
        data_dir: stores.data_dir.clone(),
        task_dir: stores.task_dir.clone(),
        upload_dir: args.upload_dir.clone(),
        password: args.password.clone(),
        s3,
        watcher,
    };

    let images = match &config.s3 {
        Some(s3) => format!("s3://{}", s3.bucket),
        None => config.upload_dir.display().to_string(),
    };

    println!();
    println!("  {} {}", "Folio".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}       http://{}/api", "API".green(), config.address());
    println!("  {}   {:?}", "Backend".green(), stores.backend);
    println!("  {}     {}", "Tasks".green(), config.task_dir.display());
    println!("  {}    {}", "Images".green(), images);
    if config.password.as_deref().map_or(true, str::is_empty) {
        println!("  {}", "No API_PASSWORD set: writes that need a password are refused".yellow());
    }
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    info!(address = %config.address(), backend = ?stores.backend, "Starting server");
    folio_web::run_server(config).await?;

    Ok(())
}

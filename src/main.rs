use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use slurm_sidecar::config::SidecarConfig;
use slurm_sidecar::shutdown::install_shutdown_handler;
use slurm_sidecar::sidecar::Sidecar;

#[derive(Parser, Debug)]
#[command(name = "slurm-sidecar")]
#[command(version)]
#[command(about = "Serves pod status and logs for workloads running as Slurm jobs")]
struct Args {
    /// Port to listen on for the HTTP API
    #[arg(long, default_value = "4000")]
    port: u16,

    /// Directory holding one `<namespace>-<uid>` folder per pod
    #[arg(long, default_value = ".local/interlink/jobs")]
    data_root: PathBuf,

    /// Path to the squeue binary
    #[arg(long, default_value = "/usr/bin/squeue")]
    squeue_path: PathBuf,

    /// Seconds a status result is served from cache before squeue is queried again
    #[arg(long, default_value = "10")]
    status_refresh_secs: u64,

    /// Seconds a single squeue invocation may run before it is killed
    #[arg(long, default_value = "30")]
    command_timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> SidecarConfig {
        let listen_addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        SidecarConfig::new(listen_addr, self.data_root)
            .with_squeue_path(self.squeue_path)
            .with_status_refresh(Duration::from_secs(self.status_refresh_secs))
            .with_command_timeout(Duration::from_secs(self.command_timeout_secs))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = args.into_config();
    let shutdown = install_shutdown_handler();

    Sidecar::new(config).run(shutdown).await?;
    Ok(())
}

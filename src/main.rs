mod chat;
mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use docent_core::CoreError;
use docent_core::bootstrap::{AppBuilder, create_workspace};
use docent_core::config::Config;
use docent_gateway::GatewayServer;
use tokio::sync::watch;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let app = AppBuilder::load(&cli.config)
        .await
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    let config = app.config();

    match cli.command() {
        Command::Serve => serve(&app).await,
        Command::Upload { files } => upload(config, &files).await,
        Command::Files => list_files(config).await,
        Command::Reset => reset(config).await,
        Command::Index => {
            let service = app.build_service(app.build_provider()?);
            let stats = service.rebuild_index().await?;
            println!(
                "Indexed {} document(s): {} chunk(s), dimension {}.",
                stats.documents, stats.chunks, stats.dimension
            );
            Ok(())
        }
        Command::Ask { question, sources } => {
            let service = app.build_service(app.build_provider()?);
            let session = service.create_session().await;
            let answer = service.ask(&session, &question).await?;
            println!("{}", answer.text);
            if sources {
                for chunk in &answer.sources {
                    println!(
                        "\n--- chunk {} (score {:.3}) ---\n{}",
                        chunk.chunk_index, chunk.score, chunk.text
                    );
                }
            }
            Ok(())
        }
        Command::Chat => {
            let service = app.build_service(app.build_provider()?);
            let session = service.create_session().await;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            chat::run(&service, &session, stdin, tokio::io::stdout()).await
        }
    }
}

async fn serve(app: &AppBuilder) -> anyhow::Result<()> {
    let config = app.config();
    let service = Arc::new(app.build_service(app.build_provider()?));
    service.workspace().ensure_dirs().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    tracing::info!(
        model = %config.llm.model,
        embedding_model = %config.llm.embedding_model,
        data_dir = %config.storage.data_dir,
        max_queries = config.session.max_queries,
        "starting docent"
    );

    GatewayServer::new(
        &config.gateway.bind,
        config.gateway.port,
        service,
        shutdown_rx,
    )
    .with_auth(config.gateway.auth_token.clone())
    .with_max_body_size(config.gateway.max_body_size)
    .serve()
    .await?;
    Ok(())
}

async fn upload(config: &Config, files: &[std::path::PathBuf]) -> anyhow::Result<()> {
    let workspace = create_workspace(config);
    let mut failed = 0usize;
    for path in files {
        let name = file_name(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        match workspace.save_upload(name, &bytes).await {
            Ok(_) => println!("uploaded {name}"),
            Err(CoreError::Duplicate(_)) => {
                println!("skipped {name}: a file with this name was already uploaded");
            }
            Err(e @ (CoreError::InvalidName(_) | CoreError::UnsupportedFormat(_))) => {
                eprintln!("skipped {name}: {e}");
                failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    if failed > 0 {
        bail!("{failed} file(s) could not be uploaded");
    }
    Ok(())
}

async fn list_files(config: &Config) -> anyhow::Result<()> {
    let files = create_workspace(config).list_files().await?;
    if files.is_empty() {
        println!("No documents uploaded.");
    }
    for name in files {
        println!("{name}");
    }
    Ok(())
}

async fn reset(config: &Config) -> anyhow::Result<()> {
    let report = create_workspace(config).reset().await?;
    println!(
        "Reset complete (index removed: {}, uploads removed: {}).",
        report.index_removed, report.uploads_removed
    );
    Ok(())
}

fn file_name(path: &Path) -> anyhow::Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_of_path() {
        assert_eq!(file_name(Path::new("/tmp/report.pdf")).unwrap(), "report.pdf");
        assert!(file_name(Path::new("/")).is_err());
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn upload_skips_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = dir.path().join("data").display().to_string();
        config.storage.index_dir = dir.path().join("db").display().to_string();

        let src = dir.path().join("paper.pdf");
        std::fs::write(&src, b"%PDF-1.4").unwrap();

        upload(&config, std::slice::from_ref(&src)).await.unwrap();
        upload(&config, std::slice::from_ref(&src)).await.unwrap();
        let files = create_workspace(&config).list_files().await.unwrap();
        assert_eq!(files, vec!["paper.pdf"]);
    }

    #[tokio::test]
    async fn upload_reports_rejected_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = dir.path().join("data").display().to_string();

        let src = dir.path().join("notes.exe");
        std::fs::write(&src, b"x").unwrap();
        assert!(upload(&config, &[src]).await.is_err());
    }
}

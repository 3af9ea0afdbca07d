use anyhow::{Context, Result};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_postgres::NoTls;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use tripload::{config::LoaderConfig, fetch, process, sink::TableSink};

#[derive(Parser)]
#[command(name = "tripload")]
#[command(about = "Load one month of NYC yellow-cab trip records into Postgres", long_about = None)]
struct Cli {
    /// Postgres username
    #[arg(long, default_value = "root")]
    pg_user: String,

    /// Postgres password
    #[arg(long, default_value = "root")]
    pg_pass: String,

    /// Postgres host
    #[arg(long, default_value = "localhost")]
    pg_host: String,

    /// Postgres port
    #[arg(long, default_value_t = 5432)]
    pg_port: u16,

    /// Postgres database name
    #[arg(long, default_value = "ny_taxi")]
    pg_db: String,

    /// Year of the data file
    #[arg(long, default_value_t = 2021)]
    year: i32,

    /// Month of the data file (1-12)
    #[arg(long, default_value_t = 1)]
    month: u32,

    /// Target table name in Postgres
    #[arg(long, default_value = "yellow_taxi_trips")]
    target_table: String,

    /// Rows per chunk
    #[arg(long, default_value_t = 100_000)]
    chunksize: usize,
}

impl From<Cli> for LoaderConfig {
    fn from(cli: Cli) -> Self {
        Self {
            user: cli.pg_user,
            password: cli.pg_pass,
            host: cli.pg_host,
            port: cli.pg_port,
            database: cli.pg_db,
            year: cli.year,
            month: cli.month,
            table: cli.target_table,
            chunk_size: cli.chunksize,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── init logging ────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cfg = LoaderConfig::from(Cli::parse());
    run(cfg).await
}

async fn run(cfg: LoaderConfig) -> Result<()> {
    // ─── 1) resolve the source ───────────────────────────────────────
    let url = fetch::urls::tripdata_url(cfg.year, cfg.month);
    info!(%url, "loading trip data");

    // ─── 2) connect to postgres ──────────────────────────────────────
    let (client, connection) = tokio_postgres::connect(&cfg.connection_string(), NoTls)
        .await
        .context("connecting to Postgres")?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("connection error: {e}");
        }
    });

    // ─── 3) stream chunks off the wire on the blocking pool ──────────
    // Capacity 1: the reader may decode at most one chunk ahead of the
    // write in flight, so chunks reach the table in arrival order with
    // no further pipelining.
    let (tx, mut rx) = mpsc::channel::<Result<RecordBatch, ArrowError>>(1);
    let chunk_size = cfg.chunk_size;
    let source_url = url.clone();
    let producer = tokio::task::spawn_blocking(move || -> Result<()> {
        let body = fetch::download::open(&source_url)?;
        for batch in process::chunk::trip_chunks(body, chunk_size)? {
            // consumer hung up (a failed write); stop reading
            if tx.blocking_send(batch).is_err() {
                break;
            }
        }
        Ok(())
    });

    // ─── 4) create on first chunk, append in arrival order ───────────
    let mut sink = TableSink::new(client, &cfg.table);
    while let Some(batch) = rx.recv().await {
        let batch = batch.context("decoding CSV chunk")?;
        let rows = sink.write(&batch).await?;
        info!(rows, total = sink.total_rows(), "chunk appended");
    }
    producer.await.context("chunk reader task panicked")??;

    info!(total = sink.total_rows(), table = %cfg.table, "load complete");
    Ok(())
}

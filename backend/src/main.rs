//! Excel-Split CLI
//!
//! ```bash
//! excel-split serve                      # Start HTTP server (port 3000)
//! excel-split serve --no-auth            # ...without login
//! excel-split split students.xlsx        # Write students_cleaned.xlsx
//! excel-split inspect students.csv       # Print the decoded table as JSON
//! ```

use clap::{Parser, Subcommand};
use excel_split::{
    cleaned_path, config::upload_limit, decode_file, process_file, ProcessOptions, ServerConfig,
    DEFAULT_TARGET_COLUMN,
};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "excel-split")]
#[command(about = "Split a spreadsheet's Student column into Name and Student Number", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Accept uploads without a session
        #[arg(long)]
        no_auth: bool,

        /// Upload size limit in megabytes
        #[arg(long)]
        max_upload_mb: Option<usize>,

        /// Header of the column to split
        #[arg(short, long)]
        column: Option<String>,
    },

    /// Split a spreadsheet file offline
    Split {
        /// Input spreadsheet (xlsx, xls, ods or delimited text)
        input: PathBuf,

        /// Output file (default: <input stem>_cleaned.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Header of the column to split
        #[arg(short, long, default_value = DEFAULT_TARGET_COLUMN)]
        column: String,
    },

    /// Print the decoded first sheet as JSON
    Inspect {
        /// Input spreadsheet
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            no_auth,
            max_upload_mb,
            column,
        } => cmd_serve(host, port, no_auth, max_upload_mb, column).await,

        Commands::Split {
            input,
            output,
            column,
        } => cmd_split(&input, output.as_deref(), column),

        Commands::Inspect { input } => cmd_inspect(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(
    host: Option<IpAddr>,
    port: Option<u16>,
    no_auth: bool,
    max_upload_mb: Option<usize>,
    column: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env()?;

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if no_auth {
        config.require_auth = false;
    }
    if let Some(mb) = max_upload_mb {
        config.max_upload_bytes = upload_limit("--max-upload-mb", mb)?;
    }
    if let Some(column) = column {
        config.target_column = column;
    }

    excel_split::server::start_server(config).await
}

fn cmd_split(
    input: &Path,
    output: Option<&Path>,
    column: String,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let output = output.map(Path::to_path_buf).unwrap_or_else(|| cleaned_path(input));
    let options = ProcessOptions {
        target_column: column,
        ..ProcessOptions::default()
    };

    let summary = process_file(input, &output, &options)?;

    eprintln!("   Source:  {}", summary.source);
    eprintln!("   Rows:    {}", summary.row_count);
    eprintln!(
        "   Columns: {} -> {}",
        summary.columns_in, summary.columns_out
    );
    eprintln!("   Split:   {}", summary.report.split);
    if summary.report.unmatched > 0 {
        eprintln!("   ⚠️  Unmatched: {}", summary.report.unmatched);
    }
    eprintln!("💾 Output written to: {}", output.display());
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let decoded = decode_file(input)?;

    eprintln!("📄 {}", input.display());
    eprintln!("   Source: {}", decoded.format);
    eprintln!("   Rows:   {}", decoded.table.len());
    eprintln!("   Width:  {}", decoded.table.width());

    println!("{}", serde_json::to_string_pretty(&decoded.table)?);
    Ok(())
}

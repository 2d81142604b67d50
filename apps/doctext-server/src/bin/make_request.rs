//! Build a `POST /extract` request body from a document on disk.
//!
//! ```text
//! make-request sample.pdf > body.json
//! curl -X POST -H 'Content-Type: application/json' -d @body.json localhost:3000/extract
//! ```

use std::path::PathBuf;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::Parser;

use doctext_server::cache::{ExtractRequest, KeySource};

#[derive(Parser, Debug)]
#[command(name = "make-request", version, about = "Encode a document as an /extract request body")]
struct Cli {
    /// Document to encode
    file: PathBuf,

    /// Display name sent with the request (defaults to the file name)
    #[arg(long)]
    filename: Option<String>,

    /// Write the body here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the object key the server caches this document under to stderr
    #[arg(long)]
    show_key: bool,

    /// Key derivation the server is configured with (`DOCTEXT_KEY_SOURCE`)
    #[arg(long, default_value = "decoded")]
    key_source: KeySource,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let filename = cli.filename.unwrap_or_else(|| {
        cli.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let file_content = BASE64.encode(&data);

    if cli.show_key {
        let key = cli.key_source.derive(&file_content, &data);
        eprintln!("cache key: {}", key.object_key());
    }

    let request = ExtractRequest {
        filename,
        file_content,
    };
    let body = serde_json::to_string_pretty(&request)?;

    match cli.output {
        Some(path) => std::fs::write(&path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", body),
    }

    Ok(())
}

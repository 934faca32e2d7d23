//! `switchyard` binary entrypoint.
//!
//! Offline tooling over the Warp protocol core: inspect the schema bundle,
//! encode a Messages request, or replay a captured event stream.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Parser;
use colored::Colorize;
use prost_reflect::Kind;
use std::fs;
use std::path::{Path, PathBuf};
use switchyard_protocol::{MessagesRequest, StreamEvent};
use switchyard_warp::error::WarpError;
use switchyard_warp::framing::FrameDecoder;
use switchyard_warp::reassembler::{new_message_id, Reassembler};
use switchyard_warp::registry::{qualified, SchemaRegistry, SchemaTable, TypeDescriptor};
use switchyard_warp::tools::ToolMapper;
use switchyard_warp::translate::{build_wire_request, ExecutionContext};
use switchyard_warp::{WarpConfig, WireCodec};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Respect `RUST_LOG` if set; otherwise info, or debug with -v.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => WarpConfig::from_yaml_file(path)?,
        None => WarpConfig::default(),
    };

    match cli.command {
        Commands::Schema { dir, name } => {
            let dir = dir.unwrap_or_else(|| config.schema_dir.clone());
            run_schema(dir, name.as_deref()).await
        }
        Commands::Encode {
            request,
            working_dir,
            json,
        } => run_encode(&config, &request, working_dir, json).await,
        Commands::Decode {
            capture,
            model,
            buffered,
        } => run_decode(&config, &capture, &model, buffered).await,
    }
}

async fn load_codec(dir: PathBuf) -> Result<WireCodec> {
    let registry = SchemaRegistry::new(dir);
    let table = registry
        .load()
        .await
        .with_context(|| format!("failed to load schema from {}", registry.dir().display()))?;
    for failure in table.failures() {
        warn!("{}", failure);
    }
    Ok(WireCodec::new(table))
}

async fn run_schema(dir: PathBuf, name: Option<&str>) -> Result<()> {
    let codec = load_codec(dir).await?;
    let table = codec.schema();

    match name {
        Some(name) => {
            let description = describe(table, name)
                .with_context(|| format!("no schema type named {}", name))?;
            println!("{}", description);
        }
        None => {
            let names = table.type_names();
            for name in &names {
                println!("{}", name);
            }
            info!(
                files = table.loaded_files().len(),
                types = names.len(),
                "schema listed"
            );
        }
    }
    Ok(())
}

/// Human-readable outline of one message or enum.
fn describe(table: &SchemaTable, name: &str) -> Option<String> {
    let full_name = if name.contains('.') {
        name.to_string()
    } else {
        qualified(name)
    };

    let mut out = String::new();
    match table.resolve(&full_name)? {
        TypeDescriptor::Message(message) => {
            out.push_str(&format!("message {}\n", message.full_name().bold()));
            for field in message.fields() {
                let mut type_name = match field.kind() {
                    Kind::Message(m) => m.full_name().to_string(),
                    Kind::Enum(e) => e.full_name().to_string(),
                    scalar => format!("{:?}", scalar).to_lowercase(),
                };
                if field.is_map() {
                    type_name = format!("map<{}>", type_name);
                } else if field.is_list() {
                    type_name = format!("repeated {}", type_name);
                }
                let oneof = field
                    .containing_oneof()
                    .map(|o| format!("  (oneof {})", o.name()))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "  {:>3}  {}: {}{}\n",
                    field.number(),
                    field.name(),
                    type_name,
                    oneof.dimmed()
                ));
            }
        }
        TypeDescriptor::Enum(enumeration) => {
            out.push_str(&format!("enum {}\n", enumeration.full_name().bold()));
            for value in enumeration.values() {
                out.push_str(&format!("  {:>3}  {}\n", value.number(), value.name()));
            }
        }
    }
    Some(out.trim_end().to_string())
}

async fn run_encode(
    config: &WarpConfig,
    path: &Path,
    working_dir: String,
    json: bool,
) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read request from {}", path.display()))?;
    let request: MessagesRequest = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a Messages request", path.display()))?;

    let context = ExecutionContext::new(working_dir);
    let wire = build_wire_request(&request, &context, &ToolMapper::new());

    if json {
        println!("{}", serde_json::to_string_pretty(&wire)?);
        return Ok(());
    }

    let codec = load_codec(config.schema_dir.clone()).await?;
    let bytes = codec.encode_request(&wire)?;
    info!(bytes = bytes.len(), "request encoded");
    println!("{}", STANDARD.encode(bytes));
    Ok(())
}

/// Feed a captured stream through the decoder and reassembler.
fn replay(codec: WireCodec, capture: &[u8], model: &str) -> (Vec<StreamEvent>, Reassembler) {
    let mut decoder = FrameDecoder::new(codec, ToolMapper::new());
    let mut reassembler = Reassembler::new(new_message_id(), model, 0);

    let mut events = vec![reassembler.message_start()];
    let mut warp_events = decoder.push(capture);
    warp_events.extend(decoder.finish());
    for event in warp_events {
        events.extend(reassembler.apply(event));
    }

    if decoder.skipped() > 0 {
        warn!(
            frames = decoder.frames(),
            skipped = decoder.skipped(),
            "capture had malformed frames"
        );
    }
    if !reassembler.is_finished() {
        events.push(StreamEvent::error(
            "api_error",
            WarpError::IncompleteStream.to_string(),
        ));
    }
    (events, reassembler)
}

async fn run_decode(config: &WarpConfig, path: &Path, model: &str, buffered: bool) -> Result<()> {
    let capture = fs::read(path)
        .with_context(|| format!("failed to read capture from {}", path.display()))?;
    let codec = load_codec(config.schema_dir.clone()).await?;

    let (events, reassembler) = replay(codec, &capture, model);

    if buffered {
        if !reassembler.is_finished() {
            warn!("{}", WarpError::IncompleteStream);
        }
        println!("{}", serde_json::to_string_pretty(&reassembler.into_response())?);
        return Ok(());
    }

    for event in &events {
        print!("{}", event.to_sse_frame()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn bundled_codec() -> WireCodec {
        let registry = SchemaRegistry::bundled();
        WireCodec::new(registry.load().await.unwrap())
    }

    fn data_line(codec: &WireCodec, event: serde_json::Value) -> String {
        let bytes = codec.encode_value("ResponseEvent", &event).unwrap();
        format!("data: {}\n", STANDARD.encode(bytes))
    }

    #[tokio::test]
    async fn test_describe_message_and_enum() {
        let codec = bundled_codec().await;

        let request = describe(codec.schema(), "Request").unwrap();
        assert!(request.contains("task_context"));
        assert!(request.contains("metadata"));

        let tools = describe(codec.schema(), "warp.multi_agent.v1.ToolType").unwrap();
        assert!(tools.contains("RUN_SHELL_COMMAND"));

        assert!(describe(codec.schema(), "NoSuchType").is_none());
    }

    #[tokio::test]
    async fn test_replay_finished_capture() {
        let codec = bundled_codec().await;
        let mut capture = data_line(
            &codec,
            json!({"client_actions": {"actions": [{"add_messages_to_task": {
                "task_id": "t",
                "messages": [{"id": "m", "task_id": "t", "agent_output": {"text": "ok"}}]
            }}]}}),
        );
        capture += &data_line(&codec, json!({"finished": {"done": {}}}));

        let (events, reassembler) = replay(codec, capture.as_bytes(), "claude-4-sonnet");
        let names: Vec<_> = events.iter().map(StreamEvent::event_name).collect();
        assert_eq!(
            names,
            vec![
                "message_start",
                "content_block_start",
                "content_block_delta",
                "content_block_stop",
                "message_delta",
                "message_stop"
            ]
        );
        assert_eq!(reassembler.text(), "ok");
    }

    #[tokio::test]
    async fn test_replay_truncated_capture_ends_with_error() {
        let codec = bundled_codec().await;
        let capture = data_line(&codec, json!({"init": {"conversation_id": "c"}}));

        let (events, reassembler) = replay(codec, capture.as_bytes(), "claude-4-sonnet");
        assert!(!reassembler.is_finished());
        assert!(matches!(events.last(), Some(StreamEvent::Error { .. })));
    }
}

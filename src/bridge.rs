//! Stdio bridge: hosts the Coordinator behind newline-delimited JSON.
//!
//! Protocol: one JSON object per line, discriminated by `type`.
//! In:  {"type":"message","id":1,"message":{"action":"get-settings"},"sender":{"tab":null}}
//! In:  {"type":"event","event":{"kind":"tab-removed","tabId":7}}
//! In:  {"type":"host-result","callId":3,"result":[...]} or {"type":"host-result","callId":3,"error":"..."}
//! Out: {"type":"response","id":1,"result":{...}} or {"type":"response","id":1,"error":"..."}
//! Out: {"type":"host-call","callId":3,"method":"tabs.query","params":{...}}
//!
//! Input is read as raw bytes; a line that is not valid UTF-8 or not a valid
//! inbound object gets an error response with `id: null` and is skipped. At
//! end of input every started handler runs to completion and every queued
//! line is written before [`serve`] returns.

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::coordinator::{Coordinator, InstallReason};
use crate::host::file_store::JsonFileStore;
use crate::host::memory::MemoryStore;
use crate::host::stdio::StdioHost;
use crate::message_handler::handle_raw;
use crate::types::context_menu::MenuClickInfo;
use crate::types::message::MessageSender;
use crate::types::tab::{HostTab, TabId};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum Inbound {
    Message {
        #[serde(default)]
        id: Value,
        message: Value,
        #[serde(default)]
        sender: MessageSender,
    },
    Event {
        event: HostEvent,
    },
    HostResult {
        #[serde(rename = "callId")]
        call_id: u64,
        #[serde(default)]
        result: Value,
        #[serde(default)]
        error: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum HostEvent {
    Installed {
        reason: InstallReason,
    },
    TabRemoved {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    ActionClicked {
        tab: HostTab,
    },
    Command {
        name: String,
    },
    ContextMenuClicked {
        info: MenuClickInfo,
        #[serde(default)]
        tab: Option<HostTab>,
    },
}

fn emit(out: &mpsc::UnboundedSender<String>, value: Value) {
    if out.send(value.to_string()).is_err() {
        debug!("Output closed, dropping line");
    }
}

async fn dispatch_event(coordinator: &Coordinator, event: HostEvent) {
    match event {
        HostEvent::Installed { reason } => coordinator.on_installed(reason).await,
        HostEvent::TabRemoved { tab_id } => coordinator.on_tab_removed(tab_id),
        HostEvent::ActionClicked { tab } => {
            coordinator.on_action_clicked(&tab).await;
        }
        HostEvent::Command { name } => {
            coordinator.on_command(&name).await;
        }
        HostEvent::ContextMenuClicked { info, tab } => {
            coordinator.on_context_menu_clicked(&info, tab.as_ref()).await;
        }
    }
}

/// Writes queued lines until every sender is gone, then hands the writer back.
async fn write_lines<W>(mut output: W, mut lines: mpsc::UnboundedReceiver<String>) -> Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = lines.recv().await {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(output)
}

/// Runs the bridge until `input` ends. Returns `output` once everything
/// queued for it has been written.
pub async fn serve<R, W>(mut input: R, output: W, config: &BridgeConfig) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(output, out_rx));

    let host = Arc::new(StdioHost::new(out_tx.clone(), config.host_timeout));
    let coordinator = Coordinator::new(
        host.clone(),
        Arc::new(JsonFileStore::new(Some(config.settings_path()))),
        Arc::new(MemoryStore::new()),
        config.send_timeout,
    );
    coordinator.startup();

    emit(
        &out_tx,
        json!({"type": "ready", "version": env!("CARGO_PKG_VERSION")}),
    );

    let mut handlers = JoinSet::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        while handlers.try_join_next().is_some() {}

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!(error = %e, "Input line is not UTF-8");
                emit(
                    &out_tx,
                    json!({"type": "response", "id": null, "error": format!("invalid UTF-8: {}", e)}),
                );
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        let inbound: Inbound = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Malformed input line");
                emit(
                    &out_tx,
                    json!({"type": "response", "id": null, "error": format!("parse error: {}", e)}),
                );
                continue;
            }
        };

        // Handlers issue host calls whose results arrive on this same loop,
        // so they run on their own tasks.
        match inbound {
            Inbound::HostResult {
                call_id,
                result,
                error,
            } => {
                let outcome = match error {
                    Some(msg) => Err(msg),
                    None => Ok(result),
                };
                host.resolve(call_id, outcome);
            }
            Inbound::Message {
                id,
                message,
                sender,
            } => {
                let coordinator = coordinator.clone();
                let out = out_tx.clone();
                handlers.spawn(async move {
                    let response = match handle_raw(&coordinator, &message, &sender).await {
                        Ok(result) => json!({"type": "response", "id": id, "result": result}),
                        Err(e) => json!({"type": "response", "id": id, "error": e.to_string()}),
                    };
                    emit(&out, response);
                });
            }
            Inbound::Event { event } => {
                let coordinator = coordinator.clone();
                handlers.spawn(async move {
                    dispatch_event(&coordinator, event).await;
                });
            }
        }
    }

    info!(
        handlers = handlers.len(),
        pending = host.pending_calls(),
        "Input closed, draining"
    );
    while let Some(joined) = handlers.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "Handler task failed");
        }
    }

    // The writer stops once the last sender is gone.
    drop(coordinator);
    drop(host);
    drop(out_tx);
    writer.await?
}

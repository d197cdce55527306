//! Watch command: print what a device sends over a single connection.

use std::path::Path;

use actuator_link_core::device::Connection;
use actuator_link_core::panel::dispatch;
use actuator_link_core::protocol::InboundMessage;
use actuator_link_core::StatusPanel;
use tracing::{debug, warn};

use crate::cli::WatchArgs;
use crate::commands::resolve_config;
use crate::error::{CliError, LinkError};
use crate::output::get_formatter;

/// Run the watch command
///
/// Without `--count`, prints the first report and exits. With it, prints
/// reports and serial lines until that many have been shown.
pub async fn run_watch(
    args: WatchArgs,
    config_path: Option<&Path>,
    timeout: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let config = resolve_config(config_path, &args.target, timeout)?;
    let formatter = get_formatter(json);
    let url = config.url()?;

    let limit = args.count.unwrap_or(1);
    if limit == 0 {
        return Ok(());
    }

    let mut conn = Connection::open(&url, config.connect_timeout()).await?;
    let mut panel = StatusPanel::new();
    let mut shown = 0;

    while let Some(inbound) = conn.next_message().await {
        let message = match inbound {
            Ok(message) => message,
            Err(e) => {
                warn!(url = %url, error = %e, "dropping malformed message");
                continue;
            }
        };

        let printed = match &message {
            InboundMessage::Report(_) => {
                dispatch(&mut panel, &message);
                println!("{}", formatter.format_panel(&panel));
                true
            }
            InboundMessage::Serial { text } if args.count.is_some() => {
                println!("{}", formatter.format_serial(&text.to_string()));
                true
            }
            InboundMessage::Serial { .. } => false,
            InboundMessage::Unknown => {
                debug!(url = %url, "ignoring message of unknown type");
                false
            }
        };

        if printed {
            shown += 1;
            if shown >= limit {
                conn.close().await;
                return Ok(());
            }
        }
    }

    Err(LinkError::Closed.into())
}

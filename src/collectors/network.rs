//! Network domain collector.

use tracing::debug;

use crate::commands;
use crate::error::TransportError;
use crate::parsers::network as parser;
use crate::snapshot::{LinkStatus, NetworkBasic, NetworkDetail};

use super::{now_ms, Ctx};

/// Cheap tier: host-wide RX/TX throughput summed over non-loopback
/// interfaces, plus the count of links that are up.
pub(crate) async fn collect_basic(ctx: &Ctx<'_>) -> Result<NetworkBasic, TransportError> {
    let raw = ctx.run(commands::LINK_STATS).await?;
    let interfaces = parser::parse_link_stats(&raw);
    let now = now_ms();

    let mut basic = NetworkBasic::default();
    {
        let mut rates = ctx.state.rates.lock().expect("rate table lock poisoned");
        for interface in &interfaces {
            basic.rx_bytes_per_sec += rates.update(
                &format!("net:basic:{}:rx", interface.name),
                interface.rx_bytes,
                now,
            );
            basic.tx_bytes_per_sec += rates.update(
                &format!("net:basic:{}:tx", interface.name),
                interface.tx_bytes,
                now,
            );
            if interface.status == LinkStatus::Up {
                basic.interfaces_up += 1;
            }
        }
    }

    Ok(basic)
}

/// Detail tier: link statistics and the address listing run as one
/// combined invocation (split at the separator token), the socket
/// summary concurrently with it.
pub(crate) async fn collect_detail(ctx: &Ctx<'_>) -> Result<NetworkDetail, TransportError> {
    let combined_cmd = commands::combined_network();
    let (combined_raw, sockets_raw) = tokio::try_join!(
        ctx.run(&combined_cmd),
        ctx.run(commands::SOCKET_SUMMARY),
    )?;

    let (links_raw, addresses_raw) = parser::split_combined(&combined_raw);
    let mut interfaces = parser::parse_link_stats(links_raw);
    parser::merge_addresses(&mut interfaces, parser::parse_addresses(addresses_raw));

    let now = now_ms();
    {
        let mut rates = ctx.state.rates.lock().expect("rate table lock poisoned");
        for interface in &mut interfaces {
            interface.rx_bytes_per_sec = rates.update(
                &format!("net:{}:rx", interface.name),
                interface.rx_bytes,
                now,
            );
            interface.tx_bytes_per_sec = rates.update(
                &format!("net:{}:tx", interface.name),
                interface.tx_bytes,
                now,
            );
        }
    }

    let sockets = parser::parse_socket_summary(&sockets_raw).unwrap_or_else(|err| {
        debug!(session_id = ctx.session_id, error = %err, "socket summary unparseable");
        Default::default()
    });

    Ok(NetworkDetail {
        interfaces,
        sockets,
        updated_at_ms: None,
    })
}

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::sdk::TelloLink;

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub addr: String,
    pub ok_seen: bool,
    pub elapsed_ms: u64,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub chosen: Option<String>,
    pub probes: Vec<ProbeResult>,
}

/// Sends `command` to each candidate and picks the first that answers `ok`.
pub fn probe_drone(candidates: Vec<String>, bind: &str, timeout: Duration) -> Result<ProbeOutcome> {
    let mut probes = Vec::new();

    for addr in candidates {
        let start = Instant::now();
        let mut ok_seen = false;

        let note = match TelloLink::open(bind, &addr) {
            Ok(link) => match link.enter_sdk_mode().and_then(|_| link.wait_reply(timeout)) {
                Ok(Some(reply)) if reply.eq_ignore_ascii_case("ok") => {
                    ok_seen = true;
                    "ok".to_string()
                }
                Ok(Some(reply)) => format!("unexpected reply {:?}", reply),
                Ok(None) => "no reply".to_string(),
                Err(e) => format!("handshake failed: {:#}", e),
            },
            Err(e) => {
                warn!("drone probe failed addr={} err={:#}", addr, e);
                format!("open failed: {:#}", e)
            }
        };

        probes.push(ProbeResult {
            addr: addr.clone(),
            ok_seen,
            elapsed_ms: start.elapsed().as_millis() as u64,
            note,
        });

        if ok_seen {
            info!("drone probe: OK {}", addr);
            return Ok(ProbeOutcome { chosen: Some(addr), probes });
        }
    }

    Ok(ProbeOutcome { chosen: None, probes })
}

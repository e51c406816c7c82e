use anyhow::Result;
use std::net::SocketAddr;

use crate::DroneConfig;

pub fn check_drone_config(cfg: &DroneConfig) -> Result<()> {
    for addr in std::iter::once(cfg.addr()).chain(cfg.candidates()) {
        anyhow::ensure!(addr.parse::<SocketAddr>().is_ok(), "drone address {:?} is not ip:port", addr);
    }
    anyhow::ensure!(cfg.bind().parse::<SocketAddr>().is_ok(), "drone.bind is not ip:port");
    if let Some(speed) = cfg.default_speed {
        anyhow::ensure!((0..=100).contains(&speed), "drone.default_speed should be 0..100");
    }
    if let Some(ms) = cfg.handshake_timeout_ms {
        anyhow::ensure!((100..=30_000).contains(&ms), "drone.handshake_timeout_ms should be 100..30000");
    }
    if let Some(ms) = cfg.command_min_interval_ms {
        anyhow::ensure!(ms <= 10_000, "drone.command_min_interval_ms above 10s");
    }
    anyhow::ensure!(
        !(cfg.require_handshake && !cfg.enable),
        "drone.require_handshake needs drone.enable"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DroneConfig {
        DroneConfig {
            enable: true,
            addr: None,
            bind: None,
            candidate_addrs: None,
            handshake_timeout_ms: None,
            require_handshake: false,
            default_speed: None,
            command_min_interval_ms: None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        check_drone_config(&base()).unwrap();
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = base();
        cfg.default_speed = Some(150);
        assert!(check_drone_config(&cfg).is_err());

        let mut cfg = base();
        cfg.handshake_timeout_ms = Some(5);
        assert!(check_drone_config(&cfg).is_err());

        let mut cfg = base();
        cfg.candidate_addrs = Some(vec!["tello.local".into()]);
        assert!(check_drone_config(&cfg).is_err());

        let mut cfg = base();
        cfg.enable = false;
        cfg.require_handshake = true;
        assert!(check_drone_config(&cfg).is_err());
    }
}

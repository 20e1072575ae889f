//! Remap rules and remap tables

use crate::controller::button_id::ButtonId;
use crate::error::AdapterError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Scaling algorithm of an axis-to-axis rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Rescale the range left after the deadzone onto the destination range
    #[default]
    Linear,
    /// Apply the max-scale percentage to the raw remainder
    Passthrough,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Linear => write!(f, "linear"),
            Algorithm::Passthrough => write!(f, "passthrough"),
        }
    }
}

/// One remap instruction: source id on the wireless side to destination id
/// on a wired port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRule {
    pub src_btn: ButtonId,
    pub dst_btn: ButtonId,
    /// Wired port receiving the destination
    pub dst_id: u8,
    #[serde(default)]
    pub algo: Algorithm,
    /// Deadzone as a percent of the source range
    #[serde(default)]
    pub perc_deadzone: u8,
    /// Output scale as a percent of the destination range
    #[serde(default = "default_perc_max")]
    pub perc_max: u8,
    /// Axis-to-button press threshold as a percent of the source range
    #[serde(default = "default_perc_threshold")]
    pub perc_threshold: u8,
}

fn default_perc_max() -> u8 {
    100
}

fn default_perc_threshold() -> u8 {
    50
}

impl MapRule {
    pub const fn new(src_btn: ButtonId, dst_btn: ButtonId, dst_id: u8) -> Self {
        Self {
            src_btn,
            dst_btn,
            dst_id,
            algo: Algorithm::Linear,
            perc_deadzone: 0,
            perc_max: 100,
            perc_threshold: 50,
        }
    }

    pub const fn with_algo(mut self, algo: Algorithm) -> Self {
        self.algo = algo;
        self
    }

    pub const fn with_deadzone(mut self, perc_deadzone: u8) -> Self {
        self.perc_deadzone = perc_deadzone;
        self
    }

    pub const fn with_max(mut self, perc_max: u8) -> Self {
        self.perc_max = perc_max;
        self
    }

    pub const fn with_threshold(mut self, perc_threshold: u8) -> Self {
        self.perc_threshold = perc_threshold;
        self
    }

    /// Checks id ranges against the number of wired ports
    pub fn validate(&self, port_count: usize) -> Result<(), AdapterError> {
        if !self.src_btn.is_valid() || !self.dst_btn.is_valid() {
            return Err(AdapterError::InvalidConfig(format!(
                "button id out of range in rule {} -> {}",
                self.src_btn, self.dst_btn
            )));
        }
        if self.dst_id as usize >= port_count {
            return Err(AdapterError::InvalidConfig(format!(
                "rule {} -> {} targets port {} but only {} ports exist",
                self.src_btn, self.dst_btn, self.dst_id, port_count
            )));
        }
        if self.perc_deadzone > 100 || self.perc_threshold > 100 {
            return Err(AdapterError::InvalidConfig(format!(
                "rule {} -> {} has a deadzone or threshold above 100%",
                self.src_btn, self.dst_btn
            )));
        }
        Ok(())
    }
}

/// Ordered remap table of one wireless source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub map_cfg: Vec<MapRule>,
}

impl InputConfig {
    pub fn new(map_cfg: Vec<MapRule>) -> Self {
        Self { map_cfg }
    }

    /// Maps the 32 generic plane-0 ids onto themselves on one port
    pub fn identity(port: u8) -> Self {
        let map_cfg = (0..32)
            .map(|id| MapRule::new(ButtonId(id), ButtonId(id), port))
            .collect();
        Self { map_cfg }
    }

    pub fn rules(&self) -> &[MapRule] {
        &self.map_cfg
    }

    pub fn validate(&self, port_count: usize) -> Result<(), AdapterError> {
        self.map_cfg
            .iter()
            .try_for_each(|rule| rule.validate(port_count))
    }
}

/// Set of wired ports updated by a mapping cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PortMask(pub u32);

impl PortMask {
    pub const EMPTY: PortMask = PortMask(0);

    #[inline]
    pub fn insert(&mut self, port: u8) {
        self.0 |= 1 << (port & 0x1F);
    }

    #[inline]
    pub fn contains(self, port: u8) -> bool {
        port < 32 && self.0 & (1 << port) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Ports in ascending order
    pub fn ports(self) -> impl Iterator<Item = u8> {
        (0..32u8).filter(move |port| self.contains(*port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_defaults_follow_builder() {
        let rule = MapRule::new(ButtonId::LX_RIGHT, ButtonId::RX_RIGHT, 1)
            .with_algo(Algorithm::Passthrough)
            .with_deadzone(10)
            .with_max(80)
            .with_threshold(25);

        assert_eq!(rule.algo, Algorithm::Passthrough);
        assert_eq!(rule.perc_deadzone, 10);
        assert_eq!(rule.perc_max, 80);
        assert_eq!(rule.perc_threshold, 25);
        assert_eq!(rule.dst_id, 1);
    }

    #[test]
    fn validation_rejects_bad_ports_and_percents() {
        assert!(MapRule::new(ButtonId::MM, ButtonId::MM, 3).validate(4).is_ok());
        assert!(MapRule::new(ButtonId::MM, ButtonId::MM, 4).validate(4).is_err());
        assert!(MapRule::new(ButtonId(128), ButtonId::MM, 0).validate(4).is_err());
        assert!(MapRule::new(ButtonId::MM, ButtonId::MM, 0)
            .with_deadzone(101)
            .validate(4)
            .is_err());
    }

    #[test]
    fn port_mask_iterates_in_order() {
        let mut mask = PortMask::EMPTY;
        assert!(mask.is_empty());
        mask.insert(3);
        mask.insert(0);
        mask.insert(3);

        assert_eq!(mask.ports().collect::<Vec<_>>(), vec![0, 3]);
        assert!(mask.contains(0));
        assert!(!mask.contains(1));
        assert!(!mask.contains(40));
    }

    #[test]
    fn identity_table_covers_plane_zero() {
        let table = InputConfig::identity(2);
        assert_eq!(table.rules().len(), 32);
        assert!(table.rules().iter().all(|r| r.src_btn == r.dst_btn && r.dst_id == 2));
        assert!(table.validate(4).is_ok());
    }
}

//! Optimization stages in their fixed execution order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Optimization stage of a rule group.
///
/// Variant order is execution order; `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Core,
    Latency,
    Memory,
    Storage,
    Processor,
    FrameRate,
    Power,
    Gpu,
    Network,
    Peripheral,
    Boot,
    Interrupt,
    Services,
    Finalization,
}

impl Stage {
    pub const ALL: [Stage; 14] = [
        Stage::Core,
        Stage::Latency,
        Stage::Memory,
        Stage::Storage,
        Stage::Processor,
        Stage::FrameRate,
        Stage::Power,
        Stage::Gpu,
        Stage::Network,
        Stage::Peripheral,
        Stage::Boot,
        Stage::Interrupt,
        Stage::Services,
        Stage::Finalization,
    ];

    /// 1-based position, used for "Stage N" headings.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Core => "Core System Adjustments",
            Stage::Latency => "Latency Reductions",
            Stage::Memory => "Memory Management",
            Stage::Storage => "Storage Optimization",
            Stage::Processor => "Processor Performance",
            Stage::FrameRate => "Frame Rate Smoothing",
            Stage::Power => "Power Delivery",
            Stage::Gpu => "Graphics Vendor Tuning",
            Stage::Network => "Network Throughput",
            Stage::Peripheral => "Peripheral and Driver Configuration",
            Stage::Boot => "Boot Configuration Timing",
            Stage::Interrupt => "Peripheral Interrupt Tuning",
            Stage::Services => "Privacy and System Services",
            Stage::Finalization => "Finalization",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Core => "core",
            Stage::Latency => "latency",
            Stage::Memory => "memory",
            Stage::Storage => "storage",
            Stage::Processor => "processor",
            Stage::FrameRate => "frame_rate",
            Stage::Power => "power",
            Stage::Gpu => "gpu",
            Stage::Network => "network",
            Stage::Peripheral => "peripheral",
            Stage::Boot => "boot",
            Stage::Interrupt => "interrupt",
            Stage::Services => "services",
            Stage::Finalization => "finalization",
        };
        write!(f, "{name}")
    }
}

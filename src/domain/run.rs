// ============================================================
// Layer 3 — Run Descriptors
// ============================================================
// Small value types parsed from the command line and threaded
// through every layer instead of being read from ambient state.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// What the run does once the model is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Train,
    Test,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Mode::Train),
            "test"  => Ok(Mode::Test),
            other   => Err(format!("mode must be 'train' or 'test', got '{other}'")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Train => write!(f, "train"),
            Mode::Test  => write!(f, "test"),
        }
    }
}

/// Which half of the data a file or dataset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val   => "val",
        }
    }
}

// ─── DeviceSelector ──────────────────────────────────────────────────────────
/// Value of `--gpu`.
///
///   "0", "1", ...  → discrete GPU by index (wgpu)
///   "auto"         → whatever wgpu picks as its default adapter
///   "cpu"          → the ndarray CPU backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DeviceSelector {
    Gpu(usize),
    Auto,
    Cpu,
}

impl FromStr for DeviceSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "cpu"  => Ok(DeviceSelector::Cpu),
            "auto" => Ok(DeviceSelector::Auto),
            _ => s
                .parse::<usize>()
                .map(DeviceSelector::Gpu)
                .map_err(|_| format!("expected a GPU index, 'auto' or 'cpu', got '{s}'")),
        }
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSelector::Gpu(index) => write!(f, "{index}"),
            DeviceSelector::Auto       => write!(f, "auto"),
            DeviceSelector::Cpu        => write!(f, "cpu"),
        }
    }
}

impl From<DeviceSelector> for String {
    fn from(d: DeviceSelector) -> Self {
        d.to_string()
    }
}

impl TryFrom<String> for DeviceSelector {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_selector_parsing() {
        assert_eq!("0".parse::<DeviceSelector>().unwrap(),    DeviceSelector::Gpu(0));
        assert_eq!("3".parse::<DeviceSelector>().unwrap(),    DeviceSelector::Gpu(3));
        assert_eq!("CPU".parse::<DeviceSelector>().unwrap(),  DeviceSelector::Cpu);
        assert_eq!("auto".parse::<DeviceSelector>().unwrap(), DeviceSelector::Auto);
        assert!("gpu0".parse::<DeviceSelector>().is_err());
    }

    #[test]
    fn test_device_selector_serialises_as_flag_value() {
        let json = serde_json::to_string(&DeviceSelector::Gpu(1)).unwrap();
        assert_eq!(json, "\"1\"");
        let back: DeviceSelector = serde_json::from_str("\"cpu\"").unwrap();
        assert_eq!(back, DeviceSelector::Cpu);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("train".parse::<Mode>().unwrap(), Mode::Train);
        assert_eq!("Test".parse::<Mode>().unwrap(),  Mode::Test);
        assert!("eval".parse::<Mode>().is_err());
    }
}

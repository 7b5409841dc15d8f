use serde_derive::{Deserialize, Serialize};

const OFFSETS_C4: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
const OFFSETS_C8: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Pixel neighbourhood used when growing same-identity components.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Edge-sharing neighbours only.
    #[default]
    C4,
    /// Edge- and corner-sharing neighbours.
    C8,
}

impl Connectivity {
    /// `(row, col)` offsets of the neighbours of a pixel.
    #[inline]
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::C4 => &OFFSETS_C4,
            Connectivity::C8 => &OFFSETS_C8,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct LineageConfig {
    #[serde(default)]
    pub connectivity: Connectivity,
}

impl LineageConfig {
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_four_connected() {
        assert_eq!(LineageConfig::default().connectivity, Connectivity::C4);
        assert_eq!(Connectivity::C4.offsets().len(), 4);
        assert_eq!(Connectivity::C8.offsets().len(), 8);
    }

    #[test]
    fn missing_connectivity_deserializes_to_default() {
        let cfg: LineageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, LineageConfig::default());

        let cfg: LineageConfig = serde_json::from_str(r#"{"connectivity":"c8"}"#).unwrap();
        assert_eq!(cfg.connectivity, Connectivity::C8);
    }
}

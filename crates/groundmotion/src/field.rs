use serde::{Deserialize, Serialize};
use std::fmt;

/// The ground-motion summary fields shown on a shake map, in panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShakeField {
    /// Peak ground displacement
    Pgd,
    /// Peak ground velocity
    Pgv,
    /// Peak ground acceleration
    Pga,
}

impl ShakeField {
    pub const ALL: [ShakeField; 3] = [ShakeField::Pgd, ShakeField::Pgv, ShakeField::Pga];

    /// Attribute name in the output container.
    pub fn name(self) -> &'static str {
        match self {
            ShakeField::Pgd => "PGD",
            ShakeField::Pgv => "PGV",
            ShakeField::Pga => "PGA",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            ShakeField::Pgd => "m",
            ShakeField::Pgv => "m/s",
            ShakeField::Pga => "m/s^2",
        }
    }

    /// Panel title / colorbar label, e.g. `PGV [m/s]`.
    pub fn label(self) -> String {
        format!("{} [{}]", self.name(), self.unit())
    }
}

impl fmt::Display for ShakeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

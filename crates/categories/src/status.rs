use core::str::FromStr;

use serde::{Deserialize, Serialize};

use catalog_core::DomainError;

/// Visibility flag shared by categories and subcategories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryStatus {
    #[default]
    Active,
    Inactive,
}

impl CategoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryStatus::Active => "Active",
            CategoryStatus::Inactive => "Inactive",
        }
    }
}

impl core::fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(CategoryStatus::Active),
            "inactive" => Ok(CategoryStatus::Inactive),
            other => Err(DomainError::validation(format!(
                "status must be one of: Active, Inactive (got \"{other}\")"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("active".parse::<CategoryStatus>().unwrap(), CategoryStatus::Active);
        assert_eq!("INACTIVE".parse::<CategoryStatus>().unwrap(), CategoryStatus::Inactive);
        assert!("archived".parse::<CategoryStatus>().is_err());
    }

    #[test]
    fn wire_format_is_capitalised() {
        assert_eq!(serde_json::to_string(&CategoryStatus::Inactive).unwrap(), "\"Inactive\"");
    }
}

//! High-risk jurisdiction table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default high-risk jurisdictions (ISO code, display name)
const DEFAULT_HIGH_RISK: [(&str, &str); 6] = [
    ("KY", "Cayman Islands"),
    ("PA", "Panama"),
    ("BS", "Bahamas"),
    ("RU", "Russia"),
    ("NG", "Nigeria"),
    ("IR", "Iran"),
];

/// Fixed set of jurisdictions whose involvement raises transaction risk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighRiskJurisdictions {
    countries: BTreeMap<String, Option<String>>,
}

impl HighRiskJurisdictions {
    /// Build from ISO codes. Codes from the default table keep their names.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let countries = codes
            .into_iter()
            .map(|code| {
                let code = code.as_ref().trim().to_uppercase();
                let name = DEFAULT_HIGH_RISK
                    .iter()
                    .find(|(c, _)| *c == code)
                    .map(|(_, n)| n.to_string());
                (code, name)
            })
            .filter(|(code, _)| !code.is_empty())
            .collect();
        Self { countries }
    }

    /// ISO codes of the default table
    pub fn default_codes() -> Vec<String> {
        DEFAULT_HIGH_RISK.iter().map(|(c, _)| c.to_string()).collect()
    }

    pub fn contains(&self, country_code: &str) -> bool {
        self.countries.contains_key(country_code)
    }

    /// `KY (Cayman Islands)` for named codes, the bare code otherwise
    pub fn describe(&self, country_code: &str) -> String {
        match self.countries.get(country_code) {
            Some(Some(name)) => format!("{} ({})", country_code, name),
            _ => country_code.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl Default for HighRiskJurisdictions {
    fn default() -> Self {
        Self::from_codes(DEFAULT_HIGH_RISK.iter().map(|(c, _)| *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set() {
        let table = HighRiskJurisdictions::default();

        assert_eq!(table.len(), 6);
        for code in ["KY", "PA", "BS", "RU", "NG", "IR"] {
            assert!(table.contains(code));
        }
        assert!(!table.contains("US"));
        assert!(!table.contains("ky"));
    }

    #[test]
    fn test_describe() {
        let table = HighRiskJurisdictions::default();
        assert_eq!(table.describe("KY"), "KY (Cayman Islands)");

        let custom = HighRiskJurisdictions::from_codes(["mm", " "]);
        assert_eq!(custom.len(), 1);
        assert!(custom.contains("MM"));
        assert_eq!(custom.describe("MM"), "MM");
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Descriptive company profile supplied by a provider
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Business description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Vendor industry classification (e.g., "IT Consulting & Software")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_classification: Option<String>,
}

impl CompanyProfile {
    /// Build a profile, returning `None` when neither field is present.
    pub fn from_parts(
        description: Option<String>,
        industry_classification: Option<String>,
    ) -> Option<Self> {
        if description.is_none() && industry_classification.is_none() {
            return None;
        }
        Some(Self {
            description,
            industry_classification,
        })
    }
}

/// A peer company listed alongside the requested instrument
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerCompany {
    /// Peer ticker
    pub ticker: String,

    /// Peer company name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Market capitalization as reported by the vendor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,

    /// Price-to-earnings ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_parts() {
        assert!(CompanyProfile::from_parts(None, None).is_none());

        let profile = CompanyProfile::from_parts(None, Some("Banks".to_string())).unwrap();
        assert_eq!(profile.industry_classification.as_deref(), Some("Banks"));
        assert!(profile.description.is_none());
    }
}

//! Branding tiers and the per-tier listing quota.

/// Subscription tier attached to a profile. Unknown or missing tiers fall
/// back to `Pro`, matching the platform's billing defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandingTier {
    Starter,
    Standard,
    Pro,
    CustomBrand,
    Unlimited,
}

impl BrandingTier {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "starter" => Self::Starter,
            "standard" => Self::Standard,
            "pro" => Self::Pro,
            "custom_brand" => Self::CustomBrand,
            "unlimited" => Self::Unlimited,
            _ => Self::Pro,
        }
    }

    /// Maximum number of listings a single realtor may hold on this tier.
    pub fn max_listings(self) -> i64 {
        match self {
            Self::Starter | Self::Standard => 5,
            Self::Pro | Self::CustomBrand => 33,
            Self::Unlimited => i64::MAX,
        }
    }
}

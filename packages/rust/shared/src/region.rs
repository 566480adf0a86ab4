//! Data-residency regions and their service endpoints.
//!
//! Resolution is a pure lookup against a static table: an unknown region
//! string is not an error, it simply yields no match so callers can fall
//! back to explicit host overrides.

use serde::{Deserialize, Serialize};

/// A Contentstack data-residency region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// AWS North America (the delivery API default).
    Us,
    Eu,
    Au,
    AzureNa,
    AzureEu,
    GcpNa,
    GcpEu,
}

impl Region {
    /// Every supported region, in table order.
    pub const ALL: [Region; 7] = [
        Region::Us,
        Region::Eu,
        Region::Au,
        Region::AzureNa,
        Region::AzureEu,
        Region::GcpNa,
        Region::GcpEu,
    ];

    /// Canonical identifier (e.g. `azure-na`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Eu => "eu",
            Self::Au => "au",
            Self::AzureNa => "azure-na",
            Self::AzureEu => "azure-eu",
            Self::GcpNa => "gcp-na",
            Self::GcpEu => "gcp-eu",
        }
    }

    /// Service hosts for this region.
    pub fn endpoints(&self, style: EndpointStyle) -> Endpoints {
        endpoints_for(*self, style)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        region_for_str(s).ok_or_else(|| format!("unknown region '{s}'"))
    }
}

/// Resolve a region identifier string.
///
/// Matching ignores case and surrounding whitespace, and treats `_` and `-`
/// alike. Returns `None` for empty or unrecognized input.
pub fn region_for_str(input: &str) -> Option<Region> {
    let normalized = input.trim().to_ascii_lowercase().replace('_', "-");

    match normalized.as_str() {
        "us" | "na" | "aws-na" | "aws-us" => Some(Region::Us),
        "eu" | "aws-eu" => Some(Region::Eu),
        "au" | "aws-au" => Some(Region::Au),
        "azure-na" => Some(Region::AzureNa),
        "azure-eu" => Some(Region::AzureEu),
        "gcp-na" => Some(Region::GcpNa),
        "gcp-eu" => Some(Region::GcpEu),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// How endpoint hosts are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointStyle {
    /// Host only (`cdn.contentstack.io`), as the delivery and preview `host` fields expect.
    #[default]
    BareHost,
    /// Host with an `https://` scheme prefix.
    Https,
}

/// The named service hosts of one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Content Delivery API host.
    pub content_delivery: String,
    /// Live-preview REST host.
    pub preview: String,
    /// Web application (editor UI) host.
    pub application: String,
}

/// Static endpoint table: (delivery, preview, application).
fn table_row(region: Region) -> (&'static str, &'static str, &'static str) {
    match region {
        Region::Us => (
            "cdn.contentstack.io",
            "rest-preview.contentstack.com",
            "app.contentstack.com",
        ),
        Region::Eu => (
            "eu-cdn.contentstack.com",
            "eu-rest-preview.contentstack.com",
            "eu-app.contentstack.com",
        ),
        Region::Au => (
            "au-cdn.contentstack.com",
            "au-rest-preview.contentstack.com",
            "au-app.contentstack.com",
        ),
        Region::AzureNa => (
            "azure-na-cdn.contentstack.com",
            "azure-na-rest-preview.contentstack.com",
            "azure-na-app.contentstack.com",
        ),
        Region::AzureEu => (
            "azure-eu-cdn.contentstack.com",
            "azure-eu-rest-preview.contentstack.com",
            "azure-eu-app.contentstack.com",
        ),
        Region::GcpNa => (
            "gcp-na-cdn.contentstack.com",
            "gcp-na-rest-preview.contentstack.com",
            "gcp-na-app.contentstack.com",
        ),
        Region::GcpEu => (
            "gcp-eu-cdn.contentstack.com",
            "gcp-eu-rest-preview.contentstack.com",
            "gcp-eu-app.contentstack.com",
        ),
    }
}

/// Derive the endpoint set for `region`.
pub fn endpoints_for(region: Region, style: EndpointStyle) -> Endpoints {
    let (delivery, preview, application) = table_row(region);
    let render = |host: &str| match style {
        EndpointStyle::BareHost => host.to_string(),
        EndpointStyle::Https => format!("https://{host}"),
    };

    Endpoints {
        content_delivery: render(delivery),
        preview: render(preview),
        application: render(application),
    }
}

/// Endpoints for an optional region; unresolved regions have none.
pub fn resolve_endpoints(region: Option<Region>, style: EndpointStyle) -> Option<Endpoints> {
    region.map(|r| endpoints_for(r, style))
}

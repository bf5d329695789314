use crate::predicate::Range;

/// Named price buckets offered by the listing UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBucket {
    Under100k,
    From100kTo200k,
    From200kTo300k,
    From300kTo500k,
    Over500k,
}

impl PriceBucket {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "under-100k" => Some(Self::Under100k),
            "100k-200k" => Some(Self::From100kTo200k),
            "200k-300k" => Some(Self::From200kTo300k),
            "300k-500k" => Some(Self::From300kTo500k),
            "over-500k" => Some(Self::Over500k),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Under100k => "under-100k",
            Self::From100kTo200k => "100k-200k",
            Self::From200kTo300k => "200k-300k",
            Self::From300kTo500k => "300k-500k",
            Self::Over500k => "over-500k",
        }
    }

    pub fn range(self) -> Range {
        match self {
            Self::Under100k => Range::at_most(100_000.0),
            Self::From100kTo200k => Range::new(Some(100_000.0), Some(200_000.0)),
            Self::From200kTo300k => Range::new(Some(200_000.0), Some(300_000.0)),
            Self::From300kTo500k => Range::new(Some(300_000.0), Some(500_000.0)),
            Self::Over500k => Range::at_least(500_000.0),
        }
    }
}

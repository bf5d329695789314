/// Document fields a predicate can address.
///
/// Paths use dotted notation relative to the stored property document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    IsActive,
    Featured,
    Type,
    Status,
    Price,
    Title,
    Description,
    Address,
    City,
    State,
    Country,
    ZipCode,
    Bedrooms,
    Bathrooms,
    Area,
    YearBuilt,
    Floors,
    Parking,
    Amenities,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

impl Field {
    pub const fn path(self) -> &'static str {
        match self {
            Self::IsActive => "isActive",
            Self::Featured => "featured",
            Self::Type => "type",
            Self::Status => "status",
            Self::Price => "price",
            Self::Title => "title",
            Self::Description => "description",
            Self::Address => "location.address",
            Self::City => "location.city",
            Self::State => "location.state",
            Self::Country => "location.country",
            Self::ZipCode => "location.zipCode",
            Self::Bedrooms => "specifications.bedrooms",
            Self::Bathrooms => "specifications.bathrooms",
            Self::Area => "specifications.area",
            Self::YearBuilt => "specifications.yearBuilt",
            Self::Floors => "specifications.floors",
            Self::Parking => "specifications.parking",
            Self::Amenities => "amenities",
            Self::CreatedBy => "createdBy",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }

    /// Path split into object keys, e.g. `["specifications", "bedrooms"]`.
    pub fn segments(self) -> impl Iterator<Item = &'static str> {
        self.path().split('.')
    }
}

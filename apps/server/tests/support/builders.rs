use axum::body::Bytes;
use serde_json::{json, Value};

/// Builder for listing request bodies.
pub struct PropertyBuilder {
    title: String,
    price: f64,
    property_type: String,
    status: String,
    city: String,
    state: String,
    bedrooms: u32,
    bathrooms: u32,
    area: f64,
    year_built: Option<i32>,
    amenities: Vec<String>,
    is_active: bool,
    featured: bool,
    images: Vec<String>,
    featured_image: Option<String>,
}

impl PropertyBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: 250_000.0,
            property_type: "house".to_string(),
            status: "for-sale".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            bedrooms: 3,
            bathrooms: 2,
            area: 1400.0,
            year_built: None,
            amenities: Vec::new(),
            is_active: true,
            featured: false,
            images: Vec::new(),
            featured_image: None,
        }
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = property_type.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn bedrooms(mut self, bedrooms: u32) -> Self {
        self.bedrooms = bedrooms;
        self
    }

    pub fn year_built(mut self, year: i32) -> Self {
        self.year_built = Some(year);
        self
    }

    pub fn amenity(mut self, amenity: impl Into<String>) -> Self {
        self.amenities.push(amenity.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn image(mut self, id: impl Into<String>) -> Self {
        self.images.push(id.into());
        self
    }

    pub fn featured_image(mut self, id: impl Into<String>) -> Self {
        self.featured_image = Some(id.into());
        self
    }

    pub fn build(self) -> Value {
        let mut specifications = json!({
            "bedrooms": self.bedrooms,
            "bathrooms": self.bathrooms,
            "area": self.area,
        });
        if let Some(year) = self.year_built {
            specifications["yearBuilt"] = json!(year);
        }

        let mut body = json!({
            "title": self.title,
            "description": format!("{} with plenty of light.", self.title),
            "price": self.price,
            "type": self.property_type,
            "status": self.status,
            "location": {
                "address": "100 Main St",
                "city": self.city,
                "state": self.state,
                "zipCode": "78701"
            },
            "specifications": specifications,
            "amenities": self.amenities,
            "isActive": self.is_active,
            "featured": self.featured,
            "images": self.images,
        });
        if let Some(featured_image) = self.featured_image {
            body["featuredImage"] = json!(featured_image);
        }
        body
    }
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "homestead-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Content-Type header value and the closed body.
    pub fn finish(mut self) -> (String, Bytes) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            Bytes::from(self.body),
        )
    }
}

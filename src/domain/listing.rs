use serde::{Deserialize, Serialize};

/// A property post as stored under the listings node. The reconciler never
/// mutates listing content, only its moderation status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: Option<Price>,
    #[serde(default)]
    pub images: Vec<String>,
    pub thumbnail: Option<String>,
}

impl Listing {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            description: None,
            location: None,
            price: None,
            images: Vec::new(),
            thumbnail: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("No Name")
    }
}

/// Nightly price. Older posts store free text, newer ones a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

/// Raw listing node as it comes back from the document store, keyed by its
/// parent object. `approve` is the approval flag living on the same node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: Option<Price>,
    pub images: Option<ImageField>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub approve: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    One(String),
    Many(Vec<String>),
}

impl ListingRecord {
    pub fn into_listing(self, key: String) -> Listing {
        let images = match self.images {
            Some(ImageField::One(url)) if !url.is_empty() => vec![url],
            Some(ImageField::Many(urls)) => urls.into_iter().filter(|u| !u.is_empty()).collect(),
            _ => Vec::new(),
        };

        Listing {
            key,
            name: self.name,
            description: self.description,
            location: self.location,
            price: self.price,
            images,
            thumbnail: self.thumbnail,
        }
    }
}

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimpleAlbum {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl SimpleAlbum {
    // Spotify lists images widest first.
    pub fn cover_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimpleTrack {
    // Absent for local files.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub track_number: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FullTrack {
    pub id: Option<String>,
    pub name: String,
    pub album: SimpleAlbum,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub track_number: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FullArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Paging<T> {
    #[serde(deserialize_with = "skip_null_items", bound(deserialize = "T: Deserialize<'de>"))]
    pub items: Vec<T>,
    pub next: Option<String>,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SearchResults {
    pub tracks: Option<Paging<FullTrack>>,
    pub albums: Option<Paging<SimpleAlbum>>,
    pub artists: Option<Paging<FullArtist>>,
}

impl SearchResults {
    pub fn tracks(&self) -> &[FullTrack] {
        self.tracks.as_ref().map_or(&[], |page| &page.items)
    }

    pub fn albums(&self) -> &[SimpleAlbum] {
        self.albums.as_ref().map_or(&[], |page| &page.items)
    }

    pub fn artists(&self) -> &[FullArtist] {
        self.artists.as_ref().map_or(&[], |page| &page.items)
    }
}

// Search pages occasionally carry `null` entries.
fn skip_null_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Vec::<Option<T>>::deserialize(deserializer)?;

    Ok(items.into_iter().flatten().collect())
}

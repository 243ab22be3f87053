// country_source.rs
use crate::continent::Continent;
use crate::country::{CountryRecord, RawCountry};
use crate::error::LoadError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch(&self, continent: Continent) -> Result<Vec<RawCountry>, LoadError>;
}

/// `GET <base>/<continent>` against a REST Countries style service.
pub struct RestCountriesSource {
    client: Client,
    base_url: String,
}

impl RestCountriesSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, continent: Continent) -> String {
        format!("{}/{}", self.base_url, continent.slug())
    }
}

#[async_trait]
impl CountrySource for RestCountriesSource {
    async fn fetch(&self, continent: Continent) -> Result<Vec<RawCountry>, LoadError> {
        let url = self.url_for(continent);
        debug!(%url, "fetching countries");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LoadError::Http {
                status: response.status().as_u16(),
            });
        }
        Ok(response.json::<Vec<RawCountry>>().await?)
    }
}

/// Serves canned country lists; continents without an entry answer with
/// HTTP 404.
#[derive(Debug, Clone, Default)]
pub struct StaticCountrySource {
    countries: HashMap<Continent, Vec<RawCountry>>,
}

impl StaticCountrySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_continent(mut self, continent: Continent, countries: Vec<RawCountry>) -> Self {
        self.countries.insert(continent, countries);
        self
    }
}

#[async_trait]
impl CountrySource for StaticCountrySource {
    async fn fetch(&self, continent: Continent) -> Result<Vec<RawCountry>, LoadError> {
        self.countries
            .get(&continent)
            .cloned()
            .ok_or(LoadError::Http { status: 404 })
    }
}

/// Fetches a continent and keeps the playable countries.
pub async fn load_continent(
    source: &dyn CountrySource,
    continent: Continent,
    min_population: u64,
) -> Result<Vec<CountryRecord>, LoadError> {
    let raw = source.fetch(continent).await?;
    let fetched = raw.len();
    let records: Vec<CountryRecord> = raw
        .iter()
        .filter_map(|country| CountryRecord::from_raw(country, min_population))
        .collect();
    debug!(continent = %continent, fetched, kept = records.len(), "filtered countries");
    if records.is_empty() {
        return Err(LoadError::Empty(continent));
    }
    Ok(records)
}

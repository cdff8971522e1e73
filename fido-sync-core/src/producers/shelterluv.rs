//! Producer for rescues on the Shelterluv shelter-management API.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::Value;
use tracing::{error, info};

use super::ProducerError;
use crate::contract::Producer;
use crate::normalize::{age_from_unix, clean_text, json_to_text, size_from_weight};
use crate::record::DogRecord;

pub(crate) fn default_url() -> String {
    "https://new.shelterluv.com/api/v1/animals".to_string()
}

pub struct ShelterluvProducer {
    http: reqwest::Client,
    rescue_name: String,
    token_env: String,
    url: String,
}

impl ShelterluvProducer {
    pub fn new(http: reqwest::Client, rescue_name: String, token_env: String, url: String) -> Self {
        Self {
            http,
            rescue_name,
            token_env,
            url,
        }
    }

    async fn fetch(&self) -> Result<Vec<DogRecord>, ProducerError> {
        let token = std::env::var(&self.token_env)
            .map_err(|_| ProducerError::MissingToken(self.token_env.clone()))?;
        let payload: Value = self
            .http
            .get(&self.url)
            .query(&[("status_type", "in custody")])
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_animals(&payload, &self.rescue_name, Local::now().date_naive())
    }
}

#[async_trait]
impl Producer for ShelterluvProducer {
    fn name(&self) -> String {
        self.rescue_name.clone()
    }

    async fn produce(&self) -> Vec<DogRecord> {
        match self.fetch().await {
            Ok(dogs) => {
                info!(rescue = %self.rescue_name, count = dogs.len(), "Scraped dogs");
                dogs
            }
            Err(e) => {
                error!(rescue = %self.rescue_name, error = %e, "Error scraping Shelterluv source");
                Vec::new()
            }
        }
    }
}

/// Map an `/animals` response to records: dogs only, skipping those already in foster.
pub fn parse_animals(
    payload: &Value,
    rescue_name: &str,
    today: NaiveDate,
) -> Result<Vec<DogRecord>, ProducerError> {
    let animals = payload
        .get("animals")
        .and_then(Value::as_array)
        .ok_or_else(|| ProducerError::Payload("missing 'animals' array".to_string()))?;

    let text = |animal: &Value, field: &str| animal.get(field).map(json_to_text).unwrap_or_default();

    let dogs = animals
        .iter()
        .filter(|animal| text(*animal, "Type") == "Dog")
        .filter(|animal| !in_foster(animal.get("InFoster")))
        .map(|animal| {
            let size = text(animal, "Size");
            let weight = if size.is_empty() {
                size_from_weight(&text(animal, "CurrentWeightPounds"))
            } else {
                size
            };
            let dob = animal
                .get("DOBUnixTime")
                .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
                .unwrap_or(0);
            DogRecord {
                name: clean_text(&text(animal, "Name")),
                breed: text(animal, "Breed"),
                age: age_from_unix(dob, today),
                gender: text(animal, "Sex"),
                weight,
                description: clean_text(&text(animal, "Description")),
                image_url: text(animal, "CoverPhoto"),
                rescue_name: rescue_name.to_string(),
                their_id: text(animal, "ID"),
            }
        })
        .collect();
    Ok(dogs)
}

fn in_foster(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(_) => true,
    }
}

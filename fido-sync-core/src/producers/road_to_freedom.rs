//! Producer for the Road To Freedom public listing page.
//!
//! Cards are `.Bzl-dog-post` blocks. Breed, gender and age come from the meta
//! rows, identified by their icon class; when the meta rows are missing a
//! value, gender and age are recovered from the free-text bio, which is also
//! the only source of weight.

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::{error, info};

use super::ProducerError;
use crate::contract::Producer;
use crate::normalize::clean_text;
use crate::record::DogRecord;

pub(crate) fn default_url() -> String {
    "https://roadtofreedomrescue.com/forever-foster-dogs/".to_string()
}

pub(crate) fn default_rescue_name() -> String {
    "Road To Freedom".to_string()
}

/// Placeholder age the site shows when no birth date is entered.
const EMPTY_AGE: &str = "0  Days Old";

pub struct RoadToFreedomProducer {
    http: reqwest::Client,
    rescue_name: String,
    url: String,
}

impl RoadToFreedomProducer {
    pub fn new(http: reqwest::Client, rescue_name: String, url: String) -> Self {
        Self {
            http,
            rescue_name,
            url,
        }
    }

    async fn fetch(&self) -> Result<Vec<DogRecord>, ProducerError> {
        let html = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_listing(&html, &self.rescue_name))
    }
}

#[async_trait]
impl Producer for RoadToFreedomProducer {
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
                error!(rescue = %self.rescue_name, error = %e, "Error scraping listing page");
                Vec::new()
            }
        }
    }
}

struct Selectors {
    post: Selector,
    heading_link: Selector,
    image: Selector,
    description: Selector,
    meta_row: Selector,
    icon: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        let parse = |css: &str| Selector::parse(css).expect("static selector is valid");
        Selectors {
            post: parse(".Bzl-dog-post"),
            heading_link: parse("div.Bzl-dog-heading a"),
            image: parse("div.Bzl-dog-img img"),
            description: parse("div.Bzl-dog-description p"),
            meta_row: parse("div.Bzl-dog-meta div.col-12"),
            icon: parse("i"),
        }
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Parse every dog card on the listing page.
pub fn parse_listing(html: &str, rescue_name: &str) -> Vec<DogRecord> {
    let document = Html::parse_document(html);
    let sel = selectors();

    document
        .select(&sel.post)
        .map(|post| {
            let link = post.select(&sel.heading_link).next();
            let name = link.map(element_text).unwrap_or_default();

            let mut their_id = post.value().attr("data-name").unwrap_or("").trim().to_string();
            if their_id.is_empty() {
                their_id = link
                    .and_then(|a| a.value().attr("href"))
                    .and_then(|href| href.trim_end_matches('/').rsplit('/').next())
                    .unwrap_or("")
                    .to_string();
            }

            let image_url = post
                .select(&sel.image)
                .next()
                .and_then(|img| img.value().attr("src"))
                .unwrap_or("")
                .to_string();

            let description = post
                .select(&sel.description)
                .next()
                .map(element_text)
                .unwrap_or_default();

            let (mut breed, mut gender, mut age) = (String::new(), String::new(), String::new());
            for row in post.select(&sel.meta_row) {
                let Some(icon) = row.select(&sel.icon).next() else {
                    continue;
                };
                let has = |class: &str| icon.value().classes().any(|c| c == class);
                if has("icon-dog-face") {
                    breed = element_text(row).replace('\n', "");
                } else if has("icon-female-sign") {
                    gender = "Female".to_string();
                } else if has("icon-male-sign") {
                    gender = "Male".to_string();
                } else if has("icon-cake") {
                    age = element_text(row).replace('\n', "");
                }
            }

            let info = parse_description_info(&description);
            if gender.is_empty() && !info.gender.is_empty() {
                gender = info.gender;
            }
            if (age.is_empty() || age == EMPTY_AGE) && !info.age.is_empty() {
                age = info.age;
            }

            DogRecord {
                name,
                breed: breed.trim().to_string(),
                age: age.trim().to_string(),
                gender,
                weight: info.weight,
                description,
                image_url,
                rescue_name: rescue_name.to_string(),
                their_id,
            }
        })
        .collect()
}

/// Attributes recovered from a free-text bio.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionInfo {
    pub age: String,
    pub gender: String,
    pub weight: String,
}

struct Patterns {
    weight: Regex,
    female: Regex,
    male: Regex,
    age: Regex,
    half: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("static regex is valid");
        Patterns {
            weight: re(r"(?i)(\d+)\s*pounds?"),
            female: re(r"(?i)\bfemale\b"),
            male: re(r"(?i)\bmale\b"),
            age: re(r"(?i)(\w+\s+and\s+a\s+half|\d+(?:\.\d+)?)\s*(?:years?\s*old)?(?:,|\.|\s|$)"),
            half: re(r"(?i)^(\w+)\s+and\s+a\s+half"),
        }
    })
}

fn word_to_number(word: &str) -> Option<&'static str> {
    Some(match word.to_ascii_lowercase().as_str() {
        "one" => "1",
        "two" => "2",
        "three" => "3",
        "four" => "4",
        "five" => "5",
        "six" => "6",
        "seven" => "7",
        "eight" => "8",
        "nine" => "9",
        "ten" => "10",
        _ => return None,
    })
}

/// Extract age, gender and weight from bios like
/// `"I am a one and a half year old female who weighs 50 pounds."`.
pub fn parse_description_info(description: &str) -> DescriptionInfo {
    let mut info = DescriptionInfo::default();
    if description.is_empty() {
        return info;
    }
    let p = patterns();

    if let Some(caps) = p.weight.captures(description) {
        info.weight = caps[1].to_string();
    }

    if p.female.is_match(description) {
        info.gender = "Female".to_string();
    } else if p.male.is_match(description) {
        info.gender = "Male".to_string();
    }

    if let Some(caps) = p.age.captures(description) {
        let age_text = &caps[1];
        if let Some(half) = p.half.captures(age_text) {
            let base = &half[1];
            if let Some(n) = word_to_number(base) {
                info.age = format!("{n}.5");
            } else if base.chars().all(|c| c.is_ascii_digit()) {
                info.age = format!("{base}.5");
            }
        } else {
            info.age = word_to_number(age_text)
                .map(str::to_string)
                .unwrap_or_else(|| age_text.to_string());
        }
    }

    info
}

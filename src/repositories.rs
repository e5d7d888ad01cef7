//! Repository statistics client: aggregation, ranking and fallback data.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc, Weekday};
use futures_util::future::join3;
use serde::{Deserialize, Serialize};

use crate::logging::Logger;

const FEATURED_LIMIT: usize = 6;
const FEATURED_CANDIDATES: usize = 20;
const SUMMARY_REPOSITORY_LIMIT: usize = 100;
const LANGUAGE_REPOSITORY_LIMIT: usize = 50;
const TOP_LANGUAGE_COUNT: usize = 10;
const RECENT_ACTIVITY_MONTHS: u32 = 6;
const POPULAR_LANGUAGES: [&str; 4] = ["TypeScript", "JavaScript", "Python", "React"];

/// The public API has no unauthenticated commit total.
const REPORTED_COMMITS: u64 = 1_200;

const FALLBACK_REPO_COUNT: u64 = 25;
const FALLBACK_STAR_COUNT: u64 = 150;
const FALLBACK_FORK_COUNT: u64 = 45;
const FALLBACK_LANGUAGES: [(&str, u64); 7] = [
    ("TypeScript", 35),
    ("JavaScript", 30),
    ("Python", 15),
    ("Java", 10),
    ("CSS", 5),
    ("HTML", 3),
    ("Shell", 2),
];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },
    #[error("{endpoint} responded with status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("invalid endpoint URL")]
    InvalidUrl,
}

impl FetchError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Status { status: 403 | 429, .. } => "rate_limited",
            Self::Status { .. } => "http_status",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::InvalidUrl => "invalid_url",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub size: u64,
}

impl Repository {
    fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|value| !value.trim().is_empty())
    }

    fn has_homepage(&self) -> bool {
        self.homepage.as_deref().is_some_and(|value| !value.trim().is_empty())
    }

    /// Name-based heuristic only; forks under other names slip through.
    fn looks_like_fork(&self) -> bool {
        self.name.contains("fork")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRepository {
    pub score: u64,
    #[serde(flatten)]
    pub repository: Repository,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageUsage {
    pub name: String,
    pub bytes: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
    pub bucket_level: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    Live,
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub total_commits: u64,
    pub total_repo_count: u64,
    pub total_star_count: u64,
    pub total_fork_count: u64,
    pub language_size_by_name: Vec<LanguageUsage>,
    pub daily_contribution_series: Vec<ContributionDay>,
    pub provenance: Provenance,
    pub contributions_synthetic: bool,
}

impl RepositorySummary {
    pub fn fallback(today: NaiveDate) -> Self {
        Self {
            total_commits: REPORTED_COMMITS,
            total_repo_count: FALLBACK_REPO_COUNT,
            total_star_count: FALLBACK_STAR_COUNT,
            total_fork_count: FALLBACK_FORK_COUNT,
            language_size_by_name: FALLBACK_LANGUAGES
                .iter()
                .map(|(name, bytes)| LanguageUsage {
                    name: (*name).to_string(),
                    bytes: *bytes,
                })
                .collect(),
            daily_contribution_series: synthetic_contributions(today),
            provenance: Provenance::Fallback,
            contributions_synthetic: true,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// Read-only source of profile and repository records.
#[allow(async_fn_in_trait)]
pub trait RepositorySource {
    async fn profile(&self) -> Result<Profile, FetchError>;

    /// Most recently updated owned repositories, newest first.
    async fn repositories(&self, limit: usize) -> Result<Vec<Repository>, FetchError>;
}

pub struct RemoteDataClient<S> {
    source: S,
    logger: Logger,
    reference_time: Option<DateTime<Utc>>,
}

impl<S: RepositorySource> RemoteDataClient<S> {
    pub fn new(source: S, logger: Logger) -> Self {
        Self {
            source,
            logger,
            reference_time: None,
        }
    }

    /// Pins "now" for activity windows and the synthetic series.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    /// Never fails: any failed underlying request yields the fallback summary.
    pub async fn fetch_summary(&self) -> RepositorySummary {
        let today = self.now().date_naive();
        let (profile, repositories, languages) = join3(
            self.source.profile(),
            self.owned_repositories(SUMMARY_REPOSITORY_LIMIT),
            self.language_totals(),
        )
        .await;

        let combined = profile.and_then(|profile| Ok((profile, repositories?, languages?)));

        match combined {
            Ok((profile, repositories, languages)) => {
                let summary = RepositorySummary {
                    total_commits: REPORTED_COMMITS,
                    total_repo_count: profile.public_repos,
                    total_star_count: repositories.iter().map(|repo| repo.stargazers_count).sum(),
                    total_fork_count: repositories.iter().map(|repo| repo.forks_count).sum(),
                    language_size_by_name: languages,
                    daily_contribution_series: synthetic_contributions(today),
                    provenance: Provenance::Live,
                    contributions_synthetic: true,
                };
                self.logger.info(
                    "summary_fetch_complete",
                    serde_json::json!({
                        "repo_count": summary.total_repo_count,
                        "languages": summary.language_size_by_name.len(),
                    }),
                );
                summary
            }
            Err(error) => {
                self.logger.warn(
                    "summary_fetch_fallback",
                    serde_json::json!({
                        "error_class": error.error_class(),
                        "message": error.to_string(),
                    }),
                );
                RepositorySummary::fallback(today)
            }
        }
    }

    /// Top six repositories by [`featured_score`], highest first. Equal
    /// scores keep the star and recency order of [`Self::fetch_repositories`].
    pub async fn fetch_featured_items(&self) -> Result<Vec<RankedRepository>, FetchError> {
        let repositories = self
            .fetch_repositories(FEATURED_CANDIDATES)
            .await
            .inspect_err(|error| {
                self.logger.warn(
                    "featured_fetch_failed",
                    serde_json::json!({
                        "error_class": error.error_class(),
                        "message": error.to_string(),
                    }),
                );
            })?;

        Ok(rank_featured(repositories, self.now()))
    }

    /// Standalone list for component-level rendering: stars first, then most
    /// recently updated. Errors reach the caller.
    pub async fn fetch_repositories(&self, limit: usize) -> Result<Vec<Repository>, FetchError> {
        let mut repositories = self.owned_repositories(limit).await?;
        repositories.sort_by(|a, b| {
            b.stargazers_count
                .cmp(&a.stargazers_count)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        Ok(repositories)
    }

    async fn owned_repositories(&self, limit: usize) -> Result<Vec<Repository>, FetchError> {
        let repositories = self.source.repositories(limit).await?;
        Ok(repositories
            .into_iter()
            .filter(|repo| !repo.looks_like_fork())
            .collect())
    }

    async fn language_totals(&self) -> Result<Vec<LanguageUsage>, FetchError> {
        let repositories = self.owned_repositories(LANGUAGE_REPOSITORY_LIMIT).await?;
        Ok(aggregate_languages(&repositories))
    }
}

pub fn featured_score(repository: &Repository, now: DateTime<Utc>) -> u64 {
    let recent_cutoff = now.checked_sub_months(Months::new(RECENT_ACTIVITY_MONTHS));
    let mut score = repository.stargazers_count.saturating_mul(2);

    if recent_cutoff.is_some_and(|cutoff| repository.updated_at > cutoff) {
        score += 10;
    }
    if repository.has_description() {
        score += 5;
    }
    if repository.has_homepage() {
        score += 8;
    }
    if repository
        .language
        .as_deref()
        .is_some_and(|language| POPULAR_LANGUAGES.contains(&language))
    {
        score += 5;
    }

    score + 2 * repository.topics.len() as u64
}

/// Stable sort keeps the incoming order among equal scores.
pub fn rank_featured(repositories: Vec<Repository>, now: DateTime<Utc>) -> Vec<RankedRepository> {
    let mut ranked: Vec<RankedRepository> = repositories
        .into_iter()
        .filter(|repo| !repo.looks_like_fork())
        .map(|repository| RankedRepository {
            score: featured_score(&repository, now),
            repository,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(FEATURED_LIMIT);
    ranked
}

/// Sums repository size by primary language, keeping the ten largest.
/// Equal totals keep first-encountered order.
pub fn aggregate_languages(repositories: &[Repository]) -> Vec<LanguageUsage> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, u64> = HashMap::new();

    for repository in repositories.iter().take(LANGUAGE_REPOSITORY_LIMIT) {
        let Some(language) = repository.language.as_deref().filter(|value| !value.is_empty()) else {
            continue;
        };

        let total = totals.entry(language.to_string()).or_insert_with(|| {
            order.push(language.to_string());
            0
        });
        *total += repository.size;
    }

    let mut usage: Vec<LanguageUsage> = order
        .into_iter()
        .map(|name| {
            let bytes = totals.get(&name).copied().unwrap_or(0);
            LanguageUsage { name, bytes }
        })
        .collect();

    usage.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    usage.truncate(TOP_LANGUAGE_COUNT);
    usage
}

/// SplitMix64; enough for display filler and reproducible per seed.
struct FillerRng(u64);

impl FillerRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_in(&mut self, low: u32, high: u32) -> u32 {
        low + (self.next_unit() * f64::from(high - low + 1)) as u32
    }
}

/// One synthetic day per date from a year ago through `today`, seeded by `today`.
pub fn synthetic_contributions(today: NaiveDate) -> Vec<ContributionDay> {
    let start = today.checked_sub_months(Months::new(12)).unwrap_or(today);
    let mut rng = FillerRng(today.num_days_from_ce() as u64);

    start
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| {
            let (count, bucket_level) = if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                if rng.next_unit() > 0.8 {
                    let count = rng.next_in(1, 4);
                    (count, weekend_bucket(count))
                } else {
                    (0, 0)
                }
            } else if rng.next_unit() > 0.7 {
                let count = rng.next_in(1, 8);
                (count, weekday_bucket(count))
            } else {
                (0, 0)
            };

            ContributionDay {
                date,
                count,
                bucket_level,
            }
        })
        .collect()
}

fn weekday_bucket(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        _ => 4,
    }
}

fn weekend_bucket(count: u32) -> u8 {
    match count {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    }
}

/// Groups days into Sunday-started weeks for the contribution grid.
pub fn weeks(series: &[ContributionDay]) -> Vec<Vec<ContributionDay>> {
    let mut weeks: Vec<Vec<ContributionDay>> = Vec::new();
    let mut current: Vec<ContributionDay> = Vec::new();

    for day in series {
        if day.date.weekday() == Weekday::Sun && !current.is_empty() {
            weeks.push(std::mem::take(&mut current));
        }
        current.push(day.clone());
    }

    if !current.is_empty() {
        weeks.push(current);
    }

    weeks
}

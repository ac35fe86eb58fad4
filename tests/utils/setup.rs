use chrono::NaiveDate;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use bracket_engine::{
    matches::InMemoryMatchRepository,
    participant::{InMemoryParticipantRepository, ParticipantModel},
    tournament::InMemoryTournamentRepository,
    BracketGenerator, EngineConfig, ProgressionTracker, Repositories, TournamentFormat,
    TournamentLocks, TournamentModel,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Installs a test-friendly subscriber once; later calls are ignored
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bracket_engine=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub struct TestSetup {
    pub repositories: Repositories,
    pub match_repo: Arc<InMemoryMatchRepository>,
    pub locks: TournamentLocks,
    pub config: EngineConfig,
    pub generator: BracketGenerator,
    pub tracker: ProgressionTracker,
    pub tournament: TournamentModel,
    pub participants: Vec<ParticipantModel>, // registration order
}

pub struct TestSetupBuilder {
    format: TournamentFormat,
    ratings: Vec<f64>,
    groups: Option<(u32, u32)>,
    start_date: NaiveDate,
    config: EngineConfig,
    shuffle_seed: Option<u64>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            format: TournamentFormat::Knockout,
            ratings: vec![],
            groups: None,
            start_date: NaiveDate::from_ymd_opt(2026, 7, 10).unwrap(),
            config: EngineConfig::default(),
            shuffle_seed: None,
        }
    }

    pub fn with_format(mut self, format: TournamentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_ratings(mut self, ratings: Vec<f64>) -> Self {
        self.ratings = ratings;
        self
    }

    /// `n` participants rated n, n-1, ..., 1 so seed order equals registration order
    pub fn with_participants(self, n: usize) -> Self {
        self.with_ratings((0..n).rev().map(|r| (r + 1) as f64).collect())
    }

    pub fn with_groups(mut self, num_groups: u32, advance_count: u32) -> Self {
        self.format = TournamentFormat::Grouped;
        self.groups = Some((num_groups, advance_count));
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub async fn build(self) -> TestSetup {
        init_tracing();

        let match_repo = Arc::new(InMemoryMatchRepository::new());
        let repositories = Repositories::new(
            Arc::new(InMemoryTournamentRepository::new()),
            Arc::new(InMemoryParticipantRepository::new()),
            match_repo.clone(),
        );

        let mut tournament = TournamentModel::new(self.format, self.start_date);
        if let Some((num_groups, advance_count)) = self.groups {
            tournament = tournament.with_groups(num_groups, advance_count);
        }
        repositories.tournaments.create(&tournament).await.unwrap();

        let mut participants = Vec::with_capacity(self.ratings.len());
        for rating in self.ratings {
            let participant = ParticipantModel::new(tournament.id, Uuid::new_v4(), rating);
            repositories
                .participants
                .register(&participant)
                .await
                .unwrap();
            participants.push(participant);
        }

        let locks = TournamentLocks::new();
        let mut generator =
            BracketGenerator::new(repositories.clone(), locks.clone(), self.config.clone());
        if let Some(seed) = self.shuffle_seed {
            generator = generator.with_shuffle_seed(seed);
        }
        let tracker =
            ProgressionTracker::new(repositories.clone(), locks.clone(), self.config.clone());

        TestSetup {
            repositories,
            match_repo,
            locks,
            config: self.config,
            generator,
            tracker,
            tournament,
            participants,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

use async_openai::{config::OpenAIConfig, Client};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use report_broadcast_backend::controllers::{
    import::ImportController, playback::PlaybackController, report::ReportController,
    translation::TranslationController,
};
use report_broadcast_backend::domain::{
    generation::GenerationService,
    import::ImportService,
    playback::PlaybackService,
    report::ReportService,
    translation::{
        InMemoryJobStateStore, SpeechSynthesizer, TokioDispatcher, TranslationScheduler,
        TranslationService,
    },
};
use report_broadcast_backend::infrastructure::config::{Config, LogFormat, StorageBackend};
use report_broadcast_backend::infrastructure::db::{check_connection, create_pool};
use report_broadcast_backend::infrastructure::http::{build_router, start_http_server};
use report_broadcast_backend::infrastructure::repositories::{
    HttpMeetingSourceRepository, MemoryStore, OpenAiLlmRepository, OpenAiTtsRepository,
    PostgresReflectionAudioRepository, PostgresReportRepository, PostgresTranslationRepository,
    ReflectionAudioRepository, ReportRepository, TranslationRepository,
};

type Stores = (
    Arc<dyn ReportRepository>,
    Arc<dyn TranslationRepository>,
    Arc<dyn ReflectionAudioRepository>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Report Broadcast Backend on {}:{}",
        config.host,
        config.port
    );

    let (report_repo, translation_repo, reflection_audio_repo) = create_stores(&config).await?;

    // OpenAI client shared by chat and speech
    let mut openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base_url.clone());
    }
    if config.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; generation and speech calls will fail");
    }
    let openai_client = Arc::new(Client::with_config(openai_config));

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Capabilities
    tracing::info!("Instantiating capabilities...");
    let llm_repo = Arc::new(OpenAiLlmRepository::new(
        openai_client.clone(),
        config.llm_settings(),
    ));
    let tts_repo = Arc::new(OpenAiTtsRepository::new(
        openai_client,
        config.tts_model.clone(),
        config.tts_voice.clone(),
    ));
    let meeting_source = Arc::new(HttpMeetingSourceRepository::new(
        config.meeting_source_base_url.clone(),
        config.meeting_source_token.clone(),
        config.meeting_source_timeout(),
    )?);

    // 2. Services
    tracing::info!("Instantiating services...");
    let generation_service = Arc::new(GenerationService::new(llm_repo));
    let speech = Arc::new(SpeechSynthesizer::new(tts_repo, config.tts_cache_enabled));
    let jobs = Arc::new(InMemoryJobStateStore::new());
    let translation_service = Arc::new(TranslationService::new(
        report_repo.clone(),
        translation_repo.clone(),
        reflection_audio_repo,
        generation_service.clone(),
        speech,
        jobs.clone(),
    ));
    let scheduler = Arc::new(TranslationScheduler::new(
        translation_service.clone(),
        jobs,
        Arc::new(TokioDispatcher),
    ));
    let report_service = Arc::new(ReportService::new(
        report_repo.clone(),
        translation_repo,
        generation_service,
        scheduler.clone(),
    ));
    let import_service = Arc::new(ImportService::new(
        report_repo.clone(),
        meeting_source,
        scheduler.clone(),
    ));
    let playback_service = Arc::new(PlaybackService::new(
        report_repo.clone(),
        translation_service.clone(),
    ));

    // 3. Controllers
    tracing::info!("Instantiating controllers...");
    let report_controller = Arc::new(ReportController::new(
        report_service,
        translation_service.clone(),
    ));
    let translation_controller = Arc::new(TranslationController::new(
        translation_service,
        scheduler,
    ));
    let playback_controller = Arc::new(PlaybackController::new(playback_service));
    let import_controller = Arc::new(ImportController::new(import_service));

    let app = build_router(
        report_repo,
        &config.cors_allow_origins,
        report_controller,
        translation_controller,
        playback_controller,
        import_controller,
    );

    start_http_server(&config, app).await?;

    Ok(())
}

async fn create_stores(config: &Config) -> Result<Stores, Box<dyn std::error::Error>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            tracing::info!("Database connection pool created");

            check_connection(&pool).await?;
            tracing::info!("Database connection verified");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");

            let pool = Arc::new(pool);
            let report_repo: Arc<dyn ReportRepository> =
                Arc::new(PostgresReportRepository::new(pool.clone()));
            let translation_repo: Arc<dyn TranslationRepository> =
                Arc::new(PostgresTranslationRepository::new(pool.clone()));
            let reflection_audio_repo: Arc<dyn ReflectionAudioRepository> =
                Arc::new(PostgresReflectionAudioRepository::new(pool));
            Ok((report_repo, translation_repo, reflection_audio_repo))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            let report_repo: Arc<dyn ReportRepository> = store.clone();
            let translation_repo: Arc<dyn TranslationRepository> = store.clone();
            let reflection_audio_repo: Arc<dyn ReflectionAudioRepository> = store;
            Ok((report_repo, translation_repo, reflection_audio_repo))
        }
    }
}

fn init_logging(config: &Config) {
    let default_filter = if config.is_development() {
        "report_broadcast_backend=debug,tower_http=debug"
    } else {
        "report_broadcast_backend=info,tower_http=info"
    };

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

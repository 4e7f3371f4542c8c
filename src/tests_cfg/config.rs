use crate::{
    config::{AgentSettings, AiSettings, Config, DataSettings, Server, StoreSettings},
    logger,
};

/// Configuration pointing at a local store, with logging disabled.
#[must_use]
pub fn test_config() -> Config {
    Config {
        logger: logger::Config {
            enable: false,
            level: logger::LogLevel::Off,
            format: logger::Format::Compact,
            override_filter: None,
            file_appender: None,
        },
        server: Server {
            binding: "localhost".to_string(),
            port: 5150,
            host: "http://localhost".to_string(),
            request_timeout_ms: 5_000,
            cors: false,
        },
        store: StoreSettings {
            endpoint: "http://localhost:7200".to_string(),
            repository: "jaguars".to_string(),
            timeout_ms: 1_000,
        },
        ai: AiSettings {
            assistant: None,
            agent: AgentSettings::default(),
        },
        data: DataSettings::default(),
    }
}

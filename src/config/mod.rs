mod app_config;

pub use app_config::{
    AppConfig, AwsConfig, BatchConfig, LogFormat, LoggingConfig, RatingsConfig, ServerConfig,
};

use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::General;
use crate::errors::LoggingError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} - {m}{n}";

/// Builds the log4rs configuration from the general config section
///
/// # Arguments
///
/// * 'general' - log path, level and whether to also log to the console
pub fn build_log_config(general: &General) -> Result<Config, LoggingError> {
    let mut builder = Config::builder();
    let mut root = Root::builder();

    if general.log_to_stdout {
        // stdout carries forecast output, so log lines go to stderr
        let console = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("console", Box::new(console)));
        root = root.appender("console");
    }

    if let Some(log_path) = &general.log_path {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(log_path)?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    Ok(builder.build(root.build(general.log_level))?)
}

/// Sets up logging for the process
///
/// # Arguments
///
/// * 'general' - log path, level and whether to also log to the console
pub fn setup_logger(general: &General) -> Result<(), LoggingError> {
    let config = build_log_config(general)?;
    log4rs::init_config(config)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;
    use super::*;

    #[test]
    fn builds_console_and_file_appenders() {
        let dir = tempfile::tempdir().unwrap();
        let general = General {
            log_path: Some(dir.path().join("wxcast.log").to_string_lossy().to_string()),
            log_level: LevelFilter::Debug,
            log_to_stdout: true,
        };

        let config = build_log_config(&general).unwrap();
        assert_eq!(config.appenders().len(), 2);
        assert_eq!(config.root().level(), LevelFilter::Debug);
    }

    #[test]
    fn logging_can_be_silent() {
        let general = General { log_path: None, log_level: LevelFilter::Off, log_to_stdout: false };
        let config = build_log_config(&general).unwrap();
        assert!(config.appenders().is_empty());
    }
}

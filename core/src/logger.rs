//! Optional diagnostic sink for failed queries.
//!
//! A client without a logger drops these messages. `TracingLogger` forwards
//! them to the `tracing` ecosystem; any `Fn(&str)` closure works as well.

/// Receives one formatted line per failed query.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Emits every message as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::warn!(target: "threatexchange", "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closures_are_loggers() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let logger = move |message: &str| sink.lock().unwrap().push(message.to_string());
        logger.log("first");
        Logger::log(&logger, "second");
        assert_eq!(*lines.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn tracing_logger_is_usable_as_trait_object() {
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
        logger.log("no subscriber installed");
    }
}

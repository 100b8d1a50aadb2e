use std::{collections::HashSet, fmt::Display};

use tracing_subscriber::{Layer, filter::Targets, layer::SubscriberExt, util::SubscriberInitExt};

/// Type of event to trace.
#[derive(Clone, Debug, Eq, Hash, PartialEq, clap::ValueEnum)]
pub(crate) enum TraceEvent {
    /// Traces the scanning of declarations.
    #[value(name = "parse")]
    Parse,
    /// Traces the resolution of variable references.
    #[value(name = "expansion")]
    Expansion,
    /// Traces the reading and merging of files.
    #[value(name = "load")]
    Load,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::Expansion => write!(f, "expansion"),
            Self::Load => write!(f, "load"),
        }
    }
}

pub(crate) struct TraceEventConfig {
    enabled_trace_events: HashSet<TraceEvent>,
}

impl TraceEventConfig {
    /// Installs a global subscriber that writes to stderr, enabling debug output for the
    /// given events.
    pub fn init(enabled_log_events: &[TraceEvent]) -> Self {
        let config = Self {
            enabled_trace_events: enabled_log_events.iter().cloned().collect(),
        };

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_filter(config.compose_filter());

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            // Something went wrong; proceed on anyway but complain audibly.
            eprintln!("warning: failed to initialize tracing.");
        }

        config
    }

    fn compose_filter(&self) -> Targets {
        let mut filter =
            Targets::new().with_default(tracing_subscriber::filter::LevelFilter::INFO);

        for event in &self.enabled_trace_events {
            filter = filter.with_target(event.to_string(), tracing::Level::DEBUG);
        }

        filter
    }

    pub fn enabled_events(&self) -> &HashSet<TraceEvent> {
        &self.enabled_trace_events
    }
}

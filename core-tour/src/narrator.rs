use crate::error::Result;

use bridge_traits::{DiagnosticLine, DiagnosticSink};

use std::fmt;
use std::sync::Arc;

/// Writes a scenario's narrative lines to a sink, tagged with the scenario
/// name as the line target.
#[derive(Clone)]
pub struct Narrator {
    sink: Arc<dyn DiagnosticSink>,
    scenario: &'static str,
}

impl Narrator {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            sink,
            scenario: "tour",
        }
    }

    /// Same sink, different target.
    pub fn scenario(&self, scenario: &'static str) -> Self {
        Self {
            sink: self.sink.clone(),
            scenario,
        }
    }

    pub fn name(&self) -> &'static str {
        self.scenario
    }

    pub async fn say(&self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        tracing::trace!(scenario = self.scenario, %message, "narrating");
        self.sink
            .emit(DiagnosticLine::info(self.scenario, message))
            .await?;
        Ok(())
    }

    pub async fn flush(&self) -> Result<()> {
        self.sink.flush().await?;
        Ok(())
    }
}

impl fmt::Debug for Narrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Narrator")
            .field("scenario", &self.scenario)
            .finish_non_exhaustive()
    }
}

//! AppGroup - Several apps started and stopped as one

use crate::app::App;
use async_trait::async_trait;
use shared::{Error, Result};
use tracing::{debug, warn};

/// Ordered set of apps.
///
/// Members start in registration order and stop in reverse. A member whose
/// `run` failed is still shut down, since it may hold partial resources.
#[derive(Default)]
pub struct AppGroup {
    members: Vec<(String, Box<dyn App>)>,
    /// Number of leading members whose `run` has been attempted
    started: usize,
}

impl AppGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member
    pub fn with(mut self, name: impl Into<String>, app: impl App + 'static) -> Self {
        self.push(name, app);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, app: impl App + 'static) {
        self.members.push((name.into(), Box::new(app)));
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[async_trait]
impl App for AppGroup {
    async fn run(&mut self) -> Result<()> {
        while self.started < self.members.len() {
            let (name, app) = &mut self.members[self.started];
            self.started += 1;
            debug!(member = %name, "starting");
            app.run().await?;
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        let mut errors = Vec::new();
        while self.started > 0 {
            self.started -= 1;
            let (name, app) = &mut self.members[self.started];
            debug!(member = %name, "stopping");
            if let Err(e) = app.shutdown().await {
                warn!(member = %name, error = %e, "member shutdown failed");
                errors.push(e);
            }
        }
        Error::collect(errors)
    }
}

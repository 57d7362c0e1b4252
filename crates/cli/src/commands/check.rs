//! groundwork check command

use adapter::{MemoryBroker, MemoryBucket, MemoryCache, MemoryTable};
use clap::{Args, ValueEnum};
use conformance::{HarnessConfig, Report};
use orm::{MySqlModel, PostgresModel};
use shared::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Suite {
    Cache,
    Pubsub,
    Bucket,
    Orm,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Suites to run (default: all)
    #[arg(short, long, value_enum)]
    pub suite: Vec<Suite>,

    /// Use the contract's real-world timings (2s TTL) instead of fast ones
    #[arg(long)]
    pub standard_timings: bool,
}

impl CheckCommand {
    fn suites(&self) -> Vec<Suite> {
        if self.suite.is_empty() {
            vec![Suite::Cache, Suite::Pubsub, Suite::Bucket, Suite::Orm]
        } else {
            self.suite.clone()
        }
    }

    fn harness(&self) -> HarnessConfig {
        if self.standard_timings {
            HarnessConfig::default()
        } else {
            HarnessConfig::fast()
        }
    }

    /// Run the selected suites against fresh in-memory backends
    pub async fn report(&self, settings: &Settings) -> anyhow::Result<Report> {
        let harness = self.harness();
        let mut report = Report::new();

        for suite in self.suites() {
            tracing::info!(?suite, "running conformance suite");
            let outcome = match suite {
                Suite::Cache => {
                    let cache = MemoryCache::from_settings(&settings.cache);
                    conformance::cache::run(&cache, &harness).await
                }
                Suite::Pubsub => {
                    let broker = MemoryBroker::new(&settings.pubsub);
                    let subscriber = broker.subscriber()?;
                    conformance::pubsub::run(&broker.publisher(), &subscriber, &harness).await
                }
                Suite::Bucket => {
                    let bucket = MemoryBucket::new(&settings.bucket);
                    conformance::bucket::run(&bucket, &harness).await
                }
                Suite::Orm => {
                    let mysql: MemoryTable<MySqlModel> = MemoryTable::new();
                    let postgres: MemoryTable<PostgresModel> = MemoryTable::new();
                    let mut outcome = conformance::orm::run(&mysql, MySqlModel::new).await;
                    outcome.merge(conformance::orm::run(&postgres, PostgresModel::new).await);
                    outcome
                }
            };
            report.merge(outcome);
        }
        Ok(report)
    }

    pub async fn run(&self, settings: &Settings) -> anyhow::Result<()> {
        let report = self.report(settings).await?;
        println!("{}", report);
        if !report.is_success() {
            anyhow::bail!("{} conformance check(s) failed", report.failures().count());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backends_conform() {
        let cmd = CheckCommand {
            suite: Vec::new(),
            standard_timings: false,
        };
        let report = cmd.report(&Settings::default()).await.unwrap();
        report.assert_passed();
        assert!(report.outcomes().iter().any(|o| o.suite == "orm"));
    }

    #[tokio::test]
    async fn test_single_suite() {
        let cmd = CheckCommand {
            suite: vec![Suite::Bucket],
            standard_timings: false,
        };
        let report = cmd.report(&Settings::default()).await.unwrap();
        assert!(report.outcomes().iter().all(|o| o.suite == "bucket"));
    }
}

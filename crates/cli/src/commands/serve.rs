//! groundwork serve command

use adapter::MemoryServices;
use clap::Args;
use lifecycle::{cancel_on_signal, serve};
use logger::{fields, Logger, TracingLogger};
use shared::{Context, Settings};
use std::time::Duration;

#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Stop on its own after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub for_secs: Option<u64>,
}

impl ServeCommand {
    /// Host the in-memory backends until Ctrl-C (or `--for-secs`)
    pub async fn run(&self, settings: &Settings) -> anyhow::Result<()> {
        let log = TracingLogger::from_settings(&settings.log);
        let (ctx, handle) = Context::background().with_cancel();
        let ctx = match self.for_secs {
            Some(secs) => ctx.with_timeout(Duration::from_secs(secs)),
            None => ctx,
        };
        let signal_task = cancel_on_signal(handle);

        let services = MemoryServices::new(settings);
        log.infow(
            "serving in-memory backends",
            fields! {
                "bucket" => settings.bucket.name.clone(),
                "pubsub_buffer" => settings.pubsub.buffer as u64,
            },
        );

        let mut group = services.into_group();
        let result = serve(&mut group, &ctx, settings.shutdown_timeout()).await;
        signal_task.abort();

        result?;
        log.info(&[&"stopped"]);
        Ok(())
    }
}

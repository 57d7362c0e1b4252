//! Record repository suite

use crate::{dead_contexts, ensure, expect_cancellation, CheckResult, Report, Step};
use orm::{Record, RecordId, RecordRepository, Scope};
use shared::{Context, ErrorKind};

const SUITE: &str = "orm";

/// Run the repository checks. `fresh` builds an unsaved record.
pub async fn run<R, T, F>(repo: &T, fresh: F) -> Report
where
    R: Record,
    T: RecordRepository<R> + ?Sized,
    F: Fn() -> R,
{
    let ctx = Context::background();
    let mut report = Report::new();

    let stored = match insert_assigns_identity(repo, &ctx, fresh()).await {
        Ok(stored) => {
            report.record(SUITE, "insert_assigns_identity", Ok(()));
            stored
        }
        Err(reason) => {
            report.record(SUITE, "insert_assigns_identity", Err(reason));
            return report;
        }
    };

    report.record(SUITE, "update_refreshes", update_refreshes(repo, &ctx, &stored).await);
    report.record(
        SUITE,
        "soft_delete_keeps_created_at",
        soft_delete_keeps_created_at(repo, &ctx, &stored).await,
    );
    report.record(SUITE, "restore", restore(repo, &ctx, &stored).await);
    report.record(SUITE, "missing_record", missing_record(repo, &ctx).await);
    report.record(
        SUITE,
        "cancelled_context",
        cancelled_context(repo, &ctx, &stored, fresh()).await,
    );
    report
}

async fn insert_assigns_identity<R, T>(repo: &T, ctx: &Context, record: R) -> CheckResult<R>
where
    R: Record,
    T: RecordRepository<R> + ?Sized,
{
    let stored = repo.insert(ctx, record).await.step("insert")?;
    let base = stored.base();
    ensure!(base.has_id(), "inserted record has no id");
    ensure!(
        base.created_at() == base.updated_at(),
        "created_at {} differs from updated_at {} on insert",
        base.created_at(),
        base.updated_at()
    );
    ensure!(!base.is_deleted(), "new record is deleted");

    let found = repo
        .find(ctx, stored.id(), Scope::Active)
        .await
        .step("find")?;
    ensure!(found.id() == stored.id(), "found a different record");
    Ok(stored)
}

async fn update_refreshes<R, T>(repo: &T, ctx: &Context, stored: &R) -> CheckResult
where
    R: Record,
    T: RecordRepository<R> + ?Sized,
{
    let updated = repo.update(ctx, stored.clone()).await.step("update")?;
    ensure!(
        updated.base().created_at() == stored.base().created_at(),
        "update changed created_at"
    );
    ensure!(
        updated.base().updated_at() >= stored.base().updated_at(),
        "update moved updated_at backwards"
    );
    Ok(())
}

async fn soft_delete_keeps_created_at<R, T>(repo: &T, ctx: &Context, stored: &R) -> CheckResult
where
    R: Record,
    T: RecordRepository<R> + ?Sized,
{
    repo.soft_delete(ctx, stored.id()).await.step("soft_delete")?;

    let row = repo
        .find(ctx, stored.id(), Scope::WithDeleted)
        .await
        .step("find with deleted")?;
    ensure!(row.base().deleted_at().is_some(), "deleted_at not set");
    ensure!(
        row.base().created_at() == stored.base().created_at(),
        "soft delete changed created_at"
    );

    match repo.find(ctx, stored.id(), Scope::Active).await {
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(format!("find deleted: {}", e)),
        Ok(_) => return Err("deleted record visible in active scope".to_string()),
    }

    let deleted = repo.list(ctx, Scope::OnlyDeleted).await.step("list deleted")?;
    ensure!(
        deleted.iter().any(|r| r.id() == stored.id()),
        "deleted record missing from deleted scope"
    );
    Ok(())
}

async fn restore<R, T>(repo: &T, ctx: &Context, stored: &R) -> CheckResult
where
    R: Record,
    T: RecordRepository<R> + ?Sized,
{
    let before = repo.count(ctx, Scope::Active).await.step("count")?;
    repo.restore(ctx, stored.id()).await.step("restore")?;
    let after = repo.count(ctx, Scope::Active).await.step("count")?;
    ensure!(after == before + 1, "active count {} -> {} after restore", before, after);

    let row = repo
        .find(ctx, stored.id(), Scope::Active)
        .await
        .step("find restored")?;
    ensure!(!row.base().is_deleted(), "restored record still deleted");
    Ok(())
}

async fn missing_record<R, T>(repo: &T, ctx: &Context) -> CheckResult
where
    R: Record,
    T: RecordRepository<R> + ?Sized,
{
    let id = <R::Id as RecordId>::generate();
    match repo.find(ctx, &id, Scope::WithDeleted).await {
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(format!("expected not found, got {}", e)),
        Ok(_) => return Err(format!("found a record for unknown id {}", id)),
    }
    match repo.soft_delete(ctx, &id).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => Err(format!("soft delete of unknown id: {:?}", other)),
    }
}

async fn cancelled_context<R, T>(repo: &T, ctx: &Context, stored: &R, unsaved: R) -> CheckResult
where
    R: Record,
    T: RecordRepository<R> + ?Sized,
{
    let before = repo.count(ctx, Scope::WithDeleted).await.step("count")?;
    for (label, dead) in dead_contexts() {
        expect_cancellation(
            repo.insert(&dead, unsaved.clone()).await,
            &format!("{} insert", label),
        )?;
        expect_cancellation(
            repo.find(&dead, stored.id(), Scope::WithDeleted).await,
            &format!("{} find", label),
        )?;
    }

    let after = repo.count(ctx, Scope::WithDeleted).await.step("count")?;
    ensure!(after == before, "insert under a dead context stored a row");
    Ok(())
}

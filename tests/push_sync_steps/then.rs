//! Then steps for push synchronisation BDD scenarios.

use super::world::{PushSyncWorld, run_async};
use pms_sync::push_sync::{
    domain::{ProjectId, WorkItemId, WorkItemStatus},
    ports::ActivityLogHistory,
    services::{PushSyncError, PushSyncOutcome},
};
use rstest_bdd_macros::then;

#[then("the push is synchronised with {count:u64} status change")]
fn push_synchronised(world: &PushSyncWorld, count: u64) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing push result"))?;

    let Ok(PushSyncOutcome::Synchronized(report)) = result else {
        return Err(eyre::eyre!("expected a synchronised push, got {result:?}"));
    };
    let applied = u64::try_from(report.changes().len())?;
    if applied != count {
        return Err(eyre::eyre!("expected {count} status changes, found {applied}"));
    }

    Ok(())
}

#[then(r#"the push is ignored with message "{message}""#)]
fn push_ignored(world: &PushSyncWorld, message: String) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing push result"))?;

    let Ok(PushSyncOutcome::Ignored { reason, .. }) = result else {
        return Err(eyre::eyre!("expected an ignored push, got {result:?}"));
    };
    if reason.message() != message {
        return Err(eyre::eyre!(
            "expected message {message:?}, found {:?}",
            reason.message()
        ));
    }

    Ok(())
}

#[then("the push fails because the project was not found")]
fn push_fails_project_not_found(world: &PushSyncWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing push result"))?;

    if !matches!(result, Err(PushSyncError::ProjectNotFound(_))) {
        return Err(eyre::eyre!("expected ProjectNotFound error, got {result:?}"));
    }

    Ok(())
}

#[then(r#"work item {item_id:u64} has status "{status}""#)]
fn work_item_has_status(
    world: &PushSyncWorld,
    item_id: u64,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = WorkItemStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let item = world
        .work_items
        .get(WorkItemId::new(item_id)?)?
        .ok_or_else(|| eyre::eyre!("work item {item_id} missing from store"))?;

    if item.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            item.status().as_str()
        ));
    }

    Ok(())
}

#[then("project {project_id:u64} has {count:u64} activity log entries")]
fn project_has_activity_entries(
    world: &PushSyncWorld,
    project_id: u64,
    count: u64,
) -> Result<(), eyre::Report> {
    let entries = run_async(
        world
            .activity_log
            .list_for_project(ProjectId::new(project_id)?),
    )?;
    let recorded = u64::try_from(entries.len())?;

    if recorded != count {
        return Err(eyre::eyre!(
            "expected {count} activity log entries, found {recorded}"
        ));
    }

    Ok(())
}

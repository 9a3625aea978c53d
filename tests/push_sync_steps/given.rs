//! Given steps for push synchronisation BDD scenarios.

use super::world::PushSyncWorld;
use eyre::WrapErr;
use pms_sync::push_sync::domain::{Project, ProjectId, WorkItem, WorkItemId, WorkItemStatus};
use rstest_bdd_macros::given;

#[given(r#"a project "{name}" with id {project_id:u64}"#)]
fn project_exists(
    world: &mut PushSyncWorld,
    name: String,
    project_id: u64,
) -> Result<(), eyre::Report> {
    let project = Project::new(ProjectId::new(project_id)?, name);
    world
        .projects
        .insert(project)
        .wrap_err("seed project for scenario")?;
    Ok(())
}

#[given(r#"work item {item_id:u64} in project {project_id:u64} with status "{status}""#)]
fn work_item_exists(
    world: &mut PushSyncWorld,
    item_id: u64,
    project_id: u64,
    status: String,
) -> Result<(), eyre::Report> {
    let parsed = WorkItemStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let item = WorkItem::new(
        WorkItemId::new(item_id)?,
        ProjectId::new(project_id)?,
        format!("Scenario item {item_id}"),
        parsed,
    );
    world
        .work_items
        .insert(item)
        .wrap_err("seed work item for scenario")?;
    Ok(())
}

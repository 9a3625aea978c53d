//! When steps for push synchronisation BDD scenarios.

use super::world::{PushSyncWorld, run_async};
use pms_sync::push_sync::domain::ProjectId;
use rstest_bdd_macros::when;
use serde_json::json;

fn deliver(
    world: &mut PushSyncWorld,
    project_id: u64,
    payload: &serde_json::Value,
) -> Result<(), eyre::Report> {
    let target = ProjectId::new(project_id)?;
    let body = payload.to_string();
    let result = run_async(
        world
            .service
            .synchronize_payload(target, body.as_bytes()),
    );
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"a push to "{git_ref}" for project {project_id:u64} carries the commit "{message}""#)]
fn push_with_commit(
    world: &mut PushSyncWorld,
    git_ref: String,
    project_id: u64,
    message: String,
) -> Result<(), eyre::Report> {
    let payload = json!({
        "ref": git_ref,
        "commits": [
            { "id": "5ca1ab1e", "message": message, "author": { "name": "Scenario Author" } }
        ]
    });
    deliver(world, project_id, &payload)
}

#[when(r#"an empty push to "{git_ref}" arrives for project {project_id:u64}"#)]
fn empty_push(
    world: &mut PushSyncWorld,
    git_ref: String,
    project_id: u64,
) -> Result<(), eyre::Report> {
    let payload = json!({ "ref": git_ref, "commits": [] });
    deliver(world, project_id, &payload)
}

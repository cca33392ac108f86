//! Share and join commands

use anyhow::Result;
use tandem_core::{ListRepository, ProfileManager, ShareCoordinator};

use super::{require_user, resolve_list};

pub async fn publish(
    repo: &mut ListRepository,
    profiles: &ProfileManager,
    coordinator: &ShareCoordinator,
    selector: &str,
) -> Result<()> {
    let (user_id, user_name) = require_user(profiles)?;
    let list_id = resolve_list(repo, selector)?;

    let code = coordinator
        .publish(repo, list_id, &user_id, &user_name)
        .await?;
    println!("Invite code: {code}");
    println!("Anyone with this code can join the list.");
    Ok(())
}

pub async fn join(
    repo: &mut ListRepository,
    profiles: &ProfileManager,
    coordinator: &ShareCoordinator,
    code: &str,
) -> Result<()> {
    let (user_id, user_name) = require_user(profiles)?;

    let list = coordinator.redeem(repo, code, &user_id, &user_name).await?;
    println!(
        "Joined '{}' ({} task(s), owned by {})",
        list.name,
        list.tasks.len(),
        list.owner_name.as_deref().unwrap_or("unknown"),
    );
    Ok(())
}

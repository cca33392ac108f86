//! List commands

use anyhow::Result;
use tandem_core::{ChangePropagator, ListRepository, ShareType};

use super::{resolve_list, short_id};

pub fn create(repo: &mut ListRepository, name: &str, color: &str) -> Result<()> {
    let list = repo.create_list(name, color)?;
    println!("Created '{}' ({})", list.name, short_id(list.id));
    Ok(())
}

pub fn list(repo: &ListRepository) -> Result<()> {
    if repo.lists().is_empty() {
        println!("No lists yet. Run `tandem list create <name>`.");
        return Ok(());
    }
    for list in repo.lists() {
        let marker = match list.share_type {
            ShareType::Local => "",
            ShareType::Owned => " [shared]",
            ShareType::Participant => " [joined]",
        };
        println!(
            "{}  {}{}  {}/{} done",
            short_id(list.id),
            list.name,
            marker,
            list.completed_task_count(),
            list.total_task_count(),
        );
    }
    Ok(())
}

pub fn show(repo: &ListRepository, selector: &str) -> Result<()> {
    let list_id = resolve_list(repo, selector)?;
    let list = repo.get_list(list_id).expect("resolved id exists");

    println!("{} (#{})", list.name, list.color);
    if let Some(code) = &list.invite_code {
        println!("Invite code: {code}");
    }
    if let Some(owner) = &list.owner_name {
        println!("Owner: {owner}");
    }
    for participant in &list.participants {
        println!("Participant: {} ({})", participant.name, participant.id);
    }
    for task in &list.tasks {
        let mark = if task.is_completed { "x" } else { " " };
        let by = task
            .completed_by_name
            .as_deref()
            .map(|n| format!("  (by {n})"))
            .unwrap_or_default();
        println!("[{}] {}  {}{}", mark, short_id(task.id), task.text, by);
    }
    Ok(())
}

pub fn rename(
    repo: &mut ListRepository,
    propagator: &Option<ChangePropagator>,
    selector: &str,
    name: &str,
    color: Option<&str>,
) -> Result<()> {
    let list_id = resolve_list(repo, selector)?;
    let mut list = repo.get_list(list_id).expect("resolved id exists").clone();
    list.name = name.to_string();
    if let Some(color) = color {
        list.color = color.to_string();
    }
    repo.update_list(list.clone())?;

    if let Some(p) = propagator {
        p.list_updated(&list);
    }
    println!("Updated '{}'", list.name);
    Ok(())
}

pub fn delete(repo: &mut ListRepository, selector: &str) -> Result<()> {
    let list_id = resolve_list(repo, selector)?;
    repo.delete_list(list_id)?;
    println!("Deleted");
    Ok(())
}

pub fn kick(
    repo: &mut ListRepository,
    propagator: &Option<ChangePropagator>,
    selector: &str,
    participant_id: &str,
) -> Result<()> {
    let list_id = resolve_list(repo, selector)?;
    if !repo.remove_participant(list_id, participant_id)? {
        println!("No such participant");
        return Ok(());
    }

    let list = repo.get_list(list_id).expect("resolved id exists");
    if let Some(p) = propagator {
        p.participants_changed(list);
    }
    println!("Removed {participant_id} from '{}'", list.name);
    Ok(())
}

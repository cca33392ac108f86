//! Task commands

use anyhow::Result;
use tandem_core::{ChangePropagator, ListRepository, ProfileManager};

use super::{require_user, resolve_list, resolve_task, short_id};

pub fn add(
    repo: &mut ListRepository,
    propagator: &Option<ChangePropagator>,
    list_selector: &str,
    text: &str,
) -> Result<()> {
    let list_id = resolve_list(repo, list_selector)?;
    let task = repo.add_task(list_id, text)?.expect("resolved id exists");

    let list = repo.get_list(list_id).expect("resolved id exists");
    if let Some(p) = propagator {
        p.task_upserted(list, &task);
    }
    println!("Added '{}' ({})", task.text, short_id(task.id));
    Ok(())
}

pub fn toggle(
    repo: &mut ListRepository,
    profiles: &ProfileManager,
    propagator: &Option<ChangePropagator>,
    list_selector: &str,
    task_selector: &str,
) -> Result<()> {
    let (user_id, user_name) = require_user(profiles)?;
    let list_id = resolve_list(repo, list_selector)?;
    let task_id = resolve_task(repo.get_list(list_id).expect("resolved id exists"), task_selector)?;

    let mut celebrations = repo.take_celebrations();
    let task = repo
        .toggle_task(list_id, task_id, &user_id, &user_name)?
        .expect("resolved id exists");

    let list = repo.get_list(list_id).expect("resolved id exists");
    if let Some(p) = propagator {
        p.task_upserted(list, &task);
    }

    let celebrated = celebrations
        .as_mut()
        .map(|rx| rx.try_recv().is_ok())
        .unwrap_or(false);
    if celebrated {
        println!("Done: '{}' 🎉", task.text);
    } else {
        println!("Reopened: '{}'", task.text);
    }
    Ok(())
}

pub fn edit(
    repo: &mut ListRepository,
    propagator: &Option<ChangePropagator>,
    list_selector: &str,
    task_selector: &str,
    text: &str,
) -> Result<()> {
    let list_id = resolve_list(repo, list_selector)?;
    let task_id = resolve_task(repo.get_list(list_id).expect("resolved id exists"), task_selector)?;

    let mut task = repo
        .get_list(list_id)
        .and_then(|l| l.task(task_id))
        .expect("resolved id exists")
        .clone();
    task.set_text(text);
    repo.update_task(list_id, task.clone())?;

    let list = repo.get_list(list_id).expect("resolved id exists");
    if let Some(p) = propagator {
        p.task_upserted(list, &task);
    }
    println!("Updated '{}'", task.text);
    Ok(())
}

pub fn delete(
    repo: &mut ListRepository,
    propagator: &Option<ChangePropagator>,
    list_selector: &str,
    task_selector: &str,
) -> Result<()> {
    let list_id = resolve_list(repo, list_selector)?;
    let task_id = resolve_task(repo.get_list(list_id).expect("resolved id exists"), task_selector)?;

    repo.delete_task(list_id, task_id)?;

    let list = repo.get_list(list_id).expect("resolved id exists");
    if let Some(p) = propagator {
        p.task_deleted(list, task_id);
    }
    println!("Deleted");
    Ok(())
}

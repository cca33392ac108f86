//! Command implementations

pub mod list;
pub mod profile;
pub mod share;
pub mod status;
pub mod sync;
pub mod task;

use anyhow::{bail, Result};
use uuid::Uuid;

use tandem_core::{ListRepository, ProfileManager, TodoList};

/// Resolve a list selector: exact name (case-insensitive) or id prefix
pub fn resolve_list(repo: &ListRepository, selector: &str) -> Result<Uuid> {
    if let Some(list) = repo
        .lists()
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(selector))
    {
        return Ok(list.id);
    }

    let matches: Vec<&TodoList> = repo
        .lists()
        .iter()
        .filter(|l| l.id.to_string().starts_with(&selector.to_lowercase()))
        .collect();
    match matches.as_slice() {
        [list] => Ok(list.id),
        [] => bail!("No list matches '{selector}'"),
        _ => bail!("'{selector}' matches more than one list, use a longer id prefix"),
    }
}

/// Resolve a task selector: exact text (case-insensitive) or id prefix
pub fn resolve_task(list: &TodoList, selector: &str) -> Result<Uuid> {
    if let Some(task) = list
        .tasks
        .iter()
        .find(|t| t.text.eq_ignore_ascii_case(selector))
    {
        return Ok(task.id);
    }

    let matches: Vec<Uuid> = list
        .tasks
        .iter()
        .filter(|t| t.id.to_string().starts_with(&selector.to_lowercase()))
        .map(|t| t.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No task matches '{selector}' in '{}'", list.name),
        _ => bail!("'{selector}' matches more than one task, use a longer id prefix"),
    }
}

/// The acting user's id and nickname; fails when not onboarded yet
pub fn require_user(profiles: &ProfileManager) -> Result<(String, String)> {
    let Some(profile) = profiles.profile() else {
        bail!("No profile yet. Run `tandem profile create <nickname>` first.");
    };
    Ok((profile.user_id.clone(), profile.nickname.clone()))
}

/// Short id prefix for display
pub fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::{Config, LocalStore};
    use tempfile::TempDir;

    fn test_repo(temp_dir: &TempDir) -> ListRepository {
        let store = LocalStore::new(Config {
            data_dir: temp_dir.path().to_path_buf(),
            remote_url: None,
            sync_enabled: false,
        });
        ListRepository::open(store).unwrap()
    }

    #[test]
    fn test_resolve_list_by_name_and_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = test_repo(&temp_dir);
        let list = repo.create_list("Groceries", "7161EF").unwrap();

        assert_eq!(resolve_list(&repo, "groceries").unwrap(), list.id);

        let prefix = &list.id.to_string()[..8];
        assert_eq!(resolve_list(&repo, prefix).unwrap(), list.id);

        assert!(resolve_list(&repo, "errands").is_err());
    }

    #[test]
    fn test_resolve_task_by_text_and_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = test_repo(&temp_dir);
        let list = repo.create_list("Groceries", "7161EF").unwrap();
        let task = repo.add_task(list.id, "Milk").unwrap().unwrap();

        let list = repo.get_list(list.id).unwrap();
        assert_eq!(resolve_task(list, "milk").unwrap(), task.id);
        assert_eq!(
            resolve_task(list, &task.id.to_string()[..8]).unwrap(),
            task.id
        );
        assert!(resolve_task(list, "bread").is_err());
    }
}

//! Status command

use anyhow::Result;
use tandem_core::{ListRepository, ProfileManager};

pub fn show(repo: &ListRepository, profiles: &ProfileManager) -> Result<()> {
    match profiles.profile() {
        Some(profile) => println!("Logged in as {} ({})", profile.nickname, profile.user_id),
        None => println!("Not logged in"),
    }

    let shared = repo.lists().iter().filter(|l| l.is_shared).count();
    println!(
        "{} list(s), {} shared, {}/{} task(s) done",
        repo.lists().len(),
        shared,
        repo.total_completed_tasks(),
        repo.total_tasks(),
    );
    Ok(())
}

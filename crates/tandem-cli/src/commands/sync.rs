//! Sync command

use anyhow::Result;
use tandem_core::{ListRepository, SyncEngine};

pub async fn refresh(repo: &mut ListRepository, engine: &SyncEngine) -> Result<()> {
    let report = engine.pull_all(repo).await;

    println!("Refreshed {} list(s)", report.pulled);
    for (list_id, error) in &report.failed {
        let name = repo
            .get_list(*list_id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| list_id.to_string());
        println!("Failed: {name}: {error}");
    }
    Ok(())
}

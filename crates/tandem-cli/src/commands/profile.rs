//! Profile commands

use anyhow::Result;
use tandem_core::ProfileManager;

pub fn create(profiles: &mut ProfileManager, nickname: &str) -> Result<()> {
    let profile = profiles.create(nickname)?;
    println!("Welcome, {}!", profile.nickname);
    println!("Your user id: {}", profile.user_id);
    Ok(())
}

pub fn show(profiles: &ProfileManager) -> Result<()> {
    match profiles.profile() {
        Some(profile) => {
            println!("Nickname: {}", profile.nickname);
            println!("User id:  {}", profile.user_id);
            println!("Created:  {}", profile.created_at.format("%Y-%m-%d"));
        }
        None => println!("No profile. Run `tandem profile create <nickname>`."),
    }
    Ok(())
}

pub fn rename(profiles: &mut ProfileManager, nickname: &str) -> Result<()> {
    profiles.update_nickname(nickname)?;
    println!("Nickname changed to {nickname}");
    Ok(())
}

pub fn logout(profiles: &mut ProfileManager) -> Result<()> {
    profiles.logout()?;
    println!("Profile cleared");
    Ok(())
}

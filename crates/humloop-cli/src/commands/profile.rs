use super::read_secret;
use crate::app::AppContext;
use anyhow::Result;
use humloop_core::profile::{PasswordChange, ProfileUpdate};

pub async fn show(ctx: &AppContext, json: bool) -> Result<()> {
    let profile = ctx.profile.me().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("{} (@{}, id {})", profile.display_name(), profile.username, profile.id);
    if let Some(email) = &profile.email {
        println!("email: {email}");
    }
    if let Some(bio) = profile.bio.as_deref().filter(|bio| !bio.is_empty()) {
        println!("{bio}");
    }
    Ok(())
}

pub async fn stats(ctx: &AppContext) -> Result<()> {
    let stats = ctx.profile.statistics().await?;
    println!("posts      {:>6}", stats.total_posts);
    println!("likes      {:>6}", stats.total_likes);
    println!("comments   {:>6}", stats.total_comments);
    println!("music      {:>6}", stats.total_music);
    println!("favorites  {:>6}", stats.total_favorites);
    Ok(())
}

pub async fn update(
    ctx: &AppContext,
    username: Option<String>,
    email: Option<String>,
    bio: Option<String>,
) -> Result<()> {
    let update = ProfileUpdate { username, email, bio };
    let profile = ctx.profile.update_profile(&update).await?;
    println!("Updated profile for @{}.", profile.username);
    Ok(())
}

pub async fn password(ctx: &AppContext) -> Result<()> {
    let current = read_secret("Current password: ")?;
    let new = read_secret("New password: ")?;
    let confirm = read_secret("Repeat new password: ")?;
    let message = ctx
        .profile
        .change_password(&PasswordChange::new(current, new, confirm))
        .await?;
    println!("{}", message.unwrap_or_else(|| "Password changed.".to_string()));
    Ok(())
}

pub async fn music(ctx: &AppContext, page: u32) -> Result<()> {
    let tracks = ctx.profile.my_music(page).await?;
    if tracks.is_empty() {
        println!("No tracks yet.");
    }
    for track in &tracks {
        let duration = track
            .duration
            .map(|secs| format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60))
            .unwrap_or_default();
        println!("{:>6}  {:>5}  {}", track.id, duration, track.title);
    }
    Ok(())
}

pub async fn favorites(ctx: &AppContext, music: bool, page: u32) -> Result<()> {
    if music {
        let favorites = ctx.profile.favorite_music(page).await?;
        if favorites.is_empty() {
            println!("No liked tracks yet.");
        }
        for favorite in &favorites {
            println!("{:>6}  {}", favorite.music.id, favorite.music.title);
        }
    } else {
        let favorites = ctx.profile.favorite_posts(page).await?;
        if favorites.is_empty() {
            println!("No liked posts yet.");
        }
        for favorite in &favorites {
            println!("{:>6}  {}", favorite.post.id, favorite.post.title);
        }
    }
    Ok(())
}

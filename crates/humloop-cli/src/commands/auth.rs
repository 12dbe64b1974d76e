use super::read_secret;
use crate::app::AppContext;
use anyhow::{Result, bail};

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => read_secret("Password: "),
    }
}

pub async fn register(ctx: &AppContext, username: &str, nickname: Option<&str>, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let message = ctx
        .sessions
        .register(username, &password, nickname.unwrap_or(username))
        .await?;
    println!("{}", message.unwrap_or_else(|| format!("Registered {username}.")));
    Ok(())
}

pub async fn login(ctx: &AppContext, username: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let user = ctx.sessions.login(username, &password).await?;
    println!("Logged in as {}.", user.display_name());
    Ok(())
}

pub async fn logout(ctx: &AppContext) {
    ctx.sessions.logout().await;
    println!("Logged out.");
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.sessions.current().await;
    match session.user {
        Some(user) => {
            println!("{} (id {}, @{})", user.display_name(), user.id, user.username);
            Ok(())
        }
        None => bail!("Not logged in."),
    }
}

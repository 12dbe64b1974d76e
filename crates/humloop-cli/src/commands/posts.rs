use crate::OrderArg;
use crate::app::AppContext;
use anyhow::{Result, bail};
use humloop_core::post::{Post, PostOrdering};

impl From<OrderArg> for PostOrdering {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Newest => PostOrdering::Newest,
            OrderArg::Oldest => PostOrdering::Oldest,
            OrderArg::Likes => PostOrdering::MostLiked,
        }
    }
}

fn print_row(post: &Post) {
    let date = post
        .created_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let likes = post.likes_count.unwrap_or(0);
    println!("{:>6}  {:<10}  {:>4}♥  {}", post.id, date, likes, post.title);
}

pub async fn list(ctx: &AppContext, order: OrderArg, mine: bool, json: bool) -> Result<()> {
    let posts = if mine {
        ctx.posts.my_posts(order.into()).await?
    } else {
        ctx.posts.list_posts(order.into()).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }
    if posts.is_empty() {
        println!("No posts yet.");
    }
    for post in &posts {
        print_row(post);
    }
    Ok(())
}

pub async fn show(ctx: &AppContext, id: i64, json: bool) -> Result<()> {
    let Some(post) = ctx.posts.get_post(id).await? else {
        bail!("Post {id} not found.");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&post)?);
        return Ok(());
    }
    print_row(&post);
    if let Some(url) = &post.audio_url {
        println!("        audio: {url}");
    }
    if !post.content.is_empty() {
        println!();
        println!("{}", post.content);
    }
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.posts.delete_post(id).await?;
    println!("Deleted post {id}.");
    Ok(())
}

pub async fn like(ctx: &AppContext, id: i64) -> Result<()> {
    let status = ctx.posts.toggle_like(id).await?;
    match (status.liked, status.likes_count) {
        (Some(true), Some(count)) => println!("Liked post {id} ({count} likes)."),
        (Some(false), Some(count)) => println!("Unliked post {id} ({count} likes)."),
        _ => println!("Toggled like on post {id}."),
    }
    Ok(())
}
